//! Deterministic placement scoring.
//!
//! The reference fallback scorer: a pure function over the enriched session
//! history that always yields a complete placement record, even for an
//! empty or single-answer session. The AI analyzer produces the same shape
//! through a richer path and falls back to this one on failure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Level;
use crate::session::HistoryEntry;

/// Per-level accuracy a test-taker must reach to demonstrate competence.
const COMPETENCE_THRESHOLD: f64 = 0.7;

/// Skills scoring below this feed the focus recommendations.
const WEAK_SKILL_THRESHOLD: f64 = 0.6;

/// The headline placement result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    /// Recommended starting level, 0-5.
    pub novakid_level: Level,
    /// Confidence in the placement, 0.0-1.0.
    pub confidence: f64,
    /// CEFR label for the placement level.
    pub cefr_equivalent: String,
    /// One-line human-readable justification.
    pub level_justification: String,
}

/// Accuracy and supporting evidence for one skill tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillScore {
    pub score: f64,
    pub evidence: Vec<String>,
}

/// Actionable guidance derived from the skill breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    pub immediate_focus: Vec<String>,
    pub strengths_to_build_on: Vec<String>,
    pub suggested_starting_point: String,
    pub estimated_progress: String,
}

/// The complete analysis record, AI-derived or fallback-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementAnalysis {
    pub placement: Placement,
    /// Per-skill scores keyed by skill tag.
    #[serde(default)]
    pub skill_analysis: BTreeMap<String, SkillScore>,
    pub recommendations: Recommendations,
}

/// Score a finished session deterministically.
///
/// Placement is the highest assigned level at which per-level accuracy
/// reached the competence threshold, defaulting to 1 when no level
/// qualifies. Never fails; an empty history yields level 1 at confidence 0.
pub fn score_session(history: &[HistoryEntry]) -> PlacementAnalysis {
    if history.is_empty() {
        return empty_analysis();
    }

    let total = history.len();
    let correct = history.iter().filter(|h| h.correct).count();
    let overall_accuracy = correct as f64 / total as f64;

    // Per-level accuracy over assigned levels.
    let mut per_level: BTreeMap<Level, (usize, usize)> = BTreeMap::new();
    for entry in history {
        let counts = per_level.entry(entry.assigned_level).or_insert((0, 0));
        counts.1 += 1;
        if entry.correct {
            counts.0 += 1;
        }
    }

    // Ascending scan keeping the latest qualifying level.
    let mut placement_level = Level::new(1).expect("1 is a valid level");
    for (&level, &(level_correct, level_total)) in &per_level {
        if level_correct as f64 / level_total as f64 >= COMPETENCE_THRESHOLD {
            placement_level = level;
        }
    }

    let placement = Placement {
        novakid_level: placement_level,
        confidence: overall_accuracy,
        cefr_equivalent: placement_level.cefr().to_string(),
        level_justification: format!(
            "Overall accuracy {:.0}% with best performance at Level {placement_level}",
            overall_accuracy * 100.0
        ),
    };

    let skill_analysis = analyze_skills(history);
    let recommendations = build_recommendations(history, &skill_analysis, placement_level);

    PlacementAnalysis {
        placement,
        skill_analysis,
        recommendations,
    }
}

fn empty_analysis() -> PlacementAnalysis {
    let level = Level::new(1).expect("1 is a valid level");
    PlacementAnalysis {
        placement: Placement {
            novakid_level: level,
            confidence: 0.0,
            cefr_equivalent: level.cefr().to_string(),
            level_justification: "No answers recorded".to_string(),
        },
        skill_analysis: BTreeMap::new(),
        recommendations: Recommendations {
            immediate_focus: vec!["Take the placement test to get guidance".to_string()],
            strengths_to_build_on: Vec::new(),
            suggested_starting_point: format!("Begin at Novakid Level {level}"),
            estimated_progress: "Progress varies by individual".to_string(),
        },
    }
}

fn analyze_skills(history: &[HistoryEntry]) -> BTreeMap<String, SkillScore> {
    let mut per_skill: BTreeMap<String, Vec<&HistoryEntry>> = BTreeMap::new();
    for entry in history {
        let skill = if entry.skill.is_empty() {
            "General".to_string()
        } else {
            entry.skill.clone()
        };
        per_skill.entry(skill).or_default().push(entry);
    }

    per_skill
        .into_iter()
        .map(|(skill, entries)| {
            let total = entries.len();
            let correct = entries.iter().filter(|e| e.correct).count();
            let score = correct as f64 / total as f64;
            let highest = entries
                .iter()
                .map(|e| e.assigned_level)
                .max()
                .expect("group is non-empty");

            let mut evidence = vec![format!(
                "Answered {correct}/{total} {} questions correctly",
                skill.to_lowercase()
            )];
            evidence.push(format!("Attempted {} up to Level {highest}", skill.to_lowercase()));

            (skill, SkillScore { score, evidence })
        })
        .collect()
}

fn build_recommendations(
    history: &[HistoryEntry],
    skills: &BTreeMap<String, SkillScore>,
    placement_level: Level,
) -> Recommendations {
    let mut immediate_focus = Vec::new();
    for (skill, score) in skills {
        if score.score >= WEAK_SKILL_THRESHOLD {
            continue;
        }
        // Prefer grammar-point-specific guidance when the missed questions
        // recorded one.
        let mut points: Vec<&str> = history
            .iter()
            .filter(|e| !e.correct && e.skill == *skill)
            .filter_map(|e| e.grammar_point.as_deref())
            .collect();
        points.sort_unstable();
        points.dedup();

        if points.is_empty() {
            immediate_focus.push(format!(
                "Practice {} exercises at Level {placement_level}",
                skill.to_lowercase()
            ));
        } else {
            for point in points {
                immediate_focus.push(format!("Review {point}"));
            }
        }
    }
    if immediate_focus.is_empty() {
        immediate_focus.push("Continue practicing at current level".to_string());
    }

    let mut strengths_to_build_on: Vec<String> = skills
        .iter()
        .filter(|(_, score)| score.score >= WEAK_SKILL_THRESHOLD)
        .map(|(skill, _)| format!("Solid {} foundation", skill.to_lowercase()))
        .collect();
    if strengths_to_build_on.is_empty() {
        strengths_to_build_on.push("Build on demonstrated skills".to_string());
    }

    let overall = {
        let correct = history.iter().filter(|e| e.correct).count();
        correct as f64 / history.len() as f64
    };
    let estimated_progress = if overall >= 0.8 && placement_level < Level::MAX {
        format!(
            "Ready for Level {} material in 4-6 weeks with regular practice",
            placement_level.up()
        )
    } else {
        "Progress varies with regular practice".to_string()
    };

    Recommendations {
        immediate_focus,
        strengths_to_build_on,
        suggested_starting_point: format!("Begin at Novakid Level {placement_level}"),
        estimated_progress,
    }
}
