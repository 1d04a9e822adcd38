//! Markdown report generator.
//!
//! Produces the parent/teacher-facing summary of a finished session:
//! placement card, skill breakdown, recommendations, and the
//! question-by-question detail.

use std::path::Path;

use anyhow::{Context, Result};

use placetest_core::record::SessionRecord;
use placetest_core::traits::AnalysisMethod;

/// Escape a string for safe insertion into a markdown table cell.
fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Render a session record as a markdown document.
pub fn render_markdown(record: &SessionRecord) -> String {
    let mut md = String::new();
    let placement = &record.analysis.analysis.placement;

    md.push_str("# Placement Test Report\n\n");
    if let Some(name) = &record.student_name {
        md.push_str(&format!("**Student:** {}", escape_cell(name)));
        if let Some(age) = record.student_age {
            md.push_str(&format!(" (age {age})"));
        }
        md.push_str("  \n");
    }
    md.push_str(&format!(
        "**Completed:** {}\n\n",
        record.completed_at.format("%Y-%m-%d %H:%M UTC")
    ));

    // Placement card.
    md.push_str("## Placement\n\n");
    md.push_str("| Novakid Level | CEFR | Confidence |\n");
    md.push_str("|---|---|---|\n");
    md.push_str(&format!(
        "| Level {} | {} | {:.0}% |\n\n",
        placement.novakid_level,
        placement.cefr_equivalent,
        placement.confidence * 100.0
    ));
    md.push_str(&format!("{}\n\n", placement.level_justification));

    match &record.analysis.method {
        AnalysisMethod::Ai { model } => {
            md.push_str(&format!("*Analysis powered by AI ({model}).*\n\n"));
        }
        AnalysisMethod::Fallback { reason } => {
            md.push_str(&format!(
                "*AI analysis unavailable ({}); placement derived from accuracy.*\n\n",
                escape_cell(reason)
            ));
        }
    }

    // Skill breakdown.
    let skills = &record.analysis.analysis.skill_analysis;
    if !skills.is_empty() {
        md.push_str("## Skill Analysis\n\n");
        md.push_str("| Skill | Score |\n|---|---|\n");
        for (skill, score) in skills {
            md.push_str(&format!(
                "| {} | {:.0}% |\n",
                escape_cell(skill),
                score.score * 100.0
            ));
        }
        md.push('\n');
        for (skill, score) in skills {
            if score.evidence.is_empty() {
                continue;
            }
            md.push_str(&format!("**{}:**\n", escape_cell(skill)));
            for evidence in &score.evidence {
                md.push_str(&format!("- {}\n", escape_cell(evidence)));
            }
            md.push('\n');
        }
    }

    // Recommendations.
    let recs = &record.analysis.analysis.recommendations;
    md.push_str("## Recommendations\n\n");
    md.push_str("**Next steps:**\n");
    for focus in &recs.immediate_focus {
        md.push_str(&format!("- {}\n", escape_cell(focus)));
    }
    md.push_str("\n**Strengths:**\n");
    for strength in &recs.strengths_to_build_on {
        md.push_str(&format!("- {}\n", escape_cell(strength)));
    }
    md.push_str(&format!(
        "\n**Starting point:** {}\n",
        escape_cell(&recs.suggested_starting_point)
    ));
    md.push_str(&format!(
        "**Timeline:** {}\n\n",
        escape_cell(&recs.estimated_progress)
    ));

    // Session statistics.
    let total = record.history.len();
    let correct = record.correct_count();
    md.push_str("## Session Statistics\n\n");
    md.push_str(&format!(
        "**Questions correct:** {correct}/{total}  \n"
    ));
    if total > 0 {
        md.push_str(&format!(
            "**Accuracy:** {:.0}%  \n",
            correct as f64 / total as f64 * 100.0
        ));
    }
    md.push_str(&format!("**Final test level:** Level {}\n\n", record.final_level));

    // Question-by-question detail.
    if !record.history.is_empty() {
        md.push_str("## Question Detail\n\n");
        md.push_str("| # | Mechanic | Level | Skill | Result |\n");
        md.push_str("|---|---|---|---|---|\n");
        for (i, entry) in record.history.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                i + 1,
                entry.mechanic.label(),
                entry.assigned_level,
                escape_cell(&entry.skill),
                if entry.correct { "correct" } else { "incorrect" }
            ));
        }
    }

    md
}

/// Render and write a markdown report to a file.
pub fn write_markdown_report(record: &SessionRecord, path: &Path) -> Result<()> {
    let markdown = render_markdown(record);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, markdown)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}
