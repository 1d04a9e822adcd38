//! Adaptive question selection.
//!
//! Selection never mutates session state: it reads the state and the bank,
//! and the orchestrator applies the resulting delta (used-id insert,
//! recent-mechanic push, calibration bookkeeping) atomically.
//!
//! Greedy hardest-available selection oscillates; the pool expansion here is
//! gated on momentum and recent accuracy so a session converges smoothly
//! while strong performers can still reach the ceiling.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::bank::QuestionBank;
use crate::engine::EngineConfig;
use crate::model::{
    available_mechanics, Level, Mechanic, MechanicCategory, Question, ServedQuestion,
};
use crate::session::{SessionState, CALIBRATION_STEPS};

/// Fixed level sequence probed during calibration, one level per serving.
pub const CALIBRATION_LEVELS: [u8; CALIBRATION_STEPS as usize] = [0, 1, 2];

/// Window the pool-expansion rules read.
const ROLLING_WINDOW: usize = 3;

/// How many recent mechanics to steer away from.
const DIVERSITY_TAIL: usize = 2;

/// A chosen question plus the delta flags the orchestrator applies.
#[derive(Debug, Clone)]
pub struct Selection {
    /// The question to present, annotated with its pool level.
    pub question: ServedQuestion,
    /// True when a calibration step found no candidates and calibration was
    /// abandoned for the rest of the session (recoverable degrade).
    pub calibration_degraded: bool,
}

/// Pick the next question, or `None` when every pool is exhausted.
pub fn next_question(
    state: &SessionState,
    bank: &QuestionBank,
    config: &EngineConfig,
    rng: &mut impl Rng,
) -> Option<Selection> {
    if !state.calibration_complete && state.calibration_count < CALIBRATION_STEPS {
        let step = state.calibration_count as usize;
        let level = Level::new(CALIBRATION_LEVELS[step]).expect("calibration levels are valid");

        if let Some((question, _)) =
            choose_balanced(state, bank, &[level], available_mechanics(level), config, rng)
        {
            return Some(Selection {
                question: ServedQuestion {
                    question,
                    assigned_level: level,
                    calibration: true,
                },
                calibration_degraded: false,
            });
        }

        tracing::debug!(step, %level, "calibration pool empty; falling through to adaptive selection");
        return adaptive(state, bank, config, rng).map(|question| Selection {
            question,
            calibration_degraded: true,
        });
    }

    adaptive(state, bank, config, rng).map(|question| Selection {
        question,
        calibration_degraded: false,
    })
}

fn adaptive(
    state: &SessionState,
    bank: &QuestionBank,
    config: &EngineConfig,
    rng: &mut impl Rng,
) -> Option<ServedQuestion> {
    let pool = level_pool(state, config);
    // Mechanics follow the current level, not the pool levels.
    let eligible = available_mechanics(state.current_level);

    let (question, drawn_from) = choose_balanced(state, bank, &pool, eligible, config, rng)?;
    Some(ServedQuestion {
        question,
        assigned_level: drawn_from,
        calibration: false,
    })
}

/// The set of levels to draw candidates from this turn.
fn level_pool(state: &SessionState, config: &EngineConfig) -> Vec<Level> {
    let current = state.current_level;
    let answered = state.answers_recorded();
    let mut pool = vec![current];

    // Early-session guard: neighbors only until enough answers exist.
    if answered < config.early_session_threshold {
        pool.push(current.down());
        pool.push(current.up());
        pool.sort();
        pool.dedup();
        return pool;
    }

    let accuracy = state.rolling_accuracy(ROLLING_WINDOW);
    let momentum = state.level_momentum;

    if accuracy >= 0.8 && momentum > 0.0 {
        // Momentum-gated upward exploration, reaching further as the
        // session accumulates evidence.
        for step in 1..=exploration_reach(answered, config) {
            pool.push(clipped(current.value() as i16 + step as i16));
        }
    } else if accuracy <= 0.4 && momentum < 0.0 {
        for step in 1..=exploration_reach(answered, config) {
            pool.push(clipped(current.value() as i16 - step as i16));
        }
    } else {
        pool.push(current.down());
        pool.push(current.up());
    }

    // High-achiever ceiling assist.
    if current.value() >= 4 && answered >= 8 && state.overall_accuracy() >= 0.85 {
        pool.push(Level::MAX);
    }
    if current == Level::MAX && state.rolling_accuracy(ROLLING_WINDOW) >= 0.5 {
        // Concentrate assessment at the ceiling.
        pool.retain(|l| l.value() >= 4);
    }

    // End-of-test push: give a strong finisher one more shot upward.
    let remaining = config.questions_per_test.saturating_sub(answered);
    if remaining <= 3 && state.overall_accuracy() >= 0.85 && momentum > 1.0 {
        pool.push(current.up());
    }

    pool.sort();
    pool.dedup();
    pool
}

fn exploration_reach(answered: usize, config: &EngineConfig) -> u8 {
    ((1 + answered / 10) as u8).min(config.max_pool_extension)
}

fn clipped(value: i16) -> Level {
    Level::new(value.clamp(0, Level::MAX.value() as i16) as u8).expect("clamped to range")
}

/// Category-balanced candidate choice.
///
/// Flips a coin for the target category, narrows mechanics away from the
/// recent tail where possible, caps each level's contribution, and picks
/// uniformly. Retries once with the other category before giving up.
fn choose_balanced(
    state: &SessionState,
    bank: &QuestionBank,
    pool: &[Level],
    eligible: &[Mechanic],
    config: &EngineConfig,
    rng: &mut impl Rng,
) -> Option<(Question, Level)> {
    let avoid = state.last_mechanics(DIVERSITY_TAIL);
    let preferred: Vec<Mechanic> = eligible
        .iter()
        .copied()
        .filter(|m| !avoid.contains(m))
        .collect();

    let first = if rng.gen_bool(0.5) {
        MechanicCategory::Audio
    } else {
        MechanicCategory::Text
    };

    for category in [first, first.other()] {
        let mut mechanics: Vec<Mechanic> = eligible
            .iter()
            .copied()
            .filter(|m| m.category() == category)
            .collect();
        if mechanics.is_empty() {
            continue;
        }

        let fresh: Vec<Mechanic> = mechanics
            .iter()
            .copied()
            .filter(|m| !avoid.contains(m))
            .collect();
        if !fresh.is_empty() {
            mechanics = fresh;
        }

        let overlap: Vec<Mechanic> = mechanics
            .iter()
            .copied()
            .filter(|m| preferred.contains(m))
            .collect();
        if !overlap.is_empty() {
            mechanics = overlap;
        }

        let mut candidates: Vec<(&Question, Level)> = Vec::new();
        for &level in pool {
            let mut taken = 0;
            for question in bank.questions_at(level) {
                if taken >= config.per_level_candidate_cap {
                    break;
                }
                if !state.used_question_ids.contains(&question.id)
                    && mechanics.contains(&question.mechanic())
                {
                    candidates.push((question, level));
                    taken += 1;
                }
            }
        }

        if let Some(&(question, level)) = candidates.choose(rng) {
            return Some((question.clone(), level));
        }
    }

    None
}
