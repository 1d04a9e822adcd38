//! Per-answer performance tracking and level transitions.
//!
//! A saturating, hysteretic control loop: the level stays within 0-5, a
//! cooldown suppresses back-to-back transitions, and momentum decay after a
//! jump makes consecutive jumps progressively harder to sustain.

use crate::engine::EngineConfig;
use crate::model::Level;
use crate::session::{HistoryEntry, SessionState};

/// Momentum saturation bounds.
pub const MOMENTUM_MAX: f64 = 2.0;
pub const MOMENTUM_MIN: f64 = -2.0;

/// Rolling window the transition rules read.
const RULE_WINDOW: usize = 3;

/// Transition rules stay off until the rolling window is fully populated.
const MIN_ANSWERS_FOR_TRANSITION: usize = 3;

/// A level transition applied while recording an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelChange {
    Promoted(Level),
    Demoted(Level),
}

/// Fold one answer into the session state and apply at most one level
/// transition.
///
/// Order is fixed: history append, window push, momentum/streak update,
/// cooldown gate, then the transition rules in strict priority order with
/// first match winning.
pub fn record_answer(
    state: &mut SessionState,
    config: &EngineConfig,
    entry: HistoryEntry,
) -> Option<LevelChange> {
    let correct = entry.correct;
    state.question_history.push(entry);
    state.push_window(correct);

    if correct {
        state.level_momentum = (state.level_momentum + config.momentum_gain).min(MOMENTUM_MAX);
        state.consecutive_successes += 1;
    } else {
        state.level_momentum = (state.level_momentum - config.momentum_loss).max(MOMENTUM_MIN);
        state.consecutive_successes = 0;
    }

    // The cooldown is a hard gate above every rule below.
    if state.level_change_cooldown > 0 {
        state.level_change_cooldown -= 1;
        return None;
    }

    if state.answers_recorded() < MIN_ANSWERS_FOR_TRANSITION {
        return None;
    }

    let accuracy = state.rolling_accuracy(RULE_WINDOW);
    let momentum = state.level_momentum;
    let streak = state.consecutive_successes;
    let level = state.current_level;
    let answered = state.answers_recorded();

    if accuracy >= 0.9 && momentum > 1.5 && streak >= 4 && level < Level::MAX {
        return Some(promote(state, config, config.level_change_cooldown));
    }

    if accuracy >= 0.75 && momentum > 0.8 && streak >= 3 && level < Level::MAX {
        return Some(promote(state, config, config.level_change_cooldown));
    }

    // Early ceiling assist: a strong level-4 run early in the session gets a
    // cheaper jump to the ceiling (shorter cooldown).
    if accuracy >= 0.85
        && momentum > 1.0
        && level.value() == 4
        && answered <= 10
        && streak >= 2
    {
        return Some(promote(state, config, 1));
    }

    if accuracy <= 0.3 && momentum < -0.8 && level > Level::MIN {
        if level == Level::MAX {
            // Leaving the ceiling takes sustained failure, not one slip.
            let sustained = streak == 0 && state.incorrect_in_last(4) >= 3;
            if !sustained {
                return None;
            }
        }
        return Some(demote(state, config));
    }

    None
}

fn promote(state: &mut SessionState, config: &EngineConfig, cooldown: u8) -> LevelChange {
    state.current_level = state.current_level.up();
    state.level_change_cooldown = cooldown;
    state.level_momentum *= config.momentum_decay;
    tracing::debug!(
        level = %state.current_level,
        momentum = state.level_momentum,
        cooldown,
        "level up"
    );
    LevelChange::Promoted(state.current_level)
}

fn demote(state: &mut SessionState, config: &EngineConfig) -> LevelChange {
    state.current_level = state.current_level.down();
    state.level_change_cooldown = config.level_change_cooldown;
    state.level_momentum *= config.momentum_decay;
    tracing::debug!(
        level = %state.current_level,
        momentum = state.level_momentum,
        "level down"
    );
    LevelChange::Demoted(state.current_level)
}
