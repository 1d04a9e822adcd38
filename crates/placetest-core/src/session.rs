//! Mutable session state owned by the orchestrator.
//!
//! All adaptive bookkeeping lives in one explicit [`SessionState`] value:
//! there is no ambient session storage, and the state is only ever mutated
//! through the orchestrator's two operations.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::model::{Level, Mechanic};

/// Rolling correctness window capacity.
pub const WINDOW_CAPACITY: usize = 5;

/// Recent-mechanics diversity window capacity.
pub const RECENT_MECHANICS_CAPACITY: usize = 5;

/// Number of fixed-level calibration servings before adaptive selection.
pub const CALIBRATION_STEPS: u8 = 3;

/// One answered question in the permanent session record.
///
/// Carries the enrichment the scorer needs; the raw answer value is never
/// retained past the turn it was given in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Identifier of the answered question.
    pub question_id: String,
    /// Whether the answer was correct.
    pub correct: bool,
    /// The tracker's level when the answer was recorded.
    pub level: Level,
    /// The pool level the question was served from.
    pub assigned_level: Level,
    /// The question's interaction type.
    pub mechanic: Mechanic,
    /// The question's skill tag.
    pub skill: String,
    /// Grammar point, when the question targets one.
    pub grammar_point: Option<String>,
}

/// The adaptive state of one placement-test session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Current difficulty tier, always within 0-5. Sessions start at 1.
    pub current_level: Level,
    /// Last answers, newest at the back, at most [`WINDOW_CAPACITY`].
    pub performance_window: VecDeque<bool>,
    /// Identifiers already served this session; never served twice.
    pub used_question_ids: HashSet<String>,
    /// Mechanics of recent servings, for diversity only.
    pub recent_mechanics: VecDeque<Mechanic>,
    /// The permanent, append-only record; basis for final scoring.
    pub question_history: Vec<HistoryEntry>,
    /// Calibration servings so far, 0 through [`CALIBRATION_STEPS`].
    pub calibration_count: u8,
    /// Latches true once calibration ends; never resets within a session.
    pub calibration_complete: bool,
    /// Directional performance trend in [-2.0, 2.0].
    pub level_momentum: f64,
    /// Correct answers since the last incorrect one.
    pub consecutive_successes: u32,
    /// While positive, level transitions are suppressed.
    pub level_change_cooldown: u8,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Fresh state for a new session, starting at level 1.
    pub fn new() -> Self {
        Self {
            current_level: Level::new(1).expect("1 is a valid level"),
            performance_window: VecDeque::with_capacity(WINDOW_CAPACITY),
            used_question_ids: HashSet::new(),
            recent_mechanics: VecDeque::with_capacity(RECENT_MECHANICS_CAPACITY),
            question_history: Vec::new(),
            calibration_count: 0,
            calibration_complete: false,
            level_momentum: 0.0,
            consecutive_successes: 0,
            level_change_cooldown: 0,
        }
    }

    /// Total answers recorded so far.
    pub fn answers_recorded(&self) -> usize {
        self.question_history.len()
    }

    /// Accuracy over the last `n` window entries (or fewer early on).
    /// 0.0 when nothing has been answered yet.
    pub fn rolling_accuracy(&self, n: usize) -> f64 {
        let take = n.min(self.performance_window.len());
        if take == 0 {
            return 0.0;
        }
        let correct = self
            .performance_window
            .iter()
            .rev()
            .take(take)
            .filter(|&&c| c)
            .count();
        correct as f64 / take as f64
    }

    /// Accuracy over the whole session history. 0.0 when empty.
    pub fn overall_accuracy(&self) -> f64 {
        if self.question_history.is_empty() {
            return 0.0;
        }
        let correct = self.question_history.iter().filter(|h| h.correct).count();
        correct as f64 / self.question_history.len() as f64
    }

    /// Incorrect answers among the last `n` window entries.
    pub fn incorrect_in_last(&self, n: usize) -> usize {
        self.performance_window
            .iter()
            .rev()
            .take(n)
            .filter(|&&c| !c)
            .count()
    }

    /// The `n` most recently served mechanics, newest first.
    pub fn last_mechanics(&self, n: usize) -> Vec<Mechanic> {
        self.recent_mechanics.iter().rev().take(n).copied().collect()
    }

    /// Push an answer into the rolling window, evicting the oldest past
    /// capacity.
    pub fn push_window(&mut self, correct: bool) {
        self.performance_window.push_back(correct);
        while self.performance_window.len() > WINDOW_CAPACITY {
            self.performance_window.pop_front();
        }
    }

    /// Note a served mechanic in the diversity window.
    pub fn note_mechanic(&mut self, mechanic: Mechanic) {
        self.recent_mechanics.push_back(mechanic);
        while self.recent_mechanics.len() > RECENT_MECHANICS_CAPACITY {
            self.recent_mechanics.pop_front();
        }
    }
}

/// A side-effect-free snapshot of where the session currently stands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelEstimate {
    /// The tracker's current level.
    pub level: Level,
    /// Confidence in the estimate, 0.0-1.0, growing with answers seen.
    pub confidence: f64,
    /// Overall accuracy so far.
    pub accuracy: f64,
    /// Answers recorded so far.
    pub questions_answered: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(correct: bool) -> HistoryEntry {
        HistoryEntry {
            question_id: "q".into(),
            correct,
            level: Level::new(1).unwrap(),
            assigned_level: Level::new(1).unwrap(),
            mechanic: Mechanic::WordPronunciation,
            skill: "Pronunciation".into(),
            grammar_point: None,
        }
    }

    #[test]
    fn window_evicts_beyond_capacity() {
        let mut state = SessionState::new();
        for i in 0..8 {
            state.push_window(i % 2 == 0);
            assert_eq!(state.performance_window.len(), (i + 1).min(WINDOW_CAPACITY));
        }
    }

    #[test]
    fn rolling_accuracy_uses_newest_entries() {
        let mut state = SessionState::new();
        for correct in [false, false, true, true, true] {
            state.push_window(correct);
        }
        assert!((state.rolling_accuracy(3) - 1.0).abs() < f64::EPSILON);
        assert!((state.rolling_accuracy(5) - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn rolling_accuracy_handles_short_windows() {
        let mut state = SessionState::new();
        assert_eq!(state.rolling_accuracy(3), 0.0);
        state.push_window(true);
        assert!((state.rolling_accuracy(3) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn overall_accuracy_from_history() {
        let mut state = SessionState::new();
        state.question_history.push(entry(true));
        state.question_history.push(entry(false));
        assert!((state.overall_accuracy() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn recent_mechanics_bounded() {
        let mut state = SessionState::new();
        for _ in 0..7 {
            state.note_mechanic(Mechanic::SentenceScramble);
        }
        assert_eq!(state.recent_mechanics.len(), RECENT_MECHANICS_CAPACITY);
        assert_eq!(
            state.last_mechanics(2),
            vec![Mechanic::SentenceScramble, Mechanic::SentenceScramble]
        );
    }
}
