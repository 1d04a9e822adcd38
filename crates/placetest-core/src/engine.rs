//! The session orchestrator.
//!
//! [`AdaptiveEngine`] composes the selection policy and the performance
//! tracker into one stateful object with two operations: get the next
//! question, and record an answer outcome. The surrounding presentation
//! loop owns everything else, including when to stop.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bank::QuestionBank;
use crate::model::{Level, ServedQuestion};
use crate::selection;
use crate::session::{HistoryEntry, LevelEstimate, SessionState, CALIBRATION_STEPS};
use crate::tracker;

/// Tunables for the adaptive engine. Defaults match the shipped behavior.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Nominal session length; the caller stops at this count, the engine
    /// only uses it for the estimate denominator and the end-of-test push.
    pub questions_per_test: usize,
    /// Below this many answers the level pool stays at immediate neighbors.
    pub early_session_threshold: usize,
    /// Maximum upward/downward pool extension distance.
    pub max_pool_extension: u8,
    /// Turns to suppress level changes after one occurs.
    pub level_change_cooldown: u8,
    /// Cap on candidates contributed per pool level each turn.
    pub per_level_candidate_cap: usize,
    /// Momentum added per correct answer.
    pub momentum_gain: f64,
    /// Momentum removed per incorrect answer.
    pub momentum_loss: f64,
    /// Multiplicative momentum decay after a level change.
    pub momentum_decay: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            questions_per_test: 15,
            early_session_threshold: 5,
            max_pool_extension: 2,
            level_change_cooldown: 2,
            per_level_candidate_cap: 5,
            momentum_gain: 0.3,
            momentum_loss: 0.5,
            momentum_decay: 0.7,
        }
    }
}

/// One placement-test session: bank + state + policy, behind two operations.
pub struct AdaptiveEngine {
    bank: QuestionBank,
    config: EngineConfig,
    state: SessionState,
    rng: StdRng,
    /// The serving awaiting an answer, kept so the answer can be folded back
    /// with its skill/mechanic enrichment.
    outstanding: Option<ServedQuestion>,
}

impl AdaptiveEngine {
    /// New session with OS-seeded randomness.
    pub fn new(bank: QuestionBank, config: EngineConfig) -> Self {
        Self::from_rng(bank, config, StdRng::from_entropy())
    }

    /// New session with deterministic randomness, for tests and replays.
    pub fn with_seed(bank: QuestionBank, config: EngineConfig, seed: u64) -> Self {
        Self::from_rng(bank, config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(bank: QuestionBank, config: EngineConfig, rng: StdRng) -> Self {
        Self {
            bank,
            config,
            state: SessionState::new(),
            rng,
            outstanding: None,
        }
    }

    /// The next question to present, or `None` when the bank has nothing
    /// left to offer — the caller must treat `None` as session completion.
    pub fn next_question(&mut self) -> Option<ServedQuestion> {
        if let Some(unanswered) = &self.outstanding {
            tracing::warn!(
                question_id = unanswered.id(),
                "serving a new question while one is still unanswered"
            );
        }

        let selection =
            selection::next_question(&self.state, &self.bank, &self.config, &mut self.rng)?;

        // Apply the selection delta atomically.
        let served = selection.question;
        self.state.used_question_ids.insert(served.id().to_string());
        self.state.note_mechanic(served.mechanic());
        if served.calibration {
            self.state.calibration_count += 1;
            if self.state.calibration_count >= CALIBRATION_STEPS {
                self.state.calibration_complete = true;
            }
        }
        if selection.calibration_degraded {
            self.state.calibration_complete = true;
        }

        self.outstanding = Some(served.clone());
        Some(served)
    }

    /// Record the outcome of the outstanding question.
    ///
    /// Must be called exactly once per served question, in the order served.
    /// Answers that do not match the outstanding serving are logged and
    /// ignored; a misbehaving driver must not corrupt session state.
    pub fn record_answer(&mut self, question_id: &str, correct: bool) {
        let Some(served) = self.outstanding.take() else {
            tracing::warn!(question_id, "answer recorded with no outstanding question");
            return;
        };
        if served.id() != question_id {
            tracing::warn!(
                expected = served.id(),
                got = question_id,
                "answer does not match the outstanding question"
            );
            self.outstanding = Some(served);
            return;
        }

        let entry = HistoryEntry {
            question_id: served.id().to_string(),
            correct,
            level: self.state.current_level,
            assigned_level: served.assigned_level,
            mechanic: served.mechanic(),
            skill: served.question.skill.clone(),
            grammar_point: served.question.grammar_point.clone(),
        };
        tracker::record_answer(&mut self.state, &self.config, entry);
    }

    /// Current estimate; side-effect free and callable mid-session.
    pub fn estimated_level(&self) -> LevelEstimate {
        let answered = self.state.answers_recorded();
        let accuracy = self.state.overall_accuracy();
        let confidence =
            (answered as f64 / self.config.questions_per_test as f64).min(1.0) * accuracy;
        LevelEstimate {
            level: self.state.current_level,
            confidence,
            accuracy,
            questions_answered: answered,
        }
    }

    /// The tracker's current level.
    pub fn current_level(&self) -> Level {
        self.state.current_level
    }

    /// The full session state, read-only.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The permanent answer record so far.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.state.question_history
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
