//! Answer correctness checking.
//!
//! The presentation layer captures a raw answer value; this module reduces
//! it to the single boolean the tracker consumes. Pronunciation mechanics
//! are self-assessed: the reported boolean *is* the verdict, a deliberate
//! simplification while objective speech assessment stays out of scope.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::model::{Question, QuestionBody};

/// Fraction of correctly sorted items required for a sorting answer to
/// count as correct overall.
pub const SORTING_LENIENCY: f64 = 0.6;

/// A raw answer value as captured by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RawAnswer {
    /// Index of the chosen option.
    Choice(usize),
    /// The test-taker's own pronunciation verdict.
    SelfAssessed(bool),
    /// Word-tile indexes in the submitted order.
    Ordering(Vec<usize>),
    /// Category index chosen for each item, parallel to the item list.
    Sorting(Vec<usize>),
}

/// Decide whether a raw answer is correct for the given question.
///
/// An answer whose shape does not match the question's mechanic is simply
/// incorrect.
pub fn check_answer(question: &Question, answer: &RawAnswer) -> bool {
    match (&question.body, answer) {
        (
            QuestionBody::MultipleChoiceText { correct_answer, .. }
            | QuestionBody::ImageChoiceFromTexts { correct_answer, .. }
            | QuestionBody::AudioChoiceFromImages { correct_answer, .. },
            RawAnswer::Choice(chosen),
        ) => chosen == correct_answer,

        (
            QuestionBody::WordPronunciation { .. } | QuestionBody::SentencePronunciation { .. },
            RawAnswer::SelfAssessed(verdict),
        ) => *verdict,

        (
            QuestionBody::SentenceScramble { correct_order, .. },
            RawAnswer::Ordering(submitted),
        ) => submitted == correct_order,

        (
            QuestionBody::AudioCategorySorting {
                correct_categories, ..
            },
            RawAnswer::Sorting(submitted),
        ) => {
            if correct_categories.is_empty() {
                return false;
            }
            let matched = correct_categories
                .iter()
                .zip(submitted)
                .filter(|(expected, got)| expected == got)
                .count();
            matched as f64 / correct_categories.len() as f64 >= SORTING_LENIENCY
        }

        _ => false,
    }
}

/// Source of pronunciation verdicts.
///
/// The engine only ever consumes the boolean, so swapping a self-assessment
/// flow for a real speech-recognition backend needs no core change.
pub trait VerdictProvider {
    /// Resolve a pronunciation attempt into a pass/fail verdict.
    ///
    /// `self_report` is what the test-taker claimed about their own attempt.
    fn assess(&mut self, target: &str, self_report: bool) -> bool;
}

/// The shipped behavior: the test-taker's claim is the verdict.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfAssessment;

impl VerdictProvider for SelfAssessment {
    fn assess(&mut self, _target: &str, self_report: bool) -> bool {
        self_report
    }
}

/// A stand-in recognizer that passes attempts at a fixed rate, for demos
/// and simulation.
#[derive(Debug)]
pub struct SimulatedRecognition {
    success_rate: f64,
    rng: StdRng,
}

impl SimulatedRecognition {
    pub fn new(success_rate: f64, seed: u64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl VerdictProvider for SimulatedRecognition {
    fn assess(&mut self, _target: &str, _self_report: bool) -> bool {
        self.rng.gen_bool(self.success_rate)
    }
}
