//! A simulated test-taker.
//!
//! Stands in for the out-of-scope presentation layer: given a served
//! question, produces a raw answer whose correctness tracks the distance
//! between the student's true ability and the level the question was served
//! at. Seedable so whole sessions replay deterministically.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use placetest_core::answer::{RawAnswer, SelfAssessment, VerdictProvider};
use placetest_core::model::{QuestionBody, ServedQuestion};

/// Probability of answering correctly when the question matches ability.
const BASE_ACCURACY: f64 = 0.9;

/// Accuracy lost per level the question sits above the student's ability.
const SLOPE_PER_LEVEL: f64 = 0.25;

/// A scripted student with a fixed true ability level.
pub struct SimulatedStudent {
    ability: f64,
    rng: StdRng,
    verdicts: SelfAssessment,
}

impl SimulatedStudent {
    pub fn new(ability: f64, seed: u64) -> Self {
        Self {
            ability: ability.clamp(0.0, 5.0),
            rng: StdRng::seed_from_u64(seed),
            verdicts: SelfAssessment,
        }
    }

    /// Whether this student would answer a question at `level` correctly.
    fn decide(&mut self, level: f64) -> bool {
        let p = (BASE_ACCURACY - SLOPE_PER_LEVEL * (level - self.ability)).clamp(0.05, 0.95);
        self.rng.gen_bool(p)
    }

    /// Produce a raw answer for the served question.
    pub fn answer(&mut self, served: &ServedQuestion) -> RawAnswer {
        let intend_correct = self.decide(served.assigned_level.value() as f64);

        match &served.question.body {
            QuestionBody::MultipleChoiceText {
                options,
                correct_answer,
                ..
            }
            | QuestionBody::ImageChoiceFromTexts {
                options,
                correct_answer,
                ..
            } => RawAnswer::Choice(self.pick_index(*correct_answer, options.len(), intend_correct)),

            QuestionBody::AudioChoiceFromImages {
                image_options,
                correct_answer,
                ..
            } => RawAnswer::Choice(self.pick_index(
                *correct_answer,
                image_options.len(),
                intend_correct,
            )),

            QuestionBody::WordPronunciation { target_word, .. } => {
                RawAnswer::SelfAssessed(self.verdicts.assess(target_word, intend_correct))
            }
            QuestionBody::SentencePronunciation {
                target_sentence, ..
            } => RawAnswer::SelfAssessed(self.verdicts.assess(target_sentence, intend_correct)),

            QuestionBody::SentenceScramble { correct_order, .. } => {
                if intend_correct {
                    RawAnswer::Ordering(correct_order.clone())
                } else {
                    let mut wrong = correct_order.clone();
                    wrong.reverse();
                    if wrong == *correct_order {
                        // A palindromic order cannot be answered wrongly by
                        // reversal; drop the last tile instead.
                        wrong.pop();
                    }
                    RawAnswer::Ordering(wrong)
                }
            }

            QuestionBody::AudioCategorySorting {
                categories,
                correct_categories,
                ..
            } => {
                if intend_correct {
                    RawAnswer::Sorting(correct_categories.clone())
                } else {
                    // Misplace every item one category over.
                    let shifted = correct_categories
                        .iter()
                        .map(|&c| (c + 1) % categories.len().max(1))
                        .collect();
                    RawAnswer::Sorting(shifted)
                }
            }
        }
    }

    fn pick_index(&mut self, correct: usize, len: usize, intend_correct: bool) -> usize {
        if intend_correct || len <= 1 {
            return correct;
        }
        let mut wrong = self.rng.gen_range(0..len);
        if wrong == correct {
            wrong = (wrong + 1) % len;
        }
        wrong
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placetest_core::answer::check_answer;
    use placetest_core::model::{Level, Question, QuestionBody};

    fn served(body: QuestionBody, level: u8) -> ServedQuestion {
        ServedQuestion {
            question: Question {
                id: "q".into(),
                level: None,
                skill: String::new(),
                grammar_point: None,
                topic: None,
                difficulty: None,
                body,
            },
            assigned_level: Level::new(level).unwrap(),
            calibration: false,
        }
    }

    #[test]
    fn strong_student_answers_easy_questions_mostly_right() {
        let mut student = SimulatedStudent::new(5.0, 1);
        let question = served(
            QuestionBody::MultipleChoiceText {
                sentence: "I ___ a student.".into(),
                options: vec!["am".into(), "is".into(), "are".into()],
                correct_answer: 0,
            },
            0,
        );

        let correct = (0..100)
            .filter(|_| check_answer(&question.question, &student.answer(&question)))
            .count();
        assert!(correct > 80, "got {correct}/100");
    }

    #[test]
    fn weak_student_struggles_at_the_ceiling() {
        let mut student = SimulatedStudent::new(0.0, 2);
        let question = served(
            QuestionBody::MultipleChoiceText {
                sentence: "Hardly ___ the door when the phone rang.".into(),
                options: vec!["had I closed".into(), "I had closed".into()],
                correct_answer: 0,
            },
            5,
        );

        let correct = (0..100)
            .filter(|_| check_answer(&question.question, &student.answer(&question)))
            .count();
        assert!(correct < 30, "got {correct}/100");
    }

    #[test]
    fn wrong_answers_are_actually_wrong_per_mechanic() {
        // Ability 0 at level 5 means almost every intent is incorrect; the
        // produced raw answers must fail the checker.
        let mut student = SimulatedStudent::new(0.0, 3);

        let scramble = served(
            QuestionBody::SentenceScramble {
                sentence_template: "I ___ to ___".into(),
                word_options: vec!["go".into(), "school".into(), "went".into()],
                correct_order: vec![0, 1],
            },
            5,
        );
        let sorting = served(
            QuestionBody::AudioCategorySorting {
                items: vec!["dog".into(), "apple".into(), "cat".into()],
                categories: vec!["animals".into(), "food".into()],
                correct_categories: vec![0, 1, 0],
            },
            5,
        );

        let mut wrong_seen = 0;
        for _ in 0..50 {
            if !check_answer(&scramble.question, &student.answer(&scramble)) {
                wrong_seen += 1;
            }
            if !check_answer(&sorting.question, &student.answer(&sorting)) {
                wrong_seen += 1;
            }
        }
        assert!(wrong_seen > 60, "got {wrong_seen}/100 wrong");
    }

    #[test]
    fn sessions_replay_with_the_same_seed() {
        let question = served(
            QuestionBody::ImageChoiceFromTexts {
                image_description: "Red round fruit".into(),
                options: vec!["apple".into(), "banana".into(), "plum".into()],
                correct_answer: 0,
            },
            3,
        );
        let run = |seed| {
            let mut student = SimulatedStudent::new(2.0, seed);
            (0..20).map(|_| student.answer(&question)).collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }
}
