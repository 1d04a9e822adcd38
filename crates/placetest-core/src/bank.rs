//! Question bank loading and validation.
//!
//! A bank is a JSON object mapping level keys ("0" through "5") to arrays of
//! question records. Loaded once before a session begins and read-only
//! thereafter.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use crate::error::BankError;
use crate::model::{available_mechanics, Level, Question, QuestionBody};

/// An immutable, pre-loaded question bank keyed by level.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    levels: BTreeMap<Level, Vec<Question>>,
}

impl QuestionBank {
    /// Load a bank from a JSON file. Fatal on I/O or format errors.
    pub fn load(path: &Path) -> Result<Self, BankError> {
        let content = std::fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content).map_err(|e| match e {
            BankError::Malformed { source, .. } => BankError::Malformed {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    /// Parse a bank from a JSON string (useful for tests and embedded banks).
    pub fn from_json(content: &str) -> Result<Self, BankError> {
        let raw: HashMap<String, Vec<Question>> =
            serde_json::from_str(content).map_err(|source| BankError::Malformed {
                path: "<inline>".to_string(),
                source,
            })?;

        let mut levels: BTreeMap<Level, Vec<Question>> = BTreeMap::new();
        for (key, questions) in raw {
            let level = key
                .parse::<u8>()
                .ok()
                .and_then(Level::new)
                .ok_or(BankError::InvalidLevelKey { key })?;
            levels.insert(level, questions);
        }
        Self::from_levels(levels)
    }

    /// Build a bank from already-grouped questions, normalizing authored
    /// levels and rejecting structurally broken records.
    pub fn from_levels(
        mut levels: BTreeMap<Level, Vec<Question>>,
    ) -> Result<Self, BankError> {
        for (&bucket, questions) in &mut levels {
            for question in questions.iter_mut() {
                match question.level {
                    None => question.level = Some(bucket),
                    Some(authored) if authored != bucket => {
                        return Err(BankError::LevelMismatch {
                            id: question.id.clone(),
                            authored: authored.value(),
                            bucket: bucket.value(),
                        });
                    }
                    Some(_) => {}
                }
                check_answer_references(question)?;
            }
        }

        if levels.values().all(Vec::is_empty) {
            return Err(BankError::Empty);
        }

        Ok(Self { levels })
    }

    /// Questions authored at the given level.
    pub fn questions_at(&self, level: Level) -> &[Question] {
        self.levels.get(&level).map_or(&[], Vec::as_slice)
    }

    /// Levels that have at least one question.
    pub fn levels(&self) -> impl Iterator<Item = Level> + '_ {
        self.levels
            .iter()
            .filter(|(_, qs)| !qs.is_empty())
            .map(|(&l, _)| l)
    }

    /// Total question count across all levels.
    pub fn len(&self) -> usize {
        self.levels.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Structural checks that make a question unusable: hard load errors.
fn check_answer_references(question: &Question) -> Result<(), BankError> {
    let ok = match &question.body {
        QuestionBody::MultipleChoiceText {
            options,
            correct_answer,
            ..
        }
        | QuestionBody::ImageChoiceFromTexts {
            options,
            correct_answer,
            ..
        } => *correct_answer < options.len(),
        QuestionBody::AudioChoiceFromImages {
            image_options,
            correct_answer,
            ..
        } => *correct_answer < image_options.len(),
        QuestionBody::SentenceScramble {
            word_options,
            correct_order,
            ..
        } => {
            !correct_order.is_empty() && correct_order.iter().all(|&i| i < word_options.len())
        }
        QuestionBody::AudioCategorySorting {
            items,
            categories,
            correct_categories,
        } => {
            !items.is_empty()
                && correct_categories.len() == items.len()
                && correct_categories.iter().all(|&i| i < categories.len())
        }
        QuestionBody::WordPronunciation { .. } | QuestionBody::SentencePronunciation { .. } => {
            true
        }
    };

    if ok {
        Ok(())
    } else {
        Err(BankError::AnswerOutOfRange {
            id: question.id.clone(),
        })
    }
}

/// A non-fatal issue found while validating a bank.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question concerned, when the issue is question-specific.
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a bank for issues that degrade a session without breaking it.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate ids would collide with the used-question set.
    let mut seen = HashSet::new();
    for level in Level::all() {
        for question in bank.questions_at(level) {
            if !seen.insert(question.id.clone()) {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: format!("duplicate question id: {}", question.id),
                });
            }
        }
    }

    // A question whose mechanic is not served at its own level can only ever
    // be reached through pool expansion from below.
    for level in Level::all() {
        for question in bank.questions_at(level) {
            if !available_mechanics(level).contains(&question.mechanic()) {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: format!(
                        "mechanic {} is not offered at level {level}",
                        question.mechanic()
                    ),
                });
            }
        }
    }

    // Empty buckets starve calibration and narrow the adaptive pool.
    for level in Level::all() {
        if bank.questions_at(level).is_empty() {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!("no questions at level {level}"),
            });
        }
    }

    warnings
}
