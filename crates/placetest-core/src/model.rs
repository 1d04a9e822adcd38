//! Core data model types for placetest.
//!
//! These are the fundamental types the entire placetest system uses to
//! represent difficulty levels, question mechanics, and question records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A difficulty tier, 0 through 5, loosely mapped to CEFR pre-A1 through B2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    /// The lowest tier (pre-A1).
    pub const MIN: Level = Level(0);
    /// The highest tier (B2).
    pub const MAX: Level = Level(5);

    /// Create a level, rejecting values above 5.
    pub fn new(value: u8) -> Option<Level> {
        (value <= Self::MAX.0).then_some(Level(value))
    }

    /// The raw tier value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// One tier up, saturating at 5.
    pub fn up(self) -> Level {
        Level((self.0 + 1).min(Self::MAX.0))
    }

    /// One tier down, saturating at 0.
    pub fn down(self) -> Level {
        Level(self.0.saturating_sub(1))
    }

    /// The CEFR label for this tier.
    pub fn cefr(self) -> &'static str {
        match self.0 {
            0 => "pre-A1",
            1 => "A1",
            2 => "A1+",
            3 => "A2",
            4 => "B1",
            _ => "B2",
        }
    }

    /// All six tiers in ascending order.
    pub fn all() -> impl Iterator<Item = Level> {
        (Self::MIN.0..=Self::MAX.0).map(Level)
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Level::new(value).ok_or_else(|| format!("level out of range 0-5: {value}"))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The interaction type of a question.
///
/// Wire names match the original question-bank format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mechanic {
    #[serde(rename = "word-pronunciation-practice")]
    WordPronunciation,
    #[serde(rename = "audio-single-choice-from-images")]
    AudioChoiceFromImages,
    #[serde(rename = "sentence-pronunciation-practice")]
    SentencePronunciation,
    #[serde(rename = "audio-category-sorting")]
    AudioCategorySorting,
    #[serde(rename = "image-single-choice-from-texts")]
    ImageChoiceFromTexts,
    #[serde(rename = "sentence-scramble")]
    SentenceScramble,
    #[serde(rename = "multiple-choice-text-text")]
    MultipleChoiceText,
}

impl Mechanic {
    /// Which half of the audio/text partition this mechanic belongs to.
    pub fn category(self) -> MechanicCategory {
        match self {
            Mechanic::WordPronunciation
            | Mechanic::AudioChoiceFromImages
            | Mechanic::SentencePronunciation
            | Mechanic::AudioCategorySorting => MechanicCategory::Audio,
            Mechanic::ImageChoiceFromTexts
            | Mechanic::SentenceScramble
            | Mechanic::MultipleChoiceText => MechanicCategory::Text,
        }
    }

    /// A short human-readable label for tables and logs.
    pub fn label(self) -> &'static str {
        match self {
            Mechanic::WordPronunciation => "Word Pronunciation",
            Mechanic::AudioChoiceFromImages => "Listening Choice",
            Mechanic::SentencePronunciation => "Sentence Pronunciation",
            Mechanic::AudioCategorySorting => "Audio Sorting",
            Mechanic::ImageChoiceFromTexts => "Picture Vocabulary",
            Mechanic::SentenceScramble => "Sentence Scramble",
            Mechanic::MultipleChoiceText => "Grammar Choice",
        }
    }
}

impl fmt::Display for Mechanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mechanic::WordPronunciation => "word-pronunciation-practice",
            Mechanic::AudioChoiceFromImages => "audio-single-choice-from-images",
            Mechanic::SentencePronunciation => "sentence-pronunciation-practice",
            Mechanic::AudioCategorySorting => "audio-category-sorting",
            Mechanic::ImageChoiceFromTexts => "image-single-choice-from-texts",
            Mechanic::SentenceScramble => "sentence-scramble",
            Mechanic::MultipleChoiceText => "multiple-choice-text-text",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Mechanic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "word-pronunciation-practice" => Ok(Mechanic::WordPronunciation),
            "audio-single-choice-from-images" => Ok(Mechanic::AudioChoiceFromImages),
            "sentence-pronunciation-practice" => Ok(Mechanic::SentencePronunciation),
            "audio-category-sorting" => Ok(Mechanic::AudioCategorySorting),
            "image-single-choice-from-texts" => Ok(Mechanic::ImageChoiceFromTexts),
            "sentence-scramble" => Ok(Mechanic::SentenceScramble),
            "multiple-choice-text-text" => Ok(Mechanic::MultipleChoiceText),
            other => Err(format!("unknown mechanic: {other}")),
        }
    }
}

/// The audio/text partition used for turn-by-turn selection balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MechanicCategory {
    Audio,
    Text,
}

impl MechanicCategory {
    /// The opposite category, for the single retry after an empty pool.
    pub fn other(self) -> MechanicCategory {
        match self {
            MechanicCategory::Audio => MechanicCategory::Text,
            MechanicCategory::Text => MechanicCategory::Audio,
        }
    }
}

/// Mechanics available at each level.
///
/// Level 0 offers only the audio mechanics; reading-based mechanics unlock
/// at level 1 and grammar multiple-choice at level 2.
pub fn available_mechanics(level: Level) -> &'static [Mechanic] {
    const LEVEL_0: &[Mechanic] = &[
        Mechanic::WordPronunciation,
        Mechanic::AudioChoiceFromImages,
        Mechanic::SentencePronunciation,
        Mechanic::AudioCategorySorting,
    ];
    const LEVEL_1: &[Mechanic] = &[
        Mechanic::WordPronunciation,
        Mechanic::AudioChoiceFromImages,
        Mechanic::SentencePronunciation,
        Mechanic::AudioCategorySorting,
        Mechanic::ImageChoiceFromTexts,
        Mechanic::SentenceScramble,
    ];
    const LEVEL_2_PLUS: &[Mechanic] = &[
        Mechanic::WordPronunciation,
        Mechanic::AudioChoiceFromImages,
        Mechanic::SentencePronunciation,
        Mechanic::AudioCategorySorting,
        Mechanic::ImageChoiceFromTexts,
        Mechanic::SentenceScramble,
        Mechanic::MultipleChoiceText,
    ];

    match level.value() {
        0 => LEVEL_0,
        1 => LEVEL_1,
        _ => LEVEL_2_PLUS,
    }
}

/// The mechanic-specific payload of a question.
///
/// Internally tagged on `mechanic` so bank files keep the original flat
/// JSON format with the payload fields alongside `id` and `skill`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mechanic")]
pub enum QuestionBody {
    /// Fill-in-the-blank grammar question with one correct option.
    #[serde(rename = "multiple-choice-text-text")]
    MultipleChoiceText {
        sentence: String,
        options: Vec<String>,
        correct_answer: usize,
    },
    /// Say a single word aloud; correctness is self-assessed.
    #[serde(rename = "word-pronunciation-practice")]
    WordPronunciation {
        target_word: String,
        #[serde(default)]
        phonetic: String,
        #[serde(default)]
        image_description: String,
    },
    /// Pick the text matching a shown image.
    #[serde(rename = "image-single-choice-from-texts")]
    ImageChoiceFromTexts {
        image_description: String,
        options: Vec<String>,
        correct_answer: usize,
    },
    /// Hear a word, pick the matching image.
    #[serde(rename = "audio-single-choice-from-images")]
    AudioChoiceFromImages {
        target_audio: String,
        image_options: Vec<String>,
        correct_answer: usize,
    },
    /// Say a full sentence aloud; correctness is self-assessed.
    #[serde(rename = "sentence-pronunciation-practice")]
    SentencePronunciation {
        target_sentence: String,
        #[serde(default)]
        phonetic: String,
        #[serde(default)]
        image_description: String,
    },
    /// Arrange word tiles into the template slots in the right order.
    #[serde(rename = "sentence-scramble")]
    SentenceScramble {
        sentence_template: String,
        word_options: Vec<String>,
        correct_order: Vec<usize>,
    },
    /// Hear a list of words and drop each into its category bucket.
    ///
    /// `correct_categories[i]` is the index into `categories` for `items[i]`.
    #[serde(rename = "audio-category-sorting")]
    AudioCategorySorting {
        items: Vec<String>,
        categories: Vec<String>,
        correct_categories: Vec<usize>,
    },
}

impl QuestionBody {
    /// The mechanic tag of this payload.
    pub fn mechanic(&self) -> Mechanic {
        match self {
            QuestionBody::MultipleChoiceText { .. } => Mechanic::MultipleChoiceText,
            QuestionBody::WordPronunciation { .. } => Mechanic::WordPronunciation,
            QuestionBody::ImageChoiceFromTexts { .. } => Mechanic::ImageChoiceFromTexts,
            QuestionBody::AudioChoiceFromImages { .. } => Mechanic::AudioChoiceFromImages,
            QuestionBody::SentencePronunciation { .. } => Mechanic::SentencePronunciation,
            QuestionBody::SentenceScramble { .. } => Mechanic::SentenceScramble,
            QuestionBody::AudioCategorySorting { .. } => Mechanic::AudioCategorySorting,
        }
    }

    /// The text a presentation layer would lead with, for logs and reports.
    pub fn prompt_text(&self) -> &str {
        match self {
            QuestionBody::MultipleChoiceText { sentence, .. } => sentence,
            QuestionBody::WordPronunciation { target_word, .. } => target_word,
            QuestionBody::ImageChoiceFromTexts {
                image_description, ..
            } => image_description,
            QuestionBody::AudioChoiceFromImages { target_audio, .. } => target_audio,
            QuestionBody::SentencePronunciation {
                target_sentence, ..
            } => target_sentence,
            QuestionBody::SentenceScramble {
                sentence_template, ..
            } => sentence_template,
            QuestionBody::AudioCategorySorting { .. } => "sort the words you hear",
        }
    }
}

/// A single placement-test question.
///
/// Created once at bank-load time and never mutated; the level a question
/// was actually served at lives on [`ServedQuestion`], not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the bank.
    pub id: String,
    /// Authored level; filled from the bank bucket when omitted in the file.
    #[serde(default)]
    pub level: Option<Level>,
    /// Skill tag, e.g. "Grammar" or "Vocabulary Recognition".
    #[serde(default)]
    pub skill: String,
    /// Grammar point exercised, when the question targets one.
    #[serde(default)]
    pub grammar_point: Option<String>,
    /// Topic tag carried through from the bank, if any.
    #[serde(default)]
    pub topic: Option<String>,
    /// Author-estimated difficulty within the level, 0.0–1.0.
    #[serde(default)]
    pub difficulty: Option<f64>,
    /// Mechanic tag plus mechanic-specific payload.
    #[serde(flatten)]
    pub body: QuestionBody,
}

impl Question {
    /// The interaction type of this question.
    pub fn mechanic(&self) -> Mechanic {
        self.body.mechanic()
    }
}

/// A question as handed to the presentation layer.
///
/// Owns a copy of the bank entry plus the ephemeral serving annotations, so
/// the bank itself stays immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServedQuestion {
    /// Copy of the bank entry.
    pub question: Question,
    /// The level pool this question was drawn from this turn.
    pub assigned_level: Level,
    /// Whether this serving belongs to the calibration phase.
    pub calibration: bool,
}

impl ServedQuestion {
    pub fn id(&self) -> &str {
        &self.question.id
    }

    pub fn mechanic(&self) -> Mechanic {
        self.question.mechanic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_bounds_and_saturation() {
        assert_eq!(Level::new(5), Some(Level::MAX));
        assert_eq!(Level::new(6), None);
        assert_eq!(Level::MAX.up(), Level::MAX);
        assert_eq!(Level::MIN.down(), Level::MIN);
        assert_eq!(Level::new(2).unwrap().up().value(), 3);
        assert_eq!(Level::new(2).unwrap().down().value(), 1);
    }

    #[test]
    fn level_cefr_labels() {
        let labels: Vec<&str> = Level::all().map(Level::cefr).collect();
        assert_eq!(labels, vec!["pre-A1", "A1", "A1+", "A2", "B1", "B2"]);
    }

    #[test]
    fn level_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<Level>("3").is_ok());
        assert!(serde_json::from_str::<Level>("6").is_err());
    }

    #[test]
    fn mechanic_display_and_parse() {
        for mechanic in [
            Mechanic::WordPronunciation,
            Mechanic::AudioChoiceFromImages,
            Mechanic::SentencePronunciation,
            Mechanic::AudioCategorySorting,
            Mechanic::ImageChoiceFromTexts,
            Mechanic::SentenceScramble,
            Mechanic::MultipleChoiceText,
        ] {
            assert_eq!(mechanic.to_string().parse::<Mechanic>().unwrap(), mechanic);
        }
        assert!("tap-dancing".parse::<Mechanic>().is_err());
    }

    #[test]
    fn category_partition() {
        use Mechanic::*;
        let audio: Vec<Mechanic> = [
            WordPronunciation,
            AudioChoiceFromImages,
            SentencePronunciation,
            AudioCategorySorting,
        ]
        .into();
        let text: Vec<Mechanic> = [ImageChoiceFromTexts, SentenceScramble, MultipleChoiceText].into();

        for m in audio {
            assert_eq!(m.category(), MechanicCategory::Audio);
        }
        for m in text {
            assert_eq!(m.category(), MechanicCategory::Text);
        }
        assert_eq!(MechanicCategory::Audio.other(), MechanicCategory::Text);
    }

    #[test]
    fn availability_table() {
        let l0 = available_mechanics(Level::MIN);
        assert_eq!(l0.len(), 4);
        assert!(l0.iter().all(|m| m.category() == MechanicCategory::Audio));

        let l1 = available_mechanics(Level::new(1).unwrap());
        assert_eq!(l1.len(), 6);
        assert!(l1.contains(&Mechanic::SentenceScramble));
        assert!(!l1.contains(&Mechanic::MultipleChoiceText));

        for value in 2..=5 {
            let mechanics = available_mechanics(Level::new(value).unwrap());
            assert_eq!(mechanics.len(), 7);
            assert!(mechanics.contains(&Mechanic::MultipleChoiceText));
        }
    }

    #[test]
    fn question_wire_format_roundtrip() {
        let json = r#"{
            "id": "L2_MC_001",
            "mechanic": "multiple-choice-text-text",
            "sentence": "She ___ to school every day.",
            "options": ["go", "goes", "going", "went"],
            "correct_answer": 1,
            "skill": "Grammar",
            "difficulty": 0.3,
            "grammar_point": "present simple third person"
        }"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.id, "L2_MC_001");
        assert_eq!(question.mechanic(), Mechanic::MultipleChoiceText);
        assert_eq!(question.skill, "Grammar");
        assert_eq!(question.level, None);

        let serialized = serde_json::to_string(&question).unwrap();
        let reparsed: Question = serde_json::from_str(&serialized).unwrap();
        assert_eq!(reparsed.mechanic(), Mechanic::MultipleChoiceText);
        match reparsed.body {
            QuestionBody::MultipleChoiceText { correct_answer, .. } => {
                assert_eq!(correct_answer, 1);
            }
            other => panic!("wrong body: {other:?}"),
        }
    }

    #[test]
    fn sorting_wire_format() {
        let json = r#"{
            "id": "L0_CS_001",
            "mechanic": "audio-category-sorting",
            "items": ["dog", "apple", "cat"],
            "categories": ["animals", "food"],
            "correct_categories": [0, 1, 0],
            "skill": "Listening Comprehension"
        }"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.mechanic(), Mechanic::AudioCategorySorting);
        assert_eq!(question.body.prompt_text(), "sort the words you hear");
    }
}
