use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use placetest_core::bank::QuestionBank;
use placetest_core::engine::{AdaptiveEngine, EngineConfig};
use placetest_core::model::{available_mechanics, Level, Mechanic, Question, QuestionBody};

fn make_question(id: &str, mechanic: Mechanic) -> Question {
    let body = match mechanic {
        Mechanic::MultipleChoiceText => QuestionBody::MultipleChoiceText {
            sentence: "She ___ to school.".into(),
            options: vec!["go".into(), "goes".into(), "going".into(), "went".into()],
            correct_answer: 1,
        },
        Mechanic::WordPronunciation => QuestionBody::WordPronunciation {
            target_word: "elephant".into(),
            phonetic: "/ˈelɪfənt/".into(),
            image_description: "Large gray animal with trunk".into(),
        },
        Mechanic::ImageChoiceFromTexts => QuestionBody::ImageChoiceFromTexts {
            image_description: "Clock showing 3:00".into(),
            options: vec!["three o'clock".into(), "four o'clock".into()],
            correct_answer: 0,
        },
        Mechanic::AudioChoiceFromImages => QuestionBody::AudioChoiceFromImages {
            target_audio: "elephant".into(),
            image_options: vec!["Large gray animal".into(), "Small brown dog".into()],
            correct_answer: 0,
        },
        Mechanic::SentencePronunciation => QuestionBody::SentencePronunciation {
            target_sentence: "How are you today?".into(),
            phonetic: String::new(),
            image_description: String::new(),
        },
        Mechanic::SentenceScramble => QuestionBody::SentenceScramble {
            sentence_template: "I ___ to ___ every day".into(),
            word_options: vec!["go".into(), "school".into(), "am".into(), "went".into()],
            correct_order: vec![0, 1],
        },
        Mechanic::AudioCategorySorting => QuestionBody::AudioCategorySorting {
            items: vec!["dog".into(), "apple".into(), "cat".into()],
            categories: vec!["animals".into(), "food".into()],
            correct_categories: vec![0, 1, 0],
        },
    };
    Question {
        id: id.into(),
        level: None,
        skill: "Mixed".into(),
        grammar_point: None,
        topic: None,
        difficulty: None,
        body,
    }
}

fn make_bank(per_mechanic: usize) -> QuestionBank {
    let mut levels = BTreeMap::new();
    for level in Level::all() {
        let mut questions = Vec::new();
        for &mechanic in available_mechanics(level) {
            for i in 0..per_mechanic {
                questions.push(make_question(&format!("L{level}_{mechanic}_{i}"), mechanic));
            }
        }
        levels.insert(level, questions);
    }
    QuestionBank::from_levels(levels).unwrap()
}

fn bench_full_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_session");

    for per_mechanic in [5usize, 20] {
        let bank = make_bank(per_mechanic);
        group.bench_function(format!("15_questions_x{per_mechanic}"), |b| {
            b.iter(|| {
                let mut engine =
                    AdaptiveEngine::with_seed(bank.clone(), EngineConfig::default(), 42);
                for turn in 0..15 {
                    let Some(question) = engine.next_question() else {
                        break;
                    };
                    engine.record_answer(black_box(question.id()), turn % 3 != 0);
                }
                engine.current_level()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_full_session);
criterion_main!(benches);
