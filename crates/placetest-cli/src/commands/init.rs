//! The `placetest init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create placetest.toml
    if std::path::Path::new("placetest.toml").exists() {
        println!("placetest.toml already exists, skipping.");
    } else {
        std::fs::write("placetest.toml", SAMPLE_CONFIG)?;
        println!("Created placetest.toml");
    }

    // Create sample question bank
    std::fs::create_dir_all("data")?;
    let bank_path = std::path::Path::new("data/questions.json");
    if bank_path.exists() {
        println!("data/questions.json already exists, skipping.");
    } else {
        std::fs::write(bank_path, SAMPLE_BANK)?;
        println!("Created data/questions.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit placetest.toml to enable AI analysis (optional)");
    println!("  2. Run: placetest validate --bank data/questions.json");
    println!("  3. Run: placetest run --bank data/questions.json --offline");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# placetest configuration

questions_per_test = 15
output_dir = "./placetest-results"

# Deterministic scoring by default. For AI-narrative analysis switch the
# analyzer to Gemini:
#
# [analyzer]
# type = "gemini"
# api_key = "${GEMINI_API_KEY}"
# model = "gemini-2.5-pro"

[analyzer]
type = "offline"
"#;

const SAMPLE_BANK: &str = r#"{
  "0": [
    {
      "id": "L0_WP_001",
      "mechanic": "word-pronunciation-practice",
      "target_word": "cat",
      "phonetic": "/kæt/",
      "image_description": "Small furry pet animal",
      "skill": "Pronunciation",
      "difficulty": 0.1
    },
    {
      "id": "L0_AI_001",
      "mechanic": "audio-single-choice-from-images",
      "target_audio": "dog",
      "image_options": ["Small furry pet with a wagging tail", "Yellow bird with wings", "Large gray animal with trunk"],
      "correct_answer": 0,
      "skill": "Listening Comprehension",
      "difficulty": 0.2,
      "topic": "animals"
    },
    {
      "id": "L0_CS_001",
      "mechanic": "audio-category-sorting",
      "items": ["dog", "apple", "cat", "banana"],
      "categories": ["animals", "food"],
      "correct_categories": [0, 1, 0, 1],
      "skill": "Listening Comprehension",
      "difficulty": 0.2,
      "topic": "animals and food"
    },
    {
      "id": "L0_SP_001",
      "mechanic": "sentence-pronunciation-practice",
      "target_sentence": "Hello, how are you?",
      "phonetic": "/həˈloʊ haʊ ɑr ju/",
      "image_description": "Two friends waving and smiling",
      "skill": "Sentence Pronunciation",
      "difficulty": 0.3
    }
  ],
  "1": [
    {
      "id": "L1_WP_001",
      "mechanic": "word-pronunciation-practice",
      "target_word": "elephant",
      "phonetic": "/ˈelɪfənt/",
      "image_description": "Large gray animal with trunk",
      "skill": "Pronunciation",
      "difficulty": 0.3
    },
    {
      "id": "L1_IS_001",
      "mechanic": "image-single-choice-from-texts",
      "image_description": "Red round fruit",
      "options": ["apple", "banana", "orange", "grape"],
      "correct_answer": 0,
      "skill": "Vocabulary Recognition",
      "difficulty": 0.2,
      "topic": "fruits"
    },
    {
      "id": "L1_SS_001",
      "mechanic": "sentence-scramble",
      "sentence_template": "I ___ a ___",
      "word_options": ["am", "student", "is", "teacher"],
      "correct_order": [0, 1],
      "skill": "Grammar",
      "difficulty": 0.3,
      "grammar_point": "be verb sentence"
    }
  ],
  "2": [
    {
      "id": "L2_MC_001",
      "mechanic": "multiple-choice-text-text",
      "sentence": "She ___ to school every day.",
      "options": ["go", "goes", "going", "went"],
      "correct_answer": 1,
      "skill": "Grammar",
      "difficulty": 0.3,
      "grammar_point": "present simple third person"
    },
    {
      "id": "L2_IS_001",
      "mechanic": "image-single-choice-from-texts",
      "image_description": "Clock showing 3:00",
      "options": ["three o'clock", "four o'clock", "half past three", "quarter to three"],
      "correct_answer": 0,
      "skill": "Vocabulary Recognition",
      "difficulty": 0.3,
      "topic": "telling time"
    },
    {
      "id": "L2_SP_001",
      "mechanic": "sentence-pronunciation-practice",
      "target_sentence": "What did you do yesterday?",
      "phonetic": "/wʌt dɪd ju du ˈjɛstərdeɪ/",
      "image_description": "A child thinking about yesterday",
      "skill": "Sentence Pronunciation",
      "difficulty": 0.4
    }
  ],
  "3": [
    {
      "id": "L3_MC_001",
      "mechanic": "multiple-choice-text-text",
      "sentence": "Yesterday we ___ to the zoo.",
      "options": ["go", "goes", "went", "going"],
      "correct_answer": 2,
      "skill": "Grammar",
      "difficulty": 0.4,
      "grammar_point": "past simple"
    },
    {
      "id": "L3_SS_001",
      "mechanic": "sentence-scramble",
      "sentence_template": "She ___ ___ her homework",
      "word_options": ["has", "finished", "finish", "done"],
      "correct_order": [0, 1],
      "skill": "Grammar",
      "difficulty": 0.5,
      "grammar_point": "present perfect"
    },
    {
      "id": "L3_AI_001",
      "mechanic": "audio-single-choice-from-images",
      "target_audio": "The boy is riding a bicycle",
      "image_options": ["A boy on a bicycle", "A boy in a car", "A girl on a horse"],
      "correct_answer": 0,
      "skill": "Listening Comprehension",
      "difficulty": 0.4,
      "topic": "activities"
    }
  ],
  "4": [
    {
      "id": "L4_MC_001",
      "mechanic": "multiple-choice-text-text",
      "sentence": "If it rains tomorrow, we ___ at home.",
      "options": ["stay", "will stay", "stayed", "staying"],
      "correct_answer": 1,
      "skill": "Grammar",
      "difficulty": 0.6,
      "grammar_point": "first conditional"
    },
    {
      "id": "L4_MC_002",
      "mechanic": "multiple-choice-text-text",
      "sentence": "I have ___ finished my project.",
      "options": ["yet", "already", "still", "ever"],
      "correct_answer": 1,
      "skill": "Grammar",
      "difficulty": 0.6,
      "grammar_point": "present perfect adverbs"
    },
    {
      "id": "L4_SP_001",
      "mechanic": "sentence-pronunciation-practice",
      "target_sentence": "Could you tell me where the library is?",
      "phonetic": "/kʊd ju tɛl mi wɛr ðə ˈlaɪbrɛri ɪz/",
      "image_description": "A student asking for directions",
      "skill": "Sentence Pronunciation",
      "difficulty": 0.6
    }
  ],
  "5": [
    {
      "id": "L5_MC_001",
      "mechanic": "multiple-choice-text-text",
      "sentence": "Hardly ___ the door when the phone rang.",
      "options": ["had I closed", "I had closed", "I closed", "did I close"],
      "correct_answer": 0,
      "skill": "Grammar",
      "difficulty": 0.8,
      "grammar_point": "inversion"
    },
    {
      "id": "L5_MC_002",
      "mechanic": "multiple-choice-text-text",
      "sentence": "She said she ___ the movie the week before.",
      "options": ["has seen", "had seen", "saw", "sees"],
      "correct_answer": 1,
      "skill": "Grammar",
      "difficulty": 0.8,
      "grammar_point": "reported speech"
    },
    {
      "id": "L5_SS_001",
      "mechanic": "sentence-scramble",
      "sentence_template": "___ ___ harder, she would have passed",
      "word_options": ["Had", "she studied", "If", "studying"],
      "correct_order": [0, 1],
      "skill": "Grammar",
      "difficulty": 0.9,
      "grammar_point": "third conditional inversion"
    }
  ]
}
"#;
