//! The `placetest validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use placetest_core::bank::{validate_bank, QuestionBank};
use placetest_core::model::{available_mechanics, Level};

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let bank = QuestionBank::load(&bank_path)
        .with_context(|| format!("failed to load question bank {}", bank_path.display()))?;

    println!(
        "{}: {} questions across {} levels",
        bank_path.display(),
        bank.len(),
        bank.levels().count()
    );

    let mut table = Table::new();
    table.set_header(vec!["Level", "CEFR", "Questions", "Mechanics offered"]);
    for level in Level::all() {
        let questions = bank.questions_at(level);
        let mechanics_present = available_mechanics(level)
            .iter()
            .filter(|m| questions.iter().any(|q| q.mechanic() == **m))
            .count();
        table.add_row(vec![
            Cell::new(format!("Level {level}")),
            Cell::new(level.cefr()),
            Cell::new(questions.len()),
            Cell::new(format!(
                "{mechanics_present}/{}",
                available_mechanics(level).len()
            )),
        ]);
    }
    println!("{table}");

    let warnings = validate_bank(&bank);
    if warnings.is_empty() {
        println!("Bank valid, no warnings");
    } else {
        println!("{} warning(s):", warnings.len());
        for warning in &warnings {
            match &warning.question_id {
                Some(id) => println!("  [{id}] {}", warning.message),
                None => println!("  {}", warning.message),
            }
        }
    }

    Ok(())
}
