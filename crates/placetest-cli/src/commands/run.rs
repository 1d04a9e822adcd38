//! The `placetest run` command.
//!
//! Drives a full simulated session: the engine picks questions, a simulated
//! student answers them, and the finished history goes through the analysis
//! fallback chain before the record lands on disk.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use placetest_core::answer::check_answer;
use placetest_core::bank::QuestionBank;
use placetest_core::engine::{AdaptiveEngine, EngineConfig};
use placetest_core::record::SessionRecord;
use placetest_core::traits::{AnalysisMethod, AnalysisRequest};
use placetest_analysis::config::load_config_from;
use placetest_analysis::{analyze_with_fallback, create_analyzer, AnalyzerConfig};
use placetest_report::write_markdown_report;

use crate::student::SimulatedStudent;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    bank_path: PathBuf,
    questions: usize,
    ability: f64,
    student_name: Option<String>,
    seed: Option<u64>,
    offline: bool,
    output: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(questions >= 1, "questions must be at least 1");
    anyhow::ensure!(
        (0.0..=5.0).contains(&ability),
        "ability must be between 0.0 and 5.0"
    );

    let config = load_config_from(config_path.as_deref())?;
    let bank = QuestionBank::load(&bank_path)
        .with_context(|| format!("failed to load question bank {}", bank_path.display()))?;
    eprintln!(
        "Loaded {} questions across {} levels",
        bank.len(),
        bank.levels().count()
    );

    let engine_config = EngineConfig {
        questions_per_test: questions,
        ..EngineConfig::default()
    };
    let session_seed = seed.unwrap_or_else(rand::random);
    let mut engine = AdaptiveEngine::with_seed(bank, engine_config, session_seed);
    let mut student = SimulatedStudent::new(ability, session_seed.wrapping_add(1));

    // The turn loop the presentation layer would otherwise own.
    for turn in 1..=questions {
        let Some(served) = engine.next_question() else {
            eprintln!("Question pool exhausted after {} answers", turn - 1);
            break;
        };
        let answer = student.answer(&served);
        let correct = check_answer(&served.question, &answer);
        engine.record_answer(served.id(), correct);

        eprintln!(
            "  Q{turn:>2} [Level {}] {} {} {}",
            served.assigned_level,
            served.question.mechanic(),
            if served.calibration { "(calibration)" } else { "" },
            if correct { "correct" } else { "incorrect" },
        );
    }

    let estimate = engine.estimated_level();
    let history = engine.history().to_vec();
    let final_level = engine.current_level();

    let mut request = AnalysisRequest::new(history.clone());
    request.student_name = student_name.clone();

    let analyzer_config = if offline {
        AnalyzerConfig::Offline
    } else {
        config.analyzer.clone()
    };
    let analyzer = create_analyzer(&analyzer_config);
    let analyzed = analyze_with_fallback(analyzer.as_deref(), &request).await;

    let record = SessionRecord {
        id: uuid::Uuid::new_v4(),
        completed_at: chrono::Utc::now(),
        student_name,
        student_age: None,
        history,
        analysis: analyzed,
        final_level,
        estimate,
    };

    print_summary(&record);

    // Save outputs.
    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "markdown"]
    } else {
        format.split(',').collect()
    };

    for fmt in &formats {
        match fmt.trim() {
            "json" => {
                let path = output.join(format!("session-{timestamp}.json"));
                record.save_json(&path)?;
                eprintln!("Session record saved to: {}", path.display());
            }
            "markdown" => {
                let path = output.join(format!("report-{timestamp}.md"));
                write_markdown_report(&record, &path)?;
                eprintln!("Markdown report: {}", path.display());
            }
            other => {
                eprintln!("Unknown format: {other}");
            }
        }
    }

    Ok(())
}

fn print_summary(record: &SessionRecord) {
    let placement = &record.analysis.analysis.placement;
    let total = record.history.len();

    let mut table = Table::new();
    table.set_header(vec![
        "Questions",
        "Correct",
        "Final Level",
        "Placement",
        "CEFR",
        "Confidence",
        "Method",
    ]);
    table.add_row(vec![
        Cell::new(total),
        Cell::new(record.correct_count()),
        Cell::new(format!("Level {}", record.final_level)),
        Cell::new(format!("Level {}", placement.novakid_level)),
        Cell::new(&placement.cefr_equivalent),
        Cell::new(format!("{:.0}%", placement.confidence * 100.0)),
        Cell::new(match &record.analysis.method {
            AnalysisMethod::Ai { model } => format!("AI ({model})"),
            AnalysisMethod::Fallback { .. } => "deterministic".to_string(),
        }),
    ]);

    println!("{table}");
    println!("Placement: {}", placement.level_justification);
}
