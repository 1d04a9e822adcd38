//! The `placetest analyze` command.
//!
//! Re-runs the analysis chain over a saved session record, e.g. to retry AI
//! analysis for a session that fell back to the deterministic scorer.

use std::path::PathBuf;

use anyhow::{Context, Result};

use placetest_core::record::SessionRecord;
use placetest_core::traits::{AnalysisMethod, AnalysisRequest};
use placetest_analysis::config::load_config_from;
use placetest_analysis::{analyze_with_fallback, create_analyzer, AnalyzerConfig};

pub async fn execute(
    session_path: PathBuf,
    offline: bool,
    update: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut record = SessionRecord::load_json(&session_path)
        .with_context(|| format!("failed to load session {}", session_path.display()))?;

    let config = load_config_from(config_path.as_deref())?;
    let analyzer_config = if offline {
        AnalyzerConfig::Offline
    } else {
        config.analyzer
    };
    let analyzer = create_analyzer(&analyzer_config);

    let mut request = AnalysisRequest::new(record.history.clone());
    request.student_name = record.student_name.clone();
    request.student_age = record.student_age;

    let analyzed = analyze_with_fallback(analyzer.as_deref(), &request).await;
    let placement = &analyzed.analysis.placement;

    println!(
        "Session {} ({} answers)",
        record.id,
        record.history.len()
    );
    println!(
        "Placement: Level {} ({}) at {:.0}% confidence",
        placement.novakid_level,
        placement.cefr_equivalent,
        placement.confidence * 100.0
    );
    match &analyzed.method {
        AnalysisMethod::Ai { model } => println!("Method: AI ({model})"),
        AnalysisMethod::Fallback { reason } => println!("Method: deterministic ({reason})"),
    }
    println!("{}", placement.level_justification);

    if update {
        record.analysis = analyzed;
        record.save_json(&session_path)?;
        println!("Updated {}", session_path.display());
    }

    Ok(())
}
