//! The AI-to-deterministic fallback chain.
//!
//! A failing analyzer must never take the session down with it: any error
//! falls back to the deterministic scorer, and the result carries a tag so
//! downstream display can distinguish AI-derived from fallback-derived
//! placements.

use placetest_core::scoring::score_session;
use placetest_core::traits::{AnalysisMethod, AnalysisRequest, AnalyzedPlacement, ResultAnalyzer};

/// Analyze a session, degrading to the deterministic scorer on any failure.
///
/// `analyzer = None` means AI analysis is disabled; the result is tagged as
/// fallback-derived either way.
pub async fn analyze_with_fallback(
    analyzer: Option<&dyn ResultAnalyzer>,
    request: &AnalysisRequest,
) -> AnalyzedPlacement {
    let Some(analyzer) = analyzer else {
        return AnalyzedPlacement {
            analysis: score_session(&request.history),
            method: AnalysisMethod::Fallback {
                reason: "analyzer disabled".to_string(),
            },
        };
    };

    match analyzer.analyze(request).await {
        Ok(analysis) => AnalyzedPlacement {
            analysis,
            method: AnalysisMethod::Ai {
                model: analyzer.name().to_string(),
            },
        },
        Err(error) => {
            tracing::warn!(
                analyzer = analyzer.name(),
                error = %error,
                "AI analysis failed; using deterministic scorer"
            );
            AnalyzedPlacement {
                analysis: score_session(&request.history),
                method: AnalysisMethod::Fallback {
                    reason: error.to_string(),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockAnalyzer;
    use placetest_core::model::{Level, Mechanic};
    use placetest_core::session::HistoryEntry;

    fn request() -> AnalysisRequest {
        AnalysisRequest::new(vec![
            HistoryEntry {
                question_id: "a".into(),
                correct: true,
                level: Level::new(2).unwrap(),
                assigned_level: Level::new(2).unwrap(),
                mechanic: Mechanic::MultipleChoiceText,
                skill: "Grammar".into(),
                grammar_point: None,
            },
            HistoryEntry {
                question_id: "b".into(),
                correct: true,
                level: Level::new(2).unwrap(),
                assigned_level: Level::new(2).unwrap(),
                mechanic: Mechanic::ImageChoiceFromTexts,
                skill: "Vocabulary".into(),
                grammar_point: None,
            },
        ])
    }

    #[tokio::test]
    async fn success_is_tagged_ai() {
        let canned = score_session(&request().history);
        let mock = MockAnalyzer::with_analysis(canned);
        let result = analyze_with_fallback(Some(&mock), &request()).await;
        assert_eq!(
            result.method,
            AnalysisMethod::Ai {
                model: "mock".into()
            }
        );
    }

    #[tokio::test]
    async fn failure_falls_back_with_reason() {
        let mock = MockAnalyzer::failing("quota exceeded");
        let result = analyze_with_fallback(Some(&mock), &request()).await;

        match &result.method {
            AnalysisMethod::Fallback { reason } => assert!(reason.contains("quota exceeded")),
            other => panic!("expected fallback, got {other:?}"),
        }
        // The fallback analysis matches the deterministic scorer exactly.
        let expected = score_session(&request().history);
        assert_eq!(
            result.analysis.placement.novakid_level,
            expected.placement.novakid_level
        );
        assert_eq!(
            result.analysis.placement.level_justification,
            expected.placement.level_justification
        );
    }

    #[tokio::test]
    async fn disabled_analyzer_uses_deterministic_scorer() {
        let result = analyze_with_fallback(None, &request()).await;
        match &result.method {
            AnalysisMethod::Fallback { reason } => assert_eq!(reason, "analyzer disabled"),
            other => panic!("expected fallback, got {other:?}"),
        }
        assert_eq!(result.analysis.placement.novakid_level.value(), 2);
    }

    #[tokio::test]
    async fn fallback_never_panics_on_empty_history() {
        let mock = MockAnalyzer::failing("boom");
        let result = analyze_with_fallback(Some(&mock), &AnalysisRequest::new(vec![])).await;
        assert_eq!(result.analysis.placement.novakid_level.value(), 1);
        assert_eq!(result.analysis.placement.confidence, 0.0);
    }
}
