//! The result-analyzer capability.
//!
//! Narrative analysis is an external, fallible collaborator: implementations
//! live in `placetest-analysis`, and the engine only depends on this trait
//! and the deterministic scorer it can always fall back to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::scoring::PlacementAnalysis;
use crate::session::HistoryEntry;

/// Analyzes a finished session into a placement record.
#[async_trait]
pub trait ResultAnalyzer: Send + Sync {
    /// Human-readable analyzer name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Produce a placement analysis for the given session.
    async fn analyze(&self, request: &AnalysisRequest) -> anyhow::Result<PlacementAnalysis>;
}

/// Everything an analyzer gets to see about a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// The full enriched answer record, in served order.
    pub history: Vec<HistoryEntry>,
    /// Student name, when provided.
    #[serde(default)]
    pub student_name: Option<String>,
    /// Student age, when provided.
    #[serde(default)]
    pub student_age: Option<u8>,
}

impl AnalysisRequest {
    pub fn new(history: Vec<HistoryEntry>) -> Self {
        Self {
            history,
            student_name: None,
            student_age: None,
        }
    }
}

/// Which path produced a placement analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum AnalysisMethod {
    /// The AI analyzer succeeded.
    Ai { model: String },
    /// The AI analyzer failed (or was disabled) and the deterministic
    /// scorer produced the record.
    Fallback { reason: String },
}

/// A placement analysis tagged with the path that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedPlacement {
    pub analysis: PlacementAnalysis,
    #[serde(flatten)]
    pub method: AnalysisMethod,
}

/// Extract a JSON payload from a possibly markdown-fenced model response.
///
/// Handles ```json fences, bare ``` fences, and raw JSON with surrounding
/// prose (sliced between the first `{` and the last `}`).
pub fn extract_json_from_markdown(response: &str) -> String {
    let fenced = response
        .split_once("```json")
        .or_else(|| response.split_once("```"))
        .map(|(_, rest)| rest)
        .and_then(|rest| rest.split_once("```"))
        .map(|(block, _)| block.trim().to_string());
    if let Some(block) = fenced {
        return block;
    }

    match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if end > start => response[start..=end].to_string(),
        _ => response.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_json_fenced_block() {
        let input = "Here you go:\n```json\n{\"a\": 1}\n```\nDone.";
        assert_eq!(extract_json_from_markdown(input), "{\"a\": 1}");
    }

    #[test]
    fn extracts_bare_fenced_block() {
        let input = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_from_markdown(input), "{\"a\": 1}");
    }

    #[test]
    fn slices_braces_from_prose() {
        let input = "The result is {\"a\": 1} as requested.";
        assert_eq!(extract_json_from_markdown(input), "{\"a\": 1}");
    }

    #[test]
    fn raw_json_passes_through() {
        let input = "{\"a\": 1}";
        assert_eq!(extract_json_from_markdown(input), "{\"a\": 1}");
    }

    #[test]
    fn truncated_fence_falls_back_to_braces() {
        let input = "```json\n{\"a\": 1}";
        assert_eq!(extract_json_from_markdown(input), "{\"a\": 1}");
    }

    #[test]
    fn analysis_method_tags_serialize_flat() {
        let ai = AnalysisMethod::Ai {
            model: "gemini-2.5-pro".into(),
        };
        let json = serde_json::to_value(&ai).unwrap();
        assert_eq!(json["method"], "ai");
        assert_eq!(json["model"], "gemini-2.5-pro");

        let fallback = AnalysisMethod::Fallback {
            reason: "network error".into(),
        };
        let json = serde_json::to_value(&fallback).unwrap();
        assert_eq!(json["method"], "fallback");
        assert_eq!(json["reason"], "network error");
    }
}
