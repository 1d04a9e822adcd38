//! Persisted session records.
//!
//! The record the surrounding layer saves at test completion, derived
//! entirely from core outputs: the enriched history, the tagged analysis,
//! and the tracker's final position.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Level;
use crate::session::{HistoryEntry, LevelEstimate};
use crate::traits::AnalyzedPlacement;

/// A completed session, ready for storage or rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique session identifier.
    pub id: Uuid,
    /// When the session finished.
    pub completed_at: DateTime<Utc>,
    /// Student name, when provided.
    #[serde(default)]
    pub student_name: Option<String>,
    /// Student age, when provided.
    #[serde(default)]
    pub student_age: Option<u8>,
    /// The full answer record in served order.
    pub history: Vec<HistoryEntry>,
    /// The placement analysis, tagged with the path that produced it.
    pub analysis: AnalyzedPlacement,
    /// The tracker's level when the session ended.
    pub final_level: Level,
    /// The engine's estimate at completion.
    pub estimate: LevelEstimate,
}

impl SessionRecord {
    /// Save the record as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize session record")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write session record to {}", path.display()))?;
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session record from {}", path.display()))?;
        let record: SessionRecord =
            serde_json::from_str(&content).context("failed to parse session record JSON")?;
        Ok(record)
    }

    /// Questions answered correctly.
    pub fn correct_count(&self) -> usize {
        self.history.iter().filter(|h| h.correct).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mechanic;
    use crate::scoring::score_session;
    use crate::traits::AnalysisMethod;

    fn record() -> SessionRecord {
        let history = vec![HistoryEntry {
            question_id: "L2_MC_001".into(),
            correct: true,
            level: Level::new(2).unwrap(),
            assigned_level: Level::new(2).unwrap(),
            mechanic: Mechanic::MultipleChoiceText,
            skill: "Grammar".into(),
            grammar_point: None,
        }];
        let analysis = score_session(&history);
        SessionRecord {
            id: Uuid::nil(),
            completed_at: Utc::now(),
            student_name: Some("Student_0930".into()),
            student_age: Some(8),
            history,
            analysis: AnalyzedPlacement {
                analysis,
                method: AnalysisMethod::Fallback {
                    reason: "analyzer disabled".into(),
                },
            },
            final_level: Level::new(2).unwrap(),
            estimate: LevelEstimate {
                level: Level::new(2).unwrap(),
                confidence: 0.07,
                accuracy: 1.0,
                questions_answered: 1,
            },
        }
    }

    #[test]
    fn json_roundtrip() {
        let record = record();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("session.json");

        record.save_json(&path).unwrap();
        let loaded = SessionRecord::load_json(&path).unwrap();

        assert_eq!(loaded.history.len(), 1);
        assert_eq!(loaded.final_level.value(), 2);
        assert_eq!(loaded.correct_count(), 1);
        assert!(matches!(
            loaded.analysis.method,
            AnalysisMethod::Fallback { .. }
        ));
    }

    #[test]
    fn load_missing_file_fails_with_context() {
        let err = SessionRecord::load_json(Path::new("no_such_record.json")).unwrap_err();
        assert!(err.to_string().contains("no_such_record.json"));
    }
}
