//! placetest-analysis — AI result analysis.
//!
//! Implements the `ResultAnalyzer` trait for the Gemini API and provides the
//! fallback chain that degrades to the deterministic scorer when the AI
//! collaborator fails.

pub mod config;
pub mod error;
pub mod fallback;
pub mod gemini;
pub mod mock;

pub use config::{create_analyzer, load_config, AnalyzerConfig, PlacetestConfig};
pub use error::AnalysisError;
pub use fallback::analyze_with_fallback;
