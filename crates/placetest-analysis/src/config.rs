//! Configuration loading and the analyzer factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use placetest_core::traits::ResultAnalyzer;

use crate::gemini::GeminiAnalyzer;

/// Configuration for the result analyzer.
///
/// Note: the custom Debug impl masks API keys to prevent accidental
/// exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalyzerConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        base_url: Option<String>,
    },
    /// Deterministic scoring only; no API calls.
    Offline,
}

impl std::fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzerConfig::Gemini {
                api_key: _,
                model,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("model", model)
                .field("base_url", base_url)
                .finish(),
            AnalyzerConfig::Offline => f.debug_struct("Offline").finish(),
        }
    }
}

/// Top-level placetest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacetestConfig {
    /// Result analyzer to use for finished sessions.
    #[serde(default = "default_analyzer")]
    pub analyzer: AnalyzerConfig,
    /// Questions per session.
    #[serde(default = "default_questions_per_test")]
    pub questions_per_test: usize,
    /// Output directory for session records and reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_analyzer() -> AnalyzerConfig {
    AnalyzerConfig::Offline
}
fn default_questions_per_test() -> usize {
    15
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./placetest-results")
}

impl Default for PlacetestConfig {
    fn default() -> Self {
        Self {
            analyzer: default_analyzer(),
            questions_per_test: default_questions_per_test(),
            output_dir: default_output_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_analyzer_config(config: &AnalyzerConfig) -> AnalyzerConfig {
    match config {
        AnalyzerConfig::Gemini {
            api_key,
            model,
            base_url,
        } => AnalyzerConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            model: model.clone(),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        AnalyzerConfig::Offline => AnalyzerConfig::Offline,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `placetest.toml` in the current directory
/// 2. `~/.config/placetest/config.toml`
///
/// Environment variable override: `PLACETEST_GEMINI_KEY`.
pub fn load_config() -> Result<PlacetestConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<PlacetestConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("placetest.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<PlacetestConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => PlacetestConfig::default(),
    };

    // Env var override: a key in the environment turns the analyzer on.
    if let Ok(key) = std::env::var("PLACETEST_GEMINI_KEY") {
        config.analyzer = match config.analyzer {
            AnalyzerConfig::Gemini {
                model, base_url, ..
            } => AnalyzerConfig::Gemini {
                api_key: key,
                model,
                base_url,
            },
            AnalyzerConfig::Offline => AnalyzerConfig::Gemini {
                api_key: key,
                model: None,
                base_url: None,
            },
        };
    }

    config.analyzer = resolve_analyzer_config(&config.analyzer);
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("placetest"))
}

/// Create an analyzer from its configuration. `None` means deterministic
/// scoring only.
pub fn create_analyzer(config: &AnalyzerConfig) -> Option<Box<dyn ResultAnalyzer>> {
    match config {
        AnalyzerConfig::Gemini {
            api_key,
            model,
            base_url,
        } => Some(Box::new(GeminiAnalyzer::new(
            api_key,
            model.clone(),
            base_url.clone(),
        ))),
        AnalyzerConfig::Offline => None,
    }
}
