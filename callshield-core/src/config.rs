//! # Config Loader — Loads and validates TOML configuration
//!
//! Reads `callshield.toml` (or a custom path) and deserializes into typed
//! config structs. A missing file is not an error: the engine runs with
//! built-in defaults and the built-in phrase catalogue.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShieldConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Phrase catalogue settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Optional path to an external phrase dataset (JSON) merged into the
    /// built-in catalogue once at startup. Unreadable or malformed files
    /// are logged and ignored.
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
}

/// Scoring-engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Per-session cap on accumulated transcript tokens. The scorer itself
    /// has no intrinsic limit; the engine enforces this bound on behalf of
    /// latency-sensitive callers.
    #[serde(default = "default_max_transcript_tokens")]
    pub max_transcript_tokens: usize,
    /// Bound on the retained alert buffer.
    #[serde(default = "default_max_alerts")]
    pub max_alerts: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_transcript_tokens: default_max_transcript_tokens(),
            max_alerts: default_max_alerts(),
        }
    }
}

fn default_max_transcript_tokens() -> usize {
    20_000
}

fn default_max_alerts() -> usize {
    10_000
}

impl ShieldConfig {
    /// Load config from a TOML file path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config: {}", e))?;
        let config: ShieldConfig = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        info!(
            path = %path.display(),
            max_transcript_tokens = config.scoring.max_transcript_tokens,
            dataset = config.catalog.dataset_path.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }
}
