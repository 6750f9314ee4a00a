use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default cap on resolved objective attempts per session.
pub const MAX_OBJECTIVE_ATTEMPTS: u32 = 5;
/// Default per-objective time budget in seconds.
pub const OBJECTIVE_TIME_LIMIT_SECS: f64 = 60.0;
/// Position delta (per axis) below which the actor counts as stationary.
pub const POSITION_EPSILON: f64 = 0.01;
/// Yaw delta in degrees below which the actor counts as not turning.
pub const YAW_EPSILON_DEG: f64 = 0.5;
/// Vertical coordinate below which the actor has fallen out of the level.
pub const FLOOR_THRESHOLD: f64 = -1.0;
/// Command issued when the decision policy cannot produce one.
pub const FALLBACK_COMMAND: &str = "move_fwd:0.5";

/// Complete configuration for the scout orchestrator and its collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub session: SessionConfig,
    pub policy: PolicyConfig,
    pub narrative: NarrativeConfig,
    pub model: ModelConfig,
    /// Directory holding `<name>.json` scenario definitions.
    pub scenarios_dir: PathBuf,
}

/// Tunables of the session state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Global cap on resolved objective attempts (default: 5).
    pub max_objective_attempts: u32,
    /// Time budget for a single objective attempt in seconds (default: 60).
    pub objective_time_limit_secs: f64,
    /// Per-axis idle threshold (default: 0.01).
    pub position_epsilon: f64,
    /// Yaw idle threshold in degrees (default: 0.5).
    pub yaw_epsilon_deg: f64,
    /// Fall threshold on the vertical axis (default: -1.0).
    pub floor_threshold: f64,
    /// Wire command used when the decision policy fails (default: `move_fwd:0.5`).
    pub fallback_command: String,
}

/// Decision policy call settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Upper bound on a single `decide` call (default: 10s).
    pub timeout_secs: f64,
    pub temperature: f64,
    pub max_tokens: usize,
}

/// Narrative generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// Whether reports should request a prose summary at all.
    pub enabled: bool,
    /// Upper bound on a single `narrate` call (default: 20s).
    pub timeout_secs: f64,
}

/// Chat model endpoint used by the LLM policy and narrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible API.
    pub api_base: String,
    /// Model identifier (e.g. `"gpt-4o-mini"`).
    pub model_id: String,
    /// Bearer token; filled from `OPENAI_API_KEY` when empty.
    pub api_key: String,
}

impl ScoutConfig {
    /// Read a JSON configuration file. Missing sections fall back to defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config from {}", path.display()))
    }
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            policy: PolicyConfig::default(),
            narrative: NarrativeConfig::default(),
            model: ModelConfig::default(),
            scenarios_dir: PathBuf::from("scenarios"),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_objective_attempts: MAX_OBJECTIVE_ATTEMPTS,
            objective_time_limit_secs: OBJECTIVE_TIME_LIMIT_SECS,
            position_epsilon: POSITION_EPSILON,
            yaw_epsilon_deg: YAW_EPSILON_DEG,
            floor_threshold: FLOOR_THRESHOLD,
            fallback_command: FALLBACK_COMMAND.to_string(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10.0,
            temperature: 0.2,
            max_tokens: 256,
        }
    }
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_secs: 20.0,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".into(),
            model_id: "gpt-4o-mini".into(),
            api_key: String::new(),
        }
    }
}
