//! Scenario loading from a directory of JSON files.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::ScenarioDefinition;

/// Errors that can occur while resolving a scenario by name.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("scenario not found: {0}")]
    NotFound(String),

    #[error("failed to read scenario {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid scenario {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Resolves scenario names to definitions.
pub trait ScenarioLoader: Send + Sync {
    fn load(&self, name: &str) -> Result<ScenarioDefinition, ScenarioError>;

    /// Names of every scenario this loader can resolve, sorted.
    fn list(&self) -> Result<Vec<String>, ScenarioError>;
}

/// Loads `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    dir: PathBuf,
}

impl DirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ScenarioLoader for DirectoryLoader {
    fn load(&self, name: &str) -> Result<ScenarioDefinition, ScenarioError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(ScenarioError::NotFound(name.to_string()));
        }

        let path = self.dir.join(format!("{name}.json"));
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ScenarioError::NotFound(name.to_string()));
            }
            Err(source) => {
                return Err(ScenarioError::Io {
                    name: name.to_string(),
                    source,
                });
            }
        };

        let scenario: ScenarioDefinition =
            serde_json::from_str(&text).map_err(|source| ScenarioError::Parse {
                name: name.to_string(),
                source,
            })?;

        debug!(name, path = %path.display(), objectives = scenario.objectives.len(), "loaded scenario");
        Ok(scenario)
    }

    fn list(&self) -> Result<Vec<String>, ScenarioError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(ScenarioError::Io {
                    name: self.dir.display().to_string(),
                    source,
                });
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }
}
