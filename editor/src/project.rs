use std::path::{Path, PathBuf};

use serde::Deserialize;
use strata_core::abstract_editor::DEFAULT_MAX_UNDO;

/// Top-level project configuration loaded from `strata.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project: ProjectInfo,
    #[serde(default)]
    pub editor: EditorSettings,
    #[serde(default)]
    pub startup: StartupConfig,
}

/// General project information.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self {
            name: "Untitled".into(),
        }
    }
}

/// Editor behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Maximum number of undoable commands kept.
    pub max_undo: usize,
    /// `env_logger` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Number of log records kept for the console.
    pub log_capacity: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
            log_filter: "info".into(),
            log_capacity: 10_000,
        }
    }
}

/// Documents opened when the editor starts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartupConfig {
    /// Paths handled like files dropped onto the window, relative to the
    /// project file.
    #[serde(default)]
    pub open: Vec<PathBuf>,
}

impl ProjectConfig {
    /// Startup paths resolved against `base`, the project file's directory.
    pub fn startup_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.startup
            .open
            .iter()
            .map(|path| {
                if path.is_absolute() {
                    path.clone()
                } else {
                    base.join(path)
                }
            })
            .collect()
    }
}

/// Load a project config from a TOML file.
///
/// Returns `Err` with a human-readable message if the file cannot be read
/// or parsed.
pub fn load_project(path: &Path) -> Result<ProjectConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    toml::from_str(&content).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

/// Load project config, falling back to a default if the file doesn't exist.
pub fn load_or_default(path: &Path) -> ProjectConfig {
    match load_project(path) {
        Ok(config) => {
            log::info!(
                "Loaded project: {} ({} startup documents)",
                config.project.name,
                config.startup.open.len()
            );
            config
        }
        Err(e) => {
            log::warn!("No project file ({e}), using defaults");
            ProjectConfig::default()
        }
    }
}
