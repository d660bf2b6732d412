use crate::ui::menu::MenuOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for the command suite
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteConfig {
    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub messages: MessagesConfig,

    #[serde(default)]
    pub refactor: RefactorConfig,
}

/// Menu and scheduler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How often the UI thread checks for cancellation while a worker runs
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Prefix drawn in front of the highlighted menu entry
    #[serde(default = "default_highlight_marker")]
    pub highlight_marker: String,

    /// Caps menu height below the terminal height
    #[serde(default)]
    pub max_menu_rows: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// Style messages by severity. Plain prefixes are used otherwise.
    #[serde(default = "default_color")]
    pub color: bool,
}

/// Strings for the refactor selection prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefactorConfig {
    #[serde(default = "default_select_caption")]
    pub select_caption: String,

    #[serde(default = "default_select_message")]
    pub select_message: String,
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_highlight_marker() -> String {
    "> ".to_string()
}

fn default_color() -> bool {
    true
}

fn default_select_caption() -> String {
    "Select a refactor option".to_string()
}

fn default_select_message() -> String {
    "Choose a refactor to apply".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            highlight_marker: default_highlight_marker(),
            max_menu_rows: None,
        }
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
        }
    }
}

impl Default for RefactorConfig {
    fn default() -> Self {
        Self {
            select_caption: default_select_caption(),
            select_message: default_select_message(),
        }
    }
}

impl SuiteConfig {
    /// Load configuration with the usual hierarchy.
    ///
    /// **Config Priority (highest to lowest):**
    /// 1. `./commandsuite.toml` (project-level config)
    /// 2. `~/.config/commandsuite/config.toml` (global user config)
    /// 3. Hardcoded defaults
    ///
    /// The highest-priority file that exists replaces the ones below it;
    /// fields it omits take their defaults.
    pub fn load() -> Result<Self> {
        let mut config = SuiteConfig::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                tracing::info!("Loading global config from: {}", global_path.display());
                config = Self::load_from_file(&global_path)?;
            }
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            tracing::info!("Loading project config from: {}", project_path.display());
            config = Self::load_from_file(&project_path)?;
        }

        tracing::debug!(
            "Final config: poll_interval_ms={}, color={}",
            config.ui.poll_interval_ms,
            config.messages.color
        );

        Ok(config)
    }

    /// Load config from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the global config path (~/.config/commandsuite/config.toml)
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| {
            home.join(".config")
                .join("commandsuite")
                .join("config.toml")
        })
    }

    /// Get the project config path (./commandsuite.toml in current directory)
    pub fn project_config_path() -> PathBuf {
        PathBuf::from("commandsuite.toml")
    }

    /// Create a default config file at the specified path
    pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = SuiteConfig::default();
        let toml_string =
            toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
        }

        fs::write(path.as_ref(), toml_string).with_context(|| {
            format!("Failed to write config file: {}", path.as_ref().display())
        })?;

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.ui.poll_interval_ms.max(1))
    }

    pub fn menu_options(&self) -> MenuOptions {
        MenuOptions {
            highlight_marker: self.ui.highlight_marker.clone(),
            max_rows: self.ui.max_menu_rows,
            poll_interval: self.poll_interval(),
        }
    }
}
