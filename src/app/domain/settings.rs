use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::infrastructure::error::AppError;

const MIN_FONT_SIZE: u32 = 6;
const MAX_FONT_SIZE: u32 = 72;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_font_family")]
    pub font_family: String,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default = "default_line_numbers")]
    pub line_numbers_enabled: bool,

    /// Directory shown in the tree at startup; the working directory when unset.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,

    #[serde(default)]
    pub lint: LintSettings,
}

/// External style-checker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintSettings {
    /// Send an empty report to the lint panel (clearing old findings).
    #[serde(default = "default_forward_empty")]
    pub forward_empty: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Checker command per file extension; the file path is appended as the
    /// last argument.
    #[serde(default = "default_lint_commands")]
    pub commands: BTreeMap<String, Vec<String>>,
}

fn default_font_family() -> String {
    "Courier".to_string()
}

fn default_font_size() -> u32 {
    14
}

fn default_line_numbers() -> bool {
    true
}

fn default_forward_empty() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_lint_commands() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([("py".to_string(), vec!["flake8".to_string()])])
}

impl Default for LintSettings {
    fn default() -> Self {
        Self {
            forward_empty: default_forward_empty(),
            timeout_secs: default_timeout_secs(),
            commands: default_lint_commands(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: default_font_size(),
            line_numbers_enabled: default_line_numbers(),
            root_dir: None,
            lint: LintSettings::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from disk, or create default if not exists
    pub fn load() -> Self {
        Self::load_from(&Self::get_config_path())
    }

    pub fn load_from(config_path: &Path) -> Self {
        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(settings) => match settings.validate() {
                    Ok(()) => settings,
                    Err(e) => {
                        tracing::warn!("{}. Using defaults.", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to parse settings: {}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(_) => {
                // File doesn't exist, use defaults
                let default = Self::default();
                if let Err(e) = default.save_to(config_path) {
                    tracing::warn!("Could not write default settings: {}", e);
                }
                default
            }
        }
    }

    /// Reject values the editor cannot work with.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size) {
            return Err(AppError::Settings(format!(
                "font_size {} is outside {}..={}",
                self.font_size, MIN_FONT_SIZE, MAX_FONT_SIZE
            )));
        }
        if self.lint.timeout_secs == 0 {
            return Err(AppError::Settings("lint.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Save settings to disk
    pub fn save_to(&self, config_path: &Path) -> Result<(), AppError> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(config_path, json)?;

        Ok(())
    }

    /// Get config file path (cross-platform)
    pub fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("busy");
        path.push("settings.json");
        path
    }

    /// Tree root at startup.
    pub fn initial_root(&self) -> PathBuf {
        self.root_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
