use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_sound_enabled")]
    pub sound_enabled: bool,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default = "default_current_theme")]
    pub current_theme: String,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_start_pause")]
    pub start_pause: String,
    #[serde(default = "default_work_mode")]
    pub work_mode: String,
    #[serde(default = "default_short_break")]
    pub short_break: String,
    #[serde(default = "default_long_break")]
    pub long_break: String,
    #[serde(default = "default_edit_label")]
    pub edit_label: String,
    #[serde(default = "default_end_early")]
    pub end_early: String,
    #[serde(default = "default_add_task")]
    pub add_task: String,
    #[serde(default = "default_toggle_task")]
    pub toggle_task: String,
    #[serde(default = "default_delete_task")]
    pub delete_task: String,
    #[serde(default = "default_set_mood")]
    pub set_mood: String,
    #[serde(default = "default_review")]
    pub review: String,
    #[serde(default = "default_copy_review")]
    pub copy_review: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_prev_day")]
    pub prev_day: String,
    #[serde(default = "default_next_day")]
    pub next_day: String,
    #[serde(default = "default_today")]
    pub today: String,
    #[serde(default = "default_goto_date")]
    pub goto_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
    #[serde(default = "default_accent")]
    pub accent: String,
}

/// Generative-text service used for the end-of-day review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default = "default_review_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_review_model")]
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let mut themes = HashMap::new();

        // Example custom theme so users can see the shape
        themes.insert("tomato".to_string(), Theme {
            fg: "white".to_string(),
            bg: "black".to_string(),
            highlight_bg: "red".to_string(),
            highlight_fg: "white".to_string(),
            accent: "lightred".to_string(),
        });

        Self {
            database_path: default_database_path(),
            sound_enabled: default_sound_enabled(),
            key_bindings: KeyBindings::default(),
            current_theme: default_current_theme(),
            themes,
            review: ReviewConfig::default(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            help: default_help(),
            start_pause: default_start_pause(),
            work_mode: default_work_mode(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            edit_label: default_edit_label(),
            end_early: default_end_early(),
            add_task: default_add_task(),
            toggle_task: default_toggle_task(),
            delete_task: default_delete_task(),
            set_mood: default_set_mood(),
            review: default_review(),
            copy_review: default_copy_review(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            prev_day: default_prev_day(),
            next_day: default_next_day(),
            today: default_today(),
            goto_date: default_goto_date(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
            accent: default_accent(),
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            endpoint: default_review_endpoint(),
            model: default_review_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Theme {
    /// Get preset themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        let mut themes = HashMap::new();

        themes.insert("default".to_string(), Theme::default());

        themes.insert("light".to_string(), Theme {
            fg: "black".to_string(),
            bg: "white".to_string(),
            highlight_bg: "blue".to_string(),
            highlight_fg: "white".to_string(),
            accent: "red".to_string(),
        });

        themes.insert("monochrome".to_string(), Theme {
            fg: "white".to_string(),
            bg: "black".to_string(),
            highlight_bg: "white".to_string(),
            highlight_fg: "".to_string(),
            accent: "white".to_string(),
        });

        themes
    }
}

// Default value functions
fn default_database_path() -> String {
    Config::default_database_path_for_profile(utils::Profile::Prod)
}

fn default_sound_enabled() -> bool {
    true
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_start_pause() -> String {
    "s".to_string()
}

fn default_work_mode() -> String {
    "1".to_string()
}

fn default_short_break() -> String {
    "2".to_string()
}

fn default_long_break() -> String {
    "3".to_string()
}

fn default_edit_label() -> String {
    "e".to_string()
}

fn default_end_early() -> String {
    "x".to_string()
}

fn default_add_task() -> String {
    "a".to_string()
}

fn default_toggle_task() -> String {
    "Space".to_string()
}

fn default_delete_task() -> String {
    "d".to_string()
}

fn default_set_mood() -> String {
    "m".to_string()
}

fn default_review() -> String {
    "r".to_string()
}

fn default_copy_review() -> String {
    "Ctrl+y".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_prev_day() -> String {
    "Left".to_string()
}

fn default_next_day() -> String {
    "Right".to_string()
}

fn default_today() -> String {
    "t".to_string()
}

fn default_goto_date() -> String {
    "g".to_string()
}

fn default_current_theme() -> String {
    "default".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_highlight_fg() -> String {
    "white".to_string()
}

fn default_accent() -> String {
    "lightred".to_string()
}

fn default_review_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_review_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Load the profile's config file, or create it with defaults if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Self::load_from_path(&config_path, profile)
    }

    /// Load configuration from an explicit file path (the `--config` flag).
    /// A missing file is created with defaults for `profile`.
    pub fn load_from_path(config_path: &Path, profile: utils::Profile) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            tracing::debug!(path = %config_path.display(), "config loaded");
            Ok(config)
        } else {
            let mut config = Config::default();
            config.database_path = Self::default_database_path_for_profile(profile);
            if let Err(e) = config.save_to_path(config_path) {
                tracing::error!(path = %config_path.display(), error = %e, "failed to save default config");
                return Err(e);
            }
            tracing::info!(path = %config_path.display(), "default config created");
            Ok(config)
        }
    }

    /// Write the configuration to `config_path`, creating parent directories
    pub fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("focuslog.db").to_string_lossy().to_string()
        } else {
            match profile {
                utils::Profile::Dev => "~/.local/share/focuslog-dev/focuslog.db".to_string(),
                utils::Profile::Prod => "~/.local/share/focuslog/focuslog.db".to_string(),
            }
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// Get the currently active theme
    /// If highlight_fg is empty, it is derived from highlight_bg
    pub fn get_active_theme(&self) -> Theme {
        use crate::tui::widgets::color::{format_color_for_display, get_contrast_text_color, parse_color};

        let mut theme = self
            .themes
            .get(&self.current_theme)
            .cloned()
            .or_else(|| Theme::get_preset_themes().remove(&self.current_theme))
            .unwrap_or_default();

        if theme.highlight_fg.is_empty() {
            let highlight_bg_color = parse_color(&theme.highlight_bg);
            let calculated_fg = get_contrast_text_color(highlight_bg_color);
            theme.highlight_fg = format_color_for_display(&calculated_fg);
        }

        theme
    }
}
