use anyhow::Result;
use directories::ProjectDirs;
use linecore::SessionOptions;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs::try_exists;

const DEFAULT_LARGE_FILE_WARNING_BYTES: u64 = 512 * 1024 * 1024;
const DEFAULT_TAB_SIZE: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,
    pub gutter: GutterConfig,
    /// Directory for mirror and scratch files. `None` uses the system temp dir.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
    pub large_file_warning_bytes: u64,
    /// Fixed sampler seed, mostly useful for demos and bug reports.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_tab_size")]
    pub tab_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub selected: String,
    pub context: String,
    pub marked: String,
    #[serde(default = "default_title_color")]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GutterConfig {
    pub marked: String,
    pub unmarked: String,
}

fn default_tab_size() -> usize {
    DEFAULT_TAB_SIZE
}

fn default_title_color() -> String {
    String::from("#D6BA7C")
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            selected: String::from("#FFFFFF"),
            context: String::from("#808080"),
            marked: String::from("#E06C75"),
            title: default_title_color(),
        }
    }
}

impl Default for GutterConfig {
    fn default() -> Self {
        Self {
            marked: String::from("x"),
            unmarked: String::from(" "),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            gutter: GutterConfig::default(),
            scratch_dir: None,
            large_file_warning_bytes: DEFAULT_LARGE_FILE_WARNING_BYTES,
            seed: None,
            tab_size: DEFAULT_TAB_SIZE,
        }
    }
}

impl Config {
    pub async fn load() -> Result<Self> {
        if let Some(config_path) = Self::config_path() {
            if try_exists(&config_path).await? {
                match tokio::fs::read_to_string(&config_path).await {
                    Ok(content) => {
                        if content.trim().is_empty() {
                            log::warn!("Config file is empty, writing defaults");
                            let default_config = Self::default();
                            let _ = default_config.save().await;
                            return Ok(default_config);
                        }

                        match serde_json::from_str::<Self>(&content) {
                            Ok(mut config) => {
                                config.validate();
                                log::info!("Loaded config from: {}", config_path.display());
                                return Ok(config);
                            }
                            Err(json_err) => {
                                log::error!("Failed to parse config file: {}", json_err);

                                let backup_path = config_path.with_extension("bak");
                                if let Err(e) = tokio::fs::copy(&config_path, &backup_path).await {
                                    log::warn!("Failed to back up broken config: {}", e);
                                } else {
                                    log::info!(
                                        "Backed up broken config to: {}",
                                        backup_path.display()
                                    );
                                }

                                let default_config = Self::default();
                                let _ = default_config.save().await;
                                return Ok(default_config);
                            }
                        }
                    }
                    Err(io_err) => {
                        log::error!("Failed to read config file: {}", io_err);
                    }
                }
            } else {
                log::info!("Config file does not exist, creating default");
            }
        }

        let default_config = Self::default();
        let _ = default_config.save().await;
        Ok(default_config)
    }

    pub async fn save(&self) -> Result<()> {
        let Some(config_path) = Self::config_path() else {
            return Ok(());
        };
        let mut config_to_save = self.clone();
        config_to_save.validate();

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                )
            })?;
        }

        let content = serde_json::to_string_pretty(&config_to_save)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
        tokio::fs::write(&config_path, content).await.map_err(|e| {
            anyhow::anyhow!(
                "Failed to write config file {}: {}",
                config_path.display(),
                e
            )
        })?;
        log::info!("Saved config to: {}", config_path.display());
        Ok(())
    }

    /// Replace invalid values with defaults. Returns true if anything changed.
    pub fn validate(&mut self) -> bool {
        let mut has_issues = false;
        let defaults = Theme::default();

        for (name, value, fallback) in [
            ("selected", &mut self.theme.selected, defaults.selected),
            ("context", &mut self.theme.context, defaults.context),
            ("marked", &mut self.theme.marked, defaults.marked),
            ("title", &mut self.theme.title, defaults.title),
        ] {
            if parse_color(value).is_none() {
                log::warn!("Invalid {} color {:?}, using {}", name, value, fallback);
                *value = fallback;
                has_issues = true;
            }
        }

        if self.gutter.marked.trim().is_empty() {
            log::warn!("Empty marked gutter glyph, using default");
            self.gutter.marked = GutterConfig::default().marked;
            has_issues = true;
        }
        if self.gutter.unmarked.is_empty() {
            self.gutter.unmarked = GutterConfig::default().unmarked;
            has_issues = true;
        }

        if self.large_file_warning_bytes == 0 {
            log::warn!("large_file_warning_bytes must be positive, using default");
            self.large_file_warning_bytes = DEFAULT_LARGE_FILE_WARNING_BYTES;
            has_issues = true;
        }

        if self.tab_size == 0 || self.tab_size > 16 {
            log::warn!("Invalid tab size: {}, using default", self.tab_size);
            self.tab_size = DEFAULT_TAB_SIZE;
            has_issues = true;
        }

        if has_issues {
            log::info!("Configuration validation completed with corrections");
        }
        has_issues
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            scratch_dir: self.scratch_dir.clone(),
            seed: self.seed,
        }
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("LINESIFT_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("LINESIFT_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        ProjectDirs::from("com", "linesift", "linesift")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}

/// Accepts `#RRGGBB` or one of ratatui's named colors.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        return Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?));
    }
    value.parse::<Color>().ok()
}
