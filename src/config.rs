//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! watchface-config.toml file. It covers the clock format preference, the sync
//! data path, the per-shape layout and the color palette, plus the simulated
//! display used when running on a desktop.

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::render::Palette;
use crate::sync::WEATHER_PATH;

/// Default configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "watchface-config.toml";

/// Errors from reading, writing or interpreting the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A palette entry that is not a `#RRGGBB` hex color
    #[error("invalid color `{0}` (expected #RRGGBB)")]
    InvalidColor(String),
}

/// Application configuration loaded from watchface-config.toml
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Time display preferences
    pub clock: ClockConfig,
    /// Phone sync settings
    pub sync: SyncConfig,
    /// Text offsets and sizes
    pub layout: LayoutConfig,
    /// Face colors
    pub palette: PaletteConfig,
    /// Simulated display for desktop runs
    pub display: DisplayConfig,
}

/// Time display preferences
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClockConfig {
    /// Show `HH:MM` instead of `H:MM am/pm`
    pub use_24_hour: bool,
}

/// Phone sync settings
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Data item path the phone publishes weather under
    pub weather_path: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            weather_path: WEATHER_PATH.to_string(),
        }
    }
}

/// Vertical offsets shared by all shapes, plus per-shape text sizes
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Baseline of the time text
    pub time_y: i32,
    /// Baseline of the date text
    pub date_y: i32,
    /// Vertical position of the divider line
    pub divider_y: i32,
    /// Baseline of the temperature text
    pub temp_y: i32,
    /// Bottom edge of the weather icon
    pub icon_y: i32,
    /// Text sizes on rectangular screens
    pub square: ShapeSizes,
    /// Text sizes on round screens
    pub round: ShapeSizes,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            time_y: 110,
            date_y: 145,
            divider_y: 175,
            temp_y: 220,
            icon_y: 224,
            square: ShapeSizes {
                time_size: 29,
                date_size: 12,
                temp_size: 22,
            },
            round: ShapeSizes {
                time_size: 29,
                date_size: 14,
                temp_size: 22,
            },
        }
    }
}

/// Text heights in pixels for one display shape
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ShapeSizes {
    pub time_size: u32,
    pub date_size: u32,
    pub temp_size: u32,
}

/// Face colors as `#RRGGBB` strings
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PaletteConfig {
    /// Interactive background
    pub primary: String,
    /// Date, low temperature and divider
    pub primary_text: String,
    /// Time and high temperature
    pub secondary_text: String,
    /// Date and low temperature in ambient mode
    pub ambient_text: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            primary: "#03A9F4".to_string(),
            primary_text: "#B3E5FC".to_string(),
            secondary_text: "#FFFFFF".to_string(),
            ambient_text: "#FFFFFF".to_string(),
        }
    }
}

impl PaletteConfig {
    pub fn to_palette(&self) -> Result<Palette, ConfigError> {
        Ok(Palette {
            primary: parse_hex_color(&self.primary)?,
            primary_text: parse_hex_color(&self.primary_text)?,
            secondary_text: parse_hex_color(&self.secondary_text)?,
            ambient_text: parse_hex_color(&self.ambient_text)?,
        })
    }
}

/// Simulated display for desktop runs
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// Report round window insets to the face
    pub round: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 320,
            round: false,
        }
    }
}

/// Parse `#RRGGBB` (the `#` is optional) into the display's RGB565 format.
pub fn parse_hex_color(value: &str) -> Result<Rgb565, ConfigError> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidColor(value.to_string()));
    }
    let rgb = u32::from_str_radix(hex, 16)
        .map_err(|_| ConfigError::InvalidColor(value.to_string()))?;
    let color = Rgb888::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8);
    Ok(Rgb565::from(color))
}

impl Config {
    /// Load configuration from watchface-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load_from_path(&path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.as_ref().display());
                config
            }
            Err(ConfigError::Io(_)) => {
                info!("No config file found, using default configuration");
                Self::default()
            }
            Err(e) => {
                warn!("{e}; using default configuration");
                Self::default()
            }
        }
    }

    /// Load configuration, reporting why it could not be read
    pub fn try_load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str::<Config>(&contents)?)
    }

    /// Save current configuration as pretty TOML
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }
}
