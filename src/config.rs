use crate::obstacle::TemplatePolicy;
use crate::preset::Preset;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Extra presets on top of the built-in ones
    #[serde(default)]
    pub presets: Vec<Preset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default = "default_min_size")]
    pub min_size: i32,
    #[serde(default = "default_max_size")]
    pub max_size: i32,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
}

/// Footprint choice probabilities for multi-cell placement
#[derive(Debug, Clone, Deserialize)]
pub struct PlacementConfig {
    #[serde(default = "default_shelf_small_probability")]
    pub shelf_small_probability: f64,
    #[serde(default = "default_crate_stack_probability")]
    pub crate_stack_probability: f64,
    /// Fixed seed for reproducible layouts
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusConfig {
    #[serde(default = "default_status_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualConfig {
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_bg_r")]
    pub background_r: u8,
    #[serde(default = "default_bg_g")]
    pub background_g: u8,
    #[serde(default = "default_bg_b")]
    pub background_b: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

// Default values
fn default_width() -> i32 { 20 }
fn default_height() -> i32 { 15 }
fn default_min_size() -> i32 { 5 }
fn default_max_size() -> i32 { 50 }
fn default_cell_size() -> f32 { 35.0 }
fn default_step_delay_ms() -> u64 { 300 }
fn default_shelf_small_probability() -> f64 { 0.5 }
fn default_crate_stack_probability() -> f64 { 0.7 }
fn default_status_capacity() -> usize { 20 }
fn default_window_title() -> String { "Warehouse Robot Simulator".to_string() }
fn default_bg_r() -> u8 { 245 }
fn default_bg_g() -> u8 { 245 }
fn default_bg_b() -> u8 { 240 }
fn default_log_filter() -> String { "warehouse_sim=info".to_string() }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            min_size: default_min_size(),
            max_size: default_max_size(),
            cell_size: default_cell_size(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: default_step_delay_ms(),
        }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            shelf_small_probability: default_shelf_small_probability(),
            crate_stack_probability: default_crate_stack_probability(),
            seed: None,
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            capacity: default_status_capacity(),
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            background_r: default_bg_r(),
            background_g: default_bg_g(),
            background_b: default_bg_b(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl AnimationConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

impl PlacementConfig {
    pub fn policy(&self) -> TemplatePolicy {
        TemplatePolicy::new(self.shelf_small_probability, self.crate_stack_probability)
    }
}

impl GridConfig {
    pub fn accepts(&self, width: i32, height: i32) -> bool {
        let range = self.min_size..=self.max_size;
        range.contains(&width) && range.contains(&height)
    }
}

impl Config {
    /// Load configuration from file, or use defaults if the file is missing or malformed
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    warn!("Using default configuration");
                    Config::default()
                }
            },
            Err(_) => {
                info!("No {} found, using default configuration", path.display());
                Config::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
