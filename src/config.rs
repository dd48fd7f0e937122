use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub ghosts: GhostsConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    /// Level loaded by the viewer when none is given on the command line
    #[serde(default = "default_level_file")]
    pub level_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    /// Distance per tick
    #[serde(default = "default_player_speed")]
    pub speed: f32,
    #[serde(default = "default_agent_radius")]
    pub radius: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GhostsConfig {
    /// Distance per tick
    #[serde(default = "default_ghost_speed")]
    pub speed: f32,
    #[serde(default = "default_agent_radius")]
    pub radius: f32,
    /// Seconds; each ghost draws its interval from [min, max)
    #[serde(default = "default_min_decision_interval")]
    pub min_decision_interval: f64,
    #[serde(default = "default_max_decision_interval")]
    pub max_decision_interval: f64,
    #[serde(default = "default_initial_ghosts")]
    pub initial_count: usize,
    #[serde(default = "default_max_ghosts")]
    pub max_count: usize,
    /// One more ghost every time the score reaches a multiple of this
    #[serde(default = "default_escalation_score")]
    pub escalation_score: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_duration_secs")]
    pub duration_secs: f64,
    #[serde(default = "default_teleport_secs")]
    pub teleport_secs: f64,
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Clicks within this distance of a collectible path to it
    #[serde(default = "default_click_radius")]
    pub click_radius: f32,
    #[serde(default = "default_decoys")]
    pub decoys: usize,
    /// Minimum per-axis cell spacing between collectibles
    #[serde(default = "default_min_spacing")]
    pub min_spacing: i32,
    #[serde(default = "default_target_score")]
    pub target_score: u32,
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
    #[serde(default = "default_show_path")]
    pub show_path: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

// Default values
fn default_cell_size() -> f32 { 20.0 }
fn default_level_file() -> String { "levels/default.txt".to_string() }
fn default_player_speed() -> f32 { 1.0 }
fn default_ghost_speed() -> f32 { 0.3 }
fn default_agent_radius() -> f32 { 8.0 }
fn default_min_decision_interval() -> f64 { 1.0 }
fn default_max_decision_interval() -> f64 { 3.0 }
fn default_initial_ghosts() -> usize { 2 }
fn default_max_ghosts() -> usize { 8 }
fn default_escalation_score() -> u32 { 30 }
fn default_duration_secs() -> f64 { 300.0 }
fn default_teleport_secs() -> f64 { 1.0 }
fn default_tick_rate() -> u32 { 60 }
fn default_click_radius() -> f32 { 30.0 }
fn default_decoys() -> usize { 3 }
fn default_min_spacing() -> i32 { 3 }
fn default_target_score() -> u32 { 10 }
fn default_window_title() -> String { "Maze Chase".to_string() }
fn default_bg_r() -> u8 { 10 }
fn default_bg_g() -> u8 { 10 }
fn default_bg_b() -> u8 { 30 }
fn default_show_path() -> bool { true }
fn default_log_filter() -> String { "info".to_string() }
fn default_snapshot_path() -> String { "session_snapshot.json".to_string() }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            level_file: default_level_file(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: default_player_speed(),
            radius: default_agent_radius(),
        }
    }
}

impl Default for GhostsConfig {
    fn default() -> Self {
        Self {
            speed: default_ghost_speed(),
            radius: default_agent_radius(),
            min_decision_interval: default_min_decision_interval(),
            max_decision_interval: default_max_decision_interval(),
            initial_count: default_initial_ghosts(),
            max_count: default_max_ghosts(),
            escalation_score: default_escalation_score(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            teleport_secs: default_teleport_secs(),
            tick_rate: default_tick_rate(),
            click_radius: default_click_radius(),
            decoys: default_decoys(),
            min_spacing: default_min_spacing(),
            target_score: default_target_score(),
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
            show_path: default_show_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            player: PlayerConfig::default(),
            ghosts: GhostsConfig::default(),
            session: SessionConfig::default(),
            visual: VisualConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text; missing fields take defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load configuration from `config.toml`, or use defaults if the file is
    /// missing or invalid
    pub fn load() -> Self {
        match Self::from_file("config.toml") {
            Ok(config) => {
                info!("loaded configuration from config.toml");
                config
            }
            Err(ConfigError::Io(_)) => {
                info!("no config.toml found, using default configuration");
                Config::default()
            }
            Err(e) => {
                warn!("{e}; using default configuration");
                Config::default()
            }
        }
    }

    /// Seconds per simulation tick
    pub fn tick_secs(&self) -> f64 {
        1.0 / f64::from(self.session.tick_rate.max(1))
    }
}

/// Install the global `tracing` subscriber. `RUST_LOG` takes precedence over
/// the configured filter.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
