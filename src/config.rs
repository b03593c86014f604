//! Configuration System for Swan
//! Background tuning, API endpoint and display options

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Environment variable naming a JSON config file
pub const CONFIG_PATH_VAR: &str = "SWAN_CONFIG";

/// Environment variable overriding the API base URL
pub const API_URL_VAR: &str = "SWAN_API_URL";

// ============================================================================
// Background (particle field)
// ============================================================================

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Pixels of surface area per particle (lower = denser field)
    pub density_divisor: f32,

    /// Max absolute speed per axis, in px/frame
    pub max_speed: f32,

    /// Base radius range
    pub min_size: f32,
    pub max_size: f32,

    /// Per-particle opacity range, kept low so the effect stays subtle
    pub min_opacity: f32,
    pub max_opacity: f32,

    /// Pulsation phase advance per frame
    pub min_pulse_speed: f32,
    pub max_pulse_speed: f32,

    /// Radius swing of the breathing effect
    pub pulse_amplitude: f32,

    /// Fill alpha as a fraction of particle opacity
    pub fill_alpha: f32,

    /// Halo centre alpha as a fraction of particle opacity
    pub halo_alpha: f32,

    /// Halo radius as a multiple of the rendered radius
    pub halo_scale: f32,

    /// Rim vertices of the halo's triangle fan
    pub halo_segments: usize,

    /// Pairs closer than this get a connecting line
    pub connection_distance: f32,

    /// Line alpha at zero distance
    pub connection_opacity: f32,

    pub connection_width: f32,

    /// Switch from the pairwise scan to a spatial grid above this count
    pub grid_threshold: usize,

    /// Rebuild the whole field when the viewport changes
    pub regenerate_on_resize: bool,

    pub particle_color: [u8; 3],
    pub glow_color: [u8; 3],

    /// Diagonal background gradient: edges and middle
    pub background_edge: [u8; 3],
    pub background_mid: [u8; 3],
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            density_divisor: 8000.0,
            max_speed: 0.1,
            min_size: 0.3,
            max_size: 1.8,
            min_opacity: 0.05,
            max_opacity: 0.25,
            min_pulse_speed: 0.003,
            max_pulse_speed: 0.013,
            pulse_amplitude: 0.3,
            fill_alpha: 0.4,
            halo_alpha: 0.1,
            halo_scale: 2.0,
            halo_segments: 16,
            connection_distance: 120.0,
            connection_opacity: 0.05,
            connection_width: 0.2,
            grid_threshold: 400,
            regenerate_on_resize: false,
            particle_color: [59, 130, 246],
            glow_color: [96, 165, 250],
            background_edge: [15, 23, 42],
            background_mid: [23, 37, 84],
        }
    }
}

impl BackgroundConfig {
    /// Number of particles for a surface of the given size
    pub fn particle_count(&self, width: f32, height: f32) -> usize {
        if width <= 0.0 || height <= 0.0 || self.density_divisor <= 0.0 {
            return 0;
        }
        (width * height / self.density_divisor).floor() as usize
    }
}

// ============================================================================
// Quote API
// ============================================================================

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct ApiConfig {
    /// Scheme + host of the quote service, without the route
    pub base_url: String,

    pub timeout_secs: u64,

    /// Author shown when the service omits one
    pub fallback_author: String,

    /// Text shown when a request fails for any reason
    pub failure_quote: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            fallback_author: "Swan".to_string(),
            failure_quote: "Failed to generate quote.".to_string(),
        }
    }
}

// ============================================================================
// Display
// ============================================================================

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct DisplayConfig {
    /// TTF/OTF with Arabic glyphs; the default egui fonts have none
    pub arabic_font_path: Option<String>,

    pub quote_size: f32,
    pub author_size: f32,

    pub repository_url: String,
    pub author_site_url: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            arabic_font_path: None,
            quote_size: 24.0,
            author_size: 15.0,
            repository_url: "https://github.com/1AyaNabil1/Ai-Quotes-Generator".to_string(),
            author_site_url: "https://ayanexus.dev/".to_string(),
        }
    }
}

// ============================================================================
// Main App Configuration
// ============================================================================

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub background: BackgroundConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing config to {path}"))?;
        Ok(())
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let json =
            std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
        let config = serde_json::from_str(&json).with_context(|| format!("parsing config {path}"))?;
        Ok(config)
    }

    /// Load `path`, or write the defaults there when the file does not exist yet
    pub fn load_or_init(path: &str) -> anyhow::Result<Self> {
        if Path::new(path).exists() {
            return Self::load(path);
        }
        let config = Self::default();
        config.save(path)?;
        log::info!("Wrote default config to {path}");
        Ok(config)
    }

    /// Defaults, then the file named by `SWAN_CONFIG`, then `SWAN_API_URL`
    pub fn from_env() -> Self {
        let mut config = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => match Self::load_or_init(&path) {
                Ok(config) => {
                    log::info!("Using config from {path}");
                    config
                }
                Err(e) => {
                    log::warn!("Invalid {CONFIG_PATH_VAR} ({e:#}), using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("{CONFIG_PATH_VAR} not set, using default config");
                Self::default()
            }
        };

        config.apply_api_override(env::var(API_URL_VAR).ok());
        config
    }

    fn apply_api_override(&mut self, url: Option<String>) {
        match url.map(|u| u.trim().to_string()) {
            Some(url) if !url.is_empty() => {
                log::info!("{API_URL_VAR} overrides API base URL: {url}");
                self.api.base_url = url;
            }
            Some(_) => log::warn!("{API_URL_VAR} is empty, keeping {}", self.api.base_url),
            None => {}
        }
    }
}
