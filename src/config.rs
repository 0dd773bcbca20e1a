// src/config.rs v2
//! Configuration management with file-based storage

use crate::error::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Default map center: Hamilton, ON
pub const DEFAULT_CENTER_LAT: f64 = 43.2557;
pub const DEFAULT_CENTER_LNG: f64 = -79.8711;
pub const DEFAULT_ZOOM: u8 = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Initial view center
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
    /// Appended to every geocoding query to scope it to the surrounding region
    pub region_suffix: String,
    /// Nominatim base URL
    pub geocoder_url: String,
    /// OSRM base URL
    pub router_url: String,
    /// Optional dataset override: file path or http(s) URL
    pub dataset: Option<String>,
    /// Geolocation source: "gpsd" or "fixed"
    pub locate_source: String,
    pub gpsd_host: Option<String>,
    pub gpsd_port: Option<u16>,
    pub fixed_lat: Option<f64>,
    pub fixed_lng: Option<f64>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: DEFAULT_CENTER_LAT,
            center_lng: DEFAULT_CENTER_LNG,
            zoom: DEFAULT_ZOOM,
            region_suffix: ", Hamilton, ON, Canada".to_string(),
            geocoder_url: "https://nominatim.openstreetmap.org".to_string(),
            router_url: "https://router.project-osrm.org".to_string(),
            dataset: None,
            locate_source: "gpsd".to_string(),
            gpsd_host: Some("localhost".to_string()),
            gpsd_port: Some(2947),
            fixed_lat: None,
            fixed_lng: None,
        }
    }
}

impl MapConfig {
    /// Load configuration from the config file, falling back to defaults when
    /// the file does not exist
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .map_err(|e| MapError::Other(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| MapError::Other(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to the config file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MapError::Other(format!("Failed to create config directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| MapError::Other(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, contents)
            .map_err(|e| MapError::Other(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_config_path() -> Result<std::path::PathBuf> {
        use std::path::PathBuf;

        let home = std::env::var("HOME")
            .map_err(|_| MapError::Other("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home).join(".config").join("hump-map").join("config.json"))
    }

    /// Update geolocation to a pinned position
    pub fn update_fixed_location(&mut self, lat: f64, lng: f64) {
        self.locate_source = "fixed".to_string();
        self.fixed_lat = Some(lat);
        self.fixed_lng = Some(lng);
    }

    /// Update geolocation to a gpsd daemon
    pub fn update_gpsd(&mut self, host: String, port: u16) {
        self.locate_source = "gpsd".to_string();
        self.gpsd_host = Some(host);
        self.gpsd_port = Some(port);
    }
}
