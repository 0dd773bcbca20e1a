// src/error.rs
//! Error types for the hump map

use std::fmt;

pub type Result<T> = std::result::Result<T, MapError>;

#[derive(Debug)]
pub enum MapError {
    Io(std::io::Error),
    Http(reqwest::Error),
    Json(serde_json::Error),
    Load(String),
    Geocode(String),
    Route(String),
    Geolocation(String),
    Validation(String),
    Connection(String),
    Other(String),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Io(e) => write!(f, "IO error: {}", e),
            MapError::Http(e) => write!(f, "HTTP error: {}", e),
            MapError::Json(e) => write!(f, "JSON error: {}", e),
            MapError::Load(msg) => write!(f, "Dataset error: {}", msg),
            MapError::Geocode(status) => write!(f, "Geocoding failed: {}", status),
            MapError::Route(status) => write!(f, "Directions request failed: {}", status),
            MapError::Geolocation(msg) => write!(f, "Geolocation error: {}", msg),
            MapError::Validation(msg) => write!(f, "{}", msg),
            MapError::Connection(msg) => write!(f, "Connection error: {}", msg),
            MapError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for MapError {}

impl From<std::io::Error> for MapError {
    fn from(error: std::io::Error) -> Self {
        MapError::Io(error)
    }
}

impl From<reqwest::Error> for MapError {
    fn from(error: reqwest::Error) -> Self {
        MapError::Http(error)
    }
}

impl From<serde_json::Error> for MapError {
    fn from(error: serde_json::Error) -> Self {
        MapError::Json(error)
    }
}

impl From<anyhow::Error> for MapError {
    fn from(error: anyhow::Error) -> Self {
        MapError::Other(error.to_string())
    }
}
