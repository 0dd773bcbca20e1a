// src/lib.rs
//! Hump Map Library
//!
//! An interactive map of traffic-calming installations: category filters,
//! device location, address geocoding for user-added entries, and driving
//! directions between points.

pub mod config;
pub mod controller;
pub mod dataset;
pub mod display;
pub mod error;
pub mod geo;
pub mod marker;
pub mod record;
pub mod services;
pub mod stats;

// Re-export main types for convenience
pub use config::MapConfig;
pub use controller::{MapController, MarkerFilter, Notice, OriginChoice};
pub use error::{MapError, Result};
pub use geo::LatLng;
pub use record::{NewLocation, PointCategory, PointRecord};
