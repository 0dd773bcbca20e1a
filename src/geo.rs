// src/geo.rs v2
//! Coordinate types, great-circle distance and web-mercator projection

use serde::{Deserialize, Serialize};

/// Mean earth radius in metres
const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check coordinates are finite and inside the valid WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance to another point in metres (haversine)
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Project lat/lng to world pixel coordinates at the given zoom level
/// (256px tiles, web-mercator)
pub fn lat_lng_to_world_px(pos: &LatLng, zoom: u8) -> (f64, f64) {
    let scale = 256.0 * 2_f64.powi(zoom as i32);
    let x = (pos.lng + 180.0) / 360.0 * scale;
    let lat_rad = pos.lat.to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI)
        / 2.0
        * scale;
    (x, y)
}

/// Inverse of [`lat_lng_to_world_px`]
pub fn world_px_to_lat_lng(x: f64, y: f64, zoom: u8) -> LatLng {
    let scale = 256.0 * 2_f64.powi(zoom as i32);
    let lng = x / scale * 360.0 - 180.0;
    let lat_rad = ((1.0 - 2.0 * y / scale) * std::f64::consts::PI).sinh().atan();
    LatLng::new(lat_rad.to_degrees(), lng)
}
