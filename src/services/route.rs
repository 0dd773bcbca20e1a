// src/services/route.rs v2
//! Driving directions via the OSRM route API

use crate::error::{MapError, Result};
use crate::geo::LatLng;
use serde::Deserialize;

/// A computed route: raw figures, display text and the polyline to draw
#[derive(Debug, Clone)]
pub struct RouteSummary {
    pub distance_m: f64,
    pub duration_s: f64,
    pub distance_text: String,
    pub duration_text: String,
    pub polyline: Vec<LatLng>,
}

pub struct DirectionsService {
    client: reqwest::Client,
    base_url: String,
}

impl DirectionsService {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: super::http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Request a driving route between two coordinates
    pub async fn route(&self, origin: LatLng, destination: LatLng) -> Result<RouteSummary> {
        // OSRM wants lng,lat pairs
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.base_url, origin.lng, origin.lat, destination.lng, destination.lat
        );
        log::debug!("routing {} -> {}", origin, destination);

        let response = self
            .client
            .get(url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapError::Route(status.to_string()));
        }

        let body = response.text().await?;
        parse_route_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<[f64; 2]>,
}

/// Parse an OSRM route response body. A non-"Ok" code is surfaced raw.
pub fn parse_route_response(body: &str) -> Result<RouteSummary> {
    let response: RouteResponse = serde_json::from_str(body)
        .map_err(|e| MapError::Route(format!("unparseable response: {}", e)))?;

    if response.code != "Ok" {
        return Err(MapError::Route(response.code));
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| MapError::Route("NoRoute".to_string()))?;

    let polyline = route
        .geometry
        .coordinates
        .iter()
        .map(|&[lng, lat]| LatLng::new(lat, lng))
        .collect();

    Ok(RouteSummary {
        distance_m: route.distance,
        duration_s: route.duration,
        distance_text: format_distance(route.distance),
        duration_text: format_duration(route.duration),
        polyline,
    })
}

/// Format metres for display
pub fn format_distance(metres: f64) -> String {
    if metres < 1000.0 {
        format!("{} m", metres.round() as i64)
    } else {
        format!("{:.1} km", metres / 1000.0)
    }
}

/// Format seconds for display, never below one minute
pub fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).round().max(1.0) as i64;
    if minutes < 60 {
        format!("{} min", minutes)
    } else {
        format!("{} h {} min", minutes / 60, minutes % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "code":"Ok",
        "routes":[{
            "distance":3241.9,
            "duration":412.6,
            "geometry":{"coordinates":[[-79.8711,43.2557],[-79.8667,43.2531],[-79.8578,43.2489]],"type":"LineString"},
            "legs":[]
        }],
        "waypoints":[]
    }"#;

    #[test]
    fn test_parse_route() {
        let summary = parse_route_response(FIXTURE).unwrap();
        assert_eq!(summary.distance_text, "3.2 km");
        assert_eq!(summary.duration_text, "7 min");
        assert_eq!(summary.polyline.len(), 3);
        // GeoJSON pairs are lng,lat; the polyline must come out lat,lng
        assert!((summary.polyline[0].lat - 43.2557).abs() < 1e-9);
        assert!((summary.polyline[0].lng - (-79.8711)).abs() < 1e-9);
    }

    #[test]
    fn test_parse_error_code_surfaced_raw() {
        let body = r#"{"code":"NoSegment","routes":[]}"#;
        match parse_route_response(body).unwrap_err() {
            MapError::Route(code) => assert_eq!(code, "NoSegment"),
            other => panic!("expected Route error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_ok_with_no_routes() {
        let body = r#"{"code":"Ok","routes":[]}"#;
        assert!(matches!(parse_route_response(body), Err(MapError::Route(_))));
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(412.0), "412 m");
        assert_eq!(format_distance(999.4), "999 m");
        assert_eq!(format_distance(1500.0), "1.5 km");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(20.0), "1 min");
        assert_eq!(format_duration(412.6), "7 min");
        assert_eq!(format_duration(4500.0), "1 h 15 min");
    }
}
