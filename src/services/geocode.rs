// src/services/geocode.rs v2
//! Address geocoding via the Nominatim search API

use crate::error::{MapError, Result};
use crate::geo::LatLng;
use serde::Deserialize;

pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
    region_suffix: String,
}

impl Geocoder {
    pub fn new(base_url: &str, region_suffix: &str) -> Result<Self> {
        Ok(Self {
            client: super::http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            region_suffix: region_suffix.to_string(),
        })
    }

    /// Resolve a free-text address to coordinates. The configured region
    /// suffix scopes every query to the surrounding area.
    pub async fn geocode(&self, address: &str) -> Result<LatLng> {
        let query = format!("{}{}", address.trim(), self.region_suffix);
        log::debug!("geocoding {:?}", query);

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapError::Geocode(status.to_string()));
        }

        let body = response.text().await?;
        parse_search_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Parse a Nominatim search response body. Coordinates arrive as strings.
pub fn parse_search_response(body: &str) -> Result<LatLng> {
    let hits: Vec<SearchHit> = serde_json::from_str(body)
        .map_err(|e| MapError::Geocode(format!("unparseable response: {}", e)))?;

    let hit = hits
        .first()
        .ok_or_else(|| MapError::Geocode("ZERO_RESULTS".to_string()))?;

    let lat: f64 = hit
        .lat
        .parse()
        .map_err(|_| MapError::Geocode(format!("bad latitude {:?}", hit.lat)))?;
    let lng: f64 = hit
        .lon
        .parse()
        .map_err(|_| MapError::Geocode(format!("bad longitude {:?}", hit.lon)))?;

    let position = LatLng::new(lat, lng);
    if !position.is_valid() {
        return Err(MapError::Geocode(format!("out-of-range result {}", position)));
    }

    log::debug!("geocoded to {} ({})", position, hit.display_name);
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_hit() {
        let body = r#"[{"place_id":12345,"lat":"43.2508211","lon":"-79.8660905","display_name":"Stinson Street, Hamilton, Ontario, Canada","importance":0.41}]"#;
        let position = parse_search_response(body).unwrap();
        assert!((position.lat - 43.2508211).abs() < 1e-9);
        assert!((position.lng - (-79.8660905)).abs() < 1e-9);
    }

    #[test]
    fn test_parse_zero_results() {
        let err = parse_search_response("[]").unwrap_err();
        match err {
            MapError::Geocode(status) => assert_eq!(status, "ZERO_RESULTS"),
            other => panic!("expected Geocode error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_bad_coordinate_string() {
        let body = r#"[{"lat":"not-a-number","lon":"-79.86"}]"#;
        assert!(matches!(parse_search_response(body), Err(MapError::Geocode(_))));
    }

    #[test]
    fn test_parse_out_of_range_result() {
        let body = r#"[{"lat":"99.0","lon":"-200.0"}]"#;
        assert!(matches!(parse_search_response(body), Err(MapError::Geocode(_))));
    }
}
