// src/services/locate.rs v2
//! Device position via gpsd, or a configured fixed position

use crate::config::MapConfig;
use crate::error::{MapError, Result};
use crate::geo::LatLng;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Last known device position with its own marker on the map. Replaced
/// wholesale on every locate request.
#[derive(Debug, Clone)]
pub struct UserLocation {
    pub position: LatLng,
    pub fixed_at: DateTime<Utc>,
}

impl UserLocation {
    pub fn new(position: LatLng) -> Self {
        Self { position, fixed_at: Utc::now() }
    }
}

/// Where "show my location" gets a fix from
#[derive(Debug, Clone)]
pub enum LocationSource {
    Gpsd { host: String, port: u16 },
    Fixed(LatLng),
}

impl LocationSource {
    pub fn from_config(config: &MapConfig) -> Result<Self> {
        match config.locate_source.as_str() {
            "gpsd" => Ok(LocationSource::Gpsd {
                host: config.gpsd_host.clone().unwrap_or_else(|| "localhost".to_string()),
                port: config.gpsd_port.unwrap_or(2947),
            }),
            "fixed" => {
                let (lat, lng) = match (config.fixed_lat, config.fixed_lng) {
                    (Some(lat), Some(lng)) => (lat, lng),
                    _ => {
                        return Err(MapError::Geolocation(
                            "fixed location source configured without coordinates".to_string(),
                        ))
                    }
                };
                let position = LatLng::new(lat, lng);
                if !position.is_valid() {
                    return Err(MapError::Geolocation(format!(
                        "invalid fixed location ({}, {})",
                        lat, lng
                    )));
                }
                Ok(LocationSource::Fixed(position))
            }
            other => Err(MapError::Geolocation(format!(
                "unknown location source {:?}",
                other
            ))),
        }
    }
}

/// Request the current device position. Suspends until the source responds
/// or errors.
pub async fn current_position(source: &LocationSource) -> Result<LatLng> {
    match source {
        LocationSource::Fixed(position) => Ok(*position),
        LocationSource::Gpsd { host, port } => gpsd_fix(host, *port).await,
    }
}

/// Connect to gpsd, enable the JSON watch, and read until a usable fix
async fn gpsd_fix(host: &str, port: u16) -> Result<LatLng> {
    let mut stream = TcpStream::connect(format!("{}:{}", host, port))
        .await
        .map_err(|e| {
            MapError::Connection(format!("Failed to connect to gpsd at {}:{}: {}", host, port, e))
        })?;

    let watch_cmd = "?WATCH={\"enable\":true,\"json\":true}\n";
    stream
        .write_all(watch_cmd.as_bytes())
        .await
        .map_err(|e| MapError::Connection(format!("Failed to send WATCH command: {}", e)))?;

    let mut reader = BufReader::new(stream);
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader
            .read_line(&mut line)
            .await
            .map_err(|e| MapError::Connection(format!("Error reading from gpsd: {}", e)))?;
        if n == 0 {
            return Err(MapError::Geolocation("gpsd closed the connection before a fix".to_string()));
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(position) = parse_tpv_fix(line)? {
            log::info!("gpsd fix at {}", position);
            return Ok(position);
        }
    }
}

#[derive(Debug, Deserialize)]
struct TpvMessage {
    class: String,
    #[serde(default)]
    mode: u8,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Parse one gpsd JSON line. Returns a position for TPV messages carrying a
/// 2D-or-better fix with both coordinates; everything else is None.
pub fn parse_tpv_fix(line: &str) -> Result<Option<LatLng>> {
    let msg: TpvMessage = serde_json::from_str(line)
        .map_err(|e| MapError::Geolocation(format!("unparseable gpsd message: {}", e)))?;

    if msg.class != "TPV" || msg.mode < 2 {
        return Ok(None);
    }

    match (msg.lat, msg.lon) {
        (Some(lat), Some(lon)) => Ok(Some(LatLng::new(lat, lon))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tpv_with_fix() {
        let line = r#"{"class":"TPV","device":"/dev/ttyUSB0","mode":3,"time":"2025-06-01T12:00:00.000Z","lat":43.2557,"lon":-79.8711,"alt":90.2,"speed":0.0}"#;
        let position = parse_tpv_fix(line).unwrap().unwrap();
        assert!((position.lat - 43.2557).abs() < 1e-9);
        assert!((position.lng - (-79.8711)).abs() < 1e-9);
    }

    #[test]
    fn test_parse_tpv_without_fix() {
        let line = r#"{"class":"TPV","device":"/dev/ttyUSB0","mode":1}"#;
        assert!(parse_tpv_fix(line).unwrap().is_none());
    }

    #[test]
    fn test_parse_non_tpv_message() {
        let line = r#"{"class":"SKY","device":"/dev/ttyUSB0","satellites":[]}"#;
        assert!(parse_tpv_fix(line).unwrap().is_none());
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(parse_tpv_fix("{bad json").is_err());
    }

    #[test]
    fn test_source_from_config_fixed() {
        let mut config = MapConfig::default();
        config.update_fixed_location(43.26, -79.87);
        let source = LocationSource::from_config(&config).unwrap();
        assert!(matches!(source, LocationSource::Fixed(_)));
    }

    #[test]
    fn test_source_from_config_fixed_without_coordinates() {
        let mut config = MapConfig::default();
        config.locate_source = "fixed".to_string();
        assert!(LocationSource::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_fixed_position_resolves_immediately() {
        let source = LocationSource::Fixed(LatLng::new(43.25, -79.88));
        let position = current_position(&source).await.unwrap();
        assert_eq!(position, LatLng::new(43.25, -79.88));
    }
}
