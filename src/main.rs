// src/main.rs v2
//! Hump Map - interactive traffic-calming map for the terminal

use clap::Parser;
use hump_map::{
    config::MapConfig,
    controller::{MapController, Notice},
    dataset::DatasetSource,
    display::TerminalDisplay,
    error::{MapError, Result},
};

#[derive(Parser, Debug)]
#[command(name = "hump-map", version, about = "Interactive map of traffic-calming installations")]
struct Args {
    /// Dataset override: a file path or an http(s) URL
    #[arg(long)]
    dataset: Option<String>,

    /// gpsd endpoint for geolocation, as host:port
    #[arg(long)]
    gpsd: Option<String>,

    /// Pin the device position as "lat,lng" instead of querying gpsd
    #[arg(long)]
    fixed_location: Option<String>,

    /// Persist the effective configuration for future runs
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut config = MapConfig::load().unwrap_or_default();

    if let Some(dataset) = &args.dataset {
        config.dataset = Some(dataset.clone());
    }
    if let Some(gpsd) = &args.gpsd {
        let (host, port) = parse_endpoint(gpsd)?;
        config.update_gpsd(host, port);
    }
    if let Some(fixed) = &args.fixed_location {
        let (lat, lng) = parse_lat_lng(fixed)?;
        config.update_fixed_location(lat, lng);
    }
    if args.save_config {
        config.save()?;
    }

    let source = DatasetSource::from_override(config.dataset.as_deref());
    let mut controller = MapController::new(&config)?;

    if let Err(e) = controller.load_dataset(&source).await {
        log::error!("initial dataset load failed: {}", e);
        controller.set_notice(Notice::error(&e));
    }

    let display = TerminalDisplay::new();
    display.run(&mut controller, &source).await
}

fn parse_endpoint(value: &str) -> Result<(String, u16)> {
    let (host, port) = value
        .rsplit_once(':')
        .ok_or_else(|| MapError::Validation(format!("expected host:port, got {:?}", value)))?;
    let port = port
        .parse()
        .map_err(|_| MapError::Validation(format!("invalid port in {:?}", value)))?;
    Ok((host.to_string(), port))
}

fn parse_lat_lng(value: &str) -> Result<(f64, f64)> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| MapError::Validation(format!("expected lat,lng, got {:?}", value)))?;
    let lat = lat
        .trim()
        .parse()
        .map_err(|_| MapError::Validation(format!("invalid latitude in {:?}", value)))?;
    let lng = lng
        .trim()
        .parse()
        .map_err(|_| MapError::Validation(format!("invalid longitude in {:?}", value)))?;
    Ok((lat, lng))
}
