// src/services/mod.rs
//! External mapping service clients

pub mod geocode;
pub mod locate;
pub mod route;

pub use geocode::Geocoder;
pub use locate::{LocationSource, UserLocation};
pub use route::{DirectionsService, RouteSummary};

/// Shared HTTP client: descriptive user agent and the standard timeout
pub(crate) fn http_client() -> crate::error::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent("hump-map/0.1 (traffic-calming map)")
        .timeout(std::time::Duration::from_secs(10))
        .build()?;
    Ok(client)
}
