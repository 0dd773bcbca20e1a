// src/controller.rs v3
//! Map controller owning all application state
//!
//! One authoritative controller instance is constructed at startup; event
//! handlers receive it by mutable reference instead of relying on globals.

use crate::config::MapConfig;
use crate::dataset::{self, DatasetSource};
use crate::error::{MapError, Result};
use crate::geo::LatLng;
use crate::marker::{self, MarkerHandle};
use crate::record::{NewLocation, PointCategory, PointRecord};
use crate::services::{locate, DirectionsService, Geocoder, LocationSource, RouteSummary, UserLocation};
use crate::stats::{self, DestinationOption, Stats};

/// Radius for the nearby-installation scan after a locate, in metres
pub const NEARBY_RADIUS_M: f64 = 1000.0;

const LOCATE_ZOOM: u8 = 14;
const ADDED_ZOOM: u8 = 15;

/// Marker visibility filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerFilter {
    All,
    Cushion,
    Permanent,
    UserAdded,
}

impl MarkerFilter {
    pub fn matches(&self, record: &PointRecord) -> bool {
        match self {
            MarkerFilter::All => true,
            MarkerFilter::Cushion => record.category == PointCategory::Cushion,
            MarkerFilter::Permanent => record.category == PointCategory::Permanent,
            MarkerFilter::UserAdded => record.user_added,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MarkerFilter::All => "Show All",
            MarkerFilter::Cushion => "Speed Cushions",
            MarkerFilter::Permanent => "Permanent Humps",
            MarkerFilter::UserAdded => "My Locations",
        }
    }
}

/// Transient overlay message, the terminal stand-in for an info popup
#[derive(Debug, Clone)]
pub struct Notice {
    pub title: String,
    pub lines: Vec<String>,
    pub position: Option<LatLng>,
    pub is_error: bool,
}

impl Notice {
    pub fn info(title: impl Into<String>, lines: Vec<String>, position: Option<LatLng>) -> Self {
        Self { title: title.into(), lines, position, is_error: false }
    }

    pub fn error(err: &MapError) -> Self {
        Self {
            title: "Error".to_string(),
            lines: vec![err.to_string()],
            position: None,
            is_error: true,
        }
    }
}

/// Current map view
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
}

/// Origin selector for a directions request
#[derive(Debug, Clone)]
pub enum OriginChoice {
    UserLocation,
    Record(String),
}

pub struct MapController {
    viewport: Viewport,
    records: Vec<PointRecord>,
    markers: Vec<MarkerHandle>,
    filter: MarkerFilter,
    user_location: Option<UserLocation>,
    active_route: Option<RouteSummary>,
    notice: Option<Notice>,
    destinations: Vec<DestinationOption>,
    stats: Stats,
    geocoder: Geocoder,
    router: DirectionsService,
    locator: LocationSource,
}

impl MapController {
    pub fn new(config: &MapConfig) -> Result<Self> {
        Ok(Self {
            viewport: Viewport {
                center: LatLng::new(config.center_lat, config.center_lng),
                zoom: config.zoom,
            },
            records: Vec::new(),
            markers: Vec::new(),
            filter: MarkerFilter::All,
            user_location: None,
            active_route: None,
            notice: None,
            destinations: Vec::new(),
            stats: Stats { total: 0, visible: 0 },
            geocoder: Geocoder::new(&config.geocoder_url, &config.region_suffix)?,
            router: DirectionsService::new(&config.router_url)?,
            locator: LocationSource::from_config(config)?,
        })
    }

    // --- dataset ---

    /// Load the dataset, then rebuild markers and refresh the derived views
    pub async fn load_dataset(&mut self, source: &DatasetSource) -> Result<()> {
        let records = dataset::load(source).await?;
        self.install_records(records);
        Ok(())
    }

    /// Replace the dataset and rebuild the marker set from scratch
    pub fn install_records(&mut self, records: Vec<PointRecord>) {
        self.records = records;
        self.rebuild_markers();
    }

    fn rebuild_markers(&mut self) {
        let filter = self.filter;
        self.markers = marker::build_markers(&self.records);
        for (record, handle) in self.records.iter().zip(self.markers.iter_mut()) {
            handle.visible = filter.matches(record);
        }
        self.refresh_derived();
    }

    // --- filtering ---

    pub fn apply_filter(&mut self, filter: MarkerFilter) {
        self.filter = filter;
        for (record, handle) in self.records.iter().zip(self.markers.iter_mut()) {
            handle.visible = filter.matches(record);
        }
        self.refresh_derived();
    }

    fn refresh_derived(&mut self) {
        self.stats = stats::compute(self.records.len(), &self.markers);
        self.destinations = stats::destination_options(&self.markers);
    }

    // --- geolocation ---

    /// Request the device position; on success replace the user marker,
    /// recenter, and report how many installations are within a kilometre.
    /// On failure state is left unchanged.
    pub async fn show_user_location(&mut self) -> Result<usize> {
        let position = locate::current_position(&self.locator).await?;

        let user = UserLocation::new(position);
        let fixed_at = user.fixed_at.format("%H:%M:%S UTC");
        self.user_location = Some(user);
        self.viewport = Viewport { center: position, zoom: LOCATE_ZOOM };

        let nearby = self.nearby_records(&position).len();
        let message = if nearby == 1 {
            "Found 1 installation within 1 km of your location.".to_string()
        } else {
            format!("Found {} installations within 1 km of your location.", nearby)
        };
        self.notice = Some(Notice::info("Your Location", vec![
            format!("Latitude: {:.6}", position.lat),
            format!("Longitude: {:.6}", position.lng),
            format!("Fixed at {}", fixed_at),
            message,
        ], Some(position)));

        Ok(nearby)
    }

    /// Linear scan of the dataset by great-circle distance
    pub fn nearby_records(&self, position: &LatLng) -> Vec<&PointRecord> {
        self.records
            .iter()
            .filter(|r| position.distance_to(&r.position()) <= NEARBY_RADIUS_M)
            .collect()
    }

    // --- submissions ---

    /// Geocode the submitted address and add the record. A geocoding failure
    /// propagates without touching state so the form can be retried.
    pub async fn submit_location(&mut self, form: NewLocation) -> Result<&PointRecord> {
        if form.location.trim().is_empty() || form.address.trim().is_empty() {
            return Err(MapError::Validation(
                "Please provide both a location name and an address.".to_string(),
            ));
        }

        let position = self.geocoder.geocode(&form.address).await?;
        Ok(self.add_record(form, position))
    }

    /// Append a user-added record, show its marker, recenter, and refresh
    /// the derived views
    pub fn add_record(&mut self, form: NewLocation, position: LatLng) -> &PointRecord {
        let record = PointRecord::from_submission(form, position);

        let mut handle = MarkerHandle::for_record(&record);
        handle.visible = self.filter.matches(&record);

        self.viewport = Viewport { center: position, zoom: ADDED_ZOOM };
        self.notice = Some(Notice::info(
            "Success!",
            vec!["Traffic-calming location added to the map.".to_string()],
            Some(position),
        ));

        self.records.push(record);
        self.markers.push(handle);
        self.refresh_derived();

        &self.records[self.records.len() - 1]
    }

    // --- directions ---

    /// Validate the endpoint selection without issuing any request
    fn resolve_route_endpoints(
        &self,
        origin: &OriginChoice,
        destination_id: Option<&str>,
    ) -> Result<(LatLng, LatLng, String)> {
        let destination_id = match destination_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                return Err(MapError::Validation(
                    "Please select both origin and destination.".to_string(),
                ))
            }
        };

        let origin_position = match origin {
            OriginChoice::UserLocation => match &self.user_location {
                Some(user) => user.position,
                None => {
                    return Err(MapError::Validation(
                        "Please set your location first by running Show My Location.".to_string(),
                    ))
                }
            },
            OriginChoice::Record(id) => self
                .record_by_id(id)
                .ok_or_else(|| MapError::Validation(format!("Unknown origin {:?}.", id)))?
                .position(),
        };

        let destination = self
            .record_by_id(destination_id)
            .ok_or_else(|| MapError::Validation(format!("Unknown destination {:?}.", destination_id)))?;

        Ok((origin_position, destination.position(), destination.location.clone()))
    }

    /// Request driving directions between the selected endpoints
    pub async fn get_directions(
        &mut self,
        origin: OriginChoice,
        destination_id: Option<&str>,
    ) -> Result<&RouteSummary> {
        let (from, to, destination_name) = self.resolve_route_endpoints(&origin, destination_id)?;

        let summary = self.router.route(from, to).await?;

        let mut lines = vec![
            format!("Distance: {}", summary.distance_text),
            format!("Duration: {}", summary.duration_text),
        ];
        let title = match origin {
            OriginChoice::UserLocation => {
                lines.push(format!("Destination: {}", destination_name));
                "Route from Your Location"
            }
            OriginChoice::Record(_) => "Route Information",
        };
        self.notice = Some(Notice::info(title, lines, Some(to)));

        Ok(&*self.active_route.insert(summary))
    }

    /// Directions from the user's position to one marker, as triggered from
    /// its detail popup
    pub async fn directions_to_marker(&mut self, record_id: &str) -> Result<&RouteSummary> {
        if self.user_location.is_none() {
            return Err(MapError::Validation(
                "Please set your location first by running Show My Location.".to_string(),
            ));
        }
        self.get_directions(OriginChoice::UserLocation, Some(record_id)).await
    }

    // --- popups ---

    /// Open the detail notice for one record
    pub fn open_record_popup(&mut self, record_id: &str) -> Result<()> {
        let record = self
            .record_by_id(record_id)
            .ok_or_else(|| MapError::Validation(format!("Unknown record {:?}.", record_id)))?;

        let title = if record.user_added {
            "User-Reported Location"
        } else {
            "Traffic-Calming Location"
        };
        let mut lines = vec![
            format!("Location: {}", record.location),
            format!("Type: {}", record.category),
            format!("ID: {}", record.id),
        ];
        if let Some(description) = &record.description {
            lines.push(format!("Notes: {}", description));
        }
        if record.user_added {
            lines.push("User-reported location".to_string());
        }

        let position = record.position();
        self.notice = Some(Notice::info(title, lines, Some(position)));
        Ok(())
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    // --- accessors ---

    pub fn record_by_id(&self, id: &str) -> Option<&PointRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> &[PointRecord] {
        &self.records
    }

    pub fn markers(&self) -> &[MarkerHandle] {
        &self.markers
    }

    pub fn visible_markers(&self) -> impl Iterator<Item = &MarkerHandle> {
        self.markers.iter().filter(|m| m.visible)
    }

    pub fn filter(&self) -> MarkerFilter {
        self.filter
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn destinations(&self) -> &[DestinationOption] {
        &self.destinations
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn user_location(&self) -> Option<&UserLocation> {
        self.user_location.as_ref()
    }

    pub fn active_route(&self) -> Option<&RouteSummary> {
        self.active_route.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}
