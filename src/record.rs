// src/record.rs v2
//! Point records and categories for traffic-calming installations

use crate::geo::LatLng;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Installation category. The dataset is a closed set of two, but unknown
/// strings still load and keep their original text for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PointCategory {
    Cushion,
    Permanent,
    Other(String),
}

impl From<String> for PointCategory {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Cushion" => PointCategory::Cushion,
            "Permanent" => PointCategory::Permanent,
            _ => PointCategory::Other(s),
        }
    }
}

impl From<PointCategory> for String {
    fn from(c: PointCategory) -> Self {
        c.as_str().to_string()
    }
}

impl PointCategory {
    pub fn as_str(&self) -> &str {
        match self {
            PointCategory::Cushion => "Cushion",
            PointCategory::Permanent => "Permanent",
            PointCategory::Other(s) => s,
        }
    }
}

impl std::fmt::Display for PointCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One traffic-calming installation, loaded from the dataset or added by the
/// user during this session. Records are never deleted and live only in
/// process memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub category: PointCategory,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "userAdded", default)]
    pub user_added: bool,
}

impl PointRecord {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Build a user-added record from a submitted form and a geocoded
    /// position. The id is synthesized from the current time.
    pub fn from_submission(form: NewLocation, position: LatLng) -> Self {
        Self {
            id: format!("user-{}", Utc::now().timestamp_millis()),
            category: form.category,
            location: form.location,
            lat: position.lat,
            lng: position.lng,
            description: form.description,
            user_added: true,
        }
    }
}

/// The add-location form: everything except the coordinates, which come from
/// geocoding the address.
#[derive(Debug, Clone)]
pub struct NewLocation {
    pub location: String,
    pub category: PointCategory,
    pub address: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        assert_eq!(PointCategory::from("Cushion".to_string()), PointCategory::Cushion);
        assert_eq!(PointCategory::from("Permanent".to_string()), PointCategory::Permanent);
        assert_eq!(
            PointCategory::from("Chicane".to_string()),
            PointCategory::Other("Chicane".to_string())
        );
        assert_eq!(PointCategory::Cushion.as_str(), "Cushion");
    }

    #[test]
    fn test_record_deserialize() {
        let json = r#"{"id":"sh-001","type":"Cushion","location":"Main St W at Queen St","lat":43.2567,"lng":-79.8776}"#;
        let record: PointRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "sh-001");
        assert_eq!(record.category, PointCategory::Cushion);
        assert!(!record.user_added);
        assert!(record.description.is_none());
    }

    #[test]
    fn test_from_submission() {
        let form = NewLocation {
            location: "Barton St E near Gage Ave".to_string(),
            category: PointCategory::Cushion,
            address: "Barton St E & Gage Ave".to_string(),
            description: Some("requested by residents".to_string()),
        };
        let record = PointRecord::from_submission(form, LatLng::new(43.25, -79.83));
        assert!(record.id.starts_with("user-"));
        assert!(record.user_added);
        assert_eq!(record.category, PointCategory::Cushion);
        assert_eq!(record.lat, 43.25);
    }
}
