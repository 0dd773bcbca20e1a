// src/marker.rs v1
//! Marker handles and category icon encoding

use crate::record::{PointCategory, PointRecord};
use crate::geo::LatLng;
use crossterm::style::Color;

/// Visual encoding for a marker pin: fill color plus a single-letter label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerIcon {
    pub color_hex: &'static str,
    pub label: char,
}

impl MarkerIcon {
    /// Icon selection is a pure function of category. Unrecognized
    /// categories use the Permanent encoding.
    pub fn for_category(category: &PointCategory) -> Self {
        match category {
            PointCategory::Cushion => Self { color_hex: "#FFC107", label: 'C' },
            PointCategory::Permanent | PointCategory::Other(_) => {
                Self { color_hex: "#DC3545", label: 'P' }
            }
        }
    }

    /// Terminal rendering color for this icon
    pub fn terminal_color(&self) -> Color {
        match self.color_hex {
            "#FFC107" => Color::Yellow,
            _ => Color::Red,
        }
    }
}

/// Icon for the user-location pin
pub const USER_ICON: MarkerIcon = MarkerIcon { color_hex: "#4285F4", label: '@' };

/// Rendering-layer handle bound 1:1 to a point record. Holds a back-reference
/// by id; the record itself is owned by the controller's dataset list.
#[derive(Debug, Clone)]
pub struct MarkerHandle {
    pub record_id: String,
    pub position: LatLng,
    pub title: String,
    pub icon: MarkerIcon,
    pub visible: bool,
}

impl MarkerHandle {
    pub fn for_record(record: &PointRecord) -> Self {
        Self {
            record_id: record.id.clone(),
            position: record.position(),
            title: record.location.clone(),
            icon: MarkerIcon::for_category(&record.category),
            visible: true,
        }
    }
}

/// Discard-and-rebuild: one fresh handle per record, all visible.
pub fn build_markers(records: &[PointRecord]) -> Vec<MarkerHandle> {
    records.iter().map(MarkerHandle::for_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_encoding() {
        let cushion = MarkerIcon::for_category(&PointCategory::Cushion);
        assert_eq!(cushion.color_hex, "#FFC107");
        assert_eq!(cushion.label, 'C');

        let permanent = MarkerIcon::for_category(&PointCategory::Permanent);
        assert_eq!(permanent.color_hex, "#DC3545");
        assert_eq!(permanent.label, 'P');
    }

    #[test]
    fn test_unknown_category_falls_back_to_permanent() {
        let icon = MarkerIcon::for_category(&PointCategory::Other("Chicane".to_string()));
        assert_eq!(icon, MarkerIcon::for_category(&PointCategory::Permanent));
    }

    #[test]
    fn test_build_markers_one_per_record() {
        let records = vec![
            PointRecord {
                id: "sh-001".to_string(),
                category: PointCategory::Cushion,
                location: "Main St W at Queen St".to_string(),
                lat: 43.2567,
                lng: -79.8776,
                description: None,
                user_added: false,
            },
            PointRecord {
                id: "sh-002".to_string(),
                category: PointCategory::Permanent,
                location: "Aberdeen Ave at Kent St".to_string(),
                lat: 43.2504,
                lng: -79.8867,
                description: None,
                user_added: false,
            },
        ];

        let markers = build_markers(&records);
        assert_eq!(markers.len(), records.len());
        assert!(markers.iter().all(|m| m.visible));
        assert_eq!(markers[0].record_id, "sh-001");
        assert_eq!(markers[1].icon.label, 'P');
    }
}
