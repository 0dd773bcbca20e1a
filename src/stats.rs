// src/stats.rs
//! Derived statistics and the destination selection list

use crate::marker::MarkerHandle;

/// Destination dropdown is capped for performance
pub const MAX_DESTINATIONS: usize = 50;
/// Labels longer than this are truncated with an ellipsis marker
pub const MAX_LABEL_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub visible: usize,
}

/// Recompute totals from the current marker set
pub fn compute(total_records: usize, markers: &[MarkerHandle]) -> Stats {
    Stats {
        total: total_records,
        visible: markers.iter().filter(|m| m.visible).count(),
    }
}

/// One entry in the destination selection control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationOption {
    pub id: String,
    pub label: String,
}

/// Destination options from visible markers, in order, bounded to
/// [`MAX_DESTINATIONS`] entries with labels truncated to
/// [`MAX_LABEL_CHARS`] characters.
pub fn destination_options(markers: &[MarkerHandle]) -> Vec<DestinationOption> {
    markers
        .iter()
        .filter(|m| m.visible)
        .take(MAX_DESTINATIONS)
        .map(|m| DestinationOption {
            id: m.record_id.clone(),
            label: truncate_label(&m.title),
        })
        .collect()
}

fn truncate_label(title: &str) -> String {
    if title.chars().count() > MAX_LABEL_CHARS {
        let mut label: String = title.chars().take(MAX_LABEL_CHARS).collect();
        label.push_str("...");
        label
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLng;
    use crate::marker::MarkerIcon;
    use crate::record::PointCategory;

    fn marker(id: &str, title: &str, visible: bool) -> MarkerHandle {
        MarkerHandle {
            record_id: id.to_string(),
            position: LatLng::new(43.25, -79.87),
            title: title.to_string(),
            icon: MarkerIcon::for_category(&PointCategory::Cushion),
            visible,
        }
    }

    #[test]
    fn test_visible_count() {
        let markers = vec![
            marker("a", "A", true),
            marker("b", "B", false),
            marker("c", "C", true),
        ];
        let stats = compute(3, &markers);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.visible, 2);
    }

    #[test]
    fn test_destination_options_skip_hidden() {
        let markers = vec![marker("a", "A", true), marker("b", "B", false)];
        let options = destination_options(&markers);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].id, "a");
    }

    #[test]
    fn test_destination_options_bounded() {
        let markers: Vec<_> = (0..80)
            .map(|i| marker(&format!("id-{}", i), &format!("Street {}", i), true))
            .collect();
        let options = destination_options(&markers);
        assert_eq!(options.len(), MAX_DESTINATIONS);
    }

    #[test]
    fn test_label_truncation() {
        let long = "Upper Wentworth Street between Mohawk Road East and Fennell Avenue";
        let markers = vec![marker("a", long, true)];
        let options = destination_options(&markers);
        let label = &options[0].label;
        assert!(label.ends_with("..."));
        assert_eq!(label.chars().count(), MAX_LABEL_CHARS + 3);

        let markers = vec![marker("b", "Short St", true)];
        assert_eq!(destination_options(&markers)[0].label, "Short St");
    }
}
