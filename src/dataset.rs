// src/dataset.rs v2
//! Dataset loading and schema validation

use crate::error::{MapError, Result};
use crate::record::PointRecord;
use std::path::PathBuf;
use std::time::Duration;

/// Dataset document compiled into the binary
const EMBEDDED_DATASET: &str = include_str!("../data/speed_humps.json");

/// Where the dataset comes from. Exactly one source is used per load; the
/// embedded document is preferred unless an override is configured.
#[derive(Debug, Clone)]
pub enum DatasetSource {
    Embedded,
    File(PathBuf),
    Url(String),
}

impl DatasetSource {
    /// Resolve a CLI/config override string: http(s) URLs fetch, everything
    /// else is a file path. None keeps the embedded document.
    pub fn from_override(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.starts_with("http://") || v.starts_with("https://") => {
                DatasetSource::Url(v.to_string())
            }
            Some(v) => DatasetSource::File(PathBuf::from(v)),
            None => DatasetSource::Embedded,
        }
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetSource::Embedded => write!(f, "embedded dataset"),
            DatasetSource::File(path) => write!(f, "file {}", path.display()),
            DatasetSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Load and validate the dataset from the given source
pub async fn load(source: &DatasetSource) -> Result<Vec<PointRecord>> {
    let document = match source {
        DatasetSource::Embedded => EMBEDDED_DATASET.to_string(),
        DatasetSource::File(path) => std::fs::read_to_string(path)
            .map_err(|e| MapError::Load(format!("failed to read {}: {}", path.display(), e)))?,
        DatasetSource::Url(url) => fetch_document(url).await?,
    };

    let records = parse_dataset(&document)?;
    log::info!("loaded {} records from {}", records.len(), source);
    Ok(records)
}

async fn fetch_document(url: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent("hump-map/0.1 (traffic-calming map)")
        .timeout(Duration::from_secs(10))
        .build()?;

    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(MapError::Load(format!("HTTP {} fetching {}", response.status(), url)));
    }

    Ok(response.text().await?)
}

/// Parse the JSON document and validate every record. Invalid coordinates or
/// blank identifying fields reject the whole load rather than mis-rendering.
pub fn parse_dataset(document: &str) -> Result<Vec<PointRecord>> {
    let records: Vec<PointRecord> = serde_json::from_str(document)
        .map_err(|e| MapError::Load(format!("unparseable dataset: {}", e)))?;

    for (index, record) in records.iter().enumerate() {
        validate_record(record)
            .map_err(|msg| MapError::Load(format!("record {} ({:?}): {}", index, record.id, msg)))?;
    }

    Ok(records)
}

fn validate_record(record: &PointRecord) -> std::result::Result<(), String> {
    if record.id.trim().is_empty() {
        return Err("empty id".to_string());
    }
    if record.location.trim().is_empty() {
        return Err("empty location".to_string());
    }
    if !record.position().is_valid() {
        return Err(format!("invalid coordinates ({}, {})", record.lat, record.lng));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PointCategory;

    #[test]
    fn test_embedded_dataset_loads() {
        let records = parse_dataset(EMBEDDED_DATASET).unwrap();
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| !r.user_added));
        assert!(records
            .iter()
            .any(|r| r.category == PointCategory::Cushion));
        assert!(records
            .iter()
            .any(|r| r.category == PointCategory::Permanent));
    }

    #[test]
    fn test_parse_valid_document() {
        let doc = r#"[
            {"id":"sh-001","type":"Cushion","location":"Main St W at Queen St","lat":43.2567,"lng":-79.8776},
            {"id":"sh-002","type":"Permanent","location":"Aberdeen Ave at Kent St","lat":43.2504,"lng":-79.8867,"description":"raised crosswalk"}
        ]"#;
        let records = parse_dataset(doc).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].description.as_deref(), Some("raised crosswalk"));
    }

    #[test]
    fn test_reject_out_of_range_coordinates() {
        let doc = r#"[{"id":"sh-001","type":"Cushion","location":"Main St W","lat":143.0,"lng":-79.87}]"#;
        let err = parse_dataset(doc).unwrap_err();
        assert!(matches!(err, MapError::Load(_)));
        assert!(err.to_string().contains("sh-001"));
    }

    #[test]
    fn test_reject_blank_id() {
        let doc = r#"[{"id":"  ","type":"Cushion","location":"Main St W","lat":43.25,"lng":-79.87}]"#;
        assert!(parse_dataset(doc).is_err());
    }

    #[test]
    fn test_reject_unparseable_document() {
        assert!(matches!(parse_dataset("{not json"), Err(MapError::Load(_))));
    }

    #[test]
    fn test_source_from_override() {
        assert!(matches!(DatasetSource::from_override(None), DatasetSource::Embedded));
        assert!(matches!(
            DatasetSource::from_override(Some("https://example.org/humps.json")),
            DatasetSource::Url(_)
        ));
        assert!(matches!(
            DatasetSource::from_override(Some("./humps.json")),
            DatasetSource::File(_)
        ));
    }
}
