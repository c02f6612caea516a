//! Tap configuration
//!
//! Deserializes and validates the tap settings: API credentials, regional
//! data-center selection, and the optional replication window bounds.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Iterable data-center region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Region {
    /// United States data center (api.iterable.com)
    #[default]
    US,
    /// European Union data center (api.eu.iterable.com)
    EU,
}

impl Region {
    /// Base URL for this region's REST API
    pub fn base_url(self) -> &'static str {
        match self {
            Region::US => "https://api.iterable.com/api",
            Region::EU => "https://api.eu.iterable.com/api",
        }
    }
}

/// Tap configuration, usually loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// Iterable API key (secret)
    pub api_key: String,

    /// Data-center region, selects the API base URL
    #[serde(default)]
    pub region: Region,

    /// Timestamp in ISO 8601 format to get data from (inclusive)
    #[serde(default)]
    pub start_date: Option<String>,

    /// Timestamp in ISO 8601 format to get data up to (inclusive)
    #[serde(default)]
    pub end_date: Option<String>,
}

impl TapConfig {
    /// Create a config with just an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            region: Region::default(),
            start_date: None,
            end_date: None,
        }
    }

    /// Load config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Parse config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate required fields and date formats
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::missing_field("api_key"));
        }

        if let Some(start) = &self.start_date {
            parse_datetime(start)?;
        }
        if let Some(end) = &self.end_date {
            parse_datetime(end)?;
        }

        // Confirms the regional URL is well formed before any request is built.
        url::Url::parse(self.region.base_url())?;

        Ok(())
    }

    /// Base URL for the configured region
    pub fn base_url(&self) -> &'static str {
        self.region.base_url()
    }

    /// Parsed `start_date`, if configured
    pub fn start_datetime(&self) -> Result<Option<DateTime<Utc>>> {
        self.start_date.as_deref().map(parse_datetime).transpose()
    }

    /// Parsed `end_date`, if configured
    pub fn end_datetime(&self) -> Result<Option<DateTime<Utc>>> {
        self.end_date.as_deref().map(parse_datetime).transpose()
    }
}

/// Parse a datetime string into UTC DateTime
///
/// Accepts RFC 3339 plus the common date-only and space-separated forms that
/// show up in hand-written config files.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let formats = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    for fmt in formats {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(DateTime::from_naive_utc_and_offset(ndt, Utc));
        }
    }

    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = nd.and_hms_opt(0, 0, 0) {
            return Ok(DateTime::from_naive_utc_and_offset(ndt, Utc));
        }
    }

    Err(Error::config(format!("Invalid datetime format: {s}")))
}

/// Render a datetime the way the Iterable API expects date-time query
/// parameters (`startDateTime`, `endDateTime`).
pub fn format_api_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_region_base_url() {
        assert_eq!(Region::US.base_url(), "https://api.iterable.com/api");
        assert_eq!(Region::EU.base_url(), "https://api.eu.iterable.com/api");
        assert_eq!(Region::default(), Region::US);
    }

    #[test]
    fn test_config_from_json() {
        let config = TapConfig::from_json(
            r#"{"api_key": "secret", "region": "EU", "start_date": "2024-01-01"}"#,
        )
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.region, Region::EU);
        assert_eq!(config.base_url(), "https://api.eu.iterable.com/api");
        assert!(config.end_date.is_none());
    }

    #[test]
    fn test_config_defaults_to_us() {
        let config = TapConfig::from_json(r#"{"api_key": "secret"}"#).unwrap();
        assert_eq!(config.region, Region::US);
    }

    #[test]
    fn test_config_rejects_empty_api_key() {
        let err = TapConfig::from_json(r#"{"api_key": ""}"#).unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_config_rejects_bad_start_date() {
        let err =
            TapConfig::from_json(r#"{"api_key": "k", "start_date": "not-a-date"}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid datetime"));
    }

    #[test_case("2024-01-02T03:04:05Z"; "rfc3339 zulu")]
    #[test_case("2024-01-02T03:04:05+00:00"; "rfc3339 offset")]
    #[test_case("2024-01-02T03:04:05"; "naive t separated")]
    #[test_case("2024-01-02 03:04:05"; "space separated")]
    fn test_parse_datetime_formats(input: &str) {
        let dt = parse_datetime(input).unwrap();
        assert_eq!(format_api_datetime(dt), "2024-01-02 03:04:05");
    }

    #[test]
    fn test_parse_date_only_is_midnight() {
        let midnight = parse_datetime("2024-01-02").unwrap();
        assert_eq!(format_api_datetime(midnight), "2024-01-02 00:00:00");
    }

    #[test]
    fn test_start_datetime_accessor() {
        let config = TapConfig {
            start_date: Some("2023-06-01 12:00:00".to_string()),
            ..TapConfig::new("k")
        };
        let dt = config.start_datetime().unwrap().unwrap();
        assert_eq!(format_api_datetime(dt), "2023-06-01 12:00:00");
    }
}
