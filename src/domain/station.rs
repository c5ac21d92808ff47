use serde::{Deserialize, Serialize};

pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// A playable station. `name` and `url` are always non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub url: String,
    pub country: String,
    pub favicon: Option<String>,
    pub tags: String,
}

/// A directory record as served upstream. Only these fields are read;
/// everything else in the payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawStation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

impl RawStation {
    /// Returns `None` for records missing a name or url.
    pub fn into_station(self) -> Option<Station> {
        let name = non_empty(self.name)?;
        let url = non_empty(self.url)?;
        Some(Station {
            name,
            url,
            country: non_empty(self.country).unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
            favicon: non_empty(self.favicon),
            tags: self.tags.unwrap_or_default(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        let json = r#"{
            "changeuuid": "x",
            "name": "Jazz FM",
            "url": "http://jazz.example/stream",
            "country": "",
            "favicon": "",
            "tags": "jazz,smooth",
            "bitrate": 128
        }"#;
        let raw: RawStation = serde_json::from_str(json).unwrap();
        let station = raw.into_station().unwrap();
        assert_eq!(station.name, "Jazz FM");
        assert_eq!(station.country, UNKNOWN_COUNTRY);
        assert_eq!(station.favicon, None);
        assert_eq!(station.tags, "jazz,smooth");
    }

    #[test]
    fn test_missing_url_is_discarded() {
        let raw = RawStation {
            name: Some("No Stream".into()),
            ..RawStation::default()
        };
        assert!(raw.into_station().is_none());
    }

    #[test]
    fn test_blank_name_is_discarded() {
        let raw = RawStation {
            name: Some("   ".into()),
            url: Some("http://a.example/stream".into()),
            ..RawStation::default()
        };
        assert!(raw.into_station().is_none());
    }

    #[test]
    fn test_null_fields_deserialize() {
        let json = r#"{"name": "A", "url": "http://a", "country": null, "tags": null}"#;
        let station = serde_json::from_str::<RawStation>(json)
            .unwrap()
            .into_station()
            .unwrap();
        assert_eq!(station.country, UNKNOWN_COUNTRY);
        assert_eq!(station.tags, "");
    }
}
