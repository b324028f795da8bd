//! Wire model of the LOAD message a sender delivers to the receiver.
//!
//! Field names follow the cast message JSON (camelCase). Everything is
//! optional on the wire; the resolver decides what absence means.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Sender-defined override payload attached to a load request.
///
/// All recognized keys are optional strings (header sets are string
/// maps). Keys this receiver does not interpret are retained in
/// `extras` so they round-trip through serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomData {
    /// Highest-precedence content URL override.
    pub url: Option<String>,
    /// Second-precedence content URL override.
    pub content_url: Option<String>,
    /// Overrides the content type declared on the media object.
    pub content_type: Option<String>,
    pub license_url: Option<String>,
    /// `"clearKey"` selects ClearKey; anything else is treated as Widevine.
    pub license_type: Option<String>,
    /// ClearKey payload (`kidhex:keyhex` or a `{"keys":[...]}` JSON blob),
    /// or the Widevine license-server address.
    pub license_key: Option<String>,
    pub license_headers: Option<FxHashMap<String, String>>,
    pub manifest_headers: Option<FxHashMap<String, String>>,
    pub segment_headers: Option<FxHashMap<String, String>>,
    /// Generic header set applied to any request class that has no
    /// class-specific set of its own.
    pub headers: Option<FxHashMap<String, String>>,
    #[serde(flatten)]
    pub extras: FxHashMap<String, serde_json::Value>,
}

/// The media description inside a load request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaInformation {
    pub content_id: Option<String>,
    pub content_url: Option<String>,
    pub content_type: Option<String>,
    pub custom_data: Option<CustomData>,
}

/// A LOAD request as delivered by the sender, one per "play" action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadRequestData {
    pub media: Option<MediaInformation>,
    pub autoplay: Option<bool>,
    pub current_time: Option<f64>,
}

impl LoadRequestData {
    pub fn from_json(raw: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_load_message() {
        let raw = r#"{
            "media": {
                "contentId": "id-1",
                "contentUrl": "https://cdn.example.com/main.mpd",
                "contentType": "application/dash+xml",
                "customData": {
                    "licenseUrl": "https://lic.example.com",
                    "licenseType": "widevine",
                    "manifestHeaders": {"X-Token": "abc"},
                    "senderVersion": 3
                }
            },
            "autoplay": true
        }"#;

        let request = LoadRequestData::from_json(raw).unwrap();
        let media = request.media.unwrap();
        assert_eq!(media.content_url.as_deref(), Some("https://cdn.example.com/main.mpd"));
        assert_eq!(media.content_id.as_deref(), Some("id-1"));

        let custom = media.custom_data.unwrap();
        assert_eq!(custom.license_url.as_deref(), Some("https://lic.example.com"));
        assert_eq!(
            custom.manifest_headers.unwrap().get("X-Token").map(String::as_str),
            Some("abc")
        );
        // unrecognized keys survive in extras
        assert_eq!(custom.extras.get("senderVersion"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let request = LoadRequestData::from_json(r#"{"media": {}}"#).unwrap();
        let media = request.media.unwrap();
        assert!(media.content_url.is_none());
        assert!(media.custom_data.is_none());
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            LoadRequestData::from_json("{not json"),
            Err(LoadError::Malformed(_))
        ));
    }
}
