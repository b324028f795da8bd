//! DRM configuration derived from a load request's custom data.
//!
//! ClearKey keys arrive either as a JSON key set or as a `kidhex:keyhex`
//! pair; everything else goes through a Widevine license server. Parse
//! failures never abort resolution: they degrade to a configuration the
//! player can still consume (and later surface as a decryption error).

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::message::CustomData;

/// Widevine key-system identifier, the only license-server DRM supported.
pub const WIDEVINE_KEY_SYSTEM: &str = "com.widevine.alpha";

/// Content-protection configuration handed to the external player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "system", rename_all = "camelCase")]
pub enum DrmConfig {
    None,
    ClearKey {
        /// Key-id to key mapping, both unpadded URL-safe base64.
        keys: FxHashMap<String, String>,
    },
    Widevine {
        license_server_url: String,
    },
}

impl DrmConfig {
    pub fn is_none(&self) -> bool {
        matches!(self, DrmConfig::None)
    }
}

#[derive(Deserialize)]
struct ClearKeySet {
    #[serde(default)]
    keys: Vec<ClearKeyEntry>,
}

#[derive(Deserialize)]
struct ClearKeyEntry {
    kid: String,
    k: String,
}

/// Derives the DRM configuration from custom data. Never fails: absent
/// license fields yield [`DrmConfig::None`], malformed ClearKey payloads
/// yield an empty key mapping.
pub fn resolve_drm(custom: &CustomData) -> DrmConfig {
    let (Some(_license_url), Some(license_key)) =
        (custom.license_url.as_deref(), custom.license_key.as_deref())
    else {
        return DrmConfig::None;
    };

    let clearkey = custom
        .license_type
        .as_deref()
        .is_some_and(|t| t.to_ascii_lowercase().contains("clearkey"));

    if clearkey {
        DrmConfig::ClearKey {
            keys: parse_clearkey(license_key),
        }
    } else {
        DrmConfig::Widevine {
            license_server_url: license_key.to_owned(),
        }
    }
}

/// Normalizes a ClearKey payload into a kid-to-key mapping.
///
/// JSON key sets (`{"keys":[{"kid":..,"k":..}]}`) are taken verbatim:
/// their fields are already URL-safe base64 per the ClearKey
/// convention. A `kidhex:keyhex` pair is decoded and re-encoded as
/// unpadded URL-safe base64.
fn parse_clearkey(raw: &str) -> FxHashMap<String, String> {
    let trimmed = raw.trim();
    let mut keys = FxHashMap::default();

    if trimmed.starts_with('{') {
        match serde_json::from_str::<ClearKeySet>(trimmed) {
            Ok(set) => {
                for entry in set.keys {
                    keys.insert(entry.kid, entry.k);
                }
            }
            Err(e) => warn!("unparseable clearkey json, license will not resolve: {e}"),
        }
    } else if let Some((kid_hex, key_hex)) = trimmed.split_once(':') {
        match (hex::decode(kid_hex.trim()), hex::decode(key_hex.trim())) {
            (Ok(kid), Ok(key)) => {
                keys.insert(URL_SAFE_NO_PAD.encode(kid), URL_SAFE_NO_PAD.encode(key));
            }
            _ => warn!("clearkey pair is not valid hex, license will not resolve"),
        }
    } else {
        warn!("clearkey payload has neither json nor kid:key form");
    }

    keys
}
