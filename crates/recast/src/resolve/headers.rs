//! Per-request-class header injection.
//!
//! The player issues three categories of fetch (manifest, segment,
//! license), each independently configurable from the load request's
//! custom data. A handler is only built when the sender actually
//! supplied headers for a class; otherwise requests pass through
//! untouched.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER, USER_AGENT};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::message::CustomData;

/// The three categories of HTTP fetch the external player issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestClass {
    License,
    Manifest,
    Segment,
}

impl RequestClass {
    pub const ALL: [RequestClass; 3] =
        [RequestClass::License, RequestClass::Manifest, RequestClass::Segment];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::License => "license",
            RequestClass::Manifest => "manifest",
            RequestClass::Segment => "segment",
        }
    }
}

/// What to do with sender-supplied `User-Agent`/`Referer` entries.
///
/// A sandboxed browser network stack cannot set either header, so the
/// strict mode reproduces that platform constraint by dropping them
/// before merging. The permissive mode keeps the historical behavior
/// where the fixed default `User-Agent` is written last and wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPolicy {
    #[default]
    Strict,
    Permissive,
}

/// Precomputed header overlay for one request class.
///
/// Applied by the player once per outgoing request of the matching
/// class; idempotent and free of side effects beyond the map it is
/// handed.
#[derive(Debug, Clone)]
pub struct HeaderHandler {
    overlay: HeaderMap,
}

impl HeaderHandler {
    /// Merges the overlay onto an outgoing request's headers. Overlay
    /// entries replace same-named entries already on the request.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in self.overlay.iter() {
            headers.insert(name.clone(), value.clone());
        }
    }

    pub fn overlay(&self) -> &HeaderMap {
        &self.overlay
    }
}

fn is_restricted(name: &HeaderName) -> bool {
    *name == USER_AGENT || *name == REFERER
}

/// Selects the sender-supplied header set for a request class, falling
/// back to the generic `headers` key when the class-specific one is
/// absent.
pub(crate) fn class_headers(
    custom: &CustomData,
    class: RequestClass,
) -> Option<&FxHashMap<String, String>> {
    let specific = match class {
        RequestClass::License => custom.license_headers.as_ref(),
        RequestClass::Manifest => custom.manifest_headers.as_ref(),
        RequestClass::Segment => custom.segment_headers.as_ref(),
    };
    specific.or(custom.headers.as_ref())
}

/// Builds the header handler for one request class, or `None` when the
/// sender supplied no headers for it (identity: the request passes
/// through unmodified).
///
/// Merge order: built-in defaults first, sender entries on top. Empty
/// values are skipped, unparseable names/values are logged and skipped,
/// and restricted names are subject to [`HeaderPolicy`].
pub fn build_header_handler(
    class: RequestClass,
    custom: &CustomData,
    defaults: &HeaderMap,
    policy: HeaderPolicy,
) -> Option<HeaderHandler> {
    let supplied = class_headers(custom, class)?;

    let mut overlay = defaults.clone();
    for (name, value) in supplied {
        if value.is_empty() {
            continue;
        }
        let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) else {
            warn!(header = %name, "skipping header with invalid name");
            continue;
        };
        if policy == HeaderPolicy::Strict && is_restricted(&header_name) {
            debug!(
                header = %header_name,
                class = class.as_str(),
                "dropping header the platform network stack cannot set"
            );
            continue;
        }
        let Ok(header_value) = HeaderValue::from_str(value) else {
            warn!(header = %name, "skipping header with invalid value");
            continue;
        };
        overlay.insert(header_name, header_value);
    }

    if policy == HeaderPolicy::Permissive {
        // the fixed User-Agent is always written last in this mode
        if let Some(ua) = defaults.get(USER_AGENT) {
            overlay.insert(USER_AGENT, ua.clone());
        }
    }

    Some(HeaderHandler { overlay })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::default_headers;

    fn custom_with_generic(entries: &[(&str, &str)]) -> CustomData {
        let mut headers = FxHashMap::default();
        for (name, value) in entries {
            headers.insert(name.to_string(), value.to_string());
        }
        CustomData {
            headers: Some(headers),
            ..CustomData::default()
        }
    }

    #[test]
    fn no_headers_means_identity() {
        let custom = CustomData::default();
        for class in RequestClass::ALL {
            assert!(
                build_header_handler(class, &custom, &default_headers(), HeaderPolicy::Strict)
                    .is_none()
            );
        }
    }

    #[test]
    fn generic_headers_apply_to_every_class() {
        let custom = custom_with_generic(&[("X-Token", "abc"), ("User-Agent", "custom")]);
        for class in RequestClass::ALL {
            let handler =
                build_header_handler(class, &custom, &default_headers(), HeaderPolicy::Strict)
                    .unwrap();
            let mut outgoing = HeaderMap::new();
            handler.apply(&mut outgoing);
            assert_eq!(outgoing.get("x-token").unwrap(), "abc");
            // strict policy drops the sender's User-Agent; the default survives
            assert_ne!(outgoing.get(USER_AGENT).unwrap(), "custom");
        }
    }

    #[test]
    fn permissive_policy_keeps_fixed_user_agent_last() {
        let custom = custom_with_generic(&[("User-Agent", "custom")]);
        let defaults = default_headers();
        let handler =
            build_header_handler(RequestClass::Segment, &custom, &defaults, HeaderPolicy::Permissive)
                .unwrap();
        let mut outgoing = HeaderMap::new();
        handler.apply(&mut outgoing);
        assert_eq!(outgoing.get(USER_AGENT), defaults.get(USER_AGENT));
    }

    #[test]
    fn strict_policy_drops_referer() {
        let custom = custom_with_generic(&[("Referer", "https://evil.example.com")]);
        let handler =
            build_header_handler(RequestClass::Manifest, &custom, &default_headers(), HeaderPolicy::Strict)
                .unwrap();
        assert!(handler.overlay().get(REFERER).is_none());
    }

    #[test]
    fn class_specific_headers_shadow_generic_set() {
        let mut license = FxHashMap::default();
        license.insert("X-License".to_string(), "1".to_string());
        let mut generic = FxHashMap::default();
        generic.insert("X-Generic".to_string(), "1".to_string());
        let custom = CustomData {
            license_headers: Some(license),
            headers: Some(generic),
            ..CustomData::default()
        };

        let handler =
            build_header_handler(RequestClass::License, &custom, &default_headers(), HeaderPolicy::Strict)
                .unwrap();
        assert!(handler.overlay().get("x-license").is_some());
        // generic set is a fallback, not a union
        assert!(handler.overlay().get("x-generic").is_none());

        let handler =
            build_header_handler(RequestClass::Segment, &custom, &default_headers(), HeaderPolicy::Strict)
                .unwrap();
        assert!(handler.overlay().get("x-generic").is_some());
    }

    #[test]
    fn empty_values_are_skipped() {
        let custom = custom_with_generic(&[("X-Empty", ""), ("X-Set", "1")]);
        let handler =
            build_header_handler(RequestClass::Manifest, &custom, &default_headers(), HeaderPolicy::Strict)
                .unwrap();
        assert!(handler.overlay().get("x-empty").is_none());
        assert_eq!(handler.overlay().get("x-set").unwrap(), "1");
    }

    #[test]
    fn apply_overwrites_request_headers_and_is_idempotent() {
        let custom = custom_with_generic(&[("X-Token", "new")]);
        let handler =
            build_header_handler(RequestClass::Segment, &custom, &default_headers(), HeaderPolicy::Strict)
                .unwrap();
        let mut outgoing = HeaderMap::new();
        outgoing.insert("x-token", HeaderValue::from_static("old"));
        handler.apply(&mut outgoing);
        handler.apply(&mut outgoing);
        assert_eq!(outgoing.get_all("x-token").iter().count(), 1);
        assert_eq!(outgoing.get("x-token").unwrap(), "new");
    }
}
