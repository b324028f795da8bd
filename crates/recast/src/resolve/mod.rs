//! Turns an incoming load request into a playable configuration.
//!
//! The resolver is a pure transformation: content URL and type are
//! picked from an explicit precedence list, the DRM configuration is
//! derived from the custom-data license fields, and one header handler
//! is built per request class. No network traffic happens here.

pub mod drm;
pub mod headers;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LoadError;
use crate::message::{CustomData, LoadRequestData, MediaInformation};
use drm::DrmConfig;
use headers::{HeaderHandler, HeaderPolicy, RequestClass, build_header_handler};

/// Demo video substituted when a request resolves to no URL at all.
pub const DEFAULT_FALLBACK_URL: &str =
    "https://storage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";
pub const DEFAULT_FALLBACK_TYPE: &str = "video/mp4";

const DEFAULT_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/51.0.2704.103 Safari/537.36";

/// The content formats this receiver can name from a URL alone.
///
/// Exactly three extensions are recognized; anything else leaves the
/// content type unset and lets the player negotiate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentFormat {
    Hls,
    Dash,
    Mp4,
}

impl ContentFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ContentFormat::Hls => "application/x-mpegURL",
            ContentFormat::Dash => "application/dash+xml",
            ContentFormat::Mp4 => "video/mp4",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "m3u8" => Some(ContentFormat::Hls),
            "mpd" => Some(ContentFormat::Dash),
            "mp4" => Some(ContentFormat::Mp4),
            _ => None,
        }
    }

    /// Sniffs the format from a URL's file extension, ignoring query and
    /// fragment.
    pub fn sniff_url(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let (_, ext) = path.rsplit_once('.')?;
        if ext.contains('/') {
            // last dot was in the host, not in a file name
            return None;
        }
        Self::from_extension(ext)
    }
}

/// Static configuration of the resolver: the never-fail fallback, the
/// header policy, the built-in header defaults, and device capability
/// flags.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub fallback_url: String,
    pub fallback_type: String,
    pub header_policy: HeaderPolicy,
    /// Defaults merged under sender-supplied headers whenever a request
    /// class has custom headers at all.
    pub default_headers: HeaderMap,
    /// Whether the hosting device can play HLS content. Mismatches are
    /// reported, never fatal.
    pub supports_hls: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fallback_url: DEFAULT_FALLBACK_URL.to_string(),
            fallback_type: DEFAULT_FALLBACK_TYPE.to_string(),
            header_policy: HeaderPolicy::default(),
            default_headers: default_headers(),
            supports_hls: true,
        }
    }
}

impl ResolverConfig {
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::new()
    }
}

/// The built-in header set: a desktop User-Agent and a wildcard Accept.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_UA));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers
}

/// Builder for [`ResolverConfig`] with a fluent API.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
        }
    }

    pub fn with_fallback<U: Into<String>, T: Into<String>>(
        mut self,
        url: U,
        content_type: T,
    ) -> Self {
        self.config.fallback_url = url.into();
        self.config.fallback_type = content_type.into();
        self
    }

    pub fn with_header_policy(mut self, policy: HeaderPolicy) -> Self {
        self.config.header_policy = policy;
        self
    }

    /// Adds or replaces one entry in the built-in default header set.
    ///
    /// # Panics
    ///
    /// Panics when the name or value is not a valid HTTP header.
    pub fn with_default_header<K: AsRef<str>, V: AsRef<str>>(mut self, name: K, value: V) -> Self {
        self.config.default_headers.insert(
            reqwest::header::HeaderName::from_bytes(name.as_ref().as_bytes()).unwrap(),
            HeaderValue::from_str(value.as_ref()).unwrap(),
        );
        self
    }

    pub fn with_hls_support(mut self, supported: bool) -> Self {
        self.config.supports_hls = supported;
        self
    }

    pub fn build(self) -> ResolverConfig {
        self.config
    }
}

/// Everything the external player needs to start playback for one load
/// request. Computed synchronously, consumed once, never persisted.
#[derive(Debug, Clone)]
pub struct ResolvedPlayback {
    /// Never empty: either derived from the request or the fallback.
    pub content_url: String,
    pub content_type: Option<String>,
    pub drm: DrmConfig,
    pub license_handler: Option<HeaderHandler>,
    pub manifest_handler: Option<HeaderHandler>,
    pub segment_handler: Option<HeaderHandler>,
}

impl ResolvedPlayback {
    pub fn handler(&self, class: RequestClass) -> Option<&HeaderHandler> {
        match class {
            RequestClass::License => self.license_handler.as_ref(),
            RequestClass::Manifest => self.manifest_handler.as_ref(),
            RequestClass::Segment => self.segment_handler.as_ref(),
        }
    }
}

/// Resolves load requests into [`ResolvedPlayback`] configurations.
pub struct LoadRequestResolver {
    config: ResolverConfig,
}

impl LoadRequestResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Full resolution: content URL/type, DRM, and the three header
    /// handlers. The only error is a request without media.
    pub fn resolve(&self, request: &LoadRequestData) -> Result<ResolvedPlayback, LoadError> {
        let media = request.media.as_ref().ok_or(LoadError::MissingMedia)?;
        let (content_url, content_type) = self.resolve_content(media);

        let empty = CustomData::default();
        let custom = media.custom_data.as_ref().unwrap_or(&empty);
        let handler = |class| {
            build_header_handler(class, custom, &self.config.default_headers, self.config.header_policy)
        };

        Ok(ResolvedPlayback {
            content_url,
            content_type,
            drm: drm::resolve_drm(custom),
            license_handler: handler(RequestClass::License),
            manifest_handler: handler(RequestClass::Manifest),
            segment_handler: handler(RequestClass::Segment),
        })
    }

    /// Picks the content URL and type. The URL precedence is an ordered
    /// candidate list, first non-empty entry wins:
    /// `customData.url` > `customData.contentUrl` > `media.contentUrl`.
    /// With no candidate at all, the fallback URL and type are
    /// substituted unconditionally. `media.contentId` is an opaque
    /// sender-side identifier, not a URL source.
    fn resolve_content(&self, media: &MediaInformation) -> (String, Option<String>) {
        let custom = media.custom_data.as_ref();

        let url_candidates = [
            custom.and_then(|c| c.url.as_deref()),
            custom.and_then(|c| c.content_url.as_deref()),
            media.content_url.as_deref(),
        ];
        let url = url_candidates
            .into_iter()
            .flatten()
            .find(|candidate| !candidate.is_empty());

        let Some(url) = url else {
            debug!(fallback = %self.config.fallback_url, "no content url in request, using fallback");
            return (
                self.config.fallback_url.clone(),
                Some(self.config.fallback_type.clone()),
            );
        };

        let type_candidates = [
            custom.and_then(|c| c.content_type.as_deref()),
            media.content_type.as_deref(),
        ];
        let content_type = type_candidates
            .into_iter()
            .flatten()
            .find(|candidate| !candidate.is_empty())
            .map(str::to_owned)
            .or_else(|| ContentFormat::sniff_url(url).map(|f| f.mime_type().to_owned()));

        (url.to_owned(), content_type)
    }
}
