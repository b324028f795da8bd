//! # Recast
//!
//! Load-request resolution engine for cast receiver applications.
//! Given a LOAD message from a sender, it produces everything the
//! external player needs to start playback: the final content URL and
//! type, a DRM configuration, and per-request-class header handlers.
//!
//! ## Design
//!
//! - Resolution never fails to produce something playable: a request
//!   with no usable URL falls back to a demo video. The only hard
//!   failure is a request without a media object.
//! - DRM and header parsing degrade instead of erroring; malformed
//!   input yields a safe configuration the player can still consume.
//! - Redirect handling mirrors a player response filter: observe a 3xx,
//!   rewrite the request against the target, re-issue once.

pub mod error;
pub mod message;
pub mod net;
pub mod resolve;
pub mod session;

pub use error::{LoadError, RedirectError};
pub use message::{CustomData, LoadRequestData, MediaInformation};
pub use net::{PlayerRequest, ProxyConfig, create_client, default_client, follow_redirect, rewrite_redirect};
pub use resolve::drm::{DrmConfig, WIDEVINE_KEY_SYSTEM};
pub use resolve::headers::{HeaderHandler, HeaderPolicy, RequestClass};
pub use resolve::{
    ContentFormat, DEFAULT_FALLBACK_TYPE, DEFAULT_FALLBACK_URL, LoadRequestResolver,
    ResolvedPlayback, ResolverConfig, ResolverConfigBuilder,
};
pub use session::{
    PlayerError, PlayerErrorKind, PlayerState, Receiver, StatusKind, StatusReporter,
    TracingReporter,
};
