//! Receiver-session wiring around the resolver.
//!
//! The resolver is pure data-in/data-out; this module owns the side of
//! the job that talks to a human: status lines for the screen, and the
//! translation of player-reported states and errors into those lines.
//! No error that reaches this module is allowed to escalate further.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::LoadError;
use crate::message::LoadRequestData;
use crate::resolve::{ContentFormat, LoadRequestResolver, ResolvedPlayback, ResolverConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

/// Output capability for on-screen status text, injected into the
/// session so the resolver itself never touches an output device.
pub trait StatusReporter: Send + Sync {
    fn report(&self, kind: StatusKind, message: &str);
}

/// Default reporter: forwards status lines to the tracing subscriber.
#[derive(Debug, Default, Clone)]
pub struct TracingReporter;

impl StatusReporter for TracingReporter {
    fn report(&self, kind: StatusKind, message: &str) {
        match kind {
            StatusKind::Info => info!("{message}"),
            StatusKind::Warning => warn!("{message}"),
            StatusKind::Error => error!("{message}"),
        }
    }
}

/// Player states the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Buffering,
    Playing,
    Paused,
}

/// Error classes the external player can surface. All of them end as a
/// status line; none terminate the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerErrorKind {
    Network,
    Decode,
    Drm,
    Format,
    Other,
}

impl PlayerErrorKind {
    fn as_str(&self) -> &'static str {
        match self {
            PlayerErrorKind::Network => "network",
            PlayerErrorKind::Decode => "decode",
            PlayerErrorKind::Drm => "drm",
            PlayerErrorKind::Format => "format",
            PlayerErrorKind::Other => "player",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerError {
    pub kind: PlayerErrorKind,
    pub code: Option<u32>,
    pub message: String,
}

/// One receiver session: resolver configuration plus the status
/// capability, live for the duration of a cast session.
pub struct Receiver {
    resolver: LoadRequestResolver,
    reporter: Arc<dyn StatusReporter>,
}

impl Receiver {
    pub fn new(config: ResolverConfig, reporter: Arc<dyn StatusReporter>) -> Self {
        Self {
            resolver: LoadRequestResolver::new(config),
            reporter,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ResolverConfig::default(), Arc::new(TracingReporter))
    }

    pub fn resolver(&self) -> &LoadRequestResolver {
        &self.resolver
    }

    /// LOAD interception entry point. Resolves the request, narrates the
    /// outcome, and hands back the playback configuration. The only
    /// error is a request without media, which the framework reports to
    /// the sender as an invalid parameter.
    pub fn intercept_load(
        &self,
        request: &LoadRequestData,
    ) -> Result<ResolvedPlayback, LoadError> {
        self.reporter.report(StatusKind::Info, "Processing load request...");

        let resolved = match self.resolver.resolve(request) {
            Ok(resolved) => resolved,
            Err(e) => {
                self.reporter
                    .report(StatusKind::Error, "Load request carries no media");
                return Err(e);
            }
        };

        let config = self.resolver.config();
        if resolved.content_url == config.fallback_url {
            self.reporter.report(StatusKind::Info, "Using fallback content");
        }
        if !config.supports_hls
            && resolved.content_type.as_deref() == Some(ContentFormat::Hls.mime_type())
        {
            self.reporter
                .report(StatusKind::Warning, "HLS is not supported on this device");
        }

        self.reporter.report(
            StatusKind::Info,
            &format!("Loading: {}...", truncate(&resolved.content_url, 50)),
        );
        Ok(resolved)
    }

    /// Maps a player state change to a status line.
    pub fn on_player_state(&self, state: PlayerState) {
        let message = match state {
            PlayerState::Playing => "Playing",
            PlayerState::Buffering => "Buffering...",
            PlayerState::Paused => "Paused",
            PlayerState::Idle => "Idle. Waiting for content...",
        };
        self.reporter.report(StatusKind::Info, message);
    }

    /// Surfaces an upstream player error as a status line. Never fails,
    /// never panics; the worst outcome of any player error is text on
    /// the screen.
    pub fn on_player_error(&self, player_error: &PlayerError) {
        let message = match player_error.code {
            Some(code) => format!(
                "{} error {}: {}",
                player_error.kind.as_str(),
                code,
                player_error.message
            ),
            None => format!("{} error: {}", player_error.kind.as_str(), player_error.message),
        };
        self.reporter.report(StatusKind::Error, &message);
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((index, _)) => &s[..index],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{CustomData, MediaInformation};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingReporter {
        lines: Mutex<Vec<(StatusKind, String)>>,
    }

    impl StatusReporter for RecordingReporter {
        fn report(&self, kind: StatusKind, message: &str) {
            self.lines.lock().unwrap().push((kind, message.to_string()));
        }
    }

    fn receiver_with_recorder(config: ResolverConfig) -> (Receiver, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::default());
        (Receiver::new(config, reporter.clone()), reporter)
    }

    fn load_request(url: Option<&str>) -> LoadRequestData {
        LoadRequestData {
            media: Some(MediaInformation {
                content_url: url.map(str::to_owned),
                ..MediaInformation::default()
            }),
            ..LoadRequestData::default()
        }
    }

    #[test]
    fn missing_media_reports_an_error_and_fails_the_load() {
        let (receiver, reporter) = receiver_with_recorder(ResolverConfig::default());
        let result = receiver.intercept_load(&LoadRequestData::default());
        assert!(matches!(result, Err(LoadError::MissingMedia)));
        let lines = reporter.lines.lock().unwrap();
        assert!(lines.iter().any(|(kind, _)| *kind == StatusKind::Error));
    }

    #[test]
    fn fallback_resolution_is_narrated() {
        let (receiver, reporter) = receiver_with_recorder(ResolverConfig::default());
        let resolved = receiver.intercept_load(&load_request(None)).unwrap();
        assert_eq!(resolved.content_url, crate::resolve::DEFAULT_FALLBACK_URL);
        let lines = reporter.lines.lock().unwrap();
        assert!(lines.iter().any(|(_, m)| m == "Using fallback content"));
    }

    #[test]
    fn hls_content_on_a_device_without_hls_support_warns() {
        let config = ResolverConfig::builder().with_hls_support(false).build();
        let (receiver, reporter) = receiver_with_recorder(config);
        receiver
            .intercept_load(&load_request(Some("https://cdn.example.com/a.m3u8")))
            .unwrap();
        let lines = reporter.lines.lock().unwrap();
        assert!(lines.iter().any(|(kind, _)| *kind == StatusKind::Warning));
    }

    #[test]
    fn resolved_configuration_carries_drm_and_handlers() {
        let (receiver, _) = receiver_with_recorder(ResolverConfig::default());
        let mut headers = rustc_hash::FxHashMap::default();
        headers.insert("X-Token".to_string(), "abc".to_string());
        let request = LoadRequestData {
            media: Some(MediaInformation {
                content_url: Some("https://cdn.example.com/a.mpd".to_string()),
                custom_data: Some(CustomData {
                    license_url: Some("https://lic.example.com".to_string()),
                    license_key: Some("https://lic.example.com/wv".to_string()),
                    headers: Some(headers),
                    ..CustomData::default()
                }),
                ..MediaInformation::default()
            }),
            ..LoadRequestData::default()
        };
        let resolved = receiver.intercept_load(&request).unwrap();
        assert!(!resolved.drm.is_none());
        assert!(resolved.license_handler.is_some());
        assert!(resolved.manifest_handler.is_some());
        assert!(resolved.segment_handler.is_some());
    }

    #[test]
    fn player_errors_become_status_lines() {
        let (receiver, reporter) = receiver_with_recorder(ResolverConfig::default());
        receiver.on_player_error(&PlayerError {
            kind: PlayerErrorKind::Drm,
            code: Some(6007),
            message: "license request failed".to_string(),
        });
        receiver.on_player_state(PlayerState::Buffering);
        let lines = reporter.lines.lock().unwrap();
        assert_eq!(lines[0].0, StatusKind::Error);
        assert!(lines[0].1.contains("6007"));
        assert_eq!(lines[1].1, "Buffering...");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
        assert_eq!(truncate("ééééé", 2), "éé");
    }
}
