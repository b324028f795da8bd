use std::collections::BTreeMap;

use recast::{DrmConfig, RequestClass, ResolvedPlayback};
use serde::Serialize;

use crate::{cli::OutputFormat, error::Result};

/// Serializable view of a resolved playback configuration. Header
/// handlers are flattened to their effective overlay maps.
#[derive(Debug, Serialize)]
pub struct ResolvedView {
    pub content_url: String,
    pub content_type: Option<String>,
    pub drm: DrmConfig,
    pub headers: BTreeMap<&'static str, BTreeMap<String, String>>,
}

impl From<&ResolvedPlayback> for ResolvedView {
    fn from(resolved: &ResolvedPlayback) -> Self {
        let mut headers = BTreeMap::new();
        for class in RequestClass::ALL {
            if let Some(handler) = resolved.handler(class) {
                let overlay = handler
                    .overlay()
                    .iter()
                    .map(|(name, value)| {
                        (
                            name.to_string(),
                            String::from_utf8_lossy(value.as_bytes()).into_owned(),
                        )
                    })
                    .collect();
                headers.insert(class.as_str(), overlay);
            }
        }
        Self {
            content_url: resolved.content_url.clone(),
            content_type: resolved.content_type.clone(),
            drm: resolved.drm.clone(),
            headers,
        }
    }
}

pub fn print(resolved: &ResolvedPlayback, format: OutputFormat) -> Result<()> {
    let view = ResolvedView::from(resolved);
    match format {
        OutputFormat::Pretty => print_pretty(&view),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::JsonCompact => println!("{}", serde_json::to_string(&view)?),
    }
    Ok(())
}

fn print_pretty(view: &ResolvedView) {
    println!("Content URL:  {}", view.content_url);
    println!(
        "Content type: {}",
        view.content_type.as_deref().unwrap_or("(player-negotiated)")
    );
    match &view.drm {
        DrmConfig::None => println!("DRM:          none"),
        DrmConfig::ClearKey { keys } => {
            println!("DRM:          ClearKey ({} key(s))", keys.len());
            for (kid, key) in keys {
                println!("              {kid} -> {key}");
            }
        }
        DrmConfig::Widevine { license_server_url } => {
            println!("DRM:          Widevine via {license_server_url}");
        }
    }
    if view.headers.is_empty() {
        println!("Headers:      (pass-through)");
    } else {
        for (class, overlay) in &view.headers {
            println!("Headers ({class}):");
            for (name, value) in overlay {
                println!("  {name}: {value}");
            }
        }
    }
}
