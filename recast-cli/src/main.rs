mod cli;
mod error;
mod output;

use std::io::Read;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};
use url::Url;

use recast::{
    LoadRequestData, PlayerRequest, Receiver, ResolvedPlayback, ResolverConfig, TracingReporter,
    create_client, follow_redirect, net::redirect::send,
};

use crate::{
    cli::Args,
    error::Result,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let raw = match &args.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let request = LoadRequestData::from_json(&raw)?;

    let mut builder = ResolverConfig::builder().with_header_policy(args.policy.into());
    if let Some(fallback_url) = &args.fallback_url {
        let fallback_type = args
            .fallback_type
            .as_deref()
            .unwrap_or(recast::DEFAULT_FALLBACK_TYPE);
        builder = builder.with_fallback(fallback_url, fallback_type);
    }

    let receiver = Receiver::new(builder.build(), Arc::new(TracingReporter));
    let resolved = receiver.intercept_load(&request)?;

    output::print(&resolved, args.output)?;

    if args.probe {
        probe(&resolved, args.proxy).await?;
    }
    Ok(())
}

/// Issues a manifest-class request to the resolved URL with the
/// resolved headers applied, following a single redirect the way the
/// player's response filter would.
async fn probe(resolved: &ResolvedPlayback, proxy: Option<String>) -> Result<()> {
    let client = create_client(proxy.map(|url| recast::ProxyConfig {
        url,
        username: None,
        password: None,
    }));

    let url = Url::parse(&resolved.content_url)?;
    let mut request = PlayerRequest::get(url);
    if let Some(handler) = &resolved.manifest_handler {
        handler.apply(&mut request.headers);
    }

    let response = send(&client, &request).await?;
    info!("probe response: {}", response.status());
    let response = follow_redirect(&client, &request, response).await?;
    println!("Probe:        {} {}", response.status(), response.url());
    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_level(verbose))
        .with(filter)
        .init();
}
