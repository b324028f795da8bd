//! Redirect handling for the player's networking layer.
//!
//! Some origin servers answer manifest or segment fetches with a 3xx
//! the player does not follow on its own. The response filter here
//! rewrites the request against the redirect target and re-issues it
//! once; failures propagate to the player's retry machinery.

use bytes::Bytes;
use reqwest::header::{HeaderMap, LOCATION, ORIGIN, RANGE, REFERER};
use reqwest::{Client, Method, Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::RedirectError;

/// Snapshot of an outgoing player request, in the shape the networking
/// layer hands to response filters.
#[derive(Debug, Clone)]
pub struct PlayerRequest {
    pub method: Method,
    pub uris: Vec<Url>,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl PlayerRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            uris: vec![url],
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn first_uri(&self) -> Option<&Url> {
        self.uris.first()
    }
}

/// Computes the follow-up request for a redirected response, or `None`
/// when the response is not a redirect (or carries no `location`).
///
/// The follow-up keeps the original method, body, and headers, with the
/// target resolved absolutely against the original request's first URI.
/// `Range` is stripped (origin servers may reject it on the redirect
/// target), as are `Origin` and `Referer` (they can trip the target's
/// CORS checks).
pub fn rewrite_redirect(
    original: &PlayerRequest,
    status: StatusCode,
    response_headers: &HeaderMap,
) -> Result<Option<PlayerRequest>, RedirectError> {
    if !status.is_redirection() {
        return Ok(None);
    }
    let Some(location) = response_headers.get(LOCATION) else {
        return Ok(None);
    };
    // only a 3xx with a usable location commits to the rewrite; an
    // unreadable value is treated like a missing one
    let Ok(location) = location.to_str() else {
        return Ok(None);
    };
    let base = original.first_uri().ok_or(RedirectError::MissingUri)?;
    let target = base.join(location)?;
    debug!(%status, %target, "rewriting redirected request");

    let mut headers = original.headers.clone();
    headers.remove(RANGE);
    headers.remove(ORIGIN);
    headers.remove(REFERER);

    Ok(Some(PlayerRequest {
        method: original.method.clone(),
        uris: vec![target],
        headers,
        body: original.body.clone(),
    }))
}

/// Sends a [`PlayerRequest`] through the given client.
pub async fn send(client: &Client, request: &PlayerRequest) -> Result<Response, RedirectError> {
    let uri = request.first_uri().ok_or(RedirectError::MissingUri)?;
    let mut builder = client
        .request(request.method.clone(), uri.clone())
        .headers(request.headers.clone());
    if let Some(body) = &request.body {
        builder = builder.body(body.clone());
    }
    Ok(builder.send().await?)
}

/// Response-filter entry point: passes non-redirect responses through
/// and re-issues redirected ones, returning the follow-up response as
/// the effective response for the original request.
pub async fn follow_redirect(
    client: &Client,
    original: &PlayerRequest,
    response: Response,
) -> Result<Response, RedirectError> {
    let follow_up = rewrite_redirect(original, response.status(), response.headers())?;
    match follow_up {
        Some(request) => send(client, &request).await,
        None => Ok(response),
    }
}
