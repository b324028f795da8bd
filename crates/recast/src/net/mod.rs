pub mod client;
pub mod redirect;

pub use client::{ProxyConfig, create_client, default_client};
pub use redirect::{PlayerRequest, follow_redirect, rewrite_redirect, send};
