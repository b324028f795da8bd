use clap::{Parser, ValueEnum};
use recast::HeaderPolicy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "recast-cli",
    about = "Recast - inspect how a cast LOAD request resolves before handing it to a player",
    version,
    author
)]
pub struct Args {
    /// Path to a JSON LOAD message; reads stdin when omitted
    pub input: Option<PathBuf>,

    /// Fallback content URL played when the request carries none
    #[arg(long)]
    pub fallback_url: Option<String>,

    /// Content type reported for the fallback URL
    #[arg(long, requires = "fallback_url")]
    pub fallback_type: Option<String>,

    /// Header policy for sender-supplied User-Agent/Referer entries
    #[arg(long, value_enum, default_value_t = PolicyArg::Strict)]
    pub policy: PolicyArg,

    /// Issue a probe request to the resolved URL (follows one redirect)
    #[arg(long)]
    pub probe: bool,

    /// Proxy URL for the probe request (supports http, https, socks5)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PolicyArg {
    /// Drop sender-supplied User-Agent/Referer entries
    Strict,
    /// Let the fixed default User-Agent win over sender-supplied values
    Permissive,
}

impl From<PolicyArg> for HeaderPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Strict => HeaderPolicy::Strict,
            PolicyArg::Permissive => HeaderPolicy::Permissive,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    Pretty,
    Json,
    JsonCompact,
}
