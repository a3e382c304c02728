use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};

pub const BUFFER_SIZE_ENV: &str = "WORMHOLE_KEYGEN_BUFFER_SIZE";
pub const KGS_HOSTNAME_ENV: &str = "WORMHOLE_KEYGEN_KGS_HOSTNAME";
pub const KGS_PORT_ENV: &str = "WORMHOLE_KEYGEN_KGS_PORT";
pub const FETCH_TIMEOUT_MS_ENV: &str = "WORMHOLE_KEYGEN_FETCH_TIMEOUT_MS";
pub const LOG_FORMAT_ENV: &str = "WORMHOLE_KEYGEN_LOG_FORMAT";

pub const DEFAULT_BUFFER_SIZE: &str = "100";
pub const DEFAULT_KGS_HOSTNAME: &str = "127.0.0.1";
pub const DEFAULT_KGS_PORT: &str = "8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Text => write!(f, "text"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

/// Draws keys from a remote Key Generation Service through a buffered
/// generator and prints one per line.
#[derive(Debug, Parser)]
#[command(name = "wormhole-keygen")]
pub struct CLI {
    /// Keys fetched per round trip. Validated after parsing so that zero and
    /// negative values report a configuration error.
    #[arg(
        long,
        env = BUFFER_SIZE_ENV,
        default_value = DEFAULT_BUFFER_SIZE,
        allow_negative_numbers = true
    )]
    pub buffer_size: i64,

    #[arg(long, env = KGS_HOSTNAME_ENV, default_value = DEFAULT_KGS_HOSTNAME)]
    pub kgs_hostname: String,

    #[arg(long, env = KGS_PORT_ENV, default_value = DEFAULT_KGS_PORT)]
    pub kgs_port: u16,

    #[arg(long, env = FETCH_TIMEOUT_MS_ENV)]
    pub fetch_timeout_ms: Option<u64>,

    /// Number of keys to draw.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Text
    )]
    pub log_format: LogFormatArg,
}
