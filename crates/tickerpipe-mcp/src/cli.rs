//! Command-line arguments for the `tickerpipe` server.
//!
//! Every option falls back to a `TICKERPIPE_*` environment variable, which may
//! come from a `.env` file in the working directory.
//!
//! | Option | Env | Default |
//! |--------|-----|---------|
//! | `--transport` | `TICKERPIPE_TRANSPORT` | `stdio` |
//! | `--host` | `TICKERPIPE_HOST` | `127.0.0.1` |
//! | `--port` | `TICKERPIPE_PORT` | `8000` |
//! | `--log-level` | `TICKERPIPE_LOG_LEVEL` | `info` |
//! | `--log-format` | `TICKERPIPE_LOG_FORMAT` | `text` |
//! | `--base-url` | `TICKERPIPE_BASE_URL` | Yahoo Finance |
//! | `--min-interval-ms` | `TICKERPIPE_MIN_INTERVAL_MS` | `500` |

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tickerpipe_core::adapters::DEFAULT_BASE_URL;
use tickerpipe_core::PipelineConfig;

#[derive(Debug, Parser)]
#[command(
    name = "tickerpipe",
    version,
    about = "Historical stock price tools over the Model Context Protocol"
)]
pub struct Cli {
    /// How MCP messages reach the server.
    #[arg(long, env = "TICKERPIPE_TRANSPORT", value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Listen address for the HTTP transport.
    #[arg(long, env = "TICKERPIPE_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[arg(long, env = "TICKERPIPE_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Default level for tickerpipe targets; `RUST_LOG` takes precedence.
    #[arg(long, env = "TICKERPIPE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "TICKERPIPE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Upstream chart API base URL.
    #[arg(long, env = "TICKERPIPE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Minimum spacing between upstream calls, in milliseconds.
    #[arg(long, env = "TICKERPIPE_MIN_INTERVAL_MS", default_value_t = 500)]
    pub min_interval_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout.
    Stdio,
    /// JSON-RPC over `POST /mcp`.
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Cli {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_base_url(self.base_url.clone())
            .with_min_interval(Duration::from_millis(self.min_interval_ms))
    }

    /// Filter directive used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> String {
        format!("tickerpipe={}", self.log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_stdio() {
        let cli = Cli::try_parse_from(["tickerpipe"]).expect("defaults parse");

        assert_eq!(cli.transport, Transport::Stdio);
        assert_eq!(cli.socket_addr().to_string(), "127.0.0.1:8000");
        assert_eq!(cli.default_log_filter(), "tickerpipe=info");
        assert_eq!(
            cli.pipeline_config().min_interval,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn http_options_parse() {
        let cli = Cli::try_parse_from([
            "tickerpipe",
            "--transport",
            "http",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--min-interval-ms",
            "750",
            "--log-format",
            "json",
        ])
        .expect("options parse");

        assert_eq!(cli.transport, Transport::Http);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.socket_addr().port(), 9000);
        assert_eq!(
            cli.pipeline_config().min_interval,
            Duration::from_millis(750)
        );
    }
}
