use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tickerpipe_core::FetchPipeline;
use tickerpipe_mcp::cli::{Cli, LogFormat, Transport};
use tickerpipe_mcp::{transport, McpServer, ServerError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(error) = init_tracing(&cli) {
        eprintln!("error: {error}");
        return ExitCode::from(error.exit_code());
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "server stopped");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let pipeline = Arc::new(FetchPipeline::from_config(cli.pipeline_config()));
    let server = Arc::new(McpServer::new(pipeline));

    tracing::info!(
        transport = ?cli.transport,
        version = env!("CARGO_PKG_VERSION"),
        "starting tickerpipe"
    );

    match cli.transport {
        Transport::Stdio => transport::serve_stdio(server).await,
        Transport::Http => transport::serve_http(server, cli.socket_addr()).await,
    }
}

/// Logs always go to stderr; stdout belongs to the stdio transport.
fn init_tracing(cli: &Cli) -> Result<(), ServerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = cli.default_log_filter();
            EnvFilter::try_new(&directive).map_err(|e| ServerError::LogFilter {
                filter: directive,
                message: e.to_string(),
            })?
        }
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match cli.log_format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| ServerError::Logging(e.to_string()))
}
