//! linebus server binary: stdin and HTTP POST in, streaming fan-out.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use linebus::{Bus, Config, LogTarget, ingest, server};

/// Broadcast every stdin or POSTed line to all connected streaming clients.
#[derive(Parser, Debug)]
#[command(name = "linebus")]
#[command(about = "Minimal line-oriented broadcast bus with SSE-style fan-out")]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = linebus::config::DEFAULT_ADDR)]
    address: SocketAddr,

    /// Accept input on standard in
    #[arg(long)]
    stdin: bool,

    /// Quiet down the standard out status messages
    #[arg(short, long)]
    quiet: bool,

    /// File to mirror status messages and broadcasts to
    #[arg(long)]
    logfile: Option<PathBuf>,

    /// Prefix for server status messages
    #[arg(long, default_value = linebus::config::DEFAULT_PREFIX)]
    prefix: String,
}

impl Args {
    fn log_target(&self) -> LogTarget {
        // The log file takes priority; --quiet silences the stdout default.
        match (&self.logfile, self.quiet) {
            (Some(path), _) => LogTarget::File(path.clone()),
            (None, false) => LogTarget::Stdout,
            (None, true) => LogTarget::Disabled,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let args = Args::parse();
    let config = Config::default()
        .with_addr(args.address)
        .with_prefix(args.prefix.clone())
        .with_log(args.log_target())
        .with_stdin(args.stdin);

    let sinks = config.sink()?.into_iter().collect();
    let bus = Bus::with_sinks(sinks);
    bus.listen();
    let handle = bus.handle();

    if config.watch_stdin {
        tokio::spawn(ingest::watch_stdin(handle.clone()));
    }

    let router = server::router(handle);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!("serving on http://{}", listener.local_addr()?);

    tokio::select! {
        result = axum::serve(listener, router.into_make_service()) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, shutting down");
            bus.shutdown().await;
        }
    }

    Ok(())
}
