use anyhow::Context;
use arguments::Arguments;
use clap::Parser;
use server::Server;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod arguments;
mod connection;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Arguments::parse();

    let listener = TcpListener::bind(args.socket)
        .await
        .with_context(|| format!("Failed to bind {}", args.socket))?;
    info!("Listening on {}", listener.local_addr()?);

    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            signal.cancel();
        }
    });

    let server = Server::new(args.idle_timeout.into(), args.max_conns);
    server
        .serve(listener, cancel, args.grace_period.into())
        .await
}
