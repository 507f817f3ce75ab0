use clap::Parser;
use ledger_core::Ledger;
use ledger_node::{build_router, config::Args, AppState};
use std::net::SocketAddr;
use tracing::{error, info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let ledger = Ledger::from_digest_name(&args.digest).inspect_err(|e| {
        error!(digest = %args.digest, error = %e, "cannot start ledger");
    })?;
    info!(
        digest = %ledger.hasher().algorithm(),
        genesis = %ledger.chain().tip().hash,
        "ledger initialised"
    );

    let app = build_router(AppState::new(ledger, args.mine_timeout()));

    let addr: SocketAddr = args.listen.parse()?;
    info!("ledger-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
