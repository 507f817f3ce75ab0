use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the proof-of-work ledger node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:8080)
    #[arg(long, global = true, default_value = "http://127.0.0.1:8080")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a transaction with an arbitrary JSON payload
    Submit {
        /// Payload, e.g. '{"from":"alice","to":"bob","amount":5}'
        #[arg(long)]
        json: String,
    },
    /// Mine the pending transactions into a new block
    Mine,
    /// Print the whole chain
    Chain,
    /// Ask the node to re-verify its chain
    Verify,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let base = cli.node.trim_end_matches('/');
    let client = reqwest::Client::new();

    let request = match cli.cmd {
        Command::Submit { json } => {
            let payload: Value =
                serde_json::from_str(&json).context("--json is not valid JSON")?;
            client
                .post(format!("{base}/blockchain/transactions"))
                .json(&payload)
        }
        Command::Mine => client.get(format!("{base}/blockchain/mine")),
        Command::Chain => client.get(format!("{base}/blockchain/")),
        Command::Verify => client.get(format!("{base}/blockchain/verifyChain")),
    };

    debug!(?request, "sending request");
    let res = request.send().await?;
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    match serde_json::from_str::<Value>(&body) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}
