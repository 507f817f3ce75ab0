use clap::Parser;
use ledger_core::constants::DEFAULT_DIGEST;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-node")]
#[command(about = "HTTP node for the single-node proof-of-work ledger")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub listen: String,

    /// Digest algorithm used for block hashes
    #[arg(long, default_value = DEFAULT_DIGEST)]
    pub digest: String,

    /// Give up on a mining request after this many seconds (0 = wait forever)
    #[arg(long, default_value_t = 60)]
    pub mine_timeout_secs: u64,
}

impl Args {
    pub fn mine_timeout(&self) -> Option<Duration> {
        (self.mine_timeout_secs > 0).then(|| Duration::from_secs(self.mine_timeout_secs))
    }
}
