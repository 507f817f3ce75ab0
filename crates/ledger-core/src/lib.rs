pub mod block;
pub mod chain;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod hasher;
pub mod ledger;
pub mod mine;
pub mod payload;
pub mod pool;
pub mod pow;
pub mod validate;

pub use block::Block;
pub use chain::Chain;
pub use encoding::HashInput;
pub use error::{LedgerError, Result};
pub use hasher::{DigestAlgorithm, Hasher};
pub use ledger::Ledger;
pub use mine::ProofOfWorkMiner;
pub use payload::{Payload, Transaction};
pub use pool::TransactionPool;
pub use pow::CancelToken;
pub use validate::{ChainValidator, Violation};

pub use num_bigint::BigInt;

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch; a clock set before 1970 reads as 0.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
