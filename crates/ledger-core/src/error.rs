use thiserror::Error;

/// Errors surfaced by the ledger core. None of them are retried internally.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no transactions to mine")]
    EmptyPool,
    #[error("digest algorithm unavailable: {0}")]
    DigestUnavailable(String),
    #[error("cannot encode payload: {0}")]
    Encoding(String),
    #[error("mining cancelled before a nonce was found")]
    MiningCancelled,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
