use crate::block::Block;
use crate::chain::Chain;
use crate::error::Result;
use crate::hasher::Hasher;
use crate::mine::ProofOfWorkMiner;
use crate::payload::Transaction;
use crate::pool::TransactionPool;
use crate::pow::CancelToken;
use crate::validate::ChainValidator;
use num_bigint::BigInt;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

/// Application context owning the pool and the chain. Transport layers hold
/// one of these (usually behind an `Arc`) and call the entry points below.
#[derive(Debug, Default)]
pub struct Ledger {
    pool: TransactionPool,
    chain: Chain,
    hasher: Hasher,
    // held from pool drain to chain append so two miners never race on the tail
    mining: Mutex<()>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hasher(hasher: Hasher) -> Self {
        Self {
            hasher,
            ..Self::default()
        }
    }

    /// Builds a ledger for a configured digest name.
    pub fn from_digest_name(name: &str) -> Result<Self> {
        Hasher::from_name(name).map(Self::with_hasher)
    }

    /// Admits an already built transaction. Payloads constructed in code get
    /// the same depth limit as parsed ones.
    pub fn submit_transaction(&self, tx: Transaction) -> Result<Transaction> {
        tx.payload().check_depth()?;
        Ok(self.pool.add(tx))
    }

    /// Admits a raw JSON payload. A payload that cannot be encoded is rejected
    /// without touching the pool.
    pub fn submit_payload(&self, payload: Value) -> Result<Transaction> {
        let tx = Transaction::from_json(payload)?;
        Ok(self.pool.add(tx))
    }

    pub fn mine_next_block(&self) -> Result<BigInt> {
        self.mine_next_block_with(&CancelToken::new())
    }

    pub fn mine_next_block_with(&self, cancel: &CancelToken) -> Result<BigInt> {
        let _guard = self.mining.lock().unwrap_or_else(PoisonError::into_inner);
        ProofOfWorkMiner::new(&self.pool, &self.chain, &self.hasher).mine(cancel)
    }

    pub fn chain_snapshot(&self) -> Vec<Arc<Block>> {
        self.chain.snapshot()
    }

    pub fn validate_chain(&self) -> bool {
        ChainValidator::new(&self.hasher).is_valid(&self.chain.snapshot())
    }

    pub fn pool(&self) -> &TransactionPool {
        &self.pool
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }
}
