use crate::block::Block;
use crate::chain::Chain;
use crate::error::{LedgerError, Result};
use crate::hasher::Hasher;
use crate::payload::Transaction;
use crate::pool::TransactionPool;
use crate::pow::{CancelToken, NonceSearch};
use num_bigint::BigInt;
use tracing::{info, warn};

/// Turns the pending pool into the next block on top of the chain tail.
pub struct ProofOfWorkMiner<'a> {
    pool: &'a TransactionPool,
    chain: &'a Chain,
    hasher: &'a Hasher,
}

impl<'a> ProofOfWorkMiner<'a> {
    pub fn new(pool: &'a TransactionPool, chain: &'a Chain, hasher: &'a Hasher) -> Self {
        Self {
            pool,
            chain,
            hasher,
        }
    }

    /// Drains the pool, searches for a nonce and appends the finished block.
    /// Returns the winning nonce.
    ///
    /// A token cancelled before the call leaves the pool untouched. Once
    /// drained, the batch is consumed even if the search is cancelled; nothing
    /// is appended unless a proof was found.
    pub fn mine(&self, cancel: &CancelToken) -> Result<BigInt> {
        if cancel.is_cancelled() {
            return Err(LedgerError::MiningCancelled);
        }
        let data = self.pool.drain();
        if data.is_empty() {
            return Err(LedgerError::EmptyPool);
        }
        self.mine_batch(data, cancel)
    }

    fn mine_batch(&self, data: Vec<Transaction>, cancel: &CancelToken) -> Result<BigInt> {
        let tip = self.chain.tip();
        let number = tip.number + 1;
        let previous_hash = tip.hash.clone();

        let search = NonceSearch::new(self.hasher, &previous_hash, number, &data)?;
        let proof = search.run(cancel).inspect_err(|e| {
            warn!(number, dropped = data.len(), error = %e, "mining abandoned");
        })?;

        info!(
            number,
            nonce = %proof.nonce,
            hash = %proof.hash,
            attempts = proof.attempts,
            txs = data.len(),
            "mined block"
        );

        let block = Block {
            number,
            nonce: proof.nonce.clone(),
            timestamp: crate::unix_now(),
            data,
            previous_hash,
            hash: proof.hash,
        };
        self.chain.append(block);
        Ok(proof.nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GENESIS_HASH;
    use crate::payload::Payload;
    use crate::pow::meets_difficulty;

    #[test]
    fn empty_pool_leaves_chain_unchanged() {
        let pool = TransactionPool::new();
        let chain = Chain::new();
        let hasher = Hasher::default();
        let err = ProofOfWorkMiner::new(&pool, &chain, &hasher)
            .mine(&CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, LedgerError::EmptyPool));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn mined_block_links_to_tail() {
        let pool = TransactionPool::new();
        let chain = Chain::new();
        let hasher = Hasher::default();
        let miner = ProofOfWorkMiner::new(&pool, &chain, &hasher);

        pool.add(Transaction::new(Payload::from("first")));
        let first = miner.mine(&CancelToken::new()).unwrap();
        pool.add(Transaction::new(Payload::from("second")));
        miner.mine(&CancelToken::new()).unwrap();

        let blocks = chain.snapshot();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].nonce, first);
        assert_eq!(blocks[1].previous_hash, GENESIS_HASH);
        assert_eq!(blocks[2].previous_hash, blocks[1].hash);
        assert_eq!(blocks[2].number, 2);
        for block in &blocks[1..] {
            assert!(meets_difficulty(&block.hash));
            assert_eq!(hasher.hash_block(&block.hash_input()).unwrap(), block.hash);
        }
        assert!(pool.is_empty());
    }

    #[test]
    fn cancelled_request_leaves_pool_untouched() {
        let pool = TransactionPool::new();
        let chain = Chain::new();
        let hasher = Hasher::default();
        let cancel = CancelToken::new();
        cancel.cancel();
        pool.add(Transaction::new(Payload::from("late")));

        let err = ProofOfWorkMiner::new(&pool, &chain, &hasher)
            .mine(&cancel)
            .unwrap_err();
        assert!(matches!(err, LedgerError::MiningCancelled));
        assert_eq!(chain.len(), 1);
        assert_eq!(pool.pending_snapshot(), vec![Transaction::new(Payload::from("late"))]);
    }

    #[test]
    fn search_cancelled_after_drain_consumes_batch_without_appending() {
        let pool = TransactionPool::new();
        let chain = Chain::new();
        let hasher = Hasher::default();
        pool.add(Transaction::new(Payload::from(1u64)));
        let miner = ProofOfWorkMiner::new(&pool, &chain, &hasher);

        let batch = pool.drain();
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = miner.mine_batch(batch, &cancel).unwrap_err();
        assert!(matches!(err, LedgerError::MiningCancelled));
        assert_eq!(chain.len(), 1);
        assert!(pool.is_empty());
    }
}
