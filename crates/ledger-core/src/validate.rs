use crate::block::Block;
use crate::hasher::Hasher;
use crate::pow::meets_difficulty;
use std::fmt;
use tracing::warn;

/// First reason a chain was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    Unencodable { number: u64, reason: String },
    HashMismatch { number: u64, stored: String, computed: String },
    InsufficientWork { number: u64, hash: String },
    BrokenLink { number: u64, expected: String, found: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Violation::Unencodable { number, reason } => {
                write!(f, "block {number} cannot be re-encoded: {reason}")
            }
            Violation::HashMismatch {
                number,
                stored,
                computed,
            } => write!(f, "block {number} stores hash {stored} but hashes to {computed}"),
            Violation::InsufficientWork { number, hash } => {
                write!(f, "block {number} hash {hash} misses the difficulty prefix")
            }
            Violation::BrokenLink {
                number,
                expected,
                found,
            } => write!(
                f,
                "block {number} points at {found}, predecessor hash is {expected}"
            ),
        }
    }
}

/// Re-derives every mined block's hash and checks linkage. Genesis is never
/// re-hashed; its constant hash only anchors block 1.
pub struct ChainValidator<'h> {
    hasher: &'h Hasher,
}

impl<'h> ChainValidator<'h> {
    pub fn new(hasher: &'h Hasher) -> Self {
        Self { hasher }
    }

    pub fn check<B: AsRef<Block>>(&self, blocks: &[B]) -> Result<(), Violation> {
        for i in 1..blocks.len() {
            let current = blocks[i].as_ref();

            if i == 1 {
                let genesis = blocks[0].as_ref();
                if current.previous_hash != genesis.hash {
                    return Err(Violation::BrokenLink {
                        number: current.number,
                        expected: genesis.hash.clone(),
                        found: current.previous_hash.clone(),
                    });
                }
            }

            let computed = self
                .hasher
                .hash_block(&current.hash_input())
                .map_err(|e| Violation::Unencodable {
                    number: current.number,
                    reason: e.to_string(),
                })?;
            if computed != current.hash {
                return Err(Violation::HashMismatch {
                    number: current.number,
                    stored: current.hash.clone(),
                    computed,
                });
            }

            if !meets_difficulty(&current.hash) || !meets_difficulty(&computed) {
                return Err(Violation::InsufficientWork {
                    number: current.number,
                    hash: current.hash.clone(),
                });
            }

            if let Some(next) = blocks.get(i + 1) {
                let next = next.as_ref();
                if next.previous_hash != current.hash {
                    return Err(Violation::BrokenLink {
                        number: next.number,
                        expected: current.hash.clone(),
                        found: next.previous_hash.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn is_valid<B: AsRef<Block>>(&self, blocks: &[B]) -> bool {
        match self.check(blocks) {
            Ok(()) => true,
            Err(violation) => {
                warn!(%violation, "chain failed validation");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GENESIS_HASH;
    use crate::payload::Transaction;
    use num_bigint::BigInt;
    use serde_json::json;

    fn block_one() -> Block {
        Block {
            number: 1,
            nonce: BigInt::from(4877),
            timestamp: 1_600_000_000,
            data: vec![Transaction::from_json(json!({"a": 1})).unwrap()],
            previous_hash: GENESIS_HASH.to_string(),
            hash: "00vyVxRL0DU7vZruS/wVX/zSUGeTJCf7gj8NL+ucdQE=".to_string(),
        }
    }

    fn block_two() -> Block {
        Block {
            number: 2,
            nonce: BigInt::from(2943),
            timestamp: 1_600_000_100,
            data: vec![Transaction::from_json(json!({"b": 2})).unwrap()],
            previous_hash: "00vyVxRL0DU7vZruS/wVX/zSUGeTJCf7gj8NL+ucdQE=".to_string(),
            hash: "00HremZ//F1WjtR16NoIlVs/B4HeVf/MxJYVdpjkYPI=".to_string(),
        }
    }

    fn chain() -> Vec<Block> {
        vec![Block::genesis(1_599_999_999), block_one(), block_two()]
    }

    #[test]
    fn known_chain_is_valid() {
        let hasher = Hasher::default();
        assert_eq!(ChainValidator::new(&hasher).check(&chain()), Ok(()));
    }

    #[test]
    fn genesis_only_and_empty_are_valid() {
        let hasher = Hasher::default();
        let validator = ChainValidator::new(&hasher);
        assert!(validator.is_valid(&[Block::genesis(0)]));
        assert!(validator.is_valid::<Block>(&[]));
    }

    #[test]
    fn timestamp_is_not_covered_by_hash() {
        let hasher = Hasher::default();
        let mut blocks = chain();
        blocks[1].timestamp += 3600;
        assert!(ChainValidator::new(&hasher).is_valid(&blocks));
    }

    #[test]
    fn tampered_nonce_is_detected() {
        let hasher = Hasher::default();
        let mut blocks = chain();
        blocks[1].nonce += 1u32;
        let violation = ChainValidator::new(&hasher).check(&blocks).unwrap_err();
        assert!(matches!(violation, Violation::HashMismatch { number: 1, .. }));
    }

    #[test]
    fn tampered_data_is_detected() {
        let hasher = Hasher::default();
        let mut blocks = chain();
        blocks[2].data.push(Transaction::from_json(json!("extra")).unwrap());
        let violation = ChainValidator::new(&hasher).check(&blocks).unwrap_err();
        assert!(matches!(violation, Violation::HashMismatch { number: 2, .. }));
    }

    #[test]
    fn tampered_number_is_detected() {
        let hasher = Hasher::default();
        let mut blocks = chain();
        blocks[2].number = 5;
        assert!(!ChainValidator::new(&hasher).is_valid(&blocks));
    }

    #[test]
    fn unmined_block_is_rejected() {
        let hasher = Hasher::default();
        let mut blocks = chain();
        let mut lazy = block_two();
        lazy.nonce = BigInt::from(0);
        lazy.hash = hasher.hash_block(&lazy.hash_input()).unwrap();
        assert!(!meets_difficulty(&lazy.hash));
        blocks[2] = lazy;
        let violation = ChainValidator::new(&hasher).check(&blocks).unwrap_err();
        assert!(matches!(violation, Violation::InsufficientWork { number: 2, .. }));
    }

    #[test]
    fn swapped_predecessor_hash_is_detected() {
        let hasher = Hasher::default();
        let mut blocks = chain();
        blocks[1].hash = blocks[2].hash.clone();
        let violation = ChainValidator::new(&hasher).check(&blocks).unwrap_err();
        assert!(matches!(violation, Violation::HashMismatch { number: 1, .. }));
    }

    #[test]
    fn block_one_must_point_at_genesis() {
        let hasher = Hasher::default();
        let mut blocks = chain();
        blocks[0].hash = "something else".into();
        let violation = ChainValidator::new(&hasher).check(&blocks).unwrap_err();
        assert!(matches!(violation, Violation::BrokenLink { number: 1, .. }));
    }
}
