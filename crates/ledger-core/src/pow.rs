//! Nonce search for the text-prefix proof of work.

use crate::constants::DIFFICULTY_PREFIX;
use crate::encoding::HashTemplate;
use crate::error::{LedgerError, Result};
use crate::hasher::Hasher;
use crate::payload::Transaction;
use num_bigint::BigInt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// True when the rendered hash text starts with the difficulty prefix.
pub fn meets_difficulty(hash: &str) -> bool {
    hash.starts_with(DIFFICULTY_PREFIX)
}

/// Cooperative stop flag shared between a running search and whoever wants
/// to abandon it. Cloning yields a handle to the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Proof {
    pub nonce: BigInt,
    pub hash: String,
    pub attempts: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SearchState {
    Searching { nonce: BigInt },
    Found(Proof),
}

/// One candidate block being searched, advanced one nonce per `step`.
pub struct NonceSearch<'h> {
    hasher: &'h Hasher,
    template: HashTemplate,
    attempts: u64,
    state: SearchState,
}

impl<'h> NonceSearch<'h> {
    pub fn new(
        hasher: &'h Hasher,
        previous_hash: &str,
        number: u64,
        data: &[Transaction],
    ) -> Result<Self> {
        Ok(Self {
            hasher,
            template: HashTemplate::new(previous_hash, number, data)?,
            attempts: 0,
            state: SearchState::Searching {
                nonce: BigInt::from(0),
            },
        })
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Hashes the current nonce. On a miss the search moves on to the next
    /// nonce; once found, further steps are no-ops.
    pub fn step(&mut self) -> &SearchState {
        if let SearchState::Searching { nonce } = &mut self.state {
            let hash = self.hasher.hash(&self.template.with_nonce(nonce));
            self.attempts += 1;
            if meets_difficulty(&hash) {
                self.state = SearchState::Found(Proof {
                    nonce: std::mem::take(nonce),
                    hash,
                    attempts: self.attempts,
                });
            } else {
                *nonce += 1u32;
            }
        }
        &self.state
    }

    /// Steps until a proof is found. There is no iteration bound; the token is
    /// checked before every attempt.
    pub fn run(mut self, cancel: &CancelToken) -> Result<Proof> {
        loop {
            if cancel.is_cancelled() {
                return Err(LedgerError::MiningCancelled);
            }
            if let SearchState::Found(proof) = self.step() {
                return Ok(proof.clone());
            }
        }
    }
}
