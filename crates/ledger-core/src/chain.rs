use crate::block::Block;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Append-only sequence of blocks; index 0 is always genesis.
///
/// Blocks are stored behind `Arc` so a snapshot is a cheap copy of pointers
/// and stays valid while later blocks are appended.
#[derive(Debug)]
pub struct Chain {
    blocks: RwLock<Vec<Arc<Block>>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::with_genesis(Block::genesis(crate::unix_now()))
    }

    pub fn with_genesis(genesis: Block) -> Self {
        Self {
            blocks: RwLock::new(vec![Arc::new(genesis)]),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<Block>>> {
        self.blocks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<Block>>> {
        self.blocks.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn tip(&self) -> Arc<Block> {
        // never empty: constructed with genesis and only ever appended to
        let blocks = self.read();
        Arc::clone(&blocks[blocks.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn get(&self, number: usize) -> Option<Arc<Block>> {
        self.read().get(number).cloned()
    }

    pub fn snapshot(&self) -> Vec<Arc<Block>> {
        self.read().clone()
    }

    /// Publishes a fully formed block.
    pub(crate) fn append(&self, block: Block) -> Arc<Block> {
        let block = Arc::new(block);
        let mut blocks = self.write();
        debug_assert_eq!(block.number as usize, blocks.len());
        blocks.push(Arc::clone(&block));
        debug!(height = block.number, "block appended");
        block
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GENESIS_HASH;

    #[test]
    fn starts_with_genesis() {
        let chain = Chain::new();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.tip().hash, GENESIS_HASH);
        assert!(chain.get(0).unwrap().is_genesis());
        assert!(chain.get(1).is_none());
    }

    #[test]
    fn snapshot_is_unaffected_by_later_appends() {
        let chain = Chain::with_genesis(Block::genesis(0));
        let before = chain.snapshot();
        let mut next = Block::genesis(1);
        next.number = 1;
        next.hash = "next".into();
        chain.append(next);
        assert_eq!(before.len(), 1);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.tip().hash, "next");
    }
}
