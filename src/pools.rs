//! The full set of slab pools an [`crate::engine::Engine`] owns: one pool
//! sized for `Node`, one dense-array pool per exit capacity class (1..16,
//! 32, 64, 128), and one pool shared by hash-table exit entries and
//! start-table entries (`ChainEntry`), since both have identical shape.

use std::ptr::NonNull;

use crate::node::{ChainEntry, ExitSlot, Node};
use crate::slab::SlabPool;

const SMALL_CAPS: usize = 16;

pub struct SlabPools {
    node_pool: SlabPool,
    dense_pools: [SlabPool; SMALL_CAPS],
    dense32: SlabPool,
    dense64: SlabPool,
    dense128: SlabPool,
    overflow_pool: SlabPool,
}

impl SlabPools {
    pub fn new() -> Self {
        let exit_slot_size = std::mem::size_of::<ExitSlot>();
        Self {
            node_pool: SlabPool::new(std::mem::size_of::<Node>()),
            dense_pools: std::array::from_fn(|i| SlabPool::new(exit_slot_size * (i + 1))),
            dense32: SlabPool::new(exit_slot_size * 32),
            dense64: SlabPool::new(exit_slot_size * 64),
            dense128: SlabPool::new(exit_slot_size * 128),
            overflow_pool: SlabPool::new(std::mem::size_of::<ChainEntry>()),
        }
    }

    pub fn alloc_node(&mut self) -> NonNull<Node> {
        self.node_pool.alloc().cast()
    }

    pub fn alloc_chain_entry(&mut self) -> NonNull<ChainEntry> {
        self.overflow_pool.alloc().cast()
    }

    fn dense_pool_for_cap(&mut self, cap: u32) -> &mut SlabPool {
        match cap {
            1..=16 => &mut self.dense_pools[(cap - 1) as usize],
            32 => &mut self.dense32,
            64 => &mut self.dense64,
            128 => &mut self.dense128,
            _ => unreachable!("no dense pool for capacity {cap}"),
        }
    }

    pub fn alloc_dense(&mut self, cap: u32) -> NonNull<ExitSlot> {
        self.dense_pool_for_cap(cap).alloc().cast()
    }

    pub fn free_dense(&mut self, ptr: NonNull<ExitSlot>, cap: u32) {
        self.dense_pool_for_cap(cap).free(ptr.cast())
    }

    /// One `(label, live_count, bytes_reserved)` triple per pool, in a
    /// fixed, stable order, for [`crate::stats::Stats`].
    pub fn pool_occupancy(&self) -> Vec<(String, usize, usize)> {
        let mut out = Vec::with_capacity(SMALL_CAPS + 4);
        out.push((
            "node".to_string(),
            self.node_pool.live_count(),
            self.node_pool.bytes_reserved(),
        ));
        for (i, pool) in self.dense_pools.iter().enumerate() {
            out.push((format!("exit_dense_{}", i + 1), pool.live_count(), pool.bytes_reserved()));
        }
        out.push((
            "exit_dense_32".to_string(),
            self.dense32.live_count(),
            self.dense32.bytes_reserved(),
        ));
        out.push((
            "exit_dense_64".to_string(),
            self.dense64.live_count(),
            self.dense64.bytes_reserved(),
        ));
        out.push((
            "exit_dense_128".to_string(),
            self.dense128.live_count(),
            self.dense128.bytes_reserved(),
        ));
        out.push((
            "overflow".to_string(),
            self.overflow_pool.live_count(),
            self.overflow_pool.bytes_reserved(),
        ));
        out
    }
}

impl Default for SlabPools {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_one_occupancy_entry_per_pool() {
        // node + 16 small dense pools + dense32/64/128 + overflow.
        let pools = SlabPools::new();
        assert_eq!(pools.pool_occupancy().len(), SMALL_CAPS + 5);
    }
}
