//! Table and slab-pool occupancy statistics.
//!
//! This is the rewrite of the reference implementation's `markov_stats`
//! shutdown diagnostic (spec.md §1's "statistics printing" collaborator):
//! since every table it reports on already belongs to this crate, it is
//! implemented here as a plain report type logged via `tracing` rather
//! than farmed out to an external printer.

use crate::engine::Engine;

/// Occupancy of one bucket-chained hash table.
#[derive(Debug, Clone)]
pub struct TableStats {
    pub label: &'static str,
    pub entries: usize,
    pub buckets: usize,
    pub max_chain_depth: usize,
    pub avg_chain_depth: f64,
}

impl TableStats {
    pub fn load_factor(&self) -> f64 {
        if self.buckets == 0 {
            0.0
        } else {
            self.entries as f64 / self.buckets as f64
        }
    }
}

/// A full snapshot of an [`Engine`]'s table and pool occupancy.
#[derive(Debug, Clone)]
pub struct Stats {
    pub strings: TableStats,
    pub nodes: TableStats,
    pub starts: TableStats,
    /// `(pool label, live slot count, bytes reserved)`, one entry per
    /// slab pool (19 exit-capacity pools, the node pool, the overflow
    /// pool), in [`crate::pools::SlabPools::pool_occupancy`]'s order.
    pub pools: Vec<(String, usize, usize)>,
}

pub fn collect(engine: &Engine) -> Stats {
    let (strings_max, strings_avg) = engine.strings.chain_depth_stats();
    let (nodes_max, nodes_avg) = engine.nodes.chain_depth_stats();
    let (starts_max, starts_avg) = engine.starts.chain_depth_stats();

    Stats {
        strings: TableStats {
            label: "string pool",
            entries: engine.strings.len(),
            buckets: engine.strings.bucket_count(),
            max_chain_depth: strings_max,
            avg_chain_depth: strings_avg,
        },
        nodes: TableStats {
            label: "node table",
            entries: engine.nodes.len(),
            buckets: engine.nodes.bucket_count(),
            max_chain_depth: nodes_max,
            avg_chain_depth: nodes_avg,
        },
        starts: TableStats {
            label: "start table",
            entries: engine.starts.len(),
            buckets: engine.starts.bucket_count(),
            max_chain_depth: starts_max,
            avg_chain_depth: starts_avg,
        },
        pools: engine.pools.pool_occupancy(),
    }
}

impl Stats {
    /// Logs the report at `info!`: one line per table, then one line per
    /// slab pool that has ever allocated a slot (pools a corpus never
    /// exercises — e.g. the 128-capacity dense pool on a small training
    /// run — stay silent rather than padding the log with zeros).
    pub fn log(&self) {
        for table in [&self.strings, &self.nodes, &self.starts] {
            tracing::info!(
                table = table.label,
                entries = table.entries,
                buckets = table.buckets,
                load_factor = table.load_factor(),
                max_chain_depth = table.max_chain_depth,
                avg_chain_depth = table.avg_chain_depth,
                "table occupancy"
            );
        }
        for (label, live, bytes) in &self.pools {
            if *live == 0 {
                continue;
            }
            tracing::info!(pool = %label, live_slots = live, bytes_reserved = bytes, "pool occupancy");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_engine_reports_zeroed_tables() {
        let engine = Engine::new();
        let stats = collect(&engine);
        assert_eq!(stats.strings.entries, 0);
        assert_eq!(stats.nodes.entries, 0);
        assert_eq!(stats.starts.entries, 0);
        assert_eq!(stats.nodes.load_factor(), 0.0);
    }

    #[test]
    fn trained_engine_reports_nonzero_occupancy() {
        let mut engine = Engine::new();
        engine.train_words(&[b"the", b"cat", b"sat"]);
        let stats = collect(&engine);
        assert_eq!(stats.nodes.entries, 3);
        assert_eq!(stats.starts.entries, 1);
        assert!(stats.strings.entries >= 3);
        assert!(stats.pools.iter().any(|(_, live, _)| *live > 0));
    }
}
