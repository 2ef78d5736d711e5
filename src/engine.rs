//! The engine facade: one value owning the string pool, node table, start
//! table, and slab pools, threaded explicitly through training, export, and
//! stats. Replaces the reference implementation's file-scope `static`
//! tables with ordinary ownership, so tests can create as many independent
//! engines as they like.

use std::path::Path;

use crate::error::ExportError;
use crate::intern::{Interned, StringPool};
use crate::node::{self, NodeStore, Word, K};
use crate::pools::SlabPools;
use crate::start::StartStore;
use crate::stats::Stats;

pub struct Engine {
    pub strings: StringPool,
    pub nodes: NodeStore,
    pub starts: StartStore,
    pub pools: SlabPools,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            strings: StringPool::new(),
            nodes: NodeStore::new(),
            starts: StartStore::new(),
            pools: SlabPools::new(),
        }
    }

    /// Interns one raw word, deduplicating by bytes.
    pub fn intern(&mut self, word: &[u8]) -> Interned {
        self.strings.intern(word)
    }

    /// Folds one already-interned sentence into the graph: for `L < K`
    /// words, records a single padded start node; for `L >= K`, walks the
    /// sliding window of `K` words building/incrementing exits, then closes
    /// the sentence with a terminal (NULL-word-suffixed) exit.
    pub fn train_sentence(&mut self, words: &[Interned]) {
        let len = words.len();
        if len == 0 {
            return;
        }

        if len < K {
            let mut key: [Word; K] = [None; K];
            for (i, w) in words.iter().enumerate() {
                key[i] = Some(*w);
            }
            let node = self.nodes.get_or_create(&mut self.pools, key);
            self.starts.add_start(&mut self.pools, node);
            return;
        }

        let mut prev = self
            .nodes
            .get_or_create(&mut self.pools, [Some(words[0]), Some(words[1])]);
        self.starts.add_start(&mut self.pools, prev);

        for i in K..len {
            let key = [Some(words[i - K + 1]), Some(words[i])];
            let next = self.nodes.get_or_create(&mut self.pools, key);
            node::add_or_increment(&mut self.pools, prev, next);
            prev = next;
        }

        let terminal_key = [Some(words[len - 1]), None];
        let terminal = self.nodes.get_or_create(&mut self.pools, terminal_key);
        node::add_or_increment(&mut self.pools, prev, terminal);
    }

    /// Convenience wrapper over [`Self::train_sentence`] that interns raw
    /// word bytes first.
    pub fn train_words(&mut self, words: &[&[u8]]) {
        let interned: Vec<Interned> = words.iter().map(|w| self.strings.intern(w)).collect();
        self.train_sentence(&interned);
    }

    pub fn export(&mut self, dir: &Path) -> Result<(), ExportError> {
        crate::export::export(self, dir)
    }

    pub fn stats(&self) -> Stats {
        crate::stats::collect(self)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_sentence_records_a_start_only() {
        let mut engine = Engine::new();
        engine.train_words(&[b"hi"]);
        assert_eq!(engine.starts.len(), 1);
        assert_eq!(engine.nodes.len(), 1);
    }

    #[test]
    fn three_word_sentence_builds_expected_node_shape() {
        let mut engine = Engine::new();
        engine.train_words(&[b"the", b"cat", b"sat"]);
        // (the,cat) start node, (cat,sat) node, (sat,NULL) terminal node.
        assert_eq!(engine.nodes.len(), 3);
        assert_eq!(engine.starts.len(), 1);
    }

    #[test]
    fn repeated_sentences_increment_counts_not_node_count() {
        let mut engine = Engine::new();
        engine.train_words(&[b"the", b"cat", b"sat"]);
        engine.train_words(&[b"the", b"cat", b"sat"]);
        assert_eq!(engine.nodes.len(), 3);
        assert_eq!(engine.starts.len(), 1);
        let start_entries: Vec<_> = engine.starts.iter().collect();
        assert_eq!(start_entries[0].1, 2);
    }

    #[test]
    fn shared_prefix_sentences_share_nodes() {
        let mut engine = Engine::new();
        engine.train_words(&[b"a", b"b", b"c", b"d"]);
        engine.train_words(&[b"a", b"b", b"x", b"d"]);
        // (a,b) and (b,.. ) shared up to the branch point; (b,c) and (b,x)
        // diverge, then (c,d)/(x,d) and the shared (d,NULL) terminal.
        assert_eq!(engine.nodes.len(), 6);
    }
}
