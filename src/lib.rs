//! Order-2 word-level Markov chain trainer/generator.
//!
//! [`engine::Engine`] owns the whole in-memory graph: an interned string
//! pool ([`intern`]), an adaptive node/exit store backed by size-class
//! slab allocators ([`node`], [`slab`], [`pools`]), and a start-state
//! table ([`start`]). [`trainer`] folds a line-oriented corpus into an
//! engine; [`export`] serializes the trained graph to three
//! mmap-friendly binary files; [`generator`] loads those files back and
//! samples sentences from them. [`stats`] reports table/pool occupancy.

pub mod engine;
pub mod error;
pub mod export;
#[cfg(unix)]
pub mod generator;
pub mod hash;
pub mod intern;
pub mod node;
pub mod pools;
#[cfg(unix)]
pub mod shutdown;
pub mod slab;
pub mod start;
pub mod stats;
pub mod trainer;
