//! mmap-backed generator.
//!
//! Opens the three exported databases read-only and samples chains by
//! binary-searching their cumulative exit counts. Nothing is deserialized
//! into owned structs: every field is read directly out of the mapped
//! bytes at the offset the exporter wrote it to, matching the reference
//! implementation's raw-overlay approach while staying inside Rust's
//! aliasing rules (bounds/alignment-checked reads instead of a struct cast).

use std::fs::File;
use std::num::NonZeroUsize;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr::NonNull;

use nix::sys::mman::{mmap, munmap, MapFlags, ProtFlags};
use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::debug;

use crate::error::GeneratorError;

const NODE_HEADER_SIZE: usize = 20; // strings[2]: i64 x2, num_exits: i32
const EXIT_SIZE: usize = 12; // node offset: i64, cumulative count: i32

/// Supplies the generator's random draws. Production code runs on
/// [`rand::rngs::ThreadRng`]; tests substitute a seeded
/// [`rand::rngs::StdRng`] so weighted-sampling assertions are
/// reproducible, unlike the reference implementation's bare `rand()`.
pub trait SampleSource {
    /// A value drawn uniformly from `[0, bound)`. Call sites only ever
    /// pass `bound = total + 1`, i.e. spec.md §7's adopted inclusive draw
    /// over `[0, total]`.
    fn next_below(&mut self, bound: u32) -> u32;
}

impl SampleSource for ThreadRng {
    fn next_below(&mut self, bound: u32) -> u32 {
        self.gen_range(0..bound)
    }
}

impl SampleSource for rand::rngs::StdRng {
    fn next_below(&mut self, bound: u32) -> u32 {
        self.gen_range(0..bound)
    }
}

/// A read-only mapping of one exported database file, unmapped on drop.
struct Mapping {
    ptr: NonNull<u8>,
    len: usize,
}

impl Mapping {
    fn open(path: &Path) -> Result<Self, GeneratorError> {
        let file = File::open(path)
            .map_err(|source| GeneratorError::Open { path: path.to_path_buf(), source })?;
        let len = file
            .metadata()
            .map_err(|source| GeneratorError::Metadata { path: path.to_path_buf(), source })?
            .len() as usize;
        let len_nz = NonZeroUsize::new(len)
            .ok_or_else(|| GeneratorError::EmptyDatabase { path: path.to_path_buf() })?;

        // SAFETY: `file` outlives the call (it is only needed to obtain the
        // fd); the mapping is read-only and private, so no other process or
        // handle can observe writes through it.
        let raw = unsafe {
            mmap(None, len_nz, ProtFlags::PROT_READ, MapFlags::MAP_PRIVATE, file.as_raw_fd(), 0)
        }
        .map_err(|source| GeneratorError::Mmap { path: path.to_path_buf(), source })?;
        let ptr = NonNull::new(raw.cast::<u8>()).expect("mmap returned a null pointer on success");

        Ok(Self { ptr, len })
    }

    fn bytes(&self) -> &[u8] {
        // SAFETY: `ptr` was returned by a successful `mmap` of `len` bytes
        // and is never written to or unmapped before `self` is dropped.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: `ptr`/`len` are exactly the region returned by this
        // mapping's own `mmap` call, unmapped exactly once.
        unsafe {
            let _ = munmap(self.ptr.as_ptr().cast(), self.len);
        }
    }
}

fn read_i64(buf: &[u8], offset: usize) -> Result<i64, GeneratorError> {
    let end = offset
        .checked_add(8)
        .ok_or(GeneratorError::OutOfBounds { offset: offset as i64, len: buf.len() })?;
    let slice = buf
        .get(offset..end)
        .ok_or(GeneratorError::OutOfBounds { offset: offset as i64, len: buf.len() })?;
    Ok(i64::from_le_bytes(slice.try_into().expect("slice is exactly 8 bytes")))
}

fn read_i32(buf: &[u8], offset: usize) -> Result<i32, GeneratorError> {
    let end = offset
        .checked_add(4)
        .ok_or(GeneratorError::OutOfBounds { offset: offset as i64, len: buf.len() })?;
    let slice = buf
        .get(offset..end)
        .ok_or(GeneratorError::OutOfBounds { offset: offset as i64, len: buf.len() })?;
    Ok(i32::from_le_bytes(slice.try_into().expect("slice is exactly 4 bytes")))
}

/// One exit record read straight out of `markovdb`/`startdb`: the target
/// node's absolute byte offset within `markovdb`, and the *cumulative*
/// (not per-edge) count the exporter wrote.
#[derive(Clone, Copy, Debug)]
struct ExportExit {
    node_offset: i64,
    cumulative: i64,
}

/// An `export_node` header read out of `markovdb`, plus the byte offset
/// of its trailing exit array.
struct NodeView {
    word_offsets: [i64; 2],
    num_exits: u32,
    exits_start: usize,
}

/// Loads the three exported databases and samples word chains from them.
pub struct Generator {
    strings: Mapping,
    markov: Mapping,
    start: Mapping,
}

impl Generator {
    /// Opens `stringdb`, `markovdb`, and `startdb` under `dir` read-only.
    pub fn open(dir: &Path) -> Result<Self, GeneratorError> {
        let strings = Mapping::open(&dir.join("stringdb"))?;
        let markov = Mapping::open(&dir.join("markovdb"))?;
        let start = Mapping::open(&dir.join("startdb"))?;
        debug!(
            stringdb_bytes = strings.len,
            markovdb_bytes = markov.len,
            startdb_bytes = start.len,
            "mapped markov databases"
        );
        Ok(Self { strings, markov, start })
    }

    /// Resolves a `stringdb` offset to its bytes, or the empty slice for
    /// the NULL-word sentinel (`-1`).
    fn resolve_string(&self, offset: i64) -> &[u8] {
        if offset == -1 {
            return &[];
        }
        let bytes = self.strings.bytes();
        let start = offset as usize;
        let tail = &bytes[start..];
        let len = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        &tail[..len]
    }

    fn node_view(&self, offset: i64) -> Result<NodeView, GeneratorError> {
        let buf = self.markov.bytes();
        let base = offset as usize;
        if base.checked_add(NODE_HEADER_SIZE).map_or(true, |end| end > buf.len()) {
            return Err(GeneratorError::OutOfBounds { offset, len: buf.len() });
        }
        let w0 = read_i64(buf, base)?;
        let w1 = read_i64(buf, base + 8)?;
        let num_exits = read_i32(buf, base + 16)?;
        if num_exits < 0 {
            return Err(GeneratorError::Corrupt("node num_exits is negative"));
        }
        Ok(NodeView { word_offsets: [w0, w1], num_exits: num_exits as u32, exits_start: base + NODE_HEADER_SIZE })
    }

    fn node_exits(&self, view: &NodeView) -> Result<Vec<ExportExit>, GeneratorError> {
        let buf = self.markov.bytes();
        let mut exits = Vec::with_capacity(view.num_exits as usize);
        for i in 0..view.num_exits as usize {
            let off = view.exits_start + i * EXIT_SIZE;
            let node_offset = read_i64(buf, off)?;
            let cumulative = read_i32(buf, off + 8)? as i64;
            exits.push(ExportExit { node_offset, cumulative });
        }
        Ok(exits)
    }

    fn start_exits(&self) -> Result<Vec<ExportExit>, GeneratorError> {
        let buf = self.start.bytes();
        let num = read_i32(buf, 0)?;
        if num < 0 {
            return Err(GeneratorError::Corrupt("startdb num_start_states is negative"));
        }
        let mut exits = Vec::with_capacity(num as usize);
        for i in 0..num as usize {
            let off = 4 + i * EXIT_SIZE;
            let node_offset = read_i64(buf, off)?;
            let cumulative = read_i32(buf, off + 8)? as i64;
            exits.push(ExportExit { node_offset, cumulative });
        }
        Ok(exits)
    }

    /// Draws `r` uniformly over `[0, total]` (spec.md §7's adopted
    /// convention (b)) and binary-searches for the first exit whose
    /// cumulative count is `>= r`.
    fn sample_weighted<S: SampleSource>(
        exits: &[ExportExit],
        rng: &mut S,
    ) -> Result<i64, GeneratorError> {
        if exits.is_empty() {
            return Err(GeneratorError::Corrupt("node has no exits to sample from"));
        }
        let total = exits[exits.len() - 1].cumulative;
        let bound = u32::try_from(total.saturating_add(1))
            .map_err(|_| GeneratorError::Corrupt("cumulative exit count overflowed u32"))?;
        let r = i64::from(rng.next_below(bound));
        let idx = exits.partition_point(|e| e.cumulative < r).min(exits.len() - 1);
        Ok(exits[idx].node_offset)
    }

    /// Produces one generated sentence: samples a weighted start node,
    /// emits both its words, then repeatedly samples a weighted exit and
    /// emits only the newest trailing word until the current node is
    /// terminal (last word offset `-1`). The NULL-word sentinel is never
    /// emitted — no word, no separator — matching the reference
    /// generator's `if (node->strings[i] != -1)` guard around each word.
    pub fn generate_one<S: SampleSource>(&self, rng: &mut S) -> Result<String, GeneratorError> {
        let start_exits = self.start_exits()?;
        if start_exits.is_empty() {
            return Err(GeneratorError::NoStartStates);
        }

        let mut out = String::with_capacity(512);
        let mut offset = Self::sample_weighted(&start_exits, rng)?;
        let mut view = self.node_view(offset)?;
        self.push_word(&mut out, view.word_offsets[0]);
        self.push_word(&mut out, view.word_offsets[1]);

        while view.word_offsets[1] != -1 {
            let exits = self.node_exits(&view)?;
            offset = Self::sample_weighted(&exits, rng)?;
            view = self.node_view(offset)?;
            self.push_word(&mut out, view.word_offsets[1]);
        }

        Ok(out)
    }

    /// Appends the word at `offset`, followed by a single space, unless
    /// `offset` is the NULL-word sentinel (`-1`) — that word is skipped
    /// entirely, not printed as an empty word plus a stray space.
    fn push_word(&self, out: &mut String, offset: i64) {
        if offset == -1 {
            return;
        }
        out.push_str(&String::from_utf8_lossy(self.resolve_string(offset)));
        out.push(' ');
    }
}
