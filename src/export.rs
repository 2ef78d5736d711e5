//! Two-pass binary exporter.
//!
//! Pass 1 walks every node, writing its header and reserving space for its
//! exits, recording the node's own file offset along the way (so later
//! passes — and the start table — can reference it). Pass 2 revisits every
//! node and fills in its reserved exit records with the *target's* offset
//! and a running cumulative count, which is what lets the generator later
//! binary-search the exit list by weighted frequency.
//!
//! All integers are written little-endian with no inter-field padding
//! (4-byte struct alignment, matching the reference format exactly), by
//! hand-packing bytes rather than overlaying a `#[repr(C)]` struct — this
//! sidesteps any host alignment/padding assumptions entirely.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::info;

use crate::engine::Engine;
use crate::error::ExportError;
use crate::intern::StringPool;
use crate::node::Word;

const NODE_HEADER_SIZE: i64 = 20; // strings[2]: i64 x2, num_exits: i32
const EXIT_SIZE: i64 = 12; // node offset: i64, count: i32

fn word_offset(strings: &StringPool, word: Word) -> i64 {
    word.map(|w| strings.offset_of(w)).unwrap_or(-1)
}

fn open(path: &Path) -> Result<File, ExportError> {
    File::create(path).map_err(|source| ExportError::Create { path: path.to_path_buf(), source })
}

pub fn export(engine: &mut Engine, dir: &Path) -> Result<(), ExportError> {
    let stringdb_path = dir.join("stringdb");
    info!(path = %stringdb_path.display(), "writing string pool");
    {
        let file = open(&stringdb_path)?;
        let mut writer = BufWriter::new(file);
        engine
            .strings
            .export(&mut writer)
            .map_err(|source| ExportError::Write { path: stringdb_path.clone(), source })?;
        writer
            .flush()
            .map_err(|source| ExportError::Write { path: stringdb_path.clone(), source })?;
    }

    let markovdb_path = dir.join("markovdb");
    info!(path = %markovdb_path.display(), "writing node table");
    let mut markov_file = open(&markovdb_path)?;
    run_export_passes(engine, &mut markov_file, &markovdb_path)?;

    let startdb_path = dir.join("startdb");
    info!(path = %startdb_path.display(), "writing start table");
    let file = open(&startdb_path)?;
    let mut writer = BufWriter::new(file);
    export_start(engine, &mut writer, &startdb_path)?;
    writer
        .flush()
        .map_err(|source| ExportError::Write { path: startdb_path.clone(), source })?;

    Ok(())
}

fn run_export_passes(engine: &mut Engine, file: &mut File, path: &Path) -> Result<(), ExportError> {
    // Pass 1: headers + reserved exit space, recording each node's offset.
    for node in engine.nodes.iter() {
        let node_ref = unsafe { node.as_ref() };
        let offset = file
            .stream_position()
            .map_err(|source| ExportError::Seek { path: path.to_path_buf(), source })?
            as i64;
        node_ref.export_offset.set(offset);

        let mut header = [0u8; NODE_HEADER_SIZE as usize];
        header[0..8].copy_from_slice(&word_offset(&engine.strings, node_ref.words[0]).to_le_bytes());
        header[8..16].copy_from_slice(&word_offset(&engine.strings, node_ref.words[1]).to_le_bytes());
        header[16..20].copy_from_slice(&(node_ref.num_exits as i32).to_le_bytes());
        file.write_all(&header)
            .map_err(|source| ExportError::Write { path: path.to_path_buf(), source })?;

        let reserve = node_ref.num_exits as i64 * EXIT_SIZE;
        file.seek(SeekFrom::Current(reserve))
            .map_err(|source| ExportError::Seek { path: path.to_path_buf(), source })?;
    }

    // Pass 2: fill in each node's exits with cumulative counts.
    for node in engine.nodes.iter() {
        let node_ref = unsafe { node.as_ref() };
        if node_ref.num_exits == 0 {
            continue;
        }
        file.seek(SeekFrom::Start((node_ref.export_offset.get() + NODE_HEADER_SIZE) as u64))
            .map_err(|source| ExportError::Seek { path: path.to_path_buf(), source })?;

        let mut total: i64 = 0;
        let mut buf = Vec::with_capacity(node_ref.num_exits as usize * EXIT_SIZE as usize);
        for (target, count) in node_ref.iter_exits() {
            total += count as i64;
            let target_ref = unsafe { target.as_ref() };
            buf.extend_from_slice(&target_ref.export_offset.get().to_le_bytes());
            buf.extend_from_slice(&(total as i32).to_le_bytes());
        }
        file.write_all(&buf)
            .map_err(|source| ExportError::Write { path: path.to_path_buf(), source })?;
    }

    Ok(())
}

fn export_start<W: Write>(engine: &mut Engine, writer: &mut W, path: &Path) -> Result<(), ExportError> {
    let map_err = |source| ExportError::Write { path: path.to_path_buf(), source };

    writer
        .write_all(&(engine.starts.len() as i32).to_le_bytes())
        .map_err(map_err)?;

    let mut total: i64 = 0;
    for (target, count) in engine.starts.iter() {
        total += count as i64;
        let target_ref = unsafe { target.as_ref() };
        writer
            .write_all(&target_ref.export_offset.get().to_le_bytes())
            .map_err(map_err)?;
        writer
            .write_all(&(total as i32).to_le_bytes())
            .map_err(map_err)?;
    }
    Ok(())
}
