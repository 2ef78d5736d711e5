//! Adapts [`crate::engine::Engine`] to a line-oriented stdin stream.
//!
//! One word per line; a blank line closes the current sentence. Mirrors
//! the reference implementation's `fgets`-based reader: an overlong line
//! is truncated (not rejected) with a warning, and a sentence that grows
//! past the word cap is flushed early with a warning rather than dropped.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::engine::Engine;
use crate::intern::Interned;

/// Reference implementation's `fgets` buffer size was 8192 bytes including
/// the trailing NUL; the largest usable line content is therefore 8191.
const MAX_LINE_BYTES: usize = 8191;
/// Reference implementation flushes the sentence buffer early at exactly
/// this many words (`markov.c`'s `length == 8192` branch).
const MAX_SENTENCE_WORDS: usize = 8192;
const PROGRESS_INTERVAL: usize = 100_000;

/// Summary counters for one [`run`] call, logged by the binary's `main`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrainerSummary {
    pub lines_read: usize,
    pub sentences_trained: usize,
}

/// Reads `reader` line-by-line, folding each sentence into `engine`, until
/// EOF or until `shutdown` is observed set between sentences (the
/// cooperative `SIGINT` handshake: the signal handler only flips the
/// flag, this loop is what actually stops).
pub fn run<R: BufRead>(
    engine: &mut Engine,
    mut reader: R,
    shutdown: &AtomicBool,
) -> std::io::Result<TrainerSummary> {
    let mut sentence: Vec<Interned> = Vec::new();
    let mut line_buf: Vec<u8> = Vec::new();
    let mut summary = TrainerSummary::default();

    loop {
        line_buf.clear();
        let read = reader.read_until(b'\n', &mut line_buf)?;
        if read == 0 {
            break;
        }
        summary.lines_read += 1;
        if summary.lines_read % PROGRESS_INTERVAL == 0 {
            info!(lines = summary.lines_read, "training progress");
        }

        if line_buf.last() == Some(&b'\n') {
            line_buf.pop();
        }
        if line_buf.last() == Some(&b'\r') {
            line_buf.pop();
        }

        if line_buf.len() > MAX_LINE_BYTES {
            warn!(len = line_buf.len(), max = MAX_LINE_BYTES, "input line too long, truncating");
            line_buf.truncate(MAX_LINE_BYTES);
        }

        if line_buf.is_empty() {
            if !sentence.is_empty() {
                engine.train_sentence(&sentence);
                summary.sentences_trained += 1;
                sentence.clear();
            }
            if shutdown.load(Ordering::SeqCst) {
                break;
            }
            continue;
        }

        sentence.push(engine.intern(&line_buf));

        if sentence.len() >= MAX_SENTENCE_WORDS {
            warn!(words = sentence.len(), "sentence too long, training early");
            engine.train_sentence(&sentence);
            summary.sentences_trained += 1;
            sentence.clear();
        }
    }

    if !sentence.is_empty() {
        engine.train_sentence(&sentence);
        summary.sentences_trained += 1;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn train(input: &str) -> (Engine, TrainerSummary) {
        let mut engine = Engine::new();
        let shutdown = AtomicBool::new(false);
        let summary = run(&mut engine, Cursor::new(input.as_bytes()), &shutdown).unwrap();
        (engine, summary)
    }

    #[test]
    fn blank_line_ends_a_sentence() {
        let (engine, summary) = train("the\ncat\nsat\n\n");
        assert_eq!(summary.sentences_trained, 1);
        assert_eq!(engine.nodes.len(), 3);
    }

    #[test]
    fn trailing_sentence_without_blank_line_is_still_trained() {
        let (engine, summary) = train("the\ncat\nsat");
        assert_eq!(summary.sentences_trained, 1);
        assert_eq!(engine.nodes.len(), 3);
    }

    #[test]
    fn multiple_sentences_accumulate() {
        let (engine, summary) = train("the\ncat\nsat\n\na\nb\n\n");
        assert_eq!(summary.sentences_trained, 2);
        assert_eq!(engine.starts.len(), 2);
    }

    #[test]
    fn empty_input_trains_nothing() {
        let (engine, summary) = train("");
        assert_eq!(summary.sentences_trained, 0);
        assert_eq!(engine.nodes.len(), 0);
    }

    #[test]
    fn overlong_line_is_truncated_not_rejected() {
        let long_word = "x".repeat(MAX_LINE_BYTES + 500);
        let input = format!("{long_word}\n\n");
        let (engine, summary) = train(&input);
        assert_eq!(summary.sentences_trained, 1);
        // One-word sentence => one padded terminal node.
        assert_eq!(engine.nodes.len(), 1);
    }

    #[test]
    fn overlong_sentence_forces_early_train() {
        let mut input = String::new();
        for i in 0..(MAX_SENTENCE_WORDS + 10) {
            input.push_str(&format!("w{i}\n"));
        }
        let (_, summary) = train(&input);
        // No blank line at all: the cap forces one early flush, then the
        // trailing remainder flushes once more at EOF.
        assert_eq!(summary.sentences_trained, 2);
    }

    #[test]
    fn shutdown_flag_stops_after_current_sentence() {
        let mut engine = Engine::new();
        let shutdown = AtomicBool::new(false);
        shutdown.store(true, Ordering::SeqCst);
        let input = "the\ncat\nsat\n\na\nb\n\n";
        let summary = run(&mut engine, Cursor::new(input.as_bytes()), &shutdown).unwrap();
        // Flag is already set, so only the first sentence is trained
        // before the loop observes it at the first blank line.
        assert_eq!(summary.sentences_trained, 1);
    }
}
