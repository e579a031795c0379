//! Recursive separator-based splitting.
//!
//! Three-step strategy:
//! 1. Pick the coarsest separator that occurs in the text
//! 2. Split on it, keeping each separator at the start of the following piece
//! 3. Merge small pieces up to the character budget, carrying an overlap
//!    window into the next chunk; pieces that are still too large recurse
//!    with the finer separators
//!
//! All lengths are counted in `char`s.

use std::collections::VecDeque;

/// Separators tried in order, coarsest first. The empty separator always
/// matches and splits into single characters.
pub const SEPARATORS: &[&str] = &["\n\n", "\n\n+", "\n", ". ", " ", ""];

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `text` into chunks of at most `chunk_size` characters.
pub fn split_recursive(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&'static str],
) -> Vec<String> {
    let mut chunks = Vec::new();
    let (separator, finer) = pick_separator(text, separators);

    let mut small: Vec<&str> = Vec::new();
    for piece in split_keeping_separator(text, separator) {
        if char_len(piece) < chunk_size {
            small.push(piece);
            continue;
        }

        if !small.is_empty() {
            chunks.extend(merge_pieces(&small, chunk_size, chunk_overlap));
            small.clear();
        }

        if finer.is_empty() {
            chunks.push(piece.to_string());
        } else {
            chunks.extend(split_recursive(piece, chunk_size, chunk_overlap, finer));
        }
    }

    if !small.is_empty() {
        chunks.extend(merge_pieces(&small, chunk_size, chunk_overlap));
    }

    chunks
}

/// Return the first separator present in `text` and the separators after it.
fn pick_separator<'a>(
    text: &str,
    separators: &'a [&'static str],
) -> (&'static str, &'a [&'static str]) {
    for (i, &sep) in separators.iter().enumerate() {
        if sep.is_empty() {
            return (sep, &[]);
        }
        if text.contains(sep) {
            return (sep, &separators[i + 1..]);
        }
    }
    (separators.last().copied().unwrap_or(""), &[])
}

/// Split at every occurrence of `separator`, attaching the separator to the
/// start of the piece that follows it. Empty pieces are dropped.
fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        pieces.push(&text[start..idx]);
        start = idx;
    }
    pieces.push(&text[start..]);
    pieces.retain(|p| !p.is_empty());
    pieces
}

/// Greedily join consecutive pieces into chunks no longer than `chunk_size`.
/// After emitting a chunk, pieces are dropped from the front until at most
/// `chunk_overlap` characters remain; those lead the next chunk.
fn merge_pieces(pieces: &[&str], chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<(&str, usize)> = VecDeque::new();
    let mut total = 0usize;

    for &piece in pieces {
        let len = char_len(piece);

        if total + len > chunk_size {
            if total > chunk_size {
                tracing::warn!(
                    "Created a chunk of size {total}, which is longer than the specified {chunk_size}"
                );
            }
            if !window.is_empty() {
                if let Some(chunk) = join_window(&window) {
                    chunks.push(chunk);
                }
                while total > chunk_overlap || (total + len > chunk_size && total > 0) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }
        }

        window.push_back((piece, len));
        total += len;
    }

    if let Some(chunk) = join_window(&window) {
        chunks.push(chunk);
    }

    chunks
}

fn join_window(window: &VecDeque<(&str, usize)>) -> Option<String> {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
