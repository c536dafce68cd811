//! Paragraph-boundary text chunker.
//!
//! Splits extracted document text into [`Chunk`]s no longer than a
//! `max_tokens` budget (converted to characters at 4 chars/token). Splits
//! happen on blank lines first; a paragraph that alone exceeds the budget is
//! hard-split at the last newline or space before the limit.
//!
//! ```rust
//! use docsift_core::chunk::chunk_text;
//!
//! let chunks = chunk_text("doc-1", "Hello world.\n\nSecond paragraph.", 700);
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].chunk_index, 0);
//! ```

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::Chunk;

const CHARS_PER_TOKEN: usize = 4;

/// Split `text` into chunks with contiguous indices starting at 0.
///
/// At least one chunk is always returned, even for empty text.
pub fn chunk_text(document_id: &str, text: &str, max_tokens: usize) -> Vec<Chunk> {
    let max_chars = (max_tokens * CHARS_PER_TOKEN).max(1);
    let mut chunks = Vec::new();
    let mut buf = String::new();

    for para in split_paragraphs(text) {
        let would_be = if buf.is_empty() {
            para.len()
        } else {
            buf.len() + 2 + para.len()
        };

        if would_be > max_chars && !buf.is_empty() {
            push_chunk(&mut chunks, document_id, &buf);
            buf.clear();
        }

        if para.len() > max_chars {
            let mut remaining = para;
            while !remaining.is_empty() {
                let at = split_point(remaining, max_chars);
                let piece = remaining[..at].trim();
                if !piece.is_empty() {
                    push_chunk(&mut chunks, document_id, piece);
                }
                remaining = &remaining[at..];
            }
        } else {
            if !buf.is_empty() {
                buf.push_str("\n\n");
            }
            buf.push_str(para);
        }
    }

    if !buf.is_empty() {
        push_chunk(&mut chunks, document_id, &buf);
    }
    if chunks.is_empty() {
        push_chunk(&mut chunks, document_id, text.trim());
    }
    chunks
}

fn split_paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n")
        .flat_map(|p| p.split("\r\n\r\n"))
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

/// Byte offset to cut `s` at: the last newline/space within `max_chars`,
/// else `max_chars` itself, always on a char boundary and never zero.
fn split_point(s: &str, max_chars: usize) -> usize {
    if s.len() <= max_chars {
        return s.len();
    }
    let mut limit = max_chars;
    while limit > 0 && !s.is_char_boundary(limit) {
        limit -= 1;
    }
    let at = s[..limit]
        .rfind(['\n', ' '])
        .map(|pos| pos + 1)
        .unwrap_or(limit);
    if at == 0 {
        s.char_indices().nth(1).map(|(i, _)| i).unwrap_or(s.len())
    } else {
        at
    }
}

fn push_chunk(chunks: &mut Vec<Chunk>, document_id: &str, text: &str) {
    let hash = format!("{:x}", Sha256::digest(text.as_bytes()));
    chunks.push(Chunk {
        id: Uuid::new_v4().to_string(),
        document_id: document_id.to_string(),
        content: text.to_string(),
        chunk_index: chunks.len(),
        hash,
    });
}
