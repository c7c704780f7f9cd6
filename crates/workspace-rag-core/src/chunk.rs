//! Fixed-width, overlapping character-window chunker.
//!
//! Splits document text into [`ChunkSpan`]s of at most `width` characters.
//! Consecutive windows share `overlap` characters so that a sentence cut at
//! a window edge still appears whole in one of the two neighbours.
//!
//! # Algorithm
//!
//! 1. Start at character offset `i = 0`.
//! 2. Take the window `[i, min(n, i + width))`.
//! 3. Emit it unless its text is whitespace-only.
//! 4. Stop once the window reached the end of the text, otherwise continue
//!    at `i = end - overlap`.
//!
//! Because `overlap < width` is enforced, every step advances by at least
//! one character, so the loop terminates for any input.
//!
//! # Example
//!
//! ```rust
//! use workspace_rag_core::chunk::{chunk_text, ChunkerConfig};
//!
//! let cfg = ChunkerConfig::new(4, 1).unwrap();
//! let spans = chunk_text("abcdefg", &cfg);
//! let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
//! assert_eq!(texts, ["abcd", "defg"]);
//! ```

use crate::error::{CoreError, Result};
use crate::models::ChunkSpan;

/// Validated chunking parameters, both measured in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    width: usize,
    overlap: usize,
}

impl ChunkerConfig {
    /// Build a chunker configuration.
    ///
    /// Fails when `width` is zero. An `overlap` that is not strictly smaller
    /// than `width` is clamped to `width / 4`.
    pub fn new(width: usize, overlap: usize) -> Result<Self> {
        if width == 0 {
            return Err(CoreError::InvalidConfig(
                "chunk width must be > 0".to_string(),
            ));
        }
        let overlap = if overlap >= width { width / 4 } else { overlap };
        Ok(Self { width, overlap })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Effective overlap after clamping.
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

/// Split `text` into overlapping character windows.
///
/// Spans are returned in document order with non-decreasing `start`.
/// Whitespace-only windows are dropped, so a blank document yields no
/// spans at all.
pub fn chunk_text(text: &str, cfg: &ChunkerConfig) -> Vec<ChunkSpan> {
    // Byte offset of every character, plus the end of the string.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(text.len()))
        .collect();
    let n = bounds.len() - 1;

    let mut spans = Vec::new();
    let mut i = 0usize;
    while i < n {
        let j = n.min(i + cfg.width);
        let piece = &text[bounds[i]..bounds[j]];
        if !piece.trim().is_empty() {
            spans.push(ChunkSpan {
                start: i,
                end: j,
                text: piece.to_string(),
            });
        }
        if j >= n {
            break;
        }
        i = j - cfg.overlap;
    }
    spans
}
