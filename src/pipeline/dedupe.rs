//! Report deduplication: drop exact repeats of whole report sections.
//!
//! Free-text generation occasionally restates an entire section — the
//! summary twice, or the matching table again after the discrepancies.
//! This pass splits the report into blocks at section markers and keeps
//! only the first occurrence of each distinct block, in original order.
//! No semantic or partial-overlap deduplication is attempted: identity is
//! the exact trimmed block text, nothing fuzzier.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// A line starting with any of these begins a new block. The marker stays
/// at the head of its block rather than being consumed as a separator.
static RE_SECTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(🧠|✅|❌|📌|MATCHING|DISCREPANCIES|SUMMARY)").unwrap());

/// The result of a deduplication pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduped {
    /// Report text with duplicate blocks removed, blocks joined with `\n`.
    pub text: String,
    /// Number of blocks dropped.
    pub removed: usize,
}

/// Remove exact duplicate blocks from a report.
///
/// Blocks are delimited by lines beginning with a section marker; anything
/// before the first marker forms a leading block of its own. A block whose
/// trimmed content equals an earlier block's trimmed content is dropped.
///
/// The pass is idempotent: running it twice yields the same text as once.
pub fn dedupe_report(input: &str) -> Deduped {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut kept: Vec<&str> = Vec::new();
    let mut removed = 0usize;

    for block in split_blocks(input) {
        if seen.insert(block.trim()) {
            kept.push(block);
        } else {
            removed += 1;
        }
    }

    Deduped {
        text: kept.join("\n"),
        removed,
    }
}

/// Split the report into blocks at newlines immediately preceding a
/// section marker, returning borrowed slices of the input.
fn split_blocks(input: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut block_start = 0usize;
    let mut offset = 0usize;

    for line in input.split('\n') {
        // The first line always belongs to the leading block, marker or not.
        if offset > 0 && RE_SECTION_MARKER.is_match(line) {
            // The `\n` before this line is the block boundary; it is not
            // part of either block.
            blocks.push(&input[block_start..offset - 1]);
            block_start = offset;
        }
        offset += line.len() + 1;
    }
    blocks.push(&input[block_start..]);

    blocks
}
