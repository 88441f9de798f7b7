//! Result types returned by the comparison pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed file name the rendered report is offered under.
pub const REPORT_FILE_NAME: &str = "po_so_comparison.pdf";

/// Which of the two uploads an error or statistic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentSide {
    PurchaseOrder,
    SalesOrder,
}

impl fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSide::PurchaseOrder => write!(f, "purchase order"),
            DocumentSide::SalesOrder => write!(f, "sales order"),
        }
    }
}

/// The full result of a comparison run.
///
/// `report` is the deduplicated markdown-ish text for on-screen display;
/// `pdf` is the same report rendered as a printable document, ready to be
/// written to disk or offered as a download under [`REPORT_FILE_NAME`].
#[derive(Debug, Clone)]
pub struct CompareOutput {
    /// Cleaned report text (section markers and pipe tables intact).
    pub report: String,
    /// Rendered report as PDF bytes.
    pub pdf: Vec<u8>,
    /// Statistics about the run.
    pub stats: CompareStats,
}

/// Statistics about a comparison run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareStats {
    /// Pages read from the purchase order (after the page cap).
    pub po_pages: usize,
    /// Pages read from the sales order (after the page cap).
    pub so_pages: usize,
    /// Characters extracted from the purchase order (before truncation).
    pub po_chars: usize,
    /// Characters extracted from the sales order (before truncation).
    pub so_chars: usize,
    /// Characters in the assembled prompt.
    pub prompt_chars: usize,
    /// Duplicate report blocks removed by the deduplicator.
    pub duplicate_blocks_removed: usize,
    /// Prompt tokens reported by the provider (0 when the response carries
    /// no usage object).
    pub input_tokens: u64,
    /// Completion tokens reported by the provider.
    pub output_tokens: u64,
    /// Wall-clock time of the completion call.
    pub llm_duration_ms: u64,
    /// Wall-clock time of the whole pipeline.
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_side_display() {
        assert_eq!(DocumentSide::PurchaseOrder.to_string(), "purchase order");
        assert_eq!(DocumentSide::SalesOrder.to_string(), "sales order");
    }

    #[test]
    fn stats_serialise_round_trip() {
        let stats = CompareStats {
            po_pages: 2,
            so_pages: 1,
            duplicate_blocks_removed: 1,
            ..Default::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        let back: CompareStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back.po_pages, 2);
        assert_eq!(back.duplicate_blocks_removed, 1);
    }
}
