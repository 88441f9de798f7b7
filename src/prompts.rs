//! Prompts for the PO/SO comparison request.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the requested report shape
//!    (sections, table columns, summary length) requires editing exactly
//!    one place.
//!
//! 2. **Testability** — unit tests can inspect the assembled prompt
//!    directly without a live completion call, making template regressions
//!    easy to catch.
//!
//! The template is the sole mechanism steering the model's output shape;
//! nothing downstream validates that the response actually follows it.

/// System role sent with every completion request.
///
/// Used when `CompareConfig::system_prompt` is `None`.
pub const SYSTEM_PROMPT: &str =
    "You are a senior procurement analyst. Create comparison tables for document alignment.";

/// Assemble the user prompt embedding both extracted texts.
///
/// Each text is truncated to an exact prefix of `max_chars` characters
/// before insertion. The truncation is silent and makes no attempt to cut
/// at a semantic boundary.
pub fn comparison_prompt(po_text: &str, so_text: &str, max_chars: usize) -> String {
    format!(
        r#"You are a procurement analyst. Compare a Purchase Order (PO) and a Sales Order (SO) and produce a structured report with:

✅ MATCHING INFORMATION
Tabulate fields that are present and identical in both documents:
| Field | PO-1 | SO-1 |

❌ DISCREPANCIES IDENTIFIED
Tabulate fields that differ or are missing:
| Category | PO-1 | SO-1 | Discrepancy Explanation |
|----------|------|------|--------------------------|

📌 SUMMARY
Provide a concise summary (no more than 150 words) in paragraph format. Summarize key risks, actionable suggestions, and any important confirmations required between the buyer and vendor. Do not use bullet points or headings.

PO TEXT:
{}

SO TEXT:
{}
"#,
        truncate_chars(po_text, max_chars),
        truncate_chars(so_text, max_chars),
    )
}

/// Exact prefix truncation to `max` characters, on a char boundary.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_shorter_than_budget_is_identity() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn truncate_is_exact_prefix() {
        let text = "x".repeat(15_000);
        let cut = truncate_chars(&text, 10_000);
        assert_eq!(cut.chars().count(), 10_000);
        assert!(text.starts_with(cut));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        // Multibyte chars must not be split mid-encoding.
        let text = "é".repeat(20);
        let cut = truncate_chars(&text, 10);
        assert_eq!(cut.chars().count(), 10);
        assert_eq!(cut, "é".repeat(10));
    }

    #[test]
    fn prompt_embeds_truncated_texts() {
        let po = "P".repeat(12_000);
        let so = "S".repeat(50);
        let prompt = comparison_prompt(&po, &so, 10_000);

        assert!(prompt.contains(&"P".repeat(10_000)));
        assert!(!prompt.contains(&"P".repeat(10_001)));
        assert!(prompt.contains(&"S".repeat(50)));
    }

    #[test]
    fn prompt_requests_all_three_sections() {
        let prompt = comparison_prompt("po", "so", 10_000);
        assert!(prompt.contains("MATCHING INFORMATION"));
        assert!(prompt.contains("DISCREPANCIES IDENTIFIED"));
        assert!(prompt.contains("SUMMARY"));
        assert!(prompt.contains("no more than 150 words"));
        assert!(prompt.contains("Do not use bullet points"));
    }
}
