//! Eager (full-run) comparison entry points.
//!
//! One call runs the whole pipeline — extract, prompt, completion, dedupe,
//! render — sequentially and atomically from the caller's perspective.
//! Partial failure at any stage aborts the remaining stages and surfaces a
//! [`CompareError`] instead of a partial report; nothing is shared between
//! invocations, so a failed run leaves the caller free to retry.

use crate::config::CompareConfig;
use crate::error::CompareError;
use crate::output::{CompareOutput, CompareStats, DocumentSide};
use crate::pipeline::{dedupe, extract, llm, render};
use crate::progress::Stage;
use crate::prompts;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Compare a Purchase Order and a Sales Order, both given as PDF bytes.
///
/// This is the single entry point the presentation layer consumes: two
/// uploaded byte streams in, display text plus a downloadable PDF out.
///
/// # Errors
/// Fails fast at the first broken stage; see [`CompareError`] for the
/// taxonomy. Both documents must yield non-empty text before any network
/// call is made.
pub async fn compare(
    po_bytes: &[u8],
    so_bytes: &[u8],
    config: &CompareConfig,
) -> Result<CompareOutput, CompareError> {
    let total_start = Instant::now();
    if let Some(ref cb) = config.progress_callback {
        cb.on_compare_start();
    }

    // ── Step 1: Extract text from both documents ─────────────────────────
    stage_start(config, Stage::Extract);
    let max_pages = config.max_pages;
    let po_owned = po_bytes.to_vec();
    let so_owned = so_bytes.to_vec();

    let (po_result, so_result) = tokio::task::spawn_blocking(move || {
        let po = extract::extract_text(&po_owned, max_pages);
        let so = extract::extract_text(&so_owned, max_pages);
        (po, so)
    })
    .await
    .map_err(|e| CompareError::Internal(format!("Extraction task panicked: {e}")))?;

    let po = po_result.map_err(|source| CompareError::ExtractionFailed {
        side: DocumentSide::PurchaseOrder,
        source,
    })?;
    let so = so_result.map_err(|source| CompareError::ExtractionFailed {
        side: DocumentSide::SalesOrder,
        source,
    })?;

    if po.is_empty() {
        return Err(CompareError::EmptyDocument {
            side: DocumentSide::PurchaseOrder,
        });
    }
    if so.is_empty() {
        return Err(CompareError::EmptyDocument {
            side: DocumentSide::SalesOrder,
        });
    }
    info!(
        "Extracted {}/{} PO pages, {}/{} SO pages",
        po.pages_read, po.total_pages, so.pages_read, so.total_pages
    );
    stage_complete(config, Stage::Extract);

    // ── Step 2: Build the comparison prompt ──────────────────────────────
    stage_start(config, Stage::Prompt);
    let prompt = prompts::comparison_prompt(&po.text, &so.text, config.max_doc_chars);
    debug!("Prompt assembled: {} chars", prompt.chars().count());
    stage_complete(config, Stage::Prompt);

    // ── Step 3: One completion call ──────────────────────────────────────
    stage_start(config, Stage::Completion);
    let client = llm::CompletionClient::new(config)?;
    let llm_start = Instant::now();
    let completion = client.complete(&prompt).await?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;
    stage_complete(config, Stage::Completion);

    // ── Step 4: Deduplicate repeated report sections ─────────────────────
    stage_start(config, Stage::Dedupe);
    let deduped = dedupe::dedupe_report(&completion.content);
    if deduped.removed > 0 {
        info!("Removed {} duplicated report block(s)", deduped.removed);
    }
    stage_complete(config, Stage::Dedupe);

    // ── Step 5: Render the report PDF ────────────────────────────────────
    stage_start(config, Stage::Render);
    let report = deduped.text.clone();
    let pdf = tokio::task::spawn_blocking(move || render::render_report(&report))
        .await
        .map_err(|e| CompareError::Internal(format!("Render task panicked: {e}")))??;
    stage_complete(config, Stage::Render);

    // ── Step 6: Assemble output & stats ──────────────────────────────────
    let stats = CompareStats {
        po_pages: po.pages_read,
        so_pages: so.pages_read,
        po_chars: po.text.chars().count(),
        so_chars: so.text.chars().count(),
        prompt_chars: prompt.chars().count(),
        duplicate_blocks_removed: deduped.removed,
        input_tokens: completion.prompt_tokens,
        output_tokens: completion.completion_tokens,
        llm_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Comparison complete: {} report chars, {} PDF bytes, {}ms total",
        deduped.text.chars().count(),
        pdf.len(),
        stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_compare_complete(deduped.text.len());
    }

    Ok(CompareOutput {
        report: deduped.text,
        pdf,
        stats,
    })
}

/// Compare two PDFs given as file paths.
///
/// Validates existence and the `%PDF` magic before parsing, so a missing
/// or mislabelled file fails with a pointed message instead of a generic
/// parse error.
pub async fn compare_files(
    po_path: impl AsRef<Path>,
    so_path: impl AsRef<Path>,
    config: &CompareConfig,
) -> Result<CompareOutput, CompareError> {
    let po_bytes = read_pdf_file(po_path.as_ref()).await?;
    let so_bytes = read_pdf_file(so_path.as_ref()).await?;
    compare(&po_bytes, &so_bytes, config).await
}

/// Compare two PDF files and write the rendered report to `out_path`.
///
/// Uses an atomic write (temp file + rename) to prevent partial files.
pub async fn compare_to_file(
    po_path: impl AsRef<Path>,
    so_path: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
    config: &CompareConfig,
) -> Result<CompareOutput, CompareError> {
    let output = compare_files(po_path, so_path, config).await?;
    let path = out_path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CompareError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &output.pdf)
        .await
        .map_err(|e| CompareError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| CompareError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output)
}

/// Synchronous wrapper around [`compare`].
///
/// Creates a temporary tokio runtime internally.
pub fn compare_sync(
    po_bytes: &[u8],
    so_bytes: &[u8],
    config: &CompareConfig,
) -> Result<CompareOutput, CompareError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CompareError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(compare(po_bytes, so_bytes, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Read a PDF file, mapping missing files and wrong magic bytes to
/// pointed errors.
async fn read_pdf_file(path: &Path) -> Result<Vec<u8>, CompareError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|_| CompareError::FileNotFound {
            path: path.to_path_buf(),
        })?;

    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(CompareError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    Ok(bytes)
}

fn stage_start(config: &CompareConfig, stage: Stage) {
    debug!("Stage start: {stage}");
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
}

fn stage_complete(config: &CompareConfig, stage: Stage) {
    debug!("Stage complete: {stage}");
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;

    fn config() -> CompareConfig {
        CompareConfig::builder(ApiKey::new("test-key").unwrap())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let result = compare_files(
            "/definitely/not/a/real/po.pdf",
            "/definitely/not/a/real/so.pdf",
            &config(),
        )
        .await;
        assert!(matches!(result, Err(CompareError::FileNotFound { .. })));
    }

    #[tokio::test]
    async fn non_pdf_file_is_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        tokio::fs::write(&path, b"plain text, no magic")
            .await
            .unwrap();

        let result = read_pdf_file(&path).await;
        match result {
            Err(CompareError::NotAPdf { magic, .. }) => assert_eq!(&magic, b"plai"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn corrupt_po_bytes_fail_before_any_network_call() {
        // No server is reachable from this test; reaching the completion
        // stage would surface RequestFailed, not ExtractionFailed.
        let result = compare(b"garbage", b"garbage", &config()).await;
        match result {
            Err(CompareError::ExtractionFailed { side, .. }) => {
                assert_eq!(side, DocumentSide::PurchaseOrder);
            }
            other => panic!("expected ExtractionFailed, got {other:?}"),
        }
    }
}
