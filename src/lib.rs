//! # podiff
//!
//! Compare a Purchase Order against a Sales Order using an LLM.
//!
//! ## Why this crate?
//!
//! Checking a PO against the matching SO by hand means eyeballing two PDFs
//! field by field — totals, part numbers, delivery terms, payment terms.
//! This crate extracts the text from both documents, hands it to a
//! chat-completion model with a fixed comparison prompt, cleans the
//! response, and renders it both as display text and as a printable PDF
//! report with proper table layout.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PO.pdf + SO.pdf
//!  │
//!  ├─ 1. Extract  per-page text via lopdf (capped at 10 pages each)
//!  ├─ 2. Prompt   fixed three-section template, 10k-char prefix per doc
//!  ├─ 3. Complete one chat-completion call (temperature 0.2)
//!  ├─ 4. Dedupe   drop exact repeats of whole report sections
//!  └─ 5. Render   paginated A4 PDF with bordered, wrapped tables
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use podiff::{compare_files, ApiKey, CompareConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GROQ_API_KEY; a missing key fails here, not mid-pipeline.
//!     let config = CompareConfig::builder(ApiKey::from_env()?).build()?;
//!     let output = compare_files("po.pdf", "so.pdf", &config).await?;
//!     println!("{}", output.report);
//!     std::fs::write(podiff::REPORT_FILE_NAME, &output.pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `podiff` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! podiff = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod compare;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use compare::{compare, compare_files, compare_sync, compare_to_file};
pub use config::{ApiKey, CompareConfig, CompareConfigBuilder, API_KEY_ENV_VAR, DEFAULT_MODEL};
pub use error::{CompareError, ExtractError};
pub use output::{CompareOutput, CompareStats, DocumentSide, REPORT_FILE_NAME};
pub use progress::{CompareProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
