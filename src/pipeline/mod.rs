//! Pipeline stages for PO/SO comparison.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the extraction backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ prompt ──▶ llm ──▶ dedupe ──▶ render
//! (lopdf)   (template)  (HTTP)   (blocks)   (PDF)
//! ```
//!
//! 1. [`extract`] — per-page text extraction with a page cap; runs in
//!    `spawn_blocking` because PDF parsing is CPU-bound
//! 2. prompt — assembled in [`crate::prompts`], pure string work
//! 3. [`llm`]     — the single chat-completion call; the only stage with
//!    network I/O
//! 4. [`dedupe`]  — drop exact repeats of whole report sections
//! 5. [`render`]  — lay the cleaned report out as a paginated PDF

pub mod dedupe;
pub mod extract;
pub mod llm;
pub mod render;
