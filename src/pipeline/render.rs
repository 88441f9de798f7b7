//! Table-aware PDF rendering: report text → paginated A4 document.
//!
//! The report is plain paragraphs interleaved with pipe-delimited markdown
//! tables. Layout is a two-state machine over input lines:
//!
//! * **Prose** — the line is wrapped across the full usable width and laid
//!   out left-aligned, one prose line height per wrapped line.
//! * **Table** — entered by a line that starts and ends with a pipe. The
//!   first row of a run fixes the column count and divides the usable
//!   width evenly; those widths hold for every subsequent row of the run.
//!   Leaving table mode clears them.
//!
//! Markdown separator rows (dashes, pipes, colons, spaces only) are
//! discarded before either state applies and never produce a visual row.
//!
//! A later row whose cell count differs from the run's first row is padded
//! with empty cells or truncated to the established column count.
//!
//! Everything is set in Helvetica 10 pt with WinAnsi encoding. Section
//! marker glyphs are transliterated to ASCII tags; any remaining
//! non-encodable character degrades to `?`.

use crate::error::CompareError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Cursor;
use tracing::debug;

// ── Page geometry (points) ───────────────────────────────────────────────

const PAGE_WIDTH: f32 = 595.28; // A4 portrait
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 40.0;
const FONT_SIZE: f32 = 10.0;
const PROSE_LINE_HEIGHT: f32 = 16.0;
const TABLE_LINE_HEIGHT: f32 = 14.0;
/// Horizontal inset between a cell border and its text, each side.
const CELL_INSET: f32 = 2.0;
/// Distance from a line's bottom edge up to its text baseline.
const BASELINE_NUDGE: f32 = 3.5;

const TOP_Y: f32 = PAGE_HEIGHT - MARGIN;
const USABLE_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

/// Layout state of the line scanner.
enum LayoutState {
    Prose,
    /// Inside a table run; widths were fixed by the run's first row.
    Table { col_widths: Vec<f32> },
}

/// Render a report into a complete PDF byte stream.
pub fn render_report(report: &str) -> Result<Vec<u8>, CompareError> {
    let mut composer = PageComposer::new();
    let mut state = LayoutState::Prose;

    for raw_line in report.lines() {
        let line = to_win_ansi(raw_line);

        // Separator rows vanish without touching the current state, so a
        // `| --- | --- |` line can sit inside a run without restarting it.
        if is_separator_row(&line) {
            continue;
        }

        if is_table_row(&line) {
            let cells = parse_cells(&line);
            // The first row of a run fixes the widths for the whole run.
            if let LayoutState::Prose = state {
                state = LayoutState::Table {
                    col_widths: split_columns(cells.len()),
                };
            }
            if let LayoutState::Table { ref col_widths } = state {
                composer.draw_table_row(&cells, col_widths);
            }
        } else {
            state = LayoutState::Prose;
            composer.draw_paragraph(&line);
        }
    }

    composer.into_pdf()
}

/// Divide the usable width evenly among `count` columns.
fn split_columns(count: usize) -> Vec<f32> {
    let count = count.max(1);
    vec![USABLE_WIDTH / count as f32; count]
}

/// A table row starts and ends with a pipe; interior content is optional.
fn is_table_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|')
}

/// A markdown separator row: nothing but dashes, pipes, alignment colons,
/// and spaces. Blank lines are prose, not separators.
fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c == '-' || c == '|' || c == ':' || c == ' ')
}

/// Split a table row into trimmed cell texts.
fn parse_cells(line: &str) -> Vec<String> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|c| c.trim().to_string())
        .collect()
}

// ── Page composition ─────────────────────────────────────────────────────

/// Accumulates content-stream operations page by page, tracking a vertical
/// cursor and breaking to a fresh page when a drawing would cross the
/// bottom margin.
struct PageComposer {
    finished: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    cursor_y: f32,
}

impl PageComposer {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            ops: page_preamble(),
            cursor_y: TOP_Y,
        }
    }

    /// Break to a new page if `needed` points of height would cross the
    /// bottom margin. A fresh page never breaks again, so content taller
    /// than a whole page renders clipped instead of looping.
    fn ensure_room(&mut self, needed: f32) {
        if self.cursor_y - needed < MARGIN && self.cursor_y < TOP_Y {
            self.break_page();
        }
    }

    fn break_page(&mut self) {
        let ops = std::mem::replace(&mut self.ops, page_preamble());
        self.finished.push(ops);
        self.cursor_y = TOP_Y;
    }

    /// Lay out one prose line, wrapped across the full usable width.
    ///
    /// An empty line wraps to a single empty piece and still advances the
    /// cursor, so blank report lines keep their vertical rhythm.
    fn draw_paragraph(&mut self, line: &str) {
        for piece in word_wrap(line, USABLE_WIDTH, FONT_SIZE) {
            self.ensure_room(PROSE_LINE_HEIGHT);
            let baseline = self.cursor_y - PROSE_LINE_HEIGHT + BASELINE_NUDGE;
            self.draw_text(MARGIN, baseline, &piece);
            self.cursor_y -= PROSE_LINE_HEIGHT;
        }
    }

    /// Lay out one table row: every cell is a bordered box of the row's
    /// uniform height, which is the tallest cell's wrapped line count
    /// times the table line height.
    fn draw_table_row(&mut self, cells: &[String], col_widths: &[f32]) {
        let (wrapped, row_lines) = wrap_cells(cells, col_widths);
        let row_height = row_lines as f32 * TABLE_LINE_HEIGHT;

        self.ensure_room(row_height);
        let y_top = self.cursor_y;

        let mut x = MARGIN;
        for (lines, &width) in wrapped.iter().zip(col_widths) {
            self.draw_rect(x, y_top - row_height, width, row_height);
            for (j, line) in lines.iter().enumerate() {
                let baseline = y_top - (j as f32 + 1.0) * TABLE_LINE_HEIGHT + BASELINE_NUDGE;
                self.draw_text(x + CELL_INSET, baseline, line);
            }
            x += width;
        }

        self.cursor_y = y_top - row_height;
    }

    fn draw_text(&mut self, x: f32, baseline_y: f32, text: &str) {
        if text.is_empty() {
            return;
        }
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]));
        self.ops
            .push(Operation::new("Td", vec![x.into(), baseline_y.into()]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(text))],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.ops.push(Operation::new(
            "re",
            vec![x.into(), y.into(), width.into(), height.into()],
        ));
        self.ops.push(Operation::new("S", vec![]));
    }

    /// Assemble the accumulated pages into a finished PDF.
    fn into_pdf(mut self) -> Result<Vec<u8>, CompareError> {
        self.finished.push(self.ops);
        let page_count = self.finished.len();

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(page_count);
        for operations in self.finished {
            let content = Content { operations };
            let encoded = content.encode().map_err(|e| CompareError::RenderFailed {
                detail: format!("content stream encoding failed: {e}"),
            })?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    PAGE_WIDTH.into(),
                    PAGE_HEIGHT.into(),
                ],
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc.compress();
        let mut buf = Vec::new();
        doc.save_to(&mut Cursor::new(&mut buf))
            .map_err(|e| CompareError::RenderFailed {
                detail: format!("PDF serialisation failed: {e}"),
            })?;

        debug!("Rendered report PDF: {} pages, {} bytes", page_count, buf.len());
        Ok(buf)
    }
}

/// Operations every page starts with.
fn page_preamble() -> Vec<Operation> {
    vec![Operation::new("w", vec![0.5_f32.into()])]
}

/// Word-wrap every cell of a row against its column width and return the
/// row's uniform line count (the tallest cell, minimum 1).
///
/// Cell texts are padded with empty cells or truncated to the column
/// count, so a malformed row can never misalign against the run's widths.
fn wrap_cells(cells: &[String], col_widths: &[f32]) -> (Vec<Vec<String>>, usize) {
    let wrapped: Vec<Vec<String>> = col_widths
        .iter()
        .enumerate()
        .map(|(i, &width)| {
            let text = cells.get(i).map(String::as_str).unwrap_or("");
            word_wrap(text, width - 2.0 * CELL_INSET, FONT_SIZE)
        })
        .collect();

    let row_lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
    (wrapped, row_lines)
}

// ── Text measurement & wrapping ──────────────────────────────────────────

/// Helvetica AFM advance widths for ASCII 0x20–0x7E, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Fallback advance width for characters outside the ASCII table.
const DEFAULT_CHAR_WIDTH: u16 = 556;

/// Rendered width of `text` at `font_size`, in points.
fn text_width(text: &str, font_size: f32) -> f32 {
    let milli: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (0x20..=0x7E).contains(&code) {
                u32::from(HELVETICA_WIDTHS[(code - 0x20) as usize])
            } else {
                u32::from(DEFAULT_CHAR_WIDTH)
            }
        })
        .sum();
    milli as f32 * font_size / 1000.0
}

/// Word-wrap `text` to fit within `max_width` points.
///
/// Words wider than `max_width` are broken at character boundaries. An
/// empty input yields a single empty line so the caller still advances.
fn word_wrap(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let space_width = text_width(" ", font_size);
    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width: f32 = 0.0;

    for word in text.split_whitespace() {
        let word_width = text_width(word, font_size);

        // Break overlong words at character boundaries
        if word_width > max_width {
            if !current_line.is_empty() {
                lines.push(current_line);
            }
            let mut chunk = String::new();
            let mut chunk_width: f32 = 0.0;
            for c in word.chars() {
                let char_width = text_width(c.encode_utf8(&mut [0; 4]), font_size);
                if chunk_width + char_width > max_width && !chunk.is_empty() {
                    lines.push(chunk);
                    chunk = String::new();
                    chunk_width = 0.0;
                }
                chunk.push(c);
                chunk_width += char_width;
            }
            current_line = chunk;
            current_width = chunk_width;
            continue;
        }

        if current_line.is_empty() {
            current_line = word.to_string();
            current_width = word_width;
        } else if current_width + space_width + word_width <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
            current_width += space_width + word_width;
        } else {
            lines.push(current_line);
            current_line = word.to_string();
            current_width = word_width;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

// ── WinAnsi transliteration ──────────────────────────────────────────────

/// Replace section-marker glyphs with ASCII tags and degrade anything else
/// WinAnsi cannot represent to `?`. The on-screen report keeps the glyphs;
/// only the PDF needs this.
fn to_win_ansi(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        match c {
            '✅' => out.push_str("[OK]"),
            '❌' => out.push_str("[X]"),
            '📌' => out.push_str("[PIN]"),
            '🧠' => out.push_str("[AI]"),
            c if (c as u32) < 0x20 && c != '\t' => {}
            c if (c as u32) <= 0xFF => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Encode sanitised text as WinAnsi bytes for a literal string operand.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_all_text(pdf: &[u8]) -> String {
        let doc = Document::load_mem(pdf).expect("generated PDF should parse");
        let page_nums: Vec<u32> = doc.get_pages().keys().copied().collect();
        doc.extract_text(&page_nums).expect("text extraction")
    }

    // ── Line classification ──────────────────────────────────────────────

    #[test]
    fn table_row_detection() {
        assert!(is_table_row("| a | b |"));
        assert!(is_table_row("  | a |  "));
        assert!(is_table_row("||"));
        assert!(!is_table_row("plain text"));
        assert!(!is_table_row("| unterminated"));
        assert!(!is_table_row(""));
    }

    #[test]
    fn separator_row_detection() {
        assert!(is_separator_row("|---|---|"));
        assert!(is_separator_row("| --- | --- |"));
        assert!(is_separator_row("|:---|---:|"));
        assert!(is_separator_row("----"));
        assert!(!is_separator_row(""));
        assert!(!is_separator_row("| a | b |"));
    }

    #[test]
    fn separator_wins_over_table_row() {
        // `|-|-|` matches both patterns; it must be discarded, not drawn.
        let line = "|-|-|";
        assert!(is_table_row(line));
        assert!(is_separator_row(line));
    }

    #[test]
    fn cell_parsing() {
        assert_eq!(parse_cells("| a | b |"), vec!["a", "b"]);
        assert_eq!(parse_cells("|Field|PO|"), vec!["Field", "PO"]);
        assert_eq!(parse_cells("||"), vec![""]);
        assert_eq!(parse_cells("| spaced   cell |x|"), vec!["spaced   cell", "x"]);
    }

    #[test]
    fn columns_split_evenly() {
        let widths = split_columns(4);
        assert_eq!(widths.len(), 4);
        let total: f32 = widths.iter().sum();
        assert!((total - USABLE_WIDTH).abs() < 0.01);
        assert!((widths[0] - widths[3]).abs() < f32::EPSILON);
    }

    // ── Wrapping & row height ────────────────────────────────────────────

    #[test]
    fn word_wrap_basic() {
        let lines = word_wrap("alpha beta gamma delta", 60.0, 10.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 10.0) <= 60.0 + 0.01);
        }
    }

    #[test]
    fn word_wrap_empty_is_one_blank_line() {
        assert_eq!(word_wrap("", 100.0, 10.0), vec![String::new()]);
    }

    #[test]
    fn word_wrap_breaks_overlong_word() {
        let lines = word_wrap("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", 40.0, 10.0);
        assert!(lines.len() > 1);
        let rejoined: String = lines.concat();
        assert_eq!(rejoined, "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    }

    #[test]
    fn row_height_is_max_of_cell_line_counts() {
        let widths = split_columns(2);
        let cells = vec![
            "short".to_string(),
            "a considerably longer cell text that will certainly need to wrap across \
             several lines at this column width because it just keeps going"
                .to_string(),
        ];
        let (wrapped, row_lines) = wrap_cells(&cells, &widths);
        assert_eq!(wrapped[0].len(), 1);
        assert!(wrapped[1].len() > 1);
        assert_eq!(row_lines, wrapped[1].len());
    }

    #[test]
    fn mismatched_cell_count_is_padded_and_truncated() {
        let widths = split_columns(3);

        // Too few cells: padded with empties, still 3 columns.
        let (wrapped, _) = wrap_cells(&["only".to_string()], &widths);
        assert_eq!(wrapped.len(), 3);
        assert_eq!(wrapped[1], vec![String::new()]);

        // Too many cells: overflow dropped, still 3 columns.
        let cells: Vec<String> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (wrapped, _) = wrap_cells(&cells, &widths);
        assert_eq!(wrapped.len(), 3);
        assert_eq!(wrapped[2], vec!["c".to_string()]);
    }

    // ── Transliteration ──────────────────────────────────────────────────

    #[test]
    fn markers_transliterate_to_ascii_tags() {
        assert_eq!(to_win_ansi("✅ MATCHING"), "[OK] MATCHING");
        assert_eq!(to_win_ansi("❌ DISCREPANCIES"), "[X] DISCREPANCIES");
        assert_eq!(to_win_ansi("📌 SUMMARY"), "[PIN] SUMMARY");
        assert_eq!(to_win_ansi("🧠 notes"), "[AI] notes");
    }

    #[test]
    fn non_encodable_chars_degrade_to_question_mark() {
        assert_eq!(to_win_ansi("日本"), "??");
        // Latin-1 passes through.
        assert_eq!(to_win_ansi("café"), "café");
    }

    #[test]
    fn win_ansi_encoding_is_single_byte() {
        let bytes = encode_win_ansi("café");
        assert_eq!(bytes.len(), 4);
        assert_eq!(bytes[3], 0xE9);
    }

    // ── Whole-document rendering ─────────────────────────────────────────

    #[test]
    fn renders_prose_then_table() {
        let pdf = render_report("Intro\n|Field|PO|\n|-|-|\n|Name|Acme|\n").unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        let text = extract_all_text(&pdf);
        assert!(text.contains("Intro"), "got: {text}");
        assert!(text.contains("Field"), "got: {text}");
        assert!(text.contains("Name"), "got: {text}");
        assert!(text.contains("Acme"), "got: {text}");
        // The separator line produces no visual row.
        assert!(!text.contains("---"), "got: {text}");
    }

    #[test]
    fn renders_marker_sections() {
        let report = "✅ MATCHING INFORMATION\n|Field|PO-1|SO-1|\n|---|---|---|\n|Total|100|100|\n\n📌 SUMMARY\nAll aligned.";
        let pdf = render_report(report).unwrap();
        let text = extract_all_text(&pdf);
        assert!(text.contains("[OK] MATCHING INFORMATION"), "got: {text}");
        assert!(text.contains("[PIN] SUMMARY"), "got: {text}");
        assert!(text.contains("All aligned."), "got: {text}");
    }

    #[test]
    fn long_reports_paginate() {
        let report = (0..200)
            .map(|i| format!("Paragraph number {i} with some content."))
            .collect::<Vec<_>>()
            .join("\n");
        let pdf = render_report(&report).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert!(
            doc.get_pages().len() > 1,
            "200 prose lines must not fit on one page"
        );
        let text = extract_all_text(&pdf);
        assert!(text.contains("Paragraph number 0"));
        assert!(text.contains("Paragraph number 199"));
    }

    #[test]
    fn empty_report_is_a_valid_single_page_pdf() {
        let pdf = render_report("").unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn mismatched_row_renders_without_panicking() {
        // Second row has 3 cells in a 2-column run: overflow is dropped.
        let pdf = render_report("|a|b|\n|c|d|extra|\n").unwrap();
        let text = extract_all_text(&pdf);
        assert!(text.contains('c'));
        assert!(text.contains('d'));
        assert!(!text.contains("extra"));
    }

    #[test]
    fn column_widths_reset_between_runs() {
        // A prose line between two runs lets the second run pick its own
        // column count; three distinct cells must all render.
        let pdf = render_report("|a|b|\nbreak\n|x|y|z|\n").unwrap();
        let text = extract_all_text(&pdf);
        for needle in ["a", "b", "break", "x", "y", "z"] {
            assert!(text.contains(needle), "missing {needle}: {text}");
        }
    }
}
