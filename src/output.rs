//! CLI output formatting for every command.
//!
//! # Display Contract
//!
//! Every input is shown by its positional index and file name; full paths
//! appear only for outputs and backups. Problems are listed in an indented
//! `Skipped` block so a partial merge is visible at a glance. Each report
//! ends with a one-line summary.
//!
//! # Output Format
//!
//! ## Images
//!
//! ```text
//! 001 dawn.png
//! 002 dusk.png
//! Skipped
//!     broken.png: Processing failed: Failed to decode ...
//! Backup: output/merged_bak_20240315_142501.png
//! Merged 2 images → output/merged.png (800x1200)
//! ```
//!
//! ## Plan (`images --plan`)
//!
//! ```text
//! Layout grid 2x3, cell 400x300, canvas 1200x600
//!     001 a.png @ 0,0
//!     002 b.png @ 400,0
//!     1 empty cell
//! ```
//!
//! ## Text
//!
//! ```text
//! 001 notes.txt (12 lines, 40 words, 301 chars)
//! 002 todo.md (3 lines, 9 words, 58 chars)
//! Merged 2 files → output/merged.txt (15 lines, 49 words, 359 chars)
//! ```
//!
//! ## CSV
//!
//! ```text
//! 001 jan.csv
//! 002 feb.csv
//! Merged 2 CSV files → output/merged.csv (4 columns, 310 rows)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::files::{FileCategory, MergeKind, SkippedSource, categorize, detect_kind};
use crate::imaging::{MergePlan, MergeReport};
use crate::text::{JsonMode, MergedCsv, MergedJson, MergedText, TextStats};
use std::path::{Path, PathBuf};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn stats_detail(stats: &TextStats) -> String {
    format!(
        "{}, {}, {}",
        plural(stats.lines, "line", "lines"),
        plural(stats.words, "word", "words"),
        plural(stats.chars, "char", "chars")
    )
}

/// Indexed list of inputs.
fn source_lines<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) -> Vec<String> {
    paths
        .into_iter()
        .enumerate()
        .map(|(i, p)| format!("{} {}", format_index(i + 1), display_name(p)))
        .collect()
}

/// `Skipped` header plus one indented line per skipped input. Empty when
/// nothing was skipped.
fn skipped_lines(skipped: &[SkippedSource]) -> Vec<String> {
    if skipped.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Skipped".to_string()];
    for s in skipped {
        lines.push(format!(
            "{}{}: {}",
            indent(1),
            display_name(&s.path),
            s.reason
        ));
    }
    lines
}

fn backup_line(backup: Option<&Path>) -> Option<String> {
    backup.map(|b| format!("Backup: {}", b.display()))
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Images
// ============================================================================

/// Format a layout preview with one placement line per planned source,
/// followed by the sources that would be skipped.
pub fn format_plan(preview: &MergePlan) -> Vec<String> {
    let plan = &preview.plan;
    let sources = &preview.sources;
    let shape = match (plan.rows, plan.cols) {
        (_, 1) => "vertical".to_string(),
        (1, _) => "horizontal".to_string(),
        (r, c) => format!("grid {r}x{c}"),
    };
    let mut lines = vec![format!(
        "Layout {}, cell {}x{}, canvas {}x{}",
        shape, plan.cell_width, plan.cell_height, plan.canvas_width, plan.canvas_height
    )];

    for placement in &plan.placements {
        let name = sources
            .get(placement.index)
            .map(|p| display_name(p))
            .unwrap_or_else(|| "?".to_string());
        lines.push(format!(
            "{}{} {} @ {},{}",
            indent(1),
            format_index(placement.index + 1),
            name,
            placement.x,
            placement.y
        ));
    }

    let empty = plan.empty_cells() as usize;
    if empty > 0 {
        lines.push(format!(
            "{}{}",
            indent(1),
            plural(empty, "empty cell", "empty cells")
        ));
    }
    lines.extend(skipped_lines(&preview.skipped));
    lines
}

/// Print a layout preview to stdout.
pub fn print_plan(preview: &MergePlan) {
    print_lines(format_plan(preview));
}

/// Format the result of an image merge.
pub fn format_image_report(report: &MergeReport) -> Vec<String> {
    let mut lines = source_lines(&report.merged);
    lines.extend(skipped_lines(&report.skipped));
    lines.extend(backup_line(report.backup.as_deref()));
    lines.push(format!(
        "Merged {} \u{2192} {} ({}x{})",
        plural(report.merged.len(), "image", "images"),
        report.output.display(),
        report.plan.canvas_width,
        report.plan.canvas_height
    ));
    lines
}

/// Print an image merge report to stdout.
pub fn print_image_report(report: &MergeReport) {
    print_lines(format_image_report(report));
}

// ============================================================================
// Text, JSON and CSV
// ============================================================================

/// Format the result of a text merge, with per-file and total statistics.
pub fn format_text_report(
    merged: &MergedText,
    output: &Path,
    backup: Option<&Path>,
) -> Vec<String> {
    let mut lines: Vec<String> = merged
        .files
        .iter()
        .enumerate()
        .map(|(i, f)| {
            format!(
                "{} {} ({})",
                format_index(i + 1),
                display_name(&f.path),
                stats_detail(&f.stats)
            )
        })
        .collect();
    lines.extend(skipped_lines(&merged.skipped));
    lines.extend(backup_line(backup));
    lines.push(format!(
        "Merged {} \u{2192} {} ({})",
        plural(merged.files.len(), "file", "files"),
        output.display(),
        stats_detail(&merged.totals())
    ));
    lines
}

/// Print a text merge report to stdout.
pub fn print_text_report(merged: &MergedText, output: &Path, backup: Option<&Path>) {
    print_lines(format_text_report(merged, output, backup));
}

/// Format the result of a JSON merge.
pub fn format_json_report(
    merged: &MergedJson,
    mode: JsonMode,
    output: &Path,
    backup: Option<&Path>,
) -> Vec<String> {
    let mut lines = source_lines(&merged.merged);
    lines.extend(skipped_lines(&merged.skipped));
    lines.extend(backup_line(backup));
    lines.push(format!(
        "Merged {} as {} \u{2192} {}",
        plural(merged.merged.len(), "JSON file", "JSON files"),
        mode,
        output.display()
    ));
    lines
}

/// Print a JSON merge report to stdout.
pub fn print_json_report(
    merged: &MergedJson,
    mode: JsonMode,
    output: &Path,
    backup: Option<&Path>,
) {
    print_lines(format_json_report(merged, mode, output, backup));
}

/// Format the result of a CSV merge: inputs, then header width and row count.
pub fn format_csv_report(merged: &MergedCsv, output: &Path, backup: Option<&Path>) -> Vec<String> {
    let mut lines = source_lines(&merged.merged);
    lines.extend(skipped_lines(&merged.skipped));
    lines.extend(backup_line(backup));
    lines.push(format!(
        "Merged {} \u{2192} {} ({}, {})",
        plural(merged.merged.len(), "CSV file", "CSV files"),
        output.display(),
        plural(merged.header.len(), "column", "columns"),
        plural(merged.rows, "row", "rows")
    ));
    lines
}

/// Print a CSV merge report to stdout.
pub fn print_csv_report(merged: &MergedCsv, output: &Path, backup: Option<&Path>) {
    print_lines(format_csv_report(merged, output, backup));
}

// ============================================================================
// Check
// ============================================================================

fn kind_line(kind: Option<MergeKind>) -> String {
    match kind {
        Some(MergeKind::Images) => "Merges as: images".to_string(),
        Some(MergeKind::Text) => "Merges as: text".to_string(),
        Some(MergeKind::Json) => "Merges as: json".to_string(),
        Some(MergeKind::Csv) => "Merges as: csv".to_string(),
        Some(MergeKind::Mixed) => "Mixed inputs: merge images and text separately".to_string(),
        None => "Nothing to merge".to_string(),
    }
}

/// List inputs with their category, a per-category summary and the merge
/// that `merge` would run.
pub fn format_check(sources: &[PathBuf]) -> Vec<String> {
    let mut images = 0;
    let mut texts = 0;
    let mut lines = Vec::with_capacity(sources.len() + 1);

    for (i, path) in sources.iter().enumerate() {
        let category = categorize(path);
        match category {
            FileCategory::Image => images += 1,
            FileCategory::Text => texts += 1,
            FileCategory::Unsupported => {}
        }
        lines.push(format!(
            "{} {} [{}]",
            format_index(i + 1),
            display_name(path),
            category.as_str()
        ));
        lines.push(format!("{}Source: {}", indent(1), path.display()));
    }

    lines.push(format!(
        "{}, {}",
        plural(images, "image", "images"),
        plural(texts, "text file", "text files")
    ));
    lines.push(kind_line(detect_kind(sources)));
    lines
}

/// Print a check listing to stdout.
pub fn print_check(sources: &[PathBuf]) {
    print_lines(format_check(sources));
}

// ============================================================================
// Tests
// ============================================================================
