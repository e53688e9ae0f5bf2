//! Text and JSON concatenation.
//!
//! ## Text
//!
//! Each readable input becomes one block. Plain output looks like:
//!
//! ```text
//!
//! === notes.txt ===
//!
//! <content>
//!
//!
//! === todo.md ===
//!
//! <content>
//! ```
//!
//! Per-file processing runs in a fixed order: strip whitespace, number lines,
//! prepend the metadata header. Markdown mode swaps separators for `##`
//! sections with fenced code blocks under a document title.
//!
//! Inputs are decoded as UTF-8 (a leading BOM is dropped). Bytes that are not
//! valid UTF-8 are decoded as Latin-1 instead, which never fails.
//!
//! ## JSON
//!
//! | Mode | Output |
//! |---|---|
//! | `array` | `[{"source": "<file name>", "data": <value>}, ...]` |
//! | `object` | `{"<file stem>": <value>, ...}`, later stems overwrite |
//!
//! ## CSV
//!
//! The first non-empty file supplies the header row; the first row of every
//! later file is taken as its header and dropped. Data rows are concatenated
//! in input order, optionally tagged with a trailing `source_file` column.
//! Every cell is written quoted.

use crate::files::{SkippedSource, display_stamp};
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use time::OffsetDateTime;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const MARKDOWN_TITLE: &str = "# Merged Document";

/// Header of the column naming each row's input file.
pub const SOURCE_COLUMN: &str = "source_file";

#[derive(Error, Debug)]
pub enum TextError {
    #[error("No readable input files ({skipped} skipped)")]
    NothingToMerge { skipped: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("No CSV data to merge ({skipped} skipped)")]
    NoCsvRows { skipped: usize },
}

/// Header written before each file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatorStyle {
    /// `=== name ===`
    #[default]
    Simple,
    /// Three-line box drawn with double-line characters.
    Fancy,
    /// `--- name ---`
    Minimal,
    None,
}

impl SeparatorStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            SeparatorStyle::Simple => "simple",
            SeparatorStyle::Fancy => "fancy",
            SeparatorStyle::Minimal => "minimal",
            SeparatorStyle::None => "none",
        }
    }
}

impl fmt::Display for SeparatorStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeparatorStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(SeparatorStyle::Simple),
            "fancy" => Ok(SeparatorStyle::Fancy),
            "minimal" => Ok(SeparatorStyle::Minimal),
            "none" => Ok(SeparatorStyle::None),
            other => Err(format!(
                "unknown separator '{other}' (expected simple, fancy, minimal or none)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonMode {
    #[default]
    Array,
    Object,
}

impl JsonMode {
    pub fn as_str(self) -> &'static str {
        match self {
            JsonMode::Array => "array",
            JsonMode::Object => "object",
        }
    }
}

impl fmt::Display for JsonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JsonMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "array" => Ok(JsonMode::Array),
            "object" => Ok(JsonMode::Object),
            other => Err(format!("unknown JSON mode '{other}' (expected array or object)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextOptions {
    pub separator: SeparatorStyle,
    pub line_numbers: bool,
    pub metadata: bool,
    pub strip_whitespace: bool,
    pub markdown: bool,
}

/// Line, word and character counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TextStats {
    pub lines: usize,
    pub words: usize,
    pub chars: usize,
}

impl TextStats {
    /// Lines are newline count plus one, so empty text is one line.
    pub fn of(content: &str) -> Self {
        Self {
            lines: content.matches('\n').count() + 1,
            words: content.split_whitespace().count(),
            chars: content.chars().count(),
        }
    }
}

impl AddAssign for TextStats {
    fn add_assign(&mut self, other: Self) {
        self.lines += other.lines;
        self.words += other.words;
        self.chars += other.chars;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedFile {
    pub path: PathBuf,
    pub stats: TextStats,
}

#[derive(Debug, Clone)]
pub struct MergedText {
    pub content: String,
    pub files: Vec<MergedFile>,
    pub skipped: Vec<SkippedSource>,
}

impl MergedText {
    pub fn totals(&self) -> TextStats {
        let mut total = TextStats::default();
        for file in &self.files {
            total += file.stats;
        }
        total
    }
}

#[derive(Debug, Clone)]
pub struct MergedJson {
    pub value: Value,
    pub merged: Vec<PathBuf>,
    pub skipped: Vec<SkippedSource>,
}

impl MergedJson {
    pub fn to_pretty(&self) -> Result<String, TextError> {
        Ok(serde_json::to_string_pretty(&self.value)?)
    }
}

#[derive(Debug, Clone)]
pub struct MergedCsv {
    pub content: String,
    pub header: Vec<String>,
    /// Data rows written, header excluded.
    pub rows: usize,
    pub merged: Vec<PathBuf>,
    pub skipped: Vec<SkippedSource>,
}

// =========================================================================
// Reading
// =========================================================================

/// Decode file bytes: UTF-8 without BOM, or Latin-1 when that fails.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

pub fn read_text(path: &Path) -> Result<String, TextError> {
    Ok(decode_text(&std::fs::read(path)?))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// =========================================================================
// Formatting
// =========================================================================

/// Separator line(s) for `name`, or `None` for [`SeparatorStyle::None`].
pub fn format_separator(name: &str, style: SeparatorStyle) -> Option<String> {
    match style {
        SeparatorStyle::Simple => Some(format!("=== {name} ===")),
        SeparatorStyle::Minimal => Some(format!("--- {name} ---")),
        SeparatorStyle::Fancy => {
            let border = "═".repeat(name.chars().count() + 2);
            Some(format!("╔{border}╗\n║ {name}\n╚{border}╝"))
        }
        SeparatorStyle::None => None,
    }
}

/// Prefix every line with its right-aligned 1-based number.
pub fn number_lines(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let width = lines.len().to_string().len();
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Facts shown in a metadata header.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub modified: Option<OffsetDateTime>,
}

impl FileInfo {
    pub fn read(path: &Path) -> Result<Self, TextError> {
        let meta = std::fs::metadata(path)?;
        Ok(Self {
            name: file_name(path),
            size: meta.len(),
            modified: meta.modified().ok().map(OffsetDateTime::from),
        })
    }
}

/// `File:`/`Size:`/`Modified:`/`Processed:` lines, a blank line, then `content`.
///
/// Timestamps are shown in the offset of `now`.
pub fn with_metadata(info: &FileInfo, content: &str, now: OffsetDateTime) -> String {
    let mut header = vec![
        format!("File: {}", info.name),
        format!("Size: {:.2} MB", info.size as f64 / (1024.0 * 1024.0)),
    ];
    if let Some(modified) = info.modified {
        header.push(format!(
            "Modified: {}",
            display_stamp(modified.to_offset(now.offset()))
        ));
    }
    header.push(format!("Processed: {}", display_stamp(now)));
    format!("{}\n\n{content}", header.join("\n"))
}

fn plain_block(name: &str, content: &str, style: SeparatorStyle) -> String {
    match format_separator(name, style) {
        Some(separator) => format!("\n{separator}\n\n{content}\n"),
        None => format!("{content}\n"),
    }
}

fn markdown_document(sections: &[(String, String)], now: OffsetDateTime) -> String {
    let mut parts = vec![
        format!("{MARKDOWN_TITLE}\n"),
        format!("*Generated on {}*\n", display_stamp(now)),
        "---\n".to_string(),
    ];
    for (name, content) in sections {
        parts.push(format!("\n## {name}\n"));
        parts.push("```".to_string());
        parts.push(content.clone());
        parts.push("```\n".to_string());
    }
    parts.join("\n")
}

// =========================================================================
// Merging
// =========================================================================

/// Concatenate text files.
///
/// Unreadable files are skipped and reported; it is an error only when none
/// could be read. `now` stamps the metadata and markdown headers.
pub fn merge_text(
    sources: &[PathBuf],
    options: &TextOptions,
    now: OffsetDateTime,
) -> Result<MergedText, TextError> {
    let mut sections = Vec::new();
    let mut files = Vec::new();
    let mut skipped = Vec::new();

    for path in sources {
        let raw = match read_text(path) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                skipped.push(SkippedSource {
                    path: path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let mut content = if options.strip_whitespace {
            raw.trim().to_string()
        } else {
            raw
        };
        let stats = TextStats::of(&content);
        if options.line_numbers {
            content = number_lines(&content);
        }
        if options.metadata {
            let info = FileInfo::read(path)?;
            content = with_metadata(&info, &content, now);
        }

        log::debug!("Added {} ({} lines)", path.display(), stats.lines);
        sections.push((file_name(path), content));
        files.push(MergedFile {
            path: path.clone(),
            stats,
        });
    }

    if files.is_empty() {
        return Err(TextError::NothingToMerge {
            skipped: skipped.len(),
        });
    }

    let content = if options.markdown {
        markdown_document(&sections, now)
    } else {
        sections
            .iter()
            .map(|(name, content)| plain_block(name, content, options.separator))
            .collect::<Vec<_>>()
            .join("\n")
    };

    Ok(MergedText {
        content,
        files,
        skipped,
    })
}

/// Combine JSON files into one document.
///
/// Files that cannot be read or parsed are skipped and reported.
pub fn merge_json(sources: &[PathBuf], mode: JsonMode) -> Result<MergedJson, TextError> {
    let mut parsed = Vec::new();
    let mut skipped = Vec::new();

    for path in sources {
        let value = read_text(path)
            .and_then(|text| serde_json::from_str::<Value>(&text).map_err(TextError::from));
        match value {
            Ok(value) => parsed.push((path.clone(), value)),
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                skipped.push(SkippedSource {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if parsed.is_empty() {
        return Err(TextError::NothingToMerge {
            skipped: skipped.len(),
        });
    }

    let value = match mode {
        JsonMode::Array => Value::Array(
            parsed
                .iter()
                .map(|(path, data)| json!({ "source": file_name(path), "data": data }))
                .collect(),
        ),
        JsonMode::Object => {
            let mut map = Map::new();
            for (path, data) in &parsed {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                map.insert(stem, data.clone());
            }
            Value::Object(map)
        }
    };

    Ok(MergedJson {
        value,
        merged: parsed.into_iter().map(|(path, _)| path).collect(),
        skipped,
    })
}

/// Records of one CSV file, header row included. Empty files have none.
fn read_csv_records(path: &Path) -> Result<Vec<Vec<String>>, TextError> {
    let text = read_text(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.trim().as_bytes());
    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?.iter().map(str::to_owned).collect());
    }
    Ok(records)
}

/// Concatenate CSV files under the first file's header.
///
/// Unreadable and empty files are skipped and reported. A file holding only
/// a header still counts as merged. It is an error when no data row is left.
pub fn merge_csv(sources: &[PathBuf], source_column: bool) -> Result<MergedCsv, TextError> {
    let mut header: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut merged = Vec::new();
    let mut skipped = Vec::new();

    for path in sources {
        let records = match read_csv_records(path) {
            Ok(records) if records.is_empty() => {
                log::warn!("Skipping {}: empty file", path.display());
                skipped.push(SkippedSource {
                    path: path.clone(),
                    reason: "empty file".into(),
                });
                continue;
            }
            Ok(records) => records,
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                skipped.push(SkippedSource {
                    path: path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let mut records = records.into_iter();
        let first = records.next().unwrap_or_default();
        if header.is_none() {
            let mut columns = first;
            if source_column {
                columns.push(SOURCE_COLUMN.to_string());
            }
            header = Some(columns);
        }

        let name = file_name(path);
        let before = rows.len();
        rows.extend(records.map(|mut row| {
            if source_column {
                row.push(name.clone());
            }
            row
        }));
        log::debug!("Added {} ({} rows)", path.display(), rows.len() - before);
        merged.push(path.clone());
    }

    let header = match header {
        Some(header) if !rows.is_empty() => header,
        _ => {
            return Err(TextError::NoCsvRows {
                skipped: skipped.len(),
            });
        }
    };

    let mut writer = WriterBuilder::new()
        .flexible(true)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&header)?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    Ok(MergedCsv {
        content: String::from_utf8_lossy(&bytes).into_owned(),
        header,
        rows: rows.len(),
        merged,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{write_bytes, write_text};
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-03-15 14:25:01 UTC);

    // =========================================================================
    // Decoding
    // =========================================================================

    #[test]
    fn decode_strips_utf8_bom() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFhello"), "hello");
    }

    #[test]
    fn decode_falls_back_to_latin1() {
        // "café" in Latin-1
        assert_eq!(decode_text(b"caf\xE9"), "café");
    }

    #[test]
    fn decode_keeps_valid_utf8() {
        assert_eq!(decode_text("naïve ✓".as_bytes()), "naïve ✓");
    }

    // =========================================================================
    // Formatting
    // =========================================================================

    #[test]
    fn separators_by_style() {
        assert_eq!(
            format_separator("a.txt", SeparatorStyle::Simple).unwrap(),
            "=== a.txt ==="
        );
        assert_eq!(
            format_separator("a.txt", SeparatorStyle::Minimal).unwrap(),
            "--- a.txt ---"
        );
        assert_eq!(
            format_separator("a.txt", SeparatorStyle::Fancy).unwrap(),
            "╔═══════╗\n║ a.txt\n╚═══════╝"
        );
        assert_eq!(format_separator("a.txt", SeparatorStyle::None), None);
    }

    #[test]
    fn fancy_border_counts_chars_not_bytes() {
        let sep = format_separator("é.txt", SeparatorStyle::Fancy).unwrap();
        let top = sep.lines().next().unwrap();
        assert_eq!(top.chars().count(), 9);
    }

    #[test]
    fn line_numbers_are_right_aligned() {
        let content = (1..=10).map(|i| format!("l{i}")).collect::<Vec<_>>().join("\n");
        let numbered = number_lines(&content);
        let lines: Vec<&str> = numbered.lines().collect();
        assert_eq!(lines[0], " 1: l1");
        assert_eq!(lines[9], "10: l10");
    }

    #[test]
    fn metadata_header_lines() {
        let info = FileInfo {
            name: "a.txt".into(),
            size: 3 * 1024 * 1024 / 2,
            modified: Some(datetime!(2024-01-01 08:00:00 UTC)),
        };
        let out = with_metadata(&info, "body", NOW);
        assert_eq!(
            out,
            "File: a.txt\nSize: 1.50 MB\nModified: 2024-01-01 08:00:00\n\
             Processed: 2024-03-15 14:25:01\n\nbody"
        );
    }

    #[test]
    fn stats_count_lines_words_chars() {
        assert_eq!(
            TextStats::of("one two\nthree"),
            TextStats {
                lines: 2,
                words: 3,
                chars: 13
            }
        );
        assert_eq!(TextStats::of("").lines, 1);
    }

    // =========================================================================
    // merge_text
    // =========================================================================

    #[test]
    fn merge_simple_blocks() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = write_text(tmp.path(), "a.txt", "alpha");
        let b = write_text(tmp.path(), "b.txt", "beta");

        let merged = merge_text(&[a, b], &TextOptions::default(), NOW).unwrap();
        assert_eq!(
            merged.content,
            "\n=== a.txt ===\n\nalpha\n\n\n=== b.txt ===\n\nbeta\n"
        );
        assert_eq!(merged.files.len(), 2);
        assert_eq!(merged.totals().words, 2);
    }

    #[test]
    fn merge_without_separator_just_concatenates() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = write_text(tmp.path(), "a.txt", "alpha");
        let b = write_text(tmp.path(), "b.txt", "beta");

        let options = TextOptions {
            separator: SeparatorStyle::None,
            ..TextOptions::default()
        };
        let merged = merge_text(&[a, b], &options, NOW).unwrap();
        assert_eq!(merged.content, "alpha\n\nbeta\n");
    }

    #[test]
    fn merge_strips_then_numbers() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = write_text(tmp.path(), "a.txt", "\n\n  x\ny  \n\n");

        let options = TextOptions {
            separator: SeparatorStyle::None,
            strip_whitespace: true,
            line_numbers: true,
            ..TextOptions::default()
        };
        let merged = merge_text(&[a], &options, NOW).unwrap();
        assert_eq!(merged.content, "1: x\n2: y\n");
    }

    #[test]
    fn merge_markdown_document() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = write_text(tmp.path(), "a.py", "print(1)");

        let options = TextOptions {
            markdown: true,
            ..TextOptions::default()
        };
        let merged = merge_text(&[a], &options, NOW).unwrap();
        assert_eq!(
            merged.content,
            "# Merged Document\n\n*Generated on 2024-03-15 14:25:01*\n\n---\n\n\n\
             ## a.py\n\n```\nprint(1)\n```\n"
        );
    }

    #[test]
    fn merge_metadata_uses_real_file_size() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = write_text(tmp.path(), "a.txt", "hi");

        let options = TextOptions {
            separator: SeparatorStyle::None,
            metadata: true,
            ..TextOptions::default()
        };
        let merged = merge_text(&[a], &options, NOW).unwrap();
        assert!(merged.content.starts_with("File: a.txt\nSize: 0.00 MB\n"));
        assert!(merged.content.contains("Processed: 2024-03-15 14:25:01\n\nhi\n"));
    }

    #[test]
    fn merge_skips_unreadable_and_reports() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = write_text(tmp.path(), "a.txt", "alpha");
        let missing = tmp.path().join("gone.txt");

        let merged = merge_text(&[missing.clone(), a], &TextOptions::default(), NOW).unwrap();
        assert_eq!(merged.files.len(), 1);
        assert_eq!(merged.skipped.len(), 1);
        assert_eq!(merged.skipped[0].path, missing);
    }

    #[test]
    fn merge_with_nothing_readable_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = merge_text(
            &[tmp.path().join("x.txt")],
            &TextOptions::default(),
            NOW,
        )
        .unwrap_err();
        assert!(matches!(err, TextError::NothingToMerge { skipped: 1 }));
    }

    #[test]
    fn merge_reads_latin1_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = write_bytes(tmp.path(), "legacy.txt", b"na\xEFve");
        let options = TextOptions {
            separator: SeparatorStyle::None,
            ..TextOptions::default()
        };
        let merged = merge_text(&[a], &options, NOW).unwrap();
        assert_eq!(merged.content, "naïve\n");
    }

    // =========================================================================
    // merge_json
    // =========================================================================

    #[test]
    fn json_array_mode_wraps_each_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = write_text(tmp.path(), "a.json", r#"{"x": 1}"#);
        let b = write_text(tmp.path(), "b.json", "[1, 2]");

        let merged = merge_json(&[a, b], JsonMode::Array).unwrap();
        assert_eq!(
            merged.value,
            json!([
                {"source": "a.json", "data": {"x": 1}},
                {"source": "b.json", "data": [1, 2]},
            ])
        );
    }

    #[test]
    fn json_object_mode_keys_by_stem() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = write_text(tmp.path(), "users.json", r#"["ann"]"#);
        let b = write_text(tmp.path(), "roles.json", r#"{"admin": true}"#);

        let merged = merge_json(&[a, b], JsonMode::Object).unwrap();
        assert_eq!(
            merged.value,
            json!({"users": ["ann"], "roles": {"admin": true}})
        );
    }

    #[test]
    fn json_skips_invalid_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let good = write_text(tmp.path(), "good.json", "true");
        let bad = write_text(tmp.path(), "bad.json", "{not json");

        let merged = merge_json(&[bad.clone(), good.clone()], JsonMode::Array).unwrap();
        assert_eq!(merged.merged, vec![good]);
        assert_eq!(merged.skipped[0].path, bad);
        assert!(merged.to_pretty().unwrap().contains("\"source\": \"good.json\""));
    }

    #[test]
    fn json_all_invalid_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let bad = write_text(tmp.path(), "bad.json", "nope");
        assert!(matches!(
            merge_json(&[bad], JsonMode::Object),
            Err(TextError::NothingToMerge { skipped: 1 })
        ));
    }

    // =========================================================================
    // CSV
    // =========================================================================

    #[test]
    fn csv_header_comes_from_first_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = write_text(tmp.path(), "a.csv", "name,age\nada,36\n");
        let b = write_text(tmp.path(), "b.csv", "NAME,AGE\nalan,41\ngrace,45\n");

        let merged = merge_csv(&[a, b], false).unwrap();
        assert_eq!(merged.header, vec!["name", "age"]);
        assert_eq!(merged.rows, 3);
        assert_eq!(
            merged.content,
            "\"name\",\"age\"\n\"ada\",\"36\"\n\"alan\",\"41\"\n\"grace\",\"45\"\n"
        );
    }

    #[test]
    fn csv_source_column_names_each_rows_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = write_text(tmp.path(), "jan.csv", "item,qty\npen,2\n");
        let b = write_text(tmp.path(), "feb.csv", "item,qty\nink,5\n");

        let merged = merge_csv(&[a, b], true).unwrap();
        assert_eq!(merged.header, vec!["item", "qty", SOURCE_COLUMN]);
        let lines: Vec<&str> = merged.content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "\"item\",\"qty\",\"source_file\"",
                "\"pen\",\"2\",\"jan.csv\"",
                "\"ink\",\"5\",\"feb.csv\"",
            ]
        );
    }

    #[test]
    fn csv_skips_empty_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let empty = write_text(tmp.path(), "empty.csv", "  \n\n");
        let data = write_text(tmp.path(), "data.csv", "k,v\nx,1\n");

        let merged = merge_csv(&[empty.clone(), data.clone()], false).unwrap();
        // The empty file does not claim the header
        assert_eq!(merged.header, vec!["k", "v"]);
        assert_eq!(merged.merged, vec![data]);
        assert_eq!(merged.skipped.len(), 1);
        assert_eq!(merged.skipped[0].path, empty);
        assert_eq!(merged.skipped[0].reason, "empty file");
    }

    #[test]
    fn csv_header_only_file_still_sets_header() {
        let tmp = tempfile::TempDir::new().unwrap();
        let head = write_text(tmp.path(), "head.csv", "id,label\n");
        let body = write_text(tmp.path(), "body.csv", "ID,LABEL\n7,seven\n");

        let merged = merge_csv(&[head.clone(), body.clone()], true).unwrap();
        assert_eq!(merged.header, vec!["id", "label", SOURCE_COLUMN]);
        assert_eq!(merged.rows, 1);
        assert_eq!(merged.merged, vec![head, body]);
        assert!(merged.content.ends_with("\"7\",\"seven\",\"body.csv\"\n"));
    }

    #[test]
    fn csv_without_data_rows_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = write_text(tmp.path(), "a.csv", "x,y\n");
        let b = write_text(tmp.path(), "b.csv", "");
        assert!(matches!(
            merge_csv(&[a, b], true),
            Err(TextError::NoCsvRows { skipped: 1 })
        ));
        assert!(matches!(
            merge_csv(&[], true),
            Err(TextError::NoCsvRows { skipped: 0 })
        ));
    }

    #[test]
    fn csv_quotes_and_escapes_cells() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_text(
            tmp.path(),
            "q.csv",
            "title,note\n\"Hello, world\",\"say \"\"hi\"\"\"\n",
        );

        let merged = merge_csv(&[path], false).unwrap();
        assert!(
            merged
                .content
                .ends_with("\"Hello, world\",\"say \"\"hi\"\"\"\n")
        );
    }

    #[test]
    fn csv_keeps_ragged_rows() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_text(tmp.path(), "r.csv", "a,b,c\n1\n2,3,4,5\n");
        let merged = merge_csv(&[path], false).unwrap();
        assert_eq!(merged.rows, 2);
        assert!(merged.content.contains("\n\"1\"\n"));
        assert!(merged.content.contains("\n\"2\",\"3\",\"4\",\"5\"\n"));
    }

    #[test]
    fn modes_and_styles_parse() {
        assert_eq!("Fancy".parse::<SeparatorStyle>().unwrap(), SeparatorStyle::Fancy);
        assert!("dotted".parse::<SeparatorStyle>().is_err());
        assert_eq!("object".parse::<JsonMode>().unwrap(), JsonMode::Object);
        assert!("list".parse::<JsonMode>().is_err());
    }
}
