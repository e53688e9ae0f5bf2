//! Input discovery and output file management.
//!
//! ## Input categories
//!
//! | Category | Extensions |
//! |---|---|
//! | Image | whatever [`supported_input_extensions`] reports |
//! | Text | [`TEXT_EXTENSIONS`] |
//! | Unsupported | everything else |
//!
//! Directories given as inputs are walked recursively; their unsupported
//! files are skipped silently. An unsupported file named explicitly is an
//! error.
//!
//! ## Output naming
//!
//! ```text
//! merged.png                      # as requested
//! merged_20240315_142501.png      # timestamped_name
//! merged_bak_20240315_142501.png  # backup_existing
//! merged_1.png                    # unique_path
//! ```

use crate::imaging::supported_input_extensions;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use walkdir::WalkDir;

/// Extensions merged as text.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "csv", "json", "xml", "log", "ini", "yaml", "yml", "html", "htm", "css", "js",
    "php", "asp", "jsx", "ts", "py", "java", "c", "cpp", "h", "cs", "go", "rs", "sh", "bat",
    "sql",
];

const FILE_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");
const DISPLAY_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Error, Debug)]
pub enum FilesError {
    #[error("Input not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Unsupported file type: {}", .0.display())]
    Unsupported(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Text,
    Unsupported,
}

impl FileCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FileCategory::Image => "image",
            FileCategory::Text => "text",
            FileCategory::Unsupported => "unsupported",
        }
    }
}

/// An input left out of a merge and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: String,
}

/// What a set of inputs can be merged as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    Images,
    Text,
    /// Text inputs that are all `.json`.
    Json,
    /// Text inputs that are all `.csv`.
    Csv,
    Mixed,
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Category by lowercase extension.
pub fn categorize(path: &Path) -> FileCategory {
    match extension(path) {
        Some(ext) if supported_input_extensions().contains(&ext.as_str()) => FileCategory::Image,
        Some(ext) if TEXT_EXTENSIONS.contains(&ext.as_str()) => FileCategory::Text,
        _ => FileCategory::Unsupported,
    }
}

/// Expand inputs into an ordered list of mergeable files.
///
/// Explicit files keep their command-line order. Each directory contributes
/// its supported files sorted by name, recursively.
pub fn collect_sources(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, FilesError> {
    let mut sources = Vec::new();
    for input in inputs {
        if !input.exists() {
            return Err(FilesError::NotFound(input.clone()));
        }
        if input.is_dir() {
            let before = sources.len();
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file()
                    && categorize(entry.path()) != FileCategory::Unsupported
                {
                    sources.push(entry.into_path());
                }
            }
            log::debug!(
                "{}: {} mergeable files",
                input.display(),
                sources.len() - before
            );
        } else if categorize(input) == FileCategory::Unsupported {
            return Err(FilesError::Unsupported(input.clone()));
        } else {
            sources.push(input.clone());
        }
    }
    Ok(sources)
}

fn all_have_extension(paths: &[PathBuf], ext: &str) -> bool {
    paths.iter().all(|p| extension(p).as_deref() == Some(ext))
}

/// Decide how `paths` can be merged. `None` for an empty list.
pub fn detect_kind(paths: &[PathBuf]) -> Option<MergeKind> {
    let first = categorize(paths.first()?);
    if paths.iter().any(|p| categorize(p) != first) {
        return Some(MergeKind::Mixed);
    }
    Some(match first {
        FileCategory::Image => MergeKind::Images,
        FileCategory::Text if all_have_extension(paths, "json") => MergeKind::Json,
        FileCategory::Text if all_have_extension(paths, "csv") => MergeKind::Csv,
        FileCategory::Text => MergeKind::Text,
        FileCategory::Unsupported => MergeKind::Mixed,
    })
}

/// Current local time, or UTC when the local offset cannot be determined.
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// `YYYYMMDD_HHMMSS`, for file names.
pub fn file_stamp(ts: OffsetDateTime) -> String {
    ts.format(FILE_STAMP)
        .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

/// `YYYY-MM-DD HH:MM:SS`, for humans.
pub fn display_stamp(ts: OffsetDateTime) -> String {
    ts.format(DISPLAY_STAMP)
        .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    path.with_file_name(name)
}

/// `dir/stem.ext` → `dir/stem_YYYYMMDD_HHMMSS.ext`.
pub fn timestamped_name(path: &Path, ts: OffsetDateTime) -> PathBuf {
    with_suffix(path, &format!("_{}", file_stamp(ts)))
}

/// Copy an existing `path` to `stem_bak_YYYYMMDD_HHMMSS.ext` beside it.
///
/// Returns the backup path, or `None` when there was nothing to back up.
pub fn backup_existing(path: &Path, ts: OffsetDateTime) -> Result<Option<PathBuf>, FilesError> {
    if !path.is_file() {
        return Ok(None);
    }
    let backup = with_suffix(path, &format!("_bak_{}", file_stamp(ts)));
    std::fs::copy(path, &backup)?;
    log::info!("Backed up {} to {}", path.display(), backup.display());
    Ok(Some(backup))
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent(path: &Path) -> Result<(), FilesError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write `contents` to `path`, creating parent directories. When `backup`
/// carries a timestamp an existing file is backed up first.
pub fn write_output(
    path: &Path,
    contents: &[u8],
    backup: Option<OffsetDateTime>,
) -> Result<Option<PathBuf>, FilesError> {
    ensure_parent(path)?;
    let backup_path = match backup {
        Some(ts) => backup_existing(path, ts)?,
        None => None,
    };
    std::fs::write(path, contents)?;
    Ok(backup_path)
}

/// First of `path`, `stem_1.ext`, `stem_2.ext`, … that does not exist.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    (1u32..)
        .map(|n| with_suffix(path, &format!("_{n}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Where a merge result goes.
///
/// A bare file name lands in `dir` (timestamped when `stamp` is set). A name
/// with a directory component is used as given.
pub fn resolve_output(name: &Path, dir: &Path, stamp: Option<OffsetDateTime>) -> PathBuf {
    let has_dir = name
        .parent()
        .is_some_and(|p| !p.as_os_str().is_empty());
    if has_dir {
        return name.to_path_buf();
    }
    let path = dir.join(name);
    match stamp {
        Some(ts) => timestamped_name(&path, ts),
        None => path,
    }
}
