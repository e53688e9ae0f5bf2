//! End-to-end text and JSON merges, plus config files driving a merge.

use filemerge::config::{self, ConfigError};
use filemerge::files::{self, MergeKind};
use filemerge::imaging::{Background, Layout};
use filemerge::text::{
    JsonMode, SeparatorStyle, TextError, TextOptions, merge_csv, merge_json, merge_text,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use time::macros::datetime;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn text_merge_writes_sections_in_input_order() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("notes");
    std::fs::create_dir_all(&dir).unwrap();
    write(&dir, "b.txt", "second");
    write(&dir, "a.md", "first");

    let sources = files::collect_sources(&[dir]).unwrap();
    let merged = merge_text(
        &sources,
        &TextOptions::default(),
        datetime!(2024-03-15 14:25:01 UTC),
    )
    .unwrap();

    assert_eq!(
        merged.content,
        "\n=== a.md ===\n\nfirst\n\n\n=== b.txt ===\n\nsecond\n"
    );
    assert_eq!(merged.totals().words, 2);

    let output = files::resolve_output(Path::new("merged.txt"), &tmp.path().join("out"), None);
    let backup = files::write_output(&output, merged.content.as_bytes(), None).unwrap();
    assert!(backup.is_none());
    assert_eq!(std::fs::read_to_string(&output).unwrap(), merged.content);
}

#[test]
fn markdown_merge_with_line_numbers() {
    let tmp = TempDir::new().unwrap();
    let sources = vec![write(tmp.path(), "code.rs", "fn main() {}\n")];
    let options = TextOptions {
        line_numbers: true,
        strip_whitespace: true,
        markdown: true,
        separator: SeparatorStyle::None,
        ..TextOptions::default()
    };

    let merged = merge_text(&sources, &options, datetime!(2024-03-15 14:25:01 UTC)).unwrap();
    assert!(merged.content.starts_with("# Merged Document\n"));
    assert!(merged.content.contains("*Generated on 2024-03-15 14:25:01*"));
    assert!(merged.content.contains("\n## code.rs\n"));
    assert!(merged.content.contains("1: fn main() {}"));
}

#[test]
fn latin1_files_are_decoded() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("legacy.txt");
    std::fs::write(&path, [b'c', b'a', b'f', 0xE9]).unwrap();

    let options = TextOptions {
        separator: SeparatorStyle::None,
        ..TextOptions::default()
    };
    let merged = merge_text(&[path], &options, datetime!(2024-01-01 00:00:00 UTC)).unwrap();
    assert_eq!(merged.content, "café\n");
}

#[test]
fn json_object_merge_skips_invalid_files() {
    let tmp = TempDir::new().unwrap();
    let sources = vec![
        write(tmp.path(), "users.json", r#"[{"name": "ada"}]"#),
        write(tmp.path(), "broken.json", "{not json"),
        write(tmp.path(), "settings.json", r#"{"dark": true}"#),
    ];

    let merged = merge_json(&sources, JsonMode::Object).unwrap();
    assert_eq!(
        merged.value,
        json!({
            "users": [{"name": "ada"}],
            "settings": {"dark": true},
        })
    );
    assert_eq!(merged.skipped.len(), 1);
    assert_eq!(merged.skipped[0].path, tmp.path().join("broken.json"));

    let output = tmp.path().join("merged.json");
    files::write_output(&output, merged.to_pretty().unwrap().as_bytes(), None).unwrap();
    let reread: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(reread, merged.value);
}

#[test]
fn csv_directory_merges_under_first_header() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("sales");
    std::fs::create_dir_all(&dir).unwrap();
    write(&dir, "01-jan.csv", "region,total\r\nnorth,10\r\nsouth,12\r\n");
    write(&dir, "02-feb.csv", "");
    write(&dir, "03-mar.csv", "region,total\nwest,7\n");

    let sources = files::collect_sources(&[dir.clone()]).unwrap();
    assert_eq!(files::detect_kind(&sources), Some(MergeKind::Csv));

    let merged = merge_csv(&sources, true).unwrap();
    assert_eq!(merged.rows, 3);
    assert_eq!(merged.skipped.len(), 1);
    assert_eq!(merged.skipped[0].path, dir.join("02-feb.csv"));

    let output = tmp.path().join("merged.csv");
    files::write_output(&output, merged.content.as_bytes(), None).unwrap();
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        concat!(
            "\"region\",\"total\",\"source_file\"\n",
            "\"north\",\"10\",\"01-jan.csv\"\n",
            "\"south\",\"12\",\"01-jan.csv\"\n",
            "\"west\",\"7\",\"03-mar.csv\"\n",
        )
    );
}

#[test]
fn csv_of_headers_only_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let sources = vec![
        write(tmp.path(), "a.csv", "id,name\n"),
        write(tmp.path(), "b.csv", "id,name\n"),
    ];
    let err = merge_csv(&sources, false).unwrap_err();
    assert!(matches!(err, TextError::NoCsvRows { skipped: 0 }));
    assert_eq!(err.to_string(), "No CSV data to merge (0 skipped)");
}

#[test]
fn config_file_drives_merge_settings() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        config::CONFIG_FILE_NAME,
        r##"
[images]
layout = "grid"
cols = 2
background = "#000000"

[text]
separator = "minimal"

[output]
timestamp = false
"##,
    );

    let cfg = config::load_config(tmp.path()).unwrap();
    assert_eq!(
        cfg.images.layout(),
        Layout::Grid {
            rows: None,
            cols: Some(2),
        }
    );
    assert_eq!(cfg.images.background, Background::BLACK);
    assert_eq!(cfg.images.quality, 95);
    assert_eq!(cfg.text.separator, SeparatorStyle::Minimal);
    assert!(!cfg.output.timestamp);
    assert!(cfg.output.backup);
}

#[test]
fn config_rejects_unknown_keys_and_bad_values() {
    let tmp = TempDir::new().unwrap();
    let path = write(tmp.path(), "typo.toml", "[images]\nlayuot = \"grid\"\n");
    assert!(matches!(
        config::load_config_file(&path),
        Err(ConfigError::Toml(_))
    ));

    let path = write(tmp.path(), "bad.toml", "[images]\nquality = 0\n");
    assert!(matches!(
        config::load_config_file(&path),
        Err(ConfigError::Validation(_))
    ));

    assert!(matches!(
        config::load_config_file(&tmp.path().join("missing.toml")),
        Err(ConfigError::NotFound(_))
    ));
}
