//! Log archive scanning
//!
//! Notarized logs are archived as a ZIP container with entries at
//! `<prefix>/YYYY/MM/DD/<name>.json`. The scanner extracts the raw content of
//! every entry whose embedded date falls inside the requested window.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::{VerifyError, VerifyResult};

/// One date-stamped entry extracted from the archive
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Entry path inside the archive
    pub path: String,
    /// Date reconstructed from the path segments, `YYYY-MM-DD`
    pub date: String,
    /// Raw entry content (hashed later, not parsed here)
    pub content: String,
}

/// Scan the archive for entries within `[date_start, date_end]` (inclusive).
///
/// Entries whose paths do not match the date-segmented layout are ignored;
/// directory entries are skipped. Distinguishes "archive is not
/// notarization-shaped" (`NoMatchingEntries`) from "wrong dates"
/// (`NoEntriesInRange`).
///
/// Returns a fully materialized `Vec` rather than a lazy iterator; callers
/// may re-scan the same bytes freely and must not rely on any ordering
/// beyond original entry order.
pub fn scan(bytes: &[u8], date_start: &str, date_end: &str) -> VerifyResult<Vec<ArchiveEntry>> {
    let cursor = Cursor::new(bytes);
    let mut archive =
        ZipArchive::new(cursor).map_err(|e| VerifyError::InvalidArchive(e.to_string()))?;

    let mut matched = 0usize;
    let mut entries = Vec::new();

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| VerifyError::InvalidArchive(e.to_string()))?;
        if file.is_dir() {
            continue;
        }

        let path = file.name().to_string();
        let Some(date) = entry_date(&path) else {
            continue;
        };
        matched += 1;

        // Fixed-width zero-padded format, so string compare is date compare
        if date.as_str() < date_start || date.as_str() > date_end {
            continue;
        }

        let mut raw = Vec::new();
        file.read_to_end(&mut raw)
            .map_err(|e| VerifyError::InvalidArchive(format!("{path}: {e}")))?;
        let content = String::from_utf8(raw)
            .map_err(|_| VerifyError::MalformedContent(format!("{path}: not valid UTF-8")))?;

        entries.push(ArchiveEntry { path, date, content });
    }

    if matched == 0 {
        return Err(VerifyError::NoMatchingEntries);
    }
    if entries.is_empty() {
        return Err(VerifyError::NoEntriesInRange);
    }

    Ok(entries)
}

/// Reconstruct `YYYY-MM-DD` from a path ending in `YYYY/MM/DD/<name>.json`
fn entry_date(path: &str) -> Option<String> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 4 {
        return None;
    }

    let &[year, month, day, name] = &segments[segments.len() - 4..] else {
        return None;
    };

    if !name.ends_with(".json") || name.len() <= ".json".len() {
        return None;
    }
    if !is_digits(year, 4) || !is_digits(month, 2) || !is_digits(day, 2) {
        return None;
    }

    Some(format!("{year}-{month}-{day}"))
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::FileOptions;
    use zip::ZipWriter;

    use super::*;

    fn build_zip(files: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buf);
            let options: FileOptions<()> =
                FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            for (path, content) in files {
                zip.start_file(*path, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn test_scan_extracts_entries_in_range() {
        let bytes = build_zip(&[
            ("logs/2026/01/01/a.json", r#"{"k":"v1"}"#),
            ("logs/2026/01/02/b.json", r#"{"k":"v2"}"#),
            ("logs/2026/01/05/c.json", r#"{"k":"v3"}"#),
        ]);

        let entries = scan(&bytes, "2026-01-01", "2026-01-02").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, "2026-01-01");
        assert_eq!(entries[1].content, r#"{"k":"v2"}"#);
    }

    #[test]
    fn test_range_is_inclusive_both_ends() {
        let bytes = build_zip(&[
            ("2026/01/01/a.json", "{}"),
            ("2026/01/03/b.json", "{}"),
        ]);
        let entries = scan(&bytes, "2026-01-01", "2026-01-03").unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_non_matching_paths_ignored() {
        let bytes = build_zip(&[
            ("foo/bar.json", r#"{"valid":"json"}"#),
            ("logs/2026/01/01/a.json", "{}"),
        ]);
        let entries = scan(&bytes, "2026-01-01", "2026-01-01").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "logs/2026/01/01/a.json");
    }

    #[test]
    fn test_no_matching_entries_error() {
        let bytes = build_zip(&[("foo/bar.json", "{}"), ("readme.txt", "hi")]);
        let err = scan(&bytes, "2026-01-01", "2026-01-01").unwrap_err();
        assert!(matches!(err, VerifyError::NoMatchingEntries));
    }

    #[test]
    fn test_no_entries_in_range_error() {
        let bytes = build_zip(&[("logs/2025/12/31/a.json", "{}")]);
        let err = scan(&bytes, "2026-01-01", "2026-01-01").unwrap_err();
        assert!(matches!(err, VerifyError::NoEntriesInRange));
    }

    #[test]
    fn test_invalid_archive_error() {
        let err = scan(b"definitely not a zip", "2026-01-01", "2026-01-01").unwrap_err();
        assert!(matches!(err, VerifyError::InvalidArchive(_)));
    }

    #[test]
    fn test_directory_entries_skipped() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buf);
            let options: FileOptions<()> = FileOptions::default();
            zip.add_directory("logs/2026/01/01", options).unwrap();
            zip.start_file("logs/2026/01/01/a.json", options).unwrap();
            zip.write_all(b"{}").unwrap();
            zip.finish().unwrap();
        }
        let entries = scan(&buf.into_inner(), "2026-01-01", "2026-01-01").unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_entry_date_pattern() {
        assert_eq!(
            entry_date("prefix/2026/01/05/abc.json").as_deref(),
            Some("2026-01-05")
        );
        assert_eq!(entry_date("2026/01/05/abc.json").as_deref(), Some("2026-01-05"));
        assert_eq!(entry_date("2026/01/05/.json"), None);
        assert_eq!(entry_date("2026/1/05/abc.json"), None);
        assert_eq!(entry_date("2026/01/05/abc.txt"), None);
        assert_eq!(entry_date("a/b/c.json"), None);
    }
}
