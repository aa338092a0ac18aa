//! CSV result sink.
//!
//! Rows accumulate across runs: the file is opened in append mode and the
//! header is written only when the file is brand new. Anything already on
//! disk is trusted to carry the header from an earlier run.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// One harvested result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    #[serde(rename = "search_term")]
    pub query: String,
    pub url: String,
    pub engine: String,
}

impl SearchResult {
    #[must_use]
    pub fn new(
        query: impl Into<String>,
        url: impl Into<String>,
        engine: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            url: url.into(),
            engine: engine.into(),
        }
    }
}

const HEADER: [&str; 3] = ["search_term", "url", "engine"];

/// Append `rows` to the CSV at `path`, creating the file and any missing
/// parent directories on first use. A fresh file gets the header even when
/// there are no rows to write.
pub fn append_rows(path: &Path, rows: &[SearchResult]) -> Result<()> {
    let new_file = !path.exists();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    // serialize() emits no header row when the slice is empty, so fresh
    // files get theirs written explicitly.
    if new_file {
        writer.write_record(HEADER).context("writing csv header")?;
    }
    for row in rows {
        writer.serialize(row).context("writing csv row")?;
    }
    writer.flush().context("flushing csv output")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rows() -> Vec<SearchResult> {
        vec![
            SearchResult::new("site:a.com", "https://a.com/x", "google"),
            SearchResult::new("site:a.com", "https://a.com/y", "duckduckgo"),
        ]
    }

    #[test]
    fn test_fresh_file_gets_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        append_rows(&path, &rows()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "search_term,url,engine");
        assert_eq!(lines[1], "site:a.com,https://a.com/x,google");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_second_append_skips_the_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        append_rows(&path, &rows()).unwrap();
        append_rows(
            &path,
            &[SearchResult::new("intext:pw", "https://b.com/", "google")],
        )
        .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.matches("search_term,url,engine").count(), 1);
        assert_eq!(written.lines().count(), 4);
    }

    #[test]
    fn test_missing_parent_directories_are_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("out.csv");
        append_rows(&path, &rows()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_zero_rows_still_writes_the_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        append_rows(&path, &[]).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.trim_end(), "search_term,url,engine");
    }

    #[test]
    fn test_fields_containing_commas_are_quoted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quoted.csv");
        append_rows(
            &path,
            &[SearchResult::new(
                "intext:a,b",
                "https://c.com/?q=1,2",
                "google",
            )],
        )
        .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"intext:a,b\""));
        assert!(written.contains("\"https://c.com/?q=1,2\""));
    }
}
