//! Match directory layout
//!
//! A match lives in its own directory named after the video id:
//!
//! ```text
//! matches/<video_id>/
//!     metadata.json
//!     ground_truth.json
//!     results/*.json
//! ```

use crate::error::CliError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One match directory
#[derive(Debug, Clone)]
pub struct MatchDirectory {
    root: PathBuf,
}

impl MatchDirectory {
    /// Match directory rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the ground-truth document
    pub fn ground_truth_path(&self) -> PathBuf {
        self.root.join("ground_truth.json")
    }

    /// Result documents, newest name first
    ///
    /// Result files are named with a leading timestamp, so reverse name order
    /// puts the latest run first.
    pub fn result_files(&self) -> Result<Vec<PathBuf>> {
        let results_dir = self.root.join("results");
        if !results_dir.is_dir() {
            return Err(CliError::FileNotFound(results_dir.display().to_string()).into());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&results_dir)
            .with_context(|| format!("Failed to read directory: {}", results_dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }

        if files.is_empty() {
            anyhow::bail!("No result files found in {}", results_dir.display());
        }

        files.sort_by(|a, b| b.cmp(a));
        Ok(files)
    }
}

/// A listed match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEntry {
    /// Directory name
    pub video_id: String,
    /// Title from `metadata.json`, or the directory name
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    title: Option<String>,
}

/// List match directories under `root` that carry a `metadata.json`
///
/// A missing `root` yields an empty list.
pub fn list_matches(root: &Path) -> Result<Vec<MatchEntry>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    for entry in
        fs::read_dir(root).with_context(|| format!("Failed to read directory: {}", root.display()))?
    {
        let path = entry?.path();
        if path.is_dir() && path.join("metadata.json").is_file() {
            dirs.push(path);
        }
    }
    dirs.sort();

    let mut matches = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let video_id = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let metadata_path = dir.join("metadata.json");
        let content = fs::read_to_string(&metadata_path)
            .with_context(|| format!("Failed to read file: {}", metadata_path.display()))?;
        let metadata: Metadata = serde_json::from_str(&content)
            .with_context(|| format!("Invalid metadata: {}", metadata_path.display()))?;

        matches.push(MatchEntry {
            title: metadata.title.unwrap_or_else(|| video_id.clone()),
            video_id,
        });
    }

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_match(root: &Path, id: &str, metadata: &str) -> PathBuf {
        let dir = root.join(id);
        fs::create_dir_all(dir.join("results")).unwrap();
        fs::write(dir.join("metadata.json"), metadata).unwrap();
        dir
    }

    #[test]
    fn test_list_matches_sorted_with_title_fallback() {
        let temp_dir = TempDir::new().unwrap();
        make_match(temp_dir.path(), "zz9", r#"{"title": "Final"}"#);
        make_match(temp_dir.path(), "aa1", "{}");
        fs::create_dir(temp_dir.path().join("no_metadata")).unwrap();

        let matches = list_matches(temp_dir.path()).unwrap();

        assert_eq!(
            matches,
            vec![
                MatchEntry {
                    video_id: "aa1".into(),
                    title: "aa1".into()
                },
                MatchEntry {
                    video_id: "zz9".into(),
                    title: "Final".into()
                },
            ]
        );
    }

    #[test]
    fn test_list_missing_root() {
        assert!(list_matches(Path::new("/nonexistent/matches"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_result_files_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let dir = make_match(temp_dir.path(), "abc", "{}");
        for name in ["20250101_run.json", "20250301_run.json", "notes.md"] {
            fs::write(dir.join("results").join(name), "{}").unwrap();
        }

        let files = MatchDirectory::new(&dir).result_files().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["20250301_run.json", "20250101_run.json"]);
        assert_eq!(
            MatchDirectory::new(&dir).ground_truth_path(),
            dir.join("ground_truth.json")
        );
    }

    #[test]
    fn test_result_files_empty() {
        let temp_dir = TempDir::new().unwrap();
        let dir = make_match(temp_dir.path(), "abc", "{}");

        let err = MatchDirectory::new(&dir).result_files().unwrap_err();
        assert!(err.to_string().contains("No result files found"));
    }
}
