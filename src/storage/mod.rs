// src/storage/mod.rs
pub mod summary;

use crate::extractors::ExtractionSet;
use crate::report::ExtractionReport;
use crate::utils::error::StorageError;
use std::fs;
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE: &str = "SUMMARY.md";
pub const METADATA_FILE: &str = "extraction_meta.json";

const HEADER_LINES: usize = 2;

/// Writes extracted material into an output directory and reads it back.
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Opens an existing directory without creating it.
    pub fn open<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();
        if !base_path.is_dir() {
            return Err(StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", base_path.display()),
            )));
        }
        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn section_path(&self, id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.tex", id))
    }

    /// Saves one section as `<id>.tex` behind a comment header.
    pub fn save_section(&self, id: &str, text: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.section_path(id);
        let mut contents = format!("% Extracted {}\n% Converted for the Elsevier template\n\n", id);
        contents.push_str(text);
        contents.push('\n');

        fs::write(&file_path, contents).map_err(StorageError::IoError)?;
        tracing::info!("Saved section '{}' to {}", id, file_path.display());
        Ok(file_path)
    }

    /// Saves all blocks of one kind into `<kind>_all.tex`, numbered in document order.
    pub fn save_blocks(&self, kind: &str, blocks: &[String]) -> Result<PathBuf, StorageError> {
        let file_path = self.section_path(&format!("{}_all", kind));
        let mut contents = format!("% All {} from the source manuscript\n% Found {} items\n\n", kind, blocks.len());
        for (i, block) in blocks.iter().enumerate() {
            contents.push_str(&format!("%% {} {}\n", capitalize(kind), i + 1));
            contents.push_str(block);
            contents.push_str("\n\n");
        }

        fs::write(&file_path, contents).map_err(StorageError::IoError)?;
        tracing::info!("Saved {} {} to {}", blocks.len(), kind, file_path.display());
        Ok(file_path)
    }

    /// Writes every found section and every non-empty block group of `set`.
    pub fn save_set(&self, set: &ExtractionSet) -> Result<Vec<PathBuf>, StorageError> {
        let mut written = Vec::new();
        for result in set.found() {
            if result.is_empty() {
                tracing::warn!("Section '{}' matched but is empty, not writing it", result.id);
                continue;
            }
            written.push(self.save_section(&result.id, result.text())?);
        }
        for group in set.blocks.iter().filter(|g| !g.blocks.is_empty()) {
            written.push(self.save_blocks(&group.kind, &group.blocks)?);
        }
        Ok(written)
    }

    /// Reads `<id>.tex` back without its leading comment header.
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load_section(&self, id: &str) -> Result<Option<String>, StorageError> {
        let file_path = self.section_path(id);
        if !file_path.exists() {
            tracing::debug!("No stored section at {}", file_path.display());
            return Ok(None);
        }
        let contents = fs::read_to_string(&file_path).map_err(StorageError::IoError)?;
        Ok(Some(strip_header(&contents)))
    }

    pub fn save_summary(&self, report: &ExtractionReport, title: Option<&str>) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(SUMMARY_FILE);
        fs::write(&file_path, summary::render_markdown(report, title)).map_err(StorageError::IoError)?;
        tracing::info!("Saved summary to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves report and run metadata in JSON format
    pub fn save_metadata(&self, report: &ExtractionReport, source: &Path) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(METADATA_FILE);

        let metadata = serde_json::json!({
            "source": source.display().to_string(),
            "sections_found": report.found_count(),
            "sections_empty": report.empty_count(),
            "sections_missing": report.not_found_count(),
            "limits_passed": report.all_limits_passed(),
            "report": report,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;
        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}

/// Removes the two comment lines and blank line that `save_section` and `save_blocks` write
/// ahead of the body. Files without that header come back whole.
fn strip_header(contents: &str) -> String {
    let mut rest = contents;
    for _ in 0..HEADER_LINES {
        match rest.split_once('\n') {
            Some((line, tail)) if line.starts_with("% ") => rest = tail,
            _ => return contents.trim_end().to_string(),
        }
    }
    rest.strip_prefix('\n').unwrap_or(rest).trim_end().to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
