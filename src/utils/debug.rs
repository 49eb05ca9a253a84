// src/utils/debug.rs
use crate::extractors::ExtractionSet;
use crate::utils::error::AppError;
use std::fs;
use std::path::Path;

/// Copy of `document` with `%>>>`/`%<<<` comment lines around every captured section.
///
/// Markers sit on their own lines, so the annotated file still compiles as LaTeX.
pub fn annotate(document: &str, set: &ExtractionSet) -> String {
    // (offset, order, marker); closing markers sort before opening ones at the same offset
    let mut marks: Vec<(usize, u8, String)> = Vec::new();
    for result in &set.results {
        if let Some(span) = &result.span {
            marks.push((span.start, 1, format!("\n%>>> BEGIN {}\n", result.id)));
            let notes = if result.diagnostics.is_empty() {
                String::new()
            } else {
                let joined: Vec<String> = result.diagnostics.iter().map(ToString::to_string).collect();
                format!(" ({})", joined.join("; "))
            };
            marks.push((span.end, 0, format!("\n%<<< END {}{}\n", result.id, notes)));
        }
    }
    marks.sort_by_key(|m| (m.0, m.1));

    let mut annotated = String::with_capacity(document.len() + marks.len() * 32);
    let mut last_pos = 0;
    for (pos, _, marker) in marks {
        if pos > last_pos {
            annotated.push_str(&document[last_pos..pos]);
            last_pos = pos;
        }
        annotated.push_str(&marker);
    }
    annotated.push_str(&document[last_pos..]);

    let missing: Vec<&str> = set.results.iter().filter(|r| !r.is_found()).map(|r| r.id.as_str()).collect();
    if !missing.is_empty() {
        annotated.push_str(&format!("\n%%% not found: {}\n", missing.join(", ")));
    }
    annotated
}

/// Writes [`annotate`]'s output to `path`, creating parent directories.
pub fn save_annotated(document: &str, set: &ExtractionSet, path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, annotate(document, set))?;
    tracing::info!("Saved annotated document to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{Extractor, PatternRegistry, RuleSpec};

    #[test]
    fn markers_wrap_captured_text() {
        let registry = PatternRegistry::from_specs(
            &[
                RuleSpec::new("title", r"\\title\{([^}]+)\}", 1),
                RuleSpec::new("tail", r"(Closing)", 1).bounded_by("NEVER"),
                RuleSpec::new("absent", r"\\absent\{(.)\}", 1),
            ],
            &[],
        )
        .unwrap();
        let doc = "\\title{Paper} body. Closing words";
        let set = Extractor::new().extract(doc, &registry).unwrap();
        let out = annotate(doc, &set);

        assert!(out.contains("\\title{\n%>>> BEGIN title\nPaper\n%<<< END title\n}"));
        assert!(out.contains("%<<< END tail (unterminated: no boundary found)"));
        assert!(out.ends_with("%%% not found: absent\n"));
    }

    #[test]
    fn document_without_matches_is_unchanged() {
        let registry = PatternRegistry::new();
        let set = Extractor::new().extract("plain", &registry).unwrap();
        assert_eq!(annotate("plain", &set), "plain");
    }

    #[test]
    fn save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug/annotated.tex");
        let set = ExtractionSet::default();
        save_annotated("x", &set, &path).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "x");
    }
}
