// src/extractors/section.rs

// --- Imports ---
use super::registry::{BlockRule, ExtractionRule, PatternRegistry};
use crate::utils::error::InputError;
use serde::Serialize;
use std::fmt;
use std::ops::Range;

// --- Data Structures ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Found,
    NotFound,
}

/// Notes attached to a result that matched but is not a clean capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnostic {
    /// The capture group was absent or held only whitespace.
    EmptyCapture,
    /// A bounded rule found no stop boundary and ran to end of document.
    Unterminated,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EmptyCapture => write!(f, "empty capture"),
            Diagnostic::Unterminated => write!(f, "unterminated: no boundary found"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub id: String,
    pub outcome: Outcome,
    /// Trimmed captured text. `None` when the rule did not match.
    pub text: Option<String>,
    /// Byte range of `text` within the source document.
    pub span: Option<Range<usize>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ExtractionResult {
    fn not_found(id: &str) -> Self {
        Self {
            id: id.to_string(),
            outcome: Outcome::NotFound,
            text: None,
            span: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.outcome == Outcome::Found
    }

    /// Found, but nothing usable was captured.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.contains(&Diagnostic::EmptyCapture)
    }

    /// Captured text, or "" when not found.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// All occurrences of one block kind, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockGroup {
    pub kind: String,
    pub blocks: Vec<String>,
}

/// Everything extracted from one document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExtractionSet {
    pub results: Vec<ExtractionResult>,
    pub blocks: Vec<BlockGroup>,
}

impl ExtractionSet {
    pub fn result(&self, id: &str) -> Option<&ExtractionResult> {
        self.results.iter().find(|r| r.id == id)
    }

    /// Blocks of the given kind; empty when the kind is not configured.
    pub fn blocks(&self, kind: &str) -> &[String] {
        self.blocks
            .iter()
            .find(|g| g.kind == kind)
            .map(|g| g.blocks.as_slice())
            .unwrap_or(&[])
    }

    pub fn found(&self) -> impl Iterator<Item = &ExtractionResult> {
        self.results.iter().filter(|r| r.is_found())
    }
}

// --- Main Extractor Structure ---

/// Applies a [`PatternRegistry`] to document text.
///
/// Holds no per-document state; one extractor can serve any number of documents.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    max_input_bytes: Option<usize>,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects documents larger than `limit` bytes before any pattern runs.
    pub fn with_max_input_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_input_bytes = limit;
        self
    }

    /// Extracts every section rule and block rule of `registry` from `text`.
    ///
    /// Missing sections are `NotFound` results, not errors. The only failure is an oversized input.
    pub fn extract(&self, text: &str, registry: &PatternRegistry) -> Result<ExtractionSet, InputError> {
        if let Some(limit) = self.max_input_bytes {
            if text.len() > limit {
                tracing::error!("Document is {} bytes, limit is {}", text.len(), limit);
                return Err(InputError::TooLarge { len: text.len(), limit });
            }
        }

        tracing::debug!(
            "Extracting {} section rule(s) and {} block kind(s) from {} bytes",
            registry.len(),
            registry.blocks().len(),
            text.len()
        );

        let results: Vec<ExtractionResult> = registry
            .rules()
            .iter()
            .map(|rule| extract_section(rule, text))
            .collect();

        let blocks: Vec<BlockGroup> = registry
            .blocks()
            .iter()
            .map(|rule| extract_blocks(rule, text))
            .collect();

        let found = results.iter().filter(|r| r.is_found()).count();
        tracing::info!(
            "Extraction finished: {}/{} sections found, {} block kind(s)",
            found,
            results.len(),
            blocks.len()
        );

        Ok(ExtractionSet { results, blocks })
    }
}

/// First-match extraction of a single rule.
fn extract_section(rule: &ExtractionRule, text: &str) -> ExtractionResult {
    let Some(caps) = rule.pattern().captures(text) else {
        tracing::debug!("Rule '{}': not found", rule.id());
        return ExtractionResult::not_found(rule.id());
    };

    let mut diagnostics = Vec::new();
    let Some(whole) = caps.get(0) else {
        return ExtractionResult::not_found(rule.id());
    };
    let group = caps.get(rule.capture());

    let region: Option<Range<usize>> = match rule.stop() {
        None => group.map(|m| m.range()),
        Some(stop) => group.map(|m| {
            // Boundary search starts one char past the match start, or at the group if later
            let first_char = text[whole.start()..].chars().next().map_or(0, char::len_utf8);
            let from = m.start().max(whole.start() + first_char);
            let end = match stop.find_at(text, from) {
                Some(boundary) => boundary.start(),
                None => {
                    tracing::warn!("Rule '{}': no stop boundary after offset {}", rule.id(), from);
                    diagnostics.push(Diagnostic::Unterminated);
                    text.len()
                }
            };
            m.start()..end.max(m.start())
        }),
    };

    let span = region.map(|r| trimmed_range(text, r));
    let captured = span.as_ref().map(|r| &text[r.clone()]).unwrap_or("");

    if captured.is_empty() {
        tracing::debug!("Rule '{}': matched with an empty capture", rule.id());
        diagnostics.push(Diagnostic::EmptyCapture);
    } else {
        tracing::debug!("Rule '{}': found {} bytes", rule.id(), captured.len());
    }

    ExtractionResult {
        id: rule.id().to_string(),
        outcome: Outcome::Found,
        text: Some(captured.to_string()),
        span: span.filter(|r| !r.is_empty()),
        diagnostics,
    }
}

/// Narrows `range` to exclude surrounding whitespace.
fn trimmed_range(text: &str, range: Range<usize>) -> Range<usize> {
    let slice = &text[range.clone()];
    let start = range.start + (slice.len() - slice.trim_start().len());
    let end = range.start + slice.trim_end().len();
    start..end.max(start)
}

/// Find-all extraction of one block kind.
fn extract_blocks(rule: &BlockRule, text: &str) -> BlockGroup {
    let blocks: Vec<String> = rule
        .pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    tracing::debug!("Block kind '{}': {} occurrence(s)", rule.kind(), blocks.len());
    BlockGroup {
        kind: rule.kind().to_string(),
        blocks,
    }
}
