// src/report/mod.rs
//! Read-only summaries of an [`ExtractionSet`].

use crate::extractors::{ExtractionResult, ExtractionSet};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Items of a keyword-like list are separated by commas or `\sep`.
static ITEM_SPLIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*(?:,|\\sep\b)\s*").expect("Failed to compile ITEM_SPLIT_RE")
});

/// Number of whitespace-delimited tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of non-empty items in a comma or `\sep` separated list.
pub fn item_count(text: &str) -> usize {
    ITEM_SPLIT_RE
        .split(text)
        .filter(|item| !item.trim().is_empty())
        .count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRange {
    pub min: usize,
    pub max: usize,
}

/// Caller-supplied limits checked by the report (e.g. abstract ≤ 250 words).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportLimits {
    #[serde(default)]
    pub max_words: BTreeMap<String, usize>,
    #[serde(default)]
    pub items: BTreeMap<String, ItemRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Found,
    Empty,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitKind {
    Words,
    Items,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitCheck {
    pub kind: LimitKind,
    pub actual: usize,
    pub min: usize,
    pub max: usize,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub id: String,
    pub status: SectionStatus,
    pub word_count: usize,
    /// Word count after transforms, when the report was built with transformed text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformed_word_count: Option<usize>,
    pub diagnostics: Vec<String>,
    pub limits: Vec<LimitCheck>,
}

impl SectionSummary {
    pub fn passed(&self) -> bool {
        self.limits.iter().all(|l| l.passed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    pub kind: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub sections: Vec<SectionSummary>,
    pub blocks: Vec<BlockSummary>,
}

impl ExtractionReport {
    pub fn found_count(&self) -> usize {
        self.count(SectionStatus::Found)
    }

    pub fn empty_count(&self) -> usize {
        self.count(SectionStatus::Empty)
    }

    pub fn not_found_count(&self) -> usize {
        self.count(SectionStatus::NotFound)
    }

    fn count(&self, status: SectionStatus) -> usize {
        self.sections.iter().filter(|s| s.status == status).count()
    }

    pub fn section(&self, id: &str) -> Option<&SectionSummary> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn block_count(&self, kind: &str) -> usize {
        self.blocks
            .iter()
            .find(|b| b.kind == kind)
            .map(|b| b.count)
            .unwrap_or(0)
    }

    /// True when every configured limit passed.
    pub fn all_limits_passed(&self) -> bool {
        self.sections.iter().all(SectionSummary::passed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    limits: ReportLimits,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: ReportLimits) -> Self {
        Self { limits }
    }

    pub fn build(&self, set: &ExtractionSet) -> ExtractionReport {
        self.build_inner(set, None)
    }

    /// Like [`build`](Self::build), also recording word counts of `transformed`.
    /// Limits are checked against the transformed text.
    pub fn build_with(&self, set: &ExtractionSet, transformed: &ExtractionSet) -> ExtractionReport {
        self.build_inner(set, Some(transformed))
    }

    fn build_inner(&self, set: &ExtractionSet, transformed: Option<&ExtractionSet>) -> ExtractionReport {
        let sections = set
            .results
            .iter()
            .map(|result| {
                let after = transformed.and_then(|t| t.result(&result.id));
                self.summarize(result, after)
            })
            .collect();

        let blocks = set
            .blocks
            .iter()
            .map(|g| BlockSummary {
                kind: g.kind.clone(),
                count: g.blocks.len(),
            })
            .collect();

        ExtractionReport { sections, blocks }
    }

    fn summarize(&self, result: &ExtractionResult, transformed: Option<&ExtractionResult>) -> SectionSummary {
        let status = if !result.is_found() {
            SectionStatus::NotFound
        } else if result.is_empty() {
            SectionStatus::Empty
        } else {
            SectionStatus::Found
        };

        let checked = transformed.unwrap_or(result).text();
        let mut limits = Vec::new();

        if let Some(&max) = self.limits.max_words.get(&result.id) {
            let actual = word_count(checked);
            limits.push(LimitCheck {
                kind: LimitKind::Words,
                actual,
                min: 0,
                max,
                passed: status == SectionStatus::Found && actual <= max,
            });
        }
        if let Some(range) = self.limits.items.get(&result.id) {
            let actual = item_count(checked);
            limits.push(LimitCheck {
                kind: LimitKind::Items,
                actual,
                min: range.min,
                max: range.max,
                passed: status == SectionStatus::Found && (range.min..=range.max).contains(&actual),
            });
        }

        SectionSummary {
            id: result.id.clone(),
            status,
            word_count: word_count(result.text()),
            transformed_word_count: transformed.map(|t| word_count(t.text())),
            diagnostics: result.diagnostics.iter().map(ToString::to_string).collect(),
            limits,
        }
    }
}
