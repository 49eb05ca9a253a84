// src/transforms/steps.rs
//! Individual text transforms.
//!
//! Every step is total and idempotent: running it on its own output changes nothing,
//! and input without the construct it targets comes back unchanged.

use crate::utils::error::ConfigurationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// --- Regex Patterns (Lazy Static) ---

// A \cite{ preceded by a text character, possibly through spaces/tabs.
// Opening brackets are excluded so `(\cite{x})` and `{\cite{x}}` stay untouched.
static CITE_ADJACENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<pre>[^~\s{(\[])[ \t]*\\cite\{").expect("Failed to compile CITE_ADJACENT_RE")
});

static CITE_PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"~\\cite\{(?P<first>[^}]+)\}[ \t]*~\\cite\{").expect("Failed to compile CITE_PAIR_RE")
});

static FIGURE_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bFig\.?~\\ref\{(?P<label>[^}]+)\}").expect("Failed to compile FIGURE_REF_RE")
});

static PARSTART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\IEEEPARstart\{(?P<first>[^}]*)\}\{(?P<rest>[^}]*)\}").expect("Failed to compile PARSTART_RE")
});

static MEMBERSHIP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\IEEEmembership\{[^}]*\}").expect("Failed to compile MEMBERSHIP_RE")
});

static KEYWORDS_ENV_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:begin|end)\{IEEEkeywords\}").expect("Failed to compile KEYWORDS_ENV_RE")
});

pub const DEFAULT_KEYWORD_SEPARATOR: &str = r"\sep";

fn default_separator() -> String {
    DEFAULT_KEYWORD_SEPARATOR.to_string()
}

/// One text-to-text conversion. Serialized with a `step` tag so pipelines can live in config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TransformStep {
    /// Unwraps `\IEEEPARstart`, drops `\IEEEmembership` and the IEEEkeywords environment markers.
    StripIeeeMacros,
    /// Joins a citation to the preceding word with `~`.
    CiteJoin,
    /// Collapses `~\cite{a}~\cite{b}` into `~\cite{a,b}`.
    MergeCitations,
    /// `Fig~\ref{..}` and `Fig.~\ref{..}` become `Figure~\ref{..}`.
    FigureReference,
    /// Comma-separated list to a list joined by `separator`, which must not contain a comma.
    KeywordSeparator {
        #[serde(default = "default_separator")]
        separator: String,
    },
    /// Keeps at most `max_chars` characters.
    Truncate { max_chars: usize },
}

impl TransformStep {
    pub fn keyword_separator() -> Self {
        TransformStep::KeywordSeparator {
            separator: default_separator(),
        }
    }

    /// Keyword separator step with a custom separator.
    pub fn keyword_separator_with(separator: &str) -> Result<Self, ConfigurationError> {
        let step = TransformStep::KeywordSeparator {
            separator: separator.to_string(),
        };
        step.validate()?;
        Ok(step)
    }

    /// Rejects parameters under which the step would not be idempotent.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            TransformStep::KeywordSeparator { separator } if separator.contains(',') => {
                Err(ConfigurationError::InvalidTransform {
                    step: self.name(),
                    reason: format!("separator {:?} contains a comma", separator),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransformStep::StripIeeeMacros => "strip_ieee_macros",
            TransformStep::CiteJoin => "cite_join",
            TransformStep::MergeCitations => "merge_citations",
            TransformStep::FigureReference => "figure_reference",
            TransformStep::KeywordSeparator { .. } => "keyword_separator",
            TransformStep::Truncate { .. } => "truncate",
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            TransformStep::StripIeeeMacros => strip_ieee_macros(text),
            TransformStep::CiteJoin => cite_join(text),
            TransformStep::MergeCitations => merge_citations(text),
            TransformStep::FigureReference => figure_reference(text),
            TransformStep::KeywordSeparator { separator } => keyword_separator(text, separator),
            TransformStep::Truncate { max_chars } => truncate(text, *max_chars),
        }
    }
}

pub fn cite_join(text: &str) -> String {
    CITE_ADJACENT_RE.replace_all(text, r"${pre}~\cite{").into_owned()
}

pub fn merge_citations(text: &str) -> String {
    let mut current = text.to_string();
    // Each pass merges non-overlapping pairs; chains of three or more need further passes.
    loop {
        let next = CITE_PAIR_RE.replace_all(&current, r"~\cite{${first},").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

pub fn figure_reference(text: &str) -> String {
    FIGURE_REF_RE.replace_all(text, r"Figure~\ref{${label}}").into_owned()
}

pub fn strip_ieee_macros(text: &str) -> String {
    let mut current = text.to_string();
    // Removing one macro can splice the halves of another together, so run to a fixed point.
    loop {
        let next = PARSTART_RE.replace_all(&current, "${first}${rest}");
        let next = MEMBERSHIP_RE.replace_all(&next, "");
        let next = KEYWORDS_ENV_RE.replace_all(&next, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

pub fn keyword_separator(text: &str, separator: &str) -> String {
    if !text.contains(',') {
        return text.to_string();
    }
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(&format!(" {} ", separator))
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
