// src/extractors/registry.rs

// --- Imports ---
use crate::utils::error::ConfigurationError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

fn default_capture() -> usize {
    1
}

// --- Rule Descriptions (as loaded from configuration) ---

/// Plain description of a section rule, before compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub id: String,
    pub pattern: String,
    /// Which group of `pattern` constitutes the section. 0 is the whole match.
    #[serde(default = "default_capture")]
    pub capture: usize,
    /// Stop boundary for bounded rules. The section runs up to the first match of this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
}

impl RuleSpec {
    pub fn new(id: impl Into<String>, pattern: impl Into<String>, capture: usize) -> Self {
        Self {
            id: id.into(),
            pattern: pattern.into(),
            capture,
            stop: None,
        }
    }

    /// Turns this into a bounded rule ending at `stop`.
    pub fn bounded_by(mut self, stop: impl Into<String>) -> Self {
        self.stop = Some(stop.into());
        self
    }
}

/// Plain description of a repeating block kind (figures, tables, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub kind: String,
    pub begin: String,
    pub end: String,
}

impl BlockSpec {
    pub fn new(kind: impl Into<String>, begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            begin: begin.into(),
            end: end.into(),
        }
    }
}

// --- Compiled Rules ---

/// Sections span many lines, so `.` always matches newlines.
fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).dot_matches_new_line(true).build()
}

/// A compiled, immutable section rule.
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    id: String,
    pattern: Regex,
    capture: usize,
    stop: Option<Regex>,
}

impl ExtractionRule {
    pub fn compile(spec: &RuleSpec) -> Result<Self, ConfigurationError> {
        if spec.id.trim().is_empty() {
            return Err(ConfigurationError::EmptyIdentifier);
        }

        let pattern = compile(&spec.pattern).map_err(|source| ConfigurationError::InvalidPattern {
            id: spec.id.clone(),
            source,
        })?;

        // captures_len includes the implicit group 0
        let available = pattern.captures_len() - 1;
        if spec.capture > available {
            return Err(ConfigurationError::CaptureOutOfRange {
                id: spec.id.clone(),
                capture: spec.capture,
                available,
            });
        }

        let stop = spec
            .stop
            .as_deref()
            .map(compile)
            .transpose()
            .map_err(|source| ConfigurationError::InvalidBoundary {
                id: spec.id.clone(),
                source,
            })?;

        Ok(Self {
            id: spec.id.clone(),
            pattern,
            capture: spec.capture,
            stop,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn capture(&self) -> usize {
        self.capture
    }

    pub fn stop(&self) -> Option<&Regex> {
        self.stop.as_ref()
    }

    pub fn is_bounded(&self) -> bool {
        self.stop.is_some()
    }
}

/// A compiled block rule: `begin .*? end`, matched repeatedly.
#[derive(Debug, Clone)]
pub struct BlockRule {
    kind: String,
    pattern: Regex,
}

impl BlockRule {
    pub fn compile(spec: &BlockSpec) -> Result<Self, ConfigurationError> {
        if spec.kind.trim().is_empty() {
            return Err(ConfigurationError::EmptyIdentifier);
        }
        let joined = format!("(?:{}).*?(?:{})", spec.begin, spec.end);
        let pattern = compile(&joined).map_err(|source| ConfigurationError::InvalidBlock {
            kind: spec.kind.clone(),
            source,
        })?;
        Ok(Self {
            kind: spec.kind.clone(),
            pattern,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

// --- Registry ---

/// Ordered set of section rules and block rules.
///
/// Order is significant: it fixes iteration order of results and reports.
/// Registering an identifier twice replaces the earlier rule in its original slot.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    rules: Vec<ExtractionRule>,
    blocks: Vec<BlockRule>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from rule and block descriptions, in order.
    pub fn from_specs(rules: &[RuleSpec], blocks: &[BlockSpec]) -> Result<Self, ConfigurationError> {
        let mut registry = Self::new();
        for spec in rules {
            registry.register(spec)?;
        }
        for spec in blocks {
            registry.register_block(spec)?;
        }
        Ok(registry)
    }

    /// Compiles and registers a section rule.
    pub fn register(&mut self, spec: &RuleSpec) -> Result<(), ConfigurationError> {
        let rule = ExtractionRule::compile(spec)?;
        match self.rules.iter().position(|r| r.id == rule.id) {
            Some(slot) => {
                tracing::debug!("Replacing rule '{}' at position {}", rule.id, slot);
                self.rules[slot] = rule;
            }
            None => {
                tracing::trace!("Registering rule '{}'", rule.id);
                self.rules.push(rule);
            }
        }
        Ok(())
    }

    /// Compiles and registers a block rule, replacing any rule of the same kind.
    pub fn register_block(&mut self, spec: &BlockSpec) -> Result<(), ConfigurationError> {
        let block = BlockRule::compile(spec)?;
        match self.blocks.iter().position(|b| b.kind == block.kind) {
            Some(slot) => self.blocks[slot] = block,
            None => self.blocks.push(block),
        }
        Ok(())
    }

    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    pub fn blocks(&self) -> &[BlockRule] {
        &self.blocks
    }

    pub fn get(&self, id: &str) -> Option<&ExtractionRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
