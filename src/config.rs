// src/config.rs
//! Engine configuration: rule table, block table, transform plan and report limits.

use crate::extractors::{BlockSpec, Extractor, PatternRegistry, RuleSpec};
use crate::report::{ReportBuilder, ReportLimits};
use crate::transforms::TransformPlan;
use crate::utils::error::{AppError, ConfigurationError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Bundled rule table for IEEE manuscripts headed to an Elsevier template.
pub const DEFAULT_CONFIG_YAML: &str = include_str!("../config/ieee_to_elsevier.yaml");

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Documents larger than this are rejected before extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_input_bytes: Option<usize>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
    #[serde(default)]
    pub transforms: TransformPlan,
    #[serde(default)]
    pub limits: ReportLimits,
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigurationError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        tracing::info!("Loading configuration from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Ok(Self::from_yaml_str(&contents)?)
    }

    /// The bundled configuration, or the file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => {
                tracing::debug!("Using bundled configuration");
                Ok(Self::bundled()?)
            }
        }
    }

    pub fn bundled() -> Result<Self, ConfigurationError> {
        Self::from_yaml_str(DEFAULT_CONFIG_YAML)
    }

    /// Compiles every rule; the first bad pattern aborts with its rule named.
    pub fn registry(&self) -> Result<PatternRegistry, ConfigurationError> {
        PatternRegistry::from_specs(&self.rules, &self.blocks)
    }

    pub fn extractor(&self) -> Extractor {
        Extractor::new().with_max_input_bytes(self.max_input_bytes)
    }

    pub fn report_builder(&self) -> ReportBuilder {
        ReportBuilder::with_limits(self.limits.clone())
    }
}
