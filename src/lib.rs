// src/lib.rs
//! Declarative section extraction for LaTeX manuscripts.
//!
//! A [`PatternRegistry`] of regex rules is applied by an [`Extractor`] to produce an
//! [`ExtractionSet`]; a [`TransformPlan`] rewrites the captured text for the target
//! journal and a [`ReportBuilder`] summarizes the run. Storage, template assembly and
//! the CLI sit around this core.

pub mod assembly;
pub mod config;
pub mod extractors;
pub mod report;
pub mod storage;
pub mod transforms;
pub mod utils;

pub use config::EngineConfig;
pub use extractors::{
    BlockSpec, Diagnostic, ExtractionResult, ExtractionRule, ExtractionSet, Extractor, Outcome,
    PatternRegistry, RuleSpec,
};
pub use report::{ExtractionReport, ReportBuilder, ReportLimits};
pub use transforms::{TransformPipeline, TransformPlan, TransformStep};
pub use utils::error::{AppError, ConfigurationError, InputError, StorageError};
