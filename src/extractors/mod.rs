// src/extractors/mod.rs
pub mod registry;
pub mod section;

// Re-export key extraction types for convenience
pub use registry::{BlockRule, BlockSpec, ExtractionRule, PatternRegistry, RuleSpec};
pub use section::{
    BlockGroup,
    Diagnostic,
    ExtractionResult,
    ExtractionSet,
    Extractor,
    Outcome,
};
