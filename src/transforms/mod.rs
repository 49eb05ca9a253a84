// src/transforms/mod.rs
pub mod steps;

use crate::extractors::ExtractionSet;
use crate::utils::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use steps::TransformStep;

/// Applies the pipeline's steps left to right, each to the output of the previous one.
pub fn apply(text: &str, pipeline: &TransformPipeline) -> String {
    pipeline
        .steps
        .iter()
        .fold(text.to_string(), |acc, step| step.apply(&acc))
}

/// Element-wise [`apply`]; order and count are preserved.
pub fn apply_each(texts: &[String], pipeline: &TransformPipeline) -> Vec<String> {
    texts.iter().map(|t| apply(t, pipeline)).collect()
}

/// An ordered list of transform steps.
///
/// Every step is valid and `truncate` can only come last, so applying a
/// pipeline to its own output changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<TransformStep>", into = "Vec<TransformStep>")]
pub struct TransformPipeline {
    steps: Vec<TransformStep>,
}

impl TransformPipeline {
    pub fn new(steps: Vec<TransformStep>) -> Result<Self, ConfigurationError> {
        for (idx, step) in steps.iter().enumerate() {
            step.validate()?;
            if matches!(step, TransformStep::Truncate { .. }) && idx + 1 < steps.len() {
                return Err(ConfigurationError::InvalidTransform {
                    step: step.name(),
                    reason: format!("must be the last step, found at position {} of {}", idx + 1, steps.len()),
                });
            }
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    pub fn apply(&self, text: &str) -> String {
        apply(text, self)
    }

    pub fn apply_each(&self, texts: &[String]) -> Vec<String> {
        apply_each(texts, self)
    }
}

impl TryFrom<Vec<TransformStep>> for TransformPipeline {
    type Error = ConfigurationError;

    fn try_from(steps: Vec<TransformStep>) -> Result<Self, Self::Error> {
        Self::new(steps)
    }
}

impl From<TransformPipeline> for Vec<TransformStep> {
    fn from(pipeline: TransformPipeline) -> Self {
        pipeline.steps
    }
}

/// Which pipeline applies where: a default for sections, per-section overrides, and one for blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransformPlan {
    #[serde(default)]
    pub default: TransformPipeline,
    #[serde(default)]
    pub sections: BTreeMap<String, TransformPipeline>,
    #[serde(default)]
    pub blocks: TransformPipeline,
}

impl TransformPlan {
    pub fn pipeline_for(&self, section_id: &str) -> &TransformPipeline {
        self.sections.get(section_id).unwrap_or(&self.default)
    }

    /// Transformed copy of `set`. Texts of found sections and every block are rewritten;
    /// outcomes, spans and diagnostics are carried over as extracted.
    pub fn apply_set(&self, set: &ExtractionSet) -> ExtractionSet {
        let mut transformed = set.clone();
        for result in &mut transformed.results {
            if let Some(text) = result.text.as_mut() {
                *text = self.pipeline_for(&result.id).apply(text);
            }
        }
        for group in &mut transformed.blocks {
            group.blocks = self.blocks.apply_each(&group.blocks);
        }
        transformed
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{Extractor, PatternRegistry, RuleSpec};
    use proptest::prelude::*;

    fn latex_steps() -> Vec<TransformStep> {
        vec![
            TransformStep::StripIeeeMacros,
            TransformStep::CiteJoin,
            TransformStep::MergeCitations,
            TransformStep::FigureReference,
        ]
    }

    fn pipeline(steps: Vec<TransformStep>) -> TransformPipeline {
        TransformPipeline::new(steps).unwrap()
    }

    #[test]
    fn steps_compose_left_to_right() {
        let steps = pipeline(vec![TransformStep::keyword_separator(), TransformStep::Truncate { max_chars: 7 }]);
        assert_eq!(apply("a, b, c", &steps), r"a \sep ");
    }

    #[test]
    fn truncate_before_other_steps_is_rejected() {
        let err = TransformPipeline::new(vec![
            TransformStep::Truncate { max_chars: 5 },
            TransformStep::keyword_separator(),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidTransform { step: "truncate", .. }));
        assert!(err.to_string().contains("position 1 of 2"));
    }

    #[test]
    fn comma_separator_is_rejected_in_a_pipeline() {
        let bad = TransformStep::KeywordSeparator { separator: "x,y".to_string() };
        let err = TransformPipeline::new(vec![TransformStep::CiteJoin, bad]).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidTransform { step: "keyword_separator", .. }));
    }

    #[test]
    fn invalid_pipeline_in_yaml_fails_to_load() {
        let truncate_first = serde_yaml::from_str::<TransformPlan>(
            "default:\n  - step: truncate\n    max_chars: 5\n  - step: keyword_separator\n",
        );
        assert!(truncate_first.is_err());

        let comma_separator = serde_yaml::from_str::<TransformPlan>(
            "sections:\n  keywords:\n    - step: keyword_separator\n      separator: 'x,y'\n",
        );
        assert!(comma_separator.unwrap_err().to_string().contains("contains a comma"));
    }

    #[test]
    fn empty_step_list_is_identity() {
        assert_eq!(apply("unchanged \\cite{x}", &TransformPipeline::default()), "unchanged \\cite{x}");
    }

    #[test]
    fn citation_pipeline_applied_twice_is_stable() {
        let steps = pipeline(latex_steps());
        let once = apply(r"text\cite{X}", &steps);
        assert_eq!(once, r"text~\cite{X}");
        assert_eq!(apply(&once, &steps), once);
    }

    #[test]
    fn full_pipeline_on_paragraph() {
        let input = r"\IEEEPARstart{W}{e} extend prior work \cite{a}\cite{b}; see Fig.~\ref{fig:one}.";
        let out = apply(input, &pipeline(latex_steps()));
        assert_eq!(out, r"We extend prior work~\cite{a,b}; see Figure~\ref{fig:one}.");
    }

    #[test]
    fn apply_each_preserves_order_and_count() {
        let blocks = vec![
            "\\begin{figure}Fig~\\ref{a}\\end{figure}".to_string(),
            String::new(),
            "plain".to_string(),
        ];
        let out = pipeline(latex_steps()).apply_each(&blocks);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], "\\begin{figure}Figure~\\ref{a}\\end{figure}");
        assert_eq!(out[1], "");
        assert_eq!(out[2], "plain");
    }

    #[test]
    fn plan_picks_section_override() {
        let mut plan = TransformPlan {
            default: pipeline(vec![TransformStep::CiteJoin]),
            ..Default::default()
        };
        plan.sections
            .insert("keywords".to_string(), pipeline(vec![TransformStep::keyword_separator()]));

        let registry = PatternRegistry::from_specs(
            &[
                RuleSpec::new("keywords", r"K\{([^}]*)\}", 1),
                RuleSpec::new("body", r"B\{(.*)\}", 1),
                RuleSpec::new("absent", r"NOPE(.)", 1),
            ],
            &[],
        )
        .unwrap();
        let set = Extractor::new()
            .extract(r"K{x, y} B{see \cite{z}}", &registry)
            .unwrap();

        let transformed = plan.apply_set(&set);
        assert_eq!(transformed.result("keywords").unwrap().text(), r"x \sep y");
        assert_eq!(transformed.result("body").unwrap().text(), r"see~\cite{z}");
        assert!(transformed.result("absent").unwrap().text.is_none());
        // source set untouched
        assert_eq!(set.result("keywords").unwrap().text(), "x, y");
    }

    #[test]
    fn plan_deserializes_from_yaml() {
        let plan: TransformPlan = serde_yaml::from_str(
            "default:\n  - step: cite_join\nsections:\n  keywords:\n    - step: keyword_separator\n      separator: ';'\n",
        )
        .unwrap();
        assert_eq!(plan.default.steps(), &[TransformStep::CiteJoin]);
        assert_eq!(plan.pipeline_for("keywords").apply("a,b"), "a ; b");
        assert!(plan.blocks.steps().is_empty());
    }

    fn latex_fragment() -> impl Strategy<Value = String> {
        let tokens = prop::sample::select(vec![
            "word", " ", "\t", "\n", "~", ",", "{", "}", "(", "Fig", "Fig.", "Figure",
            "\\cite{a}", "\\cite{b,c}", "~\\cite{d}", "Fig~\\ref{f}", "Fig.~\\ref{g:1}",
            "\\IEEEPARstart{T}{he}", "\\IEEEmembership{Fellow}", "\\begin{IEEEkeywords}",
        ]);
        prop::collection::vec(tokens, 0..24).prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn latex_pipeline_is_idempotent(text in latex_fragment()) {
            let steps = pipeline(latex_steps());
            let once = apply(&text, &steps);
            prop_assert_eq!(apply(&once, &steps), once);
        }

        #[test]
        fn keyword_pipeline_is_idempotent(text in "[a-z ,\t\n]{0,40}", sep in "[a-z;|\\\\]{0,4}") {
            let steps = pipeline(vec![
                TransformStep::StripIeeeMacros,
                TransformStep::keyword_separator_with(&sep).unwrap(),
            ]);
            let once = apply(&text, &steps);
            prop_assert_eq!(apply(&once, &steps), once);
        }

        #[test]
        fn truncate_last_is_idempotent(text in latex_fragment(), max in 0usize..40) {
            let mut steps = latex_steps();
            steps.push(TransformStep::Truncate { max_chars: max });
            let steps = pipeline(steps);
            let once = apply(&text, &steps);
            prop_assert!(once.chars().count() <= max);
            prop_assert_eq!(apply(&once, &steps), once);
        }

        #[test]
        fn apply_is_deterministic(text in latex_fragment()) {
            let steps = pipeline(latex_steps());
            prop_assert_eq!(apply(&text, &steps), apply(&text, &steps));
        }
    }
}
