// src/assembly.rs
//! Fills a journal template with previously extracted sections.
//!
//! Placeholders are `{{id}}` or `{{id | max: N}}`; the latter runs the
//! `truncate` transform so length limits stay explicit and caller supplied.

use crate::transforms::TransformStep;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Bundled Elsevier `elsarticle` skeleton.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/elsarticle_skeleton.tex");

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*(?P<id>[A-Za-z0-9_\-]+)\s*(?:\|\s*max\s*:\s*(?P<max>\d+)\s*)?\}\}")
        .expect("Failed to compile PLACEHOLDER_RE")
});

/// Written next to the assembled document when figures were extracted.
pub const FIGURE_HELPER_FILE: &str = "figures_helper.tex";

/// Stored id of the collected figures.
pub const FIGURES_ID: &str = "figures_all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub id: String,
    pub max_chars: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub text: String,
    /// Placeholder ids with no value, in template order, deduplicated.
    pub missing: Vec<String>,
}

/// Placeholders of `template` in order of appearance.
pub fn placeholders(template: &str) -> Vec<Placeholder> {
    PLACEHOLDER_RE
        .captures_iter(template)
        .map(|caps| Placeholder {
            id: caps["id"].to_string(),
            max_chars: caps.name("max").and_then(|m| m.as_str().parse().ok()),
        })
        .collect()
}

/// Replaces every placeholder with `lookup(id)`; missing values become "".
pub fn fill<F>(template: &str, mut lookup: F) -> Assembled
where
    F: FnMut(&str) -> Option<String>,
{
    let mut missing: Vec<String> = Vec::new();
    let text = PLACEHOLDER_RE.replace_all(template, |caps: &Captures| {
        let id = &caps["id"];
        let Some(value) = lookup(id) else {
            if !missing.iter().any(|m| m == id) {
                tracing::warn!("No content for placeholder '{}'", id);
                missing.push(id.to_string());
            }
            return String::new();
        };
        match caps.name("max").and_then(|m| m.as_str().parse::<usize>().ok()) {
            Some(max_chars) => {
                let limited = TransformStep::Truncate { max_chars }.apply(&value);
                if limited.len() < value.len() {
                    tracing::info!("Placeholder '{}' truncated to {} characters", id, max_chars);
                }
                limited
            }
            None => value,
        }
    });

    Assembled {
        text: text.into_owned(),
        missing,
    }
}

/// Wraps the collected figures with notes on moving them into `main_file` by hand.
pub fn figure_helper(figures: &str, main_file: &str) -> String {
    format!(
        "% Figure integration helper\n\
         % Copy the figures you need from below into {main}\n\
         \n\
         {figures}\n\
         \n\
         % Usage:\n\
         % 1. Select the figures to include in the final paper\n\
         % 2. Copy them into the matching sections of {main}\n\
         % 3. Check that every graphics file they load is present\n\
         % 4. Update figure references in the text\n",
        main = main_file,
        figures = figures.trim_end(),
    )
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn values() -> HashMap<&'static str, String> {
        HashMap::from([
            ("abstract", "We propose a method.".to_string()),
            ("methodology", "0123456789".to_string()),
        ])
    }

    #[test]
    fn placeholders_are_listed_in_order() {
        let found = placeholders("{{abstract}} x {{ methodology | max: 30 }} {{ abstract }}");
        assert_eq!(
            found,
            vec![
                Placeholder { id: "abstract".into(), max_chars: None },
                Placeholder { id: "methodology".into(), max_chars: Some(30) },
                Placeholder { id: "abstract".into(), max_chars: None },
            ]
        );
    }

    #[test]
    fn fill_substitutes_and_truncates() {
        let vals = values();
        let out = fill(
            "\\begin{abstract}\n{{abstract}}\n\\end{abstract}\n{{methodology|max:4}}",
            |id| vals.get(id).cloned(),
        );
        assert_eq!(out.text, "\\begin{abstract}\nWe propose a method.\n\\end{abstract}\n0123");
        assert!(out.missing.is_empty());
    }

    #[test]
    fn missing_values_are_reported_once() {
        let vals = values();
        let out = fill("{{results}} and {{results}} and {{abstract}}", |id| vals.get(id).cloned());
        assert_eq!(out.text, " and  and We propose a method.");
        assert_eq!(out.missing, vec!["results".to_string()]);
    }

    #[test]
    fn latex_braces_are_left_alone() {
        let out = fill("\\title{{\\bf X}} \\journal{KBS}", |_| Some("never".to_string()));
        assert_eq!(out.text, "\\title{{\\bf X}} \\journal{KBS}");
    }

    #[test]
    fn figure_helper_wraps_figures_with_notes() {
        let figures = "%% Figures 1\n\\begin{figure}A\\end{figure}\n";
        let helper = figure_helper(figures, "main_integrated.tex");

        assert!(helper.starts_with("% Figure integration helper\n% Copy the figures you need from below into main_integrated.tex\n\n%% Figures 1\n"));
        assert!(helper.contains("\\begin{figure}A\\end{figure}\n\n% Usage:\n"));
        assert!(helper.contains("% 2. Copy them into the matching sections of main_integrated.tex\n"));
        assert!(helper.ends_with("% 4. Update figure references in the text\n"));
    }

    #[test]
    fn bundled_template_has_core_placeholders() {
        let ids: Vec<String> = placeholders(DEFAULT_TEMPLATE).into_iter().map(|p| p.id).collect();
        for expected in ["title", "abstract", "keywords", "introduction", "conclusion"] {
            assert!(ids.iter().any(|id| id == expected), "template lacks {{{{{expected}}}}}");
        }
    }
}
