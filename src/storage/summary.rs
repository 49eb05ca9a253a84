// src/storage/summary.rs
use crate::report::{ExtractionReport, LimitKind, SectionStatus};
use std::fmt::Write;

/// Renders the human-readable summary document for an extraction run.
pub fn render_markdown(report: &ExtractionReport, title: Option<&str>) -> String {
    let mut out = String::from("# Extraction Summary\n\n");
    let _ = writeln!(out, "**Title:** {}\n", title.unwrap_or("Not found"));

    out.push_str("## Sections\n\n");
    out.push_str("| Section | Status | Words | Notes |\n");
    out.push_str("|---|---|---|---|\n");
    for section in &report.sections {
        let status = match section.status {
            SectionStatus::Found => "found",
            SectionStatus::Empty => "empty",
            SectionStatus::NotFound => "not found",
        };
        let words = match section.transformed_word_count {
            Some(after) if after != section.word_count => format!("{} ({} after transforms)", section.word_count, after),
            _ => section.word_count.to_string(),
        };
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            section.id,
            status,
            words,
            section.diagnostics.join("; ")
        );
    }

    let checks: Vec<_> = report
        .sections
        .iter()
        .flat_map(|s| s.limits.iter().map(move |l| (s.id.as_str(), l)))
        .collect();
    if !checks.is_empty() {
        out.push_str("\n## Limits\n\n");
        for (id, check) in checks {
            let verdict = if check.passed { "OK" } else { "FAIL" };
            let _ = match check.kind {
                LimitKind::Words => writeln!(out, "- {}: {} words (max {}): {}", id, check.actual, check.max, verdict),
                LimitKind::Items => writeln!(
                    out,
                    "- {}: {} items (allowed {}-{}): {}",
                    id, check.actual, check.min, check.max, verdict
                ),
            };
        }
    }

    out.push_str("\n## Content Status\n\n");
    let _ = writeln!(out, "- Sections found: {}", report.found_count());
    let _ = writeln!(out, "- Sections empty: {}", report.empty_count());
    let _ = writeln!(out, "- Sections not found: {}", report.not_found_count());
    for block in &report.blocks {
        let _ = writeln!(out, "- {}: {}", block.kind, block.count);
    }

    out
}
