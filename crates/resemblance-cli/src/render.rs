//! Plain-text rendering of engine results.

use resemblance_core::display::{display_label, format_percent, ResemblanceLevel};
use resemblance_core::{
    ChildResemblance, Face, MatrixStatistics, PairwiseMatrix, SimilarityResult, ValidationReport,
};
use std::fmt::Write;

pub fn resemblance(photo: &str, results: &[ChildResemblance]) -> String {
    let mut out = String::new();
    if results.is_empty() {
        let _ = writeln!(out, "{photo}: label at least one parent and one child to compare");
        return out;
    }

    let _ = writeln!(out, "{photo}");
    for r in results {
        let best_label = display_label(&r.best_parent, best_ordinal(r));
        let _ = writeln!(
            out,
            "  {} ({}) most resembles {} ({}): {} {}",
            display_label(&r.child, r.child_index),
            r.child.id,
            best_label,
            r.best_parent.id,
            format_percent(r.best_score),
            ResemblanceLevel::from_score(r.best_score),
        );
        for p in r.ranked() {
            let _ = writeln!(
                out,
                "    {:<10} {:>5}  distance {:.3}{}",
                display_label(&p.parent, p.parent_index),
                format_percent(p.score),
                p.result.distance,
                flags(&p.result),
            );
        }
    }
    out
}

fn best_ordinal(r: &ChildResemblance) -> usize {
    r.per_parent_scores
        .iter()
        .find(|p| p.parent.id == r.best_parent.id)
        .map_or(0, |p| p.parent_index)
}

fn flags(result: &SimilarityResult) -> &'static str {
    if result.degraded {
        "  (comparison failed)"
    } else if result.is_likely_match {
        "  likely match"
    } else {
        ""
    }
}

pub fn matrix(
    photo: &str,
    faces: &[Face],
    matrix: &PairwiseMatrix,
    stats: Option<&MatrixStatistics>,
) -> String {
    let labels: Vec<String> = faces.iter().map(|f| f.id.clone()).collect();
    let width = labels.iter().map(String::len).max().unwrap_or(0).max(6);

    let mut out = String::new();
    let _ = writeln!(out, "{photo}");
    let _ = write!(out, "  {:width$}", "");
    for label in &labels {
        let _ = write!(out, " {label:>width$}");
    }
    let _ = writeln!(out);

    for (i, label) in labels.iter().enumerate() {
        let _ = write!(out, "  {label:width$}");
        for j in 0..matrix.len() {
            let cell = matrix.get(i, j).map(format_percent).unwrap_or_default();
            let _ = write!(out, " {cell:>width$}");
        }
        let _ = writeln!(out);
    }

    if let Some(best) = matrix.most_similar_pair() {
        let _ = writeln!(
            out,
            "  most similar pair: {} / {} at {}",
            best.face1_id,
            best.face2_id,
            format_percent(best.score)
        );
    }
    if let Some(s) = stats {
        let _ = writeln!(
            out,
            "  {} comparisons: mean {:.3}, median {:.3}, min {:.3}, max {:.3}, std dev {:.3}, range {:.3}",
            s.total_comparisons, s.mean, s.median, s.min, s.max, s.standard_deviation, s.range
        );
    }
    out
}

pub fn comparison(a: &Face, b: &Face, result: &SimilarityResult) -> String {
    format!(
        "{} vs {}: {} {} (distance {:.4}, cosine {:.4}){}\n",
        a.id,
        b.id,
        format_percent(result.score),
        ResemblanceLevel::from_score(result.score),
        result.distance,
        result.cosine,
        flags(result),
    )
}

pub fn validation(report: &ValidationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: consistency {} ({} of {} children agree)",
        if report.is_valid { "passed" } else { "inconsistent" },
        format_percent(report.consistency_score),
        report.consistent_children,
        report.children_compared,
    );
    for rec in &report.recommendations {
        let _ = writeln!(out, "  - {rec}");
    }
    out
}
