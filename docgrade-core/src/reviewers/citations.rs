use super::policy::{CitationPolicy, TierLadder};
use super::*;
use crate::rules::citations::match_citations;

const CONSISTENCY: &str = "Citations vs References";
const CITATIONS: &str = "Citations";

/// Last phase: consistency matching or density ratios, depending on the policy.
pub fn validate_citations(acc: ReviewAccumulator, ctx: &ReviewContext<'_>) -> ReviewAccumulator {
    match &ctx.policy.citations {
        CitationPolicy::Consistency {
            max_points,
            points_per_match,
            unmatched_max,
            unused_max,
        } => validate_consistency(acc, ctx, *max_points, *points_per_match, *unmatched_max, *unused_max),
        CitationPolicy::Density {
            max_points,
            coverage,
            density,
        } => validate_density(acc, ctx, *max_points, coverage, density),
    }
}

fn validate_consistency(
    mut acc: ReviewAccumulator,
    ctx: &ReviewContext<'_>,
    max_points: f64,
    points_per_match: f64,
    unmatched_max: f64,
    unused_max: f64,
) -> ReviewAccumulator {
    tracing::info!("🔗 Checking citations against references...");
    let citations = &ctx.data.citations;
    let references = &ctx.data.references;
    let matches = match_citations(citations, references);

    if !matches.skipped.is_empty() {
        tracing::debug!("   {} citations without an author/year pair", matches.skipped.len());
    }

    for &idx in &matches.unmatched {
        let citation = &citations[idx];
        acc.push(
            Issue::new(
                CONSISTENCY,
                Severity::High,
                format!("Citation not found in references: {}", citation.full),
            )
            .at(format!("Paragraph {}", citation.paragraph_index + 1))
            .with_points(0.0, unmatched_max),
        );
    }

    for &idx in &matches.unused_references {
        acc.push(
            Issue::new(
                CONSISTENCY,
                Severity::Medium,
                format!("Reference not cited in the text: {}", references[idx].text),
            )
            .with_points(0.0, unused_max),
        );
    }

    let earned = (matches.matched.len() as f64 * points_per_match).min(max_points);
    acc.record(SECTION_CONSISTENCY, earned, max_points)
}

fn validate_density(
    mut acc: ReviewAccumulator,
    ctx: &ReviewContext<'_>,
    max_points: f64,
    coverage: &TierLadder,
    density: &TierLadder,
) -> ReviewAccumulator {
    tracing::info!("📖 Checking citation density...");
    let citations = ctx.data.citations.len();
    let references = ctx.data.references.len();
    let paragraphs = ctx.data.paragraphs.len();
    let mut earned = 0.0;

    let coverage_ratio = if references == 0 {
        1.0
    } else {
        citations as f64 / references as f64
    };
    let award = coverage.evaluate(coverage_ratio);
    earned += award.points;
    if let Some(severity) = award.severity {
        acc.push(
            Issue::new(
                CITATIONS,
                severity,
                format!(
                    "Few citations relative to references: {} citations vs {} references",
                    citations, references
                ),
            )
            .with_points(award.points, award.max),
        );
    }

    let density_ratio = if paragraphs == 0 {
        0.0
    } else {
        citations as f64 / paragraphs as f64
    };
    let award = density.evaluate(density_ratio);
    earned += award.points;
    if let Some(severity) = award.severity {
        acc.push(
            Issue::new(
                CITATIONS,
                severity,
                format!(
                    "Low citation density: {:.1}% of paragraphs",
                    density_ratio * 100.0
                ),
            )
            .with_points(award.points, award.max),
        );
    }

    acc.record(SECTION_CITATIONS, earned, max_points)
}
