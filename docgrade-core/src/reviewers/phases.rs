use super::policy::{ContentCheck, ContentMetric};
use super::*;
use crate::rules::citations::is_alphabetical;
use crate::rules::validation::{FormattingValidator, RuleOutcome};

// Issue categories
const STRUCTURE: &str = "Structure";
const GENERAL_FORMATTING: &str = "General Formatting";
const DEVELOPMENT_FORMATTING: &str = "Development Formatting";
const CONTENT: &str = "Content";
const REFERENCES: &str = "References";
const REFERENCE_FORMATTING: &str = "Reference Formatting";

/// Required sections by heading-marker containment, plus the heading bonus.
pub fn validate_structure(mut acc: ReviewAccumulator, ctx: &ReviewContext<'_>) -> ReviewAccumulator {
    tracing::info!("📋 Validating structure...");
    let structure = &ctx.policy.structure;
    let headings = ctx.data.heading_texts_upper();
    let mut earned = 0.0;

    for section in &structure.required {
        let found = headings.iter().any(|heading| {
            section
                .markers
                .iter()
                .any(|marker| heading.contains(&marker.to_uppercase()))
        });

        if found {
            earned += section.points;
            continue;
        }

        let kind = if section.severity == Severity::Critical {
            "required"
        } else {
            "important"
        };
        acc.push(
            Issue::new(
                STRUCTURE,
                section.severity,
                format!("Missing {} section: {}", kind, section.label),
            )
            .with_points(0.0, section.points),
        );
    }

    if let Some(bonus) = &structure.heading_bonus {
        if headings.is_empty() {
            acc.push(
                Issue::new(
                    STRUCTURE,
                    bonus.missing_severity,
                    "Document has no structured headings",
                )
                .with_points(0.0, bonus.max_points),
            );
        } else {
            earned += (headings.len() as f64 * bonus.per_heading).min(bonus.max_points);
        }
    }

    acc.record(SECTION_STRUCTURE, earned, structure.max_points)
}

fn push_violations(
    acc: &mut ReviewAccumulator,
    ctx: &ReviewContext<'_>,
    outcome: &RuleOutcome,
    category: &str,
    location: &str,
) {
    for violation in &outcome.violations {
        acc.push(
            Issue::new(
                category,
                violation.severity(),
                violation.describe(ctx.policy.humanize_values, ctx.config.general.cm_per_point),
            )
            .at(location),
        );
    }
}

/// General and development rules over the first paragraphs of the body.
pub fn validate_formatting(mut acc: ReviewAccumulator, ctx: &ReviewContext<'_>) -> ReviewAccumulator {
    tracing::info!("🎨 Validating formatting...");
    let validator = FormattingValidator::new(ctx.config);
    let mut earned = 0.0;
    let mut max = 0.0;

    for (idx, paragraph) in ctx
        .data
        .paragraphs
        .iter()
        .take(ctx.policy.formatting_sample)
        .enumerate()
    {
        let location = format!("Paragraph {}", idx + 1);
        let general = validator.validate_general(&paragraph.style);
        let development = validator.validate_development(&paragraph.style);

        earned += general.earned + development.earned;
        max += general.max + development.max;

        push_violations(&mut acc, ctx, &general, GENERAL_FORMATTING, &location);
        push_violations(&mut acc, ctx, &development, DEVELOPMENT_FORMATTING, &location);
    }

    acc.record(SECTION_FORMATTING, earned, max)
}

pub fn metric_value(metric: ContentMetric, data: &DocumentData) -> f64 {
    match metric {
        ContentMetric::ParagraphCount => data.paragraphs.len() as f64,
        ContentMetric::CitationCount => data.citations.len() as f64,
        ContentMetric::AverageParagraphLength => {
            if data.paragraphs.is_empty() {
                0.0
            } else {
                let characters: usize = data.paragraphs.iter().map(|p| p.text.chars().count()).sum();
                characters as f64 / data.paragraphs.len() as f64
            }
        }
        ContentMetric::FigureCount => data.figures.len() as f64,
        ContentMetric::ListCount => data.lists.len() as f64,
        ContentMetric::WordCount => data.total_words() as f64,
    }
}

fn content_issue(check: &ContentCheck, value: f64) -> String {
    check.message.replace("{value}", &value.round().to_string())
}

/// Tiered awards for the policy's content metrics.
pub fn validate_content(mut acc: ReviewAccumulator, ctx: &ReviewContext<'_>) -> ReviewAccumulator {
    tracing::info!("📝 Validating content...");
    let mut earned = 0.0;
    let mut max = 0.0;

    for check in &ctx.policy.content {
        let value = metric_value(check.metric, ctx.data);
        let award = check.ladder.evaluate(value);
        earned += award.points;
        max += award.max;

        if let Some(severity) = award.severity {
            acc.push(
                Issue::new(CONTENT, severity, content_issue(check, value))
                    .with_points(award.points, award.max),
            );
        }
    }

    acc.record(SECTION_CONTENT, earned, max)
}

/// Reference count, per-entry formatting and alphabetical order.
pub fn validate_references(mut acc: ReviewAccumulator, ctx: &ReviewContext<'_>) -> ReviewAccumulator {
    tracing::info!("📚 Validating references...");
    let policy = &ctx.policy.references;
    let references = &ctx.data.references;
    let mut earned = 0.0;
    let mut max = policy.base_max;

    let count = references.len();
    let award = policy.count.evaluate(count as f64);
    if references.is_empty() {
        acc.push(
            Issue::new(REFERENCES, policy.count.floor.severity, "No reference list found")
                .with_points(0.0, award.max),
        );
        return acc.record(SECTION_REFERENCES, earned, max);
    }

    earned += award.points;
    if let Some(severity) = award.severity {
        acc.push(
            Issue::new(
                REFERENCES,
                severity,
                format!(
                    "Few references found: {} (recommended minimum: {})",
                    count,
                    policy.count.full_credit_min()
                ),
            )
            .with_points(award.points, award.max),
        );
    }

    let validator = FormattingValidator::new(ctx.config);
    for (idx, reference) in references.iter().enumerate() {
        let outcome = validator.validate_reference(&reference.style);
        earned += outcome.earned;
        max += outcome.max;
        push_violations(
            &mut acc,
            ctx,
            &outcome,
            REFERENCE_FORMATTING,
            &format!("Reference {}", idx + 1),
        );
    }

    let texts: Vec<&str> = references.iter().map(|r| r.text.as_str()).collect();
    if is_alphabetical(&texts) {
        earned += policy.alphabetical_points;
    } else {
        acc.push(
            Issue::new(
                REFERENCES,
                Severity::Medium,
                "References are not in alphabetical order",
            )
            .with_points(0.0, policy.alphabetical_points),
        );
    }

    acc.record(SECTION_REFERENCES, earned, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Heading, Paragraph, Reference, ResolvedStyle};
    use pretty_assertions::assert_eq;

    fn heading(text: &str) -> Heading {
        Heading {
            level: 1,
            text: text.to_string(),
            style: ResolvedStyle::default(),
            section: 1,
        }
    }

    fn paragraph(text: &str, style: ResolvedStyle) -> Paragraph {
        Paragraph {
            text: text.to_string(),
            style,
            section: 1,
            class_name: "MsoNormal".to_string(),
        }
    }

    fn reference(text: &str) -> Reference {
        Reference {
            text: text.to_string(),
            style: ResolvedStyle {
                text_align: Some("left".to_string()),
                ..Default::default()
            },
        }
    }

    fn run(
        phase: fn(ReviewAccumulator, &ReviewContext<'_>) -> ReviewAccumulator,
        document_type: DocumentType,
        data: &DocumentData,
    ) -> ReviewAccumulator {
        let config = ReviewConfig::default();
        let context = ReviewContext {
            data,
            config: &config,
            policy: config.policy(document_type),
        };
        phase(ReviewAccumulator::new(), &context)
    }

    #[test]
    fn test_monograph_structure_groups_and_bonus() {
        let data = DocumentData {
            headings: vec![
                heading("1 Introdução"),
                heading("2 Fundamentação Teórica"),
                heading("3 Desenvolvimento"),
                heading("4 Considerações Finais"),
                heading("Referências"),
                heading("Apêndice A"),
            ],
            ..Default::default()
        };

        let acc = run(validate_structure, DocumentType::Monograph, &data);
        let score = &acc.scores.sections[SECTION_STRUCTURE];
        // 5 groups x 25 + bonus capped at 10
        assert_eq!(score.earned, 135.0);
        assert_eq!(score.max, 100.0);
        assert!(acc.issues.is_empty());
    }

    #[test]
    fn test_monograph_without_headings() {
        let acc = run(validate_structure, DocumentType::Monograph, &DocumentData::default());

        assert_eq!(acc.scores.sections[SECTION_STRUCTURE].earned, 0.0);
        assert_eq!(acc.issues.len(), 6);
        assert!(acc.issues.iter().all(|i| i.severity == Severity::Critical));
        assert_eq!(
            acc.issues[1].description,
            "Missing required section: FUNDAMENTAÇÃO OU REFERENCIAL TEÓRICO"
        );
        assert_eq!(acc.issues[5].description, "Document has no structured headings");
        assert_eq!(acc.issues[5].max, 10.0);
    }

    #[test]
    fn test_article_structure_critical_and_optional() {
        let data = DocumentData {
            headings: vec![heading("RESUMO"), heading("ABSTRACT"), heading("1 INTRODUÇÃO")],
            ..Default::default()
        };

        let acc = run(validate_structure, DocumentType::Article, &data);
        assert_eq!(acc.scores.sections[SECTION_STRUCTURE].earned, 60.0);

        let missing: Vec<_> = acc
            .issues
            .iter()
            .map(|i| (i.severity, i.description.as_str()))
            .collect();
        assert_eq!(
            missing,
            vec![
                (Severity::Critical, "Missing required section: REFERÊNCIAS"),
                (Severity::High, "Missing important section: METODOLOGIA"),
                (Severity::High, "Missing important section: RESULTADOS"),
                (Severity::High, "Missing important section: CONCLUSÃO"),
            ]
        );
    }

    #[test]
    fn test_formatting_samples_leading_paragraphs() {
        let style = ResolvedStyle {
            font_size: Some("12.0pt".to_string()),
            font_family: Some("Arial".to_string()),
            line_height: Some("150%".to_string()),
            text_align: Some("justify".to_string()),
            ..Default::default()
        };
        let mut paragraphs: Vec<_> = (0..12).map(|_| paragraph("ok", style.clone())).collect();
        paragraphs.push(paragraph("unchecked", ResolvedStyle::default()));
        let data = DocumentData {
            paragraphs,
            ..Default::default()
        };

        let acc = run(validate_formatting, DocumentType::Monograph, &data);
        let score = &acc.scores.sections[SECTION_FORMATTING];
        assert_eq!(score.earned, 400.0);
        assert_eq!(score.max, 400.0);
        assert!(acc.issues.is_empty());
    }

    #[test]
    fn test_formatting_issue_text_and_location() {
        let style = ResolvedStyle {
            font_size: Some("12pt".to_string()),
            font_family: Some("Arial".to_string()),
            line_height: Some("100%".to_string()),
            text_align: Some("justify".to_string()),
            ..Default::default()
        };
        let data = DocumentData {
            paragraphs: vec![paragraph("x", style)],
            ..Default::default()
        };

        let monograph = run(validate_formatting, DocumentType::Monograph, &data);
        assert_eq!(monograph.issues.len(), 1);
        assert_eq!(monograph.issues[0].section, "Development Formatting");
        assert_eq!(monograph.issues[0].location.as_deref(), Some("Paragraph 1"));
        assert_eq!(
            monograph.issues[0].description,
            "Line Spacing: expected \"1.5 lines\", found \"single\""
        );

        let article = run(validate_formatting, DocumentType::Article, &data);
        assert_eq!(
            article.issues[0].description,
            "Line Spacing: expected \"150%\", found \"100%\""
        );
    }

    #[test]
    fn test_content_tiers_and_issues() {
        let data = DocumentData {
            paragraphs: (0..12)
                .map(|_| paragraph(&"a".repeat(150), ResolvedStyle::default()))
                .collect(),
            ..Default::default()
        };

        let acc = run(validate_content, DocumentType::Monograph, &data);
        let score = &acc.scores.sections[SECTION_CONTENT];
        // paragraphs 20 (partial), citations 10 (floor), length 15 (partial), figures 10 (floor)
        assert_eq!(score.earned, 55.0);
        assert_eq!(score.max, 100.0);

        let issues: Vec<_> = acc
            .issues
            .iter()
            .map(|i| (i.severity, i.description.as_str(), i.earned, i.max))
            .collect();
        assert_eq!(
            issues,
            vec![
                (Severity::Low, "Document has few paragraphs: 12", 20.0, 30.0),
                (Severity::High, "Few citations found: 0", 10.0, 30.0),
                (
                    Severity::Low,
                    "Paragraphs are too short (average: 150 characters)",
                    15.0,
                    20.0
                ),
                (Severity::Low, "Document has no figures or captions", 10.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_empty_reference_list_scores_zero() {
        let acc = run(validate_references, DocumentType::Monograph, &DocumentData::default());
        let score = &acc.scores.sections[SECTION_REFERENCES];

        assert_eq!(score.earned, 0.0);
        assert_eq!(score.percentage, 0.0);
        assert_eq!(acc.issues.len(), 1);
        assert_eq!(acc.issues[0].severity, Severity::Critical);
    }

    #[test]
    fn test_references_count_format_and_order() {
        let data = DocumentData {
            references: vec![
                reference("SILVA, J. Métodos. 2020."),
                reference("COSTA, A. Redes. 2019."),
            ],
            ..Default::default()
        };

        let acc = run(validate_references, DocumentType::Monograph, &data);
        let score = &acc.scores.sections[SECTION_REFERENCES];
        // floor 10 + 2 x (5 + 5) formatting; order check fails
        assert_eq!(score.earned, 30.0);
        assert_eq!(score.max, 120.0);

        let descriptions: Vec<_> = acc.issues.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Few references found: 2 (recommended minimum: 15)",
                "References are not in alphabetical order",
            ]
        );
    }
}
