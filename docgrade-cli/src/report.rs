//! Terminal rendering for reports, statistics and the rule table.

use docgrade_core::reviewers::policy::CitationPolicy;
use docgrade_core::*;
use std::io::{self, Write};

const RULE_WIDTH: usize = 80;

fn rule(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

pub fn write_report(out: &mut impl Write, report: &Report) -> io::Result<()> {
    writeln!(out)?;
    rule(out)?;
    writeln!(
        out,
        "REVIEW REPORT - {}",
        report.document_type.as_str().to_uppercase()
    )?;
    rule(out)?;

    writeln!(
        out,
        "\nTotal Score: {}/{} ({}%)",
        report.scores.total, report.scores.max_score, report.scores.percentage
    )?;
    writeln!(out, "Grade: {}\n", report.grade_label)?;

    writeln!(out, "Score by Section:")?;
    for (section, score) in &report.scores.sections {
        writeln!(
            out,
            "  {}: {}/{} ({}%)",
            section, score.earned, score.max, score.percentage
        )?;
    }

    let summary = &report.summary;
    writeln!(out, "\nIssues Found: {}", summary.total)?;
    writeln!(out, "  Critical: {}", summary.critical)?;
    writeln!(out, "  High: {}", summary.high)?;
    writeln!(out, "  Medium: {}", summary.medium)?;
    writeln!(out, "  Low: {}", summary.low)?;

    if !report.issues.is_empty() {
        writeln!(out, "\nIssue Details:")?;
        for (idx, issue) in report.issues.iter().enumerate() {
            writeln!(
                out,
                "\n{}. [{}] {}",
                idx + 1,
                issue.severity.to_string().to_uppercase(),
                issue.section
            )?;
            writeln!(out, "   {}", issue.description)?;
            if let Some(location) = &issue.location {
                writeln!(out, "   Location: {}", location)?;
            }
            if issue.max > 0.0 {
                writeln!(out, "   Points: {}/{}", issue.earned, issue.max)?;
            }
        }
    }

    writeln!(out)?;
    rule(out)?;
    writeln!(out)
}

pub fn write_statistics(out: &mut impl Write, stats: &DocumentStatistics) -> io::Result<()> {
    writeln!(out, "\n📊 DOCUMENT STATISTICS")?;
    rule(out)?;

    writeln!(out, "\nStructure:")?;
    writeln!(out, "  Sections: {}", stats.sections)?;
    writeln!(out, "  Headings: {}", stats.headings)?;
    writeln!(out, "  Paragraphs: {}", stats.paragraphs)?;
    writeln!(out, "  Lists: {}", stats.lists)?;
    writeln!(out, "  Figures/Captions: {}", stats.figures)?;

    writeln!(out, "\nContent:")?;
    writeln!(out, "  Total Words: {}", stats.total_words)?;
    writeln!(out, "  Citations: {}", stats.citations)?;
    writeln!(out, "  References: {}", stats.references)?;

    writeln!(out, "\nMetrics:")?;
    writeln!(
        out,
        "  Words per Paragraph: {}",
        stats.words_per_paragraph().round()
    )?;
    writeln!(
        out,
        "  Citations per Paragraph: {:.2}",
        stats.citations_per_paragraph()
    )?;
    writeln!(
        out,
        "  Citations per Reference: {:.2}",
        stats.citations_per_reference()
    )?;

    writeln!(out)?;
    rule(out)?;
    writeln!(out)
}

pub fn write_types(out: &mut impl Write, config: &ReviewConfig) -> io::Result<()> {
    writeln!(out, "\n📚 SUPPORTED DOCUMENT TYPES")?;
    rule(out)?;

    for (idx, document_type) in DocumentType::ALL.iter().enumerate() {
        let policy = config.policy(*document_type);
        writeln!(out, "\n{}. {} ({})", idx + 1, policy.label, document_type)?;

        let sections: Vec<&str> = policy
            .structure
            .required
            .iter()
            .map(|s| s.label.as_str())
            .collect();
        writeln!(out, "   Structure: {}", sections.join(", "))?;
    }

    writeln!(out)?;
    rule(out)?;
    writeln!(out, "\nTip: use --type to choose the type manually")?;
    writeln!(out, "     Example: docgrade review document.htm --type article\n")
}

pub fn write_rules(out: &mut impl Write, config: &ReviewConfig) -> io::Result<()> {
    let general = &config.general;
    let development = &config.development;
    let references = &config.references;

    writeln!(out, "\n📖 ABNT RULES CHECKED")?;
    rule(out)?;

    writeln!(out, "\nGeneral Formatting:")?;
    writeln!(out, "  ✓ Font size: {}pt", general.font_size)?;
    writeln!(out, "  ✓ Font: {}", general.fonts.join(" or "))?;
    writeln!(out, "  ✓ Line spacing: {}%", development.line_spacing)?;
    writeln!(out, "  ✓ Alignment: {}", development.alignment)?;
    writeln!(
        out,
        "  ✓ Paragraph indent: {}pt ({:.2}cm)",
        development.indent,
        development.indent * general.cm_per_point
    )?;
    if let Some(margin) = development.margin_bottom {
        writeln!(out, "  ✓ Bottom margin: {}pt", margin)?;
    }

    writeln!(out, "\nStructure:")?;
    writeln!(out, "  ✓ Required sections present")?;
    writeln!(out, "  ✓ Heading hierarchy")?;

    writeln!(out, "\nReferences:")?;
    writeln!(out, "  ✓ Alphabetical order")?;
    writeln!(out, "  ✓ Line spacing: {}%", references.line_spacing)?;
    writeln!(out, "  ✓ Alignment: {}", references.alignment)?;
    writeln!(out, "  ✓ Minimum number of references")?;

    writeln!(out, "\nCitations:")?;
    writeln!(out, "  ✓ (AUTHOR, YEAR) format")?;
    for document_type in DocumentType::ALL {
        let check = match config.policy(document_type).citations {
            CitationPolicy::Consistency { .. } => "matched against the reference list",
            CitationPolicy::Density { .. } => "density and coverage of the reference list",
        };
        writeln!(out, "  ✓ {}: {}", document_type, check)?;
    }

    writeln!(out, "\nContent:")?;
    writeln!(out, "  ✓ Document length")?;
    writeln!(out, "  ✓ Average paragraph length")?;
    writeln!(out, "  ✓ Figures and tables")?;

    writeln!(out)?;
    rule(out)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_report_lists_issues_with_points() {
        let config = ReviewConfig::default();
        let report = DocumentReviewer::new(DocumentType::Article, &DocumentData::default(), &config).review();

        let text = render(|out| write_report(out, &report));
        assert!(text.contains("REVIEW REPORT - ARTICLE"));
        assert!(text.contains("[CRITICAL] Structure"));
        assert!(text.contains("Missing required section: RESUMO"));
        assert!(text.contains("Points: 0/20"));
    }

    #[test]
    fn test_statistics_without_paragraphs() {
        let text = render(|out| write_statistics(out, &DocumentStatistics::default()));
        assert!(text.contains("Citations per Paragraph: 0.00"));
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn test_rules_follow_config() {
        let mut config = ReviewConfig::default();
        config.general.fonts = vec!["Times New Roman".to_string()];

        let text = render(|out| write_rules(out, &config));
        assert!(text.contains("Font: Times New Roman\n"));
        assert!(text.contains("Paragraph indent: 35.4pt (1.25cm)"));
    }
}
