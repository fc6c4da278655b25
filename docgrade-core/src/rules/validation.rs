use super::engine::*;
use crate::config::ReviewConfig;
use crate::types::{ResolvedStyle, Severity};
use serde::{Deserialize, Serialize};

/// The individual checks, each with a fixed severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormattingRule {
    FontSize,
    FontFamily,
    LineSpacing,
    Alignment,
    Indent,
    BottomMargin,
    ReferenceSpacing,
    ReferenceAlignment,
}

impl FormattingRule {
    pub fn name(&self) -> &'static str {
        match self {
            FormattingRule::FontSize => "Font Size",
            FormattingRule::FontFamily => "Font Family",
            FormattingRule::LineSpacing => "Line Spacing",
            FormattingRule::Alignment => "Text Alignment",
            FormattingRule::Indent => "Paragraph Indent",
            FormattingRule::BottomMargin => "Bottom Margin",
            FormattingRule::ReferenceSpacing => "Reference Spacing",
            FormattingRule::ReferenceAlignment => "Reference Alignment",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FormattingRule::FontSize => Severity::Medium,
            FormattingRule::FontFamily => Severity::High,
            FormattingRule::LineSpacing => Severity::High,
            FormattingRule::Alignment => Severity::Medium,
            FormattingRule::Indent => Severity::Low,
            FormattingRule::BottomMargin => Severity::Low,
            FormattingRule::ReferenceSpacing => Severity::Medium,
            FormattingRule::ReferenceAlignment => Severity::Low,
        }
    }

    fn unit(&self) -> Unit {
        match self {
            FormattingRule::FontSize => Unit::FontPoints,
            FormattingRule::Indent | FormattingRule::BottomMargin => Unit::Points,
            FormattingRule::LineSpacing | FormattingRule::ReferenceSpacing => Unit::Percent,
            FormattingRule::FontFamily
            | FormattingRule::Alignment
            | FormattingRule::ReferenceAlignment => Unit::Keyword,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    FontPoints,
    Points,
    Percent,
    Keyword,
}

/// A failed check, rendered into issue text by the reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule: FormattingRule,
    pub check: RuleCheck,
}

impl RuleViolation {
    pub fn severity(&self) -> Severity {
        self.rule.severity()
    }

    /// `Font Size: expected "12pt", found "14pt"`. With `humanize`, keywords,
    /// spacing and lengths are spelled out ("justified", "1.5 lines", "1.25 cm").
    pub fn describe(&self, humanize: bool, cm_per_point: f64) -> String {
        format!(
            "{}: expected \"{}\", found \"{}\"",
            self.rule.name(),
            self.render(&self.check.expected, humanize, cm_per_point),
            self.render(&self.check.actual, humanize, cm_per_point),
        )
    }

    fn render(&self, value: &RuleValue, humanize: bool, cm_per_point: f64) -> String {
        match (self.rule.unit(), value) {
            (_, RuleValue::Missing) => value.to_string(),
            (Unit::Points, RuleValue::Number(n)) if humanize => {
                format!("{} cm", round_to(n * cm_per_point, 2))
            }
            (Unit::Points | Unit::FontPoints, RuleValue::Number(n)) => format!("{}pt", n),
            (Unit::Percent, RuleValue::Number(n)) if humanize => humanize_spacing(*n),
            (Unit::Percent, RuleValue::Number(n)) => format!("{}%", n),
            (Unit::Keyword, RuleValue::Text(t)) if humanize => humanize_alignment(t),
            (_, other) => other.to_string(),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn humanize_spacing(percent: f64) -> String {
    if (percent - 100.0).abs() < f64::EPSILON {
        "single".to_string()
    } else if (percent - 150.0).abs() < f64::EPSILON {
        "1.5 lines".to_string()
    } else if (percent - 200.0).abs() < f64::EPSILON {
        "double".to_string()
    } else {
        format!("multiple ({}%)", percent)
    }
}

fn humanize_alignment(keyword: &str) -> String {
    match keyword {
        "justify" => "justified".to_string(),
        "center" => "centered".to_string(),
        "left" => "left-aligned".to_string(),
        "right" => "right-aligned".to_string(),
        other => other.to_string(),
    }
}

/// Points earned on one element plus the checks it failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub earned: f64,
    pub max: f64,
    pub violations: Vec<RuleViolation>,
}

impl RuleOutcome {
    fn record(&mut self, rule: FormattingRule, check: RuleCheck, points: f64) {
        self.max += points;
        if check.valid {
            self.earned += points;
        } else {
            self.violations.push(RuleViolation { rule, check });
        }
    }

    pub fn merge(mut self, other: RuleOutcome) -> Self {
        self.earned += other.earned;
        self.max += other.max;
        self.violations.extend(other.violations);
        self
    }
}

// FormattingValidator - applies the rule table to one element's resolved style
pub struct FormattingValidator<'a> {
    config: &'a ReviewConfig,
}

impl<'a> FormattingValidator<'a> {
    pub fn new(config: &'a ReviewConfig) -> Self {
        Self { config }
    }

    /// Font family and size.
    pub fn validate_general(&self, style: &ResolvedStyle) -> RuleOutcome {
        let general = &self.config.general;
        let points = self.config.points.formatting_check;
        let mut outcome = RuleOutcome::default();

        outcome.record(
            FormattingRule::FontSize,
            check_font_size(
                style.font_size.as_deref(),
                general.font_size,
                self.config.tolerances.font_size,
                general.cm_per_point,
            ),
            points,
        );
        outcome.record(
            FormattingRule::FontFamily,
            check_font(style.font_family.as_deref(), &general.fonts),
            points,
        );
        outcome
    }

    /// Line spacing, alignment, and indent / bottom margin when declared.
    pub fn validate_development(&self, style: &ResolvedStyle) -> RuleOutcome {
        let development = &self.config.development;
        let tolerances = &self.config.tolerances;
        let cm_per_point = self.config.general.cm_per_point;
        let points = self.config.points.formatting_check;
        let mut outcome = RuleOutcome::default();

        outcome.record(
            FormattingRule::LineSpacing,
            check_line_spacing(
                style.line_height.as_deref(),
                development.line_spacing,
                tolerances.line_spacing,
            ),
            points,
        );
        outcome.record(
            FormattingRule::Alignment,
            check_alignment(style.text_align.as_deref(), &development.alignment),
            points,
        );

        if let Some(indent) = style.text_indent.as_deref() {
            outcome.record(
                FormattingRule::Indent,
                check_indent(Some(indent), development.indent, tolerances.indent, cm_per_point),
                points,
            );
        }

        if let (Some(expected), Some(margin)) =
            (development.margin_bottom, style.margin_bottom.as_deref())
        {
            outcome.record(
                FormattingRule::BottomMargin,
                check_margin(Some(margin), expected, tolerances.margin, cm_per_point),
                points,
            );
        }
        outcome
    }

    /// Reference entries: spacing passes when undeclared, alignment must match.
    pub fn validate_reference(&self, style: &ResolvedStyle) -> RuleOutcome {
        let rules = &self.config.references;
        let points = self.config.points.reference_check;
        let mut outcome = RuleOutcome::default();

        let mut spacing = check_line_spacing(
            style.line_height.as_deref(),
            rules.line_spacing,
            self.config.tolerances.line_spacing,
        );
        if style.line_height.is_none() {
            spacing.valid = true;
        }
        outcome.record(FormattingRule::ReferenceSpacing, spacing, points);
        outcome.record(
            FormattingRule::ReferenceAlignment,
            check_alignment(style.text_align.as_deref(), &rules.alignment),
            points,
        );
        outcome
    }
}
