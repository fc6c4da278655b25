use crate::error::ReviewError;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

// ===== STYLE MODEL =====

/// CSS properties the formatting rules care about, in resolution order.
pub const TRACKED_PROPERTIES: [&str; 8] = [
    "font-size",
    "line-height",
    "font-family",
    "text-align",
    "text-indent",
    "margin-top",
    "margin-bottom",
    "margin-left",
];

/// Effective style of one element, as raw CSS strings.
/// Values stay unparsed so rule checks can report exactly what the document declared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStyle {
    pub font_size: Option<String>,
    pub line_height: Option<String>,
    pub font_family: Option<String>,
    pub text_align: Option<String>,
    pub text_indent: Option<String>,
    pub margin_top: Option<String>,
    pub margin_bottom: Option<String>,
    pub margin_left: Option<String>,
}

impl ResolvedStyle {
    /// Build a style by resolving every tracked property through `resolve`.
    pub fn from_resolver<F>(mut resolve: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        Self {
            font_size: resolve("font-size"),
            line_height: resolve("line-height"),
            font_family: resolve("font-family"),
            text_align: resolve("text-align"),
            text_indent: resolve("text-indent"),
            margin_top: resolve("margin-top"),
            margin_bottom: resolve("margin-bottom"),
            margin_left: resolve("margin-left"),
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        let value = match property {
            "font-size" => &self.font_size,
            "line-height" => &self.line_height,
            "font-family" => &self.font_family,
            "text-align" => &self.text_align,
            "text-indent" => &self.text_indent,
            "margin-top" => &self.margin_top,
            "margin-bottom" => &self.margin_bottom,
            "margin-left" => &self.margin_left,
            _ => &None,
        };
        value.as_deref()
    }
}

// ===== STRUCTURAL MODEL =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Heading,
    Paragraph,
    List,
    Caption,
    Toc,
    Unknown,
}

/// One direct child of a section container, classified once during the walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentElement {
    pub tag: String,
    pub class_names: Vec<String>,
    pub text: String,
    pub style: ResolvedStyle,
    pub semantic_type: SemanticType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// 1-based, matching the container's numeric suffix
    pub index: usize,
    pub elements: Vec<DocumentElement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    pub style: ResolvedStyle,
    pub section: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub style: ResolvedStyle,
    pub section: usize,
    pub class_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItem {
    pub text: String,
    pub style: ResolvedStyle,
    pub section: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub caption: String,
    pub style: ResolvedStyle,
    pub section: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub text: String,
    pub style: ResolvedStyle,
}

/// An in-text `(AUTHOR, YEAR)` citation found in a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// The whole parenthesized match, e.g. `(SILVA, 2020; COSTA, 2019a)`
    pub full: String,
    /// The match without its parentheses
    pub content: String,
    /// Index into `DocumentData::paragraphs`
    pub paragraph_index: usize,
    /// Best-effort leading author token, upper-cased
    pub author: Option<String>,
    /// Best-effort first year token, e.g. `2019a`
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub generator: Option<String>,
    pub language: Option<String>,
}

/// Everything the structural parser extracts from one document.
/// Read-only once returned by `DocumentParser::parse`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentData {
    pub sections: Vec<Section>,
    pub headings: Vec<Heading>,
    pub paragraphs: Vec<Paragraph>,
    pub lists: Vec<ListItem>,
    pub figures: Vec<Figure>,
    pub references: Vec<Reference>,
    pub citations: Vec<Citation>,
    pub metadata: DocumentMetadata,
}

impl DocumentData {
    /// Word count over all body paragraphs. Pieces between whitespace runs are
    /// counted, so a blank paragraph still counts as one word.
    pub fn total_words(&self) -> usize {
        self.paragraphs
            .iter()
            .map(|p| WHITESPACE_RUN.find_iter(&p.text).count() + 1)
            .sum()
    }

    pub fn heading_texts_upper(&self) -> Vec<String> {
        self.headings.iter().map(|h| h.text.to_uppercase()).collect()
    }
}

// ===== DOCUMENT TYPES =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Monograph,
    Article,
}

impl DocumentType {
    pub const ALL: [DocumentType; 2] = [DocumentType::Monograph, DocumentType::Article];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Monograph => "monograph",
            DocumentType::Article => "article",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| ReviewError::InvalidDocumentType {
                requested: s.to_string(),
                valid: Self::ALL.iter().map(|t| t.as_str().to_string()).collect(),
            })
    }
}

// ===== ISSUES AND SCORES =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        };
        f.write_str(name)
    }
}

/// A single finding. Created by a review phase and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub section: String,
    pub severity: Severity,
    pub description: String,
    pub location: Option<String>,
    pub earned: f64,
    pub max: f64,
    pub timestamp: DateTime<Utc>,
}

impl Issue {
    pub fn new(section: &str, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            section: section.to_string(),
            severity,
            description: description.into(),
            location: None,
            earned: 0.0,
            max: 0.0,
            timestamp: Utc::now(),
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_points(mut self, earned: f64, max: f64) -> Self {
        self.earned = earned;
        self.max = max;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub earned: f64,
    pub max: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub total: f64,
    pub max_score: f64,
    pub percentage: f64,
    /// Per-phase breakdown, in the order the phases ran
    pub sections: IndexMap<String, SectionScore>,
}

impl ScoreBoard {
    /// Record one phase's result and add it to the running totals.
    pub fn record_section(&mut self, name: &str, earned: f64, max: f64) {
        let percentage = if max > 0.0 {
            round2(earned / max * 100.0)
        } else {
            0.0
        };
        self.sections.insert(
            name.to_string(),
            SectionScore {
                earned,
                max,
                percentage,
            },
        );
        self.total += earned;
        self.max_score += max;
    }

    /// Compute the overall percentage. Called once, after every phase has run.
    pub fn finalize(&mut self) {
        self.percentage = if self.max_score > 0.0 {
            round2(self.total / self.max_score * 100.0)
        } else {
            0.0
        };
    }
}

/// Round to two decimals, the precision every reported percentage uses.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            Grade::A
        } else if percentage >= 80.0 {
            Grade::B
        } else if percentage >= 70.0 {
            Grade::C
        } else if percentage >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::A => "A (Excellent)",
            Grade::B => "B (Good)",
            Grade::C => "C (Fair)",
            Grade::D => "D (Insufficient)",
            Grade::F => "F (Failing)",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl IssueSummary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
        Self {
            total: issues.len(),
            critical: count(Severity::Critical),
            high: count(Severity::High),
            medium: count(Severity::Medium),
            low: count(Severity::Low),
        }
    }
}

/// Terminal artifact of a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub document_type: DocumentType,
    pub scores: ScoreBoard,
    pub grade: Grade,
    pub grade_label: String,
    pub issues: Vec<Issue>,
    pub summary: IssueSummary,
    pub generated_at: DateTime<Utc>,
}

// ===== STATISTICS =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStatistics {
    pub sections: usize,
    pub paragraphs: usize,
    pub headings: usize,
    pub lists: usize,
    pub figures: usize,
    pub references: usize,
    pub citations: usize,
    pub total_words: usize,
}

impl DocumentStatistics {
    pub fn from_data(data: &DocumentData) -> Self {
        Self {
            sections: data.sections.len(),
            paragraphs: data.paragraphs.len(),
            headings: data.headings.len(),
            lists: data.lists.len(),
            figures: data.figures.len(),
            references: data.references.len(),
            citations: data.citations.len(),
            total_words: data.total_words(),
        }
    }

    pub fn words_per_paragraph(&self) -> f64 {
        ratio(self.total_words, self.paragraphs)
    }

    pub fn citations_per_paragraph(&self) -> f64 {
        ratio(self.citations, self.paragraphs)
    }

    pub fn citations_per_reference(&self) -> f64 {
        ratio(self.citations, self.references)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// What the orchestrator hands to a report sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub report: Report,
    pub statistics: DocumentStatistics,
}
