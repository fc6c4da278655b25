//! Document reviewers
//!
//! One phase runner shared by every document type. What differs between a
//! monograph and an article lives in its [`ReviewPolicy`]; the phases read the
//! policy and thread a [`ReviewAccumulator`] from one to the next.

pub mod citations;
pub mod phases;
pub mod policy;

use crate::config::ReviewConfig;
use crate::types::*;
use chrono::Utc;

pub use policy::ReviewPolicy;

// Score breakdown names, in phase order
pub const SECTION_STRUCTURE: &str = "Document Structure";
pub const SECTION_FORMATTING: &str = "Formatting";
pub const SECTION_CONTENT: &str = "Content";
pub const SECTION_REFERENCES: &str = "References";
pub const SECTION_CONSISTENCY: &str = "Citation Consistency";
pub const SECTION_CITATIONS: &str = "Citations";

/// Read-only inputs every phase sees.
pub struct ReviewContext<'a> {
    pub data: &'a DocumentData,
    pub config: &'a ReviewConfig,
    pub policy: &'a ReviewPolicy,
}

/// Running score and issue list, passed by value through the phases.
#[derive(Debug, Clone, Default)]
pub struct ReviewAccumulator {
    pub scores: ScoreBoard,
    pub issues: Vec<Issue>,
}

impl ReviewAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Close a phase: its points are added and never revisited.
    pub fn record(mut self, section: &str, earned: f64, max: f64) -> Self {
        tracing::debug!("   {}: {}/{}", section, earned, max);
        self.scores.record_section(section, earned, max);
        self
    }

    pub fn into_report(mut self, document_type: DocumentType) -> Report {
        self.scores.finalize();
        let grade = Grade::from_percentage(self.scores.percentage);
        Report {
            document_type,
            grade,
            grade_label: grade.label().to_string(),
            summary: IssueSummary::from_issues(&self.issues),
            scores: self.scores,
            issues: self.issues,
            generated_at: Utc::now(),
        }
    }
}

type Phase = fn(ReviewAccumulator, &ReviewContext<'_>) -> ReviewAccumulator;

/// Runs the fixed phase sequence for one document type.
pub struct DocumentReviewer<'a> {
    document_type: DocumentType,
    data: &'a DocumentData,
    config: &'a ReviewConfig,
}

impl<'a> DocumentReviewer<'a> {
    pub fn new(document_type: DocumentType, data: &'a DocumentData, config: &'a ReviewConfig) -> Self {
        Self {
            document_type,
            data,
            config,
        }
    }

    pub fn review(&self) -> Report {
        let policy = self.config.policy(self.document_type);
        let context = ReviewContext {
            data: self.data,
            config: self.config,
            policy,
        };

        tracing::info!("🔍 Starting {} review...", policy.label.to_uppercase());

        let sequence: [Phase; 5] = [
            phases::validate_structure,
            phases::validate_formatting,
            phases::validate_content,
            phases::validate_references,
            citations::validate_citations,
        ];

        let accumulator = sequence
            .iter()
            .fold(ReviewAccumulator::new(), |acc, phase| phase(acc, &context));

        let report = accumulator.into_report(self.document_type);
        tracing::info!(
            "✅ Review complete: {}/{} ({}%) {}",
            report.scores.total,
            report.scores.max_score,
            report.scores.percentage,
            report.grade_label
        );
        report
    }
}
