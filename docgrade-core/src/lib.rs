// Docgrade Core Library
//
// Reviews Word-exported HTML documents against ABNT formatting rules.
// Main interface for turning a document into a scored review report.

pub mod classifier;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod parser;
pub mod preprocessors;
pub mod processor;
pub mod reviewers;
pub mod rules;
pub mod types;

// Re-export main types and functions for easy use
pub use types::*;
pub use classifier::DocumentClassifier;
pub use config::ReviewConfig;
pub use enrichment::{EnrichmentSummary, ReferenceEnricher, ReferenceGuess, ReferenceVerifier};
pub use error::ReviewError;
pub use parser::DocumentParser;
pub use preprocessors::{MarkupDocument, Preprocessor, WordHtmlPreprocessor};
pub use processor::{ReviewOrchestrator, StepProfiler};
pub use reviewers::{DocumentReviewer, ReviewPolicy};
