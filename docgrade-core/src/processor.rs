use crate::classifier::DocumentClassifier;
use crate::config::ReviewConfig;
use crate::error::ReviewError;
use crate::parser::DocumentParser;
use crate::preprocessors::{Preprocessor, WordHtmlPreprocessor};
use crate::reviewers::DocumentReviewer;
use crate::types::*;
use anyhow::Result;
use std::path::Path;
use std::time::{Duration, Instant};

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        tracing::info!("⏱️  {}: {:.0}ms", step_name, elapsed.as_millis());

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn log_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        tracing::info!("📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            tracing::info!(
                "   {:.<35} {:.0}ms ({:.1}%)",
                step,
                duration.as_millis(),
                percentage
            );
        }
        tracing::info!("   {:.<35} {:.0}ms", "Total", total.as_millis());
    }
}

/// Entry point of the pipeline: document bytes -> DocumentData -> Report.
///
/// Parsing always completes before the first review phase runs. When no
/// document type was set, one is detected from the headings, once per review.
pub struct ReviewOrchestrator {
    preprocessor: Box<dyn Preprocessor>,
    config: ReviewConfig,
    document_type: Option<DocumentType>,
    profiling: bool,
}

impl ReviewOrchestrator {
    pub fn new(preprocessor: Box<dyn Preprocessor>, config: ReviewConfig) -> Self {
        Self {
            preprocessor,
            config,
            document_type: None,
            profiling: false,
        }
    }

    /// Convenience constructor for Word HTML exports
    pub fn for_word_html(config: ReviewConfig) -> Self {
        Self::new(Box::new(WordHtmlPreprocessor::new()), config)
    }

    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profiling = enabled;
        self
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    pub fn document_type(&self) -> Option<DocumentType> {
        self.document_type
    }

    /// Fix the document type for later reviews. Unknown names fail here,
    /// before any document is read.
    pub fn set_document_type(&mut self, requested: &str) -> Result<DocumentType, ReviewError> {
        let document_type: DocumentType = requested.parse()?;
        tracing::info!("📋 Document type set to {}", document_type);
        self.document_type = Some(document_type);
        Ok(document_type)
    }

    pub fn clear_document_type(&mut self) {
        self.document_type = None;
    }

    pub fn review_file(&self, path: impl AsRef<Path>) -> Result<ReviewOutcome> {
        let path = path.as_ref();
        tracing::info!("📄 Reviewing document: {}", path.display());
        if !self.preprocessor.supports_file_type(path) {
            tracing::warn!(
                "⚠️  {} does not look like a {} input, parsing anyway",
                path.display(),
                self.preprocessor.name()
            );
        }

        let mut profiler = StepProfiler::new(self.profiling);
        let bytes = profiler.time_step("1. Read file", || {
            std::fs::read(path).map_err(|source| ReviewError::Io {
                path: path.to_path_buf(),
                source,
            })
        })?;
        let markup = profiler.time_step("2. Decode", || self.preprocessor.decode_to_markup(&bytes))?;
        self.review_with_profiler(&markup, profiler)
    }

    pub fn review_markup(&self, markup: &str) -> Result<ReviewOutcome> {
        self.review_with_profiler(markup, StepProfiler::new(self.profiling))
    }

    fn review_with_profiler(&self, markup: &str, mut profiler: StepProfiler) -> Result<ReviewOutcome> {
        let start_time = Instant::now();

        let data = profiler.time_step("3. Parse structure", || self.parse_markup(markup))?;
        let outcome = profiler.time_step("4. Review", || self.review_data(&data));

        profiler.log_summary();
        tracing::info!(
            "⏱️  Total review time: {:.3}s",
            start_time.elapsed().as_secs_f64()
        );
        Ok(outcome)
    }

    /// Scores an already parsed document.
    pub fn review_data(&self, data: &DocumentData) -> ReviewOutcome {
        let document_type = self
            .document_type
            .unwrap_or_else(|| self.detect_document_type(data));

        let report = DocumentReviewer::new(document_type, data, &self.config).review();
        ReviewOutcome {
            report,
            statistics: self.statistics(data),
        }
    }

    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<DocumentData> {
        let document = self.preprocessor.process_file(path.as_ref())?;
        DocumentParser::new(&self.config).parse(&document)
    }

    pub fn parse_markup(&self, markup: &str) -> Result<DocumentData> {
        let document = self.preprocessor.parse_markup(markup)?;
        DocumentParser::new(&self.config).parse(&document)
    }

    pub fn statistics(&self, data: &DocumentData) -> DocumentStatistics {
        DocumentStatistics::from_data(data)
    }

    pub fn detect_document_type(&self, data: &DocumentData) -> DocumentType {
        DocumentClassifier::new(&self.config.detection).classify(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARTICLE_MARKUP: &str = r#"<html><head><style>
        p.MsoNormal { font-size: 12.0pt; font-family: "Arial"; line-height: 150%; text-align: justify; }
    </style></head><body><div class="WordSection1">
        <h1>RESUMO</h1>
        <p class="MsoNormal">Texto do resumo.</p>
        <h1>2 METODOLOGIA</h1>
        <p class="MsoNormal">Como indicado (SILVA, 2020).</p>
    </div></body></html>"#;

    #[test]
    fn test_invalid_document_type_fails_fast() {
        let mut orchestrator = ReviewOrchestrator::for_word_html(ReviewConfig::default());

        let err = orchestrator.set_document_type("thesis").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid document type: thesis. Valid types: monograph, article"
        );
        assert_eq!(orchestrator.document_type(), None);

        assert_eq!(
            orchestrator.set_document_type(" Article ").unwrap(),
            DocumentType::Article
        );
    }

    #[test]
    fn test_detects_type_when_unset() {
        let orchestrator = ReviewOrchestrator::for_word_html(ReviewConfig::default());
        let outcome = orchestrator.review_markup(ARTICLE_MARKUP).unwrap();

        assert_eq!(outcome.report.document_type, DocumentType::Article);
        assert_eq!(outcome.statistics.paragraphs, 2);
        assert_eq!(outcome.statistics.citations, 1);
    }

    #[test]
    fn test_explicit_type_overrides_detection() {
        let mut orchestrator = ReviewOrchestrator::for_word_html(ReviewConfig::default());
        orchestrator.set_document_type("monograph").unwrap();

        let outcome = orchestrator.review_markup(ARTICLE_MARKUP).unwrap();
        assert_eq!(outcome.report.document_type, DocumentType::Monograph);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let orchestrator = ReviewOrchestrator::for_word_html(ReviewConfig::default());
        let err = orchestrator
            .review_file("/nonexistent/docgrade/thesis.htm")
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ReviewError>(),
            Some(ReviewError::Io { .. })
        ));
    }

    #[test]
    fn test_profiler_records_only_when_enabled() {
        let mut profiler = StepProfiler::new(false);
        assert_eq!(profiler.time_step("noop", || 2 + 2), 4);
        assert!(profiler.timings().is_empty());

        let mut profiler = StepProfiler::new(true);
        profiler.time_step("step", || ());
        assert_eq!(profiler.timings().len(), 1);
        assert_eq!(profiler.timings()[0].0, "step");
    }
}
