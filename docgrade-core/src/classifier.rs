use crate::config::DetectionConfig;
use crate::types::*;

/// Picks a document type from heading markers when the caller did not name one.
pub struct DocumentClassifier<'a> {
    detection: &'a DetectionConfig,
}

impl<'a> DocumentClassifier<'a> {
    pub fn new(detection: &'a DetectionConfig) -> Self {
        Self { detection }
    }

    /// An abstract heading plus a methodology or results heading makes an article.
    /// Anything else, ambiguous documents included, is reviewed as a monograph.
    pub fn classify(&self, data: &DocumentData) -> DocumentType {
        tracing::info!("🔍 Detecting document type...");
        let headings = data.heading_texts_upper();

        let has_abstract = any_marker(&headings, &self.detection.abstract_markers);
        let has_methodology = any_marker(&headings, &self.detection.methodology_markers);
        let has_results = any_marker(&headings, &self.detection.results_markers);

        let document_type = if has_abstract && (has_methodology || has_results) {
            DocumentType::Article
        } else {
            DocumentType::Monograph
        };

        tracing::info!("📋 Detected type: {}", document_type);
        document_type
    }
}

fn any_marker(headings: &[String], markers: &[String]) -> bool {
    headings
        .iter()
        .any(|heading| markers.iter().any(|m| heading.contains(&m.to_uppercase())))
}
