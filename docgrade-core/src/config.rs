use crate::error::ReviewError;
use crate::reviewers::policy::ReviewPolicy;
use crate::types::DocumentType;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The complete rule table: expected values, tolerances, point weights,
/// markup conventions and the per-document-type review policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub general: GeneralRules,
    pub development: DevelopmentRules,
    pub references: ReferenceRules,
    pub tolerances: Tolerances,
    pub points: PointWeights,
    pub markup: MarkupConfig,
    pub detection: DetectionConfig,
    pub monograph: ReviewPolicy,
    pub article: ReviewPolicy,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            general: GeneralRules::default(),
            development: DevelopmentRules::default(),
            references: ReferenceRules::default(),
            tolerances: Tolerances::default(),
            points: PointWeights::default(),
            markup: MarkupConfig::default(),
            detection: DetectionConfig::default(),
            monograph: ReviewPolicy::monograph(),
            article: ReviewPolicy::article(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralRules {
    /// Expected body font size in points
    pub font_size: f64,
    /// Accepted font families, matched case-insensitively by containment
    pub fonts: Vec<String>,
    /// Length of one typographic point in centimetres
    pub cm_per_point: f64,
}

impl Default for GeneralRules {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            fonts: vec!["Arial".to_string(), "Times New Roman".to_string()],
            cm_per_point: 0.0352778,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevelopmentRules {
    /// Line spacing as a percentage (150 = 1.5 lines)
    pub line_spacing: f64,
    pub alignment: String,
    /// First-line indent in points (35.4pt = 1.25cm)
    pub indent: f64,
    /// Bottom margin in points, checked only when set
    pub margin_bottom: Option<f64>,
}

impl Default for DevelopmentRules {
    fn default() -> Self {
        Self {
            line_spacing: 150.0,
            alignment: "justify".to_string(),
            indent: 35.4,
            margin_bottom: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceRules {
    pub line_spacing: f64,
    pub alignment: String,
}

impl Default for ReferenceRules {
    fn default() -> Self {
        Self {
            line_spacing: 100.0,
            alignment: "left".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Points
    pub font_size: f64,
    /// Percentage points
    pub line_spacing: f64,
    /// Points
    pub indent: f64,
    /// Points
    pub margin: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            font_size: 0.5,
            line_spacing: 5.0,
            indent: 2.0,
            margin: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointWeights {
    /// Points per passed check in the formatting phase
    pub formatting_check: f64,
    /// Points per passed check on a reference entry
    pub reference_check: f64,
}

impl Default for PointWeights {
    fn default() -> Self {
        Self {
            formatting_check: 10.0,
            reference_check: 5.0,
        }
    }
}

/// Class and tag conventions of Word "Web Page" exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Section containers carry a `{prefix}{n}` class token, n = 1, 2, ...
    pub section_class_prefix: String,
    pub paragraph_tags: Vec<String>,
    pub paragraph_class: String,
    /// Regex applied to each class token
    pub list_class_pattern: String,
    pub caption_class: String,
    pub toc_classes: Vec<String>,
    pub reference_markers: Vec<String>,
    /// Maximum number of ancestors the style cascade climbs
    pub max_cascade_depth: usize,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            section_class_prefix: "WordSection".to_string(),
            paragraph_tags: vec!["p".to_string()],
            paragraph_class: "MsoNormal".to_string(),
            list_class_pattern: "^MsoListParagraph".to_string(),
            caption_class: "MsoCaption".to_string(),
            toc_classes: vec!["MsoToc".to_string(), "MsoTof".to_string()],
            reference_markers: vec![
                "REFERÊNCIAS".to_string(),
                "REFERENCIAS".to_string(),
                "REFERENCES".to_string(),
            ],
            max_cascade_depth: 64,
        }
    }
}

/// Heading markers used to guess the document type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub abstract_markers: Vec<String>,
    pub methodology_markers: Vec<String>,
    pub results_markers: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            abstract_markers: vec!["ABSTRACT".to_string(), "RESUMO".to_string()],
            methodology_markers: vec!["METODOLOGIA".to_string(), "METHODOLOGY".to_string()],
            results_markers: vec!["RESULTADOS".to_string(), "RESULTS".to_string()],
        }
    }
}

impl ReviewConfig {
    /// Load a rule table from YAML, or JSON when the file ends in `.json`.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ReviewError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            serde_json::from_str(&content).map_err(|e| ReviewError::Config(e.to_string()))?
        } else {
            serde_yaml::from_str(&content).map_err(|e| ReviewError::Config(e.to_string()))?
        };
        Ok(config)
    }

    /// Load config with fallback to defaults
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!("⚠️  Failed to load config from {}, using defaults: {}", p, e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn policy(&self, document_type: DocumentType) -> &ReviewPolicy {
        match document_type {
            DocumentType::Monograph => &self.monograph,
            DocumentType::Article => &self.article,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("docgrade-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults_match_abnt_table() {
        let config = ReviewConfig::default();
        assert_eq!(config.general.font_size, 12.0);
        assert_eq!(config.development.line_spacing, 150.0);
        assert_eq!(config.development.alignment, "justify");
        assert_eq!(config.references.line_spacing, 100.0);
        assert_eq!(config.tolerances.font_size, 0.5);
        assert_eq!(config.tolerances.line_spacing, 5.0);
        assert_eq!(config.tolerances.indent, 2.0);
        assert_eq!(config.tolerances.margin, 1.0);
        assert!(config.development.margin_bottom.is_none());
        assert_eq!(config.monograph.formatting_sample, 10);
        assert_eq!(config.article.formatting_sample, 15);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let path = temp_file(
            "partial.yaml",
            "general:\n  font_size: 11\ntolerances:\n  line_spacing: 10\n",
        );
        let config = ReviewConfig::load_from_file(&path).unwrap();

        assert_eq!(config.general.font_size, 11.0);
        assert_eq!(config.general.fonts.len(), 2);
        assert_eq!(config.tolerances.line_spacing, 10.0);
        assert_eq!(config.tolerances.font_size, 0.5);
        assert_eq!(config.article.label, "Article");
    }

    #[test]
    fn test_json_config_by_extension() {
        let path = temp_file("rules.json", r#"{"development": {"alignment": "left"}}"#);
        let config = ReviewConfig::load_from_file(&path).unwrap();
        assert_eq!(config.development.alignment, "left");
        assert_eq!(config.development.indent, 35.4);
    }

    #[test]
    fn test_load_with_fallback_on_missing_file() {
        let config = ReviewConfig::load_with_fallback(Some("/nonexistent/docgrade.yaml"));
        assert_eq!(config.general.font_size, 12.0);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let path = temp_file("broken.yaml", "general: [unclosed\n");
        let err = ReviewConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReviewError>(),
            Some(ReviewError::Config(_))
        ));
    }
}
