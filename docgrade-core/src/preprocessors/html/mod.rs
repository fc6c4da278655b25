//! Word HTML Preprocessor
//!
//! Reads "Web Page" / "Web Page, Filtered" exports from Word: decodes the
//! bytes, builds a tolerant DOM and collects every `<style>` block into a
//! selector-keyed [`StyleSheet`].

pub mod cascade;
pub mod stylesheet;
pub mod text;

use crate::preprocessors::preprocessor::Preprocessor;
use crate::types::DocumentMetadata;
use anyhow::Result;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use regex::bytes::Regex as BytesRegex;
use scraper::{Html, Selector};
use std::path::Path;
use std::sync::LazyLock;

pub use cascade::StyleResolver;
pub use stylesheet::StyleSheet;
pub use text::extract_text;

static STYLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("style").unwrap());
static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static META_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta").unwrap());
static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// Bytes searched for a `<meta>` charset declaration
const CHARSET_SNIFF_LIMIT: usize = 4096;

static DECLARED_CHARSET: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r#"(?i-u)<meta[^>]*charset\s*=\s*["']?([a-z0-9_.:-]+)"#).unwrap()
});

fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(CHARSET_SNIFF_LIMIT)];
    let label = DECLARED_CHARSET.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes()).map(Encoding::output_encoding)
}

/// Decode document bytes. A byte-order mark wins, then a `<meta>` charset
/// declaration; otherwise UTF-8 when valid, else Windows-1252.
pub fn decode_bytes(bytes: &[u8]) -> String {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        return text.into_owned();
    }

    let encoding = match declared_encoding(bytes) {
        Some(declared) if declared != UTF_8 => declared,
        _ if std::str::from_utf8(bytes).is_ok() => UTF_8,
        _ => {
            tracing::debug!("📄 Input is not valid UTF-8, decoding as Windows-1252");
            WINDOWS_1252
        }
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        tracing::warn!(
            "⚠️  Some bytes are not valid {}, replaced with U+FFFD",
            encoding.name()
        );
    }
    text.into_owned()
}

/// A parsed document ready for structural analysis.
pub struct MarkupDocument {
    pub html: Html,
    pub stylesheet: StyleSheet,
    pub metadata: DocumentMetadata,
}

impl MarkupDocument {
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        if !html.errors.is_empty() {
            tracing::debug!("📄 HTML parser recovered from {} errors", html.errors.len());
        }

        let mut stylesheet = StyleSheet::new();
        for style in html.select(&STYLE_SELECTOR) {
            stylesheet.add_css(&style.text().collect::<String>());
        }

        let metadata = extract_metadata(&html);
        Self {
            html,
            stylesheet,
            metadata,
        }
    }
}

fn extract_metadata(html: &Html) -> DocumentMetadata {
    let mut metadata = DocumentMetadata {
        title: html
            .select(&TITLE_SELECTOR)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty()),
        ..Default::default()
    };

    for meta in html.select(&META_SELECTOR) {
        let (Some(name), Some(content)) = (meta.value().attr("name"), meta.value().attr("content"))
        else {
            continue;
        };
        match name.to_ascii_lowercase().as_str() {
            "generator" => metadata.generator = Some(content.to_string()),
            "author" => metadata.author = Some(content.to_string()),
            _ => {}
        }
    }

    metadata.language = html
        .root_element()
        .value()
        .attr("lang")
        .or_else(|| {
            html.select(&BODY_SELECTOR)
                .next()
                .and_then(|body| body.value().attr("lang"))
        })
        .map(str::to_string);

    metadata
}

/// Preprocessor for Word HTML exports (`.htm`, `.html`).
#[derive(Debug, Default, Clone)]
pub struct WordHtmlPreprocessor;

impl WordHtmlPreprocessor {
    pub fn new() -> Self {
        Self
    }
}

impl Preprocessor for WordHtmlPreprocessor {
    fn decode_to_markup(&self, bytes: &[u8]) -> Result<String> {
        Ok(decode_bytes(bytes))
    }

    fn parse_markup(&self, markup: &str) -> Result<MarkupDocument> {
        let document = MarkupDocument::parse(markup);
        tracing::debug!(
            "🎨 Collected {} stylesheet rules",
            document.stylesheet.len()
        );
        Ok(document)
    }

    fn name(&self) -> &str {
        "WordHtmlPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        if let Some(extension) = path.extension() {
            matches!(
                extension.to_str().unwrap_or("").to_lowercase().as_str(),
                "htm" | "html"
            )
        } else {
            false
        }
    }
}
