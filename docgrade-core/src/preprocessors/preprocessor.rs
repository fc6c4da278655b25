// Preprocessor abstraction for document loading
//
// This module defines the boundary between document loading (bytes -> DOM + stylesheet)
// and structural analysis (DOM -> DocumentData). Review code never touches raw bytes
// or character encodings; that is the preprocessor's job.

use super::html::MarkupDocument;
use crate::error::ReviewError;
use anyhow::Result;
use std::path::Path;

/// Preprocessor trait - converts document bytes to a parsed markup document
///
/// The preprocessing happens in two clear steps:
/// 1. Document bytes -> markup text (character decoding)
/// 2. Markup text -> MarkupDocument (DOM, stylesheet, metadata)
pub trait Preprocessor {
    /// Step 1: Decode raw bytes into markup text
    fn decode_to_markup(&self, bytes: &[u8]) -> Result<String>;

    /// Step 2: Parse markup into a DOM plus its collected stylesheet
    fn parse_markup(&self, markup: &str) -> Result<MarkupDocument>;

    /// Full document processing (combines both steps)
    fn process(&self, bytes: &[u8]) -> Result<MarkupDocument> {
        let markup = self.decode_to_markup(bytes)?;
        self.parse_markup(&markup)
    }

    /// Reads the file and processes its bytes
    fn process_file(&self, input: &Path) -> Result<MarkupDocument> {
        let bytes = std::fs::read(input).map_err(|source| ReviewError::Io {
            path: input.to_path_buf(),
            source,
        })?;
        self.process(&bytes)
    }

    /// Preprocessor name for logging
    fn name(&self) -> &str;

    /// Check if preprocessor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}
