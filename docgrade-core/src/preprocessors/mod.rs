//! Document Preprocessors
//!
//! This module turns exported documents into a [`MarkupDocument`]: a DOM plus
//! the stylesheet the style cascade resolves against.
//!
//! ## Architecture
//!
//! ```text
//! Word HTML export (.htm / .html)
//!     ↓
//! [WordHtmlPreprocessor]  decode bytes, parse DOM, collect <style> rules
//!     ↓
//! MarkupDocument
//!     ↓
//! [DocumentParser]
//!     ↓
//! DocumentData
//! ```

pub mod html;
pub mod preprocessor;

// Re-export main types
pub use html::{MarkupDocument, StyleResolver, StyleSheet, WordHtmlPreprocessor};
pub use preprocessor::Preprocessor;
