use crate::config::{MarkupConfig, ReviewConfig};
use crate::preprocessors::html::{extract_text, MarkupDocument, StyleResolver};
use crate::rules::citations::extract_citations;
use crate::types::*;
use anyhow::{anyhow, Result};
use regex::Regex;
use scraper::ElementRef;
use std::collections::HashMap;

/// Assigns a semantic role to a section child from its tag and class tokens.
pub struct ElementClassifier<'a> {
    markup: &'a MarkupConfig,
    list_pattern: Regex,
}

impl<'a> ElementClassifier<'a> {
    pub fn new(markup: &'a MarkupConfig) -> Result<Self> {
        let list_pattern = Regex::new(&markup.list_class_pattern).map_err(|e| {
            anyhow!(
                "Invalid list class pattern '{}': {}",
                markup.list_class_pattern,
                e
            )
        })?;
        Ok(Self {
            markup,
            list_pattern,
        })
    }

    /// Heading, then paragraph, list, caption and toc; first match wins.
    pub fn classify(&self, tag: &str, classes: &[String]) -> SemanticType {
        if heading_level(tag).is_some() {
            return SemanticType::Heading;
        }
        if !self.is_paragraph_like(tag) {
            return SemanticType::Unknown;
        }

        let has = |marker: &str| classes.iter().any(|c| c.contains(marker));
        if has(&self.markup.paragraph_class) {
            SemanticType::Paragraph
        } else if classes.iter().any(|c| self.list_pattern.is_match(c)) {
            SemanticType::List
        } else if has(&self.markup.caption_class) {
            SemanticType::Caption
        } else if self.markup.toc_classes.iter().any(|t| has(t)) {
            SemanticType::Toc
        } else {
            SemanticType::Unknown
        }
    }

    pub fn is_paragraph_like(&self, tag: &str) -> bool {
        self.markup.paragraph_tags.iter().any(|t| t == tag)
    }
}

/// `h1`..`h6` -> 1..6
pub fn heading_level(tag: &str) -> Option<u8> {
    let digit = tag.strip_prefix('h')?;
    match digit.parse::<u8>() {
        Ok(level @ 1..=6) if digit.len() == 1 => Some(level),
        _ => None,
    }
}

fn class_tokens(element: ElementRef<'_>) -> Vec<String> {
    element.value().classes().map(str::to_string).collect()
}

/// Walks the numbered section containers and builds [`DocumentData`].
pub struct DocumentParser<'a> {
    config: &'a ReviewConfig,
}

impl<'a> DocumentParser<'a> {
    pub fn new(config: &'a ReviewConfig) -> Self {
        Self { config }
    }

    pub fn parse(&self, document: &MarkupDocument) -> Result<DocumentData> {
        let markup = &self.config.markup;
        let classifier = ElementClassifier::new(markup)?;
        let resolver = StyleResolver::new(&document.stylesheet, markup.max_cascade_depth);
        let containers = self.section_containers(document);

        let mut data = DocumentData {
            metadata: document.metadata.clone(),
            ..Default::default()
        };

        // Sections are contiguous: the first missing index ends the scan.
        let mut index = 1;
        while let Some(container) = containers.get(&index) {
            let mut section = Section {
                index,
                elements: Vec::new(),
            };

            for child in container.children().filter_map(ElementRef::wrap) {
                let element = self.read_element(child, &classifier, &resolver);
                self.collect(&element, index, &mut data);
                section.elements.push(element);
            }

            tracing::debug!(
                "📑 Section {}: {} elements",
                index,
                section.elements.len()
            );
            data.sections.push(section);
            index += 1;
        }

        data.references = self.extract_references(document, &classifier, &resolver);
        data.citations = extract_citations(&data.paragraphs);

        tracing::info!(
            "📄 Parsed {} sections: {} headings, {} paragraphs, {} list items, {} figures, {} references, {} citations",
            data.sections.len(),
            data.headings.len(),
            data.paragraphs.len(),
            data.lists.len(),
            data.figures.len(),
            data.references.len(),
            data.citations.len()
        );
        Ok(data)
    }

    /// First element carrying each `{prefix}{n}` class token.
    fn section_containers<'d>(&self, document: &'d MarkupDocument) -> HashMap<usize, ElementRef<'d>> {
        let prefix = &self.config.markup.section_class_prefix;
        let mut containers = HashMap::new();

        for element in document.html.root_element().descendants().filter_map(ElementRef::wrap) {
            for class in element.value().classes() {
                let Some(index) = class
                    .strip_prefix(prefix.as_str())
                    .and_then(|n| n.parse::<usize>().ok())
                else {
                    continue;
                };
                containers.entry(index).or_insert(element);
            }
        }
        containers
    }

    fn read_element(
        &self,
        element: ElementRef<'_>,
        classifier: &ElementClassifier<'_>,
        resolver: &StyleResolver<'_>,
    ) -> DocumentElement {
        let tag = element.value().name().to_ascii_lowercase();
        let class_names = class_tokens(element);
        let semantic_type = classifier.classify(&tag, &class_names);

        DocumentElement {
            text: extract_text(element),
            style: resolver.resolve_all(element),
            semantic_type,
            class_names,
            tag,
        }
    }

    fn collect(&self, element: &DocumentElement, section: usize, data: &mut DocumentData) {
        match element.semantic_type {
            SemanticType::Heading => data.headings.push(Heading {
                level: heading_level(&element.tag).unwrap_or(1),
                text: element.text.clone(),
                style: element.style.clone(),
                section,
            }),
            SemanticType::Paragraph => data.paragraphs.push(Paragraph {
                text: element.text.clone(),
                style: element.style.clone(),
                section,
                class_name: element.class_names.join(" "),
            }),
            SemanticType::List => data.lists.push(ListItem {
                text: element.text.clone(),
                style: element.style.clone(),
                section,
            }),
            SemanticType::Caption => data.figures.push(Figure {
                caption: element.text.clone(),
                style: element.style.clone(),
                section,
            }),
            SemanticType::Toc | SemanticType::Unknown => {}
        }
    }

    /// The reference list follows the first bold normal paragraph naming it,
    /// and runs through the contiguous normal paragraphs after it. A heading
    /// naming it does not anchor the list.
    fn extract_references(
        &self,
        document: &MarkupDocument,
        classifier: &ElementClassifier<'_>,
        resolver: &StyleResolver<'_>,
    ) -> Vec<Reference> {
        let markup = &self.config.markup;
        let markers: Vec<String> = markup
            .reference_markers
            .iter()
            .map(|m| m.to_uppercase())
            .collect();
        let names_references = |element: ElementRef<'_>| {
            let text = element.text().collect::<String>().to_uppercase();
            markers.iter().any(|m| text.contains(m.as_str()))
        };

        let anchor = document
            .html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find_map(|element| {
                let tag = element.value().name();
                if (tag == "b" || tag == "strong") && names_references(element) {
                    return self.normal_paragraph_ancestor(element, classifier);
                }
                None
            });

        let Some(anchor) = anchor else {
            tracing::debug!("📚 No reference list title found");
            return Vec::new();
        };

        anchor
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .take_while(|sibling| {
                sibling
                    .value()
                    .classes()
                    .any(|c| c == markup.paragraph_class)
            })
            .filter_map(|entry| {
                let text = extract_text(entry);
                if text.trim().is_empty() {
                    return None;
                }
                Some(Reference {
                    text,
                    style: resolver.resolve_all(entry),
                })
            })
            .collect()
    }

    fn normal_paragraph_ancestor<'d>(
        &self,
        element: ElementRef<'d>,
        classifier: &ElementClassifier<'_>,
    ) -> Option<ElementRef<'d>> {
        let paragraph_class = &self.config.markup.paragraph_class;
        element.ancestors().filter_map(ElementRef::wrap).find(|ancestor| {
            classifier.is_paragraph_like(ancestor.value().name())
                && ancestor.value().classes().any(|c| c == paragraph_class.as_str())
        })
    }
}
