use super::stylesheet::{parse_declarations, StyleSheet};
use crate::types::ResolvedStyle;
use scraper::ElementRef;

/// Resolves CSS properties the way Word exports need: own declarations first,
/// then the first nested `span`, then the same search on each ancestor.
pub struct StyleResolver<'a> {
    stylesheet: &'a StyleSheet,
    max_depth: usize,
}

impl<'a> StyleResolver<'a> {
    pub fn new(stylesheet: &'a StyleSheet, max_depth: usize) -> Self {
        Self {
            stylesheet,
            max_depth,
        }
    }

    /// Walk from `element` up to the document root. At each level: the element's
    /// own value, else its first descendant `span`'s own value.
    pub fn resolve(&self, element: ElementRef<'_>, property: &str) -> Option<String> {
        let mut current = Some(element);
        let mut depth = 0;

        while let Some(el) = current {
            if depth > self.max_depth {
                tracing::warn!(
                    "⚠️  Style cascade for '{}' stopped after {} ancestors",
                    property,
                    self.max_depth
                );
                return None;
            }

            if let Some(value) = self.own_value(el, property) {
                return Some(value);
            }
            if let Some(span) = first_descendant_span(el) {
                if let Some(value) = self.own_value(span, property) {
                    return Some(value);
                }
            }

            current = el.parent().and_then(ElementRef::wrap);
            depth += 1;
        }
        None
    }

    pub fn resolve_all(&self, element: ElementRef<'_>) -> ResolvedStyle {
        ResolvedStyle::from_resolver(|property| self.resolve(element, property))
    }

    /// Inline style, then `tag.class`, `.class` and bare `tag` rules.
    fn own_value(&self, element: ElementRef<'_>, property: &str) -> Option<String> {
        let value = element.value();

        if let Some(style) = value.attr("style") {
            if let Some(v) = parse_declarations(style).remove(property) {
                return Some(v);
            }
        }

        let tag = value.name();
        let classes: Vec<&str> = value.classes().collect();

        classes
            .iter()
            .find_map(|class| self.stylesheet.property(&format!("{}.{}", tag, class), property))
            .or_else(|| {
                classes
                    .iter()
                    .find_map(|class| self.stylesheet.property(&format!(".{}", class), property))
            })
            .or_else(|| self.stylesheet.property(tag, property))
            .map(str::to_string)
    }
}

fn first_descendant_span(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "span")
}
