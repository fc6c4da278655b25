use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static CSS_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

static CSS_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)([^{}]+)\{([^{}]*)\}").unwrap());

/// Property name -> raw value.
pub type Declarations = HashMap<String, String>;

/// Parse a declaration block (`font-size:12.0pt;line-height:150%`).
/// Later declarations overwrite earlier ones; empty names or values are skipped.
pub fn parse_declarations(block: &str) -> Declarations {
    let mut declarations = Declarations::new();
    for declaration in block.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim().trim_end_matches("!important").trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }
        declarations.insert(name, value.to_string());
    }
    declarations
}

/// Selector-keyed rules from the document's `<style>` blocks.
///
/// Selectors are stored verbatim (`p.MsoNormal`, `.MsoCaption`, `h1`); the
/// cascade looks them up by exact key, so no selector matching happens here.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    rules: HashMap<String, Declarations>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one stylesheet body and merge it into this sheet.
    pub fn add_css(&mut self, css: &str) {
        let cleaned = CSS_COMMENT
            .replace_all(css, "")
            .replace("<!--", "")
            .replace("-->", "");

        for caps in CSS_RULE.captures_iter(&cleaned) {
            let (Some(selectors), Some(body)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let declarations = parse_declarations(body.as_str());
            if declarations.is_empty() {
                continue;
            }

            for selector in selectors.as_str().split(',') {
                let selector = selector.trim();
                if selector.is_empty() {
                    continue;
                }
                self.rules
                    .entry(selector.to_string())
                    .or_default()
                    .extend(declarations.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
    }

    pub fn from_css(css: &str) -> Self {
        let mut sheet = Self::new();
        sheet.add_css(css);
        sheet
    }

    pub fn rule(&self, selector: &str) -> Option<&Declarations> {
        self.rules.get(selector)
    }

    pub fn property(&self, selector: &str, property: &str) -> Option<&str> {
        self.rules
            .get(selector)
            .and_then(|d| d.get(property))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
