use crate::types::{Citation, Paragraph, Reference};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `(SILVA, 2020)` or `(SILVA, 2020; COSTA, 2019a)`: upper-case author runs with a year.
pub static CITATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\(([A-Z][A-ZÀ-Ú\s]+,\s*\d{4}[a-z]?(?:;\s*[A-Z][A-ZÀ-Ú\s]+,\s*\d{4}[a-z]?)*)\)",
    )
    .unwrap()
});

/// Loose author/year pair: first capitalised word, then the first year after it.
static CITATION_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([A-ZÀ-Ú][A-Za-zÀ-ú.'-]+).*?(\d{4}[a-z]?)").unwrap());

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}[a-z]?").unwrap());

/// Scan paragraph texts for in-text citations, in paragraph order.
pub fn extract_citations(paragraphs: &[Paragraph]) -> Vec<Citation> {
    paragraphs
        .iter()
        .enumerate()
        .flat_map(|(paragraph_index, paragraph)| {
            CITATION_PATTERN
                .captures_iter(&paragraph.text)
                .filter_map(move |caps| {
                    let full = caps.get(0)?.as_str().to_string();
                    let content = caps.get(1)?.as_str().to_string();
                    let key = citation_key(&full);
                    Some(Citation {
                        author: key.as_ref().map(|(author, _)| author.clone()),
                        year: key.map(|(_, year)| year),
                        full,
                        content,
                        paragraph_index,
                    })
                })
        })
        .collect()
}

/// Best-effort `(AUTHOR, year)` from a citation's text.
pub fn citation_key(text: &str) -> Option<(String, String)> {
    let caps = CITATION_KEY.captures(text)?;
    let author = caps.get(1)?.as_str().trim().to_uppercase();
    let year = caps.get(2)?.as_str().to_string();
    Some((author, year))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReference {
    pub raw: String,
    pub text: String,
    /// First whitespace token without its comma, e.g. `SILVA`
    pub match_author: String,
    pub year: Option<String>,
}

impl NormalizedReference {
    pub fn from_reference(reference: &Reference) -> Self {
        let raw = reference.text.clone();
        let match_author = raw
            .split(' ')
            .next()
            .unwrap_or("")
            .replacen(',', "", 1)
            .to_uppercase();
        let year = YEAR.find(&raw).map(|m| m.as_str().to_string());
        Self {
            text: raw.to_uppercase(),
            raw,
            match_author,
            year,
        }
    }

    fn matches(&self, author: &str, year: &str) -> bool {
        self.text.contains(author) && self.text.contains(year)
    }
}

/// Outcome of pairing citations with reference entries.
/// Indices point into the citation and reference slices that were matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationMatches {
    /// (citation index, reference index)
    pub matched: Vec<(usize, usize)>,
    pub unmatched: Vec<usize>,
    /// Citations without an extractable author/year pair
    pub skipped: Vec<usize>,
    pub unused_references: Vec<usize>,
}

/// Each citation is matched to the first reference whose upper-cased text contains
/// both its author token and its year. References nobody matched are unused.
pub fn match_citations(citations: &[Citation], references: &[Reference]) -> CitationMatches {
    let normalized: Vec<NormalizedReference> =
        references.iter().map(NormalizedReference::from_reference).collect();
    let mut result = CitationMatches::default();

    for (citation_index, citation) in citations.iter().enumerate() {
        let key = match (&citation.author, &citation.year) {
            (Some(author), Some(year)) => Some((author.clone(), year.clone())),
            _ => citation_key(&citation.full),
        };
        let Some((author, year)) = key else {
            result.skipped.push(citation_index);
            continue;
        };

        match normalized.iter().position(|r| r.matches(&author, &year)) {
            Some(reference_index) => result.matched.push((citation_index, reference_index)),
            None => result.unmatched.push(citation_index),
        }
    }

    result.unused_references = (0..normalized.len())
        .filter(|idx| !result.matched.iter().any(|(_, r)| r == idx))
        .collect();
    result
}

/// Consecutive entries never step down in their first character (plain code-point order).
pub fn is_alphabetical<S: AsRef<str>>(entries: &[S]) -> bool {
    entries.windows(2).all(|pair| {
        let current = pair[0].as_ref().trim().chars().next();
        let next = pair[1].as_ref().trim().chars().next();
        current <= next
    })
}
