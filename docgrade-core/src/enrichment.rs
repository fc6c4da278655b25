//! Bibliographic enrichment boundary
//!
//! Looks a handful of reference entries up in an external catalogue and
//! reports which ones were found. Nothing here feeds the score: a lookup that
//! fails only turns into an unverified result.

use crate::types::Reference;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::thread;

static GUESS_AUTHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-ZÀ-Ú][A-ZÀ-Úa-zà-úç\s]+),\s*([A-ZÀ-Ú][a-zà-úç]+)").unwrap()
});
static GUESS_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}[a-z]?").unwrap());
static GUESS_TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.([^.]+)\.").unwrap());

const TITLE_FALLBACK_CHARS: usize = 100;

/// What a reference entry appears to cite, read off its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceGuess {
    /// `SURNAME, Given`
    pub authors: Vec<String>,
    pub year: String,
    pub title: String,
}

impl ReferenceGuess {
    /// Needs a leading `SURNAME, Given` author and a year. The title is the
    /// first dot-delimited segment, or the opening characters of the entry.
    pub fn parse(text: &str) -> Option<Self> {
        let author = GUESS_AUTHOR.captures(text)?;
        let year = GUESS_YEAR.find(text)?;

        let title = match GUESS_TITLE.captures(text).and_then(|c| c.get(1)) {
            Some(segment) => segment.as_str().trim().to_string(),
            None => text.chars().take(TITLE_FALLBACK_CHARS).collect(),
        };

        Some(Self {
            authors: vec![format!(
                "{}, {}",
                author.get(1)?.as_str().trim(),
                author.get(2)?.as_str()
            )],
            year: year.as_str().to_string(),
            title,
        })
    }
}

/// A verifier's answer for one entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub verified: bool,
    /// The entry re-rendered from catalogue data, when found
    pub formatted: Option<String>,
    pub source: Option<String>,
}

/// An external bibliographic catalogue.
pub trait ReferenceVerifier: Sync {
    fn verify(&self, reference_text: &str, guess: &ReferenceGuess) -> anyhow::Result<Verification>;

    /// False when credentials or endpoints are missing; nothing is looked up then.
    fn is_configured(&self) -> bool;

    fn name(&self) -> &str {
        "verifier"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub original_text: String,
    pub guess: Option<ReferenceGuess>,
    pub verified: bool,
    pub formatted: Option<String>,
    pub source: Option<String>,
    pub error: Option<String>,
}

impl VerificationResult {
    fn failed(original_text: &str, guess: Option<ReferenceGuess>, error: String) -> Self {
        Self {
            original_text: original_text.to_string(),
            guess,
            verified: false,
            formatted: None,
            source: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentSummary {
    pub configured: bool,
    pub total: usize,
    pub checked: usize,
    pub validated: usize,
    pub pending: usize,
    /// Validated share of the checked entries
    pub percentage: f64,
    pub results: Vec<VerificationResult>,
}

impl EnrichmentSummary {
    fn from_results(total: usize, results: Vec<VerificationResult>) -> Self {
        let checked = results.len();
        let validated = results.iter().filter(|r| r.verified).count();
        let percentage = if checked == 0 {
            0.0
        } else {
            validated as f64 / checked as f64 * 100.0
        };

        Self {
            configured: true,
            total,
            checked,
            validated,
            pending: total.saturating_sub(checked),
            percentage,
            results,
        }
    }
}

/// Checks the first `max_lookups` references, at most `max_concurrency` at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEnricher {
    pub max_lookups: usize,
    pub max_concurrency: usize,
}

impl Default for ReferenceEnricher {
    fn default() -> Self {
        Self {
            max_lookups: 5,
            max_concurrency: 2,
        }
    }
}

impl ReferenceEnricher {
    pub fn new(max_lookups: usize, max_concurrency: usize) -> Self {
        Self {
            max_lookups,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Look up the first `max_lookups` references. The review pipeline never calls
    /// this; embedders run it on `DocumentData::references` with their own verifier.
    pub fn enrich(&self, references: &[Reference], verifier: &dyn ReferenceVerifier) -> EnrichmentSummary {
        let total = references.len();
        if !verifier.is_configured() {
            tracing::warn!("⚠️  {} is not configured, reference lookup disabled", verifier.name());
            return EnrichmentSummary {
                total,
                pending: total,
                ..Default::default()
            };
        }

        tracing::info!(
            "📚 Verifying {} of {} references with {}...",
            total.min(self.max_lookups),
            total,
            verifier.name()
        );

        let candidates: Vec<&Reference> = references.iter().take(self.max_lookups).collect();
        let mut results = Vec::with_capacity(candidates.len());

        for batch in candidates.chunks(self.max_concurrency.max(1)) {
            let batch_results: Vec<Option<VerificationResult>> = thread::scope(|s| {
                let handles: Vec<_> = batch
                    .iter()
                    .map(|reference| {
                        let text = reference.text.as_str();
                        (text, s.spawn(move || verify_one(text, verifier)))
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|(text, handle)| {
                        handle.join().unwrap_or_else(|_| {
                            Some(VerificationResult::failed(
                                text,
                                None,
                                "verifier thread panicked".to_string(),
                            ))
                        })
                    })
                    .collect()
            });
            results.extend(batch_results.into_iter().flatten());
        }

        let summary = EnrichmentSummary::from_results(total, results);
        tracing::info!(
            "✅ Verification complete: {}/{} references confirmed",
            summary.validated,
            summary.checked
        );
        summary
    }
}

/// `None` when the entry cannot be read as author + year.
fn verify_one(text: &str, verifier: &dyn ReferenceVerifier) -> Option<VerificationResult> {
    let guess = ReferenceGuess::parse(text)?;

    match verifier.verify(text, &guess) {
        Ok(verification) => Some(VerificationResult {
            original_text: text.to_string(),
            guess: Some(guess),
            verified: verification.verified,
            formatted: verification.formatted,
            source: verification.source,
            error: None,
        }),
        Err(e) => {
            tracing::warn!("⚠️  Reference lookup failed: {}", e);
            Some(VerificationResult::failed(text, Some(guess), e.to_string()))
        }
    }
}
