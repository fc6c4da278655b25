use crate::types::Severity;
use serde::{Deserialize, Serialize};

/// Everything that differs between document types. The phase runner is shared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPolicy {
    pub label: String,
    pub structure: StructurePolicy,
    /// Number of leading paragraphs checked in the formatting phase
    pub formatting_sample: usize,
    /// Spell out formatting values in issue text ("justified", "1.5 lines", "1.25 cm")
    pub humanize_values: bool,
    pub content: Vec<ContentCheck>,
    pub references: ReferencePolicy,
    pub citations: CitationPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructurePolicy {
    pub max_points: f64,
    pub required: Vec<RequiredSection>,
    pub heading_bonus: Option<HeadingBonus>,
}

/// A section counts as present when any heading contains any of its markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredSection {
    pub label: String,
    pub markers: Vec<String>,
    pub points: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingBonus {
    pub per_heading: f64,
    pub max_points: f64,
    /// Raised when the document has no headings at all
    pub missing_severity: Severity,
}

/// `value >= min` and, when set, `value <= max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub min: f64,
    #[serde(default)]
    pub max: Option<f64>,
    pub points: f64,
    /// An issue is raised when a tier with a severity is reached
    #[serde(default)]
    pub severity: Option<Severity>,
}

impl Tier {
    pub fn at_least(min: f64, points: f64) -> Self {
        Self {
            min,
            max: None,
            points,
            severity: None,
        }
    }

    pub fn between(min: f64, max: f64, points: f64) -> Self {
        Self {
            min,
            max: Some(max),
            points,
            severity: None,
        }
    }

    pub fn flagged(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    fn contains(&self, value: f64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorTier {
    pub points: f64,
    pub severity: Severity,
}

/// First matching tier wins; nothing matching lands on the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierLadder {
    pub tiers: Vec<Tier>,
    pub floor: FloorTier,
}

/// The tier a value landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierAward {
    pub points: f64,
    pub max: f64,
    /// Set when the award should be reported as an issue
    pub severity: Option<Severity>,
}

impl TierLadder {
    pub fn new(tiers: Vec<Tier>, floor_points: f64, floor_severity: Severity) -> Self {
        Self {
            tiers,
            floor: FloorTier {
                points: floor_points,
                severity: floor_severity,
            },
        }
    }

    /// Full credit is the first tier's award.
    pub fn max_points(&self) -> f64 {
        self.tiers
            .first()
            .map(|t| t.points)
            .unwrap_or(self.floor.points)
    }

    pub fn evaluate(&self, value: f64) -> TierAward {
        let max = self.max_points();
        match self.tiers.iter().find(|t| t.contains(value)) {
            Some(tier) => TierAward {
                points: tier.points,
                max,
                severity: tier.severity,
            },
            None => TierAward {
                points: self.floor.points,
                max,
                severity: Some(self.floor.severity),
            },
        }
    }

    /// Lower bound of the full-credit tier.
    pub fn full_credit_min(&self) -> f64 {
        self.tiers.first().map(|t| t.min).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMetric {
    ParagraphCount,
    CitationCount,
    /// Mean characters per paragraph
    AverageParagraphLength,
    FigureCount,
    ListCount,
    WordCount,
}

/// One content threshold. `message` may contain `{value}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentCheck {
    pub metric: ContentMetric,
    pub ladder: TierLadder,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencePolicy {
    pub base_max: f64,
    pub count: TierLadder,
    pub alphabetical_points: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CitationPolicy {
    /// Pair each citation with a reference entry
    Consistency {
        max_points: f64,
        points_per_match: f64,
        unmatched_max: f64,
        unused_max: f64,
    },
    /// Citation-to-reference coverage and citations per paragraph
    Density {
        max_points: f64,
        coverage: TierLadder,
        density: TierLadder,
    },
}

fn required(markers: &[&str], points: f64, severity: Severity) -> RequiredSection {
    RequiredSection {
        label: markers.last().copied().unwrap_or_default().to_string(),
        markers: markers.iter().map(|m| m.to_string()).collect(),
        points,
        severity,
    }
}

fn check(metric: ContentMetric, ladder: TierLadder, message: &str) -> ContentCheck {
    ContentCheck {
        metric,
        ladder,
        message: message.to_string(),
    }
}

impl ReviewPolicy {
    pub fn monograph() -> Self {
        use ContentMetric::*;
        use Severity::*;

        Self {
            label: "Monograph".to_string(),
            structure: StructurePolicy {
                max_points: 100.0,
                required: vec![
                    required(&["INTRODUÇÃO"], 25.0, Critical),
                    required(
                        &["TEÓRICO", "TEÓRICA", "FUNDAMENTAÇÃO OU REFERENCIAL TEÓRICO"],
                        25.0,
                        Critical,
                    ),
                    required(&["DESENVOLVIMENTO"], 25.0, Critical),
                    required(
                        &["CONSIDERAÇÕES", "CONCLUSÃO", "CONSIDERAÇÕES FINAIS OU CONCLUSÃO"],
                        25.0,
                        Critical,
                    ),
                    required(&["REFERÊNCIAS"], 25.0, Critical),
                ],
                heading_bonus: Some(HeadingBonus {
                    per_heading: 2.0,
                    max_points: 10.0,
                    missing_severity: Critical,
                }),
            },
            formatting_sample: 10,
            humanize_values: true,
            content: vec![
                check(
                    ParagraphCount,
                    TierLadder::new(
                        vec![Tier::at_least(20.0, 30.0), Tier::at_least(10.0, 20.0).flagged(Low)],
                        10.0,
                        Medium,
                    ),
                    "Document has few paragraphs: {value}",
                ),
                check(
                    CitationCount,
                    TierLadder::new(
                        vec![Tier::at_least(10.0, 30.0), Tier::at_least(5.0, 20.0).flagged(Low)],
                        10.0,
                        High,
                    ),
                    "Few citations found: {value}",
                ),
                check(
                    AverageParagraphLength,
                    TierLadder::new(
                        vec![Tier::at_least(200.0, 20.0), Tier::at_least(100.0, 15.0).flagged(Low)],
                        5.0,
                        Low,
                    ),
                    "Paragraphs are too short (average: {value} characters)",
                ),
                check(
                    FigureCount,
                    TierLadder::new(vec![Tier::at_least(1.0, 20.0)], 10.0, Low),
                    "Document has no figures or captions",
                ),
            ],
            references: ReferencePolicy {
                base_max: 100.0,
                count: TierLadder::new(
                    vec![
                        Tier::at_least(15.0, 40.0),
                        Tier::at_least(10.0, 30.0),
                        Tier::at_least(5.0, 20.0),
                    ],
                    10.0,
                    Critical,
                ),
                alphabetical_points: 20.0,
            },
            citations: CitationPolicy::Consistency {
                max_points: 100.0,
                points_per_match: 2.0,
                unmatched_max: 10.0,
                unused_max: 5.0,
            },
        }
    }

    pub fn article() -> Self {
        use ContentMetric::*;
        use Severity::*;

        Self {
            label: "Article".to_string(),
            structure: StructurePolicy {
                max_points: 100.0,
                required: vec![
                    required(&["RESUMO"], 20.0, Critical),
                    required(&["ABSTRACT"], 20.0, Critical),
                    required(&["INTRODUÇÃO"], 20.0, Critical),
                    required(&["REFERÊNCIAS"], 20.0, Critical),
                    required(&["METODOLOGIA"], 7.0, High),
                    required(&["RESULTADOS"], 7.0, High),
                    required(&["CONCLUSÃO"], 7.0, High),
                ],
                heading_bonus: None,
            },
            formatting_sample: 15,
            humanize_values: false,
            content: vec![
                check(
                    WordCount,
                    TierLadder::new(
                        vec![
                            Tier::between(4000.0, 8000.0, 30.0),
                            Tier::between(3000.0, 10000.0, 20.0).flagged(Medium),
                        ],
                        10.0,
                        High,
                    ),
                    "Article has {value} words (ideal: 4000-8000)",
                ),
                check(
                    CitationCount,
                    TierLadder::new(
                        vec![Tier::at_least(15.0, 30.0), Tier::at_least(10.0, 20.0).flagged(Low)],
                        10.0,
                        High,
                    ),
                    "Few citations for a scientific article: {value}",
                ),
                check(
                    FigureCount,
                    TierLadder::new(
                        vec![Tier::at_least(3.0, 20.0), Tier::at_least(1.0, 15.0).flagged(Low)],
                        5.0,
                        Medium,
                    ),
                    "Scientific articles should contain figures, tables or charts (found {value})",
                ),
                check(
                    ListCount,
                    TierLadder::new(
                        vec![Tier::at_least(2.0, 20.0), Tier::at_least(1.0, 10.0).flagged(Low)],
                        5.0,
                        Low,
                    ),
                    "Scientific articles usually contain enumerated lists (found {value})",
                ),
            ],
            references: ReferencePolicy {
                base_max: 100.0,
                count: TierLadder::new(
                    vec![
                        Tier::at_least(20.0, 50.0),
                        Tier::at_least(15.0, 40.0),
                        Tier::at_least(10.0, 30.0),
                    ],
                    15.0,
                    Critical,
                ),
                alphabetical_points: 20.0,
            },
            citations: CitationPolicy::Density {
                max_points: 50.0,
                coverage: TierLadder::new(
                    vec![Tier::at_least(0.8, 25.0), Tier::at_least(0.5, 15.0).flagged(Low)],
                    5.0,
                    Medium,
                ),
                density: TierLadder::new(
                    vec![Tier::at_least(0.3, 25.0), Tier::at_least(0.15, 15.0).flagged(Low)],
                    5.0,
                    Low,
                ),
            },
        }
    }

    pub fn content_max(&self) -> f64 {
        self.content.iter().map(|c| c.ladder.max_points()).sum()
    }
}
