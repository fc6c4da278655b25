use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Leading float, the way a lenient CSS reader sees `"12.5pt"` or `"1.5"`.
static LEADING_FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)").unwrap());

const PX_TO_PT: f64 = 0.75;

/// One side of a rule comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Missing,
    Number(f64),
    Text(String),
}

impl RuleValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RuleValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RuleValue::Missing)
    }
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Missing => f.write_str("not defined"),
            RuleValue::Number(n) => write!(f, "{}", n),
            RuleValue::Text(t) => f.write_str(t),
        }
    }
}

/// Result of one formatting check. Never an error: unparsable input is `valid: false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCheck {
    pub valid: bool,
    pub actual: RuleValue,
    pub expected: RuleValue,
    pub difference: Option<f64>,
}

impl RuleCheck {
    fn missing(expected: RuleValue) -> Self {
        Self {
            valid: false,
            actual: RuleValue::Missing,
            expected,
            difference: None,
        }
    }

    fn within(actual: f64, expected: f64, tolerance: f64) -> Self {
        let difference = actual - expected;
        Self {
            valid: difference.abs() <= tolerance,
            actual: RuleValue::Number(actual),
            expected: RuleValue::Number(expected),
            difference: Some(difference),
        }
    }
}

pub fn leading_float(value: &str) -> Option<f64> {
    LEADING_FLOAT
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Convert a CSS length to points. `cm_per_point` is the configured
/// centimetre length of one point.
pub fn parse_size(value: &str, cm_per_point: f64) -> Option<f64> {
    let trimmed = value.trim().to_ascii_lowercase();
    if trimmed.is_empty() {
        return None;
    }

    let units: [(&str, fn(f64, f64) -> f64); 4] = [
        ("pt", |v, _| v),
        ("px", |v, _| v * PX_TO_PT),
        ("cm", |v, c| v / c),
        ("mm", |v, c| v / (c * 10.0)),
    ];

    for (suffix, convert) in units {
        if let Some(number) = trimmed.strip_suffix(suffix) {
            if let Ok(v) = number.trim().parse::<f64>() {
                return Some(convert(v, cm_per_point));
            }
        }
    }

    leading_float(&trimmed)
}

/// Percentages stay percentages; lengths are converted like sizes.
pub fn parse_spacing(value: &str, cm_per_point: f64) -> Option<f64> {
    let trimmed = value.trim();
    if let Some(percent) = trimmed.strip_suffix('%') {
        return leading_float(percent);
    }
    let lower = trimmed.to_ascii_lowercase();
    if ["pt", "px", "cm"].iter().any(|unit| lower.ends_with(unit)) {
        return parse_size(trimmed, cm_per_point);
    }
    leading_float(trimmed)
}

pub fn check_font_size(
    font_size: Option<&str>,
    expected: f64,
    tolerance: f64,
    cm_per_point: f64,
) -> RuleCheck {
    match font_size.and_then(|v| parse_size(v, cm_per_point)) {
        Some(actual) => RuleCheck::within(actual, expected, tolerance),
        None => RuleCheck::missing(RuleValue::Number(expected)),
    }
}

/// First family of the declaration, quotes removed, must contain one of the allowed names.
pub fn check_font(font_family: Option<&str>, allowed: &[String]) -> RuleCheck {
    let expected = RuleValue::Text(allowed.join(" or "));
    let Some(family) = font_family else {
        return RuleCheck::missing(expected);
    };

    let unquoted: String = family.chars().filter(|c| *c != '\'' && *c != '"').collect();
    let first = unquoted.split(',').next().unwrap_or("").trim().to_string();
    let lower = first.to_lowercase();
    let valid = allowed.iter().any(|f| lower.contains(&f.to_lowercase()));

    RuleCheck {
        valid,
        actual: RuleValue::Text(first),
        expected,
        difference: None,
    }
}

/// Line spacing in percent: `"150%"`, `"normal"` (100) or a unitless multiplier.
pub fn check_line_spacing(line_height: Option<&str>, expected: f64, tolerance: f64) -> RuleCheck {
    let Some(raw) = line_height else {
        return RuleCheck::missing(RuleValue::Number(expected));
    };

    let trimmed = raw.trim();
    let percent = if let Some(p) = trimmed.strip_suffix('%') {
        leading_float(p)
    } else if trimmed == "normal" {
        Some(100.0)
    } else {
        leading_float(trimmed).map(|v| v * 100.0)
    };

    match percent {
        Some(actual) => RuleCheck::within(actual, expected, tolerance),
        None => RuleCheck {
            valid: false,
            actual: RuleValue::Text(raw.to_string()),
            expected: RuleValue::Number(expected),
            difference: None,
        },
    }
}

pub fn check_alignment(text_align: Option<&str>, expected: &str) -> RuleCheck {
    let expected_value = RuleValue::Text(expected.to_string());
    match text_align {
        Some(actual) => RuleCheck {
            valid: actual == expected,
            actual: RuleValue::Text(actual.to_string()),
            expected: expected_value,
            difference: None,
        },
        None => RuleCheck::missing(expected_value),
    }
}

pub fn check_indent(
    text_indent: Option<&str>,
    expected: f64,
    tolerance: f64,
    cm_per_point: f64,
) -> RuleCheck {
    check_length(text_indent, expected, tolerance, cm_per_point)
}

pub fn check_margin(
    margin: Option<&str>,
    expected: f64,
    tolerance: f64,
    cm_per_point: f64,
) -> RuleCheck {
    check_length(margin, expected, tolerance, cm_per_point)
}

fn check_length(value: Option<&str>, expected: f64, tolerance: f64, cm_per_point: f64) -> RuleCheck {
    match value.and_then(|v| parse_size(v, cm_per_point)) {
        Some(actual) => RuleCheck::within(actual, expected, tolerance),
        None => RuleCheck::missing(RuleValue::Number(expected)),
    }
}
