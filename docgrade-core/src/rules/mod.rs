// Formatting and citation rules
// - engine.rs: unit parsing and tolerance checks on single CSS values
// - validation.rs: the rule table applied to one element's resolved style
// - citations.rs: in-text citation extraction and reference matching

pub mod citations;
pub mod engine;
pub mod validation;

pub use engine::{RuleCheck, RuleValue};
pub use validation::{FormattingRule, FormattingValidator, RuleOutcome, RuleViolation};
