//! Randomization rule parsing and sampling.

use crate::source::RandomSource;
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// How a single parameter gets its value for each request cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RandomizationRule {
    /// Uniform integer in `[min, max]`, both ends inclusive.
    IntRange { min: i64, max: i64 },
    /// The rule text did not match the range grammar and is sent as-is.
    Literal(String),
}

impl RandomizationRule {
    /// Parse a rule string. Never fails: unmatched input becomes a literal.
    pub fn parse(rule: &str) -> Self {
        match parse_range(rule) {
            Some((min, max)) => RandomizationRule::IntRange { min, max },
            None => RandomizationRule::Literal(rule.to_string()),
        }
    }

    /// Produce the value for one request cycle.
    ///
    /// A range with `min > max` collapses to `min`.
    pub fn sample(&self, source: &dyn RandomSource) -> Value {
        match self {
            RandomizationRule::IntRange { min, max } if max < min => Value::from(*min),
            RandomizationRule::IntRange { min, max } => {
                Value::from(source.next_in_range(*min, *max))
            }
            RandomizationRule::Literal(text) => Value::String(text.clone()),
        }
    }

    /// True when the rule text is not a range and is sent verbatim.
    pub fn is_literal(&self) -> bool {
        matches!(self, RandomizationRule::Literal(_))
    }
}

impl FromStr for RandomizationRule {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RandomizationRule::parse(s))
    }
}

impl fmt::Display for RandomizationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RandomizationRule::IntRange { min, max } => write!(f, "{min}-{max}"),
            RandomizationRule::Literal(text) => f.write_str(text),
        }
    }
}

/// Split `"<int>-<int>"` into its bounds.
///
/// The separator is the first `-` after an optional leading sign, so
/// `"-5--1"` reads as `-5` to `-1`.
fn parse_range(rule: &str) -> Option<(i64, i64)> {
    let skip = usize::from(rule.starts_with(['-', '+']));
    let sep = rule[skip..].find('-')? + skip;
    let min = parse_int(&rule[..sep])?;
    let max = parse_int(&rule[sep + 1..])?;
    Some((min, max))
}

fn parse_int(text: &str) -> Option<i64> {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
