//! Merging static parameters with randomized values.

use crate::rule::RandomizationRule;
use crate::source::RandomSource;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Parse a name → rule-string mapping.
///
/// The result is ordered by key so a seeded source draws values in the same
/// order on every run.
pub fn parse_rules(rules: &BTreeMap<String, String>) -> BTreeMap<String, RandomizationRule> {
    rules
        .iter()
        .map(|(name, rule)| (name.clone(), RandomizationRule::parse(rule)))
        .collect()
}

/// Build the parameter set for one request cycle.
///
/// Starts from a copy of `base` and overlays one sampled value per rule.
/// A rule replaces a static parameter of the same name.
pub fn randomize_params(
    base: &Map<String, Value>,
    rules: &BTreeMap<String, RandomizationRule>,
    source: &dyn RandomSource,
) -> Map<String, Value> {
    let mut params = base.clone();
    for (name, rule) in rules {
        params.insert(name.clone(), rule.sample(source));
    }
    params
}
