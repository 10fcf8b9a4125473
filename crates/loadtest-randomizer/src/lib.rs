//! Per-request parameter randomization for request-runner.
//!
//! Every request cycle of a run gets its own parameter set. The set starts
//! from the static `params` of the configuration and is overlaid with one
//! value per randomization rule.
//!
//! # Rule grammar
//!
//! ```text
//! "<int>-<int>"   inclusive integer range, e.g. "1-1000" or "-10--1"
//! anything else   literal pass-through, the string itself is the value
//! ```
//!
//! # Example
//!
//! ```rust
//! use loadtest_randomizer::{parse_rules, randomize_params, SeededSource};
//! use std::collections::BTreeMap;
//!
//! let rules = parse_rules(&BTreeMap::from([
//!     ("id".to_string(), "1-1000".to_string()),
//!     ("kind".to_string(), "foo".to_string()),
//! ]));
//! let base = serde_json::Map::new();
//! let source = SeededSource::new(42);
//!
//! let params = randomize_params(&base, &rules, &source);
//! let id = params["id"].as_i64().unwrap();
//! assert!((1..=1000).contains(&id));
//! assert_eq!(params["kind"], "foo");
//! ```

pub mod params;
pub mod rule;
pub mod source;

// Re-exports for convenience
pub use params::{parse_rules, randomize_params};
pub use rule::RandomizationRule;
pub use source::{RandomSource, SeededSource, ThreadRngSource};
