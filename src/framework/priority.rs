// Copyright 2025 Cowboy AI, LLC.

//! Extension priorities
//!
//! Priorities order providers handed to an aggregator, the entries of raw
//! extension arrays, and the decorator chain. The order is total: a lesser
//! priority is applied first (outermost for decorators).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::warn;

/// Priority of an extension
#[derive(Debug, Clone, Copy, Default)]
pub enum Priority {
    /// Always applied first
    Mandatory,
    /// Rank 1000
    Preferred,
    /// Rank 100
    Optional,
    /// Rank 0, used when no priority is declared
    #[default]
    Unspecified,
    /// Rank -100
    Default,
    /// Always applied last
    Fallback,
    /// Explicit numeric rank
    Rank(i64),
}

/// Priority as written in a bundle definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrioritySpec {
    /// A named level such as `"mandatory"`
    Named(String),
    /// A numeric rank
    Numeric(f64),
}

impl Priority {
    /// Numeric rank; higher ranks are applied earlier
    pub fn rank(&self) -> i64 {
        match self {
            Priority::Mandatory => i64::MAX,
            Priority::Preferred => 1000,
            Priority::Optional => 100,
            Priority::Unspecified => 0,
            Priority::Default => -100,
            Priority::Fallback => i64::MIN,
            Priority::Rank(rank) => *rank,
        }
    }

    /// Parse a named level
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mandatory" => Some(Priority::Mandatory),
            "preferred" => Some(Priority::Preferred),
            "optional" => Some(Priority::Optional),
            "none" => Some(Priority::Unspecified),
            "default" => Some(Priority::Default),
            "fallback" => Some(Priority::Fallback),
            _ => None,
        }
    }

    /// Interpret a declared priority; unknown names fall back to unspecified
    pub fn from_spec(spec: Option<&PrioritySpec>, owner: &str) -> Self {
        match spec {
            None => Priority::Unspecified,
            Some(PrioritySpec::Named(name)) => Priority::from_name(name).unwrap_or_else(|| {
                warn!(
                    extension = %owner,
                    priority = %name,
                    "Unrecognized priority; using default"
                );
                Priority::Unspecified
            }),
            Some(PrioritySpec::Numeric(value)) if value.is_nan() => {
                warn!(extension = %owner, "NaN priority; using default");
                Priority::Unspecified
            }
            Some(PrioritySpec::Numeric(value)) => {
                if *value == f64::INFINITY {
                    Priority::Mandatory
                } else if *value == f64::NEG_INFINITY {
                    Priority::Fallback
                } else {
                    Priority::Rank(*value as i64)
                }
            }
        }
    }
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        other.rank().cmp(&self.rank())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Mandatory => write!(f, "mandatory"),
            Priority::Preferred => write!(f, "preferred"),
            Priority::Optional => write!(f, "optional"),
            Priority::Unspecified => write!(f, "none"),
            Priority::Default => write!(f, "default"),
            Priority::Fallback => write!(f, "fallback"),
            Priority::Rank(rank) => write!(f, "{rank}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_named_levels_are_totally_ordered() {
        let mut levels = vec![
            Priority::Fallback,
            Priority::Unspecified,
            Priority::Mandatory,
            Priority::Default,
            Priority::Preferred,
            Priority::Optional,
        ];
        levels.sort();
        let names: Vec<String> = levels.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            vec!["mandatory", "preferred", "optional", "none", "default", "fallback"]
        );
    }

    #[test]
    fn test_spec_parsing() {
        let named: PrioritySpec = serde_json::from_str("\"fallback\"").unwrap();
        assert_eq!(Priority::from_spec(Some(&named), "test"), Priority::Fallback);

        let numeric: PrioritySpec = serde_json::from_str("250").unwrap();
        assert_eq!(Priority::from_spec(Some(&numeric), "test"), Priority::Rank(250));

        let bogus = PrioritySpec::Named("urgent".to_string());
        assert_eq!(Priority::from_spec(Some(&bogus), "test"), Priority::Unspecified);

        assert_eq!(Priority::from_spec(None, "test"), Priority::Unspecified);
    }

    proptest! {
        #[test]
        fn prop_mandatory_and_fallback_bound_every_rank(rank in any::<i32>()) {
            let p = Priority::Rank(rank as i64);
            prop_assert!(Priority::Mandatory <= p);
            prop_assert!(p <= Priority::Fallback);
        }
    }
}
