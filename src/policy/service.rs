// Copyright 2025 Cowboy AI, LLC.

//! Policy evaluation (`policyService`)
//!
//! A policy is a pure predicate over a candidate and its context. The
//! policy service answers for a category by requiring every policy
//! registered under it to allow.

use crate::errors::{FrameworkResult, PolicyDenial};
use crate::framework::ResolvedExtension;
use std::any::Any;
use std::sync::Arc;
use tracing::{trace, warn};

/// A predicate consulted before an operation
pub trait Policy: Send + Sync {
    /// Whether `candidate` is acceptable in `context`
    fn allow(&self, candidate: &dyn Any, context: &dyn Any) -> bool;
}

/// Answers whether an operation is allowed
pub trait PolicyService: Send + Sync {
    /// `Ok` when every policy of `category` allows, else the first denial
    fn check(&self, category: &str, candidate: &dyn Any, context: &dyn Any) -> Result<(), PolicyDenial>;

    /// Whether every policy of `category` allows
    fn allow(&self, category: &str, candidate: &dyn Any, context: &dyn Any) -> bool {
        self.check(category, candidate, context).is_ok()
    }
}

struct RegisteredPolicy {
    category: String,
    message: Option<String>,
    policy: Arc<dyn Policy>,
}

/// Policy service over the `policies` category
///
/// Each extension declares a `category` and optionally a `message` shown
/// when it denies.
pub struct PolicyProvider {
    policies: Vec<RegisteredPolicy>,
}

impl PolicyProvider {
    /// Build from resolved `policies[]` extensions
    pub fn new(extensions: &[ResolvedExtension]) -> FrameworkResult<Self> {
        let mut policies = Vec::new();
        for extension in extensions {
            let log_name = extension.extension().log_name();
            let Some(category) = extension.extension().metadata_str("category") else {
                warn!(extension = %log_name, "Policy without category; skipping");
                continue;
            };
            if !extension.has_implementation() {
                warn!(extension = %log_name, "Policy without implementation; skipping");
                continue;
            }
            policies.push(RegisteredPolicy {
                category: category.to_string(),
                message: extension.extension().metadata_str("message").map(String::from),
                policy: extension.implementation::<Arc<dyn Policy>>()?,
            });
        }
        Ok(Self { policies })
    }

    /// Provider over explicit `(category, message, policy)` entries
    pub fn from_policies(entries: Vec<(String, Option<String>, Arc<dyn Policy>)>) -> Self {
        Self {
            policies: entries
                .into_iter()
                .map(|(category, message, policy)| RegisteredPolicy {
                    category,
                    message,
                    policy,
                })
                .collect(),
        }
    }

    /// Number of policies registered for `category`
    pub fn count(&self, category: &str) -> usize {
        self.policies.iter().filter(|p| p.category == category).count()
    }
}

impl PolicyService for PolicyProvider {
    fn check(&self, category: &str, candidate: &dyn Any, context: &dyn Any) -> Result<(), PolicyDenial> {
        for registered in self.policies.iter().filter(|p| p.category == category) {
            if !registered.policy.allow(candidate, context) {
                let message = registered
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("not allowed by {category} policy"));
                trace!(category = %category, message = %message, "Policy denied");
                return Err(PolicyDenial {
                    category: category.to_string(),
                    message,
                });
            }
        }
        Ok(())
    }
}
