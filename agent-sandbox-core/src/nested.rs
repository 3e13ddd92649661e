//! Nested-Sandbox Filter (§4.8): enforces the command-wrapper monotonicity
//! rule when this invocation is itself running inside another sandbox
//! created by this launcher.

use std::collections::BTreeMap;

use crate::error::{Result, SandboxError};
use crate::policy::CommandRule;
use crate::selfbin::is_nested;

/// Outcome of filtering the inner command rules against an outer policy.
pub struct FilterOutcome {
    /// The rules that will actually be used to build the argument list.
    pub effective: BTreeMap<String, CommandRule>,
    /// Commands whose inner rule attempted to relax an outer rule and was
    /// discarded; surfaced so the caller can print a "blocked" diagnostic.
    pub relaxation_attempts: Vec<String>,
}

/// Apply the monotonicity rule: when nested, an inner rule may add new
/// wrappers or tighten existing ones, but may never relax one inherited
/// from the outer sandbox. Relaxation attempts are silently dropped from
/// `effective` (the outer rule is kept) and reported in
/// `relaxation_attempts`.
///
/// When not nested (`outer` is `None`), every inner rule passes through
/// unchanged.
pub fn filter(
    inner: &BTreeMap<String, CommandRule>,
    outer: Option<&BTreeMap<String, CommandRule>>,
    known_presets: &[&str],
) -> Result<FilterOutcome> {
    let mut effective = BTreeMap::new();
    let mut relaxation_attempts = Vec::new();

    match outer {
        None => {
            effective = inner.clone();
        }
        Some(outer_rules) => {
            for (name, inner_rule) in inner {
                match outer_rules.get(name) {
                    Some(outer_rule) => {
                        if inner_rule.is_at_least_as_restrictive_as(outer_rule) {
                            effective.insert(name.clone(), inner_rule.clone());
                        } else {
                            relaxation_attempts.push(name.clone());
                            effective.insert(name.clone(), outer_rule.clone());
                        }
                    }
                    None => {
                        effective.insert(name.clone(), inner_rule.clone());
                    }
                }
            }
            // Commands the inner config never mentioned but the outer
            // restricted remain in force.
            for (name, outer_rule) in outer_rules {
                effective.entry(name.clone()).or_insert_with(|| outer_rule.clone());
            }
        }
    }

    for rule in effective.values() {
        if let CommandRule::Preset(name) = rule {
            if !known_presets.contains(&name.as_str()) {
                return Err(SandboxError::UnknownPreset(name.clone()));
            }
        }
    }

    Ok(FilterOutcome {
        effective,
        relaxation_attempts,
    })
}

/// Whether this process is running inside another instance's sandbox
/// (§4.8 detection).
pub fn running_nested() -> bool {
    is_nested()
}
