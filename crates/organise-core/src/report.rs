//! Outcome reporting

use std::path::PathBuf;

use organise_fs::Placement;
use serde::Serialize;

use crate::Error;
use crate::rule::Action;

/// What happened to one matched file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Dry run: the action would have been performed
    Planned,
    Created,
    Replaced,
    Unchanged,
    Failed { reason: String },
}

impl OutcomeStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl From<Placement> for OutcomeStatus {
    fn from(placement: Placement) -> Self {
        match placement {
            Placement::Created => Self::Created,
            Placement::Replaced => Self::Replaced,
            Placement::Unchanged => Self::Unchanged,
        }
    }
}

/// The result of applying one rule to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub source: PathBuf,
    /// Absent when the source could not even be listed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    pub action: Action,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

/// How a rule ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    /// At least one file matched
    Satisfied,
    /// Required, but nothing matched
    Unsatisfied,
    /// Optional, and nothing matched
    NoMatches,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub index: usize,
    /// The resolved source glob
    pub pattern: String,
    pub required: bool,
    pub status: RuleStatus,
    /// Candidates that matched the rule regexp
    pub matched: usize,
    /// Candidates the glob produced that the regexp rejected
    pub skipped: usize,
    pub outcomes: Vec<ActionOutcome>,
}

impl RuleReport {
    pub fn failures(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failure())
    }
}

/// The result of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrganiseReport {
    /// No required rule was unsatisfied and no file failed
    pub success: bool,
    pub dry_run: bool,
    pub rules: Vec<RuleReport>,
}

impl OrganiseReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            success: true,
            dry_run,
            rules: Vec::new(),
        }
    }

    pub fn push(&mut self, rule: RuleReport) {
        if rule.status == RuleStatus::Unsatisfied || rule.failures().next().is_some() {
            self.success = false;
        }
        self.rules.push(rule);
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.rules.iter().flat_map(|r| r.outcomes.iter())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.rules.iter().flat_map(RuleReport::failures)
    }

    /// One [`Error::RequiredRuleUnsatisfied`] per unsatisfied rule.
    pub fn unsatisfied(&self) -> Vec<Error> {
        self.rules
            .iter()
            .filter(|r| r.status == RuleStatus::Unsatisfied)
            .map(|r| Error::RequiredRuleUnsatisfied {
                index: r.index,
                pattern: r.pattern.clone(),
            })
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}
