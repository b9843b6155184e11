//! Reorganisation engine
//!
//! A run happens in two phases. Planning compiles every rule, expands its
//! source glob, matches candidates and resolves destinations. Only when every
//! rule has planned cleanly does execution touch the filesystem, so a
//! malformed rule file never leaves a half-organised tree behind.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use organise_fs::{NormalizedPath, glob, io};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::matcher::{CaptureMap, RuleMatcher};
use crate::report::{ActionOutcome, OrganiseReport, OutcomeStatus, RuleReport, RuleStatus};
use crate::rule::{Action, Rule, RuleDocument};
use crate::template::{Templater, backreference_names};
use crate::variables::VariableMapping;
use crate::{Error, Result};

/// Options for an organisation run
#[derive(Debug, Clone)]
pub struct OrganiseOptions {
    /// Directory relative source and destination templates are resolved
    /// against
    pub root: PathBuf,
    /// If true, plan and report without modifying the filesystem
    pub dry_run: bool,
}

impl Default for OrganiseOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            dry_run: false,
        }
    }
}

/// A rule with its templates resolved against the variables and its regexp
/// compiled. Backreferences in `destination` are still pending.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: Rule,
    pub source_pattern: String,
    pub destination: String,
    matcher: RuleMatcher,
}

impl CompiledRule {
    fn compile(rule: &Rule, templater: &Templater<'_>) -> Result<Self> {
        let source_pattern = templater.resolve(&rule.source)?;
        let destination = templater.resolve(&rule.destination)?;
        let matcher = match &rule.regexp {
            Some(regexp) => RuleMatcher::new(&templater.resolve(regexp)?)?,
            None => RuleMatcher::any(),
        };

        if let Some(group) = backreference_names(&destination)
            .into_iter()
            .find(|group| !matcher.declares(group))
        {
            return Err(Error::UnknownBackreference {
                index: rule.index,
                group: group.to_string(),
            });
        }

        Ok(Self {
            rule: rule.clone(),
            source_pattern,
            destination,
            matcher,
        })
    }

    pub fn matcher(&self) -> &RuleMatcher {
        &self.matcher
    }
}

/// One filesystem action to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub action: Action,
    pub captures: CaptureMap,
}

/// A candidate that could not be considered, either because it could not be
/// listed or because the rule regexp failed on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything one rule will do.
#[derive(Debug)]
pub struct RulePlan {
    pub rule: Rule,
    pub pattern: String,
    pub root_exists: bool,
    pub skipped: usize,
    pub operations: Vec<Operation>,
    pub failures: Vec<CandidateFailure>,
}

#[derive(Debug, Default)]
pub struct Plan {
    pub rules: Vec<RulePlan>,
}

impl Plan {
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.rules.iter().flat_map(|r| r.operations.iter())
    }
}

/// Applies an ordered set of rules.
#[derive(Debug, Clone)]
pub struct Organiser {
    rules: Vec<Rule>,
    variables: VariableMapping,
    options: OrganiseOptions,
}

impl Organiser {
    pub fn new(rules: Vec<Rule>, variables: VariableMapping) -> Self {
        Self {
            rules,
            variables,
            options: OrganiseOptions::default(),
        }
    }

    /// Resolve a document's variables and validate its rules.
    pub fn from_document(document: &RuleDocument) -> Result<Self> {
        Ok(Self::new(document.rules()?, document.variable_mapping()?))
    }

    pub fn with_options(mut self, options: OrganiseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn variables(&self) -> &VariableMapping {
        &self.variables
    }

    pub fn options(&self) -> &OrganiseOptions {
        &self.options
    }

    /// Resolve and compile every rule without looking at the filesystem.
    pub fn compile(&self) -> Result<Vec<CompiledRule>> {
        let templater = Templater::new(&self.variables);
        self.rules
            .iter()
            .map(|rule| CompiledRule::compile(rule, &templater))
            .collect()
    }

    /// Expand, match and resolve every rule. Reads the filesystem, never
    /// writes it.
    ///
    /// # Errors
    ///
    /// Any configuration error, including two sources resolving to the same
    /// destination or a destination overlapping its own source. A regexp that
    /// fails on one candidate is recorded in [`RulePlan::failures`] instead.
    pub fn plan(&self) -> Result<Plan> {
        let compiled = self.compile()?;
        let templater = Templater::new(&self.variables);
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut plan = Plan::default();

        for rule in compiled {
            let span = info_span!("rule", index = rule.rule.index);
            let _guard = span.enter();

            let expansion = glob::expand(&self.options.root, &rule.source_pattern)?;
            if !expansion.root_exists {
                info!(root = %expansion.literal_root.display(), "Source root does not exist");
            }

            let failures = expansion
                .errors
                .iter()
                .map(|error| {
                    warn!(%error, "Could not list source entry");
                    CandidateFailure {
                        path: error
                            .path()
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|| PathBuf::from(&expansion.pattern)),
                        reason: error.to_string(),
                    }
                })
                .collect();

            let mut rule_plan = RulePlan {
                rule: rule.rule.clone(),
                pattern: expansion.pattern.clone(),
                root_exists: expansion.root_exists,
                skipped: 0,
                operations: Vec::new(),
                failures,
            };

            for candidate in expansion.paths {
                let captures = match rule.matcher.find(&candidate) {
                    Ok(Some(captures)) => captures,
                    Ok(None) => {
                        debug!(candidate = %candidate.display(), "No match");
                        rule_plan.skipped += 1;
                        continue;
                    }
                    Err(error) => {
                        warn!(candidate = %candidate.display(), %error, "Matching failed");
                        rule_plan.failures.push(CandidateFailure {
                            path: candidate,
                            reason: error.to_string(),
                        });
                        continue;
                    }
                };

                let resolved = templater.resolve_with(&rule.destination, &captures)?;
                let destination = self.anchor(&NormalizedPath::new(&resolved).place(&candidate));
                let destination = io::absolute(&destination)?;
                let source = io::absolute(&candidate)?;

                if source.starts_with(&destination)
                    || (rule.rule.action == Action::Copy
                        && candidate.is_dir()
                        && destination.starts_with(&source))
                {
                    return Err(Error::OverlappingDestination {
                        index: rule.rule.index,
                        path: source,
                        destination,
                    });
                }

                if let Some(first) = claimed.get(&destination)
                    && *first != source
                {
                    return Err(Error::DestinationConflict {
                        destination,
                        first: first.clone(),
                        second: source,
                    });
                }
                claimed.insert(destination.clone(), source.clone());

                debug!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "Matched"
                );
                rule_plan.operations.push(Operation {
                    source,
                    destination,
                    action: rule.rule.action,
                    captures,
                });
            }

            info!(
                pattern = %rule_plan.pattern,
                matched = rule_plan.operations.len(),
                skipped = rule_plan.skipped,
                "Planned rule"
            );
            plan.rules.push(rule_plan);
        }

        Ok(plan)
    }

    /// Plan, then perform every operation unless this is a dry run.
    ///
    /// Per-file failures and unsatisfied required rules are recorded in the
    /// report rather than returned as errors.
    pub fn apply(&self) -> Result<OrganiseReport> {
        let plan = self.plan()?;
        let mut report = OrganiseReport::new(self.options.dry_run);

        for rule_plan in plan.rules {
            let span = info_span!("rule", index = rule_plan.rule.index);
            let _guard = span.enter();

            let mut outcomes = Vec::with_capacity(rule_plan.operations.len());

            for failure in rule_plan.failures {
                outcomes.push(ActionOutcome {
                    source: failure.path,
                    destination: None,
                    action: rule_plan.rule.action,
                    status: OutcomeStatus::Failed {
                        reason: failure.reason,
                    },
                });
            }

            let matched = rule_plan.operations.len();
            for operation in rule_plan.operations {
                let status = if self.options.dry_run {
                    OutcomeStatus::Planned
                } else {
                    execute(&operation)
                };
                outcomes.push(ActionOutcome {
                    source: operation.source,
                    destination: Some(operation.destination),
                    action: operation.action,
                    status,
                });
            }

            let status = match (matched, rule_plan.rule.required) {
                (0, true) => {
                    warn!(pattern = %rule_plan.pattern, "Required rule matched no files");
                    RuleStatus::Unsatisfied
                }
                (0, false) => RuleStatus::NoMatches,
                _ => RuleStatus::Satisfied,
            };

            report.push(RuleReport {
                index: rule_plan.rule.index,
                pattern: rule_plan.pattern,
                required: rule_plan.rule.required,
                status,
                matched,
                skipped: rule_plan.skipped,
                outcomes,
            });
        }

        Ok(report)
    }

    fn anchor(&self, path: &Path) -> PathBuf {
        if path.is_relative() {
            self.options.root.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

fn execute(operation: &Operation) -> OutcomeStatus {
    let result = match operation.action {
        Action::Symlink => io::symlink_replace(&operation.source, &operation.destination),
        Action::Copy => io::copy_replace(&operation.source, &operation.destination),
    };
    match result {
        Ok(placement) => placement.into(),
        Err(error) => {
            warn!(
                source = %operation.source.display(),
                destination = %operation.destination.display(),
                %error,
                "Action failed"
            );
            OutcomeStatus::Failed {
                reason: error.to_string(),
            }
        }
    }
}

/// Apply `rules` with `variables` using default options.
pub fn apply(rules: Vec<Rule>, variables: VariableMapping) -> Result<OrganiseReport> {
    Organiser::new(rules, variables).apply()
}
