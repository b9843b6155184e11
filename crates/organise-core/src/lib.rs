//! Rule-driven runfolder reorganisation
//!
//! Reorganises sequencing-run output into a delivery layout according to an
//! ordered list of rules:
//!
//! - **Variables**: top-level tokens such as `<RUNFOLDER>`, resolved once to a
//!   fixed point ([`VariableMapping`])
//! - **Templater**: expands `<NAME>` tokens and `(?P=name)` backreferences
//!   ([`Templater`])
//! - **Matcher**: searches candidate paths with a rule's regexp and extracts
//!   named groups ([`RuleMatcher`], [`CaptureMap`])
//! - **Engine**: expands each rule's source glob, matches, resolves
//!   destinations and links or copies ([`Organiser`])
//!
//! ```text
//!   RuleDocument --> VariableMapping + Vec<Rule>
//!                          |
//!                      Organiser
//!                          |
//!     glob expand -> RuleMatcher -> Templater -> link / copy
//!                          |
//!                   OrganiseReport
//! ```
//!
//! # Example
//!
//! ```no_run
//! use organise_core::{Organiser, OrganiseOptions, RuleDocument};
//! use std::path::Path;
//!
//! fn run() -> organise_core::Result<bool> {
//!     let mut document = RuleDocument::load(Path::new("config/organise_runfolder.yml"))?;
//!     document.set_variable("RUNFOLDER_NAME", "200624_A00834_0183_BHMTFYDRXX");
//!
//!     let report = Organiser::from_document(&document)?
//!         .with_options(OrganiseOptions::default())
//!         .apply()?;
//!     Ok(report.is_success())
//! }
//! ```

pub mod engine;
pub mod error;
pub mod matcher;
pub mod report;
pub mod rule;
pub mod template;
pub mod variables;

pub use engine::{CandidateFailure, CompiledRule, Operation, OrganiseOptions, Organiser, Plan, RulePlan, apply};
pub use error::{Error, Result};
pub use matcher::{CaptureMap, RuleMatcher};
pub use report::{ActionOutcome, OrganiseReport, OutcomeStatus, RuleReport, RuleStatus};
pub use rule::{Action, LinkType, Rule, RuleDocument, RuleEntry, RuleOptions, ScalarValue};
pub use template::Templater;
pub use variables::VariableMapping;
