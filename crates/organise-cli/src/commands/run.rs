//! Run command: apply a rule document and print the report

use std::path::Path;

use colored::Colorize;
use organise_core::{
    ActionOutcome, OrganiseOptions, OrganiseReport, Organiser, OutcomeStatus, RuleReport,
    RuleStatus,
};

use crate::error::{CliError, Result};

/// Apply the rules in `config` under `root`.
///
/// The report is printed even when the run fails; the failure is then
/// returned so the process exits non-zero.
pub fn run_organise(
    config: &Path,
    root: &Path,
    vars: &[(String, String)],
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let document = super::load_document(config, vars)?;
    let organiser = Organiser::from_document(&document)?.with_options(OrganiseOptions {
        root: root.to_path_buf(),
        dry_run,
    });

    if !json {
        let mode = if dry_run { " (dry run)" } else { "" };
        println!(
            "{} Organising with {}{}...",
            "=>".blue().bold(),
            config.display().to_string().cyan(),
            mode.yellow()
        );
    }

    let report = organiser.apply()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::RunFailed {
            unsatisfied: report.unsatisfied().len(),
            failed: report.failures().count(),
        })
    }
}

fn print_report(report: &OrganiseReport) {
    for rule in &report.rules {
        print_rule(rule);
    }

    println!();
    let total = report.outcomes().count();
    if report.is_success() {
        let verb = if report.dry_run { "planned" } else { "organised" };
        println!("{} {} file(s) {}.", "OK".green().bold(), total, verb);
    } else {
        for error in report.unsatisfied() {
            println!("{} {}", "UNSATISFIED".red().bold(), error);
        }
        for failure in report.failures() {
            print_outcome(failure);
        }
    }
}

fn print_rule(rule: &RuleReport) {
    let status = match rule.status {
        RuleStatus::Satisfied => "satisfied".green(),
        RuleStatus::Unsatisfied => "unsatisfied".red().bold(),
        RuleStatus::NoMatches => "no matches".dimmed(),
    };
    println!(
        "{} Rule #{} {} [{}] ({} matched, {} skipped)",
        "=>".blue().bold(),
        rule.index,
        rule.pattern.cyan(),
        status,
        rule.matched,
        rule.skipped
    );
    for outcome in &rule.outcomes {
        print_outcome(outcome);
    }
}

fn print_outcome(outcome: &ActionOutcome) {
    let destination = outcome
        .destination
        .as_ref()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    let (marker, label) = match &outcome.status {
        OutcomeStatus::Planned => ("~".yellow(), "planned".yellow().to_string()),
        OutcomeStatus::Created => ("+".green(), "created".green().to_string()),
        OutcomeStatus::Replaced => ("*".cyan(), "replaced".cyan().to_string()),
        OutcomeStatus::Unchanged => ("=".dimmed(), "unchanged".dimmed().to_string()),
        OutcomeStatus::Failed { reason } => ("!".red(), format!("{}: {}", "failed".red(), reason)),
    };
    println!(
        "   {} {} {} {} {} ({})",
        marker,
        outcome.action,
        outcome.source.display(),
        "->".dimmed(),
        destination,
        label
    );
}
