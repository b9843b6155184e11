//! Check command: validate a rule document without touching the filesystem

use std::path::Path;

use colored::Colorize;
use organise_core::Organiser;

use crate::error::Result;

/// Load the document, resolve its variables and compile every rule.
pub fn run_check(config: &Path, vars: &[(String, String)]) -> Result<()> {
    println!(
        "{} Checking {}...",
        "=>".blue().bold(),
        config.display().to_string().cyan()
    );

    let document = super::load_document(config, vars)?;
    let organiser = Organiser::from_document(&document)?;
    let compiled = organiser.compile()?;

    for (name, value) in organiser.variables().iter() {
        println!("   {} {} = {}", "-".dimmed(), name, value.dimmed());
    }
    for rule in &compiled {
        let required = if rule.rule.required { "required" } else { "optional" };
        println!(
            "   {} #{} {} {} {} ({}, {})",
            "*".cyan(),
            rule.rule.index,
            rule.source_pattern,
            "->".dimmed(),
            rule.destination,
            rule.rule.action,
            required
        );
        if let Some(pattern) = rule.matcher().pattern() {
            println!("       {} {}", "regexp".dimmed(), pattern);
        }
    }

    println!(
        "{} {} rule(s) valid.",
        "OK".green().bold(),
        compiled.len()
    );
    Ok(())
}
