//! Implementation of the `routegen check` command.

use std::path::PathBuf;

use colored::Colorize;
use routegen_build::Skipped;

use crate::colors;

pub struct CheckConfig {
    pub path: PathBuf,
    /// Fail when any candidate was skipped.
    pub strict: bool,
}

/// Execute the `check` command.
pub fn execute(config: CheckConfig) -> Result<(), String> {
    let generation = super::discover(&config.path)?;

    println!();
    if generation.skipped.is_empty() {
        println!(
            "{} All {} marked route(s) resolved.",
            "PASS".custom_color(colors::green()).bold(),
            generation.routes.len()
        );
        println!();
        return Ok(());
    }

    for skipped in &generation.skipped {
        println!("  {}", format_skipped(skipped));
    }
    println!();
    println!(
        "{} {} candidate(s) skipped, {} route(s) resolved",
        "WARN".custom_color(colors::yellow()).bold(),
        generation.skipped.len(),
        generation.routes.len()
    );
    println!();

    verdict(&generation.skipped, config.strict)
}

fn format_skipped(skipped: &Skipped) -> String {
    let location = skipped.location.to_string();
    if skipped.item.is_empty() {
        format!(
            "{} {} {}",
            "✗".custom_color(colors::red()),
            location.custom_color(colors::subtext()),
            skipped.reason
        )
    } else {
        format!(
            "{} {} {} {}",
            "✗".custom_color(colors::red()),
            location.custom_color(colors::subtext()),
            format!("`{}`", skipped.item).custom_color(colors::mauve()),
            skipped.reason
        )
    }
}

fn verdict(skipped: &[Skipped], strict: bool) -> Result<(), String> {
    if strict && !skipped.is_empty() {
        Err(format!("{} candidate(s) skipped", skipped.len()))
    } else {
        Ok(())
    }
}
