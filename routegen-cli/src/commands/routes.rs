//! Implementation of the `routegen routes` command.

use std::path::PathBuf;

use colored::{ColoredString, Colorize};
use routegen_build::{Route, Verb};

use crate::colors;

pub struct RoutesConfig {
    pub path: PathBuf,
    pub json: bool,
}

/// Execute the `routes` command.
pub fn execute(config: RoutesConfig) -> Result<(), String> {
    let generation = super::discover(&config.path)?;

    if config.json {
        let json = serde_json::to_string_pretty(&generation.routes)
            .map_err(|e| format!("Failed to serialize routes: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    println!();
    if generation.routes.is_empty() {
        println!(
            "  {}",
            "No routes found.".custom_color(colors::subtext())
        );
        println!();
        return Ok(());
    }

    let width = generation
        .routes
        .iter()
        .map(|route| route.path.len())
        .max()
        .unwrap_or(0);

    for route in &generation.routes {
        println!("  {}", format_route(route, width));
    }

    println!();
    println!(
        "  {} route(s), {} shared instance(s), {} target(s)",
        generation.routes.len(),
        generation.instance_fields.len(),
        generation.targets.len()
    );
    if !generation.skipped.is_empty() {
        println!(
            "  {} {} candidate(s) skipped, run {} for details",
            "WARN".custom_color(colors::yellow()).bold(),
            generation.skipped.len(),
            "routegen check".custom_color(colors::sky())
        );
    }
    println!();

    Ok(())
}

fn format_route(route: &Route, width: usize) -> String {
    let mut line = format!(
        "{:<6} {:<width$}  {}",
        verb_label(route.verb),
        route.path,
        route.handler.to_string().custom_color(colors::subtext()),
        width = width
    );
    if let Some(name) = &route.name {
        line.push_str(&format!(" {}", format!("[{}]", name).custom_color(colors::mauve())));
    }
    if let Some(configurator) = &route.configurator {
        line.push_str(&format!(
            " {}",
            format!("<- {}", configurator).custom_color(colors::sky())
        ));
    }
    line
}

fn verb_label(verb: Verb) -> ColoredString {
    let color = match verb {
        Verb::Get => colors::green(),
        Verb::Post => colors::blue(),
        Verb::Put => colors::yellow(),
        Verb::Delete => colors::red(),
    };
    verb.as_str().custom_color(color).bold()
}
