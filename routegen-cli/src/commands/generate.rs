//! Implementation of the `routegen generate` command.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use colored::Colorize;
use notify_debouncer_mini::{DebounceEventResult, new_debouncer, notify::RecursiveMode};
use routegen_build::Generation;

use crate::colors;

/// Configuration for the generate command.
pub struct GenerateConfig {
    pub path: PathBuf,
    /// Output directory, `<path>/target/routegen` when unset.
    pub out: Option<PathBuf>,
    pub watch: bool,
}

impl GenerateConfig {
    fn out_dir(&self) -> PathBuf {
        self.out
            .clone()
            .unwrap_or_else(|| self.path.join("target").join("routegen"))
    }
}

/// Execute the `generate` command.
pub fn execute(config: GenerateConfig) -> Result<(), String> {
    if config.watch {
        run_watch_mode(&config)
    } else {
        generate_once(&config).map(|_| ())
    }
}

/// Run one pass and write its units.
fn generate_once(config: &GenerateConfig) -> Result<Generation, String> {
    let out_dir = config.out_dir();
    tracing::debug!(path = %config.path.display(), out = %out_dir.display(), "generating");
    let generation = super::project_builder(&config.path)?
        .out_dir(&out_dir)
        .run()
        .map_err(|e| e.to_string())?;

    print_summary(&generation, &out_dir);
    Ok(generation)
}

fn print_summary(generation: &Generation, out_dir: &Path) {
    println!();
    if !generation.library_referenced {
        println!(
            "{} The marker library is not a dependency, nothing generated.",
            "WARN".custom_color(colors::yellow()).bold()
        );
    } else if generation.units.is_empty() {
        println!(
            "{} No routes or no #[generate_endpoints] target, nothing generated.",
            "INFO".custom_color(colors::blue()).bold()
        );
    } else {
        for unit in &generation.units {
            println!(
                "  {} {} {}",
                "✓".custom_color(colors::green()),
                unit.target.impl_path(),
                format!("-> {}", unit.file_name).custom_color(colors::subtext())
            );
        }
        println!();
        println!(
            "{} {} route(s) into {} unit(s) in {}",
            "DONE".custom_color(colors::green()).bold(),
            generation.routes.len(),
            generation.units.len(),
            out_dir.display()
        );
    }

    if !generation.skipped.is_empty() {
        println!(
            "{} {} candidate(s) skipped, run {} for details",
            "WARN".custom_color(colors::yellow()).bold(),
            generation.skipped.len(),
            "routegen check".custom_color(colors::sky())
        );
    }
}

/// Directory scanned by the pass, honoring `source-dir`.
fn source_dir(config: &GenerateConfig) -> Result<PathBuf, String> {
    super::project_builder(&config.path)?
        .source_path()
        .map_err(|e| e.to_string())
}

/// Regenerate whenever a source file changes.
fn run_watch_mode(config: &GenerateConfig) -> Result<(), String> {
    let src = source_dir(config)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| format!("Failed to set Ctrl+C handler: {}", e))?;

    println!();
    println!(
        "{} Watch mode enabled. Press Ctrl+C to stop.",
        "INFO".custom_color(colors::blue()).bold()
    );

    report(generate_once(config));

    let (tx, rx) = mpsc::channel();

    let mut debouncer = new_debouncer(
        Duration::from_millis(300),
        move |res: DebounceEventResult| {
            if let Ok(events) = res {
                if let Some(event) = events.iter().find(|event| is_watched(&event.path)) {
                    tracing::debug!(path = %event.path.display(), "change detected");
                    let _ = tx.send(());
                }
            }
        },
    )
    .map_err(|e| format!("Failed to create file watcher: {}", e))?;

    debouncer
        .watcher()
        .watch(&src, RecursiveMode::Recursive)
        .map_err(|e| format!("Failed to watch {}: {}", src.display(), e))?;
    debouncer
        .watcher()
        .watch(&config.path.join("Cargo.toml"), RecursiveMode::NonRecursive)
        .map_err(|e| format!("Failed to watch Cargo.toml: {}", e))?;

    println!(
        "{} Watching {} for changes...",
        "INFO".custom_color(colors::blue()).bold(),
        src.display()
    );

    while running.load(Ordering::SeqCst) {
        if rx.recv_timeout(Duration::from_millis(100)).is_ok() {
            println!();
            println!(
                "{} Change detected, regenerating...",
                "INFO".custom_color(colors::yellow()).bold()
            );

            report(generate_once(config));

            println!(
                "{} Watching for changes...",
                "INFO".custom_color(colors::blue()).bold()
            );
        }
    }

    println!();
    println!(
        "{} Stopped watching.",
        "INFO".custom_color(colors::blue()).bold()
    );

    Ok(())
}

/// Errors do not end watch mode.
fn report(result: Result<Generation, String>) {
    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
    }
}

fn is_watched(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "rs")
        || path.file_name().is_some_and(|name| name == "Cargo.toml")
}
