//! routegen CLI - inspect and generate endpoint registration code.

mod colors;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "routegen")]
#[command(author, version, about = "CLI tool for routegen endpoint generation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Display version information
    Version,
    /// List discovered routes in registration order
    Routes {
        /// Crate directory (containing Cargo.toml)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
        /// Print routes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write registration units and the index file
    Generate {
        /// Crate directory (containing Cargo.toml)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
        /// Output directory (default: <path>/target/routegen)
        #[arg(short, long, env = "ROUTEGEN_OUT_DIR")]
        out: Option<PathBuf>,
        /// Watch for changes and regenerate
        #[arg(short, long)]
        watch: bool,
    },
    /// Report marked candidates that were skipped
    Check {
        /// Crate directory (containing Cargo.toml)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
        /// Exit with an error if anything was skipped
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Version) => {
            print_version();
            Ok(())
        }
        Some(Commands::Routes { path, json }) => {
            commands::routes::execute(commands::routes::RoutesConfig { path, json })
        }
        Some(Commands::Generate { path, out, watch }) => {
            commands::generate::execute(commands::generate::GenerateConfig { path, out, watch })
        }
        Some(Commands::Check { path, strict }) => {
            commands::check::execute(commands::check::CheckConfig { path, strict })
        }
        None => {
            println!(
                "{} {}",
                "routegen".custom_color(colors::mauve()).bold(),
                env!("CARGO_PKG_VERSION")
            );
            println!();
            println!("Run {} for usage information.", "routegen --help".cyan());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn print_version() {
    println!("routegen-cli {}", env!("CARGO_PKG_VERSION"));
}
