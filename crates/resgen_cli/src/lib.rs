//! Command-line interface for resgen.
//!
//! # Usage
//!
//! ```bash
//! # Generate resolver typings and scaffolds from ./resgen.yml
//! resgen generate
//!
//! # Use another configuration, regenerate typings only
//! resgen generate -c api/resgen.yml --no-scaffold
//!
//! # Show what would be written
//! resgen generate --dry-run
//!
//! # Validate model bindings without generating
//! resgen check
//! ```

pub mod config;
pub mod pipeline;

use clap::{Parser, Subcommand};
use colored::Colorize;
use config::Config;
use pipeline::{Outcome, PipelineError, RunOptions};
use resgen_core::{Diagnostic, DiagnosticBag, DiagnosticSeverity};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "resgen")]
#[command(author, version, about = "GraphQL resolver typings and scaffolding for TypeScript", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate resolver typings and scaffolds
    #[command(alias = "gen")]
    Generate {
        /// Configuration file (defaults to resgen.yml in the current directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip resolver scaffolding
        #[arg(long)]
        no_scaffold: bool,

        /// List the files that would be written without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Check model bindings against the schema
    Check {
        /// Configuration file (defaults to resgen.yml in the current directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

/// Output verbosity.
#[derive(Debug, Clone, Copy)]
struct Output {
    verbose: bool,
    quiet: bool,
}

/// Runs the CLI with the given arguments and returns the exit code.
pub fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let output = Output {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Generate {
            config,
            no_scaffold,
            dry_run,
        } => {
            let config = Config::discover(config.as_deref())?;
            let options = RunOptions {
                scaffold: !no_scaffold,
                dry_run,
            };
            generate(&config, options, output)
        }
        Commands::Check { config } => {
            let config = Config::discover(config.as_deref())?;
            check(&config, output)
        }
        Commands::Version => {
            println!("resgen {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    }
}

fn generate(
    config: &Config,
    options: RunOptions,
    output: Output,
) -> Result<i32, Box<dyn std::error::Error>> {
    let outcome = match pipeline::run(config, options) {
        Ok(outcome) => outcome,
        Err(PipelineError::Schema(err)) => return report_schema_error(&err),
        Err(err) => return Err(err.into()),
    };

    report_diagnostics(outcome.diagnostics(), output);

    match outcome {
        Outcome::Invalid { diagnostics } => {
            print_failure(&diagnostics);
            Ok(1)
        }
        Outcome::Generated { code, report, .. } => {
            if options.dry_run {
                for artifact in code.artifacts() {
                    println!("{} {}", "Would write".yellow(), artifact.path.display());
                    if output.verbose {
                        println!("{}", artifact.contents);
                    }
                }
                return Ok(0);
            }

            if !output.quiet {
                for path in &report.written {
                    println!("{} {}", "Generated".green(), path.display());
                }
                if output.verbose {
                    for path in &report.skipped {
                        println!("{} {} (exists)", "Skipped".dimmed(), path.display());
                    }
                }
            }
            Ok(0)
        }
    }
}

fn check(config: &Config, output: Output) -> Result<i32, Box<dyn std::error::Error>> {
    let checked = match pipeline::check(config) {
        Ok(checked) => checked,
        Err(PipelineError::Schema(err)) => return report_schema_error(&err),
        Err(err) => return Err(err.into()),
    };

    report_diagnostics(&checked.diagnostics, output);

    if checked.is_ok() {
        if !output.quiet {
            println!(
                "{} {} model binding(s) checked",
                "Success:".green().bold(),
                checked.models.iter().count()
            );
        }
        Ok(0)
    } else {
        print_failure(&checked.diagnostics);
        Ok(1)
    }
}

/// Renders a schema error with its source snippet.
fn report_schema_error(err: &resgen_schema::SchemaError) -> Result<i32, Box<dyn std::error::Error>> {
    let mut rendered = String::new();
    miette::GraphicalReportHandler::new().render_report(&mut rendered, err)?;
    eprintln!("{rendered}");
    Ok(1)
}

fn report_diagnostics(diagnostics: &DiagnosticBag, output: Output) {
    for diagnostic in diagnostics.iter() {
        if output.quiet && !diagnostic.is_error() {
            continue;
        }
        eprintln!("{}", format_diagnostic(diagnostic));
    }
}

fn print_failure(diagnostics: &DiagnosticBag) {
    eprintln!(
        "{} {} error(s), no code generated",
        "Error:".red().bold(),
        diagnostics.error_count()
    );
}

fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    let label = match diagnostic.severity {
        DiagnosticSeverity::Error => format!("error[{}]", diagnostic.category.code()).red().bold(),
        DiagnosticSeverity::Warning => {
            format!("warning[{}]", diagnostic.category.code()).yellow().bold()
        }
    };
    format!(
        "{label} {} {}\n  {} {}",
        diagnostic.subject().bold(),
        diagnostic.message,
        "-->".blue(),
        diagnostic.category
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use resgen_core::DiagnosticCategory;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_flags() {
        let cli = Cli::try_parse_from(["resgen", "-q", "generate", "-c", "api/resgen.yml", "--no-scaffold"]).unwrap();
        assert!(cli.quiet);
        match cli.command {
            Commands::Generate {
                config,
                no_scaffold,
                dry_run,
            } => {
                assert_eq!(config, Some(PathBuf::from("api/resgen.yml")));
                assert!(no_scaffold);
                assert!(!dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_format_diagnostic() {
        colored::control::set_override(false);
        let diagnostic = Diagnostic::error(DiagnosticCategory::MissingModel, "has no model")
            .with_type("User")
            .with_field("friends");
        assert_eq!(
            format_diagnostic(&diagnostic),
            "error[R0011] User.friends has no model\n  --> MissingModel"
        );
    }
}
