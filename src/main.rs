use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use jacocov::cli::{self, CoverageInput, Lookup, OutputFormat, ReportOptions};
use jacocov::diff::GitChanges;

/// jacocov: coverage of changed files from JaCoCo reports, and JaCoCo to
/// Cobertura conversion.
#[derive(Parser)]
#[command(name = "jacocov", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report coverage for files changed against a base branch.
    Report {
        /// Path to the jacoco.xml file, or `-` for stdin.
        #[arg(long, required_unless_present = "cobertura_xml")]
        jacoco_xml: Option<PathBuf>,

        /// Use an already-converted Cobertura file instead of the JaCoCo report.
        #[arg(long, conflicts_with = "jacoco_xml")]
        cobertura_xml: Option<PathBuf>,

        /// Source root directories (e.g. src/main/java).
        #[arg(long, required = true, num_args = 1..)]
        source_roots: Vec<String>,

        /// Base branch to compare changes against.
        #[arg(long, default_value = "develop")]
        base_branch: String,

        /// Coverage threshold percentage for warnings.
        #[arg(long, default_value_t = 80.0)]
        coverage_threshold: f64,

        /// Directory containing the JaCoCo HTML report.
        #[arg(long, default_value = "target/site/jacoco")]
        jacoco_html_dir: PathBuf,

        /// Output table format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Grid)]
        output_format: OutputFormat,

        /// How per-file coverage is looked up.
        #[arg(long, value_enum, default_value_t = Lookup::Direct)]
        lookup: Lookup,

        /// Repository to diff in (default: current directory).
        #[arg(long)]
        repo: Option<PathBuf>,
    },

    /// Convert a JaCoCo XML report to Cobertura XML.
    Convert {
        /// Path to the jacoco.xml file, or `-` for stdin.
        jacoco_xml: PathBuf,

        /// Source root directories written to <sources>.
        source_roots: Vec<String>,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            jacoco_xml,
            cobertura_xml,
            source_roots,
            base_branch,
            coverage_threshold,
            jacoco_html_dir,
            output_format,
            lookup,
            repo,
        } => {
            let input = match (jacoco_xml, cobertura_xml) {
                (_, Some(path)) => CoverageInput::Cobertura(cli::read_input(&path)?),
                (Some(path), None) => CoverageInput::Jacoco(cli::read_input(&path)?),
                (None, None) => anyhow::bail!("--jacoco-xml or --cobertura-xml is required"),
            };
            let opts = ReportOptions {
                source_roots,
                base_branch,
                threshold: coverage_threshold,
                html_dir: jacoco_html_dir,
                format: output_format,
                lookup,
            };
            let out = cli::cmd_report(&input, &GitChanges { repo }, &opts)?;
            print!("{out}");
        }
        Commands::Convert {
            jacoco_xml,
            source_roots,
            output,
        } => {
            let input = cli::read_input(&jacoco_xml)?;
            let out = cli::cmd_convert(&input, &source_roots)?;
            match output {
                Some(path) => std::fs::write(&path, out)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => print!("{out}"),
            }
        }
    }
    Ok(())
}
