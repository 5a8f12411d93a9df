//! Command handler functions for the jacocov CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::diff::{self, ChangeSource};
use crate::parsers::{cobertura, jacoco};
use crate::report::{
    self, ConvertedLookup, CoverageLookup, DirectLookup, JsonFormatter, ReportFormatter,
    TableFormatter, TableStyle,
};
use crate::{cobertura as cobertura_doc, convert};

/// Output style for the `report` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Grid,
    Simple,
    Pipe,
    Orgtbl,
    Json,
}

impl OutputFormat {
    fn formatter(self) -> Box<dyn ReportFormatter> {
        let style = match self {
            OutputFormat::Grid => TableStyle::Grid,
            OutputFormat::Simple => TableStyle::Simple,
            OutputFormat::Pipe => TableStyle::Pipe,
            OutputFormat::Orgtbl => TableStyle::Orgtbl,
            OutputFormat::Json => return Box::new(JsonFormatter),
        };
        Box::new(TableFormatter { style })
    }
}

/// Where per-file coverage is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Lookup {
    /// Match sourcefiles in the JaCoCo report by basename.
    Direct,
    /// Convert to Cobertura and match classes by source-root-relative path.
    Converted,
}

/// Coverage input for the `report` command.
pub enum CoverageInput {
    Jacoco(Vec<u8>),
    /// An already-converted Cobertura document.
    Cobertura(Vec<u8>),
}

pub struct ReportOptions {
    pub source_roots: Vec<String>,
    pub base_branch: String,
    pub threshold: f64,
    pub html_dir: PathBuf,
    pub format: OutputFormat,
    pub lookup: Lookup,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            source_roots: Vec::new(),
            base_branch: "develop".to_string(),
            threshold: report::DEFAULT_THRESHOLD,
            html_dir: PathBuf::from("target/site/jacoco"),
            format: OutputFormat::Grid,
            lookup: Lookup::Direct,
        }
    }
}

/// Read a report from `path`, or from stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read report from stdin")?;
        Ok(buf)
    } else {
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

pub fn cmd_report(
    input: &CoverageInput,
    changes: &dyn ChangeSource,
    opts: &ReportOptions,
) -> Result<String> {
    let changed = diff::changed_sources(changes, &opts.base_branch)?;
    if changed.is_empty() {
        return Ok(format!(
            "No Java files changed compared to {} branch\n",
            opts.base_branch
        ));
    }

    let lookup: Box<dyn CoverageLookup> = match (input, opts.lookup) {
        (CoverageInput::Jacoco(xml), Lookup::Direct) => Box::new(DirectLookup {
            report: jacoco::parse(xml).context("Failed to parse JaCoCo report")?,
        }),
        (CoverageInput::Jacoco(xml), Lookup::Converted) => {
            let report = jacoco::parse(xml).context("Failed to parse JaCoCo report")?;
            Box::new(ConvertedLookup {
                coverage: convert::convert_root(&report, &opts.source_roots),
                source_roots: opts.source_roots.clone(),
            })
        }
        (CoverageInput::Cobertura(xml), _) => Box::new(ConvertedLookup {
            coverage: cobertura::parse(xml).context("Failed to parse Cobertura report")?,
            source_roots: opts.source_roots.clone(),
        }),
    };

    let report = report::build_report(
        &changed,
        lookup.as_ref(),
        &opts.html_dir,
        &opts.base_branch,
        opts.threshold,
    );
    Ok(report.format(opts.format.formatter().as_ref()))
}

pub fn cmd_convert(input: &[u8], source_roots: &[String]) -> Result<String> {
    let report = jacoco::parse(input).context("Failed to parse JaCoCo report")?;
    let coverage = convert::convert_root(&report, source_roots);
    Ok(cobertura_doc::to_string(&coverage)?)
}
