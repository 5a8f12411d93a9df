//! Coverage report for changed files: lookup, threshold checks and output
//! formatting.

use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use crate::cobertura::Coverage;
use crate::convert::SOURCE_EXTENSION;
use crate::counters::{counter_rate, find};
use crate::error::{JacocovError, Result};
use crate::model::{CounterType, Report};

/// Default threshold, in percent, under which a file is flagged.
pub const DEFAULT_THRESHOLD: f64 = 80.0;

/// Coverage found for one changed file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRates {
    /// Package the file belongs to, `/`- or `.`-separated.
    pub package: String,
    pub line_rate: f64,
    pub branch_rate: f64,
}

/// One row of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangedFileEntry {
    pub file: String,
    pub line_rate: f64,
    pub branch_rate: f64,
    pub coverage_link: String,
}

impl ChangedFileEntry {
    /// Strictly below `threshold` percent on lines or branches.
    #[must_use]
    pub fn is_below(&self, threshold: f64) -> bool {
        self.line_rate * 100.0 < threshold || self.branch_rate * 100.0 < threshold
    }
}

/// Finds coverage for a changed file.
pub trait CoverageLookup {
    /// `Ok(None)` when the report has no data for `path`.
    fn lookup(&self, path: &str) -> Result<Option<FileRates>>;
}

/// Looks files up by basename in the raw JaCoCo report. The first matching
/// `<sourcefile>` wins, scanning packages in document order. Rates come from
/// the sourcefile's own counters: an absent LINE or BRANCH counter rates
/// 0.0, a present one with nothing to cover rates 1.0.
pub struct DirectLookup {
    pub report: Report,
}

impl CoverageLookup for DirectLookup {
    fn lookup(&self, path: &str) -> Result<Option<FileRates>> {
        let name = file_name(path)?;
        for package in &self.report.packages {
            if let Some(file) = package.source_files.iter().find(|sf| sf.name == name) {
                let rate = |kind| find(&file.counters, kind).map(counter_rate).unwrap_or(0.0);
                return Ok(Some(FileRates {
                    package: package.name.clone(),
                    line_rate: rate(CounterType::Line),
                    branch_rate: rate(CounterType::Branch),
                }));
            }
        }
        Ok(None)
    }
}

/// Looks files up in a converted Cobertura document by their path relative
/// to a source root. Files under no configured root are skipped. When
/// several classes share a file (nested classes), the first one's rates are
/// used; these follow the same absent-is-0.0 rule as [`DirectLookup`].
pub struct ConvertedLookup {
    pub coverage: Coverage,
    pub source_roots: Vec<String>,
}

impl ConvertedLookup {
    fn relative_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        self.source_roots.iter().find_map(|root| {
            let root = root.trim_end_matches('/');
            if root.is_empty() {
                return Some(path);
            }
            path.strip_prefix(root)?.strip_prefix('/')
        })
    }
}

impl CoverageLookup for ConvertedLookup {
    fn lookup(&self, path: &str) -> Result<Option<FileRates>> {
        file_name(path)?;
        let Some(relative) = self.relative_path(path) else {
            log::debug!("{path} is under no source root, skipping");
            return Ok(None);
        };
        for package in &self.coverage.packages {
            if let Some(class) = package.classes.iter().find(|c| c.filename == relative) {
                return Ok(Some(FileRates {
                    package: package.name.clone(),
                    line_rate: class.rates.line_rate,
                    branch_rate: class.rates.branch_rate,
                }));
            }
        }
        Ok(None)
    }
}

fn file_name(path: &str) -> Result<&str> {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| JacocovError::Lookup {
            path: path.to_string(),
            reason: "path has no file name".to_string(),
        })
}

/// Link to the JaCoCo HTML page of a source file:
/// `<html_dir>/<package as path>/<File>.html`.
pub fn coverage_link(html_dir: &Path, package: &str, path: &str) -> String {
    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    let page = match name.strip_suffix(SOURCE_EXTENSION) {
        Some(stem) => format!("{stem}.html"),
        None => name.to_string(),
    };
    let mut link = html_dir.to_path_buf();
    for part in package.split(['.', '/']).filter(|p| !p.is_empty()) {
        link.push(part);
    }
    link.push(page);
    link.display().to_string()
}

/// Report rows for changed files, ready to be formatted.
#[derive(Debug, Clone)]
pub struct ChangedCoverageReport {
    pub base_branch: String,
    /// Threshold in percent.
    pub threshold: f64,
    pub files: Vec<ChangedFileEntry>,
}

impl ChangedCoverageReport {
    pub fn below_threshold(&self) -> Vec<&ChangedFileEntry> {
        self.files
            .iter()
            .filter(|f| f.is_below(self.threshold))
            .collect()
    }

    /// Format using a specific formatter.
    #[must_use]
    pub fn format(&self, formatter: &dyn ReportFormatter) -> String {
        formatter.format(self)
    }
}

/// Build a [`ChangedCoverageReport`]. Files without coverage data are left
/// out; files whose lookup fails are logged and left out.
pub fn build_report(
    changed: &[String],
    lookup: &dyn CoverageLookup,
    html_dir: &Path,
    base_branch: &str,
    threshold: f64,
) -> ChangedCoverageReport {
    let mut files = Vec::new();
    for path in changed {
        match lookup.lookup(path) {
            Ok(Some(rates)) => files.push(ChangedFileEntry {
                file: path.clone(),
                line_rate: rates.line_rate,
                branch_rate: rates.branch_rate,
                coverage_link: coverage_link(html_dir, &rates.package, path),
            }),
            Ok(None) => {}
            Err(e) => log::warn!("{e}"),
        }
    }

    ChangedCoverageReport {
        base_branch: base_branch.to_string(),
        threshold,
        files,
    }
}

/// Trait for formatting changed-file coverage reports.
pub trait ReportFormatter {
    /// Format the report to a string.
    fn format(&self, report: &ChangedCoverageReport) -> String;
}

/// Table layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStyle {
    /// `+---+` borders around every row, `=` under the header.
    Grid,
    /// Dashed rule under the header, no borders.
    Simple,
    /// Markdown pipe table.
    Pipe,
    /// Emacs org-mode table.
    Orgtbl,
}

impl TableStyle {
    /// comfy-table preset. Each character is one table component; a space
    /// leaves that component out.
    fn preset(self) -> &'static str {
        match self {
            TableStyle::Grid => "||--+=++|-+++++++++",
            TableStyle::Simple => "     -             ",
            TableStyle::Pipe => "||  |-|||          ",
            TableStyle::Orgtbl => "||  |-+||          ",
        }
    }
}

const HEADERS: [&str; 4] = ["File", "Line Coverage", "Branch Coverage", "Coverage Report"];

/// Table plus a warnings section for files under the threshold.
pub struct TableFormatter {
    pub style: TableStyle,
}

impl ReportFormatter for TableFormatter {
    fn format(&self, report: &ChangedCoverageReport) -> String {
        let rows: Vec<[String; 4]> = report
            .files
            .iter()
            .map(|f| {
                [
                    f.file.clone(),
                    percent(f.line_rate),
                    percent(f.branch_rate),
                    f.coverage_link.clone(),
                ]
            })
            .collect();

        let mut out = format!(
            "\nCoverage Report for Changed Files (comparing against {}):\n",
            report.base_branch
        );
        out.push_str(&render_table(self.style, &HEADERS, &rows));

        let low = report.below_threshold();
        if !low.is_empty() {
            out.push_str(&format!(
                "\nWarning: Following files have coverage below {}%:\n",
                crate::cobertura::decimal(report.threshold)
            ));
            for f in low {
                out.push_str(&format!("- {}\n", f.file));
                out.push_str(&format!("  Line Coverage: {}\n", percent(f.line_rate)));
                out.push_str(&format!("  Branch Coverage: {}\n", percent(f.branch_rate)));
            }
        }
        out
    }
}

/// Machine-readable output.
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonReport<'a> {
    base_branch: &'a str,
    threshold: f64,
    files: &'a [ChangedFileEntry],
    below_threshold: Vec<&'a str>,
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &ChangedCoverageReport) -> String {
        let json = JsonReport {
            base_branch: &report.base_branch,
            threshold: report.threshold,
            files: &report.files,
            below_threshold: report
                .below_threshold()
                .into_iter()
                .map(|f| f.file.as_str())
                .collect(),
        };
        let mut out = serde_json::to_string_pretty(&json).unwrap_or_default();
        out.push('\n');
        out
    }
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Render a left-aligned table in the given style, with a trailing newline.
pub fn render_table<const N: usize>(
    style: TableStyle,
    headers: &[&str; N],
    rows: &[[String; N]],
) -> String {
    let mut table = Table::new();
    table
        .load_preset(style.preset())
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(headers.to_vec());
    for row in rows {
        table.add_row(row.to_vec());
    }
    if style == TableStyle::Simple {
        for column in table.column_iter_mut() {
            column.set_padding((0, 1));
        }
    }

    let mut out = String::new();
    for line in table.lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Counter, Package, SourceFile};

    fn entry(file: &str, line_rate: f64, branch_rate: f64) -> ChangedFileEntry {
        ChangedFileEntry {
            file: file.to_string(),
            line_rate,
            branch_rate,
            coverage_link: format!("target/site/jacoco/{file}.html"),
        }
    }

    fn report(files: Vec<ChangedFileEntry>) -> ChangedCoverageReport {
        ChangedCoverageReport {
            base_branch: "develop".to_string(),
            threshold: DEFAULT_THRESHOLD,
            files,
        }
    }

    fn source_file(name: &str, counters: Vec<Counter>) -> SourceFile {
        SourceFile {
            name: name.to_string(),
            lines: vec![],
            counters,
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        let low = entry("Low", 0.79, 0.90);
        let exact = entry("Exact", 0.80, 0.80);
        assert!(low.is_below(80.0));
        assert!(!exact.is_below(80.0));

        let r = report(vec![low, exact]);
        let below: Vec<&str> = r.below_threshold().iter().map(|f| f.file.as_str()).collect();
        assert_eq!(below, vec!["Low"]);
    }

    #[test]
    fn test_coverage_link() {
        let dir = Path::new("target/site/jacoco");
        assert_eq!(
            coverage_link(dir, "com/example", "src/main/java/com/example/Foo.java"),
            "target/site/jacoco/com/example/Foo.html"
        );
        assert_eq!(
            coverage_link(dir, "com.example", "Foo.java"),
            "target/site/jacoco/com/example/Foo.html"
        );
        assert_eq!(coverage_link(dir, "", "Foo.java"), "target/site/jacoco/Foo.html");
    }

    #[test]
    fn test_direct_lookup_first_match_wins() {
        let lookup = DirectLookup {
            report: Report {
                packages: vec![
                    Package {
                        name: "a".to_string(),
                        classes: vec![],
                        source_files: vec![source_file(
                            "Util.java",
                            vec![Counter::new(CounterType::Line, 1, 3)],
                        )],
                        counters: vec![],
                    },
                    Package {
                        name: "b".to_string(),
                        classes: vec![],
                        source_files: vec![source_file(
                            "Util.java",
                            vec![Counter::new(CounterType::Line, 3, 1)],
                        )],
                        counters: vec![],
                    },
                ],
                ..Report::new()
            },
        };

        let found = lookup.lookup("src/b/Util.java").unwrap().unwrap();
        assert_eq!(found.package, "a");
        assert_eq!(found.line_rate, 0.25);
        // No BRANCH counter: no data.
        assert_eq!(found.branch_rate, 0.0);
        assert!(lookup.lookup("src/Other.java").unwrap().is_none());
    }

    #[test]
    fn test_direct_lookup_zero_total_is_covered() {
        let lookup = DirectLookup {
            report: Report {
                packages: vec![Package {
                    name: "p".to_string(),
                    classes: vec![],
                    source_files: vec![source_file(
                        "Empty.java",
                        vec![
                            Counter::new(CounterType::Line, 0, 0),
                            Counter::new(CounterType::Branch, 0, 0),
                        ],
                    )],
                    counters: vec![],
                }],
                ..Report::new()
            },
        };
        let found = lookup.lookup("Empty.java").unwrap().unwrap();
        assert_eq!(found.line_rate, 1.0);
        assert_eq!(found.branch_rate, 1.0);
    }

    #[test]
    fn test_lookup_rejects_path_without_file_name() {
        let lookup = DirectLookup {
            report: Report::new(),
        };
        assert!(matches!(
            lookup.lookup("src/.."),
            Err(JacocovError::Lookup { .. })
        ));
    }

    #[test]
    fn test_converted_lookup_requires_source_root() {
        use crate::cobertura::{Class, Package as CobPackage, Rates};

        let lookup = ConvertedLookup {
            coverage: Coverage {
                packages: vec![CobPackage {
                    name: "com.example".to_string(),
                    classes: vec![Class {
                        name: "com.example.Foo".to_string(),
                        filename: "com/example/Foo.java".to_string(),
                        methods: vec![],
                        lines: vec![],
                        rates: Rates {
                            line_rate: 0.5,
                            branch_rate: 0.25,
                            complexity: 2.0,
                        },
                    }],
                    rates: Rates::default(),
                }],
                ..Coverage::default()
            },
            source_roots: vec!["lib/".to_string(), "src/main/java/".to_string()],
        };

        let found = lookup
            .lookup("src/main/java/com/example/Foo.java")
            .unwrap()
            .unwrap();
        assert_eq!(found.package, "com.example");
        assert_eq!(found.line_rate, 0.5);
        assert_eq!(found.branch_rate, 0.25);

        assert!(lookup.lookup("other/com/example/Foo.java").unwrap().is_none());
        assert!(lookup.lookup("src/main/javax/com/example/Foo.java").unwrap().is_none());
    }

    #[test]
    fn test_build_report_skips_missing_and_failed() {
        let lookup = DirectLookup {
            report: Report {
                packages: vec![Package {
                    name: "com/example".to_string(),
                    classes: vec![],
                    source_files: vec![source_file(
                        "Foo.java",
                        vec![
                            Counter::new(CounterType::Line, 4, 1),
                            Counter::new(CounterType::Branch, 1, 1),
                        ],
                    )],
                    counters: vec![],
                }],
                ..Report::new()
            },
        };
        let changed = vec![
            "src/main/java/com/example/Foo.java".to_string(),
            "src/main/java/com/example/New.java".to_string(),
            "..".to_string(),
        ];
        let r = build_report(
            &changed,
            &lookup,
            Path::new("target/site/jacoco"),
            "develop",
            80.0,
        );
        assert_eq!(r.files.len(), 1);
        assert_eq!(r.files[0].line_rate, 0.8);
        assert_eq!(
            r.files[0].coverage_link,
            "target/site/jacoco/com/example/Foo.html"
        );
    }

    #[test]
    fn test_table_formatter_with_warnings() {
        let r = report(vec![entry("A.java", 0.79, 0.9), entry("B.java", 1.0, 0.8)]);
        let out = r.format(&TableFormatter {
            style: TableStyle::Grid,
        });

        assert!(out.starts_with("\nCoverage Report for Changed Files (comparing against develop):\n"));
        assert!(out.contains("| File "));
        assert!(out.contains("| 79.0%"));
        assert!(out.contains("\nWarning: Following files have coverage below 80.0%:\n- A.java\n  Line Coverage: 79.0%\n  Branch Coverage: 90.0%\n"));
        assert!(!out.contains("- B.java"));
    }

    #[test]
    fn test_table_formatter_without_warnings() {
        let r = report(vec![entry("A.java", 1.0, 1.0)]);
        let out = r.format(&TableFormatter {
            style: TableStyle::Simple,
        });
        assert!(out.contains("100.0%"));
        assert!(!out.contains("Warning"));
    }

    #[test]
    fn test_render_grid() {
        let rows = vec![["a".to_string(), "1".to_string()]];
        let out = render_table(TableStyle::Grid, &["Col", "N"], &rows);
        assert_eq!(
            out,
            "+-----+---+\n| Col | N |\n+=====+===+\n| a   | 1 |\n+-----+---+\n"
        );
    }

    #[test]
    fn test_render_grid_rules_between_rows() {
        let rows = vec![
            ["a".to_string(), "1".to_string()],
            ["bb".to_string(), "2".to_string()],
        ];
        let out = render_table(TableStyle::Grid, &["Col", "N"], &rows);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[4], "+-----+---+");
        assert_eq!(lines[5], "| bb  | 2 |");
    }

    #[test]
    fn test_render_simple() {
        let rows = vec![["abc".to_string(), "1".to_string()]];
        let out = render_table(TableStyle::Simple, &["Column", "N"], &rows);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Column"));
        assert!(lines[0].ends_with('N'));
        assert!(lines[1].starts_with("------"));
        assert!(lines[1].chars().all(|c| c == '-' || c == ' '));
        assert!(lines[2].starts_with("abc "));
        assert!(lines[2].ends_with('1'));
        assert!(!out.contains('|'));
    }

    #[test]
    fn test_render_pipe() {
        let rows = vec![["abcd".to_string(), "1".to_string()]];
        let out = render_table(TableStyle::Pipe, &["Col", "N"], &rows);
        assert_eq!(out, "| Col  | N |\n|------|---|\n| abcd | 1 |\n");
    }

    #[test]
    fn test_render_orgtbl() {
        let rows = vec![["a".to_string(), "1".to_string()]];
        let out = render_table(TableStyle::Orgtbl, &["Col", "N"], &rows);
        assert_eq!(out, "| Col | N |\n|-----+---|\n| a   | 1 |\n");
    }

    #[test]
    fn test_render_header_only() {
        let out = render_table(TableStyle::Orgtbl, &["Col", "N"], &[]);
        assert!(out.starts_with("| Col | N |\n"));
        assert!(!out.contains("| a"));
    }

    #[test]
    fn test_json_formatter() {
        let r = report(vec![entry("A.java", 0.5, 1.0)]);
        let out = r.format(&JsonFormatter);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["base_branch"], "develop");
        assert_eq!(value["files"][0]["file"], "A.java");
        assert_eq!(value["files"][0]["line_rate"], 0.5);
        assert_eq!(value["below_threshold"][0], "A.java");
    }
}
