//! JaCoCo to Cobertura conversion.
//!
//! Walks report → package → class → method and builds the equivalent
//! [`cobertura`](crate::cobertura) tree. Rates at every level come from the
//! element's own JaCoCo counters; nothing is recomputed from children.

use crate::cobertura::{self, Condition, Rates};
use crate::counters::Counted;
use crate::lines::{lines_for_file, lines_for_method};
use crate::model::{Class, Method, Package, Report, SourceLine};

/// Extension of the source files JaCoCo reports on.
pub const SOURCE_EXTENSION: &str = ".java";

/// Source path for a class binary name: nested-class suffixes (from the
/// first `$`) are dropped and the source extension appended, so
/// `com/example/Foo$Inner` maps to `com/example/Foo.java`.
pub fn infer_filename(class_name: &str) -> String {
    let outer = class_name.split('$').next().unwrap_or(class_name);
    format!("{outer}{SOURCE_EXTENSION}")
}

fn rates(element: &impl Counted) -> Rates {
    Rates {
        line_rate: element.line_rate(),
        branch_rate: element.branch_rate(),
        complexity: element.complexity(),
    }
}

pub fn convert_line(line: &SourceLine) -> cobertura::Line {
    let condition = if line.total_branches() > 0 {
        Some(Condition {
            covered: line.covered_branches,
            total: line.total_branches(),
        })
    } else {
        None
    };
    cobertura::Line {
        number: line.number,
        hits: u64::from(line.is_hit()),
        condition,
    }
}

pub fn convert_method<'a>(
    method: &Method,
    lines: impl IntoIterator<Item = &'a SourceLine>,
) -> cobertura::Method {
    cobertura::Method {
        name: method.name.clone(),
        signature: method.signature.clone(),
        lines: lines.into_iter().map(convert_line).collect(),
        rates: rates(method),
    }
}

pub fn convert_class(class: &Class, package: &Package) -> cobertura::Class {
    let filename = infer_filename(&class.name);
    let all_lines = lines_for_file(package, &filename);

    let methods = class
        .methods
        .iter()
        .map(|m| convert_method(m, lines_for_method(m, &class.methods, &all_lines)))
        .collect();

    cobertura::Class {
        name: class.name.replace('/', "."),
        filename,
        methods,
        lines: all_lines.iter().map(convert_line).collect(),
        rates: rates(class),
    }
}

pub fn convert_package(package: &Package) -> cobertura::Package {
    cobertura::Package {
        name: package.name.replace('/', "."),
        classes: package
            .classes
            .iter()
            .map(|c| convert_class(c, package))
            .collect(),
        rates: rates(package),
    }
}

/// Convert a whole report. The timestamp is the first session's start time
/// truncated to whole seconds (0 when the report has no session info).
pub fn convert_root(report: &Report, source_roots: &[String]) -> cobertura::Coverage {
    let coverage = cobertura::Coverage {
        timestamp: report.session_start_millis.unwrap_or(0) / 1000,
        sources: source_roots.to_vec(),
        packages: report.packages.iter().map(convert_package).collect(),
        rates: rates(report),
    };
    log::debug!(
        "converted {} packages, {} classes",
        coverage.packages.len(),
        coverage.packages.iter().map(|p| p.classes.len()).sum::<usize>()
    );
    coverage
}
