//! Attribution of `<sourcefile>` lines to files and methods.
//!
//! JaCoCo records a start line for each method but no end line, so a method
//! is taken to own every line from its start up to (not including) the next
//! larger start line in the same class. The last method is open-ended.
//! Methods that share a start line each claim the same range.

use std::path::Path;

use crate::model::{Method, Package, SourceLine};

/// All lines of `<sourcefile>` blocks in `package` whose name equals the
/// basename of `filename`, concatenated in document order.
pub fn lines_for_file(package: &Package, filename: &str) -> Vec<SourceLine> {
    let basename = basename(filename);
    package
        .source_files
        .iter()
        .filter(|sf| sf.name == basename)
        .flat_map(|sf| sf.lines.iter().copied())
        .collect()
}

/// Exclusive end line of `method`'s range: the smallest start line among
/// `methods` strictly greater than its own, or `None` when unbounded.
pub fn method_end_line(method: &Method, methods: &[Method]) -> Option<u32> {
    methods
        .iter()
        .map(|m| m.start_line)
        .filter(|&start| start > method.start_line)
        .min()
}

/// Lines of `lines` inside `method`'s range, `start <= nr < end`, in
/// ascending line order. `lines` may be unsorted when a file spans several
/// `<sourcefile>` blocks.
pub fn lines_for_method<'a>(
    method: &Method,
    methods: &[Method],
    lines: &'a [SourceLine],
) -> impl Iterator<Item = &'a SourceLine> + 'a {
    let start = method.start_line;
    let end = method_end_line(method, methods);
    let mut owned: Vec<&SourceLine> = lines
        .iter()
        .filter(|l| l.number >= start && end.map_or(true, |end| l.number < end))
        .collect();
    owned.sort_by_key(|l| l.number);
    owned.into_iter()
}

fn basename(filename: &str) -> &str {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename)
}
