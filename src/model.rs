//! Typed in-memory representation of a JaCoCo XML report. The JaCoCo
//! parser decodes each element once into these records; everything
//! downstream (conversion, lookup) works on them.

use std::str::FromStr;

/// The metric a counter describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterType {
    Instruction,
    Branch,
    Line,
    Complexity,
    Method,
    Class,
}

impl FromStr for CounterType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "INSTRUCTION" => Ok(CounterType::Instruction),
            "BRANCH" => Ok(CounterType::Branch),
            "LINE" => Ok(CounterType::Line),
            "COMPLEXITY" => Ok(CounterType::Complexity),
            "METHOD" => Ok(CounterType::Method),
            "CLASS" => Ok(CounterType::Class),
            other => Err(other.to_string()),
        }
    }
}

/// A `<counter type=".." missed=".." covered=".."/>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    pub kind: CounterType,
    pub missed: u64,
    pub covered: u64,
}

impl Counter {
    pub fn new(kind: CounterType, covered: u64, missed: u64) -> Self {
        Self {
            kind,
            missed,
            covered,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.covered.saturating_add(self.missed)
    }
}

/// A `<line>` inside a `<sourcefile>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLine {
    pub number: u32,
    pub missed_instructions: u32,
    pub covered_instructions: u32,
    pub missed_branches: u32,
    pub covered_branches: u32,
}

impl SourceLine {
    /// JaCoCo has no hit counts; a line counts as hit when any of its
    /// instructions ran.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        self.covered_instructions > 0
    }

    #[must_use]
    pub fn total_branches(&self) -> u32 {
        self.covered_branches.saturating_add(self.missed_branches)
    }
}

/// A `<method>` of a class. Methods own no lines; see [`crate::lines`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub signature: String,
    pub start_line: u32,
    pub counters: Vec<Counter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    /// Binary name, e.g. `com/example/Foo$Inner`.
    pub name: String,
    pub methods: Vec<Method>,
    pub counters: Vec<Counter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub lines: Vec<SourceLine>,
    pub counters: Vec<Counter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Slash-separated package name, e.g. `com/example`.
    pub name: String,
    pub classes: Vec<Class>,
    pub source_files: Vec<SourceFile>,
    pub counters: Vec<Counter>,
}

/// The complete result of parsing one JaCoCo report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Report {
    pub name: Option<String>,
    /// `start` of the first `<sessioninfo>`, in epoch milliseconds.
    pub session_start_millis: Option<u64>,
    pub packages: Vec<Package>,
    pub counters: Vec<Counter>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }
}
