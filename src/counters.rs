//! Rate and complexity aggregation over JaCoCo counters.
//!
//! A counter that is present but has nothing to cover (`covered + missed ==
//! 0`) is fully covered and rates 1.0. A counter type that is absent from the
//! record is "no data" and rates 0.0.

use crate::model::{Class, Counter, CounterType, Method, Package, Report, SourceFile};

/// Coverage rate of a single counter, 1.0 when it has no work.
#[must_use]
pub fn counter_rate(counter: &Counter) -> f64 {
    let total = counter.total();
    if total == 0 {
        1.0
    } else {
        counter.covered as f64 / total as f64
    }
}

/// First counter of the given type, in document order.
pub fn find(counters: &[Counter], kind: CounterType) -> Option<&Counter> {
    counters.iter().find(|c| c.kind == kind)
}

/// Rate for `kind`, or 0.0 when the record carries no such counter.
#[must_use]
pub fn rate(counters: &[Counter], kind: CounterType) -> f64 {
    find(counters, kind).map(counter_rate).unwrap_or(0.0)
}

/// Total (`covered + missed`) of the COMPLEXITY counter. This is a count,
/// not a ratio.
#[must_use]
pub fn complexity(counters: &[Counter]) -> f64 {
    find(counters, CounterType::Complexity)
        .map(|c| c.total() as f64)
        .unwrap_or(0.0)
}

/// Any JaCoCo element that carries `<counter>` children.
pub trait Counted {
    fn counters(&self) -> &[Counter];

    #[must_use]
    fn line_rate(&self) -> f64 {
        rate(self.counters(), CounterType::Line)
    }

    #[must_use]
    fn branch_rate(&self) -> f64 {
        rate(self.counters(), CounterType::Branch)
    }

    #[must_use]
    fn complexity(&self) -> f64 {
        complexity(self.counters())
    }
}

macro_rules! impl_counted {
    ($($ty:ty),*) => {
        $(impl Counted for $ty {
            fn counters(&self) -> &[Counter] {
                &self.counters
            }
        })*
    };
}

impl_counted!(Method, Class, SourceFile, Package, Report);
