pub mod cli;
pub mod cobertura;
pub mod convert;
pub mod counters;
pub mod diff;
pub mod error;
pub mod lines;
pub mod model;
pub mod parsers;
pub mod report;
