//! Human-readable reports: the benchmark runner and the page inspector.

mod benchmark;
mod inspect;
pub mod repr;

pub use benchmark::{run_benchmark, BenchmarkReport};
pub use inspect::{inspect, write_report};
