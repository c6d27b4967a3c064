//! `swarm-metrics` — run accounting and summary rendering.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`latency`] | `LatencySamples` — labelled latency sample vectors        |
//! | [`global`]  | `GlobalMetrics`, `LeaderReport` — run-wide aggregates     |
//! | [`summary`] | mean/p95, the grep-able RESULT line, table rendering      |
//! | [`csv`]     | coverage-timeline and latency CSV export                  |
//!
//! The per-leader buckets live inside each leader and are flushed into
//! `GlobalMetrics` once, when the leader finishes.  `GlobalMetrics` itself is
//! plain data: under the cooperative scheduler it is mutated through a
//! `RefCell` owned by the world context.

pub mod csv;
pub mod global;
pub mod latency;
pub mod summary;

#[cfg(test)]
mod tests;

pub use global::{GlobalMetrics, LeaderReport};
pub use latency::LatencySamples;
pub use summary::{global_summary_table, mean, p95, render_table, result_line, RunInfo};

pub use crate::csv::{write_coverage_csv, write_latency_csv, MetricsError, MetricsResult};
