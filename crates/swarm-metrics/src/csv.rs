//! CSV export of run artifacts.

use std::path::Path;

use csv::Writer;
use thiserror::Error;

use crate::GlobalMetrics;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type MetricsResult<T> = Result<T, MetricsError>;

/// Write the coverage timeline as `elapsed_secs,unique_count` rows, sorted
/// by elapsed time (entries from different leaders interleave arbitrarily in
/// memory).
pub fn write_coverage_csv(path: &Path, timeline: &[(f64, usize)]) -> MetricsResult<()> {
    let mut sorted: Vec<(f64, usize)> = timeline.to_vec();
    sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut w = Writer::from_path(path)?;
    w.write_record(["elapsed_secs", "unique_count"])?;
    for (elapsed, count) in sorted {
        w.write_record([format!("{elapsed:.3}"), count.to_string()])?;
    }
    w.flush()?;
    Ok(())
}

/// Dump the pooled latency samples, one row per sample:
/// `kind,latency_secs`.
pub fn write_latency_csv(path: &Path, m: &GlobalMetrics) -> MetricsResult<()> {
    let mut w = Writer::from_path(path)?;
    w.write_record(["kind", "latency_secs"])?;
    for (kind, values) in [
        ("service", &m.lat_service),
        ("contact", &m.lat_contact),
        ("e2e", &m.lat_e2e),
        ("t_detect", &m.t_detect),
    ] {
        for v in values {
            w.write_record([kind.to_string(), format!("{v:.4}")])?;
        }
    }
    w.flush()?;
    Ok(())
}
