//! Run-wide metric aggregates.

use rustc_hash::FxHashSet;
use swarm_core::{AgentId, PoiId};

/// What one leader contributed, recorded when it finishes.
#[derive(Clone, Debug)]
pub struct LeaderReport {
    pub leader: AgentId,
    pub assigns_sent: u64,
    pub assign_success: u64,
    pub redundant_delivers: u64,
}

/// Aggregates shared by every agent in a run.
///
/// `unique` is the authoritative set of delivered points: membership decides
/// whether a DELIVER is a first delivery or a redundant one, and its size
/// over time is the coverage curve.  It only ever grows.
#[derive(Debug, Default)]
pub struct GlobalMetrics {
    /// Points delivered at least once.
    pub unique: FxHashSet<PoiId>,
    /// Deliveries of points that were already in `unique`.
    pub redundant: u64,
    /// Sum of urgency weights of first deliveries.
    pub global_score: f64,

    /// Pooled latency samples across all leaders, seconds.
    pub lat_service: Vec<f64>,
    pub lat_contact: Vec<f64>,
    pub lat_e2e: Vec<f64>,
    pub t_detect: Vec<f64>,

    /// Raw camera detections and detections that matched a registered point.
    pub cam_raw: u64,
    pub cam_matches: u64,

    /// Per-leader contribution summaries.
    pub leader_reports: Vec<LeaderReport>,

    /// `(elapsed_secs, unique_count)` appended on every delivered entry.
    /// Interleaved across leaders; sort by elapsed time before plotting.
    pub coverage_timeline: Vec<(f64, usize)>,
}

impl GlobalMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a first delivery.  Returns `false` if the point was already
    /// delivered (the caller counts it as redundant instead).
    pub fn record_unique(&mut self, poi: PoiId) -> bool {
        self.unique.insert(poi)
    }

    pub fn assigns_sent(&self) -> u64 {
        self.leader_reports.iter().map(|r| r.assigns_sent).sum()
    }

    pub fn assign_success(&self) -> u64 {
        self.leader_reports.iter().map(|r| r.assign_success).sum()
    }

    /// `(delivered, total, fraction)` against the configured point count.
    pub fn coverage(&self, total_pois: usize) -> (usize, usize, f64) {
        let delivered = self.unique.len();
        let rate = if total_pois > 0 {
            delivered as f64 / total_pois as f64
        } else {
            f64::NAN
        };
        (delivered, total_pois, rate)
    }
}
