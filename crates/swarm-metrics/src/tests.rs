//! Unit tests for swarm-metrics.

use swarm_core::{AgentId, PoiId};

use crate::{
    global_summary_table, mean, p95, render_table, result_line, write_coverage_csv,
    GlobalMetrics, LatencySamples, LeaderReport, RunInfo,
};

fn info() -> RunInfo {
    RunInfo {
        seed:          123,
        num_leaders:   2,
        num_followers: 6,
        num_pois:      100,
        buffer_size:   5,
        policy:        "load_balancing".into(),
    }
}

// ── statistics ────────────────────────────────────────────────────────────────

#[test]
fn mean_of_empty_is_nan() {
    assert!(mean(&[]).is_nan());
    assert!(p95(&[]).is_nan());
}

#[test]
fn mean_basic() {
    assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
}

#[test]
fn p95_uses_nearest_rank_below_index() {
    // index = int(0.95 * (n - 1)); for n = 10 that is int(8.55) = 8.
    let vals: Vec<f64> = (1..=10).map(|v| v as f64).collect();
    assert_eq!(p95(&vals), 9.0);
    // Single sample: index 0.
    assert_eq!(p95(&[4.2]), 4.2);
}

#[test]
fn p95_sorts_before_indexing() {
    // n = 5 → index int(0.95 * 4) = 3 → fourth smallest.
    assert_eq!(p95(&[9.0, 1.0, 5.0, 3.0, 7.0]), 7.0);
}

// ── latency samples ───────────────────────────────────────────────────────────

#[test]
fn latency_samples_drain() {
    let mut bucket = LatencySamples::new();
    bucket.push(PoiId(1), 0.5);
    bucket.push(PoiId(2), 1.5);
    let mut sink = Vec::new();
    bucket.drain_into(&mut sink);
    assert_eq!(sink, vec![0.5, 1.5]);
    assert!(bucket.is_empty());
}

// ── global metrics ────────────────────────────────────────────────────────────

#[test]
fn unique_set_is_monotone() {
    let mut m = GlobalMetrics::new();
    assert!(m.record_unique(PoiId(1)));
    assert!(!m.record_unique(PoiId(1)));
    assert_eq!(m.unique.len(), 1);
}

#[test]
fn coverage_fraction() {
    let mut m = GlobalMetrics::new();
    m.record_unique(PoiId(0));
    m.record_unique(PoiId(1));
    let (covered, total, rate) = m.coverage(8);
    assert_eq!((covered, total), (2, 8));
    assert!((rate - 0.25).abs() < 1e-12);
}

#[test]
fn leader_report_sums() {
    let mut m = GlobalMetrics::new();
    m.leader_reports.push(LeaderReport {
        leader: AgentId(0),
        assigns_sent: 5,
        assign_success: 4,
        redundant_delivers: 1,
    });
    m.leader_reports.push(LeaderReport {
        leader: AgentId(1),
        assigns_sent: 3,
        assign_success: 3,
        redundant_delivers: 0,
    });
    assert_eq!(m.assigns_sent(), 8);
    assert_eq!(m.assign_success(), 7);
}

// ── rendering ─────────────────────────────────────────────────────────────────

#[test]
fn result_line_shape() {
    let mut m = GlobalMetrics::new();
    m.record_unique(PoiId(0));
    m.global_score = 1.0;
    m.lat_service = vec![1.0, 2.0];
    m.lat_contact = vec![0.2];
    m.lat_e2e = vec![3.0];
    m.cam_raw = 40;
    m.cam_matches = 7;
    m.leader_reports.push(LeaderReport {
        leader: AgentId(0),
        assigns_sent: 2,
        assign_success: 1,
        redundant_delivers: 0,
    });

    let line = result_line(&info(), &m);
    assert!(line.starts_with("RESULT seed=123 K=2 rho=3.0 num_pois=100 num_vqcs=6 M=5"));
    assert!(line.contains("policy=load_balancing"));
    assert!(line.contains("assigns_sent=2 assign_success=1 redundant_delivers=0"));
    // p95 of two samples indexes int(0.95 * 1) = 0, the smaller one.
    assert!(line.contains("avg_latency=1.500s p95_latency=1.000s"));
    assert!(line.contains("coverage=1/100 coverage_rate=0.010"));
    assert!(line.contains("global_score=1.00"));
    assert!(line.contains("cam_raw=40 cam_matches=7"));
}

#[test]
fn table_renders_aligned_columns() {
    let rows = vec![
        ["a".to_string(), "1".to_string(), "".to_string()],
        ["longer name".to_string(), "22".to_string(), "note".to_string()],
    ];
    let table = render_table(["Metric", "Value", "Notes"], &rows);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 4);
    // All lines are equally wide.
    assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    assert!(lines[1].contains("-+-"));
}

#[test]
fn global_table_mentions_core_metrics() {
    let m = GlobalMetrics::new();
    let table = global_summary_table(&m, 10);
    assert!(table.contains("Unique PoIs delivered"));
    assert!(table.contains("Global mission score"));
}

// ── csv ───────────────────────────────────────────────────────────────────────

#[test]
fn coverage_csv_sorted_by_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coverage.csv");
    let timeline = vec![(2.0, 2), (1.0, 1), (3.0, 3)];
    write_coverage_csv(&path, &timeline).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "elapsed_secs,unique_count");
    assert_eq!(lines[1], "1.000,1");
    assert_eq!(lines[2], "2.000,2");
    assert_eq!(lines[3], "3.000,3");
}
