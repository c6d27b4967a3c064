//! Statistics and end-of-run rendering.
//!
//! The RESULT line is a stable, grep-able contract: sweep tooling parses it
//! with a regular expression.  Do not reorder or rename its fields.

use crate::GlobalMetrics;

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return f64::NAN;
    }
    vals.iter().sum::<f64>() / vals.len() as f64
}

/// 95th percentile by the nearest-rank-below rule: `sorted[0.95 * (n - 1)]`.
/// NaN for an empty slice.
pub fn p95(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return f64::NAN;
    }
    let mut sorted = vals.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted[(0.95 * (sorted.len() - 1) as f64) as usize]
}

/// Identification of one run, for the RESULT line.
#[derive(Clone, Debug)]
pub struct RunInfo {
    pub seed: u64,
    pub num_leaders: usize,
    pub num_followers: usize,
    pub num_pois: usize,
    pub buffer_size: usize,
    pub policy: String,
}

impl RunInfo {
    fn rho(&self) -> f64 {
        if self.num_leaders == 0 {
            return f64::NAN;
        }
        self.num_followers as f64 / self.num_leaders as f64
    }
}

/// The single machine-readable summary line printed at the end of a run.
pub fn result_line(info: &RunInfo, m: &GlobalMetrics) -> String {
    let (covered, total, rate) = m.coverage(info.num_pois);
    format!(
        "RESULT seed={} K={} rho={:.1} num_pois={} num_vqcs={} M={} policy={} \
         assigns_sent={} assign_success={} redundant_delivers={} \
         avg_latency={:.3}s p95_latency={:.3}s \
         ack_delay_mean={:.3}s ack_delay_p95={:.3}s \
         e2e_mean={:.3}s e2e_p95={:.3}s \
         coverage={}/{} coverage_rate={:.3} global_score={:.2} \
         cam_raw={} cam_matches={}",
        info.seed,
        info.num_leaders,
        info.rho(),
        info.num_pois,
        info.num_followers,
        info.buffer_size,
        info.policy,
        m.assigns_sent(),
        m.assign_success(),
        m.redundant,
        mean(&m.lat_service),
        p95(&m.lat_service),
        mean(&m.lat_contact),
        p95(&m.lat_contact),
        mean(&m.lat_e2e),
        p95(&m.lat_e2e),
        covered,
        total,
        rate,
        m.global_score,
        m.cam_raw,
        m.cam_matches,
    )
}

/// Fixed-width three-column table used for local and global summaries.
pub fn render_table(headers: [&str; 3], rows: &[[String; 3]]) -> String {
    let mut widths = [headers[0].len(), headers[1].len(), headers[2].len()];
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    let line = |cells: [&str; 3]| {
        format!(
            "{:<w0$} | {:<w1$} | {:<w2$}",
            cells[0], cells[1], cells[2],
            w0 = widths[0], w1 = widths[1], w2 = widths[2],
        )
    };
    let sep = format!(
        "{}-+-{}-+-{}",
        "-".repeat(widths[0]),
        "-".repeat(widths[1]),
        "-".repeat(widths[2]),
    );

    let mut out = vec![line(headers), sep];
    out.extend(rows.iter().map(|r| line([&r[0], &r[1], &r[2]])));
    out.join("\n")
}

/// The human-readable global summary table.
pub fn global_summary_table(m: &GlobalMetrics, total_pois: usize) -> String {
    let (covered, total, rate) = m.coverage(total_pois);
    let rows = vec![
        row("Unique PoIs delivered", format!("{covered}/{total}"), "delivered at least once"),
        row("Coverage rate", format!("{rate:.3}"), ""),
        row("Redundant reports", m.redundant.to_string(), "duplicate deliveries"),
        row("Assigns sent", m.assigns_sent().to_string(), "sum over leaders"),
        row("Successful delivers", m.assign_success().to_string(), "DELIVERs matching an assignment"),
        row("Avg service latency (s)", fmt3(mean(&m.lat_service)), "t_arrive - t_detect"),
        row("p95 service latency (s)", fmt3(p95(&m.lat_service)), ""),
        row("Avg contact overhead (s)", fmt3(mean(&m.lat_contact)), "t_deliver_ack - t_arrive"),
        row("p95 contact overhead (s)", fmt3(p95(&m.lat_contact)), ""),
        row("Avg e2e latency (s)", fmt3(mean(&m.lat_e2e)), "t_deliver_ack - t_spawn"),
        row("p95 e2e latency (s)", fmt3(p95(&m.lat_e2e)), ""),
        row("Avg time to detect (s)", fmt3(mean(&m.t_detect)), "t_detect - t_spawn"),
        row("Camera detections (raw)", m.cam_raw.to_string(), ""),
        row("Camera PoI matches", m.cam_matches.to_string(), ""),
        row("Global mission score", format!("{:.2}", m.global_score), "urgency-weighted"),
    ];
    render_table(["Metric", "Value", "Notes"], &rows)
}

fn row(name: &str, value: String, notes: &str) -> [String; 3] {
    [name.to_string(), value, notes.to_string()]
}

fn fmt3(v: f64) -> String {
    format!("{v:.3}")
}
