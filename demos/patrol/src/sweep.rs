//! sweep — run a (K, rho) × seed grid of simulations and collect one CSV
//! row per case.
//!
//! Cases are independent runs with their own private world, so they execute
//! in parallel on the rayon pool; rows are sorted before writing so the
//! output order does not depend on scheduling.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rayon::prelude::*;
use tracing::{info, warn};

use swarm_core::{FleetConfig, PolicyKind, SimConfig};
use swarm_metrics::{mean, p95};
use swarm_sim::{build_patrol_sim, NoopObserver};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sweep", about = "Grid sweep over fleet sizes and seeds")]
struct Args {
    /// Seeds to run for every grid point.
    #[arg(long, value_delimiter = ',', default_value = "123,114,115")]
    seeds: Vec<u64>,

    /// Leader counts (K axis).
    #[arg(long = "k_list", value_delimiter = ',', default_value = "1,2,3,4")]
    k_list: Vec<usize>,

    /// Followers per leader (rho axis); num_vqcs = K * rho.
    #[arg(long = "rho_list", value_delimiter = ',', default_value = "1,2,3,4")]
    rho_list: Vec<usize>,

    #[arg(long = "num_pois", default_value_t = 2500)]
    num_pois: usize,

    #[arg(long = "buffer_size", default_value_t = 5)]
    buffer_size: usize,

    #[arg(long, default_value = "load_balancing")]
    policy: PolicyKind,

    /// Simulated seconds per case.
    #[arg(long, default_value_t = 600.0)]
    duration: f64,

    /// Output CSV path.
    #[arg(long, default_value = "sweep_results.csv")]
    out: PathBuf,
}

// ── One case ──────────────────────────────────────────────────────────────────

struct Row {
    seed: u64,
    k: usize,
    rho: usize,
    num_vqcs: usize,
    assigns_sent: u64,
    assign_success: u64,
    redundant: u64,
    avg_latency: f64,
    p95_latency: f64,
    ack_mean: f64,
    ack_p95: f64,
    e2e_mean: f64,
    e2e_p95: f64,
    covered: usize,
    coverage_rate: f64,
    global_score: f64,
    cam_raw: u64,
    cam_matches: u64,
}

fn run_case(args: &Args, seed: u64, k: usize, rho: usize) -> Result<Row> {
    let num_vqcs = k * rho;
    let config = SimConfig {
        tick_duration_secs: 0.1,
        duration_secs: args.duration,
        seed,
    };
    let fleet = FleetConfig {
        num_pois: args.num_pois,
        num_leaders: k,
        num_followers: num_vqcs,
        buffer_size: args.buffer_size,
        policy: args.policy,
        ..FleetConfig::default()
    };

    let mut sim = build_patrol_sim(config, fleet)?;
    sim.run(&mut NoopObserver)?;

    let m = sim.world.metrics.borrow();
    let (covered, _, coverage_rate) = m.coverage(args.num_pois);
    Ok(Row {
        seed,
        k,
        rho,
        num_vqcs,
        assigns_sent: m.assigns_sent(),
        assign_success: m.assign_success(),
        redundant: m.redundant,
        avg_latency: mean(&m.lat_service),
        p95_latency: p95(&m.lat_service),
        ack_mean: mean(&m.lat_contact),
        ack_p95: p95(&m.lat_contact),
        e2e_mean: mean(&m.lat_e2e),
        e2e_p95: p95(&m.lat_e2e),
        covered,
        coverage_rate,
        global_score: m.global_score,
        cam_raw: m.cam_raw,
        cam_matches: m.cam_matches,
    })
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,sweep=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut cases: Vec<(u64, usize, usize)> = Vec::new();
    for &seed in &args.seeds {
        for &k in &args.k_list {
            for &rho in &args.rho_list {
                cases.push((seed, k, rho));
            }
        }
    }

    info!(cases = cases.len(), pois = args.num_pois, policy = %args.policy, "sweep starting");

    let results: Vec<((u64, usize, usize), Result<Row>)> = cases
        .par_iter()
        .map(|&(seed, k, rho)| ((seed, k, rho), run_case(&args, seed, k, rho)))
        .collect();

    let mut rows: Vec<Row> = Vec::new();
    for ((seed, k, rho), result) in results {
        match result {
            Ok(row) => rows.push(row),
            Err(err) => warn!(seed, k, rho, %err, "case failed"),
        }
    }
    rows.sort_by_key(|r| (r.seed, r.k, r.rho));

    let mut w = csv::Writer::from_path(&args.out)?;
    w.write_record([
        "seed", "K", "rho", "num_pois", "num_vqcs", "M", "policy",
        "assigns_sent", "assign_success", "redundant_delivers",
        "avg_latency_s", "p95_latency_s", "ack_mean_s", "ack_p95_s",
        "e2e_mean_s", "e2e_p95_s", "coverage", "coverage_rate",
        "global_score", "cam_raw", "cam_matches",
    ])?;
    for r in &rows {
        w.write_record([
            r.seed.to_string(),
            r.k.to_string(),
            r.rho.to_string(),
            args.num_pois.to_string(),
            r.num_vqcs.to_string(),
            args.buffer_size.to_string(),
            args.policy.to_string(),
            r.assigns_sent.to_string(),
            r.assign_success.to_string(),
            r.redundant.to_string(),
            format!("{:.3}", r.avg_latency),
            format!("{:.3}", r.p95_latency),
            format!("{:.3}", r.ack_mean),
            format!("{:.3}", r.ack_p95),
            format!("{:.3}", r.e2e_mean),
            format!("{:.3}", r.e2e_p95),
            format!("{}/{}", r.covered, args.num_pois),
            format!("{:.3}", r.coverage_rate),
            format!("{:.2}", r.global_score),
            r.cam_raw.to_string(),
            r.cam_matches.to_string(),
        ])?;
    }
    w.flush()?;

    info!(rows = rows.len(), out = %args.out.display(), "sweep complete");
    Ok(())
}
