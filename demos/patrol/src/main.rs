//! patrol — run one cooperative patrol/visit simulation and print its
//! summary table and RESULT line.
//!
//! The RESULT line is the machine-readable contract consumed by `sweep` and
//! external spreadsheet tooling; everything else on stdout is for humans.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use swarm_core::{FleetConfig, PolicyKind, SimConfig, Tick};
use swarm_metrics::{
    global_summary_table, result_line, write_coverage_csv, write_latency_csv, RunInfo,
};
use swarm_sim::{build_patrol_sim, SimObserver};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "patrol", about = "Cooperative aerial patrol/visit simulation")]
struct Args {
    /// Master seed; the same seed reproduces the run exactly.
    #[arg(long, default_value_t = 123)]
    seed: u64,

    /// Points of interest scattered over the area.
    #[arg(long = "num_pois", default_value_t = 200)]
    num_pois: usize,

    /// Patrolling leaders (K).
    #[arg(long = "num_eqcs", default_value_t = 1)]
    num_leaders: usize,

    /// Visiting followers.
    #[arg(long = "num_vqcs", default_value_t = 2)]
    num_followers: usize,

    /// Follower buffer capacity M.
    #[arg(long = "buffer_size", default_value_t = 5)]
    buffer_size: usize,

    /// Leader patrol speed, m/s.
    #[arg(long = "eqc_speed", default_value_t = 6.0)]
    leader_speed: f64,

    /// Follower cruise speed, m/s.
    #[arg(long = "vqc_speed", default_value_t = 12.0)]
    follower_speed: f64,

    /// Camera slant reach, metres.
    #[arg(long = "camera_reach", default_value_t = 84.9)]
    camera_reach: f64,

    /// Follower arrival/detection radius, metres.
    #[arg(long = "detection_radius", default_value_t = 5.0)]
    detection_radius: f64,

    /// Transmission range of the communication medium, metres.
    #[arg(long = "comm_range", default_value_t = 150.0)]
    comm_range: f64,

    /// Side of the square operating area, metres.
    #[arg(long = "area_side", default_value_t = 1200.0)]
    area_side: f64,

    /// Simulated seconds to run.
    #[arg(long, default_value_t = 600.0)]
    duration: f64,

    /// Assignment policy: greedy, round_robin, or load_balancing.
    #[arg(long, default_value = "load_balancing")]
    policy: PolicyKind,

    /// Write the coverage timeline to this CSV file.
    #[arg(long = "coverage_csv")]
    coverage_csv: Option<PathBuf>,

    /// Write all latency samples to this CSV file.
    #[arg(long = "latency_csv")]
    latency_csv: Option<PathBuf>,
}

// ── Progress observer ─────────────────────────────────────────────────────────

/// Logs a heartbeat every simulated minute.
struct Progress {
    ticks_per_beat: u64,
}

impl SimObserver for Progress {
    fn on_tick_end(&mut self, tick: Tick, _events: usize) {
        if tick.0 > 0 && tick.0 % self.ticks_per_beat == 0 {
            info!(tick = %tick, "simulating");
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let config = SimConfig {
        tick_duration_secs: 0.1,
        duration_secs: args.duration,
        seed: args.seed,
    };
    let fleet = FleetConfig {
        num_pois: args.num_pois,
        num_leaders: args.num_leaders,
        num_followers: args.num_followers,
        buffer_size: args.buffer_size,
        leader_speed: args.leader_speed,
        follower_speed: args.follower_speed,
        camera_reach: args.camera_reach,
        detection_radius: args.detection_radius,
        comm_range: args.comm_range,
        area_side: args.area_side,
        policy: args.policy,
        ..FleetConfig::default()
    };

    info!(
        seed = args.seed,
        leaders = fleet.num_leaders,
        followers = fleet.num_followers,
        pois = fleet.num_pois,
        policy = %fleet.policy,
        duration_secs = args.duration,
        "patrol run starting"
    );

    let mut sim = build_patrol_sim(config, fleet.clone())?;
    let t0 = Instant::now();
    sim.run(&mut Progress { ticks_per_beat: 600 })?;
    let wall = t0.elapsed();

    let metrics = sim.world.metrics.borrow();
    let run_info = RunInfo {
        seed: args.seed,
        num_leaders: fleet.num_leaders,
        num_followers: fleet.num_followers,
        num_pois: fleet.num_pois,
        buffer_size: fleet.buffer_size,
        policy: fleet.policy.to_string(),
    };

    println!();
    println!("==== GLOBAL SUMMARY ====");
    println!("{}", global_summary_table(&metrics, fleet.num_pois));
    println!();
    println!("{}", result_line(&run_info, &metrics));

    if let Some(path) = &args.coverage_csv {
        write_coverage_csv(path, &metrics.coverage_timeline)?;
        info!(path = %path.display(), "coverage timeline written");
    }
    if let Some(path) = &args.latency_csv {
        write_latency_csv(path, &metrics)?;
        info!(path = %path.display(), "latency samples written");
    }

    info!(
        wall_secs = %format_args!("{:.3}", wall.as_secs_f64()),
        sim_secs = args.duration,
        "run complete"
    );
    Ok(())
}
