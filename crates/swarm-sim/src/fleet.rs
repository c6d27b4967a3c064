//! Standard fleet construction: banded patrols and attached followers.

use swarm_agents::{Follower, Leader};
use swarm_core::{AgentId, FleetConfig, SimConfig, SimRng};
use swarm_mobility::path::lawnmower;
use swarm_world::{PoiRegistry, World};
use tracing::info;

use crate::{Sim, SimBuilder, SimError, SimResult};

/// How far apart patrol rows sit, as a fraction of the camera's ground
/// footprint diameter.  Below 1.0 adjacent rows overlap.
const ROW_OVERLAP_FACTOR: f64 = 0.8;

/// Initial follower scatter around the leader's first waypoint, metres.
const FOLLOWER_SCATTER_M: f64 = 10.0;

/// Build the canonical simulation for a configuration:
///
/// - points of interest scattered over the area square (seeded),
/// - the area split into one horizontal patrol band per leader, each swept
///   by an S-shaped path whose row spacing follows the camera's ground
///   footprint,
/// - follower `j` attached to leader `j mod K` with formation rank
///   `j div K`, starting scattered near its leader's first waypoint.
pub fn build_patrol_sim(config: SimConfig, fleet: FleetConfig) -> SimResult<Sim> {
    if fleet.num_leaders == 0 {
        return Err(SimError::Config("at least one leader is required".into()));
    }

    let mut rng = SimRng::new(config.seed);
    let mut poi_rng = rng.child(1);
    let mut scatter_rng = rng.child(2);

    let registry = PoiRegistry::generate(fleet.num_pois, fleet.area_side, &mut poi_rng);
    let world = World::new(registry);
    let mut builder = SimBuilder::new(config, fleet.clone(), world);

    // Ground footprint radius of the camera at patrol altitude.
    let footprint = (fleet.camera_reach.powi(2) - fleet.leader_altitude.powi(2))
        .max(1.0)
        .sqrt();
    let row_spacing = 2.0 * footprint * ROW_OVERLAP_FACTOR;
    let band_height = fleet.area_side / fleet.num_leaders as f64;

    let mut leader_paths = Vec::with_capacity(fleet.num_leaders);
    for l in 0..fleet.num_leaders {
        let y0 = l as f64 * band_height;
        let path = lawnmower(
            0.0,
            fleet.area_side,
            y0,
            y0 + band_height,
            row_spacing,
            fleet.leader_altitude,
        );
        let id = AgentId(l as u32);
        let start = path[0];
        let assigned = builder.add_agent(
            Box::new(Leader::new(id, path.clone(), fleet.policy)),
            start,
            fleet.leader_speed,
        );
        debug_assert_eq!(assigned, id);
        leader_paths.push(path);
    }

    for j in 0..fleet.num_followers {
        let leader_index = j % fleet.num_leaders;
        let rank = (j / fleet.num_leaders) as u32;
        let path = leader_paths[leader_index].clone();
        let start = path[0]
            .offset_xy(
                scatter_rng.gen_range(-FOLLOWER_SCATTER_M..FOLLOWER_SCATTER_M),
                scatter_rng.gen_range(-FOLLOWER_SCATTER_M..FOLLOWER_SCATTER_M),
            )
            .at_altitude(fleet.follower_altitude);
        let id = AgentId((fleet.num_leaders + j) as u32);
        let assigned = builder.add_agent(
            Box::new(Follower::new(id, AgentId(leader_index as u32), rank, path)),
            start,
            fleet.follower_speed,
        );
        debug_assert_eq!(assigned, id);
    }

    info!(
        leaders = fleet.num_leaders,
        followers = fleet.num_followers,
        pois = fleet.num_pois,
        policy = %fleet.policy,
        "fleet assembled"
    );
    builder.build()
}
