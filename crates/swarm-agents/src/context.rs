//! Read-only per-callback view of the simulation.

use swarm_core::{AgentId, FleetConfig, Point3};
use swarm_world::World;

/// What an agent can see during one callback.
///
/// Own-mobility facts (`position`, `mission_idle`, `current_waypoint`) are
/// copied in by the engine before the callback, so `Ctx` borrows nothing
/// mutable.  The world is shared by reference; its collection lock and
/// metric aggregates use interior mutability and may be updated from inside
/// callbacks.
pub struct Ctx<'a> {
    /// Current simulated time, seconds.
    pub now: f64,
    /// The agent being called.
    pub agent: AgentId,
    /// The agent's current position.
    pub position: Point3,
    /// Whether the agent's mobility is idle (no active mission).
    pub mission_idle: bool,
    /// The waypoint currently being flown to, if any.
    pub current_waypoint: Option<Point3>,
    /// Shared environment: registry, collection lock, metrics.
    pub world: &'a World,
    /// Run configuration.
    pub config: &'a FleetConfig,
}

impl<'a> Ctx<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        now: f64,
        agent: AgentId,
        position: Point3,
        mission_idle: bool,
        current_waypoint: Option<Point3>,
        world: &'a World,
        config: &'a FleetConfig,
    ) -> Self {
        Self { now, agent, position, mission_idle, current_waypoint, world, config }
    }

    /// Camera shot from the agent's current position: the positions of all
    /// ground nodes within the configured slant reach.
    pub fn camera_scan(&self) -> Vec<[f64; 3]> {
        self.world
            .registry
            .within_slant_radius(self.position, self.config.camera_reach)
            .into_iter()
            .map(|poi| [poi.coord[0], poi.coord[1], 0.0])
            .collect()
    }
}
