//! Construction of a [`Sim`].

use swarm_agents::Protocol;
use swarm_core::{AgentId, FleetConfig, Point3, SimConfig};
use swarm_mobility::MissionState;
use swarm_world::World;

use crate::sim::AgentSlot;
use crate::{EventQueue, Sim, SimError, SimResult};

/// How close an agent must get to a waypoint to count it as reached.
const WAYPOINT_TOLERANCE_M: f64 = 1.0;

/// Builder for [`Sim`].
///
/// Agents receive sequential ids in registration order — register leaders
/// before followers so the id layout matches what the protocols were
/// constructed with.
///
/// # Example
///
/// ```rust,ignore
/// let mut b = SimBuilder::new(config, fleet, world);
/// let leader = b.add_agent(Box::new(Leader::new(AgentId(0), path, policy)), start, 6.0);
/// let _ = b.add_agent(Box::new(Follower::new(AgentId(1), leader, 0, path)), start, 12.0);
/// let mut sim = b.build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config: SimConfig,
    fleet: FleetConfig,
    world: World,
    agents: Vec<AgentSlot>,
}

impl SimBuilder {
    pub fn new(config: SimConfig, fleet: FleetConfig, world: World) -> Self {
        Self { config, fleet, world, agents: Vec::new() }
    }

    /// Register an agent at `start`, moving at `speed` m/s.  Returns the id
    /// the engine will deliver its events under.
    pub fn add_agent(
        &mut self,
        logic: Box<dyn Protocol>,
        start: Point3,
        speed: f64,
    ) -> AgentId {
        let id = AgentId(self.agents.len() as u32);
        self.agents.push(AgentSlot {
            logic,
            mission: MissionState::new(start, speed, WAYPOINT_TOLERANCE_M),
        });
        id
    }

    pub fn build(self) -> SimResult<Sim> {
        if self.config.tick_duration_secs <= 0.0 {
            return Err(SimError::Config("tick duration must be positive".into()));
        }
        if self.config.duration_secs <= 0.0 {
            return Err(SimError::Config("duration must be positive".into()));
        }

        Ok(Sim {
            clock: self.config.make_clock(),
            config: self.config,
            fleet: self.fleet,
            world: self.world,
            agents: self.agents,
            events: EventQueue::new(),
        })
    }
}
