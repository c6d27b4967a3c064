//! The `Sim` struct and its tick loop.

use swarm_agents::{Ctx, Intent, Protocol, Telemetry};
use swarm_core::{AgentId, FleetConfig, SimClock, SimConfig, Tick};
use swarm_mobility::MissionState;
use swarm_world::World;
use tracing::debug;

use crate::{Event, EventQueue, SimObserver, SimResult};

/// One agent as the engine holds it: its protocol logic and its mobility.
pub(crate) struct AgentSlot {
    pub(crate) logic: Box<dyn Protocol>,
    pub(crate) mission: MissionState,
}

/// The main simulation runner.
///
/// Owns the clock, the world, every agent, and the event queue, and drives
/// the four-phase tick loop (mobility → telemetry → events → apply).
/// Create via [`SimBuilder`][crate::SimBuilder] or
/// [`build_patrol_sim`][crate::build_patrol_sim].
pub struct Sim {
    /// Engine timing and the master seed.
    pub config: SimConfig,
    /// Domain parameters: fleet sizes, radii, policy, protocol constants.
    pub fleet: FleetConfig,
    /// Simulation clock.
    pub clock: SimClock,
    /// Shared environment (registry, collection lock, metrics).
    pub world: World,

    pub(crate) agents: Vec<AgentSlot>,
    pub(crate) events: EventQueue,
}

impl Sim {
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Current position of `agent`.
    pub fn agent_position(&self, agent: AgentId) -> Option<swarm_core::Point3> {
        self.agents.get(agent.index()).map(|s| s.mission.position)
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from tick 0 to `config.end_tick()`.
    ///
    /// Initializes every agent first, calls observer hooks at every tick
    /// boundary, and finishes every agent after the last tick.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        self.initialize_agents()?;

        let end = self.config.end_tick();
        while self.clock.current_tick < end {
            let now = self.clock.current_tick;
            observer.on_tick_start(now);
            let processed = self.process_tick(now)?;
            observer.on_tick_end(now, processed);
            self.clock.advance();
        }

        self.finish_agents();
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    // ── Lifecycle phases ──────────────────────────────────────────────────

    fn initialize_agents(&mut self) -> SimResult<()> {
        for i in 0..self.agents.len() {
            let agent = AgentId(i as u32);
            let intents = {
                let now = self.clock.now_secs();
                let slot = &mut self.agents[i];
                let ctx = Ctx::new(
                    now,
                    agent,
                    slot.mission.position,
                    slot.mission.is_idle(),
                    slot.mission.current_waypoint(),
                    &self.world,
                    &self.fleet,
                );
                slot.logic.initialize(&ctx)
            };
            self.apply_intents(agent, intents)?;
        }
        Ok(())
    }

    fn finish_agents(&mut self) {
        for i in 0..self.agents.len() {
            let now = self.clock.now_secs();
            let slot = &mut self.agents[i];
            let ctx = Ctx::new(
                now,
                AgentId(i as u32),
                slot.mission.position,
                slot.mission.is_idle(),
                slot.mission.current_waypoint(),
                &self.world,
                &self.fleet,
            );
            slot.logic.finish(&ctx);
        }
    }

    // ── Core tick processing ──────────────────────────────────────────────

    /// Returns the number of events delivered this tick.
    fn process_tick(&mut self, now: Tick) -> SimResult<usize> {
        let dt = self.config.tick_duration_secs;
        let now_secs = self.clock.now_secs();

        // ── Phase 1: mobility ─────────────────────────────────────────────
        for slot in &mut self.agents {
            slot.mission.advance(dt);
        }

        // ── Phase 2: telemetry ────────────────────────────────────────────
        for i in 0..self.agents.len() {
            let agent = AgentId(i as u32);
            let intents = {
                let slot = &mut self.agents[i];
                let position = slot.mission.position;
                let ctx = Ctx::new(
                    now_secs,
                    agent,
                    position,
                    slot.mission.is_idle(),
                    slot.mission.current_waypoint(),
                    &self.world,
                    &self.fleet,
                );
                slot.logic.handle_telemetry(&Telemetry { position }, &ctx)
            };
            self.apply_intents(agent, intents)?;
        }

        // ── Phase 3: events (FIFO within the tick) ────────────────────────
        let Some(events) = self.events.drain_tick(now) else {
            return Ok(0);
        };
        let processed = events.len();

        for event in events {
            let agent = event.recipient();
            let Some(_) = self.agents.get(agent.index()) else {
                debug!(%agent, "event for unknown agent dropped");
                continue;
            };
            let intents = {
                let slot = &mut self.agents[agent.index()];
                let ctx = Ctx::new(
                    now_secs,
                    agent,
                    slot.mission.position,
                    slot.mission.is_idle(),
                    slot.mission.current_waypoint(),
                    &self.world,
                    &self.fleet,
                );
                match event {
                    Event::Timer { name, .. } => slot.logic.handle_timer(name, &ctx),
                    Event::Packet { bytes, .. } => slot.logic.handle_packet(&bytes, &ctx),
                }
            };
            self.apply_intents(agent, intents)?;
        }

        Ok(processed)
    }

    // ── Intent application ────────────────────────────────────────────────

    fn apply_intents(&mut self, agent: AgentId, intents: Vec<Intent>) -> SimResult<()> {
        let now = self.clock.current_tick;
        for intent in intents {
            match intent {
                // Timers never fire in the past; "now or earlier" means the
                // next tick.
                Intent::ScheduleTimer { name, at } => {
                    let tick = self.clock.tick_at(at).max(now + 1);
                    self.events.push(tick, Event::Timer { agent, name });
                }

                Intent::Send { to, message } => {
                    self.send(agent, to, &message, now)?;
                }

                Intent::Broadcast { message } => {
                    let recipients: Vec<AgentId> = (0..self.agents.len() as u32)
                        .map(AgentId)
                        .filter(|&id| id != agent)
                        .collect();
                    for to in recipients {
                        self.send(agent, to, &message, now)?;
                    }
                }

                Intent::StartMission { waypoints, loop_mode } => {
                    self.agents[agent.index()].mission.start_mission(waypoints, loop_mode);
                }
            }
        }
        Ok(())
    }

    /// Range-checked delivery: the message lands at the next tick or not at
    /// all.  Dropped messages are a debug-level event; the protocols are
    /// built to resynchronize.
    fn send(
        &mut self,
        from: AgentId,
        to: AgentId,
        message: &swarm_proto::Message,
        now: Tick,
    ) -> SimResult<()> {
        let Some(to_slot) = self.agents.get(to.index()) else {
            debug!(%from, %to, "message to unknown agent dropped");
            return Ok(());
        };
        let from_pos = self.agents[from.index()].mission.position;
        let distance = from_pos.distance(to_slot.mission.position);
        if distance > self.fleet.comm_range {
            debug!(
                %from,
                %to,
                kind = message.kind(),
                distance = %format_args!("{distance:.1}"),
                "message dropped: out of transmission range"
            );
            return Ok(());
        }

        let bytes = message.encode()?;
        self.events.push(now + 1, Event::Packet { to, bytes });
        Ok(())
    }
}
