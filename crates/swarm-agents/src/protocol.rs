//! The `Protocol` trait — what it means to be an agent.

use swarm_core::Point3;

use crate::{Ctx, Intent};

/// A position report delivered to every agent every tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Telemetry {
    pub position: Point3,
}

/// One agent's event-driven behavior.
///
/// The engine delivers three event kinds — telemetry, named timers, and
/// packets — plus lifecycle hooks at the start and end of the run.  Each
/// callback runs to completion; there is no suspension.  Outward effects are
/// returned as [`Intent`]s, never performed inline.
///
/// Packets arrive as raw bytes: the agent decodes the envelope itself and is
/// expected to drop (with a debug log) anything it cannot parse — decode
/// failures never propagate across agent boundaries.
pub trait Protocol {
    /// Called once before the first tick.  Schedule initial timers and start
    /// the initial mission here.
    fn initialize(&mut self, ctx: &Ctx<'_>) -> Vec<Intent>;

    /// A timer previously scheduled by this agent has fired.
    fn handle_timer(&mut self, timer: &str, ctx: &Ctx<'_>) -> Vec<Intent>;

    /// Per-tick position report.
    fn handle_telemetry(&mut self, telemetry: &Telemetry, ctx: &Ctx<'_>) -> Vec<Intent>;

    /// A message addressed to this agent has arrived.
    fn handle_packet(&mut self, raw: &[u8], ctx: &Ctx<'_>) -> Vec<Intent>;

    /// Called once after the final tick.  Flush accounting here.
    fn finish(&mut self, ctx: &Ctx<'_>);
}
