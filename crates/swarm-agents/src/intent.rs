//! Agent intents — the effects a callback can request.

use swarm_core::{AgentId, Point3};
use swarm_mobility::LoopMode;
use swarm_proto::Message;

/// An effect requested by an agent callback, applied by the engine after the
/// callback returns.
///
/// Messages are subject to the communication medium's transmission range at
/// send time; out-of-range sends are dropped, which the protocols tolerate
/// by design (periodic HELLO resynchronizes, unacked reports are resent).
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    /// Fire `handle_timer(name)` on this agent at simulated time `at`
    /// (seconds).  Times at or before the current tick fire on the next one.
    ScheduleTimer { name: &'static str, at: f64 },

    /// Unicast `message` to `to`.
    Send { to: AgentId, message: Message },

    /// Deliver `message` to every other agent within transmission range.
    Broadcast { message: Message },

    /// Replace this agent's current mission.
    StartMission { waypoints: Vec<Point3>, loop_mode: LoopMode },
}
