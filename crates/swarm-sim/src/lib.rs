//! `swarm-sim` — the cooperative simulation engine.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..end:
//!   ① Mobility   — advance every agent's mission by one tick of motion.
//!   ② Telemetry  — deliver the new position to every agent.
//!   ③ Events     — drain this tick's timers and packets in FIFO order.
//!   ④ Apply      — intents from each callback are applied as produced:
//!                    ScheduleTimer(at)  → event queue (next tick at earliest)
//!                    Send/Broadcast     → range check now, deliver next tick
//!                    StartMission(..)   → replace the agent's mission
//! ```
//!
//! Callbacks run to completion on one thread; the world's shared sets are
//! the only cross-agent mutable state.  A message sent at tick t is observed
//! at tick t+1, so same-tick ordering across agents is never relied on.
//!
//! # Crate layout
//!
//! | Module       | Contents                                        |
//! |--------------|-------------------------------------------------|
//! | [`event`]    | `Event`, `EventQueue`                           |
//! | [`sim`]      | `Sim` and the tick loop                         |
//! | [`builder`]  | `SimBuilder`                                    |
//! | [`fleet`]    | standard leader/follower fleet construction     |
//! | [`observer`] | `SimObserver`, `NoopObserver`                   |
//! | [`error`]    | `SimError`, `SimResult`                         |

pub mod builder;
pub mod error;
pub mod event;
pub mod fleet;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use event::{Event, EventQueue};
pub use fleet::build_patrol_sim;
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
