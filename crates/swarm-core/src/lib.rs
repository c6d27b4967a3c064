//! `swarm-core` — foundational types for the swarm patrol simulation.
//!
//! This crate is a dependency of every other `swarm-*` crate.  It
//! intentionally has no `swarm-*` dependencies and minimal external ones
//! (only `rand` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `AgentId`, `PoiId`                                    |
//! | [`geo`]     | `Point3`, planar and slant distances                  |
//! | [`time`]    | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`config`]  | `FleetConfig`, `PolicyKind`                           |
//! | [`urgency`] | `Urgency` levels with fixed mission weights           |
//! | [`rng`]     | `SimRng` (seeded, reproducible)                       |
//! | [`error`]   | `SwarmError`, `SwarmResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                |
//! |---------|-------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.   |
//!           | Required by `swarm-proto`.                            |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;
pub mod urgency;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{FleetConfig, PolicyKind};
pub use error::{SwarmError, SwarmResult};
pub use geo::Point3;
pub use ids::{AgentId, PoiId};
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, Tick};
pub use urgency::Urgency;
