//! `swarm-agents` — the coordination protocols.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`protocol`] | `Protocol` trait, `Telemetry`                                |
//! | [`intent`]   | `Intent` — deferred effects returned by callbacks            |
//! | [`context`]  | `Ctx` — read-only per-callback view of the world             |
//! | [`leader`]   | `Leader` — detection, scheduling, reconciliation, accounting |
//! | [`policy`]   | `AssignmentPolicy` and its three implementations             |
//! | [`follower`] | `Follower` — satellite/visiting state machine, collection    |
//!
//! # Two-phase callbacks
//!
//! Agent callbacks read through [`Ctx`] and mutate only their own state plus
//! the world's interior-mutable shared sets; every outward effect (timers,
//! messages, missions) is returned as an [`Intent`] and applied by the
//! engine after the callback completes.  This keeps callbacks atomic: no
//! callback ever observes a half-applied effect of another.

pub mod context;
pub mod follower;
pub mod intent;
pub mod leader;
pub mod policy;
pub mod protocol;


pub use context::Ctx;
pub use follower::{Follower, FollowerMode};
pub use intent::Intent;
pub use leader::Leader;
pub use policy::{make_policy, Assignment, AssignmentPolicy, FollowerSlot, PolicyView};
pub use protocol::{Protocol, Telemetry};
