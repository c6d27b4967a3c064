//! `swarm-mobility` — agent movement and rendezvous geometry.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`mission`] | `MissionState` — per-agent waypoint missions, tick advance  |
//! | [`path`]    | pure functions: prediction, intercept, formation, sweeps    |
//!
//! # Movement model
//!
//! Agents fly straight lines between waypoints at a fixed speed; one call to
//! [`MissionState::advance`] moves an agent by `speed * dt` metres, crossing
//! as many waypoints as that budget covers.  There is no routing graph —
//! positions are continuous, which the protocols need for camera sweeps,
//! arrival radii, and rendezvous prediction.

pub mod mission;
pub mod path;


pub use mission::{LoopMode, MissionState};
