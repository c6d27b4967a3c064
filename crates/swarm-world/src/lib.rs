//! `swarm-world` — the immutable environment and the shared mutable state.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`poi`]      | `Poi` — one immutable point of interest                  |
//! | [`registry`] | `PoiRegistry` — generation, lookups, radius queries      |
//! | [`lock`]     | `CollectedSet` — append-only global collection lock      |
//! | [`world`]    | `World` — registry + lock + metrics, passed to agents    |
//!
//! The registry is immutable after construction.  The collection lock and
//! the metric aggregates are the only cross-agent mutable state in the
//! system; both live behind interior mutability, which is sound because all
//! agent callbacks run to completion on one cooperative scheduler thread.

pub mod lock;
pub mod poi;
pub mod registry;
pub mod world;

#[cfg(test)]
mod tests;

pub use lock::CollectedSet;
pub use poi::Poi;
pub use registry::PoiRegistry;
pub use world::World;
