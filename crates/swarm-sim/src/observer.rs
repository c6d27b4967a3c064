//! Simulation observer trait for progress reporting.

use swarm_core::Tick;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at tick boundaries.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick.  `events` is the number of timer and
    /// packet events delivered this tick.
    fn on_tick_end(&mut self, _tick: Tick, _events: usize) {}

    /// Called once after the final tick and all agent `finish` hooks.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
