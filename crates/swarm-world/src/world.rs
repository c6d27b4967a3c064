//! The shared simulation context handed to every agent callback.

use std::cell::RefCell;

use swarm_metrics::GlobalMetrics;

use crate::{CollectedSet, PoiRegistry};

/// Everything an agent may read or (through interior mutability) update that
/// is not its own state: the immutable registry, the global collection lock,
/// and the run-wide metric aggregates.
///
/// Constructed once per run and passed by reference into every callback.
pub struct World {
    pub registry: PoiRegistry,
    pub collected: CollectedSet,
    pub metrics: RefCell<GlobalMetrics>,
}

impl World {
    pub fn new(registry: PoiRegistry) -> Self {
        Self {
            registry,
            collected: CollectedSet::new(),
            metrics: RefCell::new(GlobalMetrics::new()),
        }
    }
}
