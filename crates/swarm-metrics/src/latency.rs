//! Labelled latency sample storage.

use swarm_core::PoiId;

/// A vector of `(poi, seconds)` samples for one latency kind.
///
/// The poi is kept alongside the value for log forensics; the aggregate
/// statistics only look at the values.
#[derive(Clone, Debug, Default)]
pub struct LatencySamples {
    samples: Vec<(PoiId, f64)>,
}

impl LatencySamples {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, poi: PoiId, secs: f64) {
        self.samples.push((poi, secs));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The raw seconds values, in insertion order.
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|&(_, v)| v).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(PoiId, f64)> {
        self.samples.iter()
    }

    /// Move all values into `sink`, leaving this bucket empty.
    pub fn drain_into(&mut self, sink: &mut Vec<f64>) {
        sink.extend(self.samples.drain(..).map(|(_, v)| v));
    }
}
