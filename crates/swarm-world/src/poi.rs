//! One point of interest.

use swarm_core::{Point3, PoiId, Urgency};

/// An immutable ground target.  Created once at startup, never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct Poi {
    pub id: PoiId,
    /// Unique printable name, `poi-NNNN`.
    pub label: String,
    /// Ground coordinate (x, y); points sit on z = 0.
    pub coord: [f64; 2],
    pub urgency: Urgency,
}

impl Poi {
    /// The point's position as a ground-plane `Point3`.
    #[inline]
    pub fn ground_point(&self) -> Point3 {
        Point3::ground(self.coord[0], self.coord[1])
    }
}
