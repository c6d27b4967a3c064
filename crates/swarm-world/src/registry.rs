//! The process-wide point-of-interest registry.
//!
//! Three lookup paths, all O(1) or better:
//!
//! - by id (dense `Vec` index),
//! - by label (`FxHashMap`),
//! - by exact `(coord, urgency)` — keys are the f64 bit patterns, which is
//!   valid because coordinates flow bit-exact from the registry through the
//!   ASSIGN payload and back;
//!
//! plus radius queries through an `rstar` R-tree over the ground
//! coordinates, used by the leader camera and the followers' opportunistic
//! scans.

use rstar::primitives::GeomWithData;
use rstar::RTree;
use rustc_hash::FxHashMap;
use swarm_core::{Point3, PoiId, SimRng, Urgency};

use crate::Poi;

/// Exact-coordinate key: (x bits, y bits, urgency level).
type CoordKey = (u64, u64, u8);

type TreeEntry = GeomWithData<[f64; 2], PoiId>;

fn coord_key(coord: [f64; 2], urgency: Urgency) -> CoordKey {
    (coord[0].to_bits(), coord[1].to_bits(), urgency.level())
}

/// Immutable registry of every point of interest in a run.
pub struct PoiRegistry {
    pois: Vec<Poi>,
    by_label: FxHashMap<String, PoiId>,
    by_coord: FxHashMap<CoordKey, PoiId>,
    tree: RTree<TreeEntry>,
}

impl PoiRegistry {
    /// Scatter `count` points uniformly over the `[0, area_side)²` square
    /// with uniformly drawn urgency levels.  Fully determined by the RNG
    /// state: coordinates then urgency are drawn per point in index order.
    pub fn generate(count: usize, area_side: f64, rng: &mut SimRng) -> Self {
        let pois = (0..count)
            .map(|i| {
                let x = rng.gen_range(0.0..area_side);
                let y = rng.gen_range(0.0..area_side);
                let urgency = match rng.gen_range(1u8..=3) {
                    1 => Urgency::Low,
                    2 => Urgency::Medium,
                    _ => Urgency::High,
                };
                Poi {
                    id: PoiId(i as u32),
                    label: format!("poi-{i:04}"),
                    coord: [x, y],
                    urgency,
                }
            })
            .collect();
        Self::from_pois(pois)
    }

    /// Build a registry from explicit points (tests, fixed scenarios).
    ///
    /// Ids must equal the index of each point.
    pub fn from_pois(pois: Vec<Poi>) -> Self {
        debug_assert!(
            pois.iter().enumerate().all(|(i, p)| p.id.index() == i),
            "poi ids must be dense and in order"
        );

        let by_label = pois.iter().map(|p| (p.label.clone(), p.id)).collect();
        let by_coord = pois
            .iter()
            .map(|p| (coord_key(p.coord, p.urgency), p.id))
            .collect();
        let tree = RTree::bulk_load(
            pois.iter()
                .map(|p| TreeEntry::new(p.coord, p.id))
                .collect(),
        );

        Self { pois, by_label, by_coord, tree }
    }

    pub fn len(&self) -> usize {
        self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Poi> {
        self.pois.iter()
    }

    /// The point with this id, if it exists.
    #[inline]
    pub fn get(&self, id: PoiId) -> Option<&Poi> {
        self.pois.get(id.index())
    }

    pub fn by_label(&self, label: &str) -> Option<&Poi> {
        self.by_label.get(label).map(|&id| &self.pois[id.index()])
    }

    /// Resolve an exact `(coord, urgency)` pair back to its point.
    ///
    /// Works only for coordinates that originated from this registry (bit
    /// identity); arbitrary nearby coordinates resolve to `None`.
    pub fn resolve_coord(&self, coord: [f64; 2], urgency: Urgency) -> Option<&Poi> {
        self.by_coord
            .get(&coord_key(coord, urgency))
            .map(|&id| &self.pois[id.index()])
    }

    /// Points whose slant (3-D) distance from `from` is within `radius`.
    ///
    /// The R-tree pre-filters in the ground plane (planar distance never
    /// exceeds slant distance), then the slant check prunes the rest.
    /// Results come back in ascending id order so callers iterate
    /// deterministically.
    pub fn within_slant_radius(&self, from: Point3, radius: f64) -> Vec<&Poi> {
        let mut hits: Vec<&Poi> = self
            .tree
            .locate_within_distance([from.x, from.y], radius * radius)
            .filter(|entry| {
                let p = &self.pois[entry.data.index()];
                from.distance(p.ground_point()) <= radius
            })
            .map(|entry| &self.pois[entry.data.index()])
            .collect();
        hits.sort_by_key(|p| p.id);
        hits
    }
}
