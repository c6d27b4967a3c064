//! Unit tests for swarm-world.

use swarm_core::{Point3, PoiId, SimRng, Urgency};

use crate::{CollectedSet, Poi, PoiRegistry, World};

fn poi(id: u32, x: f64, y: f64, urgency: Urgency) -> Poi {
    Poi {
        id: PoiId(id),
        label: format!("poi-{id:04}"),
        coord: [x, y],
        urgency,
    }
}

// ── registry ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod registry {
    use super::*;

    #[test]
    fn generation_is_seeded() {
        let mut a = SimRng::new(99);
        let mut b = SimRng::new(99);
        let ra = PoiRegistry::generate(50, 1200.0, &mut a);
        let rb = PoiRegistry::generate(50, 1200.0, &mut b);
        assert_eq!(ra.len(), 50);
        for (pa, pb) in ra.iter().zip(rb.iter()) {
            assert_eq!(pa, pb);
        }
        // Coordinates stay inside the square.
        assert!(ra.iter().all(|p| {
            (0.0..1200.0).contains(&p.coord[0]) && (0.0..1200.0).contains(&p.coord[1])
        }));
    }

    #[test]
    fn lookup_by_id_and_label() {
        let reg = PoiRegistry::from_pois(vec![
            poi(0, 10.0, 20.0, Urgency::High),
            poi(1, 30.0, 40.0, Urgency::Low),
        ]);
        assert_eq!(reg.get(PoiId(1)).unwrap().coord, [30.0, 40.0]);
        assert_eq!(reg.by_label("poi-0000").unwrap().id, PoiId(0));
        assert!(reg.by_label("poi-0099").is_none());
        assert!(reg.get(PoiId(7)).is_none());
    }

    #[test]
    fn resolve_coord_requires_exact_bits_and_urgency() {
        let reg = PoiRegistry::from_pois(vec![poi(0, 100.125, 200.5, Urgency::Medium)]);
        assert_eq!(
            reg.resolve_coord([100.125, 200.5], Urgency::Medium).unwrap().id,
            PoiId(0)
        );
        // Same coordinate with a different urgency does not resolve.
        assert!(reg.resolve_coord([100.125, 200.5], Urgency::High).is_none());
        // A nearby-but-unequal coordinate does not resolve.
        assert!(reg.resolve_coord([100.1250001, 200.5], Urgency::Medium).is_none());
    }

    #[test]
    fn slant_radius_query() {
        let reg = PoiRegistry::from_pois(vec![
            poi(0, 0.0, 0.0, Urgency::Low),
            poi(1, 50.0, 0.0, Urgency::Low),
            poi(2, 200.0, 0.0, Urgency::Low),
        ]);
        // Observer 10 m above the origin: slant to poi-0 is 10 m, to poi-1
        // ~51 m, to poi-2 ~200 m.
        let from = Point3::new(0.0, 0.0, 10.0);
        let hits = reg.within_slant_radius(from, 60.0);
        let ids: Vec<PoiId> = hits.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PoiId(0), PoiId(1)]);
    }

    #[test]
    fn slant_radius_excludes_planar_hits_beyond_slant() {
        // Planar distance 59 m but slant ~59.8 m with a 10 m altitude: still
        // inside 60. With altitude 40 the slant is ~71.3 m: outside.
        let reg = PoiRegistry::from_pois(vec![poi(0, 59.0, 0.0, Urgency::Low)]);
        assert_eq!(
            reg.within_slant_radius(Point3::new(0.0, 0.0, 10.0), 60.0).len(),
            1
        );
        assert!(reg
            .within_slant_radius(Point3::new(0.0, 0.0, 40.0), 60.0)
            .is_empty());
    }
}

// ── collection lock ───────────────────────────────────────────────────────────

#[cfg(test)]
mod lock {
    use super::*;

    #[test]
    fn claim_inserts_once() {
        let set = CollectedSet::new();
        assert!(!set.contains(PoiId(5)));
        assert!(set.claim(PoiId(5)));
        assert!(set.contains(PoiId(5)));
        assert!(!set.claim(PoiId(5)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn grows_monotonically() {
        let set = CollectedSet::new();
        for i in 0..10 {
            set.claim(PoiId(i));
            assert_eq!(set.len(), (i + 1) as usize);
        }
    }
}

// ── world ─────────────────────────────────────────────────────────────────────

#[test]
fn world_bundles_shared_state() {
    let reg = PoiRegistry::from_pois(vec![poi(0, 1.0, 2.0, Urgency::High)]);
    let world = World::new(reg);
    assert!(world.collected.is_empty());
    world.collected.claim(PoiId(0));
    world.metrics.borrow_mut().record_unique(PoiId(0));
    assert_eq!(world.metrics.borrow().unique.len(), 1);
}
