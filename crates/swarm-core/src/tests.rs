//! Unit tests for swarm-core.

use crate::{AgentId, PoiId, Point3, PolicyKind, SimClock, SimConfig, SimRng, Tick, Urgency};

// ── ids ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod ids {
    use super::*;

    #[test]
    fn default_is_invalid() {
        assert_eq!(AgentId::default(), AgentId::INVALID);
        assert_eq!(PoiId::default(), PoiId::INVALID);
    }

    #[test]
    fn index_round_trip() {
        let id = AgentId(7);
        assert_eq!(id.index(), 7);
        assert_eq!(AgentId::try_from(7usize).unwrap(), id);
    }

    #[test]
    fn display_includes_type_name() {
        assert_eq!(PoiId(3).to_string(), "PoiId(3)");
    }

    #[test]
    fn ids_sort_by_value() {
        let mut v = vec![AgentId(4), AgentId(1), AgentId(3)];
        v.sort();
        assert_eq!(v, vec![AgentId(1), AgentId(3), AgentId(4)]);
    }
}

// ── geo ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod geo {
    use super::*;

    #[test]
    fn planar_ignores_altitude() {
        let a = Point3::new(0.0, 0.0, 4.0);
        let b = Point3::ground(3.0, 4.0);
        assert!((a.distance_xy(b) - 5.0).abs() < 1e-12);
        // Slant distance includes the 4 m altitude difference.
        assert!((a.distance(b) - (25.0_f64 + 16.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(10.0, -10.0, 2.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        let mid = a.lerp(b, 0.5);
        assert_eq!(mid, Point3::new(5.0, -5.0, 1.0));
    }

    #[test]
    fn at_altitude_keeps_ground_coords() {
        let p = Point3::ground(12.5, -3.0).at_altitude(4.0);
        assert_eq!(p, Point3::new(12.5, -3.0, 4.0));
    }
}

// ── time ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod time {
    use super::*;

    #[test]
    fn tick_seconds_round_trip() {
        let clock = SimClock::new(0.1);
        assert_eq!(clock.secs_at(Tick(10)), 1.0);
        assert_eq!(clock.tick_at(1.0), Tick(10));
        assert_eq!(clock.tick_at(0.0), Tick(0));
    }

    #[test]
    fn tick_at_rounds_up_mid_tick_times() {
        let clock = SimClock::new(0.1);
        // 1.03 s falls between ticks 10 and 11 — never fire early.
        assert_eq!(clock.tick_at(1.03), Tick(11));
    }

    #[test]
    fn tick_at_absorbs_float_noise() {
        let clock = SimClock::new(0.1);
        // now + 1.0 computed through f64 must land exactly 10 ticks ahead.
        for t in 0u64..2_000 {
            let now = clock.secs_at(Tick(t));
            assert_eq!(clock.tick_at(now + 1.0), Tick(t + 10), "at tick {t}");
        }
    }

    #[test]
    fn end_tick_from_duration() {
        let config = SimConfig { duration_secs: 60.0, ..SimConfig::default() };
        assert_eq!(config.end_tick(), Tick(600));
    }
}

// ── urgency / policy ─────────────────────────────────────────────────────────

#[cfg(test)]
mod domain {
    use super::*;

    #[test]
    fn urgency_weights_fixed() {
        assert_eq!(Urgency::Low.weight(), 0.2);
        assert_eq!(Urgency::Medium.weight(), 0.5);
        assert_eq!(Urgency::High.weight(), 1.0);
    }

    #[test]
    fn urgency_level_round_trip() {
        for u in [Urgency::Low, Urgency::Medium, Urgency::High] {
            assert_eq!(Urgency::try_from(u.level()).unwrap(), u);
        }
        assert!(Urgency::try_from(0u8).is_err());
        assert!(Urgency::try_from(4u8).is_err());
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("greedy".parse::<PolicyKind>().unwrap(), PolicyKind::Greedy);
        assert_eq!("round_robin".parse::<PolicyKind>().unwrap(), PolicyKind::RoundRobin);
        assert_eq!(
            "load_balancing".parse::<PolicyKind>().unwrap(),
            PolicyKind::LoadBalancing
        );
        assert!("fifo".parse::<PolicyKind>().is_err());
    }
}

// ── rng ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rng {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimRng::new(123);
        let mut b = SimRng::new(123);
        for _ in 0..32 {
            assert_eq!(a.gen_range(0u32..1_000_000), b.gen_range(0u32..1_000_000));
        }
    }

    #[test]
    fn children_are_independent_streams() {
        let mut parent = SimRng::new(7);
        let mut c1 = parent.child(1);
        let mut c2 = parent.child(2);
        let s1: Vec<u32> = (0..8).map(|_| c1.gen_range(0..u32::MAX)).collect();
        let s2: Vec<u32> = (0..8).map(|_| c2.gen_range(0..u32::MAX)).collect();
        assert_ne!(s1, s2);
    }
}
