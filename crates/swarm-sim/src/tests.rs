//! Engine tests: event plumbing, range-limited delivery, and end-to-end
//! scenarios over the real leader/follower protocols.

use std::cell::RefCell;
use std::rc::Rc;

use swarm_agents::{Ctx, Follower, Intent, Leader, Protocol, Telemetry};
use swarm_core::{AgentId, FleetConfig, Point3, PoiId, PolicyKind, SimConfig, Urgency};
use swarm_proto::Message;
use swarm_world::{Poi, PoiRegistry, World};

use crate::{build_patrol_sim, NoopObserver, SimBuilder, SimObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn poi(id: u32, x: f64, y: f64, urgency: Urgency) -> Poi {
    Poi {
        id: PoiId(id),
        label: format!("poi-{id:04}"),
        coord: [x, y],
        urgency,
    }
}

fn sim_config(duration_secs: f64) -> SimConfig {
    SimConfig { tick_duration_secs: 0.1, duration_secs, seed: 7 }
}

fn empty_world() -> World {
    World::new(PoiRegistry::from_pois(vec![]))
}

/// Minimal protocol that does nothing.
struct Inert;

impl Protocol for Inert {
    fn initialize(&mut self, _ctx: &Ctx<'_>) -> Vec<Intent> {
        vec![]
    }
    fn handle_timer(&mut self, _timer: &str, _ctx: &Ctx<'_>) -> Vec<Intent> {
        vec![]
    }
    fn handle_telemetry(&mut self, _t: &Telemetry, _ctx: &Ctx<'_>) -> Vec<Intent> {
        vec![]
    }
    fn handle_packet(&mut self, _raw: &[u8], _ctx: &Ctx<'_>) -> Vec<Intent> {
        vec![]
    }
    fn finish(&mut self, _ctx: &Ctx<'_>) {}
}

/// Records the time of every timer firing; fires once at t+1.
struct OneShotTimer {
    fired: Rc<RefCell<Vec<f64>>>,
}

impl Protocol for OneShotTimer {
    fn initialize(&mut self, ctx: &Ctx<'_>) -> Vec<Intent> {
        vec![Intent::ScheduleTimer { name: "ping", at: ctx.now + 1.0 }]
    }
    fn handle_timer(&mut self, _timer: &str, ctx: &Ctx<'_>) -> Vec<Intent> {
        self.fired.borrow_mut().push(ctx.now);
        vec![]
    }
    fn handle_telemetry(&mut self, _t: &Telemetry, _ctx: &Ctx<'_>) -> Vec<Intent> {
        vec![]
    }
    fn handle_packet(&mut self, _raw: &[u8], _ctx: &Ctx<'_>) -> Vec<Intent> {
        vec![]
    }
    fn finish(&mut self, _ctx: &Ctx<'_>) {}
}

/// Sends one HELLO to `peer` at t = 1 (unicast or broadcast).
struct SendOnce {
    peer: Option<AgentId>,
}

impl Protocol for SendOnce {
    fn initialize(&mut self, ctx: &Ctx<'_>) -> Vec<Intent> {
        vec![Intent::ScheduleTimer { name: "send", at: ctx.now + 1.0 }]
    }
    fn handle_timer(&mut self, _timer: &str, ctx: &Ctx<'_>) -> Vec<Intent> {
        let message = Message::Hello {
            v_id: ctx.agent,
            free_slots: 1,
            position: ctx.position.as_array(),
        };
        match self.peer {
            Some(to) => vec![Intent::Send { to, message }],
            None => vec![Intent::Broadcast { message }],
        }
    }
    fn handle_telemetry(&mut self, _t: &Telemetry, _ctx: &Ctx<'_>) -> Vec<Intent> {
        vec![]
    }
    fn handle_packet(&mut self, _raw: &[u8], _ctx: &Ctx<'_>) -> Vec<Intent> {
        vec![]
    }
    fn finish(&mut self, _ctx: &Ctx<'_>) {}
}

/// Records the arrival time of every packet.
struct RecvLog {
    got: Rc<RefCell<Vec<f64>>>,
}

impl Protocol for RecvLog {
    fn initialize(&mut self, _ctx: &Ctx<'_>) -> Vec<Intent> {
        vec![]
    }
    fn handle_timer(&mut self, _timer: &str, _ctx: &Ctx<'_>) -> Vec<Intent> {
        vec![]
    }
    fn handle_telemetry(&mut self, _t: &Telemetry, _ctx: &Ctx<'_>) -> Vec<Intent> {
        vec![]
    }
    fn handle_packet(&mut self, _raw: &[u8], ctx: &Ctx<'_>) -> Vec<Intent> {
        self.got.borrow_mut().push(ctx.now);
        vec![]
    }
    fn finish(&mut self, _ctx: &Ctx<'_>) {}
}

// ── Engine plumbing ───────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use super::*;

    #[test]
    fn timers_fire_at_the_scheduled_tick() {
        let fired = Rc::new(RefCell::new(Vec::new()));
        let mut b = SimBuilder::new(sim_config(2.0), FleetConfig::default(), empty_world());
        b.add_agent(
            Box::new(OneShotTimer { fired: Rc::clone(&fired) }),
            Point3::default(),
            0.0,
        );
        b.build().unwrap().run(&mut NoopObserver).unwrap();

        let fired = fired.borrow();
        assert_eq!(fired.len(), 1);
        assert!((fired[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unicast_lands_one_tick_after_sending() {
        let got = Rc::new(RefCell::new(Vec::new()));
        let mut b = SimBuilder::new(sim_config(2.0), FleetConfig::default(), empty_world());
        let _sender = b.add_agent(
            Box::new(SendOnce { peer: Some(AgentId(1)) }),
            Point3::ground(0.0, 0.0),
            0.0,
        );
        b.add_agent(
            Box::new(RecvLog { got: Rc::clone(&got) }),
            Point3::ground(50.0, 0.0), // within the 150 m default range
            0.0,
        );
        b.build().unwrap().run(&mut NoopObserver).unwrap();

        let got = got.borrow();
        assert_eq!(got.len(), 1);
        assert!((got[0] - 1.1).abs() < 1e-9, "sent at 1.0, observed at 1.1");
    }

    #[test]
    fn out_of_range_unicast_is_dropped() {
        let got = Rc::new(RefCell::new(Vec::new()));
        let mut b = SimBuilder::new(sim_config(2.0), FleetConfig::default(), empty_world());
        b.add_agent(
            Box::new(SendOnce { peer: Some(AgentId(1)) }),
            Point3::ground(0.0, 0.0),
            0.0,
        );
        b.add_agent(
            Box::new(RecvLog { got: Rc::clone(&got) }),
            Point3::ground(10_000.0, 0.0),
            0.0,
        );
        b.build().unwrap().run(&mut NoopObserver).unwrap();
        assert!(got.borrow().is_empty());
    }

    #[test]
    fn broadcast_reaches_only_agents_in_range() {
        let near = Rc::new(RefCell::new(Vec::new()));
        let mid = Rc::new(RefCell::new(Vec::new()));
        let far = Rc::new(RefCell::new(Vec::new()));

        let mut b = SimBuilder::new(sim_config(2.0), FleetConfig::default(), empty_world());
        b.add_agent(Box::new(SendOnce { peer: None }), Point3::ground(0.0, 0.0), 0.0);
        b.add_agent(Box::new(RecvLog { got: Rc::clone(&near) }), Point3::ground(10.0, 0.0), 0.0);
        b.add_agent(Box::new(RecvLog { got: Rc::clone(&mid) }), Point3::ground(100.0, 0.0), 0.0);
        b.add_agent(Box::new(RecvLog { got: Rc::clone(&far) }), Point3::ground(1_000.0, 0.0), 0.0);
        b.build().unwrap().run(&mut NoopObserver).unwrap();

        assert_eq!(near.borrow().len(), 1);
        assert_eq!(mid.borrow().len(), 1);
        assert!(far.borrow().is_empty());
    }

    #[test]
    fn observer_sees_every_tick() {
        struct TickCounter {
            starts: usize,
            ends: usize,
            ended: bool,
        }
        impl SimObserver for TickCounter {
            fn on_tick_start(&mut self, _t: swarm_core::Tick) {
                self.starts += 1;
            }
            fn on_tick_end(&mut self, _t: swarm_core::Tick, _e: usize) {
                self.ends += 1;
            }
            fn on_sim_end(&mut self, _t: swarm_core::Tick) {
                self.ended = true;
            }
        }

        let mut b = SimBuilder::new(sim_config(1.0), FleetConfig::default(), empty_world());
        b.add_agent(Box::new(Inert), Point3::default(), 0.0);
        let mut sim = b.build().unwrap();
        let mut obs = TickCounter { starts: 0, ends: 0, ended: false };
        sim.run(&mut obs).unwrap();
        assert_eq!(obs.starts, 10);
        assert_eq!(obs.ends, 10);
        assert!(obs.ended);
    }

    #[test]
    fn builder_rejects_bad_timing() {
        let config = SimConfig { tick_duration_secs: 0.0, ..sim_config(1.0) };
        assert!(SimBuilder::new(config, FleetConfig::default(), empty_world())
            .build()
            .is_err());
    }

    #[test]
    fn builder_assigns_sequential_ids() {
        let mut b = SimBuilder::new(sim_config(1.0), FleetConfig::default(), empty_world());
        assert_eq!(b.add_agent(Box::new(Inert), Point3::default(), 0.0), AgentId(0));
        assert_eq!(b.add_agent(Box::new(Inert), Point3::default(), 0.0), AgentId(1));
        assert_eq!(b.add_agent(Box::new(Inert), Point3::default(), 0.0), AgentId(2));
    }
}

// ── End-to-end scenarios ──────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use super::*;

    fn scenario_fleet() -> FleetConfig {
        FleetConfig {
            num_pois: 1,
            num_leaders: 1,
            num_followers: 1,
            comm_range: 10_000.0, // keep messaging out of the picture
            policy: PolicyKind::Greedy,
            ..FleetConfig::default()
        }
    }

    /// One leader, one follower, one high-urgency point: the full
    /// detect → assign → visit → deliver → acknowledge pipeline.
    #[test]
    fn happy_path_single_point() {
        let world = World::new(PoiRegistry::from_pois(vec![poi(
            0,
            100.0,
            100.0,
            Urgency::High,
        )]));
        let fleet = scenario_fleet();

        // Patrol passes 40 m north of the point: inside camera reach, far
        // outside the followers' casual-detection radius.
        let path = vec![Point3::new(60.0, 140.0, 10.0), Point3::new(140.0, 140.0, 10.0)];
        let mut b = SimBuilder::new(sim_config(30.0), fleet, world);
        let leader_id = b.add_agent(
            Box::new(Leader::new(AgentId(0), path.clone(), PolicyKind::Greedy)),
            path[0],
            6.0,
        );
        b.add_agent(
            Box::new(Follower::new(AgentId(1), leader_id, 0, path)),
            Point3::new(60.0, 130.0, 4.0),
            12.0,
        );
        let mut sim = b.build().unwrap();
        sim.run(&mut NoopObserver).unwrap();

        let metrics = sim.world.metrics.borrow();
        assert_eq!(metrics.assigns_sent(), 1, "exactly one ASSIGN");
        assert_eq!(metrics.assign_success(), 1, "exactly one reconciled DELIVER");
        assert_eq!(metrics.unique.len(), 1);
        assert!(metrics.unique.contains(&PoiId(0)));
        assert_eq!(metrics.redundant, 0);
        assert!((metrics.global_score - 1.0).abs() < 1e-9, "urgency-3 weight");

        let (covered, total, rate) = metrics.coverage(1);
        assert_eq!((covered, total), (1, 1));
        assert!((rate - 1.0).abs() < 1e-12);

        assert_eq!(metrics.lat_service.len(), 1);
        let service = metrics.lat_service[0];
        let contact = metrics.lat_contact[0];
        let e2e = metrics.lat_e2e[0];
        assert!(service >= 0.0);
        assert!(contact >= 0.0);
        assert!(e2e + 1e-9 >= service + contact, "detection is not before spawn");
        assert_eq!(metrics.t_detect.len(), 1);
        assert!(metrics.cam_matches == 1);
        assert!(metrics.cam_raw >= 1);
        assert!(!metrics.coverage_timeline.is_empty());
        assert!(sim.world.collected.contains(PoiId(0)));
    }

    /// Two leaders both detect the same point and assign it to their own
    /// follower; the collection lock lets only the first arrival claim it.
    #[test]
    fn global_lock_prevents_duplicate_claim() {
        let world = World::new(PoiRegistry::from_pois(vec![poi(
            0,
            100.0,
            100.0,
            Urgency::High,
        )]));
        let fleet = FleetConfig {
            num_followers: 2,
            num_leaders: 2,
            ..scenario_fleet()
        };

        // Both patrol rows see the point; the southern follower starts much
        // farther from it, so the northern one wins the race.
        let north = vec![Point3::new(60.0, 140.0, 10.0), Point3::new(140.0, 140.0, 10.0)];
        let south = vec![Point3::new(60.0, 20.0, 10.0), Point3::new(140.0, 20.0, 10.0)];

        let mut b = SimBuilder::new(sim_config(40.0), fleet, world);
        let l0 = b.add_agent(
            Box::new(Leader::new(AgentId(0), north.clone(), PolicyKind::Greedy)),
            north[0],
            6.0,
        );
        let l1 = b.add_agent(
            Box::new(Leader::new(AgentId(1), south.clone(), PolicyKind::Greedy)),
            south[0],
            6.0,
        );
        b.add_agent(
            Box::new(Follower::new(AgentId(2), l0, 0, north)),
            Point3::new(95.0, 140.0, 4.0),
            12.0,
        );
        b.add_agent(
            Box::new(Follower::new(AgentId(3), l1, 0, south)),
            Point3::new(200.0, 20.0, 4.0),
            12.0,
        );
        let mut sim = b.build().unwrap();
        sim.run(&mut NoopObserver).unwrap();

        let metrics = sim.world.metrics.borrow();
        assert_eq!(metrics.unique.len(), 1, "one delivery across the run");
        assert_eq!(metrics.redundant, 0, "the loser never reports");
        assert_eq!(metrics.assigns_sent(), 2, "both leaders assigned it");
        assert_eq!(metrics.assign_success(), 1, "only one assignment completed");
    }

    /// The canonical builder wires K bands and K·rho followers and the whole
    /// thing runs deterministically.
    #[test]
    fn patrol_fleet_runs_and_is_reproducible() {
        let fleet = FleetConfig {
            num_pois: 200,
            num_leaders: 2,
            num_followers: 4,
            policy: PolicyKind::LoadBalancing,
            ..FleetConfig::default()
        };

        let run = |seed: u64| {
            let config = SimConfig { seed, ..sim_config(120.0) };
            let mut sim = build_patrol_sim(config, fleet.clone()).unwrap();
            sim.run(&mut NoopObserver).unwrap();
            let m = sim.world.metrics.borrow();
            (
                m.unique.len(),
                m.redundant,
                m.assigns_sent(),
                m.assign_success(),
                m.cam_raw,
                m.cam_matches,
                format!("{:.4}", m.global_score),
            )
        };

        let a = run(123);
        let b = run(123);
        assert_eq!(a, b, "same seed, same configuration, same outcome");

        // The fleet actually does work in a minute of simulated time.
        assert!(a.0 > 0, "at least one point delivered");
    }

    #[test]
    fn fleet_requires_a_leader() {
        let fleet = FleetConfig { num_leaders: 0, ..FleetConfig::default() };
        assert!(build_patrol_sim(sim_config(1.0), fleet).is_err());
    }
}
