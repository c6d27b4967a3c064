//! The follower protocol: shadow the leader, visit assigned points, report.

use rustc_hash::{FxHashMap, FxHashSet};
use swarm_core::{AgentId, Point3, PoiId, Urgency};
use swarm_mobility::path::rendezvous_target;
use swarm_mobility::LoopMode;
use swarm_proto::{DeliverEntry, Message};
use tracing::{debug, info, warn};

use crate::{Ctx, Intent, Protocol, Telemetry};

const HELLO_PERIOD_SECS: f64 = 1.0;
const SATELLITE_PERIOD_SECS: f64 = 0.5;
const TIMER_HELLO: &str = "hello";
const TIMER_SATELLITE: &str = "satellite";

/// Where the follower is in its mission cycle.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FollowerMode {
    /// Shadowing the leader in a predictive formation slot.
    Satellite,
    /// Flying the assigned point queue.
    Visiting,
}

/// One XY-vs-slant arrival discrepancy, kept for the finish-time diagnostic.
#[derive(Clone, Debug)]
pub(crate) struct Xy3dSample {
    pub(crate) label: Option<String>,
    pub(crate) coord: [f64; 2],
    pub(crate) dist_xy: f64,
    pub(crate) dist_3d: f64,
    pub(crate) dz: f64,
}

/// A visiting quadcopter attached to one leader.
pub struct Follower {
    pub(crate) id: AgentId,
    pub(crate) leader: AgentId,
    /// Slot in the leader's V-formation, unique among its followers.
    pub(crate) rank: u32,
    /// The leader's patrol path, for rendezvous prediction.
    pub(crate) leader_waypoints: Vec<Point3>,

    pub(crate) mode: FollowerMode,
    /// Assigned points still to visit: (waypoint at own altitude, urgency).
    pub(crate) next2visit: Vec<(Point3, Urgency)>,
    /// Collected points not yet acknowledged: (id, label).
    pub(crate) discovered: Vec<(PoiId, String)>,
    /// Acknowledged points.
    pub(crate) visited: FxHashSet<PoiId>,
    /// First-arrival timestamps, cleared on acknowledgement.
    pub(crate) arrival_ts: FxHashMap<PoiId, f64>,
    /// Last leader position/time seen in a HELLO_ACK; diagnostics only.
    pub(crate) last_leader_fix: Option<(Point3, f64)>,

    pub(crate) disc_casual: u64,
    pub(crate) disc_assigned: u64,
    pub(crate) xy3d_warns: u64,
    pub(crate) xy3d_samples: Vec<Xy3dSample>,
}

impl Follower {
    pub fn new(id: AgentId, leader: AgentId, rank: u32, leader_waypoints: Vec<Point3>) -> Self {
        Self {
            id,
            leader,
            rank,
            leader_waypoints,
            mode: FollowerMode::Satellite,
            next2visit: Vec::new(),
            discovered: Vec::new(),
            visited: FxHashSet::default(),
            arrival_ts: FxHashMap::default(),
            last_leader_fix: None,
            disc_casual: 0,
            disc_assigned: 0,
            xy3d_warns: 0,
            xy3d_samples: Vec::new(),
        }
    }

    fn free_slots(&self, ctx: &Ctx<'_>) -> usize {
        ctx.config.buffer_size.saturating_sub(self.next2visit.len())
    }

    /// Launch (or refresh) the predictive intercept toward the leader's
    /// formation slot.
    fn satellite_mission(&self, ctx: &Ctx<'_>) -> Intent {
        let target = rendezvous_target(
            ctx.position,
            ctx.config.follower_speed,
            &self.leader_waypoints,
            ctx.config.leader_speed,
            ctx.now,
            self.rank,
            ctx.config.follower_altitude,
        );
        debug!(follower = %self.id, target = %target, "satellite intercept");
        Intent::StartMission { waypoints: vec![target], loop_mode: LoopMode::None }
    }

    /// Arrival is judged in the ground plane; note when the slant distance
    /// would have disagreed (altitude effect).
    fn note_xy_vs_3d(&mut self, ctx: &Ctx<'_>, poi_coord: [f64; 2], urg: Urgency) {
        let ground = Point3::ground(poi_coord[0], poi_coord[1]);
        let dist_xy = ctx.position.distance_xy(ground);
        let dist_3d = ctx.position.distance(ground);
        let r = ctx.config.detection_radius;
        if !(dist_xy <= r && r < dist_3d) {
            return;
        }
        self.xy3d_warns += 1;
        if self.xy3d_samples.len() < ctx.config.xy3d_sample_cap {
            let label = ctx
                .world
                .registry
                .resolve_coord(poi_coord, urg)
                .map(|p| p.label.clone());
            self.xy3d_samples.push(Xy3dSample {
                label,
                coord: poi_coord,
                dist_xy,
                dist_3d,
                dz: ctx.position.z.abs(),
            });
        }
        debug!(
            follower = %self.id,
            dist_xy = %format_args!("{dist_xy:.2}"),
            dist_3d = %format_args!("{dist_3d:.2}"),
            "arrival is planar: slant distance would have missed"
        );
    }

    /// Claim a point on arrival: stamp the arrival time, take the global
    /// lock, then buffer it for delivery.  Returns false when the buffer is
    /// full.
    fn claim(&mut self, id: PoiId, label: &str, now: f64, ctx: &Ctx<'_>) -> bool {
        if self.discovered.len() >= ctx.config.buffer_size {
            debug!(follower = %self.id, "discovered buffer full");
            return false;
        }
        self.arrival_ts.entry(id).or_insert(now);
        ctx.world.collected.claim(id);
        self.discovered.push((id, label.to_string()));
        true
    }

    fn already_buffered(&self, id: PoiId) -> bool {
        self.discovered.iter().any(|(d, _)| *d == id)
    }

    /// Evaluate every queued point against the current position.
    fn check_assigned_arrivals(&mut self, ctx: &Ctx<'_>) {
        let now = ctx.now;
        let r = ctx.config.detection_radius;

        let entries: Vec<(Point3, Urgency)> = self.next2visit.clone();
        for (wp, urg) in entries {
            let coord = [wp.x, wp.y];
            self.note_xy_vs_3d(ctx, coord, urg);

            let ground = Point3::ground(wp.x, wp.y);
            if ctx.position.distance_xy(ground) > r {
                continue;
            }
            let Some(poi) = ctx.world.registry.resolve_coord(coord, urg) else {
                debug!(follower = %self.id, x = wp.x, y = wp.y, "queued point resolves to nothing");
                continue;
            };
            let (id, label) = (poi.id, poi.label.clone());

            if ctx.world.collected.contains(id) {
                // Someone got here first: abandon the leg, don't claim.
                if let Some(idx) = self.next2visit.iter().position(|e| *e == (wp, urg)) {
                    self.next2visit.remove(idx);
                    info!(follower = %self.id, %label, "already collected globally, dropping");
                }
                continue;
            }

            if !self.visited.contains(&id) && !self.already_buffered(id) {
                if self.claim(id, &label, now, ctx) {
                    if let Some(idx) = self.next2visit.iter().position(|e| *e == (wp, urg)) {
                        self.next2visit.remove(idx);
                        self.disc_assigned += 1;
                        info!(follower = %self.id, %label, kind = "assigned", "collected");
                    } else {
                        self.disc_casual += 1;
                        info!(follower = %self.id, %label, kind = "casual", "collected");
                    }
                }
            }
        }
    }

    /// With an empty queue, opportunistically collect anything in slant
    /// range.
    fn check_casual_arrivals(&mut self, ctx: &Ctx<'_>) {
        let now = ctx.now;
        let in_range: Vec<(PoiId, String)> = ctx
            .world
            .registry
            .within_slant_radius(ctx.position, ctx.config.detection_radius)
            .into_iter()
            .map(|p| (p.id, p.label.clone()))
            .collect();

        for (id, label) in in_range {
            if ctx.world.collected.contains(id) {
                debug!(follower = %self.id, %label, "already collected globally (casual)");
                continue;
            }
            if !self.visited.contains(&id) && !self.already_buffered(id) {
                if self.claim(id, &label, now, ctx) {
                    self.disc_casual += 1;
                    info!(follower = %self.id, %label, kind = "casual", "collected");
                }
            }
        }
    }

    // ── Packet handlers ───────────────────────────────────────────────────

    fn on_assign(&mut self, pois: Vec<swarm_proto::AssignedPoi>, ctx: &Ctx<'_>) -> Vec<Intent> {
        info!(follower = %self.id, count = pois.len(), "ASSIGN received");

        let old = std::mem::take(&mut self.next2visit);

        // New tasks first, raised to cruise altitude.
        let mut new_labels: FxHashSet<String> = FxHashSet::default();
        for p in pois {
            let wp = Point3::new(p.coord[0], p.coord[1], ctx.config.follower_altitude);
            self.next2visit.push((wp, p.urgency));
            new_labels.insert(p.label);
        }

        // Then the old queue, minus overlaps, up to capacity.
        for (wp, urg) in old {
            if self.next2visit.len() >= ctx.config.buffer_size {
                break;
            }
            let overlaps = ctx
                .world
                .registry
                .resolve_coord([wp.x, wp.y], urg)
                .is_some_and(|p| new_labels.contains(&p.label));
            if !overlaps {
                self.next2visit.push((wp, urg));
            }
        }

        if self.next2visit.is_empty() {
            debug!(follower = %self.id, "empty assignment, staying satellite");
            return Vec::new();
        }

        self.mode = FollowerMode::Visiting;
        let waypoints: Vec<Point3> = self.next2visit.iter().map(|&(wp, _)| wp).collect();
        debug!(follower = %self.id, legs = waypoints.len(), "visiting mission launched");
        vec![Intent::StartMission { waypoints, loop_mode: LoopMode::None }]
    }

    fn on_deliver_ack(&mut self, pids: Vec<PoiId>) {
        info!(follower = %self.id, count = pids.len(), "DELIVER_ACK received");
        for id in pids {
            self.discovered.retain(|(d, _)| *d != id);
            self.visited.insert(id);
            self.arrival_ts.remove(&id);
        }
        debug!(
            follower = %self.id,
            visited = self.visited.len(),
            unacked = self.discovered.len(),
            "after acknowledgement"
        );
    }

    /// Report everything collected and not yet acknowledged.  Nothing to
    /// report means no message at all.
    fn send_deliver(&self, ctx: &Ctx<'_>) -> Option<Intent> {
        if self.discovered.is_empty() {
            debug!(follower = %self.id, "nothing to deliver");
            return None;
        }
        let now = ctx.now;
        let pids: Vec<DeliverEntry> = self
            .discovered
            .iter()
            .map(|(id, label)| DeliverEntry {
                id: Some(*id),
                label: Some(label.clone()),
                t_arrive: Some(self.arrival_ts.get(id).copied().unwrap_or(now)),
            })
            .collect();
        info!(follower = %self.id, count = pids.len(), "DELIVER sent");
        Some(Intent::Send {
            to: self.leader,
            message: Message::Deliver { v_id: self.id, pids },
        })
    }
}

impl Protocol for Follower {
    fn initialize(&mut self, ctx: &Ctx<'_>) -> Vec<Intent> {
        info!(
            follower = %self.id,
            leader = %self.leader,
            rank = self.rank,
            "satellite mode starting"
        );
        vec![
            self.satellite_mission(ctx),
            Intent::ScheduleTimer { name: TIMER_HELLO, at: ctx.now + HELLO_PERIOD_SECS },
            Intent::ScheduleTimer { name: TIMER_SATELLITE, at: ctx.now + HELLO_PERIOD_SECS },
        ]
    }

    fn handle_timer(&mut self, timer: &str, ctx: &Ctx<'_>) -> Vec<Intent> {
        match timer {
            TIMER_HELLO => {
                let free = self.free_slots(ctx);
                debug!(
                    follower = %self.id,
                    mode = ?self.mode,
                    free,
                    discovered = self.discovered.len(),
                    visited = self.visited.len(),
                    "hello tick"
                );
                vec![
                    Intent::Send {
                        to: self.leader,
                        message: Message::Hello {
                            v_id: self.id,
                            free_slots: free,
                            position: ctx.position.as_array(),
                        },
                    },
                    Intent::ScheduleTimer { name: TIMER_HELLO, at: ctx.now + HELLO_PERIOD_SECS },
                ]
            }
            TIMER_SATELLITE => {
                let mut out = Vec::new();
                if ctx.mission_idle {
                    if self.mode == FollowerMode::Visiting {
                        info!(follower = %self.id, "mission complete, back to satellite");
                        self.mode = FollowerMode::Satellite;
                    }
                    out.push(self.satellite_mission(ctx));
                }
                out.push(Intent::ScheduleTimer {
                    name: TIMER_SATELLITE,
                    at: ctx.now + SATELLITE_PERIOD_SECS,
                });
                out
            }
            other => {
                debug!(follower = %self.id, timer = other, "unknown timer");
                Vec::new()
            }
        }
    }

    fn handle_telemetry(&mut self, _telemetry: &Telemetry, ctx: &Ctx<'_>) -> Vec<Intent> {
        self.check_assigned_arrivals(ctx);
        if self.next2visit.is_empty() {
            self.check_casual_arrivals(ctx);
        }
        Vec::new()
    }

    fn handle_packet(&mut self, raw: &[u8], ctx: &Ctx<'_>) -> Vec<Intent> {
        let msg = match Message::decode(raw) {
            Ok(msg) => msg,
            Err(err) => {
                debug!(follower = %self.id, %err, "undecodable packet dropped");
                return Vec::new();
            }
        };

        match msg {
            Message::Assign { pois, .. } => self.on_assign(pois, ctx),
            Message::HelloAck { eqc_pos, eqc_time, .. } => {
                self.last_leader_fix = Some((Point3::from_array(eqc_pos), eqc_time));
                debug!(follower = %self.id, "HELLO_ACK, reporting");
                self.send_deliver(ctx).into_iter().collect()
            }
            Message::DeliverAck { pids, .. } => {
                self.on_deliver_ack(pids);
                Vec::new()
            }
            other => {
                debug!(follower = %self.id, kind = other.kind(), "unexpected message kind");
                Vec::new()
            }
        }
    }

    fn finish(&mut self, _ctx: &Ctx<'_>) {
        info!(
            follower = %self.id,
            visited = self.visited.len(),
            unacked = self.discovered.len(),
            queued = self.next2visit.len(),
            casual = self.disc_casual,
            assigned = self.disc_assigned,
            "follower finished"
        );
        if self.xy3d_warns > 0 {
            let samples: Vec<String> = self
                .xy3d_samples
                .iter()
                .map(|s| {
                    format!(
                        "(label={:?} coord=({:.1},{:.1}) xy={:.2} d3={:.2} |dz|={:.2})",
                        s.label, s.coord[0], s.coord[1], s.dist_xy, s.dist_3d, s.dz
                    )
                })
                .collect();
            warn!(
                follower = %self.id,
                count = self.xy3d_warns,
                samples = %samples.join(", "),
                "planar arrivals the slant distance would have missed"
            );
        }
    }
}
