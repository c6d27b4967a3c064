//! The leader protocol: patrol, detect, assign, reconcile.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use swarm_core::{AgentId, Point3, PoiId, PolicyKind};
use swarm_metrics::{mean, p95, render_table, LatencySamples, LeaderReport};
use swarm_mobility::LoopMode;
use swarm_proto::{AssignedPoi, DeliverEntry, Message};
use tracing::{debug, info, warn};

use crate::policy::{make_policy, Assignment, AssignmentPolicy, FollowerSlot, PolicyView};
use crate::{Ctx, Intent, Protocol, Telemetry};

/// Period of the detection/assignment timer.
const ASSIGN_PERIOD_SECS: f64 = 1.0;
const TIMER_ASSIGN: &str = "assign";

/// Latest HELLO snapshot for one follower.
#[derive(Clone, Debug)]
pub(crate) struct FollowerSnapshot {
    pub(crate) free_slots: usize,
    pub(crate) position: Point3,
}

/// Everything a leader knows, separate from its policy so the policy can
/// borrow it without fighting the borrow checker.
pub(crate) struct LeaderCore {
    pub(crate) id: AgentId,
    pub(crate) waypoints: Vec<Point3>,
    pub(crate) spawn_time: f64,

    /// Detected points awaiting assignment, in detection order.  No
    /// duplicates; purged against the collection lock every timer tick.
    pub(crate) pending: Vec<PoiId>,
    /// First-detection timestamps.  Never removed during a run.
    pub(crate) detect_ts: FxHashMap<PoiId, f64>,
    /// Latest HELLO per follower.  BTreeMap: iteration order is the
    /// assignment order and must be stable.
    pub(crate) followers: BTreeMap<AgentId, FollowerSnapshot>,
    /// Outstanding assignments awaiting delivery.
    pub(crate) assign_times: FxHashMap<PoiId, f64>,
    /// Assignments per follower within the current physical encounter.
    pub(crate) encounter_assigned: BTreeMap<AgentId, usize>,
    pub(crate) last_hello: BTreeMap<AgentId, f64>,

    /// Coalesced "an assignment round is wanted" flag.
    pub(crate) assign_triggered: bool,
    /// Cooldown deadline after a successful round.
    pub(crate) next_assign_earliest: f64,

    // ── Accounting ────────────────────────────────────────────────────────
    pub(crate) lat_service: LatencySamples,
    pub(crate) lat_contact: LatencySamples,
    pub(crate) lat_e2e: LatencySamples,
    pub(crate) assign_to_ack: LatencySamples,
    pub(crate) t_detect_samples: Vec<f64>,
    pub(crate) assigns_sent: u64,
    pub(crate) assign_success: u64,
    pub(crate) redundant_delivers: u64,
    pub(crate) global_score: f64,
    pub(crate) cam_raw: u64,
    pub(crate) cam_matches: u64,
    pub(crate) per_follower_assigns: BTreeMap<AgentId, u64>,
    pub(crate) coverage_timeline: Vec<(f64, usize)>,

    last_waypoint: Option<Point3>,
}

/// A patrolling leader: sweeps its band, detects points, and orchestrates
/// assignments to its followers.
pub struct Leader {
    pub(crate) core: LeaderCore,
    policy: Box<dyn AssignmentPolicy>,
}

impl Leader {
    pub fn new(id: AgentId, waypoints: Vec<Point3>, policy: PolicyKind) -> Self {
        Self {
            core: LeaderCore {
                id,
                waypoints,
                spawn_time: 0.0,
                pending: Vec::new(),
                detect_ts: FxHashMap::default(),
                followers: BTreeMap::new(),
                assign_times: FxHashMap::default(),
                encounter_assigned: BTreeMap::new(),
                last_hello: BTreeMap::new(),
                assign_triggered: false,
                next_assign_earliest: 0.0,
                lat_service: LatencySamples::new(),
                lat_contact: LatencySamples::new(),
                lat_e2e: LatencySamples::new(),
                assign_to_ack: LatencySamples::new(),
                t_detect_samples: Vec::new(),
                assigns_sent: 0,
                assign_success: 0,
                redundant_delivers: 0,
                global_score: 0.0,
                cam_raw: 0,
                cam_matches: 0,
                per_follower_assigns: BTreeMap::new(),
                coverage_timeline: Vec::new(),
                last_waypoint: None,
            },
            policy: make_policy(policy),
        }
    }

    /// Mark that an assignment round is wanted.  Coalesced: the round itself
    /// only runs from the periodic timer.
    fn trigger_assign(&mut self, reason: &str) {
        self.core.assign_triggered = true;
        debug!(
            leader = %self.core.id,
            reason,
            pending = self.core.pending.len(),
            "assignment triggered"
        );
    }

    fn any_follower_has_free(&self) -> bool {
        self.core.followers.values().any(|s| s.free_slots > 0)
    }

    // ── Detection ─────────────────────────────────────────────────────────

    /// Drop queued points the collection lock already covers.
    fn purge_pending(&mut self, ctx: &Ctx<'_>) {
        let before = self.core.pending.len();
        let collected = &ctx.world.collected;
        self.core.pending.retain(|&p| !collected.contains(p));
        let removed = before - self.core.pending.len();
        if removed > 0 {
            debug!(leader = %self.core.id, removed, "pruned pending via collection lock");
        }
    }

    /// One camera shot, matched against the registry with the coordinate
    /// tolerance.  First match per point wins; later shots of the same point
    /// are no-ops thanks to `detect_ts`.
    fn camera_sweep(&mut self, ctx: &Ctx<'_>) {
        let now = ctx.now;
        let detected = ctx.camera_scan();
        self.core.cam_raw += detected.len() as u64;
        if !detected.is_empty() {
            debug!(leader = %self.core.id, nodes = detected.len(), "camera sweep");
        }

        let eps = ctx.config.coord_match_eps;
        for poi in ctx.world.registry.iter() {
            for node in &detected {
                let matches = (node[0] - poi.coord[0]).abs() < eps
                    && (node[1] - poi.coord[1]).abs() < eps
                    && node[2].abs() < eps;
                if !matches {
                    continue;
                }

                if ctx.world.collected.contains(poi.id) {
                    debug!(leader = %self.core.id, label = %poi.label, "skip: already collected");
                    break;
                }
                if !self.core.detect_ts.contains_key(&poi.id) {
                    self.core.cam_matches += 1;
                    self.core.detect_ts.insert(poi.id, now);
                    self.core.t_detect_samples.push(now - self.core.spawn_time);
                    if !self.core.pending.contains(&poi.id) {
                        self.core.pending.push(poi.id);
                    }
                    info!(
                        leader = %self.core.id,
                        label = %poi.label,
                        t = %format_args!("{now:.2}"),
                        "point detected"
                    );
                }
                break;
            }
        }
    }

    // ── Assignment round ──────────────────────────────────────────────────

    fn maybe_assign(&mut self, ctx: &Ctx<'_>, out: &mut Vec<Intent>) {
        let now = ctx.now;
        let core = &self.core;
        let ready = core.assign_triggered
            && !core.pending.is_empty()
            && !core.followers.is_empty()
            && now >= core.next_assign_earliest
            && self.any_follower_has_free();

        if !ready {
            if core.assign_triggered {
                let mut reasons = Vec::new();
                if core.pending.is_empty() {
                    reasons.push("pending=0".to_string());
                }
                if core.followers.is_empty() {
                    reasons.push("no_hello_yet".to_string());
                }
                if now < core.next_assign_earliest {
                    reasons.push(format!("cooldown_until={:.2}", core.next_assign_earliest));
                }
                if reasons.is_empty() && !self.any_follower_has_free() {
                    reasons.push("no_free_slots".to_string());
                }
                info!(leader = %self.core.id, reasons = %reasons.join(";"), "assignment skipped");
            } else {
                debug!(leader = %self.core.id, "no assignment trigger");
            }
            return;
        }

        self.core.assign_triggered = false;
        self.core.next_assign_earliest = now + ctx.config.assignment_cooldown_secs;

        let candidates: Vec<PoiId> = self
            .core
            .pending
            .iter()
            .copied()
            .filter(|&p| !ctx.world.collected.contains(p))
            .collect();
        let slots: Vec<FollowerSlot> = self
            .core
            .followers
            .iter()
            .map(|(&id, snap)| FollowerSlot {
                id,
                free_slots: snap.free_slots,
                position: snap.position,
                encounter_assigned: self.core.encounter_assigned.get(&id).copied().unwrap_or(0),
            })
            .collect();

        let view = PolicyView {
            candidates: &candidates,
            followers: &slots,
            registry: &ctx.world.registry,
            collected: &ctx.world.collected,
            max_per_encounter: ctx.config.max_assign_per_encounter,
        };
        let plan = self.policy.plan(&view);
        info!(
            leader = %self.core.id,
            policy = self.policy.name(),
            pending = self.core.pending.len(),
            planned = plan.len(),
            "assignment round"
        );
        self.commit_assignments(plan, ctx, out);
    }

    /// Turn a plan into state changes and ASSIGN messages.  The collection
    /// lock is re-checked per point immediately before emission.
    fn commit_assignments(&mut self, plan: Vec<Assignment>, ctx: &Ctx<'_>, out: &mut Vec<Intent>) {
        let now = ctx.now;
        for Assignment { follower, pois } in plan {
            let mut survivors: Vec<PoiId> = Vec::new();
            let mut payload: Vec<AssignedPoi> = Vec::new();
            for p in pois {
                if ctx.world.collected.contains(p) {
                    debug!(leader = %self.core.id, poi = %p, "dropped at race check");
                    continue;
                }
                let Some(poi) = ctx.world.registry.get(p) else { continue };
                survivors.push(p);
                payload.push(AssignedPoi {
                    label: poi.label.clone(),
                    coord: poi.coord,
                    urgency: poi.urgency,
                    ts: self.core.detect_ts.get(&p).copied().unwrap_or(now),
                });
            }
            if survivors.is_empty() {
                debug!(leader = %self.core.id, follower = %follower, "nothing left after race check");
                continue;
            }

            for &p in &survivors {
                self.core.assign_times.insert(p, now);
                self.core.pending.retain(|&q| q != p);
            }
            let n = survivors.len();
            self.core.assigns_sent += n as u64;
            *self.core.per_follower_assigns.entry(follower).or_insert(0) += n as u64;
            *self.core.encounter_assigned.entry(follower).or_insert(0) += n;
            if let Some(snap) = self.core.followers.get_mut(&follower) {
                snap.free_slots = snap.free_slots.saturating_sub(n);
            }

            info!(
                leader = %self.core.id,
                follower = %follower,
                count = n,
                "ASSIGN sent"
            );
            out.push(Intent::Send {
                to: follower,
                message: Message::Assign { v_id: follower, pois: payload },
            });
        }
    }

    // ── Packet handlers ───────────────────────────────────────────────────

    fn on_hello(
        &mut self,
        vid: AgentId,
        free_slots: usize,
        position: [f64; 3],
        ctx: &Ctx<'_>,
        out: &mut Vec<Intent>,
    ) {
        let now = ctx.now;

        // A gap above the encounter threshold starts a fresh encounter.
        let fresh_encounter = match self.core.last_hello.get(&vid) {
            Some(&prev) => now - prev > ctx.config.encounter_gap_secs,
            None => true,
        };
        if fresh_encounter {
            self.core.encounter_assigned.insert(vid, 0);
        }
        self.core.last_hello.insert(vid, now);
        self.core.followers.insert(
            vid,
            FollowerSnapshot { free_slots, position: Point3::from_array(position) },
        );
        debug!(
            leader = %self.core.id,
            follower = %vid,
            free_slots,
            pending = self.core.pending.len(),
            "HELLO"
        );
        if free_slots == 0 {
            debug!(leader = %self.core.id, follower = %vid, "follower buffer full");
        }

        out.push(Intent::Send {
            to: vid,
            message: Message::HelloAck {
                v_id: vid,
                eqc_id: self.core.id,
                eqc_pos: ctx.position.as_array(),
                eqc_time: now,
            },
        });

        if !self.core.pending.is_empty() && free_slots > 0 {
            self.trigger_assign("HELLO");
        }
    }

    fn on_deliver(
        &mut self,
        vid: AgentId,
        entries: Vec<DeliverEntry>,
        ctx: &Ctx<'_>,
        out: &mut Vec<Intent>,
    ) {
        let now = ctx.now;
        info!(leader = %self.core.id, follower = %vid, count = entries.len(), "DELIVER");

        let mut acked: Vec<PoiId> = Vec::new();
        for entry in entries {
            let (Some(id), Some(label)) = (entry.id, entry.label.as_deref()) else {
                warn!(leader = %self.core.id, follower = %vid, "malformed DELIVER entry, skipped");
                continue;
            };
            let Some(poi) = ctx.world.registry.get(id) else {
                warn!(leader = %self.core.id, %label, "DELIVER names an unknown point, skipped");
                continue;
            };

            // Service and contact latencies need both ends of the interval.
            let t_detect = self.core.detect_ts.get(&id).copied();
            if let (Some(t_arrive), Some(t_detect)) = (entry.t_arrive, t_detect) {
                self.core.lat_service.push(id, t_arrive - t_detect);
                self.core.lat_contact.push(id, now - t_arrive);
            } else {
                debug!(leader = %self.core.id, %label, "partial latency data for delivery");
            }
            self.core.lat_e2e.push(id, now - self.core.spawn_time);

            let mut metrics = ctx.world.metrics.borrow_mut();
            if let Some(t_assign) = self.core.assign_times.remove(&id) {
                self.core.assign_to_ack.push(id, now - t_assign);
                self.core.assign_success += 1;
                self.core.global_score += poi.urgency.weight();
                metrics.record_unique(id);

                if ctx.config.bump_free_on_assigned_deliver {
                    if let Some(snap) = self.core.followers.get_mut(&vid) {
                        snap.free_slots = (snap.free_slots + 1).min(ctx.config.buffer_size);
                    }
                }
            } else if metrics.record_unique(id) {
                // Collected without an assignment from this leader.
                self.core.global_score += poi.urgency.weight();
                debug!(leader = %self.core.id, %label, "first unassigned delivery");
            } else {
                self.core.redundant_delivers += 1;
                metrics.redundant += 1;
                debug!(leader = %self.core.id, %label, "redundant delivery");
            }

            self.core
                .coverage_timeline
                .push((now - self.core.spawn_time, metrics.unique.len()));
            drop(metrics);

            acked.push(id);
        }

        let acked_set: FxHashSet<PoiId> = acked.iter().copied().collect();
        self.core.pending.retain(|p| !acked_set.contains(p));

        out.push(Intent::Send {
            to: vid,
            message: Message::DeliverAck { v_id: vid, pids: acked },
        });
        self.trigger_assign("DELIVER");
    }
}

impl Protocol for Leader {
    fn initialize(&mut self, ctx: &Ctx<'_>) -> Vec<Intent> {
        self.core.spawn_time = ctx.now;
        info!(
            leader = %self.core.id,
            waypoints = self.core.waypoints.len(),
            "patrol starting"
        );
        vec![
            Intent::StartMission {
                waypoints: self.core.waypoints.clone(),
                loop_mode: LoopMode::Restart,
            },
            Intent::ScheduleTimer { name: TIMER_ASSIGN, at: ctx.now + ASSIGN_PERIOD_SECS },
        ]
    }

    fn handle_timer(&mut self, timer: &str, ctx: &Ctx<'_>) -> Vec<Intent> {
        if timer != TIMER_ASSIGN {
            debug!(leader = %self.core.id, timer, "unknown timer");
            return Vec::new();
        }
        let mut out = Vec::new();

        self.purge_pending(ctx);
        self.camera_sweep(ctx);
        out.push(Intent::ScheduleTimer { name: TIMER_ASSIGN, at: ctx.now + ASSIGN_PERIOD_SECS });
        self.maybe_assign(ctx, &mut out);
        out
    }

    fn handle_telemetry(&mut self, _telemetry: &Telemetry, ctx: &Ctx<'_>) -> Vec<Intent> {
        if ctx.current_waypoint != self.core.last_waypoint {
            if let Some(wp) = ctx.current_waypoint {
                debug!(leader = %self.core.id, waypoint = %wp, "heading to next waypoint");
            }
            self.core.last_waypoint = ctx.current_waypoint;
        }
        Vec::new()
    }

    fn handle_packet(&mut self, raw: &[u8], ctx: &Ctx<'_>) -> Vec<Intent> {
        let msg = match Message::decode(raw) {
            Ok(msg) => msg,
            Err(err) => {
                debug!(leader = %self.core.id, %err, "undecodable packet dropped");
                return Vec::new();
            }
        };

        let vid = msg.v_id();
        if !matches!(msg, Message::Hello { .. }) && !self.core.followers.contains_key(&vid) {
            warn!(
                leader = %self.core.id,
                kind = msg.kind(),
                follower = %vid,
                "ignoring message from unknown follower (no HELLO yet)"
            );
            return Vec::new();
        }

        let mut out = Vec::new();
        match msg {
            Message::Hello { free_slots, position, .. } => {
                self.on_hello(vid, free_slots, position, ctx, &mut out);
            }
            Message::Deliver { pids, .. } => {
                self.on_deliver(vid, pids, ctx, &mut out);
            }
            other => {
                debug!(leader = %self.core.id, kind = other.kind(), "unexpected message kind");
            }
        }
        out
    }

    fn finish(&mut self, ctx: &Ctx<'_>) {
        let core = &mut self.core;
        let service = core.lat_service.values();
        let contact = core.lat_contact.values();
        let e2e = core.lat_e2e.values();
        let a2a = core.assign_to_ack.values();

        let success_rate = if core.assigns_sent > 0 {
            core.assign_success as f64 / core.assigns_sent as f64
        } else {
            f64::NAN
        };

        let rows = vec![
            ["Assigns sent".into(), core.assigns_sent.to_string(), String::new()],
            ["Successful delivers".into(), core.assign_success.to_string(), String::new()],
            ["Success rate".into(), format!("{success_rate:.2}"), "successful/assigns".into()],
            ["Redundant delivers".into(), core.redundant_delivers.to_string(), String::new()],
            [
                "Service latency (s)".into(),
                format!("mean={:.3} p95={:.3}", mean(&service), p95(&service)),
                "t_arrive - t_detect".into(),
            ],
            [
                "Contact overhead (s)".into(),
                format!("mean={:.3} p95={:.3}", mean(&contact), p95(&contact)),
                "t_deliver_ack - t_arrive".into(),
            ],
            [
                "E2e latency (s)".into(),
                format!("mean={:.3} p95={:.3}", mean(&e2e), p95(&e2e)),
                "t_deliver_ack - t_spawn".into(),
            ],
            ["Camera raw / matches".into(), format!("{} / {}", core.cam_raw, core.cam_matches), String::new()],
            ["Mission score".into(), format!("{:.2}", core.global_score), "urgency-weighted".into()],
        ];
        info!(
            leader = %core.id,
            "local summary\n{}",
            render_table(["Metric", "Value", "Notes"], &rows)
        );
        if !a2a.is_empty() {
            debug!(leader = %core.id, mean = %format_args!("{:.3}", mean(&a2a)), "assign-to-ack latency");
        }
        for (vid, count) in &core.per_follower_assigns {
            debug!(leader = %core.id, follower = %vid, count, "assignments to follower");
        }

        let mut metrics = ctx.world.metrics.borrow_mut();
        core.lat_service.drain_into(&mut metrics.lat_service);
        core.lat_contact.drain_into(&mut metrics.lat_contact);
        core.lat_e2e.drain_into(&mut metrics.lat_e2e);
        metrics.t_detect.extend(core.t_detect_samples.drain(..));
        metrics.cam_raw += core.cam_raw;
        metrics.cam_matches += core.cam_matches;
        metrics.global_score += core.global_score;
        metrics.coverage_timeline.append(&mut core.coverage_timeline);
        metrics.leader_reports.push(LeaderReport {
            leader: core.id,
            assigns_sent: core.assigns_sent,
            assign_success: core.assign_success,
            redundant_delivers: core.redundant_delivers,
        });

        info!(
            leader = %core.id,
            pending_final = core.pending.len(),
            followers = core.followers.len(),
            "leader finished"
        );
    }
}
