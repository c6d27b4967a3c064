//! Assignment policies.
//!
//! A policy plans against a read-only snapshot and returns who gets what;
//! the leader commits the plan (final race check against the collection
//! lock, bookkeeping, message emission).  Policies that spread work across
//! several steps track their own local copies of free slots and encounter
//! quotas — the snapshot is never mutated.
//!
//! Follower order in the snapshot is ascending agent id, which makes the
//! "stable per run" iteration order concrete: greedy serves followers in id
//! order, round-robin rotates over id order, and load-balancing breaks
//! free-slot ties by id order.

use rustc_hash::FxHashSet;
use swarm_core::{AgentId, Point3, PoiId, PolicyKind};
use swarm_world::{CollectedSet, Poi, PoiRegistry};
use tracing::debug;

/// Distance floor so co-located follower/point pairs do not divide by zero.
const MIN_SCORE_DISTANCE_M: f64 = 1e-6;

/// One follower as the planner sees it.
#[derive(Clone, Debug)]
pub struct FollowerSlot {
    pub id: AgentId,
    /// Free buffer slots from the latest HELLO, minus already-committed
    /// assignments.
    pub free_slots: usize,
    pub position: Point3,
    /// Assignments to this follower within the current encounter.
    pub encounter_assigned: usize,
}

/// Read-only planning snapshot.
pub struct PolicyView<'a> {
    /// Queued points eligible for assignment, in queue order.
    pub candidates: &'a [PoiId],
    /// Known followers, ascending id.
    pub followers: &'a [FollowerSlot],
    pub registry: &'a PoiRegistry,
    /// Global collection lock, for mid-plan re-checks.
    pub collected: &'a CollectedSet,
    pub max_per_encounter: usize,
}

/// A planned hand-over: one ASSIGN message to `follower` for `pois`.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub follower: AgentId,
    pub pois: Vec<PoiId>,
}

/// A pluggable assignment strategy.  Implementations may keep state across
/// invocations (the round-robin cursor does).
pub trait AssignmentPolicy {
    fn name(&self) -> &'static str;

    /// Plan one assignment round.  May return several entries for the same
    /// follower (each becomes its own ASSIGN message).
    fn plan(&mut self, view: &PolicyView<'_>) -> Vec<Assignment>;
}

/// Construct the policy for `kind`.
pub fn make_policy(kind: PolicyKind) -> Box<dyn AssignmentPolicy> {
    match kind {
        PolicyKind::Greedy        => Box::new(Greedy),
        PolicyKind::RoundRobin    => Box::new(RoundRobin::default()),
        PolicyKind::LoadBalancing => Box::new(LoadBalancing),
    }
}

/// urgency level / planar distance — higher is better.
fn score(follower_pos: Point3, poi: &Poi) -> f64 {
    let dist = follower_pos
        .distance_xy(poi.ground_point())
        .max(MIN_SCORE_DISTANCE_M);
    poi.urgency.level() as f64 / dist
}

fn quota_remaining(view: &PolicyView<'_>, slot_assigned: usize) -> usize {
    view.max_per_encounter.saturating_sub(slot_assigned)
}

// ── Greedy ────────────────────────────────────────────────────────────────────

/// For each follower in turn: score every remaining candidate by
/// urgency/distance and hand over the best ones up to the follower's free
/// slots and encounter quota.
pub struct Greedy;

impl AssignmentPolicy for Greedy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn plan(&mut self, view: &PolicyView<'_>) -> Vec<Assignment> {
        let mut taken: FxHashSet<PoiId> = FxHashSet::default();
        let mut out = Vec::new();

        for slot in view.followers {
            let quota = quota_remaining(view, slot.encounter_assigned);
            if slot.free_slots == 0 || quota == 0 {
                debug!(follower = %slot.id, "greedy: no free slots or quota exhausted");
                continue;
            }

            let mut scored: Vec<(f64, PoiId)> = Vec::new();
            for &p in view.candidates {
                if taken.contains(&p) || view.collected.contains(p) {
                    continue;
                }
                if let Some(poi) = view.registry.get(p) {
                    scored.push((score(slot.position, poi), p));
                }
            }
            if scored.is_empty() {
                continue;
            }
            // Stable sort: equal scores keep queue order.
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

            let limit = slot.free_slots.min(quota);
            let chosen: Vec<PoiId> = scored.iter().take(limit).map(|&(_, p)| p).collect();
            taken.extend(chosen.iter().copied());
            out.push(Assignment { follower: slot.id, pois: chosen });
        }
        out
    }
}

// ── Round-robin ───────────────────────────────────────────────────────────────

/// Rotate a persistent cursor over the followers; the first one with a free
/// slot receives the head of the queue.  At most one point per round.
#[derive(Default)]
pub struct RoundRobin {
    cursor: usize,
}

impl AssignmentPolicy for RoundRobin {
    fn name(&self) -> &'static str {
        "round_robin"
    }

    fn plan(&mut self, view: &PolicyView<'_>) -> Vec<Assignment> {
        let n = view.followers.len();
        if n == 0 || view.candidates.is_empty() {
            return Vec::new();
        }

        for _ in 0..n {
            let slot = &view.followers[self.cursor % n];
            self.cursor += 1;

            if slot.free_slots == 0 {
                debug!(follower = %slot.id, "round-robin: no free slots");
                continue;
            }
            let head = view.candidates[0];
            if view.collected.contains(head) {
                // Claimed since the snapshot; let the next rotation retry.
                continue;
            }
            return vec![Assignment { follower: slot.id, pois: vec![head] }];
        }
        Vec::new()
    }
}

// ── Load-balancing ────────────────────────────────────────────────────────────

/// Rounds over the eligible followers sorted by free slots (most first);
/// each gets its single best candidate per round.  Stops when candidates or
/// eligible followers run out, or a full round assigns nothing.
pub struct LoadBalancing;

impl AssignmentPolicy for LoadBalancing {
    fn name(&self) -> &'static str {
        "load_balancing"
    }

    fn plan(&mut self, view: &PolicyView<'_>) -> Vec<Assignment> {
        let mut out = Vec::new();
        let mut remaining: Vec<PoiId> = view.candidates.to_vec();
        // Local working copies; the snapshot stays untouched.
        let mut free: Vec<usize> = view.followers.iter().map(|s| s.free_slots).collect();
        let mut quota: Vec<usize> = view
            .followers
            .iter()
            .map(|s| quota_remaining(view, s.encounter_assigned))
            .collect();

        while !remaining.is_empty() {
            let mut eligible: Vec<usize> = (0..view.followers.len())
                .filter(|&i| free[i] > 0 && quota[i] > 0)
                .collect();
            if eligible.is_empty() {
                debug!("load-balancing: no follower with slots or quota left");
                break;
            }
            // Most free slots first; ties keep ascending-id order.
            eligible.sort_by_key(|&i| std::cmp::Reverse(free[i]));

            let mut assigned_this_round = false;
            for i in eligible {
                if free[i] == 0 || quota[i] == 0 {
                    continue;
                }
                let pos = view.followers[i].position;

                let mut best: Option<(f64, usize)> = None;
                for (idx, &p) in remaining.iter().enumerate() {
                    if view.collected.contains(p) {
                        continue;
                    }
                    let Some(poi) = view.registry.get(p) else { continue };
                    let s = score(pos, poi);
                    if best.map_or(true, |(bs, _)| s > bs) {
                        best = Some((s, idx));
                    }
                }
                let Some((_, idx)) = best else { continue };

                let poi = remaining.remove(idx);
                free[i] -= 1;
                quota[i] -= 1;
                out.push(Assignment { follower: view.followers[i].id, pois: vec![poi] });
                assigned_this_round = true;

                if remaining.is_empty() {
                    break;
                }
            }

            if !assigned_this_round {
                debug!("load-balancing: round assigned nothing, stopping");
                break;
            }
        }
        out
    }
}
