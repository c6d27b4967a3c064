//! Domain configuration: fleet sizes, speeds, radii, and protocol constants.

use std::str::FromStr;

use crate::error::SwarmError;

// ── PolicyKind ────────────────────────────────────────────────────────────────

/// Which assignment policy the leaders run.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PolicyKind {
    /// Per-follower urgency/distance scoring, best candidates first.
    Greedy,
    /// One head-of-queue candidate per round, followers in rotation.
    RoundRobin,
    /// Rounds over followers sorted by free slots, best candidate each.
    LoadBalancing,
}

impl PolicyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Greedy        => "greedy",
            PolicyKind::RoundRobin    => "round_robin",
            PolicyKind::LoadBalancing => "load_balancing",
        }
    }
}

impl FromStr for PolicyKind {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greedy"         => Ok(PolicyKind::Greedy),
            "round_robin"    => Ok(PolicyKind::RoundRobin),
            "load_balancing" => Ok(PolicyKind::LoadBalancing),
            other => Err(SwarmError::Config(format!(
                "unknown assignment policy {other:?} (expected greedy, round_robin, or load_balancing)"
            ))),
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── FleetConfig ───────────────────────────────────────────────────────────────

/// Everything about the fleet and its environment that is not engine timing.
///
/// The last block holds protocol constants that are configurable in
/// principle but rarely changed; their defaults are the values the rest of
/// the system was tuned against.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetConfig {
    /// Points of interest scattered uniformly over the area square.
    pub num_pois: usize,
    /// Patrolling leaders (each sweeps one horizontal band of the area).
    pub num_leaders: usize,
    /// Visiting followers, attached round-robin to leaders.
    pub num_followers: usize,
    /// Follower buffer capacity M (bounds both the mission queue and the
    /// discovered buffer).
    pub buffer_size: usize,

    /// Leader patrol speed, m/s.
    pub leader_speed: f64,
    /// Follower cruise speed, m/s.
    pub follower_speed: f64,

    /// Camera slant reach of the leaders, metres.
    pub camera_reach: f64,
    /// Follower detection/arrival radius, metres.
    pub detection_radius: f64,
    /// Transmission range of the communication medium, metres.
    pub comm_range: f64,

    /// Side of the square operating area, metres.
    pub area_side: f64,
    /// Leader patrol altitude, metres.
    pub leader_altitude: f64,
    /// Follower cruise altitude, metres.
    pub follower_altitude: f64,

    /// Assignment policy run by every leader.
    pub policy: PolicyKind,

    /// Coordinate-match tolerance when pairing camera detections with
    /// registered points (absolute difference per axis).
    pub coord_match_eps: f64,
    /// A follower's HELLO gap above this many seconds starts a new
    /// physical encounter.
    pub encounter_gap_secs: f64,
    /// Minimum pause between two assignment rounds of the same leader.
    pub assignment_cooldown_secs: f64,
    /// Cap on assignments to one follower within a single encounter.
    /// `usize::MAX` disables the throttle.
    pub max_assign_per_encounter: usize,
    /// Speculatively bump a follower's cached free slots when one of its
    /// assigned points is delivered (freshness optimization, off by default).
    pub bump_free_on_assigned_deliver: bool,
    /// How many XY-vs-3D arrival discrepancies to keep as diagnostic samples.
    pub xy3d_sample_cap: usize,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            num_pois:                      200,
            num_leaders:                   1,
            num_followers:                 2,
            buffer_size:                   5,
            leader_speed:                  6.0,
            follower_speed:                12.0,
            camera_reach:                  84.9,
            detection_radius:              5.0,
            comm_range:                    150.0,
            area_side:                     1200.0,
            leader_altitude:               10.0,
            follower_altitude:             4.0,
            policy:                        PolicyKind::LoadBalancing,
            coord_match_eps:               0.2,
            encounter_gap_secs:            1.2,
            assignment_cooldown_secs:      0.1,
            max_assign_per_encounter:      usize::MAX,
            bump_free_on_assigned_deliver: false,
            xy3d_sample_cap:               5,
        }
    }
}

impl FleetConfig {
    /// Followers per leader, the `rho` axis of sweep campaigns.
    pub fn rho(&self) -> f64 {
        if self.num_leaders == 0 {
            return f64::NAN;
        }
        self.num_followers as f64 / self.num_leaders as f64
    }
}
