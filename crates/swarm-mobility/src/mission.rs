//! Per-agent waypoint mission state.

use swarm_core::Point3;

/// What happens after the last waypoint.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum LoopMode {
    /// Stop and go idle at the last waypoint.
    #[default]
    None,
    /// Wrap to the first waypoint and keep flying (patrol loops).
    Restart,
}

/// Movement state for a single agent.
///
/// An agent is either **idle** (hovering at `position`) or flying the
/// current mission's waypoints in order.  Starting a new mission replaces
/// the old one immediately, wherever the agent happens to be.
#[derive(Clone, Debug)]
pub struct MissionState {
    /// Current position, updated by [`advance`](Self::advance).
    pub position: Point3,
    speed: f64,
    /// A waypoint closer than this counts as reached.
    tolerance: f64,
    waypoints: Vec<Point3>,
    next_index: usize,
    loop_mode: LoopMode,
    idle: bool,
}

impl MissionState {
    pub fn new(start: Point3, speed: f64, tolerance: f64) -> Self {
        Self {
            position: start,
            speed,
            tolerance: tolerance.max(1e-9),
            waypoints: Vec::new(),
            next_index: 0,
            loop_mode: LoopMode::None,
            idle: true,
        }
    }

    /// Replace the current mission.  An empty waypoint list leaves the agent
    /// idle where it is.
    pub fn start_mission(&mut self, waypoints: Vec<Point3>, loop_mode: LoopMode) {
        self.waypoints = waypoints;
        self.next_index = 0;
        self.loop_mode = loop_mode;
        self.idle = self.waypoints.is_empty();
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.idle
    }

    /// The waypoint currently being flown to, if any.
    pub fn current_waypoint(&self) -> Option<Point3> {
        if self.idle {
            None
        } else {
            self.waypoints.get(self.next_index).copied()
        }
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Advance the mission by `dt` seconds of flight.
    ///
    /// The distance budget `speed * dt` may cross several waypoints in one
    /// call.  A looping mission never goes idle; a one-shot mission goes
    /// idle exactly on its last waypoint.
    pub fn advance(&mut self, dt: f64) {
        if self.idle {
            return;
        }
        let mut budget = self.speed * dt;
        // A full lap that consumes no budget means every waypoint is within
        // tolerance of the position; bail out instead of spinning.
        let mut dry_hops = 0usize;

        while budget > 0.0 && !self.idle {
            let Some(target) = self.waypoints.get(self.next_index).copied() else {
                self.idle = true;
                break;
            };
            let dist = self.position.distance(target);

            if dist <= self.tolerance {
                self.step_waypoint();
                dry_hops += 1;
                if dry_hops > self.waypoints.len() {
                    break;
                }
                continue;
            }
            dry_hops = 0;

            if dist <= budget {
                self.position = target;
                budget -= dist;
                self.step_waypoint();
            } else {
                self.position = self.position.lerp(target, budget / dist);
                budget = 0.0;
            }
        }
    }

    fn step_waypoint(&mut self) {
        self.next_index += 1;
        if self.next_index >= self.waypoints.len() {
            match self.loop_mode {
                LoopMode::Restart => self.next_index = 0,
                LoopMode::None => self.idle = true,
            }
        }
    }
}
