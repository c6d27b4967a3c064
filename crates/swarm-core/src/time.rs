//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter.  The
//! mapping to simulated seconds is held in `SimClock`:
//!
//!   sim_time = tick * tick_duration_secs
//!
//! Using an integer tick as the canonical time unit keeps the event queue
//! exact (no floating-point drift in ordering) while still letting the
//! protocols speak fractional seconds.  The default tick duration is 0.1 s;
//! every protocol period in this system (1 s timers, 0.5 s satellite
//! maintenance, 0.1 s assignment cooldown, 1.2 s encounter gap) is an exact
//! multiple of it.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
///
/// Stored as `u64` to avoid overflow: at the default 0.1 s resolution a u64
/// lasts ~58 billion years of simulated time.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and fractional simulated seconds.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// How many simulated seconds one tick represents.  Default: 0.1.
    pub tick_duration_secs: f64,
    /// The current tick — advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_duration_secs: f64) -> Self {
        Self { tick_duration_secs, current_tick: Tick::ZERO }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Current simulated time in seconds.
    #[inline]
    pub fn now_secs(&self) -> f64 {
        self.secs_at(self.current_tick)
    }

    /// Simulated time in seconds at `tick`.
    #[inline]
    pub fn secs_at(&self, tick: Tick) -> f64 {
        tick.0 as f64 * self.tick_duration_secs
    }

    /// First tick at or after the simulated time `secs`.
    ///
    /// A 1e-9 guard absorbs float noise so that "now + 1.0 s" lands exactly
    /// ten ticks ahead at the default resolution instead of eleven.
    #[inline]
    pub fn tick_at(&self, secs: f64) -> Tick {
        if secs <= 0.0 {
            return Tick::ZERO;
        }
        Tick((secs / self.tick_duration_secs - 1e-9).ceil() as u64)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (t={:.2}s)", self.current_tick, self.now_secs())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Engine-level simulation configuration: timing and the master seed.
///
/// Domain parameters (fleet sizes, speeds, radii, policy) live in
/// [`FleetConfig`][crate::FleetConfig].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Seconds per tick.  Must evenly divide the protocol periods; the
    /// default 0.1 s does.
    pub tick_duration_secs: f64,

    /// Total simulated seconds to run.
    pub duration_secs: f64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_duration_secs: 0.1,
            duration_secs:      600.0,
            seed:               42,
        }
    }
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        self.make_clock().tick_at(self.duration_secs)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_duration_secs)
    }
}
