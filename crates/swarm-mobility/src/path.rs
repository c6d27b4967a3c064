//! Pure path geometry: prediction, intercept, formation slots, sweeps.
//!
//! Everything here is a function of its arguments — no clocks, no state —
//! so rendezvous math is unit-testable against fixed patrol fixtures.

use swarm_core::Point3;

/// V-formation opening angle.
const FORMATION_ANGLE_RAD: f64 = 150.0 * std::f64::consts::PI / 180.0;
/// Metres between successive depth steps of the V.
const FORMATION_SPACING_M: f64 = 1.0;
/// Lookahead used to estimate the leader's heading by forward difference.
const HEADING_LOOKAHEAD_SECS: f64 = 0.1;

/// Position along a waypoint path at time `t` (seconds from path start),
/// assuming constant `speed` and piecewise-linear motion.
///
/// Segment durations are floored at 1e-9 s so zero-length segments cannot
/// divide by zero.  `t <= 0` returns the first waypoint, `t >=` total
/// duration the last.
pub fn predict_along(waypoints: &[Point3], speed: f64, t: f64) -> Point3 {
    let Some(&first) = waypoints.first() else {
        return Point3::default();
    };
    if waypoints.len() == 1 || t <= 0.0 {
        return first;
    }

    let last = waypoints[waypoints.len() - 1];
    let durations: Vec<f64> = waypoints
        .windows(2)
        .map(|seg| (seg[0].distance(seg[1]) / speed).max(1e-9))
        .collect();
    let total: f64 = durations.iter().sum();
    if t >= total {
        return last;
    }

    let mut elapsed = 0.0;
    for (seg, dur) in waypoints.windows(2).zip(&durations) {
        if elapsed + dur >= t {
            let frac = (t - elapsed) / dur;
            return seg[0].lerp(seg[1], frac);
        }
        elapsed += dur;
    }
    last
}

/// Leader heading (radians, ground plane) at time `t`, estimated by a short
/// forward difference along the predicted path.
pub fn heading_along(waypoints: &[Point3], speed: f64, t: f64) -> f64 {
    let now = predict_along(waypoints, speed, t);
    let ahead = predict_along(waypoints, speed, t + HEADING_LOOKAHEAD_SECS);
    (ahead.y - now.y).atan2(ahead.x - now.x)
}

/// Fixed-point intercept: where a chaser at `from` flying `chaser_speed`
/// meets a leader flying `waypoints` at `leader_speed`, starting the chase
/// at time `now`.
///
/// Five iterations of Δt = dist(from, predicted(now + Δt)) / chaser_speed,
/// seeded with the leader's current position.
pub fn intercept_point(
    from: Point3,
    chaser_speed: f64,
    waypoints: &[Point3],
    leader_speed: f64,
    now: f64,
) -> Point3 {
    let mut predicted = predict_along(waypoints, leader_speed, now);
    let mut dt = from.distance(predicted) / chaser_speed;
    for _ in 0..5 {
        predicted = predict_along(waypoints, leader_speed, now + dt);
        dt = from.distance(predicted) / chaser_speed;
    }
    predicted
}

/// Ground-plane offset of formation slot `rank` relative to a leader flying
/// with `heading`.
///
/// Even ranks take the left wing, odd ranks the right; depth grows every
/// two ranks (1, 1, 2, 2, 3, …).
pub fn formation_offset(rank: u32, heading: f64) -> (f64, f64) {
    let side = if rank % 2 == 0 { -1.0 } else { 1.0 };
    let depth = (rank / 2 + 1) as f64;
    let angle = heading + side * FORMATION_ANGLE_RAD;
    (
        FORMATION_SPACING_M * depth * angle.cos(),
        FORMATION_SPACING_M * depth * angle.sin(),
    )
}

/// The full satellite target: intercept the leader's predicted position and
/// hold the formation slot for `rank`, at the chaser's own `altitude`.
pub fn rendezvous_target(
    from: Point3,
    chaser_speed: f64,
    waypoints: &[Point3],
    leader_speed: f64,
    now: f64,
    rank: u32,
    altitude: f64,
) -> Point3 {
    let predicted = intercept_point(from, chaser_speed, waypoints, leader_speed, now);
    let heading = heading_along(waypoints, leader_speed, now);
    let (dx, dy) = formation_offset(rank, heading);
    Point3::new(predicted.x + dx, predicted.y + dy, altitude)
}

/// S-shaped (boustrophedon) sweep of the rectangle `[x0, x1] × [y0, y1]` at
/// `altitude`, with rows `row_spacing` apart.  Rows alternate direction so
/// the path is flyable end to end; used for leader patrol bands.
pub fn lawnmower(
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
    row_spacing: f64,
    altitude: f64,
) -> Vec<Point3> {
    let spacing = row_spacing.max(1e-6);
    let mut waypoints = Vec::new();
    let mut y = y0 + spacing / 2.0;
    let mut left_to_right = true;

    while y < y1 {
        let (xa, xb) = if left_to_right { (x0, x1) } else { (x1, x0) };
        waypoints.push(Point3::new(xa, y, altitude));
        waypoints.push(Point3::new(xb, y, altitude));
        left_to_right = !left_to_right;
        y += spacing;
    }

    if waypoints.is_empty() {
        // Degenerate band thinner than one row: patrol its midline.
        let mid = (y0 + y1) / 2.0;
        waypoints.push(Point3::new(x0, mid, altitude));
        waypoints.push(Point3::new(x1, mid, altitude));
    }
    waypoints
}
