//! Shot solver and ballistic previews.
//!
//! All functions are pure. Gravity is passed in as the signed vertical
//! acceleration (negative is down).

use courtside_core::math::Vec3;

use crate::config::{HoopsConfig, ShotConfig};
use crate::error::TrajectoryError;

/// Sample spacing for [`trajectory_points`].
pub const PREVIEW_STEP_SECS: f32 = 0.1;
/// Step and iteration cap for [`predict_landing`].
pub const LANDING_STEP_SECS: f32 = 0.016;
pub const LANDING_MAX_ITERATIONS: usize = 1000;

/// Launch velocity that peaks `arc_height` above the start and comes down
/// on `target`.
///
/// Time up is the time to fall from the apex; time down is the time to fall
/// from the apex to the target's height difference. Horizontal velocity is
/// constant over the sum. A zero horizontal distance yields a vertical shot.
pub fn trajectory_velocity(
    start: Vec3,
    target: Vec3,
    arc_height: f32,
    gravity: f32,
) -> Result<Vec3, TrajectoryError> {
    if !start.is_finite() || !target.is_finite() || !arc_height.is_finite() || !gravity.is_finite()
    {
        return Err(TrajectoryError::NonFiniteInput);
    }
    if arc_height <= 0.0 {
        return Err(TrajectoryError::NonPositiveArc(arc_height));
    }

    let g = gravity.abs();
    let delta = target - start;
    let time_up = (2.0 * arc_height / g).sqrt();
    let time_down = (2.0 * (arc_height + delta.y.abs()) / g).sqrt();
    let total = time_up + time_down;
    if !total.is_finite() || total <= 0.0 {
        return Err(TrajectoryError::InvalidFlightTime(total));
    }

    Ok(Vec3::new(
        delta.x / total,
        (2.0 * g * arc_height).sqrt(),
        delta.z / total,
    ))
}

/// Arc height for a power percentage, interpolated between the configured
/// minimum and maximum.
pub fn arc_height_for_power(power: f32, shot: &ShotConfig) -> f32 {
    shot.arc_height_min + (power / 100.0) * (shot.arc_height_max - shot.arc_height_min)
}

/// Launch velocity for a shot at `rim` with the given power.
///
/// Power is clamped to the configured range. The aim point sits slightly
/// above the rim center, and the solved velocity is scaled by
/// `power_to_velocity_scale * power / 100`.
pub fn shot_velocity(
    start: Vec3,
    rim: Vec3,
    power: f32,
    config: &HoopsConfig,
) -> Result<Vec3, TrajectoryError> {
    if !power.is_finite() {
        return Err(TrajectoryError::NonFiniteInput);
    }
    let shot = &config.shot;
    let power = power.clamp(shot.power_min, shot.power_max);
    let target = rim + Vec3::new(0.0, shot.target_height_offset, 0.0);
    let arc = arc_height_for_power(power, shot);
    let velocity = trajectory_velocity(start, target, arc, config.physics.gravity)?;
    Ok(velocity * (shot.power_to_velocity_scale * power / 100.0))
}

/// Elevation angle (radians) from `start` toward the apex of a shot at `target`.
pub fn shot_angle(start: Vec3, target: Vec3, power: f32, shot: &ShotConfig) -> f32 {
    let horizontal = start.horizontal_distance(target);
    let rise = target.y - start.y;
    (rise + arc_height_for_power(power, shot)).atan2(horizontal)
}

/// Sampled ballistic path, one point every [`PREVIEW_STEP_SECS`], up to
/// `num_points` long. Stops once a sample reaches `ground_y`.
pub fn trajectory_points(
    start: Vec3,
    velocity: Vec3,
    num_points: usize,
    gravity: f32,
    ground_y: f32,
) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(num_points);
    let mut position = start;
    let mut velocity = velocity;
    for _ in 0..num_points {
        points.push(position);
        position += velocity * PREVIEW_STEP_SECS;
        velocity.y += gravity * PREVIEW_STEP_SECS;
        if position.y <= ground_y {
            break;
        }
    }
    points
}

/// Where a ballistic path first drops to `ground_y`. Gives up after
/// [`LANDING_MAX_ITERATIONS`] steps and returns the last position.
pub fn predict_landing(start: Vec3, velocity: Vec3, gravity: f32, ground_y: f32) -> Vec3 {
    let mut position = start;
    let mut velocity = velocity;
    let mut iterations = 0;
    while position.y > ground_y && iterations < LANDING_MAX_ITERATIONS {
        position += velocity * LANDING_STEP_SECS;
        velocity.y += gravity * LANDING_STEP_SECS;
        iterations += 1;
    }
    position
}
