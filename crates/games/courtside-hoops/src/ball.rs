use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use courtside_core::math::Vec3;

use crate::config::HoopsConfig;
use crate::court::CourtBounds;

/// Player-driven movement direction on the court. Forward is toward -Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    Left,
    Right,
    Forward,
    Backward,
}

impl MoveDirection {
    fn unit(self) -> Vec3 {
        match self {
            MoveDirection::Left => Vec3::new(-1.0, 0.0, 0.0),
            MoveDirection::Right => Vec3::new(1.0, 0.0, 0.0),
            MoveDirection::Forward => Vec3::new(0.0, 0.0, -1.0),
            MoveDirection::Backward => Vec3::new(0.0, 0.0, 1.0),
        }
    }
}

/// Serializable view of the ball for the presentation pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BallSnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub rotation: Vec3,
    pub bounce_count: u32,
    pub is_settling: bool,
    pub is_on_ground: bool,
    pub is_in_flight: bool,
    pub is_moving: bool,
}

/// The basketball: a passive state holder.
///
/// The integrator and the shot flow decide what happens to it; the ball only
/// stores kinematic state, recomputes its flags and keeps bounce bookkeeping.
#[derive(Debug, Clone)]
pub struct Ball {
    position: Vec3,
    velocity: Vec3,
    angular_velocity: Vec3,
    rotation: Vec3,

    bounce_count: u32,
    last_bounce_velocity: f32,
    settling: bool,
    last_contact_time: f32,

    on_ground: bool,
    in_flight: bool,
    moving: bool,

    radius: f32,
    initial_position: Vec3,
    ground_level: f32,
    ground_tolerance: f32,
    min_velocity: f32,
    in_flight_vertical_speed: f32,
    move_speed: f32,
    rotation_speed_multiplier: f32,
    spin_damping: f32,
    bounds: CourtBounds,
    spin_rng: StdRng,
}

impl Ball {
    pub fn new(config: &HoopsConfig, bounds: CourtBounds) -> Self {
        let b = &config.ball;
        let mut ball = Self {
            position: b.initial_position,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            bounce_count: 0,
            last_bounce_velocity: 0.0,
            settling: false,
            last_contact_time: 0.0,
            on_ground: false,
            in_flight: false,
            moving: false,
            radius: b.radius,
            initial_position: b.initial_position,
            ground_level: config.rest_height(),
            ground_tolerance: b.ground_tolerance,
            min_velocity: b.min_velocity,
            in_flight_vertical_speed: b.in_flight_vertical_speed,
            move_speed: b.move_speed,
            rotation_speed_multiplier: b.rotation_speed_multiplier,
            spin_damping: b.spin_damping,
            bounds,
            spin_rng: StdRng::seed_from_u64(b.spin_seed),
        };
        ball.refresh_flags();
        ball
    }

    // ---- kinematics ----

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Replace the velocity and mark the ball as in flight until the next
    /// flag refresh.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
        self.in_flight = true;
    }

    pub fn add_velocity(&mut self, delta: Vec3) {
        self.velocity += delta;
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Accumulated cosmetic orientation (Euler angles, radians).
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn integrate_position(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// Reflect velocity about `normal`, scale by `damping`, add a random spin
    /// kick and stamp the contact time.
    pub fn bounce(&mut self, normal: Vec3, damping: f32, now: f32) {
        self.velocity = self.velocity.reflect(normal) * damping;
        let kick = Vec3::new(
            self.spin_rng.random_range(-1.0f32..1.0),
            self.spin_rng.random_range(-1.0f32..1.0),
            self.spin_rng.random_range(-1.0f32..1.0),
        );
        self.angular_velocity += kick;
        self.last_contact_time = now;
    }

    pub fn stop(&mut self) {
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.in_flight = false;
    }

    /// Back to the spawn point, at rest, with no bounce history.
    pub fn reset(&mut self) {
        self.position = self.initial_position;
        self.stop();
        self.rotation = Vec3::ZERO;
        self.bounce_count = 0;
        self.last_bounce_velocity = 0.0;
        self.settling = false;
        self.refresh_flags();
    }

    /// Slide along the court. Only works while the ball is on the ground;
    /// the result is clamped to the court bounds.
    pub fn move_ball(&mut self, direction: MoveDirection, dt: f32) {
        if !self.on_ground {
            return;
        }
        let movement = direction.unit() * self.move_speed;
        self.position = self.bounds.clamp(self.position + movement * dt);
        self.add_rolling_rotation(movement, dt);
    }

    fn add_rolling_rotation(&mut self, movement: Vec3, dt: f32) {
        let amount = movement.length() * self.rotation_speed_multiplier * dt;
        if amount > 0.0 {
            let axis = Vec3::new(-movement.z, 0.0, movement.x).normalize();
            self.angular_velocity += axis * amount;
        }
    }

    /// Cosmetic spin: roll with the velocity, then damp.
    pub fn update_rotation(&mut self, dt: f32) {
        let speed = self.speed();
        if speed >= self.min_velocity {
            let axis = Vec3::new(-self.velocity.z, 0.0, self.velocity.x).normalize();
            self.angular_velocity += axis * (speed * self.rotation_speed_multiplier * dt);
        }
        self.rotation += self.angular_velocity * dt;
        self.angular_velocity = self.angular_velocity * self.spin_damping.powf(dt * 60.0);
    }

    // ---- flags ----

    /// Recompute on-ground / in-flight / moving from position and velocity.
    pub fn refresh_flags(&mut self) {
        self.moving = self.speed() > self.min_velocity;
        self.on_ground = self.position.y <= self.ground_level + self.ground_tolerance;
        self.in_flight = !self.on_ground || self.velocity.y.abs() > self.in_flight_vertical_speed;
    }

    pub fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    // ---- bounce bookkeeping ----

    pub fn bounce_count(&self) -> u32 {
        self.bounce_count
    }

    pub fn increment_bounce_count(&mut self) {
        self.bounce_count += 1;
    }

    /// Clears the count and the settling flag.
    pub fn reset_bounce_count(&mut self) {
        self.bounce_count = 0;
        self.settling = false;
    }

    pub fn is_settling(&self) -> bool {
        self.settling
    }

    pub fn set_settling(&mut self, settling: bool) {
        self.settling = settling;
    }

    pub fn last_bounce_velocity(&self) -> f32 {
        self.last_bounce_velocity
    }

    pub fn set_last_bounce_velocity(&mut self, v: f32) {
        self.last_bounce_velocity = v;
    }

    pub fn last_contact_time(&self) -> f32 {
        self.last_contact_time
    }

    pub fn mark_contact(&mut self, now: f32) {
        self.last_contact_time = now;
    }

    pub fn time_since_contact(&self, now: f32) -> f32 {
        now - self.last_contact_time
    }

    pub fn snapshot(&self) -> BallSnapshot {
        BallSnapshot {
            position: self.position,
            velocity: self.velocity,
            angular_velocity: self.angular_velocity,
            rotation: self.rotation,
            bounce_count: self.bounce_count,
            is_settling: self.settling,
            is_on_ground: self.on_ground,
            is_in_flight: self.in_flight,
            is_moving: self.moving,
        }
    }
}
