use serde::{Deserialize, Serialize};

use courtside_core::math::Vec3;

use crate::ball::Ball;
use crate::collision::{Contact, sphere_box, sphere_cylinder};
use crate::config::HoopsConfig;
use crate::court::{Court, ObstacleKind, Shape};

/// Per-feature switches for the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegratorSettings {
    pub gravity: bool,
    pub air_resistance: bool,
    pub rolling_friction: bool,
    pub bouncing: bool,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            gravity: true,
            air_resistance: true,
            rolling_friction: true,
            bouncing: true,
        }
    }
}

/// What the ball hit during the boundary pass of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoundaryHit {
    Obstacle { name: String, kind: ObstacleKind },
    CourtEdge,
}

/// Integrator counters exposed to the presentation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsStats {
    pub ground_collisions: u32,
    pub last_ground_collision: f32,
    pub gravity: f32,
    pub settings: IntegratorSettings,
}

/// Bounce model parameters, copied out of the config once.
#[derive(Debug, Clone, Copy)]
struct BounceModel {
    restitution: f32,
    energy_loss: f32,
    max_bounces: u32,
    min_bounce_height: f32,
    settle_threshold: f32,
    high_energy_impact: f32,
    rolling_friction: f32,
}

/// Fixed-step integrator for the ball.
///
/// One [`Integrator::step`] applies forces, moves the ball, resolves ground
/// contact and at most one static obstacle, enforces constraints and
/// refreshes the ball's flags.
#[derive(Debug, Clone)]
pub struct Integrator {
    gravity: f32,
    ground_y: f32,
    max_speed: f32,
    air_resistance: f32,
    rolling_friction: f32,
    rolling_stop_speed: f32,
    settle_speed: f32,
    obstacle_damping: f32,
    bounce: BounceModel,
    settings: IntegratorSettings,
    ground_collisions: u32,
    last_ground_collision: f32,
    last_hit: Option<BoundaryHit>,
}

impl Integrator {
    pub fn new(config: &HoopsConfig) -> Self {
        let b = &config.ball;
        Self {
            gravity: config.physics.gravity,
            ground_y: config.physics.ground_y,
            max_speed: config.physics.max_speed,
            air_resistance: b.air_resistance,
            rolling_friction: b.rolling_friction,
            rolling_stop_speed: b.rolling_stop_speed,
            settle_speed: b.settle_speed,
            obstacle_damping: b.bounce_damping,
            bounce: BounceModel {
                restitution: b.restitution,
                energy_loss: b.bounce_energy_loss,
                max_bounces: b.max_bounces,
                min_bounce_height: b.min_bounce_height,
                settle_threshold: b.settle_threshold,
                high_energy_impact: b.high_energy_impact,
                rolling_friction: b.rolling_friction,
            },
            settings: IntegratorSettings::default(),
            ground_collisions: 0,
            last_ground_collision: 0.0,
            last_hit: None,
        }
    }

    /// Advance the ball by one fixed step. `now` is the simulation clock.
    pub fn step(&mut self, ball: &mut Ball, court: &Court, dt: f32, now: f32) {
        self.last_hit = None;

        let on_ground = ball.is_on_ground();
        if on_ground && ball.speed() < self.settle_speed && ball.is_settling() {
            ball.set_velocity(Vec3::ZERO);
            ball.refresh_flags();
            ball.update_rotation(dt);
            return;
        }

        let velocity = self.apply_forces(ball, on_ground, dt);
        ball.set_velocity(velocity);
        ball.integrate_position(dt);

        self.resolve_ground(ball, now);
        self.resolve_boundaries(ball, court);
        self.apply_constraints(ball);

        ball.refresh_flags();
        ball.update_rotation(dt);
    }

    fn apply_forces(&self, ball: &Ball, on_ground: bool, dt: f32) -> Vec3 {
        let mut v = ball.velocity();

        // Gravity, unless resting on the court.
        if self.settings.gravity && (!on_ground || v.y > 0.0) {
            v.y += self.gravity * dt;
        }

        if self.settings.air_resistance && ball.is_in_flight() {
            v = v * self.air_resistance;
        }

        if self.settings.rolling_friction && on_ground {
            if v.horizontal_length() < self.rolling_stop_speed {
                v.x = 0.0;
                v.z = 0.0;
            } else {
                v.x *= self.rolling_friction;
                v.z *= self.rolling_friction;
            }
        }

        v
    }

    fn resolve_ground(&mut self, ball: &mut Ball, now: f32) {
        let radius = ball.radius();
        let position = ball.position();
        if position.y - radius > self.ground_y {
            return;
        }

        ball.set_position(position.with_y(self.ground_y + radius));
        let velocity = if self.settings.bouncing {
            calculate_realistic_bounce(ball, &self.bounce)
        } else {
            ball.velocity().with_y(0.0)
        };
        ball.set_velocity(velocity);
        ball.mark_contact(now);
        self.last_ground_collision = now;
        self.ground_collisions += 1;
    }

    /// Test obstacles in priority order; the first contact wins. The court's
    /// Z edges are only considered when no obstacle was hit.
    fn resolve_boundaries(&mut self, ball: &mut Ball, court: &Court) {
        let position = ball.position();
        let velocity = ball.velocity();
        let radius = ball.radius();

        for collider in court.colliders() {
            let contact = match &collider.shape {
                Shape::Box(aabb) => {
                    sphere_box(position, velocity, radius, aabb, self.obstacle_damping)
                },
                Shape::Cylinder(cyl) => {
                    sphere_cylinder(position, velocity, radius, cyl, self.obstacle_damping)
                },
            };
            if let Some(Contact { position, velocity }) = contact {
                tracing::debug!(
                    obstacle = %collider.name,
                    kind = ?collider.kind,
                    "Ball hit obstacle"
                );
                ball.set_position(position);
                ball.set_velocity(velocity);
                self.last_hit = Some(BoundaryHit::Obstacle {
                    name: collider.name.clone(),
                    kind: collider.kind,
                });
                return;
            }
        }

        let bounds = &court.bounds;
        let mut corrected_position = position;
        let mut corrected_velocity = velocity;
        if position.z - radius < bounds.min_z {
            corrected_position.z = bounds.min_z + radius;
            corrected_velocity.z = velocity.z.abs() * self.obstacle_damping;
        } else if position.z + radius > bounds.max_z {
            corrected_position.z = bounds.max_z - radius;
            corrected_velocity.z = -velocity.z.abs() * self.obstacle_damping;
        } else {
            return;
        }
        ball.set_position(corrected_position);
        ball.set_velocity(corrected_velocity);
        self.last_hit = Some(BoundaryHit::CourtEdge);
    }

    fn apply_constraints(&self, ball: &mut Ball) {
        let rest = self.ground_y + ball.radius();
        let position = ball.position();
        if position.y < rest {
            ball.set_position(position.with_y(rest));
        }

        let velocity = ball.velocity();
        if !velocity.is_finite() {
            tracing::warn!(?velocity, "Non-finite ball velocity, stopping ball");
            ball.set_velocity(Vec3::ZERO);
            return;
        }
        let speed = velocity.length();
        if speed > self.max_speed {
            tracing::warn!(speed, max = self.max_speed, "Ball velocity limited");
            ball.set_velocity(velocity.normalize() * self.max_speed);
        }
    }

    pub fn add_force(&self, ball: &mut Ball, force: Vec3) {
        ball.add_velocity(force);
    }

    pub fn settings(&self) -> IntegratorSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: IntegratorSettings) {
        self.settings = settings;
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    pub fn ground_collisions(&self) -> u32 {
        self.ground_collisions
    }

    /// The obstacle or court edge resolved during the last step, if any.
    pub fn last_hit(&self) -> Option<&BoundaryHit> {
        self.last_hit.as_ref()
    }

    pub fn stats(&self) -> PhysicsStats {
        PhysicsStats {
            ground_collisions: self.ground_collisions,
            last_ground_collision: self.last_ground_collision,
            gravity: self.gravity,
            settings: self.settings,
        }
    }

    pub fn reset(&mut self) {
        self.ground_collisions = 0;
        self.last_ground_collision = 0.0;
        self.last_hit = None;
        self.settings = IntegratorSettings::default();
    }
}

/// Ground bounce with restitution, per-bounce energy loss and settling.
///
/// A hard impact always starts a fresh sequence, even if the ball had
/// already been marked as settling.
fn calculate_realistic_bounce(ball: &mut Ball, model: &BounceModel) -> Vec3 {
    let velocity = ball.velocity();
    let impact = velocity.y.abs();
    let rolled_x = velocity.x * model.rolling_friction;
    let rolled_z = velocity.z * model.rolling_friction;

    if impact > model.high_energy_impact {
        ball.reset_bounce_count();
        let vy = impact * model.restitution;
        ball.increment_bounce_count();
        ball.set_last_bounce_velocity(vy);
        return Vec3::new(rolled_x, vy, rolled_z);
    }

    let count = ball.bounce_count();
    if count >= model.max_bounces || impact < model.min_bounce_height || ball.is_settling() {
        ball.set_settling(true);
        return Vec3::new(rolled_x, 0.0, rolled_z);
    }

    let vy = impact * model.restitution * model.energy_loss.powi(count as i32);
    ball.increment_bounce_count();
    ball.set_last_bounce_velocity(vy);
    // Look-ahead: this bounce's output is compared, not the next impact.
    if vy < model.settle_threshold {
        ball.set_settling(true);
    }
    Vec3::new(rolled_x, vy, rolled_z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::court::standard_court;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> (Integrator, Ball, Court, HoopsConfig) {
        let cfg = HoopsConfig::default();
        let court = standard_court(&cfg);
        let ball = Ball::new(&cfg, court.bounds);
        (Integrator::new(&cfg), ball, court, cfg)
    }

    #[test]
    fn settled_ball_freezes() {
        let (mut physics, mut ball, court, _) = setup();
        ball.set_velocity(Vec3::new(0.03, 0.0, 0.02));
        ball.refresh_flags();
        ball.set_settling(true);
        let before = ball.position();

        physics.step(&mut ball, &court, DT, 0.0);

        assert_eq!(ball.velocity(), Vec3::ZERO);
        assert!(ball.position().distance(before) < 1e-6);
        assert!(!ball.is_in_flight());
    }

    #[test]
    fn gravity_pulls_airborne_ball() {
        let (mut physics, mut ball, court, _) = setup();
        ball.set_position(Vec3::new(0.0, 5.0, 0.0));
        ball.refresh_flags();
        physics.step(&mut ball, &court, DT, 0.0);
        // (0 - 25/60) * 0.99
        assert!((ball.velocity().y + 25.0 / 60.0 * 0.99).abs() < 1e-5);
        assert!(ball.position().y < 5.0);
    }

    #[test]
    fn resting_ball_gets_no_gravity() {
        let (mut physics, mut ball, court, cfg) = setup();
        physics.step(&mut ball, &court, DT, 0.0);
        assert_eq!(ball.velocity().y, 0.0);
        assert!(ball.position().y >= cfg.rest_height() - 1e-6);
    }

    #[test]
    fn rolling_friction_slows_then_stops() {
        let (mut physics, mut ball, court, _) = setup();
        ball.set_velocity(Vec3::new(2.0, 0.0, 0.0));
        ball.refresh_flags();
        physics.step(&mut ball, &court, DT, 0.0);
        let vx = ball.velocity().x;
        assert!(vx < 2.0 && vx > 1.0);

        for _ in 0..200 {
            physics.step(&mut ball, &court, DT, 0.0);
        }
        assert_eq!(ball.velocity().x, 0.0);
        assert!(!ball.is_moving());
    }

    #[test]
    fn ground_impact_snaps_and_bounces() {
        let (mut physics, mut ball, court, cfg) = setup();
        ball.set_position(Vec3::new(0.0, 0.7, 0.0));
        ball.set_velocity(Vec3::new(0.0, -6.0, 0.0));
        ball.refresh_flags();

        physics.step(&mut ball, &court, DT, 1.0);

        assert!((ball.position().y - cfg.rest_height()).abs() < 1e-5);
        assert!(ball.velocity().y > 0.0);
        assert_eq!(ball.bounce_count(), 1);
        assert_eq!(physics.ground_collisions(), 1);
        assert_eq!(ball.last_contact_time(), 1.0);
    }

    #[test]
    fn high_energy_impact_restarts_sequence() {
        let (_, mut ball, _, cfg) = setup();
        let physics = Integrator::new(&cfg);
        for _ in 0..5 {
            ball.increment_bounce_count();
        }
        ball.set_settling(true);
        ball.set_velocity(Vec3::new(1.0, -10.0, 0.0));

        let v = calculate_realistic_bounce(&mut ball, &physics.bounce);

        assert_eq!(ball.bounce_count(), 1);
        assert!(!ball.is_settling());
        assert!((v.y - 7.0).abs() < 1e-5);
        assert!((v.x - 0.92).abs() < 1e-6);
    }

    #[test]
    fn max_bounces_settles() {
        let (physics, mut ball, _, _) = setup();
        for _ in 0..8 {
            ball.increment_bounce_count();
        }
        ball.set_velocity(Vec3::new(0.0, -3.0, 0.0));
        let v = calculate_realistic_bounce(&mut ball, &physics.bounce);
        assert_eq!(v.y, 0.0);
        assert!(ball.is_settling());
        assert_eq!(ball.bounce_count(), 8);
    }

    #[test]
    fn energy_loss_compounds_with_count() {
        let (physics, mut ball, _, _) = setup();
        ball.increment_bounce_count();
        ball.increment_bounce_count();
        ball.set_velocity(Vec3::new(0.0, -4.0, 0.0));
        let v = calculate_realistic_bounce(&mut ball, &physics.bounce);
        assert!((v.y - 4.0 * 0.7 * 0.95 * 0.95).abs() < 1e-5);
        assert_eq!(ball.bounce_count(), 3);
    }

    #[test]
    fn weak_bounce_marks_settling_early() {
        let (physics, mut ball, _, _) = setup();
        // Impact 0.06 clears the 0.05 floor; the 0.042 rebound clears 0.02.
        ball.set_velocity(Vec3::new(0.0, -0.06, 0.0));
        let v = calculate_realistic_bounce(&mut ball, &physics.bounce);
        assert!(v.y > 0.0);
        assert!(!ball.is_settling());

        ball.set_velocity(Vec3::new(0.0, -0.0001, 0.0));
        ball.reset_bounce_count();
        let v = calculate_realistic_bounce(&mut ball, &physics.bounce);
        assert_eq!(v.y, 0.0);
        assert!(ball.is_settling());
    }

    #[test]
    fn obstacle_priority_backboard_first() {
        let (mut physics, mut ball, court, _) = setup();
        // Flying toward the right backboard face.
        ball.set_position(Vec3::new(13.3, 5.0, 0.0));
        ball.set_velocity(Vec3::new(10.0, 0.0, 0.0));
        ball.refresh_flags();
        physics.step(&mut ball, &court, DT, 0.0);
        assert!(ball.velocity().x < 0.0);
        assert_eq!(
            physics.last_hit(),
            Some(&BoundaryHit::Obstacle {
                name: "right-backboard".to_string(),
                kind: ObstacleKind::Backboard,
            })
        );
    }

    #[test]
    fn court_edge_bounces_z() {
        let (mut physics, mut ball, court, _) = setup();
        ball.set_position(Vec3::new(0.0, 3.0, 6.6));
        ball.set_velocity(Vec3::new(0.0, 0.0, 5.0));
        ball.refresh_flags();
        physics.step(&mut ball, &court, DT, 0.0);
        assert!(ball.velocity().z < 0.0);
        assert!((ball.position().z - 6.5).abs() < 1e-5);
        assert_eq!(physics.last_hit(), Some(&BoundaryHit::CourtEdge));
    }

    #[test]
    fn speed_is_capped() {
        let (mut physics, mut ball, court, _) = setup();
        ball.set_position(Vec3::new(0.0, 10.0, 0.0));
        ball.set_velocity(Vec3::new(200.0, 0.0, 0.0));
        ball.refresh_flags();
        physics.step(&mut ball, &court, DT, 0.0);
        assert!(ball.speed() <= 50.0 + 1e-3);
    }

    #[test]
    fn disabled_gravity_keeps_height() {
        let (mut physics, mut ball, court, _) = setup();
        physics.set_settings(IntegratorSettings {
            gravity: false,
            ..IntegratorSettings::default()
        });
        ball.set_position(Vec3::new(0.0, 5.0, 0.0));
        ball.refresh_flags();
        physics.step(&mut ball, &court, DT, 0.0);
        assert_eq!(ball.position().y, 5.0);
        physics.reset();
        assert!(physics.settings().gravity);
    }

    #[test]
    fn dropped_ball_comes_to_rest() {
        let (mut physics, mut ball, court, cfg) = setup();
        ball.set_position(Vec3::new(2.0, 6.0, 1.0));
        ball.set_velocity(Vec3::new(0.5, 0.0, -0.3));
        ball.refresh_flags();
        for i in 0..1200 {
            physics.step(&mut ball, &court, DT, i as f32 * DT);
        }
        assert!(!ball.is_moving());
        assert!(ball.is_on_ground());
        assert!((ball.position().y - cfg.rest_height()).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn ball_never_sinks_below_ground(
            x in -12.0f32..12.0,
            y in 0.65f32..12.0,
            z in -6.0f32..6.0,
            vx in -20.0f32..20.0,
            vy in -40.0f32..40.0,
            vz in -20.0f32..20.0,
        ) {
            let (mut physics, mut ball, court, cfg) = setup();
            ball.set_position(Vec3::new(x, y, z));
            ball.set_velocity(Vec3::new(vx, vy, vz));
            ball.refresh_flags();
            for i in 0..240 {
                physics.step(&mut ball, &court, DT, i as f32 * DT);
                prop_assert!(ball.position().y >= cfg.rest_height() - 1e-4);
                prop_assert!(ball.speed() <= cfg.physics.max_speed + 1e-3);
            }
        }

        #[test]
        fn bounce_count_only_grows_or_restarts(
            y in 1.0f32..15.0,
            vy in -30.0f32..5.0,
        ) {
            let (mut physics, mut ball, court, _) = setup();
            ball.set_position(Vec3::new(0.0, y, 0.0));
            ball.set_velocity(Vec3::new(0.0, vy, 0.0));
            ball.refresh_flags();
            let mut prev = ball.bounce_count();
            for i in 0..600 {
                physics.step(&mut ball, &court, DT, i as f32 * DT);
                let now = ball.bounce_count();
                prop_assert!(now >= prev || now == 1, "count went {prev} -> {now}");
                prev = now;
            }
        }
    }
}
