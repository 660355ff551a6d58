pub mod ball;
pub mod collision;
pub mod config;
pub mod court;
pub mod error;
pub mod input;
pub mod physics;
pub mod rim;
pub mod scoring;
pub mod state;
pub mod trajectory;

use serde::{Deserialize, Serialize};

use courtside_core::events::{GameEvent, TrackingEndReason};
use courtside_core::feedback::{Feedback, FeedbackQueue};
use courtside_core::game_trait::{
    FeedbackKind, FeedbackSink, HoopSide, RimProvider, Simulation,
};
use courtside_core::time::FixedTimestep;

use ball::{Ball, BallSnapshot, MoveDirection};
use config::HoopsConfig;
use court::{Court, load_court, standard_court};
use error::SetupError;
use input::{HoopsInput, PowerMeter};
use physics::{Integrator, PhysicsStats};
use rim::{RimInfo, ScoreDetector, Tracking};
use scoring::{CANNOT_SHOOT_MESSAGE, ScoreStats, Scoreboard};
use state::{GameState, Permissions, ShotRecord, ShotSinks, ShotStateMachine};

/// Read-only view of the whole simulation for the presentation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoopsSnapshot {
    pub clock: f32,
    pub ball: BallSnapshot,
    pub state: GameState,
    pub permissions: Permissions,
    pub shot: ShotRecord,
    pub tracking: Option<Tracking>,
    pub left_rim: RimInfo,
    pub right_rim: RimInfo,
    pub stats: ScoreStats,
    pub shooting_percentage: f32,
    pub power: f32,
    pub feedback: Vec<Feedback>,
    pub physics: PhysicsStats,
}

/// The basketball simulation.
///
/// Each fixed tick runs, in order: pending input, the shot state machine,
/// the integrator, then the rim detector. A make confirmed by the detector
/// is handed to the state machine within the same tick.
pub struct HoopsGame {
    config: HoopsConfig,
    court: Court,
    ball: Ball,
    integrator: Integrator,
    detector: ScoreDetector,
    machine: ShotStateMachine,
    scoreboard: Scoreboard,
    feedback: FeedbackQueue,
    timestep: FixedTimestep,
    power: PowerMeter,
    input: HoopsInput,
    clock: f32,
}

impl HoopsGame {
    pub fn new(config: HoopsConfig, court: Court) -> Result<Self, SetupError> {
        let radius = config.ball.radius;
        if radius <= 0.0 || !radius.is_finite() {
            return Err(SetupError::InvalidRadius {
                what: "ball",
                value: radius,
            });
        }
        let step = config.physics.time_step;
        if step <= 0.0 || !step.is_finite() {
            return Err(SetupError::InvalidTimestep(step));
        }

        let detector = ScoreDetector::new(&court, &config)?;
        Ok(Self {
            ball: Ball::new(&config, court.bounds),
            integrator: Integrator::new(&config),
            machine: ShotStateMachine::new(&config),
            scoreboard: Scoreboard::new(&config.scoring),
            feedback: FeedbackQueue::with_duration(config.scoring.feedback_duration_secs),
            timestep: FixedTimestep::new(step, config.physics.max_time_step),
            power: PowerMeter::new(&config.shot),
            input: HoopsInput::default(),
            clock: 0.0,
            detector,
            court,
            config,
        })
    }

    /// Standard court with the given tuning.
    pub fn with_config(config: HoopsConfig) -> Result<Self, SetupError> {
        let court = standard_court(&config);
        Self::new(config, court)
    }

    /// Config and court from their files, falling back to defaults.
    pub fn load() -> Result<Self, SetupError> {
        let config = HoopsConfig::load();
        let court = load_court(&config);
        tracing::info!(court = %court.name, "Loaded court");
        Self::new(config, court)
    }

    pub fn config(&self) -> &HoopsConfig {
        &self.config
    }

    pub fn court(&self) -> &Court {
        &self.court
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn ball_mut(&mut self) -> &mut Ball {
        &mut self.ball
    }

    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    pub fn integrator_mut(&mut self) -> &mut Integrator {
        &mut self.integrator
    }

    pub fn detector(&self) -> &ScoreDetector {
        &self.detector
    }

    pub fn state(&self) -> GameState {
        self.machine.state()
    }

    pub fn shot(&self) -> &ShotRecord {
        self.machine.shot()
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn feedback(&self) -> &FeedbackQueue {
        &self.feedback
    }

    pub fn power(&self) -> f32 {
        self.power.power()
    }

    pub fn set_power(&mut self, power: f32) {
        self.power.set(power);
    }

    /// Simulation time in seconds.
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Replace the held input. Presses (`shoot`, `reset`) act on the next tick only.
    pub fn set_input(&mut self, input: HoopsInput) {
        self.input = input;
    }

    /// Decode a MessagePack-encoded [`HoopsInput`]. Malformed data is ignored.
    pub fn apply_input_bytes(&mut self, data: &[u8]) {
        match rmp_serde::from_slice::<HoopsInput>(data) {
            Ok(input) => self.set_input(input),
            Err(e) => tracing::warn!("Ignoring malformed input: {e}"),
        }
    }

    /// Bank a frame delta and run every fixed step that is due.
    pub fn advance(&mut self, frame_dt: f32) -> Vec<GameEvent> {
        let steps = self.timestep.advance(frame_dt);
        let step = self.timestep.step();
        let mut events = Vec::new();
        for _ in 0..steps {
            events.extend(self.fixed_update(step));
        }
        events
    }

    /// Slide the ball along the court. Requires the ball on the ground and
    /// movement allowed by the current state.
    pub fn move_ball(&mut self, direction: MoveDirection, dt: f32) -> bool {
        if !self.ball.is_on_ground() || !self.machine.can_move() {
            return false;
        }
        self.ball.move_ball(direction, dt);
        true
    }

    /// Shoot with the current meter power.
    pub fn shoot(&mut self) -> Vec<GameEvent> {
        self.shoot_with_power(self.power.power())
    }

    pub fn shoot_with_power(&mut self, power: f32) -> Vec<GameEvent> {
        let mut sinks = ShotSinks {
            score: &mut self.scoreboard,
            feedback: &mut self.feedback,
        };
        if !self.ball.is_on_ground() {
            tracing::warn!("Cannot initiate shot: ball is not on the ground");
            sinks
                .feedback
                .show_feedback(CANNOT_SHOOT_MESSAGE, FeedbackKind::Failure);
            return vec![GameEvent::ShotRejected];
        }

        let started = self.machine.initiate_shot(
            power,
            &mut self.ball,
            &self.court.all_rim_positions(),
            self.clock,
            &mut sinks,
        );
        let shot = self.machine.shot();
        match shot.target {
            Some(target) if started => vec![GameEvent::ShotStarted {
                target,
                power: shot.power,
            }],
            _ => vec![GameEvent::ShotRejected],
        }
    }

    /// Put the ball back on its spawn point, if the current state allows it.
    /// Clears any open tracking window and restores the default power.
    pub fn reset_ball(&mut self) -> Vec<GameEvent> {
        let mut sinks = ShotSinks {
            score: &mut self.scoreboard,
            feedback: &mut self.feedback,
        };
        let mut events = self.machine.request_reset(&mut self.ball, &mut sinks);
        if events.is_empty() {
            return events;
        }
        if let Some(side) = self.detector.reset() {
            events.push(GameEvent::TrackingEnded {
                side,
                reason: TrackingEndReason::Cleared,
            });
        }
        self.power.reset();
        events
    }

    fn apply_input(&mut self, dt: f32) -> Vec<GameEvent> {
        let input = self.input;
        self.input.shoot = false;
        self.input.reset = false;

        self.power.update(&input, self.clock);
        for direction in input.directions() {
            self.move_ball(direction, dt);
        }

        let mut events = Vec::new();
        if input.reset {
            events.extend(self.reset_ball());
        }
        if input.shoot {
            events.extend(self.shoot());
        }
        events
    }

    pub fn snapshot(&self) -> HoopsSnapshot {
        let stats = self.scoreboard.stats();
        HoopsSnapshot {
            clock: self.clock,
            ball: self.ball.snapshot(),
            state: self.machine.state(),
            permissions: self.machine.permissions(),
            shot: *self.machine.shot(),
            tracking: self.detector.tracking().copied(),
            left_rim: self.detector.rim_info(HoopSide::Left),
            right_rim: self.detector.rim_info(HoopSide::Right),
            shooting_percentage: stats.percentage(),
            stats,
            power: self.power.power(),
            feedback: self.feedback.visible().to_vec(),
            physics: self.integrator.stats(),
        }
    }

    /// MessagePack-encoded [`HoopsSnapshot`].
    pub fn serialize_snapshot(&self) -> Vec<u8> {
        rmp_serde::to_vec(&self.snapshot()).unwrap_or_default()
    }
}

impl Simulation for HoopsGame {
    fn tick_rate(&self) -> f32 {
        1.0 / self.config.physics.time_step
    }

    fn fixed_update(&mut self, dt: f32) -> Vec<GameEvent> {
        self.clock += dt;
        let now = self.clock;

        let mut events = self.apply_input(dt);

        let mut sinks = ShotSinks {
            score: &mut self.scoreboard,
            feedback: &mut self.feedback,
        };
        events.extend(self.machine.update(dt, &self.ball, &mut sinks));

        self.integrator.step(&mut self.ball, &self.court, dt, now);

        for event in self.detector.update(&mut self.ball, now) {
            let confirmed = matches!(event, GameEvent::ScoreConfirmed { .. });
            events.push(event);
            if confirmed && let Some(made) = self.machine.handle_score(&mut sinks) {
                events.push(made);
            }
        }

        self.feedback.tick(dt);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_core::math::Vec3;
    use courtside_core::test_helpers::run_ticks;

    fn game() -> HoopsGame {
        HoopsGame::with_config(HoopsConfig::default()).unwrap()
    }

    #[test]
    fn rejects_bad_setup() {
        let mut cfg = HoopsConfig::default();
        cfg.ball.radius = -1.0;
        assert!(matches!(
            HoopsGame::with_config(cfg),
            Err(SetupError::InvalidRadius { what: "ball", .. })
        ));

        let mut cfg = HoopsConfig::default();
        cfg.physics.time_step = 0.0;
        assert_eq!(
            HoopsGame::with_config(cfg).err(),
            Some(SetupError::InvalidTimestep(0.0))
        );
    }

    #[test]
    fn idle_ball_stays_ready() {
        let mut g = game();
        let events = run_ticks(&mut g, 120);
        assert!(events.is_empty());
        assert_eq!(g.state(), GameState::Ready);
        assert!((g.ball().position().y - 0.65).abs() < 1e-5);
        assert!((g.clock() - 2.0).abs() < 1e-3);
    }

    #[test]
    fn shoot_emits_start_with_target() {
        let mut g = game();
        let events = g.shoot();
        assert_eq!(
            events,
            vec![GameEvent::ShotStarted {
                target: HoopSide::Right,
                power: 50.0
            }]
        );
        assert_eq!(g.scoreboard().stats().attempts, 1);
        assert_eq!(g.shoot(), vec![GameEvent::ShotRejected]);
    }

    #[test]
    fn airborne_ball_cannot_shoot() {
        let mut g = game();
        g.ball_mut().set_position(Vec3::new(0.0, 5.0, 0.0));
        g.ball_mut().refresh_flags();
        assert_eq!(g.shoot(), vec![GameEvent::ShotRejected]);
        assert_eq!(g.feedback().visible()[0].message, CANNOT_SHOOT_MESSAGE);
        assert_eq!(g.scoreboard().stats().attempts, 0);
    }

    #[test]
    fn input_presses_act_once() {
        let mut g = game();
        g.set_input(HoopsInput {
            shoot: true,
            ..HoopsInput::default()
        });
        let events = g.fixed_update(1.0 / 60.0);
        assert!(matches!(events[0], GameEvent::ShotStarted { .. }));
        let events = g.fixed_update(1.0 / 60.0);
        assert!(!events.contains(&GameEvent::ShotRejected));
        assert_eq!(g.scoreboard().stats().attempts, 1);
    }

    #[test]
    fn held_movement_slides_ball() {
        let mut g = game();
        g.set_input(HoopsInput {
            move_right: true,
            ..HoopsInput::default()
        });
        run_ticks(&mut g, 60);
        assert!(g.ball().position().x > 3.5);
        assert_eq!(g.state(), GameState::Ready);
    }

    #[test]
    fn reset_restores_power_and_spawn() {
        let mut g = game();
        g.set_power(80.0);
        g.ball_mut().set_position(Vec3::new(4.0, 0.65, 2.0));
        let events = g.reset_ball();
        assert_eq!(events, vec![GameEvent::BallReset]);
        assert_eq!(g.power(), 50.0);
        assert_eq!(g.ball().position(), g.config().ball.initial_position);
        assert_eq!(g.state(), GameState::Resetting);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut g = game();
        g.shoot();
        run_ticks(&mut g, 5);
        let snap = g.snapshot();
        assert_eq!(snap.state, GameState::Shooting);
        assert!(snap.shot.is_active);
        assert!(!snap.permissions.can_reset);
        assert!(snap.ball.is_in_flight);
        assert_eq!(snap.stats.attempts, 1);
        assert_eq!(snap.power, 50.0);
    }

    #[test]
    fn malformed_input_bytes_are_ignored() {
        let mut g = game();
        g.apply_input_bytes(&[0xc1, 0x00]);
        assert_eq!(g.fixed_update(1.0 / 60.0), Vec::new());
    }
}
