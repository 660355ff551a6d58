use serde::{Deserialize, Serialize};

use courtside_core::events::GameEvent;
use courtside_core::game_trait::{FeedbackKind, FeedbackSink, HoopSide, RimPositions, ScoreSink};
use courtside_core::math::Vec3;

use crate::ball::Ball;
use crate::config::HoopsConfig;
use crate::scoring::{
    BALL_RESET_MESSAGE, CANNOT_SHOOT_MESSAGE, MISSED_SHOT_MESSAGE, SHOT_MADE_MESSAGE,
};
use crate::trajectory::shot_velocity;

/// High-level shot flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Ready,
    Moving,
    Shooting,
    Bouncing,
    Scoring,
    Resetting,
}

/// What the player may do in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub can_move: bool,
    pub can_shoot: bool,
    pub can_reset: bool,
}

impl Permissions {
    const fn new(can_move: bool, can_shoot: bool, can_reset: bool) -> Self {
        Self {
            can_move,
            can_shoot,
            can_reset,
        }
    }
}

impl GameState {
    /// Fixed permission table.
    pub const fn permissions(self) -> Permissions {
        match self {
            GameState::Ready | GameState::Moving => Permissions::new(true, true, true),
            GameState::Shooting | GameState::Resetting => Permissions::new(false, false, false),
            GameState::Bouncing | GameState::Scoring => Permissions::new(false, false, true),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameState::Ready => "ready",
            GameState::Moving => "moving",
            GameState::Shooting => "shooting",
            GameState::Bouncing => "bouncing",
            GameState::Scoring => "scoring",
            GameState::Resetting => "resetting",
        }
    }
}

/// The current (or most recent) shot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub is_active: bool,
    pub start_time: f32,
    pub start_position: Vec3,
    pub target: Option<HoopSide>,
    pub power: f32,
    /// Set when the shot completes.
    pub made: Option<bool>,
    /// Seconds since launch while active.
    pub duration: f32,
}

/// Collaborators notified by the shot flow.
pub struct ShotSinks<'a> {
    pub score: &'a mut dyn ScoreSink,
    pub feedback: &'a mut dyn FeedbackSink,
}

/// Drives ready -> moving -> shooting -> bouncing -> scoring/resetting.
///
/// `update` makes at most one transition per call. Shots, scores and resets
/// arrive through their own entry points.
#[derive(Debug, Clone)]
pub struct ShotStateMachine {
    state: GameState,
    previous: Option<GameState>,
    state_timer: f32,
    shot: ShotRecord,
    config: HoopsConfig,
}

impl ShotStateMachine {
    pub fn new(config: &HoopsConfig) -> Self {
        Self {
            state: GameState::Ready,
            previous: None,
            state_timer: 0.0,
            shot: ShotRecord::default(),
            config: config.clone(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn previous_state(&self) -> Option<GameState> {
        self.previous
    }

    pub fn time_in_state(&self) -> f32 {
        self.state_timer
    }

    pub fn permissions(&self) -> Permissions {
        self.state.permissions()
    }

    pub fn can_move(&self) -> bool {
        self.permissions().can_move
    }

    pub fn can_shoot(&self) -> bool {
        self.permissions().can_shoot
    }

    pub fn can_reset(&self) -> bool {
        self.permissions().can_reset
    }

    pub fn shot(&self) -> &ShotRecord {
        &self.shot
    }

    pub fn is_shot_active(&self) -> bool {
        self.shot.is_active
    }

    fn set_state(&mut self, next: GameState) {
        if next == self.state {
            return;
        }
        tracing::debug!(from = self.state.as_str(), to = next.as_str(), "State transition");
        self.previous = Some(self.state);
        self.state = next;
        self.state_timer = 0.0;
    }

    /// Advance timers and make at most one transition from the ball's flags.
    pub fn update(&mut self, dt: f32, ball: &Ball, sinks: &mut ShotSinks<'_>) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.state_timer += dt;

        let min_velocity = self.config.ball.min_velocity;
        let moving = ball.speed() > min_velocity;
        let at_rest = !moving && ball.is_on_ground();

        match self.state {
            GameState::Ready => {
                if moving {
                    self.set_state(GameState::Moving);
                }
            },
            GameState::Moving => {
                if at_rest {
                    self.set_state(GameState::Ready);
                }
            },
            GameState::Shooting => {
                if self.shot.is_active && !ball.is_in_flight() && ball.is_on_ground() {
                    self.set_state(GameState::Bouncing);
                }
            },
            GameState::Bouncing => {
                if at_rest {
                    if self.complete_shot_attempt(false, sinks) {
                        events.push(GameEvent::ShotMissed);
                    }
                    self.set_state(GameState::Ready);
                }
            },
            GameState::Scoring => {
                if self.state_timer >= self.config.scoring.scoring_dwell_secs {
                    self.set_state(GameState::Ready);
                }
            },
            GameState::Resetting => {
                if self.state_timer >= self.config.scoring.resetting_dwell_secs {
                    self.set_state(GameState::Ready);
                }
            },
        }

        if self.shot.is_active {
            self.shot.duration += dt;
        }
        events
    }

    /// Launch a shot at the hoop on the ball's half of the court.
    ///
    /// Returns `false` without changing anything but feedback when shooting
    /// is not allowed or no launch velocity can be solved.
    pub fn initiate_shot(
        &mut self,
        power: f32,
        ball: &mut Ball,
        rims: &RimPositions,
        now: f32,
        sinks: &mut ShotSinks<'_>,
    ) -> bool {
        if !self.can_shoot() {
            tracing::warn!(state = self.state.as_str(), "Cannot initiate shot: not allowed");
            sinks
                .feedback
                .show_feedback(CANNOT_SHOOT_MESSAGE, FeedbackKind::Failure);
            return false;
        }

        let start = ball.position();
        let target = HoopSide::for_ball_x(start.x);
        let Some(rim) = rims.get(target) else {
            tracing::warn!(side = target.as_str(), "Cannot initiate shot: no rim");
            return false;
        };

        let velocity = match shot_velocity(start, rim, power, &self.config) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Could not calculate shot velocity: {e}");
                return false;
            },
        };

        let shot = &self.config.shot;
        self.shot = ShotRecord {
            is_active: true,
            start_time: now,
            start_position: start,
            target: Some(target),
            power: power.clamp(shot.power_min, shot.power_max),
            made: None,
            duration: 0.0,
        };
        ball.set_velocity(velocity);
        sinks.score.increment_attempts();
        self.set_state(GameState::Shooting);
        true
    }

    /// Register a confirmed make. Ignored unless a shot is active.
    pub fn handle_score(&mut self, sinks: &mut ShotSinks<'_>) -> Option<GameEvent> {
        let side = self.shot.target?;
        if !self.complete_shot_attempt(true, sinks) {
            return None;
        }
        let points = self.config.scoring.points_per_shot;
        sinks.score.add_score(points);
        sinks
            .feedback
            .show_feedback(SHOT_MADE_MESSAGE, FeedbackKind::Success);
        self.set_state(GameState::Scoring);
        Some(GameEvent::BasketMade { side, points })
    }

    /// Close the active shot. Returns `false` if none was active.
    pub fn complete_shot_attempt(&mut self, success: bool, sinks: &mut ShotSinks<'_>) -> bool {
        if !self.shot.is_active {
            return false;
        }
        self.shot.is_active = false;
        self.shot.made = Some(success);

        if success {
            sinks.score.increment_made();
        } else {
            tracing::info!(power = self.shot.power, "Shot missed");
            sinks.score.record_miss();
            sinks
                .feedback
                .show_feedback(MISSED_SHOT_MESSAGE, FeedbackKind::Failure);
        }
        true
    }

    /// Put the ball back on its spawn point. An active shot counts as a miss.
    /// Returns the raised events, or an empty list if resetting is not allowed.
    pub fn request_reset(&mut self, ball: &mut Ball, sinks: &mut ShotSinks<'_>) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.can_reset() {
            tracing::warn!(state = self.state.as_str(), "Cannot reset ball: not allowed");
            return events;
        }

        if self.complete_shot_attempt(false, sinks) {
            events.push(GameEvent::ShotMissed);
        }
        ball.reset();
        sinks
            .feedback
            .show_feedback(BALL_RESET_MESSAGE, FeedbackKind::Info);
        self.set_state(GameState::Resetting);
        events.push(GameEvent::BallReset);
        events
    }
}
