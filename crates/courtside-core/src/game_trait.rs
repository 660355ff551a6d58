use serde::{Deserialize, Serialize};

use crate::events::GameEvent;
use crate::math::Vec3;

/// A simulation advanced in fixed increments by an outer driver.
///
/// The driver owns the frame clock; the simulation only ever sees whole
/// fixed steps, so render cadence cannot change results.
pub trait Simulation {
    /// Fixed simulation rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Advance exactly one fixed step. Returns the events raised during it.
    fn fixed_update(&mut self, dt: f32) -> Vec<GameEvent>;
}

/// Which end of the court a hoop (or the ball) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoopSide {
    Left,
    Right,
}

impl HoopSide {
    pub const BOTH: [HoopSide; 2] = [HoopSide::Left, HoopSide::Right];

    /// The hoop on the ball's half of the court: negative X is the left half,
    /// center and positive X the right.
    pub fn for_ball_x(x: f32) -> Self {
        if x < 0.0 {
            HoopSide::Left
        } else {
            HoopSide::Right
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HoopSide::Left => "left",
            HoopSide::Right => "right",
        }
    }
}

/// Rim center coordinates for both hoops.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RimPositions {
    pub left: Option<Vec3>,
    pub right: Option<Vec3>,
}

impl RimPositions {
    pub fn get(&self, side: HoopSide) -> Option<Vec3> {
        match side {
            HoopSide::Left => self.left,
            HoopSide::Right => self.right,
        }
    }
}

/// Source of hoop geometry, queried once at setup.
pub trait RimProvider {
    fn all_rim_positions(&self) -> RimPositions;
}

/// Receives attempt and make notifications from the shot flow.
pub trait ScoreSink {
    fn add_score(&mut self, points: u32);

    fn increment_attempts(&mut self);

    fn increment_made(&mut self);

    /// Called when an attempt ends without a confirmed make.
    fn record_miss(&mut self) {}
}

/// Severity of a transient feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackKind {
    Success,
    Failure,
    Info,
}

/// Observational sink for on-screen feedback. Nothing is returned to the caller.
pub trait FeedbackSink {
    fn show_feedback(&mut self, message: &str, kind: FeedbackKind);
}
