use serde::{Deserialize, Serialize};

use crate::game_trait::HoopSide;

/// Why a score-tracking window closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingEndReason {
    Confirmed,
    LeftZone,
    Rising,
    TimedOut,
    Cleared,
}

/// Events emitted by the simulation during a fixed tick.
///
/// `ScoreConfirmed` is the message the rim detector hands to the shot flow;
/// `BasketMade` is what the shot flow emits once it has accepted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotStarted { target: HoopSide, power: f32 },
    ShotRejected,
    RimBounce { side: HoopSide },
    TrackingStarted { side: HoopSide },
    TrackingEnded { side: HoopSide, reason: TrackingEndReason },
    ScoreConfirmed { side: HoopSide },
    BasketMade { side: HoopSide, points: u32 },
    ShotMissed,
    BallReset,
}
