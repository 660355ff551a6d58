use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use courtside_core::events::{GameEvent, TrackingEndReason};
use courtside_core::game_trait::{HoopSide, RimProvider};
use courtside_core::math::Vec3;

use crate::ball::Ball;
use crate::config::{HoopConfig, HoopsConfig};
use crate::court::HoopGeometry;
use crate::error::SetupError;

/// Below this horizontal offset from the rim axis an edge contact has no normal.
const MIN_EDGE_OFFSET: f32 = 0.01;

/// Per-side proximity bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RimInfo {
    pub is_near: bool,
    pub has_passed_through: bool,
    /// Simulation time of the last check.
    pub last_check: f32,
}

/// An open score-tracking window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tracking {
    pub side: HoopSide,
    pub entry_velocity: Vec3,
    pub started_at: f32,
    pub in_score_zone: bool,
    pub below_rim: bool,
}

#[derive(Debug, Clone)]
struct Hoop {
    geometry: HoopGeometry,
    info: RimInfo,
}

/// Rim proximity, rim-edge bounces and make detection for both hoops.
///
/// At most one tracking window is open at a time. Edge bounces for a hoop
/// are resolved before its scoring checks in the same tick.
#[derive(Debug, Clone)]
pub struct ScoreDetector {
    left: Hoop,
    right: Hoop,
    ball_radius: f32,
    cfg: HoopConfig,
    tracking: Option<Tracking>,
    trajectory: VecDeque<Vec3>,
}

impl ScoreDetector {
    pub fn new(rims: &dyn RimProvider, config: &HoopsConfig) -> Result<Self, SetupError> {
        let positions = rims.all_rim_positions();
        let cfg = config.hoops.clone();
        if cfg.rim_radius <= 0.0 || !cfg.rim_radius.is_finite() {
            return Err(SetupError::InvalidRadius {
                what: "rim",
                value: cfg.rim_radius,
            });
        }

        let hoop = |side: HoopSide| -> Result<Hoop, SetupError> {
            let center = positions.get(side).ok_or(SetupError::MissingRim(side))?;
            Ok(Hoop {
                geometry: HoopGeometry {
                    side,
                    center,
                    radius: cfg.rim_radius,
                },
                info: RimInfo::default(),
            })
        };

        Ok(Self {
            left: hoop(HoopSide::Left)?,
            right: hoop(HoopSide::Right)?,
            ball_radius: config.ball.radius,
            trajectory: VecDeque::with_capacity(cfg.trajectory_history),
            tracking: None,
            cfg,
        })
    }

    fn hoop(&self, side: HoopSide) -> &Hoop {
        match side {
            HoopSide::Left => &self.left,
            HoopSide::Right => &self.right,
        }
    }

    fn hoop_mut(&mut self, side: HoopSide) -> &mut Hoop {
        match side {
            HoopSide::Left => &mut self.left,
            HoopSide::Right => &mut self.right,
        }
    }

    /// Run one tick of rim checks against the ball. May change the ball's
    /// velocity (rim edge bounce). A `ScoreConfirmed` event is raised at most
    /// once per tracking window.
    pub fn update(&mut self, ball: &mut Ball, now: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();

        self.record_trajectory(ball.position());
        for side in HoopSide::BOTH {
            self.check_rim(side, ball, now, &mut events);
        }
        self.update_tracking(ball, now, &mut events);

        events
    }

    fn record_trajectory(&mut self, position: Vec3) {
        self.trajectory.push_back(position);
        while self.trajectory.len() > self.cfg.trajectory_history {
            self.trajectory.pop_front();
        }
    }

    fn check_rim(
        &mut self,
        side: HoopSide,
        ball: &mut Ball,
        now: f32,
        events: &mut Vec<GameEvent>,
    ) {
        let radius = self.ball_radius;
        let geometry = self.hoop(side).geometry;
        let position = ball.position();

        let reach = geometry.radius + radius + self.cfg.near_rim_margin;
        let near = position.distance(geometry.center) < reach;
        let hoop = self.hoop_mut(side);
        hoop.info.is_near = near;
        hoop.info.last_check = now;
        if !near {
            return;
        }

        let velocity = ball.velocity();
        let horizontal = position.horizontal_distance(geometry.center);
        let vertical = position.y - geometry.center.y;
        let inner = geometry.radius - radius;
        let outer = geometry.radius + radius;

        if vertical.abs() < self.cfg.edge_band && horizontal >= inner && horizontal <= outer {
            let inward = (geometry.center - position).horizontal().normalize();
            if velocity.horizontal().dot(inward) > self.cfg.edge_approach_speed {
                if self.resolve_edge_bounce(&geometry, ball, now) {
                    tracing::debug!(side = side.as_str(), "Rim edge bounce");
                    events.push(GameEvent::RimBounce { side });
                }
                return;
            }
        }

        let entering = horizontal <= inner
            && velocity.y < self.cfg.entry_max_vertical_velocity
            && vertical > self.cfg.entry_min_height;
        if entering && self.tracking.is_none() {
            tracing::debug!(side = side.as_str(), "Score tracking started");
            self.tracking = Some(Tracking {
                side,
                entry_velocity: velocity,
                started_at: now,
                in_score_zone: true,
                below_rim: false,
            });
            events.push(GameEvent::TrackingStarted { side });
        }
    }

    /// Reflect off the rim torus, keeping a minimum horizontal speed and
    /// kicking the ball upward.
    fn resolve_edge_bounce(&self, geometry: &HoopGeometry, ball: &mut Ball, now: f32) -> bool {
        let position = ball.position();
        let incoming = ball.velocity();
        let outward = (position - geometry.center).horizontal();
        let offset = outward.length();
        if offset < MIN_EDGE_OFFSET {
            return false;
        }
        let normal = outward * (1.0 / offset);
        if incoming.horizontal().dot(normal) >= 0.0 {
            return false;
        }

        ball.bounce(normal, self.cfg.edge_damping, now);
        let mut horizontal = ball.velocity().horizontal();
        if horizontal.length() < self.cfg.edge_min_speed {
            horizontal = horizontal.normalize() * self.cfg.edge_min_speed;
        }
        let upward = self
            .cfg
            .edge_min_upward
            .max(incoming.y.abs() * self.cfg.edge_upward_factor);
        ball.set_velocity(horizontal.with_y(upward));
        true
    }

    fn update_tracking(&mut self, ball: &Ball, now: f32, events: &mut Vec<GameEvent>) {
        let Some(mut tracking) = self.tracking else {
            return;
        };
        let side = tracking.side;
        let center = self.hoop(side).geometry.center;
        let position = ball.position();

        tracking.in_score_zone =
            position.horizontal_distance(center) <= self.cfg.score_detection_radius;
        tracking.below_rim = position.y - center.y < -self.cfg.score_detection_height;

        if tracking.in_score_zone && tracking.below_rim {
            tracing::info!(side = side.as_str(), "Basket confirmed");
            self.hoop_mut(side).info.has_passed_through = true;
            self.tracking = None;
            events.push(GameEvent::ScoreConfirmed { side });
            events.push(GameEvent::TrackingEnded {
                side,
                reason: TrackingEndReason::Confirmed,
            });
            return;
        }

        let reason = if !tracking.in_score_zone {
            Some(TrackingEndReason::LeftZone)
        } else if ball.velocity().y > 0.0 {
            Some(TrackingEndReason::Rising)
        } else if now - tracking.started_at > self.cfg.tracking_timeout_secs {
            Some(TrackingEndReason::TimedOut)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                tracing::debug!(side = side.as_str(), ?reason, "Score tracking ended");
                self.tracking = None;
                events.push(GameEvent::TrackingEnded { side, reason });
            },
            None => self.tracking = Some(tracking),
        }
    }

    /// The hoop whose rim center is nearest to `position`, with its distance.
    pub fn closest_hoop(&self, position: Vec3) -> (HoopSide, f32) {
        let left = position.distance(self.left.geometry.center);
        let right = position.distance(self.right.geometry.center);
        if right < left {
            (HoopSide::Right, right)
        } else {
            (HoopSide::Left, left)
        }
    }

    pub fn geometry(&self, side: HoopSide) -> HoopGeometry {
        self.hoop(side).geometry
    }

    pub fn rim_info(&self, side: HoopSide) -> RimInfo {
        self.hoop(side).info
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.is_some()
    }

    pub fn tracking(&self) -> Option<&Tracking> {
        self.tracking.as_ref()
    }

    /// Recent ball positions, oldest first.
    pub fn trajectory(&self) -> impl Iterator<Item = &Vec3> {
        self.trajectory.iter()
    }

    /// Drop any open window, rim info and trajectory history. Returns the
    /// side whose window was cleared, if one was open.
    pub fn reset(&mut self) -> Option<HoopSide> {
        self.trajectory.clear();
        self.left.info = RimInfo::default();
        self.right.info = RimInfo::default();
        self.tracking.take().map(|t| t.side)
    }
}
