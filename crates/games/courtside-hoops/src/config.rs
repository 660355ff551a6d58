use serde::{Deserialize, Serialize};

use courtside_core::math::Vec3;

/// Ball radius in meters.
pub const BALL_RADIUS: f32 = 0.5;
/// Court surface height. The ball rests at `GROUND_Y + BALL_RADIUS`.
pub const GROUND_Y: f32 = 0.15;
/// Gravity, exaggerated for gameplay feel (m/s^2, downward).
pub const SCALED_GRAVITY: f32 = -25.0;
/// Fixed simulation step (seconds).
pub const TIME_STEP: f32 = 1.0 / 60.0;
/// Largest frame delta the fixed-step driver will bank (seconds).
pub const MAX_TIME_STEP: f32 = 1.0 / 30.0;
/// Speed below which the ball is considered stopped.
pub const MIN_VELOCITY: f32 = 0.01;
/// Rim radius in meters.
pub const RIM_RADIUS: f32 = 0.7;
/// Rim height in meters.
pub const RIM_HEIGHT: f32 = 4.3;

/// Ball dimensions and the bounce/friction model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub radius: f32,
    pub initial_position: Vec3,
    pub move_speed: f32,
    pub rotation_speed_multiplier: f32,
    /// Damping applied when the ball glances off a static obstacle.
    pub bounce_damping: f32,
    /// Per-tick velocity multiplier while airborne.
    pub air_resistance: f32,
    /// Per-tick horizontal multiplier while on the ground.
    pub rolling_friction: f32,
    pub min_velocity: f32,
    pub restitution: f32,
    /// Impacts slower than this stop bouncing.
    pub min_bounce_height: f32,
    /// Extra energy loss per bounce, raised to the bounce count.
    pub bounce_energy_loss: f32,
    pub max_bounces: u32,
    /// A bounce weaker than this marks the ball as settling.
    pub settle_threshold: f32,
    /// Speed under which a settling ball on the ground is frozen.
    pub settle_speed: f32,
    /// Horizontal speed under which rolling stops outright.
    pub rolling_stop_speed: f32,
    /// Impacts faster than this start a fresh bounce sequence.
    pub high_energy_impact: f32,
    pub ground_tolerance: f32,
    /// Vertical speed above which a grounded ball still counts as in flight.
    pub in_flight_vertical_speed: f32,
    pub spin_damping: f32,
    pub spin_seed: u64,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            initial_position: Vec3::new(0.0, GROUND_Y + BALL_RADIUS, 0.0),
            move_speed: 4.0,
            rotation_speed_multiplier: 2.0,
            bounce_damping: 0.6,
            air_resistance: 0.99,
            rolling_friction: 0.92,
            min_velocity: MIN_VELOCITY,
            restitution: 0.7,
            min_bounce_height: 0.05,
            bounce_energy_loss: 0.95,
            max_bounces: 8,
            settle_threshold: 0.02,
            settle_speed: 0.05,
            rolling_stop_speed: 0.05,
            high_energy_impact: 8.0,
            ground_tolerance: 0.1,
            in_flight_vertical_speed: 0.5,
            spin_damping: 0.98,
            spin_seed: 0x5eed_ba11,
        }
    }
}

/// World-level integration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub time_step: f32,
    pub max_time_step: f32,
    pub ground_y: f32,
    /// Hard speed cap; faster balls are clipped and logged.
    pub max_speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: SCALED_GRAVITY,
            time_step: TIME_STEP,
            max_time_step: MAX_TIME_STEP,
            ground_y: GROUND_Y,
            max_speed: 50.0,
        }
    }
}

/// Rim geometry and the score-detection thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoopConfig {
    pub rim_radius: f32,
    pub rim_height: f32,
    /// Looser horizontal radius used while a tracking window is open.
    pub score_detection_radius: f32,
    /// Drop below rim height that confirms a make.
    pub score_detection_height: f32,
    /// Extra reach beyond `rim_radius + ball_radius` for the near-rim test.
    pub near_rim_margin: f32,
    /// Vertical band around rim height in which edge contact is possible.
    pub edge_band: f32,
    pub edge_approach_speed: f32,
    pub edge_damping: f32,
    pub edge_min_speed: f32,
    pub edge_min_upward: f32,
    pub edge_upward_factor: f32,
    /// Height above the rim the ball must be at to open tracking.
    pub entry_min_height: f32,
    /// Vertical velocity the ball must be below to open tracking.
    pub entry_max_vertical_velocity: f32,
    pub tracking_timeout_secs: f32,
    pub trajectory_history: usize,
}

impl Default for HoopConfig {
    fn default() -> Self {
        Self {
            rim_radius: RIM_RADIUS,
            rim_height: RIM_HEIGHT,
            score_detection_radius: 0.6,
            score_detection_height: 0.5,
            near_rim_margin: 0.5,
            edge_band: 0.3,
            edge_approach_speed: 0.1,
            edge_damping: 0.7,
            edge_min_speed: 2.0,
            edge_min_upward: 1.5,
            edge_upward_factor: 0.3,
            entry_min_height: 0.2,
            entry_max_vertical_velocity: -0.5,
            tracking_timeout_secs: 3.0,
            trajectory_history: 10,
        }
    }
}

/// Court extents and where the hoop structures stand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtConfig {
    pub boundary_min_x: f32,
    pub boundary_max_x: f32,
    pub boundary_min_z: f32,
    pub boundary_max_z: f32,
    /// |x| of each basket stand's base.
    pub hoop_base_x: f32,
    /// How far the rim hangs in front of its stand, toward center court.
    pub rim_offset: f32,
    /// |x| of each scoreboard structure.
    pub scoreboard_x: f32,
}

impl Default for CourtConfig {
    fn default() -> Self {
        Self {
            boundary_min_x: -14.5,
            boundary_max_x: 14.5,
            boundary_min_z: -7.0,
            boundary_max_z: 7.0,
            hoop_base_x: 16.1,
            rim_offset: 3.1,
            scoreboard_x: 19.0,
        }
    }
}

/// Shot solver and power meter parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotConfig {
    pub arc_height_min: f32,
    pub arc_height_max: f32,
    pub power_min: f32,
    pub power_max: f32,
    pub power_default: f32,
    pub power_increment: f32,
    pub power_repeat_delay_secs: f32,
    pub power_to_velocity_scale: f32,
    /// Aim point above the rim center.
    pub target_height_offset: f32,
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            arc_height_min: 3.0,
            arc_height_max: 6.0,
            power_min: 0.0,
            power_max: 100.0,
            power_default: 50.0,
            power_increment: 2.0,
            power_repeat_delay_secs: 0.1,
            power_to_velocity_scale: 3.0,
            target_height_offset: 0.2,
        }
    }
}

/// Points, dwell times and feedback duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub points_per_shot: u32,
    pub scoring_dwell_secs: f32,
    pub resetting_dwell_secs: f32,
    pub feedback_duration_secs: f32,
    pub history_len: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_per_shot: 2,
            scoring_dwell_secs: 2.0,
            resetting_dwell_secs: 0.5,
            feedback_duration_secs: 2.0,
            history_len: 100,
        }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HoopsConfig {
    pub ball: BallConfig,
    pub physics: PhysicsConfig,
    pub hoops: HoopConfig,
    pub court: CourtConfig,
    pub shot: ShotConfig,
    pub scoring: ScoringConfig,
}

impl HoopsConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("COURTSIDE_HOOPS_CONFIG")
            .unwrap_or_else(|_| "config/hoops.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Height of the ball center when resting on the court.
    pub fn rest_height(&self) -> f32 {
        self.physics.ground_y + self.ball.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let cfg = HoopsConfig::default();
        assert_eq!(cfg.ball.radius, 0.5);
        assert_eq!(cfg.physics.gravity, -25.0);
        assert_eq!(cfg.hoops.rim_radius, 0.7);
        assert_eq!(cfg.hoops.rim_height, 4.3);
        assert!((cfg.rest_height() - 0.65).abs() < 1e-6);
        assert_eq!(cfg.scoring.points_per_shot, 2);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = HoopsConfig::from_toml(
            r#"
            [physics]
            gravity = -9.8

            [shot]
            power_default = 70.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.physics.gravity, -9.8);
        assert_eq!(cfg.physics.max_speed, 50.0);
        assert_eq!(cfg.shot.power_default, 70.0);
        assert_eq!(cfg.ball.restitution, 0.7);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(HoopsConfig::from_toml("[physics\ngravity = ").is_err());
    }

    #[test]
    fn shipped_config_parses() {
        let content = include_str!("../config/hoops.toml");
        let cfg = HoopsConfig::from_toml(content).unwrap();
        assert_eq!(cfg.hoops.tracking_timeout_secs, 3.0);
        assert_eq!(cfg.ball.max_bounces, 8);
    }
}
