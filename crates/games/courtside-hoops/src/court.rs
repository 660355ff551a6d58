use serde::{Deserialize, Serialize};

use courtside_core::game_trait::{HoopSide, RimPositions, RimProvider};
use courtside_core::math::Vec3;

use crate::config::HoopsConfig;

/// Obstacle groups, in the order collisions are tested.
///
/// The derive order is the test priority: backboards first, scoreboard
/// poles last. The court Z boundary is tested after all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObstacleKind {
    Backboard,
    BasketBase,
    BasketPole,
    ScoreboardBody,
    ScoreboardPole,
}

/// An axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxCollider {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl BoxCollider {
    /// Build from a center and full edge lengths.
    pub fn from_size(center: Vec3, size: Vec3) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }
}

/// A vertical cylinder, centered on `center` and extending `height / 2` up and down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylinderCollider {
    pub center: Vec3,
    pub radius: f32,
    pub height: f32,
}

impl CylinderCollider {
    pub fn min_y(&self) -> f32 {
        self.center.y - self.height / 2.0
    }

    pub fn max_y(&self) -> f32 {
        self.center.y + self.height / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Box(BoxCollider),
    Cylinder(CylinderCollider),
}

/// A named static obstacle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub name: String,
    pub kind: ObstacleKind,
    pub shape: Shape,
}

/// Horizontal play area. The ball is clamped to it when moved by the player,
/// and bounces off its Z edges when nothing else was hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CourtBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl CourtBounds {
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        Vec3::new(
            position.x.clamp(self.min_x, self.max_x),
            position.y,
            position.z.clamp(self.min_z, self.max_z),
        )
    }
}

/// Rim geometry for one hoop. `center.y` is the rim height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoopGeometry {
    pub side: HoopSide,
    pub center: Vec3,
    pub radius: f32,
}

/// The static world: obstacles, bounds and rim positions. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Court {
    pub name: String,
    pub bounds: CourtBounds,
    pub rims: RimPositions,
    colliders: Vec<Collider>,
}

impl Court {
    /// Colliders are stable-sorted into priority order, so a layout file
    /// cannot change which obstacle wins when two overlap.
    pub fn new(
        name: impl Into<String>,
        bounds: CourtBounds,
        rims: RimPositions,
        mut colliders: Vec<Collider>,
    ) -> Self {
        colliders.sort_by_key(|c| c.kind);
        Self {
            name: name.into(),
            bounds,
            rims,
            colliders,
        }
    }

    /// Obstacles in collision-test order.
    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }
}

impl RimProvider for Court {
    fn all_rim_positions(&self) -> RimPositions {
        self.rims
    }
}

/// Load a court layout from a JSON file, returning `None` if the file is missing or invalid.
pub fn load_court_from_file(path: &str) -> Option<Court> {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<Court>(&content) {
            Ok(court) => Some(Court::new(
                court.name,
                court.bounds,
                court.rims,
                court.colliders,
            )),
            Err(e) => {
                tracing::warn!("Failed to parse {path}: {e}");
                None
            },
        },
        Err(_) => None,
    }
}

/// Load the court layout, preferring a JSON file.
///
/// Checks env var `COURTSIDE_COURT_FILE` (default `config/court.json`).
/// Falls back to `standard_court(config)` if the file is missing or unparseable.
pub fn load_court(config: &HoopsConfig) -> Court {
    let path =
        std::env::var("COURTSIDE_COURT_FILE").unwrap_or_else(|_| "config/court.json".to_string());
    load_court_from_file(&path).unwrap_or_else(|| standard_court(config))
}

fn boxed(name: &str, kind: ObstacleKind, center: Vec3, size: Vec3) -> Collider {
    Collider {
        name: name.to_string(),
        kind,
        shape: Shape::Box(BoxCollider::from_size(center, size)),
    }
}

fn pole(name: &str, kind: ObstacleKind, center: Vec3, radius: f32, height: f32) -> Collider {
    Collider {
        name: name.to_string(),
        kind,
        shape: Shape::Cylinder(CylinderCollider {
            center,
            radius,
            height,
        }),
    }
}

/// Build the standard full court.
///
/// Layout: play area 29 x 14 centered on the origin. A basket stand sits
/// beyond each baseline with its backboard 2.1 m in front of the pole and
/// the rim 3.1 m in front of the pole. A scoreboard stands behind each basket.
/// Each side mirrors the other; left is listed before right within a group.
pub fn standard_court(config: &HoopsConfig) -> Court {
    use ObstacleKind::*;

    let c = &config.court;
    let base = c.hoop_base_x;
    let board = c.hoop_base_x - 2.1;
    let sb = c.scoreboard_x;

    let colliders = vec![
        boxed(
            "left-backboard",
            Backboard,
            Vec3::new(-board, 5.0, 0.0),
            Vec3::new(0.1, 3.0, 4.0),
        ),
        boxed(
            "right-backboard",
            Backboard,
            Vec3::new(board, 5.0, 0.0),
            Vec3::new(0.1, 3.0, 4.0),
        ),
        boxed(
            "left-basket-base",
            BasketBase,
            Vec3::new(-base, 0.25, 0.0),
            Vec3::new(2.0, 0.5, 2.0),
        ),
        boxed(
            "right-basket-base",
            BasketBase,
            Vec3::new(base, 0.25, 0.0),
            Vec3::new(2.0, 0.5, 2.0),
        ),
        pole(
            "left-basket-pole",
            BasketPole,
            Vec3::new(-base, 2.85, 0.0),
            0.2,
            4.7,
        ),
        pole(
            "right-basket-pole",
            BasketPole,
            Vec3::new(base, 2.85, 0.0),
            0.2,
            4.7,
        ),
        boxed(
            "left-scoreboard-base",
            ScoreboardBody,
            Vec3::new(-sb, 0.3, 0.0),
            Vec3::new(3.0, 0.6, 3.0),
        ),
        boxed(
            "right-scoreboard-base",
            ScoreboardBody,
            Vec3::new(sb, 0.3, 0.0),
            Vec3::new(3.0, 0.6, 3.0),
        ),
        boxed(
            "left-scoreboard-display",
            ScoreboardBody,
            Vec3::new(-sb, 8.0, -0.8),
            Vec3::new(0.3, 2.5, 4.0),
        ),
        boxed(
            "right-scoreboard-display",
            ScoreboardBody,
            Vec3::new(sb, 8.0, -0.8),
            Vec3::new(0.3, 2.5, 4.0),
        ),
        boxed(
            "left-scoreboard-support",
            ScoreboardBody,
            Vec3::new(-sb, 6.0, 0.0),
            Vec3::new(0.15, 0.15, 1.8),
        ),
        boxed(
            "right-scoreboard-support",
            ScoreboardBody,
            Vec3::new(sb, 6.0, 0.0),
            Vec3::new(0.15, 0.15, 1.8),
        ),
        pole(
            "left-scoreboard-pole-1",
            ScoreboardPole,
            Vec3::new(-sb - 0.8, 4.3, 0.0),
            0.25,
            8.0,
        ),
        pole(
            "left-scoreboard-pole-2",
            ScoreboardPole,
            Vec3::new(-sb + 0.8, 4.3, 0.0),
            0.25,
            8.0,
        ),
        pole(
            "right-scoreboard-pole-1",
            ScoreboardPole,
            Vec3::new(sb - 0.8, 4.3, 0.0),
            0.25,
            8.0,
        ),
        pole(
            "right-scoreboard-pole-2",
            ScoreboardPole,
            Vec3::new(sb + 0.8, 4.3, 0.0),
            0.25,
            8.0,
        ),
    ];

    let rim_x = c.hoop_base_x - c.rim_offset;
    let rim_y = config.hoops.rim_height;
    let rims = RimPositions {
        left: Some(Vec3::new(-rim_x, rim_y, 0.0)),
        right: Some(Vec3::new(rim_x, rim_y, 0.0)),
    };

    Court::new(
        "Standard Court",
        CourtBounds {
            min_x: c.boundary_min_x,
            max_x: c.boundary_max_x,
            min_z: c.boundary_min_z,
            max_z: c.boundary_max_z,
        },
        rims,
        colliders,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rims_are_mirrored() {
        let court = standard_court(&HoopsConfig::default());
        let rims = court.all_rim_positions();
        let left = rims.left.unwrap();
        let right = rims.right.unwrap();
        assert!((right.x - 13.0).abs() < 1e-4);
        assert!((left.x + 13.0).abs() < 1e-4);
        assert_eq!(left.y, 4.3);
        assert_eq!(right.z, 0.0);
    }

    #[test]
    fn colliders_are_in_priority_order() {
        let court = standard_court(&HoopsConfig::default());
        let kinds: Vec<_> = court.colliders().iter().map(|c| c.kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
        assert_eq!(court.colliders()[0].name, "left-backboard");
        assert_eq!(court.colliders().len(), 16);
    }

    #[test]
    fn new_sorts_out_of_order_layouts() {
        let cfg = HoopsConfig::default();
        let std = standard_court(&cfg);
        let mut reversed: Vec<_> = std.colliders().to_vec();
        reversed.reverse();
        let court = Court::new("Reversed", std.bounds, std.rims, reversed);
        assert_eq!(court.colliders()[0].kind, ObstacleKind::Backboard);
        assert_eq!(
            court.colliders().last().unwrap().kind,
            ObstacleKind::ScoreboardPole
        );
    }

    #[test]
    fn court_json_roundtrip_keeps_layout() {
        let court = standard_court(&HoopsConfig::default());
        let json = serde_json::to_string(&court).unwrap();
        let parsed: Court = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.colliders(), court.colliders());
        assert_eq!(parsed.rims, court.rims);
    }

    #[test]
    fn missing_court_file_is_none() {
        assert!(load_court_from_file("/nonexistent/court.json").is_none());
    }

    #[test]
    fn bounds_clamp_keeps_height() {
        let court = standard_court(&HoopsConfig::default());
        let p = court.bounds.clamp(Vec3::new(40.0, 3.0, -40.0));
        assert_eq!(p, Vec3::new(14.5, 3.0, -7.0));
    }
}
