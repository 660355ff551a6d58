use courtside_core::math::Vec3;

use crate::court::{BoxCollider, CylinderCollider};

/// Below this horizontal separation a cylinder contact has no usable normal.
const MIN_SEPARATION: f32 = 1e-6;

/// Corrected kinematic state after a sphere touched a static collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Sphere vs axis-aligned box.
///
/// Only one axis is resolved: the first of X, Y, Z on which the sphere
/// overlaps the box while its center is still outside that face and its
/// velocity points into it. That axis's velocity component is reversed and
/// damped, and the sphere is moved flush with the face.
pub fn sphere_box(
    position: Vec3,
    velocity: Vec3,
    radius: f32,
    aabb: &BoxCollider,
    damping: f32,
) -> Option<Contact> {
    let min = aabb.min();
    let max = aabb.max();

    let touching = |p: f32, lo: f32, hi: f32| p + radius >= lo && p - radius <= hi;
    if !touching(position.x, min.x, max.x)
        || !touching(position.y, min.y, max.y)
        || !touching(position.z, min.z, max.z)
    {
        return None;
    }

    let resolve = |p: f32, v: f32, lo: f32, hi: f32| -> Option<(f32, f32)> {
        if p - radius >= hi || p + radius <= lo {
            return None;
        }
        if v > 0.0 && p < lo {
            Some((lo - radius, -v.abs() * damping))
        } else if v < 0.0 && p > hi {
            Some((hi + radius, v.abs() * damping))
        } else {
            None
        }
    };

    let mut position = position;
    let mut velocity = velocity;
    if let Some((p, v)) = resolve(position.x, velocity.x, min.x, max.x) {
        position.x = p;
        velocity.x = v;
    } else if let Some((p, v)) = resolve(position.y, velocity.y, min.y, max.y) {
        position.y = p;
        velocity.y = v;
    } else if let Some((p, v)) = resolve(position.z, velocity.z, min.z, max.z) {
        position.z = p;
        velocity.z = v;
    } else {
        return None;
    }

    Some(Contact { position, velocity })
}

/// Sphere vs vertical cylinder.
///
/// Once the vertical ranges overlap and the sphere is within reach
/// horizontally, it is pushed out along the radial normal. If it was moving
/// inward, the horizontal velocity is reflected about that normal and damped;
/// vertical velocity is untouched.
pub fn sphere_cylinder(
    position: Vec3,
    velocity: Vec3,
    radius: f32,
    cylinder: &CylinderCollider,
    damping: f32,
) -> Option<Contact> {
    if position.y - radius > cylinder.max_y() || position.y + radius < cylinder.min_y() {
        return None;
    }

    let offset = (position - cylinder.center).horizontal();
    let distance = offset.length();
    let reach = radius + cylinder.radius;
    if distance >= reach || distance < MIN_SEPARATION {
        return None;
    }

    let normal = offset * (1.0 / distance);
    let pushed = cylinder.center + normal * reach;
    let corrected = Vec3::new(pushed.x, position.y, pushed.z);

    let horizontal = velocity.horizontal();
    let corrected_velocity = if horizontal.dot(normal) < 0.0 {
        let reflected = horizontal.reflect(normal) * damping;
        Vec3::new(reflected.x, velocity.y, reflected.z)
    } else {
        velocity
    };

    Some(Contact {
        position: corrected,
        velocity: corrected_velocity,
    })
}

/// Whether a point lies inside a vertical cylinder centered on `center`.
pub fn point_in_cylinder(point: Vec3, center: Vec3, radius: f32, height: f32) -> bool {
    point.horizontal_distance(center) <= radius
        && point.y >= center.y - height / 2.0
        && point.y <= center.y + height / 2.0
}
