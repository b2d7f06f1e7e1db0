//! Circle and beam geometry
//!
//! Every body in the arena is a circle, so overlap tests reduce to distance
//! checks. Beams are tested as a ray from an origin with a length cutoff.

use glam::Vec2;

/// Result of a circle-circle contact check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Distance between centres
    pub dist: f32,
    /// Unit vector from `a` toward `b` (zero when centres coincide)
    pub normal: Vec2,
    /// Overlap depth, positive when touching
    pub penetration: f32,
}

impl Contact {
    pub fn hit(&self) -> bool {
        self.penetration > 0.0
    }
}

/// Contact between circle `a` and circle `b`
pub fn circle_contact(a: Vec2, ra: f32, b: Vec2, rb: f32) -> Contact {
    let delta = b - a;
    let dist = delta.length();
    Contact {
        dist,
        normal: delta.normalize_or_zero(),
        penetration: ra + rb - dist,
    }
}

/// Strict overlap test matching `dist < ra + rb`
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

/// Decompose `point` relative to a ray: distance along it and
/// perpendicular distance from it
pub fn ray_projection(origin: Vec2, angle: f32, point: Vec2) -> (f32, f32) {
    let dir = Vec2::from_angle(angle);
    let rel = point - origin;
    let along = rel.dot(dir);
    let perp = rel.perp_dot(dir).abs();
    (along, perp)
}

/// True when a circle at `point` is hit by a beam of `half_width` and `range`
pub fn beam_hits_circle(
    origin: Vec2,
    angle: f32,
    range: f32,
    half_width: f32,
    point: Vec2,
    radius: f32,
) -> bool {
    let (along, perp) = ray_projection(origin, angle, point);
    (0.0..=range).contains(&along) && perp < radius + half_width
}

/// Point at `dist` from `center` in direction `angle`
#[inline]
pub fn offset(center: Vec2, angle: f32, dist: f32) -> Vec2 {
    center + Vec2::from_angle(angle) * dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_circle_contact_touching() {
        let c = circle_contact(Vec2::ZERO, 10.0, Vec2::new(15.0, 0.0), 10.0);
        assert!(c.hit());
        assert_relative_eq!(c.penetration, 5.0);
        assert_eq!(c.normal, Vec2::X);
    }

    #[test]
    fn test_circle_contact_apart() {
        let c = circle_contact(Vec2::ZERO, 5.0, Vec2::new(20.0, 0.0), 5.0);
        assert!(!c.hit());
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(20.0, 0.0), 5.0));
    }

    #[test]
    fn test_overlap_is_strict() {
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.9, 0.0), 5.0));
    }

    #[test]
    fn test_ray_projection() {
        let (along, perp) = ray_projection(Vec2::ZERO, 0.0, Vec2::new(30.0, -4.0));
        assert_relative_eq!(along, 30.0);
        assert_relative_eq!(perp, 4.0);
    }

    #[test]
    fn test_beam_ignores_targets_behind_origin() {
        assert!(!beam_hits_circle(Vec2::ZERO, 0.0, 100.0, 4.0, Vec2::new(-20.0, 0.0), 10.0));
        assert!(beam_hits_circle(Vec2::ZERO, 0.0, 100.0, 4.0, Vec2::new(50.0, 12.0), 10.0));
        assert!(!beam_hits_circle(Vec2::ZERO, 0.0, 100.0, 4.0, Vec2::new(150.0, 0.0), 10.0));
    }

    #[test]
    fn test_beam_vertical() {
        assert!(beam_hits_circle(Vec2::ZERO, FRAC_PI_2, 100.0, 2.0, Vec2::new(1.0, 60.0), 1.0));
    }
}
