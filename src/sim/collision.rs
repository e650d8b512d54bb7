//! Collision detection between oriented bodies
//!
//! Two stages: a bounding-circle reject that settles most pairs in O(1), then a
//! separating-axis test on the oriented bounding quads. Touching quads (zero
//! overlap on some axis) do not collide.

use glam::Vec2;

use super::body::KinematicBody;
use crate::{NORM_EPSILON, rotate};

/// A body's bounding box rotated into world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedQuad {
    /// Corners in winding order
    pub corners: [Vec2; 4],
}

impl OrientedQuad {
    /// Build the quad of a body from its size, orientation and position
    pub fn of(body: &KinematicBody) -> Self {
        let h = body.half_extents();
        let local = [
            Vec2::new(-h.x, -h.y),
            Vec2::new(h.x, -h.y),
            Vec2::new(h.x, h.y),
            Vec2::new(-h.x, h.y),
        ];
        Self {
            corners: local.map(|c| body.position + rotate(c, body.orientation)),
        }
    }

    /// Unit normals of the quad's edges (degenerate edges are skipped)
    fn edge_normals(&self) -> impl Iterator<Item = Vec2> + '_ {
        (0..4).filter_map(move |i| {
            let edge = self.corners[(i + 1) % 4] - self.corners[i];
            let len = edge.length();
            (len > NORM_EPSILON).then(|| Vec2::new(-edge.y, edge.x) / len)
        })
    }

    /// Projection interval `(min, max)` on an axis
    pub fn project(&self, axis: Vec2) -> (f32, f32) {
        self.corners
            .iter()
            .map(|c| c.dot(axis))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
                (lo.min(d), hi.max(d))
            })
    }
}

/// Bounding circles overlap (or touch)
#[inline]
pub fn circles_overlap(a: &KinematicBody, b: &KinematicBody) -> bool {
    a.position.distance(b.position) <= a.radius + b.radius
}

/// Is `axis` a separating axis for the two quads?
fn separates(axis: Vec2, a: &OrientedQuad, b: &OrientedQuad) -> bool {
    let (min_a, max_a) = a.project(axis);
    let (min_b, max_b) = b.project(axis);
    max_a <= min_b || max_b <= min_a
}

/// Separating-axis test on two convex quads
pub fn quads_intersect(a: &OrientedQuad, b: &OrientedQuad) -> bool {
    !a.edge_normals()
        .chain(b.edge_normals())
        .any(|axis| separates(axis, a, b))
}

/// Do two oriented bodies overlap?
///
/// Bodies with a (near) zero bounding radius never collide.
pub fn collides(a: &KinematicBody, b: &KinematicBody) -> bool {
    if a.radius < NORM_EPSILON || b.radius < NORM_EPSILON {
        return false;
    }
    if !circles_overlap(a, b) {
        return false;
    }
    quads_intersect(&OrientedQuad::of(a), &OrientedQuad::of(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_4;

    fn square(size: f32, x: f32, y: f32) -> KinematicBody {
        KinematicBody::new(Vec2::splat(size)).at(Vec2::new(x, y))
    }

    #[test]
    fn test_identical_bodies_collide() {
        let a = square(10.0, 50.0, 50.0);
        let b = square(10.0, 50.0, 50.0);
        assert!(collides(&a, &b));
    }

    #[test]
    fn test_shared_edge_does_not_collide() {
        let a = square(10.0, 0.0, 0.0);
        let b = square(10.0, 10.0, 0.0);
        assert!(circles_overlap(&a, &b));
        assert!(!collides(&a, &b));
        let c = square(10.0, 0.0, 10.0);
        assert!(!collides(&a, &c));
    }

    #[test]
    fn test_small_overlap_collides() {
        let a = square(10.0, 0.0, 0.0);
        let b = square(10.0, 9.5, 3.0);
        assert!(collides(&a, &b));
    }

    #[test]
    fn test_coarse_pass_but_axis_separates() {
        // Circles overlap near the corner but the quads do not.
        let a = square(10.0, 0.0, 0.0);
        let mut b = square(10.0, 10.2, 9.0);
        assert!(circles_overlap(&a, &b));
        assert!(!collides(&a, &b));
        b.orientation = FRAC_PI_4;
        b.position = Vec2::new(9.0, 9.0);
        assert!(!collides(&a, &b));
        b.position = Vec2::new(7.0, 7.0);
        assert!(collides(&a, &b));
    }

    #[test]
    fn test_degenerate_body_never_collides() {
        let a = square(10.0, 0.0, 0.0);
        let b = KinematicBody::new(Vec2::ZERO);
        assert!(!collides(&a, &b));
        assert!(!collides(&b, &b.clone()));
    }

    #[test]
    fn test_thin_body_projection_is_finite() {
        let a = KinematicBody::new(Vec2::new(10.0, 0.0));
        let quad = OrientedQuad::of(&a);
        let (lo, hi) = quad.project(Vec2::X);
        assert_eq!((lo, hi), (-5.0, 5.0));
        assert_eq!(quad.edge_normals().count(), 2);
    }

    proptest! {
        #[test]
        fn prop_coarse_reject_is_sound(
            size_a in 1.0f32..50.0,
            size_b in 1.0f32..50.0,
            angle in 0.0f32..std::f32::consts::TAU,
            extra in 0.01f32..100.0,
            rot_a in -3.0f32..3.0,
            rot_b in -3.0f32..3.0,
        ) {
            let mut a = square(size_a, 0.0, 0.0);
            let mut b = square(size_b, 0.0, 0.0);
            a.orientation = rot_a;
            b.orientation = rot_b;
            let dist = a.radius + b.radius + extra;
            b.position = crate::rotate(Vec2::new(dist, 0.0), angle);
            prop_assert!(!collides(&a, &b));
        }

        #[test]
        fn prop_collision_is_symmetric(
            x in -30.0f32..30.0,
            y in -30.0f32..30.0,
            rot in -3.0f32..3.0,
        ) {
            let a = square(20.0, 0.0, 0.0);
            let mut b = KinematicBody::new(Vec2::new(30.0, 8.0)).at(Vec2::new(x, y));
            b.orientation = rot;
            prop_assert_eq!(collides(&a, &b), collides(&b, &a));
        }
    }
}
