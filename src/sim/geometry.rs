//! Line segment geometry for shell collision
//!
//! Shell flight is checked one step at a time: the straight segment between the
//! previous and current shell position is intersected with terrain edges, tank
//! hull edges and the floor line. Screen coordinates, y grows downward.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::to_vec2;

const EPSILON: f32 = 1e-6;

/// A directed line segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Segment between two pixel positions
    pub fn from_pixels(start: IVec2, end: IVec2) -> Self {
        Self::new(to_vec2(start), to_vec2(end))
    }

    #[inline]
    pub fn delta(&self) -> Vec2 {
        self.end - self.start
    }

    /// Zero-length segments never intersect anything
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.delta().length_squared() < EPSILON
    }

    /// Normal pointing below a segment that runs left to right
    #[inline]
    pub fn lower_normal(&self) -> Vec2 {
        let d = self.delta();
        Vec2::new(-d.y, d.x)
    }
}

/// Intersection point of two segments, if any.
///
/// Overlapping collinear segments report the first shared point along `a`.
pub fn segment_intersection(a: &Segment, b: &Segment) -> Option<Vec2> {
    if a.is_degenerate() || b.is_degenerate() {
        return None;
    }

    let r = a.delta();
    let s = b.delta();
    let qp = b.start - a.start;
    let denom = r.perp_dot(s);

    if denom.abs() < EPSILON {
        // Parallel: only collinear overlap counts
        if qp.perp_dot(r).abs() > EPSILON * r.length().max(1.0) {
            return None;
        }
        let rr = r.dot(r);
        let t0 = qp.dot(r) / rr;
        let t1 = t0 + s.dot(r) / rr;
        let lo = t0.min(t1).max(0.0);
        let hi = t0.max(t1).min(1.0);
        if lo > hi + EPSILON {
            return None;
        }
        return Some(a.start + r * lo);
    }

    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;
    let range = -EPSILON..=1.0 + EPSILON;
    if range.contains(&t) && range.contains(&u) {
        Some(a.start + r * t.clamp(0.0, 1.0))
    } else {
        None
    }
}

/// Where a vertical line at `x` crosses a circle, as (upper y, lower y).
///
/// Returns `None` when the line misses the circle or the radius is not positive.
pub fn vertical_probe_circle(x: f32, center: Vec2, radius: f32) -> Option<(f32, f32)> {
    if radius <= 0.0 {
        return None;
    }
    let dx = x - center.x;
    if dx.abs() > radius {
        return None;
    }
    let dy = (radius * radius - dx * dx).max(0.0).sqrt();
    Some((center.y - dy, center.y + dy))
}
