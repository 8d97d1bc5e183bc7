//! Movement damping and soft AABB collision
//!
//! The collision model is deliberately loose: a circular broad-phase gate
//! throws out anything whose nearest edge is more than a few units from the
//! mover's center, then only shallow edge penetrations are pushed back out.
//! Deep overlaps are left alone for the tick, which gives the arcade feel
//! of sliding along walls instead of snapping.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{PROXIMITY_RADIUS, SHALLOW_PENETRATION, VELOCITY_DECAY};

/// Axis-aligned box: `pos` is the top-left corner, `size` is width/height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Closest point on (or in) the box to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }

    /// Whether `p` lies inside the box (edges inclusive)
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.pos.x && p.y >= self.pos.y && p.x <= self.max().x && p.y <= self.max().y
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.pos + offset, self.size)
    }
}

/// Damp one velocity component.
///
/// Anything that still rounds to a nonzero hundredth is multiplied by the
/// decay constant; everything else snaps to exactly zero.
#[inline]
pub fn damp_velocity(v: f32) -> f32 {
    if (v * 100.0).round() != 0.0 {
        v * VELOCITY_DECAY
    } else {
        0.0
    }
}

/// Damp both axes independently
#[inline]
pub fn damp_velocity_vec(v: Vec2) -> Vec2 {
    Vec2::new(damp_velocity(v.x), damp_velocity(v.y))
}

/// Strict overlap test: boxes that only share an edge do not overlap
#[inline]
pub fn overlaps(a: &Aabb, b: &Aabb) -> bool {
    a.pos.x + a.size.x > b.pos.x
        && b.pos.x + b.size.x > a.pos.x
        && a.pos.y + a.size.y > b.pos.y
        && b.pos.y + b.size.y > a.pos.y
}

/// Broad-phase gate: nearest point of `obstacle` within `PROXIMITY_RADIUS` of the mover's center
pub fn passes_proximity_gate(mover: &Aabb, obstacle: &Aabb) -> bool {
    let center = mover.center();
    center.distance(obstacle.closest_point(center)) <= PROXIMITY_RADIUS
}

/// Per-side penetration depths of `mover` into `obstacle`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Mover's bottom edge past the obstacle's top edge (push up to fix)
    pub up: f32,
    /// Obstacle's bottom edge past the mover's top edge (push down to fix)
    pub down: f32,
    /// Mover's right edge past the obstacle's left edge (push left to fix)
    pub left: f32,
    /// Obstacle's right edge past the mover's left edge (push right to fix)
    pub right: f32,
}

impl Penetration {
    pub fn between(mover: &Aabb, obstacle: &Aabb) -> Self {
        Self {
            up: mover.max().y - obstacle.pos.y,
            down: obstacle.max().y - mover.pos.y,
            left: mover.max().x - obstacle.pos.x,
            right: obstacle.max().x - mover.pos.x,
        }
    }
}

#[inline]
fn is_shallow(depth: f32) -> bool {
    depth > 0.0 && depth < SHALLOW_PENETRATION
}

/// Offset that pushes `mover` out of `obstacle` along every shallow side.
///
/// Returns zero when the pair fails the proximity gate, does not overlap,
/// or only penetrates deeply.
pub fn edge_penetration(mover: &Aabb, obstacle: &Aabb) -> Vec2 {
    if !passes_proximity_gate(mover, obstacle) || !overlaps(mover, obstacle) {
        return Vec2::ZERO;
    }

    let pen = Penetration::between(mover, obstacle);
    let mut offset = Vec2::ZERO;
    if is_shallow(pen.up) {
        offset.y -= pen.up;
    }
    if is_shallow(pen.down) {
        offset.y += pen.down;
    }
    if is_shallow(pen.left) {
        offset.x -= pen.left;
    }
    if is_shallow(pen.right) {
        offset.x += pen.right;
    }
    offset
}

/// Accumulated correction for `mover` against a set of obstacles
pub fn resolve_collisions<'a, I>(mover: &Aabb, obstacles: I) -> Vec2
where
    I: IntoIterator<Item = &'a Aabb>,
{
    obstacles
        .into_iter()
        .map(|obstacle| edge_penetration(mover, obstacle))
        .fold(Vec2::ZERO, |acc, offset| acc + offset)
}
