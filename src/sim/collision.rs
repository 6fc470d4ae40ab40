//! Axis-aligned bounding boxes and overlap tests
//!
//! Every object on the field is a rectangle anchored at its bottom-left
//! corner. Hitboxes are shrunk around the center so grazing contact with
//! the corners of a sprite does not count.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from a bottom-left position and a size
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Scale the box around its center (factor 1.0 = unchanged)
    pub fn shrunk(&self, factor: f32) -> Self {
        let half = self.size() * 0.5 * factor.clamp(0.0, 1.0);
        let c = self.center();
        Self {
            min: c - half,
            max: c + half,
        }
    }

    /// Strict overlap: boxes that merely touch do not overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Clamp a bottom-left position so a box of `size` stays inside `[0, field]`
#[inline]
pub fn clamp_to_field(pos: Vec2, size: Vec2, field: Vec2) -> Vec2 {
    pos.clamp(Vec2::ZERO, (field - size).max(Vec2::ZERO))
}
