//! Axis-aligned bounding box
//!
//! Boxes carry a depth (`min_z`) used only for draw ordering; all overlap
//! tests are two dimensional. Boxes are immutable values: every operation
//! returns a new instance.

use crate::foundation::math::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box for spatial queries
///
/// Invariant: `min_x <= max_x` and `min_y <= max_y`. Zero-area (point) boxes
/// are allowed. Malformed boxes are a caller contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    min_x: f64,
    min_y: f64,
    min_z: f64,
    max_x: f64,
    max_y: f64,
}

impl Aabb {
    /// Create a new AABB from its min corner, depth and max corner
    pub const fn new(min_x: f64, min_y: f64, min_z: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            min_z,
            max_x,
            max_y,
        }
    }

    /// Create an AABB from two corners at depth zero
    pub fn from_corners(min: Vec2, max: Vec2) -> Self {
        Self::new(min.x, min.y, 0.0, max.x, max.y)
    }

    /// Create an AABB centered at a point with given half extents
    pub fn from_center_extents(center: Vec2, extents: Vec2) -> Self {
        Self::from_corners(center - extents, center + extents)
    }

    /// Create a zero-area box at a point
    pub const fn point(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z, x, y)
    }

    /// Minimum x
    pub const fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Minimum y
    pub const fn min_y(&self) -> f64 {
        self.min_y
    }

    /// Depth
    pub const fn min_z(&self) -> f64 {
        self.min_z
    }

    /// Maximum x
    pub const fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Maximum y
    pub const fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Minimum corner
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.min_x, self.min_y)
    }

    /// Maximum corner
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.max_x, self.max_y)
    }

    /// Width along x
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height along y
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec2 {
        (self.min() + self.max()) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec2 {
        (self.max() - self.min()) * 0.5
    }

    /// Translate by `(dx, dy)`; depth is untouched
    #[must_use]
    pub fn moved(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.min_x + dx,
            self.min_y + dy,
            self.min_z,
            self.max_x + dx,
            self.max_y + dy,
        )
    }

    /// Grow symmetrically by `dx` on each side along x and `dy` along y.
    ///
    /// `dz` pushes the depth back. Gameplay code uses this to build a
    /// slightly larger sensing region around a box.
    #[must_use]
    pub fn expand(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(
            self.min_x - dx,
            self.min_y - dy,
            self.min_z - dz,
            self.max_x + dx,
            self.max_y + dy,
        )
    }

    /// Grow each side independently
    #[must_use]
    pub fn expand_sides(&self, left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self::new(
            self.min_x - left,
            self.min_y - bottom,
            self.min_z,
            self.max_x + right,
            self.max_y + top,
        )
    }

    /// Closed intersection test: boxes touching along an edge or corner
    /// intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Check if this AABB fully contains another
    pub fn contains(&self, other: &Self) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }

    /// Smallest box containing both boxes; keeps the nearer depth
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.min_z.min(other.min_z),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_width_height() {
        let aabb = Aabb::new(1.0, 2.0, 0.0, 4.0, 7.0);
        assert_relative_eq!(aabb.width(), 3.0);
        assert_relative_eq!(aabb.height(), 5.0);
    }

    #[test]
    fn test_move_leaves_depth() {
        let aabb = Aabb::new(0.0, 0.0, 3.0, 1.0, 1.0).moved(5.0, -2.0);
        assert_eq!(aabb, Aabb::new(5.0, -2.0, 3.0, 6.0, -1.0));
    }

    #[test]
    fn test_expand_symmetric() {
        let aabb = Aabb::new(0.0, 0.0, 0.0, 2.0, 2.0).expand(1.0, 0.5, 0.0);
        assert_eq!(aabb, Aabb::new(-1.0, -0.5, 0.0, 3.0, 2.5));
    }

    #[test]
    fn test_expand_sides() {
        let aabb = Aabb::new(0.0, 0.0, 0.0, 2.0, 2.0).expand_sides(0.0, 1.0, 2.0, 0.0);
        assert_eq!(aabb, Aabb::new(0.0, -1.0, 0.0, 4.0, 2.0));
    }

    #[test]
    fn test_touching_edges_intersect() {
        let a = Aabb::new(0.0, 0.0, 0.0, 1.0, 1.0);
        let b = Aabb::new(1.0, 0.0, 0.0, 2.0, 1.0);
        let corner = Aabb::new(1.0, 1.0, 0.0, 2.0, 2.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(a.intersects(&corner));
    }

    #[test]
    fn test_separated_boxes_do_not_intersect() {
        let a = Aabb::new(0.0, 0.0, 0.0, 1.0, 1.0);
        let b = Aabb::new(1.5, 0.0, 0.0, 2.0, 1.0);
        let above = Aabb::new(0.0, 1.01, 0.0, 1.0, 2.0);
        assert!(!a.intersects(&b));
        assert!(!a.intersects(&above));
    }

    #[test]
    fn test_point_box_intersects_containing_box() {
        let point = Aabb::point(0.5, 0.5, 0.0);
        let a = Aabb::new(0.0, 0.0, 0.0, 1.0, 1.0);
        assert!(point.intersects(&a));
        assert!(point.intersects(&point));
        assert!(a.contains(&point));
    }

    #[test]
    fn test_union() {
        let a = Aabb::new(0.0, 0.0, 1.0, 1.0, 1.0);
        let b = Aabb::new(3.0, -2.0, 0.0, 4.0, 0.5);
        assert_eq!(a.union(&b), Aabb::new(0.0, -2.0, 0.0, 4.0, 1.0));
    }

    #[test]
    fn test_center_extents_round_trip() {
        let aabb = Aabb::from_center_extents(Vec2::new(2.0, 3.0), Vec2::new(1.0, 0.5));
        assert_eq!(aabb, Aabb::new(1.0, 2.5, 0.0, 3.0, 3.5));
        assert_relative_eq!(aabb.center().x, 2.0);
        assert_relative_eq!(aabb.extents().y, 0.5);
    }
}
