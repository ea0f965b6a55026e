use serde::{Deserialize, Serialize};

/// 2D vector in virtual pixels. The y axis points down, matching the
/// coordinate system of the level documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box stored center-based, the way every entity
/// carries its footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    center: Vec2,
    half_width: f32,
    half_height: f32,
}

impl Aabb {
    pub fn from_center_size(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            half_width: width / 2.0,
            half_height: height / 2.0,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.half_width
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.half_width
    }

    pub fn top(&self) -> f32 {
        self.center.y - self.half_height
    }

    pub fn bottom(&self) -> f32 {
        self.center.y + self.half_height
    }

    /// Separating-axis overlap test. Exact edge contact counts as an
    /// overlap; the resolution step treats that zero-depth contact as
    /// nothing to push out of.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.right() < other.left()
            || self.left() > other.right()
            || self.top() > other.bottom()
            || self.bottom() < other.top())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> Aabb {
        Aabb::from_center_size(Vec2::new(x, y), size, size)
    }

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            (square(0.0, 0.0, 32.0), square(10.0, 10.0, 32.0)),
            (square(0.0, 0.0, 32.0), square(100.0, 0.0, 32.0)),
            (square(0.0, 0.0, 32.0), square(0.0, 31.0, 32.0)),
            (square(-5.0, 7.0, 16.0), square(5.0, -7.0, 48.0)),
        ];
        for (a, b) in cases {
            assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }

    #[test]
    fn separated_boxes_do_not_overlap() {
        let a = square(0.0, 0.0, 32.0);
        assert!(!a.overlaps(&square(100.0, 0.0, 32.0)));
        assert!(!a.overlaps(&square(-100.0, 0.0, 32.0)));
        assert!(!a.overlaps(&square(0.0, 100.0, 32.0)));
        assert!(!a.overlaps(&square(0.0, -100.0, 32.0)));
    }

    #[test]
    fn intersecting_boxes_overlap() {
        let a = square(0.0, 0.0, 32.0);
        assert!(a.overlaps(&square(20.0, 0.0, 32.0)));
        assert!(a.overlaps(&square(0.0, -20.0, 32.0)));
        assert!(a.overlaps(&a));
    }

    #[test]
    fn edge_contact_counts_as_overlap_only_when_strictly_inside() {
        let a = square(0.0, 0.0, 32.0);
        // Shared edge at x = 16: the strict inequalities in overlaps()
        // treat touching as overlapping, but resolution ignores it.
        let touching = square(32.0, 0.0, 32.0);
        assert!(a.overlaps(&touching));
        let past = square(33.0, 0.0, 32.0);
        assert!(!a.overlaps(&past));
    }

    #[test]
    fn aabb_edges_derive_from_center_and_half_size() {
        let b = Aabb::from_center_size(Vec2::new(100.0, 50.0), 40.0, 20.0);
        assert_eq!(b.left(), 80.0);
        assert_eq!(b.right(), 120.0);
        assert_eq!(b.top(), 40.0);
        assert_eq!(b.bottom(), 60.0);
    }
}
