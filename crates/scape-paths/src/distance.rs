use scape_core::WorldPoint;

/// Chebyshev (L∞) distance between two points on the same plane.
///
/// This is the length of a shortest path on an obstacle-free map, since
/// diagonal and cardinal steps cost the same.
#[inline]
pub fn chebyshev(a: WorldPoint, b: WorldPoint) -> Option<i32> {
    a.distance_to(b)
}
