use scape_collision::CollisionMap;
use scape_core::{Direction, WorldPoint};

/// Cached neighbour computation helper.
///
/// Enumerates the tiles reachable in one step from a point, as allowed by a
/// [`CollisionMap`], in [`Direction::SEARCH_ORDER`].
pub struct Neighbors {
    buf: Vec<(Direction, WorldPoint)>,
}

impl Default for Neighbors {
    fn default() -> Self {
        Self::new()
    }
}

impl Neighbors {
    /// Create a new `Neighbors` helper.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(8),
        }
    }

    /// Return the 8-directional neighbours of `p` that `map` lets us step
    /// to, each paired with the direction taken.
    pub fn passable<M: CollisionMap + ?Sized>(
        &mut self,
        map: &M,
        p: WorldPoint,
    ) -> &[(Direction, WorldPoint)] {
        self.buf.clear();
        for d in Direction::SEARCH_ORDER {
            if map.can_move_at(p, d) {
                self.buf.push((d, p.step(d)));
            }
        }
        &self.buf
    }
}
