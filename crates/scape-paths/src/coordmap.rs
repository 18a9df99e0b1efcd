use std::collections::HashMap;

use scape_collision::PLANES;
use scape_core::{Direction, REGION_SIZE, WorldPoint};

/// Code for a tile with no recorded predecessor.
pub const NONE: u8 = 0;
/// Code for a tile whose predecessor lives in the side table.
pub const CUSTOM: u8 = 1;

const REGION_CELLS: usize = (REGION_SIZE * REGION_SIZE) as usize * PLANES;

/// How a visited tile was reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Link {
    /// The search started here; there is no predecessor.
    Origin,
    /// The predecessor is the neighbour one step in this direction.
    Step(Direction),
    /// The predecessor is an arbitrary tile, e.g. the far end of a teleport.
    Custom(WorldPoint),
}

impl Link {
    /// Compact byte code: `CUSTOM` for [`Origin`](Link::Origin) and
    /// [`Custom`](Link::Custom), `2..=9` for steps N, NE, E, SE, S, SW, W, NW.
    pub const fn code(self) -> u8 {
        match self {
            Link::Origin | Link::Custom(_) => CUSTOM,
            Link::Step(d) => match d {
                Direction::North => 2,
                Direction::NorthEast => 3,
                Direction::East => 4,
                Direction::SouthEast => 5,
                Direction::South => 6,
                Direction::SouthWest => 7,
                Direction::West => 8,
                Direction::NorthWest => 9,
            },
        }
    }

    fn step_from_code(code: u8) -> Option<Direction> {
        let i = code.checked_sub(2)? as usize;
        Direction::ALL.get(i).copied()
    }
}

/// Sparse per-tile record of BFS predecessors.
///
/// Tiles are grouped by the same region ids as the collision store. Each
/// region holds one byte per tile and plane; custom predecessors go in a
/// side table. The start tile is stored as `CUSTOM` with no side-table
/// entry, so it counts as visited but has no predecessor.
///
/// Reads never allocate. Tiles outside the addressable world, or on planes
/// the region layout does not cover, are kept in a spill table.
#[derive(Debug, Default)]
pub struct PredecessorMap {
    regions: HashMap<u16, Box<[u8]>>,
    custom: HashMap<WorldPoint, WorldPoint>,
    spill: HashMap<WorldPoint, u8>,
    len: usize,
}

impl PredecessorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Region id and in-region index, if `p` fits the region layout.
    fn slot(p: WorldPoint) -> Option<(u16, usize)> {
        let id = p.region_id()?;
        if p.plane < 0 || p.plane as usize >= PLANES {
            return None;
        }
        let plane_offset = p.plane * REGION_SIZE * REGION_SIZE;
        let idx = p.region_x() + p.region_y() * REGION_SIZE + plane_offset;
        Some((id, idx as usize))
    }

    fn code(&self, p: WorldPoint) -> u8 {
        match Self::slot(p) {
            Some((id, idx)) => self.regions.get(&id).map_or(NONE, |r| r[idx]),
            None => self.spill.get(&p).copied().unwrap_or(NONE),
        }
    }

    /// Whether `p` has been visited.
    #[inline]
    pub fn contains(&self, p: WorldPoint) -> bool {
        self.code(p) != NONE
    }

    /// The link recorded for `p`, or `None` if `p` was never visited.
    pub fn link(&self, p: WorldPoint) -> Option<Link> {
        match self.code(p) {
            NONE => None,
            CUSTOM => match self.custom.get(&p) {
                Some(&q) => Some(Link::Custom(q)),
                None => Some(Link::Origin),
            },
            code => Link::step_from_code(code).map(Link::Step),
        }
    }

    /// The predecessor of `p`.
    ///
    /// `None` both for unvisited tiles and for the search origin; use
    /// [`contains`](Self::contains) to tell them apart.
    pub fn get(&self, p: WorldPoint) -> Option<WorldPoint> {
        match self.link(p)? {
            Link::Origin => None,
            Link::Step(d) => Some(p.step(d)),
            Link::Custom(q) => Some(q),
        }
    }

    /// Record how `p` was reached, overwriting any earlier link.
    pub fn put(&mut self, p: WorldPoint, link: Link) {
        match link {
            Link::Custom(q) => {
                self.custom.insert(p, q);
            }
            _ => {
                self.custom.remove(&p);
            }
        }

        let code = link.code();
        let old = match Self::slot(p) {
            Some((id, idx)) => {
                let region = self
                    .regions
                    .entry(id)
                    .or_insert_with(|| vec![NONE; REGION_CELLS].into_boxed_slice());
                std::mem::replace(&mut region[idx], code)
            }
            None => self.spill.insert(p, code).unwrap_or(NONE),
        };
        if old == NONE {
            self.len += 1;
        }
    }

    /// Number of visited tiles.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of regions that hold at least one visited tile.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Forget every visited tile.
    pub fn clear(&mut self) {
        self.regions.clear();
        self.custom.clear();
        self.spill.clear();
        self.len = 0;
    }
}
