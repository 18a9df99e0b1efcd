//! Geometry primitives: [`WorldPoint`] and [`Direction`].
//!
//! The world is a stack of planes, each a 16384×16384 tile grid cut into
//! 64×64 regions. X grows east, Y grows north.

use std::fmt;

/// log2 of the region edge length.
pub const REGION_SHIFT: i32 = 6;
/// Edge length of a region, in tiles.
pub const REGION_SIZE: i32 = 1 << REGION_SHIFT;
/// Number of regions along each horizontal axis.
pub const REGIONS_PER_AXIS: i32 = 256;
/// Edge length of the addressable world, in tiles.
pub const WORLD_SIZE: i32 = REGION_SIZE * REGIONS_PER_AXIS;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the eight compass directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All eight directions, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The four cardinal directions, clockwise from north.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Order in which breadth-first search expands neighbours.
    ///
    /// Changing it changes which of several equal-length paths is returned.
    pub const SEARCH_ORDER: [Direction; 8] = [
        Direction::West,
        Direction::East,
        Direction::South,
        Direction::North,
        Direction::SouthWest,
        Direction::SouthEast,
        Direction::NorthWest,
        Direction::NorthEast,
    ];

    /// X component of a unit step.
    #[inline]
    pub const fn dx(self) -> i32 {
        match self {
            Direction::NorthEast | Direction::East | Direction::SouthEast => 1,
            Direction::SouthWest | Direction::West | Direction::NorthWest => -1,
            Direction::North | Direction::South => 0,
        }
    }

    /// Y component of a unit step.
    #[inline]
    pub const fn dy(self) -> i32 {
        match self {
            Direction::NorthWest | Direction::North | Direction::NorthEast => 1,
            Direction::SouthWest | Direction::South | Direction::SouthEast => -1,
            Direction::East | Direction::West => 0,
        }
    }

    /// The direction pointing the other way.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    /// Whether this is one of the four diagonal directions.
    #[inline]
    pub const fn is_diagonal(self) -> bool {
        self.dx() != 0 && self.dy() != 0
    }

    /// Short compass abbreviation (`"N"`, `"NE"`, ...).
    pub const fn abbrev(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::NorthEast => "NE",
            Direction::East => "E",
            Direction::SouthEast => "SE",
            Direction::South => "S",
            Direction::SouthWest => "SW",
            Direction::West => "W",
            Direction::NorthWest => "NW",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

// ---------------------------------------------------------------------------
// WorldPoint
// ---------------------------------------------------------------------------

/// A tile position: horizontal `x`/`y` plus a vertical `plane`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPoint {
    pub x: i32,
    pub y: i32,
    pub plane: i32,
}

impl WorldPoint {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32, plane: i32) -> Self {
        Self { x, y, plane }
    }

    /// Rebuild a point from a region id and an offset inside that region.
    #[inline]
    pub const fn from_region(region_id: u16, region_x: i32, region_y: i32, plane: i32) -> Self {
        let rid = region_id as i32;
        Self {
            x: ((rid >> 8) << REGION_SHIFT) + region_x,
            y: ((rid & 0xff) << REGION_SHIFT) + region_y,
            plane,
        }
    }

    /// Return a point shifted by `dx` along x.
    #[inline]
    pub const fn dx(self, dx: i32) -> Self {
        Self::new(self.x + dx, self.y, self.plane)
    }

    /// Return a point shifted by `dy` along y.
    #[inline]
    pub const fn dy(self, dy: i32) -> Self {
        Self::new(self.x, self.y + dy, self.plane)
    }

    /// Return a point shifted by `dz` planes.
    #[inline]
    pub const fn dz(self, dz: i32) -> Self {
        Self::new(self.x, self.y, self.plane + dz)
    }

    /// Neighbour one step away in `dir`, on the same plane.
    #[inline]
    pub const fn step(self, dir: Direction) -> Self {
        Self::new(self.x + dir.dx(), self.y + dir.dy(), self.plane)
    }

    /// Whether the horizontal position lies inside the addressable world.
    #[inline]
    pub const fn in_world(self) -> bool {
        self.x >= 0 && self.x < WORLD_SIZE && self.y >= 0 && self.y < WORLD_SIZE
    }

    /// Id of the 64×64 region containing this point: `(x>>6)<<8 | (y>>6)`.
    ///
    /// `None` outside the addressable world, where no region exists.
    #[inline]
    pub const fn region_id(self) -> Option<u16> {
        if !self.in_world() {
            return None;
        }
        Some((((self.x >> REGION_SHIFT) << 8) | (self.y >> REGION_SHIFT)) as u16)
    }

    /// X offset inside the enclosing region.
    #[inline]
    pub const fn region_x(self) -> i32 {
        self.x & (REGION_SIZE - 1)
    }

    /// Y offset inside the enclosing region.
    #[inline]
    pub const fn region_y(self) -> i32 {
        self.y & (REGION_SIZE - 1)
    }

    /// Chebyshev distance to `other`, or `None` when the planes differ.
    #[inline]
    pub fn distance_to(self, other: WorldPoint) -> Option<i32> {
        (self.plane == other.plane).then(|| self.distance_to_2d(other))
    }

    /// Chebyshev distance ignoring planes.
    #[inline]
    pub fn distance_to_2d(self, other: WorldPoint) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// The direction leading from `self` to an adjacent `other`, if any.
    pub fn direction_to(self, other: WorldPoint) -> Option<Direction> {
        if self.plane != other.plane {
            return None;
        }
        let (dx, dy) = (other.x - self.x, other.y - self.y);
        Direction::ALL
            .into_iter()
            .find(|d| d.dx() == dx && d.dy() == dy)
    }
}

impl PartialOrd for WorldPoint {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WorldPoint {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.plane
            .cmp(&other.plane)
            .then(self.y.cmp(&other.y))
            .then(self.x.cmp(&other.x))
    }
}

impl fmt::Display for WorldPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.plane)
    }
}

impl From<(i32, i32, i32)> for WorldPoint {
    fn from((x, y, plane): (i32, i32, i32)) -> Self {
        Self::new(x, y, plane)
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn world_point_round_trip() {
        let p = WorldPoint::new(3200, 3200, 2);
        let json = serde_json::to_string(&p).unwrap();
        let back: WorldPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
