use scape_core::{Direction, WorldPoint};

/// The two movement flags stored per tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Flag {
    /// Movement from this tile to `y + 1` is allowed.
    North = 0,
    /// Movement from this tile to `x + 1` is allowed.
    East = 1,
}

impl Flag {
    /// Both flags, in storage order.
    pub const ALL: [Flag; 2] = [Flag::North, Flag::East];

    /// Position of this flag on the grid's fourth axis.
    #[inline]
    pub const fn index(self) -> i32 {
        self as i32
    }
}

/// Eight-directional passability queries over a tile world.
///
/// Implementors supply the two stored flags, [`n`](Self::n) and
/// [`e`](Self::e). Every other direction is derived:
///
/// - south at `(x, y)` is north at `(x, y - 1)`;
/// - west at `(x, y)` is east at `(x - 1, y)`;
/// - a diagonal needs both composing cardinals at the source tile *and* the
///   matching cardinals on the two orthogonal neighbours, which rules out
///   corner-cutting.
///
/// South and west are never stored per tile. Each edge between two tiles is
/// a single bit owned by the tile to its south or west, so every move and its
/// reverse read the same bits. Ownership shows at region boundaries: the
/// edges along an open region's north and east sides are stored in that
/// region and may lead into an unallocated neighbour, while the edges along
/// its south and west sides belong to the neighbour and read as closed.
pub trait CollisionMap {
    /// Whether movement north from `(x, y, plane)` is open.
    fn n(&self, x: i32, y: i32, plane: i32) -> bool;

    /// Whether movement east from `(x, y, plane)` is open.
    fn e(&self, x: i32, y: i32, plane: i32) -> bool;

    fn s(&self, x: i32, y: i32, plane: i32) -> bool {
        self.n(x, y - 1, plane)
    }

    fn w(&self, x: i32, y: i32, plane: i32) -> bool {
        self.e(x - 1, y, plane)
    }

    fn ne(&self, x: i32, y: i32, plane: i32) -> bool {
        self.n(x, y, plane)
            && self.e(x, y + 1, plane)
            && self.e(x, y, plane)
            && self.n(x + 1, y, plane)
    }

    fn nw(&self, x: i32, y: i32, plane: i32) -> bool {
        self.n(x, y, plane)
            && self.w(x, y + 1, plane)
            && self.w(x, y, plane)
            && self.n(x - 1, y, plane)
    }

    fn se(&self, x: i32, y: i32, plane: i32) -> bool {
        self.s(x, y, plane)
            && self.e(x, y - 1, plane)
            && self.e(x, y, plane)
            && self.s(x + 1, y, plane)
    }

    fn sw(&self, x: i32, y: i32, plane: i32) -> bool {
        self.s(x, y, plane)
            && self.w(x, y - 1, plane)
            && self.w(x, y, plane)
            && self.s(x - 1, y, plane)
    }

    /// Whether a single step in `dir` from `(x, y, plane)` is allowed.
    fn can_move(&self, x: i32, y: i32, plane: i32, dir: Direction) -> bool {
        match dir {
            Direction::North => self.n(x, y, plane),
            Direction::NorthEast => self.ne(x, y, plane),
            Direction::East => self.e(x, y, plane),
            Direction::SouthEast => self.se(x, y, plane),
            Direction::South => self.s(x, y, plane),
            Direction::SouthWest => self.sw(x, y, plane),
            Direction::West => self.w(x, y, plane),
            Direction::NorthWest => self.nw(x, y, plane),
        }
    }

    fn can_move_at(&self, p: WorldPoint, dir: Direction) -> bool {
        self.can_move(p.x, p.y, p.plane, dir)
    }

    fn n_at(&self, p: WorldPoint) -> bool {
        self.n(p.x, p.y, p.plane)
    }

    fn e_at(&self, p: WorldPoint) -> bool {
        self.e(p.x, p.y, p.plane)
    }

    fn s_at(&self, p: WorldPoint) -> bool {
        self.s(p.x, p.y, p.plane)
    }

    fn w_at(&self, p: WorldPoint) -> bool {
        self.w(p.x, p.y, p.plane)
    }

    fn ne_at(&self, p: WorldPoint) -> bool {
        self.ne(p.x, p.y, p.plane)
    }

    fn nw_at(&self, p: WorldPoint) -> bool {
        self.nw(p.x, p.y, p.plane)
    }

    fn se_at(&self, p: WorldPoint) -> bool {
        self.se(p.x, p.y, p.plane)
    }

    fn sw_at(&self, p: WorldPoint) -> bool {
        self.sw(p.x, p.y, p.plane)
    }
}

impl<M: CollisionMap + ?Sized> CollisionMap for &M {
    fn n(&self, x: i32, y: i32, plane: i32) -> bool {
        (**self).n(x, y, plane)
    }

    fn e(&self, x: i32, y: i32, plane: i32) -> bool {
        (**self).e(x, y, plane)
    }
}
