//! Breadth-first pathfinding over region-partitioned collision maps.
//!
//! [`Pathfinder`] searches any [`CollisionMap`](scape_collision::CollisionMap)
//! from a start tile to a target tile, treating all eight moves as unit
//! cost. Visited tiles are tracked in a [`PredecessorMap`], which shares the
//! collision store's region partitioning and stores one byte per tile.
//!
//! ```
//! use scape_collision::GlobalCollisionMap;
//! use scape_core::WorldPoint;
//! use scape_paths::find_path;
//!
//! let mut map = GlobalCollisionMap::new();
//! map.create_region(0);
//! let path = find_path(&map, WorldPoint::new(0, 0, 0), WorldPoint::new(3, 2, 0));
//! assert_eq!(path.len(), 4);
//! ```

mod coordmap;
mod distance;
mod neighbors;
mod pathfinder;

pub use coordmap::{CUSTOM, Link, NONE, PredecessorMap};
pub use distance::chebyshev;
pub use neighbors::Neighbors;
pub use pathfinder::{Pathfinder, SearchState, find_path};
