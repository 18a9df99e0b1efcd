//! **scape-core**: core value types for the tile-world collision model.
//!
//! Provides [`WorldPoint`], the 3-axis tile coordinate, and [`Direction`],
//! the eight compass directions used by collision queries and search.

pub mod geom;

pub use geom::{Direction, REGION_SIZE, WORLD_SIZE, WorldPoint};
