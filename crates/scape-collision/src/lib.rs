//! Collision model for region-partitioned, multi-plane tile worlds.
//!
//! Each tile stores two movement flags, north and east, in a dense
//! [`BitSet4D`] per 64×64 region. The remaining six directions are derived
//! by the [`CollisionMap`] trait, with diagonal moves gated against
//! corner-cutting.
//!
//! [`GlobalCollisionMap`] keeps the regions sparse: only regions that were
//! created or loaded take memory, and everything else reads as blocked.
//! Regions serialize to a fixed binary record format described in
//! [`format`].

mod bitset;
mod error;
pub mod format;
mod global;
mod traits;

pub use bitset::BitSet4D;
pub use error::CollisionError;
pub use format::{PLANES, RECORD_SIZE, REGION_BYTES};
pub use global::{GlobalCollisionMap, REGION_COUNT};
pub use traits::{CollisionMap, Flag};
