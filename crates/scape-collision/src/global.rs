use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use scape_core::WorldPoint;

use crate::bitset::BitSet4D;
use crate::error::CollisionError;
use crate::format::{self, PLANES, RECORD_SIZE};
use crate::traits::{CollisionMap, Flag};

/// Number of addressable region ids.
pub const REGION_COUNT: usize = 1 << 16;

// ---------------------------------------------------------------------------
// GlobalCollisionMap
// ---------------------------------------------------------------------------

/// Sparse collision store for the whole world.
///
/// Regions live in an arena indexed by region id and are only allocated on
/// request. Reads never allocate: a tile whose region is missing reports
/// every direction as blocked, and writes to it are dropped.
pub struct GlobalCollisionMap {
    regions: Vec<Option<Box<BitSet4D>>>,
    allocated: usize,
}

impl Default for GlobalCollisionMap {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalCollisionMap {
    /// Create a map with no regions; every tile is blocked.
    pub fn new() -> Self {
        Self {
            regions: (0..REGION_COUNT).map(|_| None).collect(),
            allocated: 0,
        }
    }

    /// Decode a region stream (see [`crate::format`]).
    pub fn from_bytes(data: &[u8]) -> Result<Self, CollisionError> {
        let mut map = Self::new();
        for (id, grid) in format::decode_records(data)? {
            map.insert(id, grid);
        }
        log::debug!(
            "loaded {} regions from {} bytes",
            map.region_count(),
            data.len()
        );
        Ok(map)
    }

    /// Decode a region stream read to the end of `reader`.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self, CollisionError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Load a region file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CollisionError> {
        let f = File::open(path.as_ref())?;
        Self::read_from(f)
    }

    /// Decode a region stream and merge it in, replacing regions with the
    /// same id. Nothing changes unless the whole stream decodes.
    pub fn merge_bytes(&mut self, data: &[u8]) -> Result<usize, CollisionError> {
        let records = format::decode_records(data)?;
        let n = records.len();
        for (id, grid) in records {
            self.insert(id, grid);
        }
        log::debug!("merged {n} regions");
        Ok(n)
    }

    /// Encode all allocated regions in ascending id order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.allocated * RECORD_SIZE);
        for (id, grid) in self.iter() {
            buf.extend_from_slice(&id.to_be_bytes());
            buf.extend_from_slice(grid.as_bytes());
        }
        buf
    }

    /// Encode all allocated regions in ascending id order into `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (id, grid) in self.iter() {
            format::write_record(writer, id, grid)?;
        }
        Ok(())
    }

    /// Write a region file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CollisionError> {
        let mut w = BufWriter::new(File::create(path.as_ref())?);
        self.write_to(&mut w)?;
        w.flush()?;
        log::debug!(
            "saved {} regions to {}",
            self.allocated,
            path.as_ref().display()
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Region management
    // -----------------------------------------------------------------------

    /// Allocate region `id` fully open on every plane, replacing any region
    /// already there.
    pub fn create_region(&mut self, id: u16) -> &mut BitSet4D {
        let mut grid = format::empty_region();
        grid.set_all(true);
        let slot = &mut self.regions[id as usize];
        if slot.is_none() {
            self.allocated += 1;
        }
        slot.insert(Box::new(grid))
    }

    /// Drop region `id`, returning its grid if it was allocated.
    pub fn remove_region(&mut self, id: u16) -> Option<BitSet4D> {
        let old = self.regions[id as usize].take()?;
        self.allocated -= 1;
        Some(*old)
    }

    /// Install `grid` as region `id`.
    ///
    /// Fails if `grid` does not have the region extents.
    pub fn insert_region(&mut self, id: u16, grid: BitSet4D) -> Result<(), CollisionError> {
        if grid.dims() != format::empty_region().dims() {
            return Err(CollisionError::Format(format!(
                "region grid has extents {:?}",
                grid.dims()
            )));
        }
        self.insert(id, grid);
        Ok(())
    }

    fn insert(&mut self, id: u16, grid: BitSet4D) {
        let slot = &mut self.regions[id as usize];
        if slot.is_none() {
            self.allocated += 1;
        }
        *slot = Some(Box::new(grid));
    }

    #[inline]
    pub fn region(&self, id: u16) -> Option<&BitSet4D> {
        self.regions[id as usize].as_deref()
    }

    #[inline]
    pub fn region_mut(&mut self, id: u16) -> Option<&mut BitSet4D> {
        self.regions[id as usize].as_deref_mut()
    }

    #[inline]
    pub fn has_region(&self, id: u16) -> bool {
        self.regions[id as usize].is_some()
    }

    /// Number of allocated regions.
    #[inline]
    pub fn region_count(&self) -> usize {
        self.allocated
    }

    /// Ids of allocated regions, ascending.
    pub fn region_ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.iter().map(|(id, _)| id)
    }

    /// Allocated regions with their ids, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &BitSet4D)> + '_ {
        self.regions
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_deref().map(|g| (i as u16, g)))
    }

    /// Drop every region.
    pub fn clear(&mut self) {
        self.regions.iter_mut().for_each(|r| *r = None);
        self.allocated = 0;
    }

    // -----------------------------------------------------------------------
    // Flag access
    // -----------------------------------------------------------------------

    /// Read one stored flag.
    ///
    /// Returns `false` for tiles outside the world, planes outside
    /// `0..PLANES` and regions that were never allocated.
    pub fn get(&self, x: i32, y: i32, plane: i32, flag: Flag) -> bool {
        let p = WorldPoint::new(x, y, plane);
        let Some(grid) = p.region_id().and_then(|id| self.region(id)) else {
            return false;
        };
        grid.get(p.region_x(), p.region_y(), plane, flag.index())
            .unwrap_or(false)
    }

    /// Write one stored flag.
    ///
    /// Returns `Ok(false)` without writing when the tile's region is not
    /// allocated. A plane outside `0..PLANES` is an error.
    pub fn set(
        &mut self,
        x: i32,
        y: i32,
        plane: i32,
        flag: Flag,
        value: bool,
    ) -> Result<bool, CollisionError> {
        if plane < 0 || plane as usize >= PLANES {
            return Err(CollisionError::OutOfRange {
                x,
                y,
                z: plane,
                w: flag.index(),
            });
        }
        let p = WorldPoint::new(x, y, plane);
        let Some(grid) = p.region_id().and_then(|id| self.region_mut(id)) else {
            log::warn!("ignoring write to {p}: region not allocated");
            return Ok(false);
        };
        grid.set(p.region_x(), p.region_y(), plane, flag.index(), value)?;
        Ok(true)
    }

    /// Set both stored flags of a tile.
    pub fn set_tile(
        &mut self,
        p: WorldPoint,
        north: bool,
        east: bool,
    ) -> Result<bool, CollisionError> {
        let wrote = self.set(p.x, p.y, p.plane, Flag::North, north)?;
        if wrote {
            self.set(p.x, p.y, p.plane, Flag::East, east)?;
        }
        Ok(wrote)
    }
}

impl CollisionMap for GlobalCollisionMap {
    #[inline]
    fn n(&self, x: i32, y: i32, plane: i32) -> bool {
        self.get(x, y, plane, Flag::North)
    }

    #[inline]
    fn e(&self, x: i32, y: i32, plane: i32) -> bool {
        self.get(x, y, plane, Flag::East)
    }
}

impl fmt::Debug for GlobalCollisionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalCollisionMap")
            .field("regions", &self.allocated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scape_core::Direction;

    fn open_region_zero() -> GlobalCollisionMap {
        let mut m = GlobalCollisionMap::new();
        m.create_region(0);
        m
    }

    #[test]
    fn unallocated_region_is_blocked_in_every_direction() {
        let m = GlobalCollisionMap::new();
        for d in Direction::ALL {
            assert!(!m.can_move(100, 100, 0, d));
        }
        assert_eq!(m.region_count(), 0);
    }

    #[test]
    fn created_region_is_open() {
        let m = open_region_zero();
        assert!(m.n(10, 10, 0));
        assert!(m.e(63, 63, 3));
        assert!(m.can_move(10, 10, 2, Direction::SouthWest));
    }

    #[test]
    fn region_edges_border_unallocated_space() {
        let m = open_region_zero();
        // West of x=0 is outside the world; east of x=63 is region 256.
        assert!(!m.w(0, 5, 0));
        assert!(!m.s(5, 0, 0));
        assert!(m.e(63, 5, 0));
        assert!(!m.e(64, 5, 0));
        assert!(!m.ne(63, 5, 0));
    }

    #[test]
    fn open_region_leaks_only_through_north_and_east_edges() {
        // Region 0 is open; region 256 (x in 64..128) and region 1
        // (y in 64..128) are not.
        let m = open_region_zero();
        assert!(m.e(63, 5, 0));
        assert!(m.w(64, 5, 0));
        assert!(!m.e(64, 5, 0) && !m.n(64, 5, 0) && !m.s(64, 5, 0));
        assert!(m.n(5, 63, 0) && m.s(5, 64, 0));

        // With only region 256 open, its west edge belongs to region 0.
        let mut east = GlobalCollisionMap::new();
        east.create_region(256);
        assert!(!east.w(64, 5, 0));
        assert!(!east.e(63, 5, 0));
        assert!(east.e(64, 5, 0));
    }

    #[test]
    fn planes_outside_range_are_blocked() {
        let m = open_region_zero();
        assert!(!m.n(1, 1, 4));
        assert!(!m.n(1, 1, -1));
    }

    #[test]
    fn set_writes_only_allocated_regions() {
        let mut m = open_region_zero();
        assert!(m.set(3, 4, 1, Flag::North, false).unwrap());
        assert!(!m.get(3, 4, 1, Flag::North));
        assert!(m.get(3, 4, 0, Flag::North));
        assert!(m.get(3, 4, 1, Flag::East));

        assert!(!m.set(200, 200, 0, Flag::North, true).unwrap());
        assert!(!m.has_region(WorldPoint::new(200, 200, 0).region_id().unwrap()));
        assert!(!m.set(-5, 0, 0, Flag::East, true).unwrap());
    }

    #[test]
    fn set_rejects_bad_plane() {
        let mut m = open_region_zero();
        assert!(matches!(
            m.set(1, 1, 4, Flag::East, false),
            Err(CollisionError::OutOfRange { z: 4, w: 1, .. })
        ));
    }

    #[test]
    fn set_tile_sets_both_flags() {
        let mut m = open_region_zero();
        let p = WorldPoint::new(7, 7, 0);
        assert!(m.set_tile(p, false, false).unwrap());
        assert!(!m.n_at(p) && !m.e_at(p));
        assert!(!m.set_tile(WorldPoint::new(999, 999, 0), true, true).unwrap());
    }

    #[test]
    fn region_ids_are_ascending() {
        let mut m = GlobalCollisionMap::new();
        m.create_region(0x3232);
        m.create_region(5);
        m.create_region(0x0100);
        assert_eq!(m.region_ids().collect::<Vec<_>>(), vec![5, 0x0100, 0x3232]);
        assert_eq!(m.region_count(), 3);
        assert!(m.remove_region(5).is_some());
        assert!(m.remove_region(5).is_none());
        assert_eq!(m.region_count(), 2);
        m.clear();
        assert_eq!(m.region_count(), 0);
    }

    #[test]
    fn create_region_replaces_existing() {
        let mut m = open_region_zero();
        m.set(1, 1, 0, Flag::North, false).unwrap();
        m.create_region(0);
        assert!(m.n(1, 1, 0));
        assert_eq!(m.region_count(), 1);
    }

    #[test]
    fn bytes_round_trip() {
        let mut m = GlobalCollisionMap::new();
        m.create_region(0x3232);
        m.create_region(1);
        m.set(3210, 3220, 2, Flag::East, false).unwrap();
        m.region_mut(1).unwrap().set_all(false);

        let bytes = m.to_bytes();
        assert_eq!(bytes.len(), 2 * RECORD_SIZE);
        // Ascending: region 1 first.
        assert_eq!(&bytes[..2], &[0, 1]);
        assert_eq!(&bytes[RECORD_SIZE..RECORD_SIZE + 2], &[0x32, 0x32]);

        let back = GlobalCollisionMap::from_bytes(&bytes).unwrap();
        assert_eq!(back.region_count(), 2);
        assert_eq!(back.region(1), m.region(1));
        assert_eq!(back.region(0x3232), m.region(0x3232));
        assert!(!back.e(3210, 3220, 2));
        assert_eq!(back.to_bytes(), bytes);
    }

    #[test]
    fn from_bytes_rejects_truncated_stream() {
        let mut bytes = open_region_zero().to_bytes();
        bytes.pop();
        assert!(matches!(
            GlobalCollisionMap::from_bytes(&bytes),
            Err(CollisionError::Format(_))
        ));
    }

    #[test]
    fn failed_merge_leaves_map_untouched() {
        let mut m = open_region_zero();
        let mut other = GlobalCollisionMap::new();
        other.create_region(0).set_all(false);
        other.create_region(9);
        let mut bytes = other.to_bytes();
        bytes.extend_from_slice(&[1, 2, 3]);

        assert!(m.merge_bytes(&bytes).is_err());
        assert_eq!(m.region_count(), 1);
        assert!(m.n(1, 1, 0));

        bytes.truncate(bytes.len() - 3);
        assert_eq!(m.merge_bytes(&bytes).unwrap(), 2);
        assert_eq!(m.region_count(), 2);
        assert!(!m.n(1, 1, 0));
    }

    #[test]
    fn insert_region_checks_extents() {
        let mut m = GlobalCollisionMap::new();
        assert!(m.insert_region(3, BitSet4D::new(8, 8, 1, 2)).is_err());
        assert!(m.insert_region(3, format::empty_region()).is_ok());
        assert!(m.has_region(3));
        // Region 3 covers x in 0..64, y in 192..256 and starts closed.
        assert!(!m.n(10, 3 << 6, 0));
    }

    fn temp_file(name: &str) -> std::path::PathBuf {
        let file = format!("scape-{}-{name}.bin", std::process::id());
        std::env::temp_dir().join(file)
    }

    #[test]
    fn save_then_open_round_trip() {
        let path = temp_file("save-open");
        let mut m = open_region_zero();
        m.create_region(0x3232);
        m.set(3, 4, 1, Flag::East, false).unwrap();
        m.save(&path).unwrap();

        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            2 * RECORD_SIZE as u64
        );
        let back = GlobalCollisionMap::open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(back.region_ids().collect::<Vec<_>>(), vec![0, 0x3232]);
        assert!(!back.e(3, 4, 1));
        assert!(back.n(3, 4, 1));
        assert_eq!(back.to_bytes(), m.to_bytes());
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let path = temp_file("missing");
        assert!(matches!(
            GlobalCollisionMap::open(&path),
            Err(CollisionError::Io(_))
        ));
    }

    #[test]
    fn open_rejects_truncated_file() {
        let path = temp_file("truncated");
        let mut bytes = open_region_zero().to_bytes();
        bytes.truncate(RECORD_SIZE - 10);
        std::fs::write(&path, &bytes).unwrap();
        let res = GlobalCollisionMap::open(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(res, Err(CollisionError::Format(_))));
    }

    #[test]
    fn read_from_reader() {
        let bytes = open_region_zero().to_bytes();
        let m = GlobalCollisionMap::read_from(io::Cursor::new(bytes)).unwrap();
        assert!(m.has_region(0));
    }
}
