//! Dense 4-dimensional bit array.
//!
//! ## Bit layout
//!
//! The linear index of `(x, y, z, w)` is
//!
//! ```text
//! ((z * size_y + y) * size_x + x) * size_w + w
//! ```
//!
//! so `w` varies fastest and `z` slowest. Bits are packed MSB-first: index
//! `i` lives in byte `i / 8` under mask `0x80 >> (i % 8)`. Unused bits in the
//! final byte are always zero.

use std::fmt;
use std::io::{self, Write};

use crate::error::CollisionError;

/// A fixed-extent boolean array addressed by four axes.
#[derive(Clone, PartialEq, Eq)]
pub struct BitSet4D {
    size_x: usize,
    size_y: usize,
    size_z: usize,
    size_w: usize,
    bits: Vec<u8>,
}

impl BitSet4D {
    /// Create an all-false bit set with the given extents.
    pub fn new(size_x: usize, size_y: usize, size_z: usize, size_w: usize) -> Self {
        let len = size_x * size_y * size_z * size_w;
        Self {
            size_x,
            size_y,
            size_z,
            size_w,
            bits: vec![0; len.div_ceil(8)],
        }
    }

    /// Build a bit set from its packed representation.
    ///
    /// `bytes` must be exactly [`byte_len`](Self::byte_len) long for the given
    /// extents. Padding bits in the last byte are ignored.
    pub fn from_bytes(
        bytes: &[u8],
        size_x: usize,
        size_y: usize,
        size_z: usize,
        size_w: usize,
    ) -> Result<Self, CollisionError> {
        let mut set = Self::new(size_x, size_y, size_z, size_w);
        if bytes.len() != set.bits.len() {
            return Err(CollisionError::Format(format!(
                "expected {} bytes for a {}x{}x{}x{} bit set, got {}",
                set.bits.len(),
                size_x,
                size_y,
                size_z,
                size_w,
                bytes.len()
            )));
        }
        set.bits.copy_from_slice(bytes);
        set.clear_padding();
        Ok(set)
    }

    /// The packed representation (see the module docs for the layout).
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// An owned copy of the packed representation.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits.clone()
    }

    /// Write the packed representation to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.bits)
    }

    /// Extents as `[x, y, z, w]`.
    #[inline]
    pub fn dims(&self) -> [usize; 4] {
        [self.size_x, self.size_y, self.size_z, self.size_w]
    }

    /// Total number of addressable bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.size_x * self.size_y * self.size_z * self.size_w
    }

    /// Whether any extent is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the packed representation: `ceil(len / 8)`.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.bits.len()
    }

    /// Linear bit index for `(x, y, z, w)`, checking every axis.
    pub fn index(&self, x: i32, y: i32, z: i32, w: i32) -> Result<usize, CollisionError> {
        let inside = |v: i32, size: usize| v >= 0 && (v as usize) < size;
        if !(inside(x, self.size_x)
            && inside(y, self.size_y)
            && inside(z, self.size_z)
            && inside(w, self.size_w))
        {
            return Err(CollisionError::OutOfRange { x, y, z, w });
        }
        let (x, y, z, w) = (x as usize, y as usize, z as usize, w as usize);
        Ok(((z * self.size_y + y) * self.size_x + x) * self.size_w + w)
    }

    /// Read the bit at `(x, y, z, w)`.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32, w: i32) -> Result<bool, CollisionError> {
        let i = self.index(x, y, z, w)?;
        Ok(self.bits[i / 8] & mask(i) != 0)
    }

    /// Write the bit at `(x, y, z, w)`.
    #[inline]
    pub fn set(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        w: i32,
        value: bool,
    ) -> Result<(), CollisionError> {
        let i = self.index(x, y, z, w)?;
        if value {
            self.bits[i / 8] |= mask(i);
        } else {
            self.bits[i / 8] &= !mask(i);
        }
        Ok(())
    }

    /// Set every bit to `value`.
    pub fn set_all(&mut self, value: bool) {
        self.bits.fill(if value { 0xff } else { 0 });
        self.clear_padding();
    }

    /// Number of bits set to `true`.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    fn clear_padding(&mut self) {
        let used = self.len() % 8;
        if used != 0 {
            if let Some(last) = self.bits.last_mut() {
                *last &= !(0xffu8 >> used);
            }
        }
    }
}

#[inline]
fn mask(i: usize) -> u8 {
    0x80 >> (i % 8)
}

impl fmt::Debug for BitSet4D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitSet4D")
            .field("dims", &self.dims())
            .field("ones", &self.count_ones())
            .finish()
    }
}
