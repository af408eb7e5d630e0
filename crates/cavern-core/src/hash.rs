//! Content hashing for grid snapshots.
//!
//! Uses FNV-1a for fast, deterministic hashing. These hashes are not
//! cryptographically secure; they key short-lived result caches.

use crate::cell::Cell;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Incremental FNV-1a hasher.
#[derive(Clone, Copy, Debug)]
pub struct Fnv1a(u64);

impl Fnv1a {
    /// Start a new hash at the offset basis.
    pub fn new() -> Self {
        Self(FNV_OFFSET)
    }

    /// Feed a single byte.
    #[inline]
    pub fn byte(&mut self, byte: u8) {
        self.0 = (self.0 ^ u64::from(byte)).wrapping_mul(FNV_PRIME);
    }

    /// Feed a u32 as 4 LE bytes.
    #[inline]
    pub fn u32(&mut self, v: u32) {
        for b in v.to_le_bytes() {
            self.byte(b);
        }
    }

    /// Feed a u64 as 8 LE bytes.
    #[inline]
    pub fn u64(&mut self, v: u64) {
        for b in v.to_le_bytes() {
            self.byte(b);
        }
    }

    /// Current hash value.
    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for Fnv1a {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash grid dimensions and every cell field in storage order.
///
/// The cell count is folded in before the cells so that a truncated cell
/// array never hashes like a complete one.
pub fn grid_hash(width: u32, height: u32, cells: &[Cell]) -> u64 {
    let mut h = Fnv1a::new();
    h.u32(width);
    h.u32(height);
    h.u64(cells.len() as u64);
    for cell in cells {
        h.u32(cell.tile_id.map_or(u32::MAX, |t| u32::from(t.0)));
        h.u32(cell.elevation);
        h.u32(cell.crystals);
        h.u32(cell.ore);
        h.u32(cell.building_id.map_or(0, |b| b.hash_tag()));
    }
    h.finish()
}
