use crate::disk::{Block, BlockDevice, Geometry, ImageDisk, BLOCK_SIZE};
use crate::fs::error::{FsError, Result};

/// Allocation bitmap: one status byte per raw block (1 = allocated,
/// 0 = free), stored in the trailing blocks of the image.
///
/// The bitmap is read and rewritten in full on every mutation, so bitmap
/// updates are not atomic with the directory or data writes of the same
/// operation. A crash in between can desynchronize them; this engine does
/// not mask that.
#[derive(Debug)]
pub struct AllocationBitmap {
    bytes: Vec<u8>,
    /// Addressable blocks; indices at or past this are never handed out.
    block_count: u64,
    /// First block of the bitmap region.
    start_block: u64,
}

impl AllocationBitmap {
    /// A fresh bitmap with only the root block marked.
    pub fn new(geometry: Geometry) -> Self {
        let mut bytes = vec![0u8; geometry.bitmap_len()];
        bytes[0] = 1;
        Self {
            bytes,
            block_count: geometry.block_count(),
            start_block: geometry.bitmap_start_block(),
        }
    }

    /// Loads the bitmap region from the tail of the image.
    pub fn load(disk: &ImageDisk) -> Result<Self> {
        let geometry = disk.geometry();
        let mut bytes = Vec::with_capacity((geometry.bitmap_blocks() as usize) * BLOCK_SIZE);
        let mut buf: Block = [0; BLOCK_SIZE];

        for i in 0..geometry.bitmap_blocks() {
            disk.read_block(geometry.bitmap_start_block() + i, &mut buf)?;
            bytes.extend_from_slice(&buf);
        }
        bytes.truncate(geometry.bitmap_len());

        Ok(Self {
            bytes,
            block_count: geometry.block_count(),
            start_block: geometry.bitmap_start_block(),
        })
    }

    /// Writes the whole bitmap region back, zero-padding the final block.
    pub fn sync(&self, disk: &ImageDisk) -> Result<()> {
        let mut buf: Block = [0; BLOCK_SIZE];
        for (i, chunk) in self.bytes.chunks(BLOCK_SIZE).enumerate() {
            buf.fill(0);
            buf[..chunk.len()].copy_from_slice(chunk);
            disk.write_block(self.start_block + i as u64, &buf)?;
        }
        Ok(())
    }

    /// Lowest free block index, scanning from 1 (block 0 is the root).
    /// The scan is bounded by the addressable block count, so the blocks
    /// holding the bitmap itself are never returned.
    pub fn find_free(&self) -> Option<u64> {
        (1..self.block_count).find(|&i| self.bytes[i as usize] == 0)
    }

    pub fn set(&mut self, index: u64, allocated: bool) -> Result<()> {
        if index >= self.block_count {
            return Err(FsError::BlockOutOfRange(index));
        }
        self.bytes[index as usize] = allocated as u8;
        Ok(())
    }

    pub fn is_allocated(&self, index: u64) -> bool {
        index < self.block_count && self.bytes[index as usize] != 0
    }

    pub fn block_count(&self) -> u64 {
        self.block_count
    }

    pub fn free_blocks(&self) -> u64 {
        (1..self.block_count)
            .filter(|&i| self.bytes[i as usize] == 0)
            .count() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> AllocationBitmap {
        AllocationBitmap::new(Geometry::new(2560).unwrap())
    }

    #[test]
    fn scan_is_lowest_index_first_and_skips_the_root() {
        let mut bitmap = tiny();
        assert_eq!(bitmap.find_free(), Some(1));
        bitmap.set(1, true).unwrap();
        assert_eq!(bitmap.find_free(), Some(2));
        bitmap.set(1, false).unwrap();
        assert_eq!(bitmap.find_free(), Some(1));
    }

    #[test]
    fn exhaustion_returns_none() {
        let mut bitmap = tiny();
        for i in 1..bitmap.block_count() {
            bitmap.set(i, true).unwrap();
        }
        assert_eq!(bitmap.find_free(), None);
        assert_eq!(bitmap.free_blocks(), 0);
    }

    #[test]
    fn set_rejects_out_of_range_indices() {
        let mut bitmap = tiny();
        // Index 4 is the first bitmap-region block of the 2560-byte image.
        assert!(matches!(
            bitmap.set(4, true),
            Err(FsError::BlockOutOfRange(4))
        ));
    }
}
