use crate::disk::error::DeviceError;

/// Size of one logical block. The filesystem reads and writes in whole
/// blocks; all positional I/O is computed as `block index * BLOCK_SIZE`.
pub const BLOCK_SIZE: usize = 512;

/// Default backing image size: 5 MiB.
pub const DEFAULT_IMAGE_SIZE: u64 = 5 * 1024 * 1024;

/// One logical block worth of bytes.
pub type Block = [u8; BLOCK_SIZE];

/// Layout of a backing image.
///
/// The raw image is `raw_blocks` blocks of `BLOCK_SIZE` bytes. The tail of
/// the image holds the allocation bitmap (one status byte per raw block),
/// occupying the last `bitmap_blocks` blocks. Everything before that is
/// addressable by the filesystem: block 0 is the root directory table,
/// blocks 1..block_count hold directory tables and file data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    image_size: u64,
}

impl Geometry {
    /// Builds a geometry for an image of `image_size` bytes. The size must
    /// be a whole number of blocks and leave at least the root block after
    /// the bitmap region is carved off the tail.
    pub fn new(image_size: u64) -> Result<Self, DeviceError> {
        if image_size == 0 || image_size % BLOCK_SIZE as u64 != 0 {
            return Err(DeviceError::InvalidGeometry(image_size));
        }
        let geometry = Self { image_size };
        if geometry.block_count() < 1 {
            return Err(DeviceError::InvalidGeometry(image_size));
        }
        Ok(geometry)
    }

    pub fn default_geometry() -> Self {
        // 5 MiB is always valid.
        Self {
            image_size: DEFAULT_IMAGE_SIZE,
        }
    }

    pub fn image_size(&self) -> u64 {
        self.image_size
    }

    /// Total blocks in the raw image, bitmap region included.
    pub fn raw_blocks(&self) -> u64 {
        self.image_size / BLOCK_SIZE as u64
    }

    /// Length of the bitmap in bytes: one status byte per raw block.
    pub fn bitmap_len(&self) -> usize {
        self.raw_blocks() as usize
    }

    /// Blocks consumed by the bitmap region at the tail of the image.
    pub fn bitmap_blocks(&self) -> u64 {
        (self.raw_blocks() + BLOCK_SIZE as u64 - 1) / BLOCK_SIZE as u64
    }

    /// Blocks addressable by the filesystem (root + directories + data).
    pub fn block_count(&self) -> u64 {
        self.raw_blocks() - self.bitmap_blocks()
    }

    /// First block of the bitmap region.
    pub fn bitmap_start_block(&self) -> u64 {
        self.block_count()
    }

    /// Byte offset of the bitmap region inside the image.
    pub fn bitmap_offset(&self) -> u64 {
        self.block_count() * BLOCK_SIZE as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_five_mib_layout() {
        let g = Geometry::default_geometry();
        assert_eq!(g.raw_blocks(), 10240);
        assert_eq!(g.bitmap_len(), 10240);
        assert_eq!(g.bitmap_blocks(), 20);
        assert_eq!(g.block_count(), 10220);
        assert_eq!(g.bitmap_offset(), 5_232_640);
    }

    #[test]
    fn tiny_image_layout() {
        // 5 raw blocks: root + 3 data blocks + 1 bitmap block.
        let g = Geometry::new(2560).unwrap();
        assert_eq!(g.raw_blocks(), 5);
        assert_eq!(g.bitmap_blocks(), 1);
        assert_eq!(g.block_count(), 4);
        assert_eq!(g.bitmap_offset(), 2048);
    }

    #[test]
    fn rejects_unaligned_or_degenerate_sizes() {
        assert!(Geometry::new(0).is_err());
        assert!(Geometry::new(1000).is_err());
        // One block total: the bitmap eats it, no room for the root.
        assert!(Geometry::new(512).is_err());
    }
}
