use crate::disk::error::DeviceError;
use crate::disk::geometry::Block;

/// Block-granular access to a backing store. The device does not enforce
/// an upper bound on block indices beyond the I/O itself failing; callers
/// bounds-check against the geometry before asking.
pub trait BlockDevice: Send + Sync {
    fn read_block(&self, block_id: u64, buf: &mut Block) -> Result<(), DeviceError>;
    fn write_block(&self, block_id: u64, buf: &Block) -> Result<(), DeviceError>;
}
