pub mod block_device;
pub mod error;
pub mod geometry;
pub mod image_disk;
pub mod init;

pub use block_device::BlockDevice;
pub use error::DeviceError;
pub use geometry::{Block, Geometry, BLOCK_SIZE, DEFAULT_IMAGE_SIZE};
pub use image_disk::ImageDisk;
