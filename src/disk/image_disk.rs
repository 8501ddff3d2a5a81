use std::{
    fs::{File, OpenOptions},
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    path::Path,
    sync::Mutex,
};

use crate::disk::{
    block_device::BlockDevice,
    error::DeviceError,
    geometry::{Block, Geometry, BLOCK_SIZE},
};

/// A fixed-size flat disk image on the host filesystem.
///
/// The disk is a scoped capability: facade operations open it on entry and
/// drop it on every exit path. There is no cross-operation cache; every
/// operation re-reads the blocks it needs.
#[derive(Debug)]
pub struct ImageDisk {
    file: Mutex<File>,
    geometry: Geometry,
}

impl ImageDisk {
    /// Opens an existing image and validates its exact size.
    pub fn open(path: &Path, geometry: Geometry) -> Result<Self, DeviceError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => DeviceError::NotFound(path.to_path_buf()),
                _ => DeviceError::Io(e),
            })?;

        let actual = file.metadata().map_err(DeviceError::Io)?.len();
        if actual != geometry.image_size() {
            return Err(DeviceError::SizeMismatch {
                expected: geometry.image_size(),
                actual,
            });
        }

        Ok(Self {
            file: Mutex::new(file),
            geometry,
        })
    }

    /// Creates (or truncates) an image of exactly the geometry's size,
    /// zero-filled. Used by format.
    pub fn create(path: &Path, geometry: Geometry) -> Result<Self, DeviceError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(DeviceError::Io)?;

        file.set_len(geometry.image_size())
            .map_err(DeviceError::Io)?;

        Ok(Self {
            file: Mutex::new(file),
            geometry,
        })
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }
}

impl BlockDevice for ImageDisk {
    fn read_block(&self, block_id: u64, buf: &mut Block) -> Result<(), DeviceError> {
        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start(block_id * BLOCK_SIZE as u64))
            .map_err(DeviceError::Seek)?;
        file.read_exact(buf).map_err(DeviceError::ShortRead)?;
        Ok(())
    }

    fn write_block(&self, block_id: u64, buf: &Block) -> Result<(), DeviceError> {
        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start(block_id * BLOCK_SIZE as u64))
            .map_err(DeviceError::Seek)?;
        file.write_all(buf).map_err(DeviceError::ShortWrite)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rejects_missing_and_missized_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.img");
        let geometry = Geometry::new(2560).unwrap();

        assert!(matches!(
            ImageDisk::open(&path, geometry),
            Err(DeviceError::NotFound(_))
        ));

        std::fs::write(&path, vec![0u8; 1024]).unwrap();
        assert!(matches!(
            ImageDisk::open(&path, geometry),
            Err(DeviceError::SizeMismatch {
                expected: 2560,
                actual: 1024
            })
        ));
    }

    #[test]
    fn block_io_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.img");
        let geometry = Geometry::new(2560).unwrap();

        let disk = ImageDisk::create(&path, geometry).unwrap();
        let mut block: Block = [0; BLOCK_SIZE];
        block[0] = 0xAB;
        block[BLOCK_SIZE - 1] = 0xCD;
        disk.write_block(3, &block).unwrap();

        let disk = ImageDisk::open(&path, geometry).unwrap();
        let mut readback: Block = [0; BLOCK_SIZE];
        disk.read_block(3, &mut readback).unwrap();
        assert_eq!(readback[0], 0xAB);
        assert_eq!(readback[BLOCK_SIZE - 1], 0xCD);

        // Reading past the end of the raw image is a short read.
        assert!(matches!(
            disk.read_block(5, &mut readback),
            Err(DeviceError::ShortRead(_))
        ));
    }
}
