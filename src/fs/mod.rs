use std::path::{Path, PathBuf};

use crate::disk::{Geometry, ImageDisk};
use crate::fs::{
    bitmap::AllocationBitmap,
    dir_table::{DirectoryTable, FileRecord},
    error::{FsError, Result},
    path::{resolve, ResolvedPath},
    root_dir::RootDirectory,
};

pub mod bitmap;
pub mod codec;
pub mod config;
pub mod data;
pub mod dir_table;
pub mod error;
pub mod path;
pub mod root_dir;

/// Minimal attribute record for `get_attributes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attributes {
    pub is_directory: bool,
    pub size: u64,
}

/// The two-level filesystem over a flat disk image.
///
/// Holds only the image path and geometry; every operation opens the
/// device at entry and releases it on every exit path. Nothing is cached
/// between calls. The caller serializes mutating operations — the engine
/// provides no mutual exclusion of its own.
#[derive(Debug)]
pub struct FileSystem {
    image: PathBuf,
    geometry: Geometry,
}

impl FileSystem {
    pub fn new(image: impl Into<PathBuf>, geometry: Geometry) -> Self {
        Self {
            image: image.into(),
            geometry,
        }
    }

    pub fn image_path(&self) -> &Path {
        &self.image
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn open_disk(&self) -> Result<ImageDisk> {
        Ok(ImageDisk::open(&self.image, self.geometry)?)
    }

    /// Creates (or wipes) the image: zero-filled, empty root table in
    /// block 0, bitmap with only the root block marked.
    pub fn format(&self) -> Result<()> {
        let disk = ImageDisk::create(&self.image, self.geometry)?;
        RootDirectory::default().sync(&disk)?;
        AllocationBitmap::new(self.geometry).sync(&disk)?;
        Ok(())
    }

    /// Validates that the image opens at its exact size and block 0 parses
    /// as a root table.
    pub fn mount(&self) -> Result<()> {
        let disk = self.open_disk()?;
        RootDirectory::load(&disk)?;
        Ok(())
    }

    pub fn get_attributes(&self, path: &str) -> Result<Attributes> {
        match resolve(path)? {
            ResolvedPath::Root => Ok(Attributes {
                is_directory: true,
                size: 0,
            }),
            ResolvedPath::Directory(name) => {
                let disk = self.open_disk()?;
                let root = RootDirectory::load(&disk)?;
                root.find(&name)
                    .ok_or_else(|| FsError::NotFound(path.to_string()))?;
                Ok(Attributes {
                    is_directory: true,
                    size: 0,
                })
            }
            ResolvedPath::File { dir, name, ext } => {
                let disk = self.open_disk()?;
                let record = lookup_file(&disk, path, &dir, &name, &ext)?.1;
                Ok(Attributes {
                    is_directory: false,
                    size: record.size,
                })
            }
        }
    }

    /// Directory names at the root; `name.ext` entries inside a directory.
    pub fn list_directory(&self, path: &str) -> Result<Vec<String>> {
        match resolve(path)? {
            ResolvedPath::Root => {
                let disk = self.open_disk()?;
                let root = RootDirectory::load(&disk)?;
                Ok(root.dirs.iter().map(|d| d.name.clone()).collect())
            }
            ResolvedPath::Directory(name) => {
                let disk = self.open_disk()?;
                let root = RootDirectory::load(&disk)?;
                let slot = root
                    .find(&name)
                    .ok_or_else(|| FsError::NotFound(path.to_string()))?;
                let table = DirectoryTable::load(&disk, slot.start_block)?;
                Ok(table
                    .files
                    .iter()
                    .map(|f| {
                        if f.ext.is_empty() {
                            f.name.clone()
                        } else {
                            format!("{}.{}", f.name, f.ext)
                        }
                    })
                    .collect())
            }
            ResolvedPath::File { .. } => Err(FsError::NotFound(path.to_string())),
        }
    }

    pub fn create_directory(&self, path: &str) -> Result<()> {
        let name = match resolve(path)? {
            ResolvedPath::Directory(name) => name,
            // Only one directory level exists; anything else is malformed
            // as a directory path.
            _ => return Err(FsError::InvalidPath(path.to_string())),
        };

        let disk = self.open_disk()?;
        let mut root = RootDirectory::load(&disk)?;
        if root.find(&name).is_some() {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        if root.is_full() {
            return Err(FsError::RootFull);
        }

        let mut bitmap = AllocationBitmap::load(&disk)?;
        let block = bitmap.find_free().ok_or(FsError::NoSpace)?;
        bitmap.set(block, true)?;
        root.push(&name, block)?;

        // Best-effort ordering, no transaction boundary: bitmap first,
        // then the root's pointer, then the new table's content.
        bitmap.sync(&disk)?;
        root.sync(&disk)?;
        DirectoryTable::default().sync(&disk, block)?;
        Ok(())
    }

    /// Directory removal is out of scope: accepted and ignored. The path
    /// must still name a directory.
    pub fn remove_directory(&self, path: &str) -> Result<()> {
        match resolve(path)? {
            ResolvedPath::Directory(_) => Ok(()),
            _ => Err(FsError::InvalidPath(path.to_string())),
        }
    }

    pub fn create_file(&self, path: &str) -> Result<()> {
        let (dir, name, ext) = match resolve(path)? {
            ResolvedPath::File { dir, name, ext } => (dir, name, ext),
            // Files live under a directory, never at the root.
            _ => return Err(FsError::InvalidPath(path.to_string())),
        };
        if ext.is_empty() {
            return Err(FsError::MissingExtension(name));
        }

        let disk = self.open_disk()?;
        let root = RootDirectory::load(&disk)?;
        let slot = root
            .find(&dir)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        let table_block = slot.start_block;

        let mut table = DirectoryTable::load(&disk, table_block)?;
        if table.find(&name).is_some() {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        if table.is_full() {
            return Err(FsError::DirFull(dir));
        }

        let mut bitmap = AllocationBitmap::load(&disk)?;
        let block = bitmap.find_free().ok_or(FsError::NoSpace)?;
        bitmap.set(block, true)?;
        table.files.push(FileRecord {
            name,
            ext,
            size: 0,
            start_block: block,
        });

        bitmap.sync(&disk)?;
        table.sync(&disk, table_block)?;
        Ok(())
    }

    /// File removal is out of scope: accepted and ignored. The path must
    /// still name a file.
    pub fn remove_file(&self, path: &str) -> Result<()> {
        file_segments(path)?;
        Ok(())
    }

    pub fn read_file(&self, path: &str, offset: u64, len: usize) -> Result<Vec<u8>> {
        let (dir, name, ext) = file_segments(path)?;
        let disk = self.open_disk()?;
        let (_, record) = lookup_file(&disk, path, &dir, &name, &ext)?;
        data::read(&disk, &record, offset, len)
    }

    /// Returns the number of bytes written. On `NoSpace` the bytes that
    /// landed before exhaustion are already persisted, size included.
    pub fn write_file(&self, path: &str, offset: u64, payload: &[u8]) -> Result<usize> {
        let (dir, name, ext) = file_segments(path)?;
        let disk = self.open_disk()?;

        let root = RootDirectory::load(&disk)?;
        let slot = root
            .find(&dir)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        let table_block = slot.start_block;

        let mut table = DirectoryTable::load(&disk, table_block)?;
        let index = table
            .find(&name)
            .filter(|&i| table.files[i].ext == ext)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;

        data::write(&disk, &mut table, table_block, index, offset, payload)
    }

    /// Existence check only; there is no open-handle state to create.
    pub fn open_file(&self, path: &str) -> Result<()> {
        self.get_attributes(path).map(|_| ())
    }

    /// Nothing is buffered between calls, so flush has nothing to do.
    pub fn flush_file(&self, path: &str) -> Result<()> {
        resolve(path)?;
        Ok(())
    }

    /// Free addressable blocks, for the shell's status output.
    pub fn free_blocks(&self) -> Result<u64> {
        let disk = self.open_disk()?;
        Ok(AllocationBitmap::load(&disk)?.free_blocks())
    }
}

/// Splits a path that must name a file; a directory path is `IsDirectory`.
fn file_segments(path: &str) -> Result<(String, String, String)> {
    match resolve(path)? {
        ResolvedPath::File { dir, name, ext } => Ok((dir, name, ext)),
        ResolvedPath::Root | ResolvedPath::Directory(_) => {
            Err(FsError::IsDirectory(path.to_string()))
        }
    }
}

/// Resolves directory and file, checking the extension against the
/// record; any mismatch is `NotFound`.
fn lookup_file(
    disk: &ImageDisk,
    path: &str,
    dir: &str,
    name: &str,
    ext: &str,
) -> Result<(u64, FileRecord)> {
    let root = RootDirectory::load(disk)?;
    let slot = root
        .find(dir)
        .ok_or_else(|| FsError::NotFound(path.to_string()))?;
    let table = DirectoryTable::load(disk, slot.start_block)?;
    let index = table
        .find(name)
        .filter(|&i| table.files[i].ext == ext)
        .ok_or_else(|| FsError::NotFound(path.to_string()))?;
    Ok((slot.start_block, table.files[index].clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::BLOCK_SIZE;

    fn scratch_fs(image_size: u64) -> (tempfile::TempDir, FileSystem) {
        let dir = tempfile::tempdir().unwrap();
        let fs = FileSystem::new(
            dir.path().join("disk.img"),
            Geometry::new(image_size).unwrap(),
        );
        fs.format().unwrap();
        (dir, fs)
    }

    #[test]
    fn directories_create_and_resolve() {
        let (_guard, fs) = scratch_fs(16 * BLOCK_SIZE as u64);

        fs.create_directory("/docs").unwrap();
        let attrs = fs.get_attributes("/docs").unwrap();
        assert!(attrs.is_directory);
        assert_eq!(attrs.size, 0);
        assert_eq!(fs.list_directory("/").unwrap(), vec!["docs"]);

        assert!(matches!(
            fs.create_directory("/docs"),
            Err(FsError::AlreadyExists(_))
        ));
        assert!(matches!(
            fs.create_directory("/waytoolong1"),
            Err(FsError::NameTooLong(_))
        ));
        assert!(matches!(
            fs.get_attributes("/nothere"),
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn files_create_zero_sized_with_a_start_block() {
        let (_guard, fs) = scratch_fs(16 * BLOCK_SIZE as u64);
        fs.create_directory("/docs").unwrap();

        fs.create_file("/docs/a.txt").unwrap();
        let attrs = fs.get_attributes("/docs/a.txt").unwrap();
        assert!(!attrs.is_directory);
        assert_eq!(attrs.size, 0);
        assert_eq!(fs.list_directory("/docs").unwrap(), vec!["a.txt"]);

        // Two blocks gone: the directory table and the file's start block.
        assert_eq!(fs.free_blocks().unwrap(), 16 - 1 /* bitmap */ - 1 /* root */ - 2);

        assert!(matches!(
            fs.create_file("/docs/plain"),
            Err(FsError::MissingExtension(_))
        ));
        assert!(matches!(
            fs.create_file("/docs/a.txt"),
            Err(FsError::AlreadyExists(_))
        ));
        // A single root-level segment is read as a directory name: a short
        // dotted one is the wrong shape for a file, an over-long one trips
        // the length check first.
        assert!(matches!(
            fs.create_file("/ab.txt"),
            Err(FsError::InvalidPath(_))
        ));
        assert!(matches!(
            fs.create_file("/rootfile.txt"),
            Err(FsError::NameTooLong(_))
        ));
        assert!(matches!(
            fs.create_file("/nodir/a.txt"),
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn directory_table_capacity_is_a_hard_limit() {
        // Enough blocks for the dir table plus one start block per file.
        let (_guard, fs) = scratch_fs(32 * BLOCK_SIZE as u64);
        fs.create_directory("/d").unwrap();

        for i in 0..config::MAX_FILES_IN_DIR {
            fs.create_file(&format!("/d/f{}.txt", i)).unwrap();
        }
        assert_eq!(
            fs.list_directory("/d").unwrap().len(),
            config::MAX_FILES_IN_DIR
        );
        assert!(matches!(
            fs.create_file("/d/extra.txt"),
            Err(FsError::DirFull(_))
        ));
    }

    #[test]
    fn write_then_read_round_trips_across_blocks() {
        let (_guard, fs) = scratch_fs(16 * BLOCK_SIZE as u64);
        fs.create_directory("/docs").unwrap();
        fs.create_file("/docs/big.bin").unwrap();

        let payload: Vec<u8> = (0..1300u32).map(|i| (i % 251) as u8).collect();
        assert_eq!(fs.write_file("/docs/big.bin", 0, &payload).unwrap(), 1300);
        assert_eq!(fs.get_attributes("/docs/big.bin").unwrap().size, 1300);
        assert_eq!(fs.read_file("/docs/big.bin", 0, 1300).unwrap(), payload);

        // Interior range, straddling a block boundary.
        assert_eq!(
            fs.read_file("/docs/big.bin", 500, 40).unwrap(),
            &payload[500..540]
        );
    }

    #[test]
    fn read_boundaries() {
        let (_guard, fs) = scratch_fs(16 * BLOCK_SIZE as u64);
        fs.create_directory("/d").unwrap();
        fs.create_file("/d/f.txt").unwrap();
        fs.write_file("/d/f.txt", 0, b"hello world").unwrap();

        // At the end: empty. Past the end: error. Over-long: trimmed.
        assert!(fs.read_file("/d/f.txt", 11, 10).unwrap().is_empty());
        assert!(matches!(
            fs.read_file("/d/f.txt", 12, 1),
            Err(FsError::OffsetBeyondEnd { offset: 12, size: 11 })
        ));
        assert_eq!(fs.read_file("/d/f.txt", 6, 100).unwrap(), b"world");
    }

    #[test]
    fn append_and_interior_overwrite() {
        let (_guard, fs) = scratch_fs(16 * BLOCK_SIZE as u64);
        fs.create_directory("/d").unwrap();
        fs.create_file("/d/f.txt").unwrap();

        fs.write_file("/d/f.txt", 0, b"hello world").unwrap();
        fs.write_file("/d/f.txt", 11, b"!").unwrap();
        assert_eq!(fs.read_file("/d/f.txt", 0, 64).unwrap(), b"hello world!");

        // Overwriting inside the file must not change its size.
        fs.write_file("/d/f.txt", 0, b"HELLO").unwrap();
        assert_eq!(fs.get_attributes("/d/f.txt").unwrap().size, 12);
        assert_eq!(fs.read_file("/d/f.txt", 0, 64).unwrap(), b"HELLO world!");

        // Sparse writes are unsupported.
        assert!(matches!(
            fs.write_file("/d/f.txt", 100, b"x"),
            Err(FsError::OffsetBeyondEnd { .. })
        ));
    }

    #[test]
    fn extension_must_match_the_record() {
        let (_guard, fs) = scratch_fs(16 * BLOCK_SIZE as u64);
        fs.create_directory("/d").unwrap();
        fs.create_file("/d/f.txt").unwrap();
        fs.write_file("/d/f.txt", 0, b"abc").unwrap();

        assert!(matches!(
            fs.read_file("/d/f.md", 0, 3),
            Err(FsError::NotFound(_))
        ));
        assert!(matches!(
            fs.write_file("/d/f.md", 0, b"abc"),
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn data_ops_reject_directories() {
        let (_guard, fs) = scratch_fs(16 * BLOCK_SIZE as u64);
        fs.create_directory("/d").unwrap();
        assert!(matches!(
            fs.read_file("/d", 0, 1),
            Err(FsError::IsDirectory(_))
        ));
        assert!(matches!(
            fs.write_file("/", 0, b"x"),
            Err(FsError::IsDirectory(_))
        ));
    }

    #[test]
    fn noop_surface_accepts_valid_paths() {
        let (_guard, fs) = scratch_fs(16 * BLOCK_SIZE as u64);
        fs.create_directory("/d").unwrap();
        fs.create_file("/d/f.txt").unwrap();

        fs.remove_directory("/d").unwrap();
        fs.remove_file("/d/f.txt").unwrap();
        fs.flush_file("/d/f.txt").unwrap();
        fs.open_file("/d/f.txt").unwrap();
        assert!(matches!(
            fs.open_file("/d/gone.txt"),
            Err(FsError::NotFound(_))
        ));

        // The no-ops still insist on the right path shape.
        assert!(matches!(
            fs.remove_directory("/d/f.txt"),
            Err(FsError::InvalidPath(_))
        ));
        assert!(matches!(
            fs.remove_file("/d"),
            Err(FsError::IsDirectory(_))
        ));
        assert!(matches!(
            fs.remove_file("/"),
            Err(FsError::IsDirectory(_))
        ));

        // Removal really is a no-op.
        assert_eq!(fs.list_directory("/").unwrap(), vec!["d"]);
        assert_eq!(fs.list_directory("/d").unwrap(), vec!["f.txt"]);
    }

    /// Three usable data blocks: mkdir + create + a 600-byte write
    /// consume all of them, and the next allocation fails.
    #[test]
    fn three_block_exhaustion_story() {
        let (_guard, fs) = scratch_fs(2560);

        fs.create_directory("/docs").unwrap();
        fs.create_file("/docs/a.txt").unwrap();

        let payload: Vec<u8> = (0..600u32).map(|i| (i % 256) as u8).collect();
        assert_eq!(fs.write_file("/docs/a.txt", 0, &payload).unwrap(), 600);
        assert_eq!(fs.get_attributes("/docs/a.txt").unwrap().size, 600);
        assert_eq!(fs.read_file("/docs/a.txt", 0, 600).unwrap(), payload);

        assert_eq!(fs.free_blocks().unwrap(), 0);
        assert!(matches!(
            fs.create_directory("/more"),
            Err(FsError::NoSpace)
        ));
        assert!(matches!(
            fs.create_file("/docs/b.txt"),
            Err(FsError::NoSpace)
        ));
    }

    #[test]
    fn exhaustion_mid_write_persists_the_partial_size() {
        // Root + bitmap + 3 usable blocks: dir table, file block, one
        // spare. A 2000-byte write fits 1024 bytes before running out.
        let (_guard, fs) = scratch_fs(2560);
        fs.create_directory("/d").unwrap();
        fs.create_file("/d/f.bin").unwrap();

        let payload = vec![7u8; 2000];
        assert!(matches!(
            fs.write_file("/d/f.bin", 0, &payload),
            Err(FsError::NoSpace)
        ));

        let size = fs.get_attributes("/d/f.bin").unwrap().size;
        assert_eq!(size, 1024);
        assert_eq!(
            fs.read_file("/d/f.bin", 0, size as usize).unwrap(),
            vec![7u8; 1024]
        );
    }

    #[test]
    fn mount_rejects_a_missized_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.img");
        std::fs::write(&path, vec![0u8; 1024]).unwrap();

        let fs = FileSystem::new(&path, Geometry::new(2560).unwrap());
        assert!(matches!(
            fs.mount(),
            Err(FsError::Device(crate::disk::DeviceError::SizeMismatch { .. }))
        ));
    }
}
