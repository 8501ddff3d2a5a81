use crate::disk::{Block, BlockDevice, ImageDisk, BLOCK_SIZE};
use crate::fs::codec::{get_name, get_u32, get_u64, put_name, put_u32, put_u64};
use crate::fs::config::{EXT_FIELD, FILE_RECORD_SIZE, MAX_FILES_IN_DIR, NAME_FIELD};
use crate::fs::error::{FsError, Result};

/// One file record inside a directory's entry table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub ext: String,
    pub size: u64,
    pub start_block: u64,
}

/// A subdirectory's entry table, one block, allocated when the directory
/// is created.
///
/// On-disk layout (little-endian):
/// ```text
/// offset 0        u32   file count
/// offset 4 + i*29:
///     [0..9)      name, NUL-padded (8 chars max)
///     [9..13)     ext,  NUL-padded (3 chars max)
///     [13..21)    u64   file size in bytes
///     [21..29)    u64   start block
/// ```
#[derive(Debug, Default)]
pub struct DirectoryTable {
    pub files: Vec<FileRecord>,
}

impl DirectoryTable {
    pub fn load(disk: &ImageDisk, block_id: u64) -> Result<Self> {
        let mut buf: Block = [0; BLOCK_SIZE];
        disk.read_block(block_id, &mut buf)?;
        Self::from_bytes(&buf)
    }

    pub fn sync(&self, disk: &ImageDisk, block_id: u64) -> Result<()> {
        disk.write_block(block_id, &self.to_bytes())?;
        Ok(())
    }

    pub fn from_bytes(block: &Block) -> Result<Self> {
        let count = get_u32(&block[..4]) as usize;
        if count > MAX_FILES_IN_DIR {
            return Err(FsError::Corrupted(format!(
                "directory claims {} files, capacity is {}",
                count, MAX_FILES_IN_DIR
            )));
        }

        let mut files = Vec::with_capacity(count);
        for i in 0..count {
            let rec = &block[4 + i * FILE_RECORD_SIZE..4 + (i + 1) * FILE_RECORD_SIZE];
            files.push(FileRecord {
                name: get_name(&rec[..NAME_FIELD]),
                ext: get_name(&rec[NAME_FIELD..NAME_FIELD + EXT_FIELD]),
                size: get_u64(&rec[NAME_FIELD + EXT_FIELD..NAME_FIELD + EXT_FIELD + 8]),
                start_block: get_u64(&rec[NAME_FIELD + EXT_FIELD + 8..]),
            });
        }
        Ok(Self { files })
    }

    pub fn to_bytes(&self) -> Block {
        let mut block: Block = [0; BLOCK_SIZE];
        put_u32(&mut block[..4], self.files.len() as u32);
        for (i, file) in self.files.iter().enumerate() {
            let rec = &mut block[4 + i * FILE_RECORD_SIZE..4 + (i + 1) * FILE_RECORD_SIZE];
            put_name(&mut rec[..NAME_FIELD], &file.name);
            put_name(&mut rec[NAME_FIELD..NAME_FIELD + EXT_FIELD], &file.ext);
            put_u64(
                &mut rec[NAME_FIELD + EXT_FIELD..NAME_FIELD + EXT_FIELD + 8],
                file.size,
            );
            put_u64(&mut rec[NAME_FIELD + EXT_FIELD + 8..], file.start_block);
        }
        block
    }

    /// Looks a file up by name (case-sensitive); the extension lives on
    /// the record and is checked by the caller where it matters.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|f| f.name == name)
    }

    pub fn is_full(&self) -> bool {
        self.files.len() >= MAX_FILES_IN_DIR
    }
}
