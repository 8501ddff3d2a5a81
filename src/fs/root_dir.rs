use crate::disk::{Block, BlockDevice, ImageDisk, BLOCK_SIZE};
use crate::fs::codec::{get_name, get_u32, get_u64, put_name, put_u32, put_u64};
use crate::fs::config::{MAX_DIRS_IN_ROOT, NAME_FIELD, ROOT_BLOCK, ROOT_SLOT_SIZE};
use crate::fs::error::{FsError, Result};

/// One root entry: a subdirectory's name and the block holding its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirSlot {
    pub name: String,
    pub start_block: u64,
}

/// The root directory table, resident in block 0.
///
/// On-disk layout (little-endian):
/// ```text
/// offset 0        u32   directory count
/// offset 4 + i*17:
///     [0..9)      name, NUL-padded (8 chars max)
///     [9..17)     u64   start block
/// ```
#[derive(Debug, Default)]
pub struct RootDirectory {
    pub dirs: Vec<DirSlot>,
}

impl RootDirectory {
    pub fn load(disk: &ImageDisk) -> Result<Self> {
        let mut buf: Block = [0; BLOCK_SIZE];
        disk.read_block(ROOT_BLOCK, &mut buf)?;
        Self::from_bytes(&buf)
    }

    pub fn sync(&self, disk: &ImageDisk) -> Result<()> {
        disk.write_block(ROOT_BLOCK, &self.to_bytes())?;
        Ok(())
    }

    pub fn from_bytes(block: &Block) -> Result<Self> {
        let count = get_u32(&block[..4]) as usize;
        if count > MAX_DIRS_IN_ROOT {
            return Err(FsError::Corrupted(format!(
                "root claims {} directories, capacity is {}",
                count, MAX_DIRS_IN_ROOT
            )));
        }

        let mut dirs = Vec::with_capacity(count);
        for i in 0..count {
            let slot = &block[4 + i * ROOT_SLOT_SIZE..4 + (i + 1) * ROOT_SLOT_SIZE];
            dirs.push(DirSlot {
                name: get_name(&slot[..NAME_FIELD]),
                start_block: get_u64(&slot[NAME_FIELD..]),
            });
        }
        Ok(Self { dirs })
    }

    pub fn to_bytes(&self) -> Block {
        let mut block: Block = [0; BLOCK_SIZE];
        put_u32(&mut block[..4], self.dirs.len() as u32);
        for (i, dir) in self.dirs.iter().enumerate() {
            let slot = &mut block[4 + i * ROOT_SLOT_SIZE..4 + (i + 1) * ROOT_SLOT_SIZE];
            put_name(&mut slot[..NAME_FIELD], &dir.name);
            put_u64(&mut slot[NAME_FIELD..], dir.start_block);
        }
        block
    }

    /// Case-sensitive exact-match lookup.
    pub fn find(&self, name: &str) -> Option<&DirSlot> {
        self.dirs.iter().find(|d| d.name == name)
    }

    pub fn is_full(&self) -> bool {
        self.dirs.len() >= MAX_DIRS_IN_ROOT
    }

    pub fn push(&mut self, name: &str, start_block: u64) -> Result<()> {
        if self.is_full() {
            return Err(FsError::RootFull);
        }
        self.dirs.push(DirSlot {
            name: name.to_string(),
            start_block,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_land_at_documented_offsets() {
        let mut root = RootDirectory::default();
        root.push("docs", 7).unwrap();
        root.push("music", 9).unwrap();

        let block = root.to_bytes();
        assert_eq!(get_u32(&block[..4]), 2);
        assert_eq!(&block[4..9], b"docs\0");
        assert_eq!(get_u64(&block[13..21]), 7);
        // Second slot begins at 4 + 17.
        assert_eq!(&block[21..27], b"music\0");
        assert_eq!(get_u64(&block[30..38]), 9);

        let reread = RootDirectory::from_bytes(&block).unwrap();
        assert_eq!(reread.dirs.len(), 2);
        assert_eq!(reread.find("docs").unwrap().start_block, 7);
        assert_eq!(reread.find("music").unwrap().start_block, 9);
        assert!(reread.find("Docs").is_none());
    }

    #[test]
    fn capacity_is_a_hard_limit() {
        let mut root = RootDirectory::default();
        for i in 0..MAX_DIRS_IN_ROOT {
            root.push(&format!("d{}", i), i as u64 + 1).unwrap();
        }
        assert!(matches!(root.push("extra", 99), Err(FsError::RootFull)));
    }

    #[test]
    fn implausible_count_is_corruption() {
        let mut block: Block = [0; BLOCK_SIZE];
        put_u32(&mut block[..4], 1000);
        assert!(matches!(
            RootDirectory::from_bytes(&block),
            Err(FsError::Corrupted(_))
        ));
    }
}
