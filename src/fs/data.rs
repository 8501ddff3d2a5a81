use crate::disk::{Block, BlockDevice, ImageDisk, BLOCK_SIZE};
use crate::fs::bitmap::AllocationBitmap;
use crate::fs::dir_table::{DirectoryTable, FileRecord};
use crate::fs::error::{FsError, Result};

/// Blocks a file of `size` bytes owns. A zero-size file still owns its
/// start block, allocated at creation.
fn owned_blocks(size: u64) -> u64 {
    let blocks = (size + BLOCK_SIZE as u64 - 1) / BLOCK_SIZE as u64;
    blocks.max(1)
}

/// Reads up to `len` bytes of `record` starting at byte `offset`.
///
/// Returns `min(len, size - offset)` bytes; `offset == size` reads empty.
/// The file's blocks are contiguous from its start block, so the walk is
/// plain index arithmetic: first block `start + offset / B`, in-block head
/// `offset % B`, spanning as many blocks as the head plus the byte count
/// reach into.
pub fn read(disk: &ImageDisk, record: &FileRecord, offset: u64, len: usize) -> Result<Vec<u8>> {
    if offset > record.size {
        return Err(FsError::OffsetBeyondEnd {
            offset,
            size: record.size,
        });
    }

    let n = (record.size - offset).min(len as u64) as usize;
    if n == 0 {
        return Ok(Vec::new());
    }

    let first = record.start_block + offset / BLOCK_SIZE as u64;
    let head = (offset % BLOCK_SIZE as u64) as usize;
    let span = (head + n + BLOCK_SIZE - 1) / BLOCK_SIZE;

    let mut out = Vec::with_capacity(span * BLOCK_SIZE);
    let mut buf: Block = [0; BLOCK_SIZE];
    for i in 0..span as u64 {
        disk.read_block(first + i, &mut buf)?;
        out.extend_from_slice(&buf);
    }

    out.drain(..head);
    out.truncate(n);
    Ok(out)
}

/// Writes `payload` into the file at `table.files[index]`, starting at
/// byte `offset`, growing the file as needed.
///
/// The remainder of the terminal block is filled first; each additional
/// block is claimed from the bitmap one at a time and marked immediately.
/// Growth is contiguous by construction: the next block must be exactly
/// `start + owned` and free, otherwise the write stops with `NoSpace`.
/// The owning directory table is persisted once at the end with the size
/// grown by exactly the bytes that landed — including on the `NoSpace`
/// path, where the partial state is recorded rather than hidden.
pub fn write(
    disk: &ImageDisk,
    table: &mut DirectoryTable,
    table_block: u64,
    index: usize,
    offset: u64,
    payload: &[u8],
) -> Result<usize> {
    let (start, size) = {
        let record = &table.files[index];
        (record.start_block, record.size)
    };

    if offset > size {
        return Err(FsError::OffsetBeyondEnd { offset, size });
    }
    if payload.is_empty() {
        return Ok(0);
    }

    let mut bitmap = AllocationBitmap::load(disk)?;
    let mut owned = owned_blocks(size);
    let mut written = 0usize;
    let mut buf: Block = [0; BLOCK_SIZE];

    while written < payload.len() {
        let pos = offset + written as u64;
        let rel = pos / BLOCK_SIZE as u64;

        if rel >= owned {
            let next = start + owned;
            if next >= bitmap.block_count() || bitmap.is_allocated(next) {
                // Out of room (or the run is blocked): persist what
                // landed, then report the exhaustion.
                table.files[index].size = size.max(offset + written as u64);
                table.sync(disk, table_block)?;
                return Err(FsError::NoSpace);
            }
            bitmap.set(next, true)?;
            bitmap.sync(disk)?;
            owned += 1;
        }

        let head = (pos % BLOCK_SIZE as u64) as usize;
        let chunk = (BLOCK_SIZE - head).min(payload.len() - written);

        disk.read_block(start + rel, &mut buf)?;
        buf[head..head + chunk].copy_from_slice(&payload[written..written + chunk]);
        disk.write_block(start + rel, &buf)?;

        written += chunk;
    }

    table.files[index].size = size.max(offset + written as u64);
    table.sync(disk, table_block)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_block_accounting() {
        assert_eq!(owned_blocks(0), 1);
        assert_eq!(owned_blocks(1), 1);
        assert_eq!(owned_blocks(512), 1);
        assert_eq!(owned_blocks(513), 2);
        assert_eq!(owned_blocks(600), 2);
        assert_eq!(owned_blocks(1024), 2);
    }
}
