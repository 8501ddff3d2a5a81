use crate::disk::BLOCK_SIZE;

/// Block 0 holds the root directory table.
pub const ROOT_BLOCK: u64 = 0;

/// 8.3-style name limits.
pub const MAX_NAME: usize = 8;
pub const MAX_EXT: usize = 3;

/// On-disk field widths: the name bytes plus a NUL pad byte.
pub const NAME_FIELD: usize = MAX_NAME + 1;
pub const EXT_FIELD: usize = MAX_EXT + 1;

/// Root entry: name field + u64 start block = 17 bytes.
pub const ROOT_SLOT_SIZE: usize = NAME_FIELD + 8;

/// File record: name + ext + u64 size + u64 start block = 29 bytes.
pub const FILE_RECORD_SIZE: usize = NAME_FIELD + EXT_FIELD + 8 + 8;

/// Entries fit after the leading u32 count.
pub const MAX_DIRS_IN_ROOT: usize = (BLOCK_SIZE - 4) / ROOT_SLOT_SIZE;
pub const MAX_FILES_IN_DIR: usize = (BLOCK_SIZE - 4) / FILE_RECORD_SIZE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacities_match_the_block_layout() {
        assert_eq!(ROOT_SLOT_SIZE, 17);
        assert_eq!(FILE_RECORD_SIZE, 29);
        assert_eq!(MAX_DIRS_IN_ROOT, 29);
        assert_eq!(MAX_FILES_IN_DIR, 17);
        // Everything fits in one block, count included.
        assert!(4 + MAX_DIRS_IN_ROOT * ROOT_SLOT_SIZE <= BLOCK_SIZE);
        assert!(4 + MAX_FILES_IN_DIR * FILE_RECORD_SIZE <= BLOCK_SIZE);
    }
}
