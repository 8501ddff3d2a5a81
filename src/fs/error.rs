use std::fmt;

use crate::disk::DeviceError;

/// Filesystem error taxonomy. Every error is detected where it occurs and
/// returned straight to the caller; nothing is retried.
#[derive(Debug)]
pub enum FsError {
    /// Device-layer failure (missing/missized image, seek, short I/O).
    Device(DeviceError),
    /// Path does not match `/`, `/dir` or `/dir/name.ext`.
    InvalidPath(String),
    /// Directory or file name over 8 chars, or extension over 3.
    NameTooLong(String),
    /// Directory or file with that name already present.
    AlreadyExists(String),
    /// Directory, file, or extension did not match anything on disk.
    NotFound(String),
    /// File creation without an extension.
    MissingExtension(String),
    /// Data operation attempted against a directory.
    IsDirectory(String),
    /// Root directory table is at capacity.
    RootFull,
    /// A directory's entry table is at capacity.
    DirFull(String),
    /// No free block left to allocate.
    NoSpace,
    /// Read or write offset past the end of the file.
    OffsetBeyondEnd { offset: u64, size: u64 },
    /// Bitmap index outside the addressable block range.
    BlockOutOfRange(u64),
    /// On-disk structure failed validation.
    Corrupted(String),
}

impl From<DeviceError> for FsError {
    fn from(e: DeviceError) -> Self {
        FsError::Device(e)
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(e) => write!(f, "{}", e),
            Self::InvalidPath(path) => write!(f, "invalid path: {}", path),
            Self::NameTooLong(name) => write!(f, "name too long: {}", name),
            Self::AlreadyExists(path) => write!(f, "already exists: {}", path),
            Self::NotFound(path) => write!(f, "not found: {}", path),
            Self::MissingExtension(name) => {
                write!(f, "files require an extension: {}", name)
            }
            Self::IsDirectory(path) => write!(f, "is a directory: {}", path),
            Self::RootFull => write!(f, "root directory is full"),
            Self::DirFull(dir) => write!(f, "directory is full: {}", dir),
            Self::NoSpace => write!(f, "no free block available"),
            Self::OffsetBeyondEnd { offset, size } => {
                write!(f, "offset {} beyond end of file (size {})", offset, size)
            }
            Self::BlockOutOfRange(index) => write!(f, "block index out of range: {}", index),
            Self::Corrupted(desc) => write!(f, "file system corrupted: {}", desc),
        }
    }
}

impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Device(e) => Some(e),
            _ => None,
        }
    }
}

/// Unified result type for filesystem operations.
pub type Result<T> = std::result::Result<T, FsError>;
