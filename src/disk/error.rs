use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised by the device layer. Every failure is surfaced to the
/// caller of the triggering operation; nothing is retried.
#[derive(Debug)]
pub enum DeviceError {
    /// Backing image does not exist.
    NotFound(PathBuf),
    /// Backing image exists but is not exactly the expected size.
    SizeMismatch { expected: u64, actual: u64 },
    /// Requested image size cannot form a valid block layout.
    InvalidGeometry(u64),
    /// Seeking to a block offset failed.
    Seek(io::Error),
    /// A block read transferred fewer bytes than a full block.
    ShortRead(io::Error),
    /// A block write transferred fewer bytes than a full block.
    ShortWrite(io::Error),
    /// Any other I/O failure (open, metadata, ...).
    Io(io::Error),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "disk image not found: {}", path.display()),
            Self::SizeMismatch { expected, actual } => write!(
                f,
                "disk image has wrong size: expected {} bytes, found {}",
                expected, actual
            ),
            Self::InvalidGeometry(size) => {
                write!(f, "invalid image size {}: not a usable block layout", size)
            }
            Self::Seek(e) => write!(f, "seek to block failed: {}", e),
            Self::ShortRead(e) => write!(f, "short block read: {}", e),
            Self::ShortWrite(e) => write!(f, "short block write: {}", e),
            Self::Io(e) => write!(f, "disk I/O error: {}", e),
        }
    }
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Seek(e) | Self::ShortRead(e) | Self::ShortWrite(e) | Self::Io(e) => Some(e),
            _ => None,
        }
    }
}
