use crate::fs::config::{MAX_EXT, MAX_NAME};
use crate::fs::error::{FsError, Result};

/// A decomposed two-level path. The extension of a `File` may be empty
/// when the path carries no dot; creation rejects that later, lookups
/// compare it against the on-disk record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPath {
    Root,
    Directory(String),
    File { dir: String, name: String, ext: String },
}

/// Tokenizes `/`, `/dir` or `/dir/name.ext`, validating every segment's
/// length before any disk lookup happens.
pub fn resolve(path: &str) -> Result<ResolvedPath> {
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| FsError::InvalidPath(path.to_string()))?;

    if rest.is_empty() {
        return Ok(ResolvedPath::Root);
    }

    let mut segments = rest.split('/');
    let dir = segments.next().unwrap_or_default();
    let file = segments.next();
    if dir.is_empty() || segments.next().is_some() || file.map_or(false, str::is_empty) {
        return Err(FsError::InvalidPath(path.to_string()));
    }
    if dir.len() > MAX_NAME {
        return Err(FsError::NameTooLong(dir.to_string()));
    }

    let file = match file {
        None => return Ok(ResolvedPath::Directory(dir.to_string())),
        Some(f) => f,
    };

    // Split at the first dot; the remainder is the extension.
    let (name, ext) = match file.split_once('.') {
        Some((name, ext)) => (name, ext),
        None => (file, ""),
    };
    if name.is_empty() {
        return Err(FsError::InvalidPath(path.to_string()));
    }
    if name.len() > MAX_NAME {
        return Err(FsError::NameTooLong(name.to_string()));
    }
    if ext.len() > MAX_EXT {
        return Err(FsError::NameTooLong(ext.to_string()));
    }

    Ok(ResolvedPath::File {
        dir: dir.to_string(),
        name: name.to_string(),
        ext: ext.to_string(),
    })
}
