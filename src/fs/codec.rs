//! Helpers for the fixed-width little-endian on-disk records. The layout
//! never depends on in-memory struct layout; every field is copied at a
//! documented offset.

/// Reads a u32 from the first 4 bytes of `src`.
pub fn get_u32(src: &[u8]) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&src[..4]);
    u32::from_le_bytes(b)
}

/// Reads a u64 from the first 8 bytes of `src`.
pub fn get_u64(src: &[u8]) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&src[..8]);
    u64::from_le_bytes(b)
}

pub fn put_u32(dst: &mut [u8], value: u32) {
    dst[..4].copy_from_slice(&value.to_le_bytes());
}

pub fn put_u64(dst: &mut [u8], value: u64) {
    dst[..8].copy_from_slice(&value.to_le_bytes());
}

/// Copies `name` into a NUL-padded fixed-width field. The caller has
/// already validated the length against the field width.
pub fn put_name(dst: &mut [u8], name: &str) {
    dst.fill(0);
    dst[..name.len()].copy_from_slice(name.as_bytes());
}

/// Reads a NUL-padded name field back into a string, stopping at the
/// first NUL byte.
pub fn get_name(src: &[u8]) -> String {
    let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    String::from_utf8_lossy(&src[..end]).into_owned()
}
