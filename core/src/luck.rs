use sha2::{Digest, Sha256};

/// Maps `key` to a reproducible value in `[0, 1)`.
///
/// The value is the top 53 bits of the first eight bytes of the key's SHA-256 digest, read
/// big-endian, so it is identical on every platform and every run.
pub fn luck(key: &str) -> f64 {
    let hash = Sha256::digest(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    let value = u64::from_be_bytes(bytes);
    (value >> 11) as f64 / (1u64 << 53) as f64
}
