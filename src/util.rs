// Display helpers shared by chain lookups and error messages.

/// Hex form of a block hash in the conventional display order (byte-reversed).
pub fn hash_to_hex(hash: &[u8; 32]) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Parses a display-order hex hash back into internal byte order.
pub fn hash_from_hex(s: &str) -> Option<[u8; 32]> {
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(s, &mut bytes).ok()?;
    bytes.reverse();
    Some(bytes)
}

/// Compact difficulty bits as 8 lowercase hex digits.
pub fn bits_to_hex(bits: u32) -> String {
    hex::encode(bits.to_be_bytes())
}
