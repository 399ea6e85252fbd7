// src/blockchain/block_header.rs

use byteorder::{ByteOrder, LittleEndian};
use sha2::{Digest, Sha256};

/// Size of a serialized header without the optional accumulator checkpoint.
pub const HEADER_SIZE: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeaderData {
    pub version: i32,
    pub prev_block_hash: [u8; 32],
    pub merkle_root: [u8; 32],
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeaderData {
    /// Little-endian consensus serialization of the header fields.
    pub fn serialize(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        LittleEndian::write_i32(&mut buf[0..4], self.version);
        buf[4..36].copy_from_slice(&self.prev_block_hash);
        buf[36..68].copy_from_slice(&self.merkle_root);
        LittleEndian::write_u32(&mut buf[68..72], self.timestamp);
        LittleEndian::write_u32(&mut buf[72..76], self.bits);
        LittleEndian::write_u32(&mut buf[76..80], self.nonce);
        buf
    }

    // Double SHA-256, stored in internal (little-endian) byte order.
    pub fn get_hash(&self) -> [u8; 32] {
        let first = Sha256::digest(self.serialize());
        let second = Sha256::digest(first);
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&second);
        hash
    }

    pub fn is_genesis_header(&self) -> bool {
        self.prev_block_hash == [0u8; 32]
    }
}
