//! Hash metadata page - page 0 of a Berkeley DB Hash file
//!
//! Layout (generic metadata header, then hash-specific fields):
//! - Offset 0x00: LSN (8 bytes, unused here)
//! - Offset 0x08: page_no (u32)
//! - Offset 0x0C: magic (u32, 0x00061561 for the Hash access method)
//! - Offset 0x10: version (u32)
//! - Offset 0x14: page_size (u32)
//! - Offset 0x18: encryption_alg (u8)
//! - Offset 0x19: page_type (u8, 0x08)
//! - Offset 0x1A: meta_flags (u8)
//! - Offset 0x1C: free list head (u32)
//! - Offset 0x20: last_page_no (u32)
//! - Offset 0x24: num_parts (u32)
//! - Offset 0x28: key_count (u32)
//! - Offset 0x2C: record_count (u32)
//! - Offset 0x30: flags (u32)
//! - Offset 0x34: unique file id (20 bytes)
//! - Offset 0x48: max_bucket (u32)
//! - Offset 0x4C: high_mask (u32)
//! - Offset 0x50: low_mask (u32)
//! - Offset 0x54: fill_factor (u32)
//! - Offset 0x58: num_keys (u32, number of key/value pairs)
//! - Offset 0x5C: char_key_hash (u32, hash function identifier)
//!
//! The byte order of the magic field determines the byte order of every
//! multi-byte field in the file.

use tracing::warn;

use crate::error::OpenError;
use super::page::{Endian, PageType, PAGE_SIZES};

/// Magic number of the Hash access method
pub const HASH_MAGIC: u32 = 0x0006_1561;

/// On-disk database format version this reader was written against
pub const HASH_VERSION: u32 = 9;

bitflags::bitflags! {
    /// Access-method flags stored in the metadata page
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MetaFlags: u32 {
        /// Duplicate keys allowed
        const DUP = 0x01;
        /// File contains subdatabases
        const SUBDB = 0x02;
        /// Duplicates are sorted
        const DUPSORT = 0x04;
    }
}

/// Parsed hash metadata page
#[derive(Debug, Clone)]
pub struct HashMetadata {
    /// Byte order detected from the magic field
    pub endian: Endian,
    /// Page number as recorded on the page (0)
    pub page_no: u32,
    /// Access-method magic
    pub magic: u32,
    /// Format version
    pub version: u32,
    /// Page size governing every offset in the file
    pub page_size: u32,
    /// Encryption algorithm (0 = unencrypted; anything else is rejected)
    pub encryption_alg: u8,
    /// Page type byte
    pub page_type: PageType,
    /// Access-method flags
    pub flags: MetaFlags,
    /// Head of the free page list
    pub free: u32,
    /// Number of the last page in the database
    pub last_page_no: u32,
    /// Number of partitions
    pub num_parts: u32,
    /// Cached key count
    pub key_count: u32,
    /// Cached record count
    pub record_count: u32,
    /// Highest bucket in use
    pub max_bucket: u32,
    /// Modulo mask into the bucket table
    pub high_mask: u32,
    /// Modulo mask into the lower half of the bucket table
    pub low_mask: u32,
    /// Fill factor
    pub fill_factor: u32,
    /// Number of key/value pairs in the hash table
    pub num_keys: u32,
    /// Value of hash(CHARKEY), identifies the hash function
    pub char_key_hash: u32,
}

impl HashMetadata {
    /// Bytes of page 0 needed to parse the metadata
    pub const SIZE: usize = 0x60;

    /// Parse the metadata page, detecting byte order from the magic field
    pub fn from_bytes(data: &[u8]) -> Result<Self, OpenError> {
        if data.len() < Self::SIZE {
            return Err(OpenError::UnsupportedMagic(0));
        }

        let le_magic = Endian::Little.read_u32(data, 0x0C);
        let endian = if le_magic == HASH_MAGIC {
            Endian::Little
        } else if Endian::Big.read_u32(data, 0x0C) == HASH_MAGIC {
            Endian::Big
        } else {
            return Err(OpenError::UnsupportedMagic(le_magic));
        };

        let meta = HashMetadata {
            endian,
            page_no: endian.read_u32(data, 0x08),
            magic: HASH_MAGIC,
            version: endian.read_u32(data, 0x10),
            page_size: endian.read_u32(data, 0x14),
            encryption_alg: data[0x18],
            page_type: PageType::from(data[0x19]),
            flags: MetaFlags::from_bits_retain(endian.read_u32(data, 0x30)),
            free: endian.read_u32(data, 0x1C),
            last_page_no: endian.read_u32(data, 0x20),
            num_parts: endian.read_u32(data, 0x24),
            key_count: endian.read_u32(data, 0x28),
            record_count: endian.read_u32(data, 0x2C),
            max_bucket: endian.read_u32(data, 0x48),
            high_mask: endian.read_u32(data, 0x4C),
            low_mask: endian.read_u32(data, 0x50),
            fill_factor: endian.read_u32(data, 0x54),
            num_keys: endian.read_u32(data, 0x58),
            char_key_hash: endian.read_u32(data, 0x5C),
        };

        if meta.encryption_alg != 0 {
            return Err(OpenError::UnsupportedEncryption(meta.encryption_alg));
        }
        if !PAGE_SIZES.contains(&meta.page_size) {
            return Err(OpenError::UnsupportedPageSize(meta.page_size));
        }
        if meta.version != HASH_VERSION {
            warn!(version = meta.version, "unexpected hash database version");
        }

        Ok(meta)
    }
}
