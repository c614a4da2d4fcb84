//! Hash page records
//!
//! Each hash page carries a slot table of page-local offsets. Records are
//! stored from the end of the page backward and come in key/value pairs:
//! keys occupy even slots, values the following odd slot. The first byte
//! at a record's offset is its type: keydata records inline their bytes on
//! the page, offpage records reference an overflow chain by first page
//! number and total length.

use std::io;

use super::page::{Endian, PageHeader};

/// Inline key/data record
pub const HASH_KEYDATA: u8 = 1;
/// Duplicate set (unsupported in an rpm database)
pub const HASH_DUPLICATE: u8 = 2;
/// Record stored in an overflow chain
pub const HASH_OFFPAGE: u8 = 3;
/// Duplicate set stored offpage (unsupported in an rpm database)
pub const HASH_OFFDUP: u8 = 4;

/// Offpage record body
///
/// Layout: type (u8), 3 padding bytes, first overflow page (u32), total
/// length in bytes (u32).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffPageEntry {
    /// First page of the overflow chain
    pub page_no: u32,
    /// Total length of the record across the chain
    pub length: u32,
}

impl OffPageEntry {
    /// Size of an offpage record on the hash page
    pub const SIZE: usize = 12;

    /// Parse an offpage record (starting at its type byte)
    pub fn from_bytes(data: &[u8], endian: Endian) -> io::Result<Self> {
        if data.len() < Self::SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "offpage record too short",
            ));
        }
        Ok(OffPageEntry {
            page_no: endian.read_u32(data, 4),
            length: endian.read_u32(data, 8),
        })
    }
}

/// A record located on a hash page
#[derive(Debug)]
pub enum HashItem<'a> {
    /// Bytes stored inline on the page
    Inline(&'a [u8]),
    /// Reference to an overflow chain
    OffPage(OffPageEntry),
}

/// Compute the byte extent of slot `index` on a page.
///
/// Records grow backward from the page end, so a record runs from its own
/// offset up to the previous slot's offset (the page end for slot 0). The
/// start must not fall below the free-space boundary.
pub fn item_extent(
    offsets: &[u16],
    index: usize,
    page_size: usize,
    free_area_offset: u16,
) -> Result<(usize, usize), &'static str> {
    let start = offsets[index] as usize;
    let end = if index == 0 {
        page_size
    } else {
        offsets[index - 1] as usize
    };

    if start < PageHeader::SIZE || start < free_area_offset as usize {
        return Err("record offset below free-space boundary");
    }
    if start >= end || end > page_size {
        return Err("record extent outside page bounds");
    }
    Ok((start, end))
}

/// Parse the record at slot `index` of a hash page.
pub fn parse_item<'a>(
    page: &'a [u8],
    offsets: &[u16],
    index: usize,
    free_area_offset: u16,
    endian: Endian,
) -> Result<HashItem<'a>, &'static str> {
    let (start, end) = item_extent(offsets, index, page.len(), free_area_offset)?;

    match page[start] {
        HASH_KEYDATA => Ok(HashItem::Inline(&page[start + 1..end])),
        HASH_OFFPAGE => {
            if start + OffPageEntry::SIZE > page.len() {
                return Err("offpage record truncated");
            }
            let entry = OffPageEntry::from_bytes(&page[start..start + OffPageEntry::SIZE], endian)
                .map_err(|_| "offpage record truncated")?;
            Ok(HashItem::OffPage(entry))
        }
        HASH_DUPLICATE | HASH_OFFDUP => Err("duplicate records are not supported"),
        _ => Err("unknown hash record type"),
    }
}
