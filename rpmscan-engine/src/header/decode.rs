//! Header blob parsing
//!
//! Blob layout:
//!
//! | Region      | Size       | Contents                                  |
//! |-------------|------------|-------------------------------------------|
//! | Intro       | 16 bytes   | magic `8E AD E8`, version 1, 4 reserved   |
//! |             |            | bytes, `il` (u32 BE), `dl` (u32 BE)       |
//! | Index table | `il * 16`  | `{tag, type, offset, count}` rows (BE)    |
//! | Data store  | `dl` bytes | raw bytes addressed by entry offsets      |
//!
//! The first index entry is the region trailer: a 16-byte BIN entry whose
//! tag names the region kind and whose data slot re-encodes an entry-info
//! quad pointing back at the region start.

use byteorder::{BigEndian, ByteOrder};

use crate::error::DecodeError;
use crate::tags::TagId;
use super::entry::{EntryInfo, IndexEntry, TagType};

/// Magic bytes opening every header blob
pub const HEADER_MAGIC: [u8; 3] = [0x8e, 0xad, 0xe8];
/// Header format version
pub const HEADER_VERSION: u8 = 1;
/// Size of the fixed intro
pub const INTRO_SIZE: usize = 16;
/// Element count of a region trailer entry
const REGION_TAG_COUNT: u32 = 16;

/// Decode a header blob into its index entries, preserving on-disk order.
pub fn decode(blob: &[u8]) -> Result<Vec<IndexEntry<'_>>, DecodeError> {
    if blob.len() < INTRO_SIZE || blob[0..3] != HEADER_MAGIC || blob[3] != HEADER_VERSION {
        return Err(DecodeError::BadMagic);
    }

    let il = BigEndian::read_u32(&blob[8..12]) as usize;
    let dl = BigEndian::read_u32(&blob[12..16]) as usize;
    if il < 1 {
        return Err(DecodeError::MissingRegionTrailer);
    }

    let declared = INTRO_SIZE as u64 + il as u64 * EntryInfo::SIZE as u64 + dl as u64;
    if declared > blob.len() as u64 {
        return Err(DecodeError::SizeMismatch {
            declared,
            actual: blob.len() as u64,
        });
    }

    let store_start = INTRO_SIZE + il * EntryInfo::SIZE;
    let store = &blob[store_start..store_start + dl];

    let mut entries = Vec::with_capacity(il);
    for i in 0..il {
        let base = INTRO_SIZE + i * EntryInfo::SIZE;
        let raw = &blob[base..base + EntryInfo::SIZE];

        let tag = TagId(BigEndian::read_i32(&raw[0..4]));
        let typ = TagType::try_from(BigEndian::read_u32(&raw[4..8])).map_err(|_| {
            DecodeError::BadIndexEntry {
                index: i,
                reason: "unknown tag type",
            }
        })?;
        let offset = BigEndian::read_i32(&raw[8..12]);
        let count = BigEndian::read_u32(&raw[12..16]);

        if offset < 0 {
            return Err(DecodeError::BadIndexEntry {
                index: i,
                reason: "negative data offset",
            });
        }
        let start = offset as usize;
        if start > dl {
            return Err(DecodeError::SizeMismatch {
                declared: start as u64,
                actual: dl as u64,
            });
        }
        if typ == TagType::String && count != 1 {
            return Err(DecodeError::BadIndexEntry {
                index: i,
                reason: "string entries must have count 1",
            });
        }

        let data = match typ.fixed_width() {
            Some(width) => {
                let need = start as u64 + width as u64 * count as u64;
                if need > dl as u64 {
                    return Err(DecodeError::SizeMismatch {
                        declared: need,
                        actual: dl as u64,
                    });
                }
                &store[start..start + width * count as usize]
            }
            // NUL-delimited payloads run through the count-th terminator,
            // bounded by the end of the data store.
            None => nul_delimited(&store[start..], count),
        };

        entries.push(IndexEntry {
            info: EntryInfo {
                tag,
                typ,
                offset,
                count,
            },
            data,
        });
    }

    let trailer = entries[0].info;
    if trailer.typ != TagType::Bin
        || trailer.count != REGION_TAG_COUNT
        || !(TagId::HEADER_IMAGE.0..=TagId::HEADER_REGIONS.0).contains(&trailer.tag.0)
    {
        return Err(DecodeError::MissingRegionTrailer);
    }

    Ok(entries)
}

/// Extent of a NUL-delimited payload: everything through the `count`-th
/// NUL, or to the end of the slice when fewer terminators are present.
fn nul_delimited(data: &[u8], count: u32) -> &[u8] {
    if count == 0 {
        return &data[..0];
    }
    let mut seen = 0;
    for (i, &b) in data.iter().enumerate() {
        if b == 0 {
            seen += 1;
            if seen == count {
                return &data[..=i];
            }
        }
    }
    data
}

/// Parse the region trailer's back-pointer: its 16-byte data slot encodes
/// another entry-info quad whose offset points at the start of the region.
/// The decoder only enforces trailer presence; verifying the pointer is
/// the caller's choice.
pub fn region_backpointer(trailer: &IndexEntry<'_>) -> Option<EntryInfo> {
    if trailer.info.typ != TagType::Bin || trailer.data.len() != EntryInfo::SIZE {
        return None;
    }
    let typ = TagType::try_from(BigEndian::read_u32(&trailer.data[4..8])).ok()?;
    Some(EntryInfo {
        tag: TagId(BigEndian::read_i32(&trailer.data[0..4])),
        typ,
        offset: BigEndian::read_i32(&trailer.data[8..12]),
        count: BigEndian::read_u32(&trailer.data[12..16]),
    })
}
