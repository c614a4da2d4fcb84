//! Index-table entry structures for the RPM header format

use crate::tags::TagId;

/// Data type of an index entry, as declared on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TagType {
    Null = 0,
    Char = 1,
    Int8 = 2,
    Int16 = 3,
    Int32 = 4,
    Int64 = 5,
    String = 6,
    Bin = 7,
    StringArray = 8,
    I18nString = 9,
}

impl TagType {
    /// Per-element width in the data store, or `None` for NUL-delimited
    /// types whose extent must be scanned.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            TagType::Null => Some(0),
            TagType::Char | TagType::Int8 | TagType::Bin => Some(1),
            TagType::Int16 => Some(2),
            TagType::Int32 => Some(4),
            TagType::Int64 => Some(8),
            TagType::String | TagType::StringArray | TagType::I18nString => None,
        }
    }
}

impl TryFrom<u32> for TagType {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TagType::Null),
            1 => Ok(TagType::Char),
            2 => Ok(TagType::Int8),
            3 => Ok(TagType::Int16),
            4 => Ok(TagType::Int32),
            5 => Ok(TagType::Int64),
            6 => Ok(TagType::String),
            7 => Ok(TagType::Bin),
            8 => Ok(TagType::StringArray),
            9 => Ok(TagType::I18nString),
            other => Err(other),
        }
    }
}

/// One row of the index table: `{tag, type, offset, count}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    pub tag: TagId,
    pub typ: TagType,
    /// Byte offset of the entry's data within the data store
    pub offset: i32,
    /// Number of elements of `typ` at that offset
    pub count: u32,
}

impl EntryInfo {
    /// On-disk size of one index-table row
    pub const SIZE: usize = 16;
}

/// An index entry together with its data-store bytes.
///
/// `data` borrows from the header blob; nothing is copied until a value is
/// materialized by the projector.
#[derive(Debug, Clone, Copy)]
pub struct IndexEntry<'a> {
    pub info: EntryInfo,
    pub data: &'a [u8],
}
