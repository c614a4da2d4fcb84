//! Dynamically typed tag values
//!
//! Used by the extended projection to hand back tags the caller asked for
//! without a dedicated field. The mapping from on-disk types follows the
//! header format: integers are big-endian and unsigned, strings are
//! NUL-terminated, BIN data is rendered as lowercase hex.

use std::borrow::Cow;
use std::fmt;

use byteorder::{BigEndian, ByteOrder};

use crate::error::ProjectError;
use crate::tags::TagId;
use super::entry::{IndexEntry, TagType};

/// A string decoded from a header.
///
/// rpm guarantees NUL termination but not UTF-8, so the on-disk bytes are
/// kept verbatim; rendering replaces invalid sequences only at `Display`
/// time.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeaderString(Box<[u8]>);

impl HeaderString {
    /// The original bytes, trailing NUL already trimmed.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lossy UTF-8 view for human-facing output.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl From<&[u8]> for HeaderString {
    fn from(bytes: &[u8]) -> Self {
        HeaderString(bytes.into())
    }
}

impl From<&str> for HeaderString {
    fn from(s: &str) -> Self {
        HeaderString(s.as_bytes().into())
    }
}

impl PartialEq<&str> for HeaderString {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == other.as_bytes()
    }
}

impl fmt::Display for HeaderString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_string_lossy())
    }
}

impl fmt::Debug for HeaderString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

/// A decoded tag value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    String(HeaderString),
    Strings(Vec<HeaderString>),
    HexString(String),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::U8(v) => write!(f, "{v}"),
            TagValue::U16(v) => write!(f, "{v}"),
            TagValue::U32(v) => write!(f, "{v}"),
            TagValue::U64(v) => write!(f, "{v}"),
            TagValue::String(s) => write!(f, "{s}"),
            TagValue::HexString(s) => f.write_str(s),
            TagValue::Strings(list) => {
                for (i, s) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{s}")?;
                }
                Ok(())
            }
        }
    }
}

/// Decode one entry into a dynamically typed value.
///
/// NULL entries and the structural BIN entries of the region tag range
/// yield `None`: they carry header plumbing, not user-facing data.
pub fn entry_value(entry: &IndexEntry<'_>) -> Result<Option<TagValue>, ProjectError> {
    let info = entry.info;
    let data = entry.data;

    let value = match info.typ {
        TagType::Null => return Ok(None),
        TagType::Char | TagType::Int8 => {
            let byte = *data
                .first()
                .ok_or(ProjectError::BinaryReadFailure(info.tag))?;
            TagValue::U8(byte)
        }
        TagType::Int16 => {
            if data.len() < 2 {
                return Err(ProjectError::BinaryReadFailure(info.tag));
            }
            TagValue::U16(BigEndian::read_u16(&data[..2]))
        }
        TagType::Int32 => {
            if data.len() < 4 {
                return Err(ProjectError::BinaryReadFailure(info.tag));
            }
            TagValue::U32(BigEndian::read_u32(&data[..4]))
        }
        TagType::Int64 => {
            if data.len() < 8 {
                return Err(ProjectError::BinaryReadFailure(info.tag));
            }
            TagValue::U64(BigEndian::read_u64(&data[..8]))
        }
        TagType::String => TagValue::String(string_from_nul_padded(data)),
        TagType::Bin => {
            if structural_region_tag(info.tag) {
                return Ok(None);
            }
            let bytes = data
                .get(..info.count as usize)
                .ok_or(ProjectError::BinaryReadFailure(info.tag))?;
            TagValue::HexString(to_hex(bytes))
        }
        TagType::StringArray | TagType::I18nString => {
            TagValue::Strings(split_nul_strings(data, info.count))
        }
    };
    Ok(Some(value))
}

/// BIN entries tagged within the region range hold header structure, not
/// package data.
fn structural_region_tag(tag: TagId) -> bool {
    (TagId::HEADER_IMAGE.0..TagId::HEADER_REGIONS.0).contains(&tag.0)
}

/// Decode a STRING payload: drop trailing NULs, keep the bytes verbatim.
pub(crate) fn string_from_nul_padded(data: &[u8]) -> HeaderString {
    let end = data.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    HeaderString::from(&data[..end])
}

/// Split a NUL-delimited payload into exactly `count` strings; missing
/// trailing elements become empty strings.
pub(crate) fn split_nul_strings(data: &[u8], count: u32) -> Vec<HeaderString> {
    let mut out = Vec::with_capacity(count as usize);
    let mut rest = data;
    for _ in 0..count {
        match rest.iter().position(|&b| b == 0) {
            Some(pos) => {
                out.push(HeaderString::from(&rest[..pos]));
                rest = &rest[pos + 1..];
            }
            None => {
                out.push(HeaderString::from(rest));
                rest = &[];
            }
        }
    }
    out
}

fn to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}
