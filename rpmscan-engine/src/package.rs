//! Package projection
//!
//! Walks a header's index entries once and fills a typed record from the
//! well-known NEVRA tags. The extended form additionally captures a
//! caller-chosen set of tags as dynamically typed values.

use std::collections::{BTreeMap, HashSet};

use byteorder::{BigEndian, ByteOrder};
use tracing::debug;

use crate::error::ProjectError;
use crate::header::entry::{IndexEntry, TagType};
use crate::header::value::{entry_value, string_from_nul_padded, HeaderString, TagValue};
use crate::tags::TagId;

/// Placeholder rpm writes for string tags that were never set; normalized
/// to the empty string for source_rpm, license, and vendor.
const NONE_PLACEHOLDER: &str = "(none)";

/// Identity and metadata of one installed package
///
/// String fields carry the header's bytes verbatim (rpm does not promise
/// UTF-8); `HeaderString` renders them lossily for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    /// Epoch; 0 when the header carries no EPOCH tag
    pub epoch: i64,
    pub name: HeaderString,
    pub version: HeaderString,
    pub release: HeaderString,
    pub arch: HeaderString,
    pub source_rpm: HeaderString,
    /// Installed size in bytes
    pub size: i64,
    pub license: HeaderString,
    pub vendor: HeaderString,
}

impl PackageInfo {
    /// Project the NEVRA tags out of a header's index entries. Tags other
    /// than the recognized set are ignored.
    pub fn from_entries(entries: &[IndexEntry<'_>]) -> Result<Self, ProjectError> {
        let mut info = PackageInfo::default();
        for entry in entries {
            info.apply(entry)?;
        }
        Ok(info)
    }

    /// The conventional name-epoch:version-release.arch rendering.
    pub fn nevra(&self) -> String {
        format!(
            "{}-{}:{}-{}.{}",
            self.name, self.epoch, self.version, self.release, self.arch
        )
    }

    /// Apply one entry; returns whether the tag was consumed as a
    /// recognized field.
    fn apply(&mut self, entry: &IndexEntry<'_>) -> Result<bool, ProjectError> {
        match entry.info.tag {
            TagId::NAME => self.name = expect_string(entry)?,
            TagId::VERSION => self.version = expect_string(entry)?,
            TagId::RELEASE => self.release = expect_string(entry)?,
            TagId::ARCH => self.arch = expect_string(entry)?,
            TagId::EPOCH => self.epoch = expect_int32(entry)? as i64,
            TagId::SIZE => self.size = expect_int32(entry)? as i64,
            TagId::SOURCERPM => self.source_rpm = normalize_none(expect_string(entry)?),
            TagId::LICENSE => self.license = normalize_none(expect_string(entry)?),
            TagId::VENDOR => self.vendor = normalize_none(expect_string(entry)?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// A package record plus the caller-requested extra tags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageInfoEx {
    pub info: PackageInfo,
    pub tags_map: BTreeMap<TagId, TagValue>,
}

impl PackageInfoEx {
    /// Project NEVRA fields plus any entry whose tag is in `requested`.
    ///
    /// A type mismatch on a NEVRA tag fails the projection; a decode
    /// failure on a requested extra tag only drops that tag.
    pub fn from_entries(
        entries: &[IndexEntry<'_>],
        requested: &HashSet<TagId>,
    ) -> Result<Self, ProjectError> {
        let mut info = PackageInfo::default();
        let mut tags_map = BTreeMap::new();

        for entry in entries {
            if info.apply(entry)? {
                continue;
            }
            if !requested.contains(&entry.info.tag) {
                continue;
            }
            match entry_value(entry) {
                Ok(Some(value)) => {
                    tags_map.insert(entry.info.tag, value);
                }
                Ok(None) => {}
                Err(err) => {
                    debug!(tag = %entry.info.tag, %err, "skipping undecodable extended tag");
                }
            }
        }

        Ok(PackageInfoEx { info, tags_map })
    }
}

fn expect_string(entry: &IndexEntry<'_>) -> Result<HeaderString, ProjectError> {
    if entry.info.typ != TagType::String {
        return Err(ProjectError::InvalidTagType {
            tag: entry.info.tag,
            expected: TagType::String,
            actual: entry.info.typ,
        });
    }
    Ok(string_from_nul_padded(entry.data))
}

/// Read a signed 32-bit value. A count above 1 still projects the single
/// element at offset 0.
fn expect_int32(entry: &IndexEntry<'_>) -> Result<i32, ProjectError> {
    if entry.info.typ != TagType::Int32 {
        return Err(ProjectError::InvalidTagType {
            tag: entry.info.tag,
            expected: TagType::Int32,
            actual: entry.info.typ,
        });
    }
    if entry.data.len() < 4 {
        return Err(ProjectError::BinaryReadFailure(entry.info.tag));
    }
    Ok(BigEndian::read_i32(&entry.data[..4]))
}

fn normalize_none(value: HeaderString) -> HeaderString {
    if value == NONE_PLACEHOLDER {
        HeaderString::default()
    } else {
        value
    }
}
