//! Top-level installed-package database API
//!
//! Ties the layers together: scan the Berkeley DB records, decode each
//! value as a header blob, and project a package record from it. Any
//! layer error aborts the whole listing.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::bdb::HashReader;
use crate::error::RpmDbResult;
use crate::header;
use crate::package::{PackageInfo, PackageInfoEx};
use crate::tags::TagId;

/// An open installed-package database
pub struct RpmDb {
    reader: HashReader,
}

impl RpmDb {
    /// Open the `Packages` file of an rpm database.
    pub fn open(path: impl AsRef<Path>) -> RpmDbResult<Self> {
        Ok(RpmDb {
            reader: HashReader::open(path)?,
        })
    }

    /// Number of key/value pairs the database claims to hold.
    pub fn declared_package_count(&self) -> u32 {
        self.reader.metadata().num_keys
    }

    /// List every installed package with its NEVRA identity and metadata.
    pub fn list_packages(&mut self) -> RpmDbResult<Vec<PackageInfo>> {
        let mut packages = Vec::new();
        for record in self.reader.records() {
            let record = record?;
            let entries = header::decode(&record.value)?;
            packages.push(PackageInfo::from_entries(&entries)?);
        }
        debug!(count = packages.len(), "listed installed packages");
        Ok(packages)
    }

    /// Like `list_packages`, additionally capturing the requested tags as
    /// dynamically typed values.
    pub fn list_packages_with_tags(&mut self, tags: &[TagId]) -> RpmDbResult<Vec<PackageInfoEx>> {
        let requested: HashSet<TagId> = tags.iter().copied().collect();

        let mut packages = Vec::new();
        for record in self.reader.records() {
            let record = record?;
            let entries = header::decode(&record.value)?;
            packages.push(PackageInfoEx::from_entries(&entries, &requested)?);
        }
        debug!(count = packages.len(), "listed installed packages with tags");
        Ok(packages)
    }
}
