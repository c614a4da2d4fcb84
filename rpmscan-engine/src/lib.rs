//! rpmscan engine - read-only access to RPM's installed-package database
//!
//! This crate reads the `Packages` file written by rpm's Berkeley DB
//! backend (Hash access method) and decodes the self-describing header
//! blob stored for each installed package, without linking against any
//! database library.

pub mod bdb;
pub mod error;
pub mod header;
pub mod package;
pub mod rpmdb;
pub mod tags;

pub use error::{DecodeError, OpenError, ProjectError, ReadError, RpmDbError, RpmDbResult};
pub use header::{HeaderString, IndexEntry, TagType, TagValue};
pub use package::{PackageInfo, PackageInfoEx};
pub use rpmdb::RpmDb;
pub use tags::TagId;
