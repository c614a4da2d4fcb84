//! Read-only Berkeley DB Hash access
//!
//! rpm stores its package database in a Berkeley DB file using the Hash
//! access method. This module parses that on-disk format directly: the
//! metadata page (page 0), hash bucket pages, and overflow-page chains
//! for values too large to live on a bucket page.

pub mod entry;
pub mod metadata;
pub mod page;
pub mod reader;

pub use metadata::{HashMetadata, MetaFlags};
pub use page::{Endian, PageHeader, PageType};
pub use reader::{HashReader, RawRecord, Records};
