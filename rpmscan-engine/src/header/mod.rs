//! RPM header blob decoding
//!
//! Every value in the package database is a self-describing "header": a
//! 16-byte intro, an index table typing and locating each tag, and a data
//! store holding the raw bytes. All integers in the header body are
//! big-endian regardless of the database's byte order.

pub mod decode;
pub mod entry;
pub mod value;

pub use decode::{decode, region_backpointer};
pub use entry::{EntryInfo, IndexEntry, TagType};
pub use value::{entry_value, HeaderString, TagValue};
