//! Error types for the rpmscan engine
//!
//! Each layer of the reader has its own error enum so callers can
//! pattern-match on the exact failure: opening the database (L1 setup),
//! scanning pages (L1), decoding a header blob (L2), and projecting a
//! package record (L3). `RpmDbError` wraps all four for the top-level API.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::header::entry::TagType;
use crate::tags::TagId;

/// Failures while opening a database file and validating its metadata page.
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("database file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied opening database file: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("bad hash metadata magic {0:#010x}")]
    UnsupportedMagic(u32),

    #[error("encrypted databases are not supported (algorithm {0})")]
    UnsupportedEncryption(u8),

    #[error("unsupported page size {0}")]
    UnsupportedPageSize(u32),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Failures while scanning pages and reassembling record values.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("corrupt page {page_no}: {reason}")]
    CorruptPage { page_no: u32, reason: &'static str },

    #[error("overflow chain length mismatch: expected {expected} bytes, got {got}")]
    ShortOverflow { expected: usize, got: usize },

    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Failures while decoding a header blob into index entries.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("bad header magic")]
    BadMagic,

    #[error("header size mismatch: declared {declared} bytes, have {actual}")]
    SizeMismatch { declared: u64, actual: u64 },

    #[error("bad index entry {index}: {reason}")]
    BadIndexEntry { index: usize, reason: &'static str },

    #[error("missing region trailer")]
    MissingRegionTrailer,
}

/// Failures while projecting index entries into a package record.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("tag {tag} has type {actual:?}, expected {expected:?}")]
    InvalidTagType {
        tag: TagId,
        expected: TagType,
        actual: TagType,
    },

    #[error("failed to read binary value for tag {0}")]
    BinaryReadFailure(TagId),
}

/// Top-level error for the installed-package database API.
///
/// Layer errors propagate unchanged; the wrapper only adds the context of
/// which layer produced them.
#[derive(Error, Debug)]
pub enum RpmDbError {
    #[error("failed to open package database: {0}")]
    Open(#[from] OpenError),

    #[error("berkeley db scan failed: {0}")]
    Read(#[from] ReadError),

    #[error("header decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("package projection failed: {0}")]
    Project(#[from] ProjectError),
}

/// Result type for top-level database operations.
pub type RpmDbResult<T> = Result<T, RpmDbError>;
