//! Read-only traversal of a Berkeley DB Hash database file
//!
//! `HashReader::open` validates the metadata page; `records()` walks every
//! page from 1 to the last page, yielding the key/value pairs stored on
//! hash pages in page order, then slot order. Values too large for a
//! bucket page are reassembled from their overflow chains. The ordering is
//! an artifact of the physical layout and carries no meaning for callers.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::error::{OpenError, ReadError};
use super::entry::{parse_item, HashItem};
use super::metadata::HashMetadata;
use super::page::{slot_offsets, PageHeader, PageType};

/// Berkeley DB keeps internal bookkeeping records under the 4-byte key 0;
/// they are not packages and are filtered out of the scan.
const BOOKKEEPING_KEY: [u8; 4] = [0, 0, 0, 0];

/// Enough of page 0 to parse the hash metadata at any page size.
const META_PREFIX_LEN: usize = 512;

/// One key/value record from the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Read-only handle on a Hash database file
pub struct HashReader {
    file: File,
    meta: HashMetadata,
    page_size: usize,
}

impl HashReader {
    /// Open a database file and validate its metadata page.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OpenError> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => OpenError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => OpenError::PermissionDenied(path.to_path_buf()),
            _ => OpenError::Io(e),
        })?;

        let mut prefix = [0u8; META_PREFIX_LEN];
        file.read_exact(&mut prefix)?;
        let meta = HashMetadata::from_bytes(&prefix)?;

        debug!(
            page_size = meta.page_size,
            last_page = meta.last_page_no,
            num_keys = meta.num_keys,
            "opened hash database"
        );

        Ok(HashReader {
            file,
            page_size: meta.page_size as usize,
            meta,
        })
    }

    /// The parsed metadata page.
    pub fn metadata(&self) -> &HashMetadata {
        &self.meta
    }

    /// Scan all records in physical page order. The returned sequence is
    /// fused: after the first error it yields nothing further.
    pub fn records(&mut self) -> Records<'_> {
        Records {
            reader: self,
            next_page: 1,
            current: None,
            done: false,
        }
    }

    fn read_page(&mut self, page_no: u32) -> Result<Vec<u8>, ReadError> {
        if page_no > self.meta.last_page_no {
            return Err(ReadError::CorruptPage {
                page_no,
                reason: "page number beyond last page",
            });
        }

        let mut buf = vec![0u8; self.page_size];
        self.file
            .seek(SeekFrom::Start(page_no as u64 * self.page_size as u64))?;
        self.file.read_exact(&mut buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                ReadError::UnexpectedEof
            } else {
                ReadError::Io(e)
            }
        })?;
        Ok(buf)
    }

    /// Reassemble an overflow chain: concatenate each page's payload until
    /// the chain ends or `total_len` bytes have been collected.
    fn read_overflow_chain(&mut self, first_page: u32, total_len: usize) -> Result<Vec<u8>, ReadError> {
        let mut out = Vec::with_capacity(total_len);
        let mut page_no = first_page;
        let mut hops: u32 = 0;

        while page_no != 0 && out.len() < total_len {
            // A chain cannot be longer than the database itself.
            if hops > self.meta.last_page_no {
                return Err(ReadError::CorruptPage {
                    page_no,
                    reason: "overflow chain loops",
                });
            }
            hops += 1;

            let page = self.read_page(page_no)?;
            let header = PageHeader::from_bytes(&page, self.meta.endian).map_err(|_| {
                ReadError::CorruptPage {
                    page_no,
                    reason: "short page header",
                }
            })?;
            if header.page_type != PageType::Overflow {
                return Err(ReadError::CorruptPage {
                    page_no,
                    reason: "expected overflow page",
                });
            }

            let payload_len = header.free_area_offset as usize;
            if PageHeader::SIZE + payload_len > self.page_size {
                return Err(ReadError::CorruptPage {
                    page_no,
                    reason: "overflow payload exceeds page",
                });
            }
            out.extend_from_slice(&page[PageHeader::SIZE..PageHeader::SIZE + payload_len]);
            page_no = header.next_page;
        }

        if out.len() != total_len {
            return Err(ReadError::ShortOverflow {
                expected: total_len,
                got: out.len(),
            });
        }
        Ok(out)
    }

    /// Materialize the record at a slot, following its overflow chain if
    /// the record is stored offpage.
    fn read_item(
        &mut self,
        page: &[u8],
        page_no: u32,
        offsets: &[u16],
        index: usize,
        free_area_offset: u16,
    ) -> Result<Vec<u8>, ReadError> {
        match parse_item(page, offsets, index, free_area_offset, self.meta.endian) {
            Ok(HashItem::Inline(data)) => Ok(data.to_vec()),
            Ok(HashItem::OffPage(entry)) => {
                self.read_overflow_chain(entry.page_no, entry.length as usize)
            }
            Err(reason) => Err(ReadError::CorruptPage { page_no, reason }),
        }
    }
}

struct PageCursor {
    page: Vec<u8>,
    page_no: u32,
    offsets: Vec<u16>,
    free_area_offset: u16,
    next_pair: usize,
}

/// Lazy record sequence over a `HashReader`
pub struct Records<'a> {
    reader: &'a mut HashReader,
    next_page: u32,
    current: Option<PageCursor>,
    done: bool,
}

impl Iterator for Records<'_> {
    type Item = Result<RawRecord, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let Records {
            reader,
            next_page,
            current,
            done,
        } = self;

        loop {
            // Drain the key/value pairs of the current page first.
            if let Some(cur) = current.as_mut() {
                while cur.next_pair * 2 + 1 < cur.offsets.len() {
                    let key_index = cur.next_pair * 2;
                    cur.next_pair += 1;

                    let key = match reader.read_item(
                        &cur.page,
                        cur.page_no,
                        &cur.offsets,
                        key_index,
                        cur.free_area_offset,
                    ) {
                        Ok(key) => key,
                        Err(e) => {
                            *done = true;
                            return Some(Err(e));
                        }
                    };
                    if key == BOOKKEEPING_KEY {
                        debug!(page = cur.page_no, "skipping bookkeeping record");
                        continue;
                    }

                    let value = match reader.read_item(
                        &cur.page,
                        cur.page_no,
                        &cur.offsets,
                        key_index + 1,
                        cur.free_area_offset,
                    ) {
                        Ok(value) => value,
                        Err(e) => {
                            *done = true;
                            return Some(Err(e));
                        }
                    };
                    return Some(Ok(RawRecord { key, value }));
                }
                *current = None;
            }

            // Advance to the next page that carries hash entries.
            if *next_page > reader.meta.last_page_no {
                *done = true;
                return None;
            }
            let page_no = *next_page;
            *next_page += 1;

            let page = match reader.read_page(page_no) {
                Ok(page) => page,
                Err(e) => {
                    *done = true;
                    return Some(Err(e));
                }
            };
            let header = match PageHeader::from_bytes(&page, reader.meta.endian) {
                Ok(header) => header,
                Err(_) => {
                    *done = true;
                    return Some(Err(ReadError::CorruptPage {
                        page_no,
                        reason: "short page header",
                    }));
                }
            };

            // Overflow pages are only reached through offpage records;
            // anything else that is not a hash page is skipped.
            if !header.page_type.holds_hash_entries() {
                continue;
            }
            if header.num_entries % 2 != 0 {
                *done = true;
                return Some(Err(ReadError::CorruptPage {
                    page_no,
                    reason: "hash entries must come in key/value pairs",
                }));
            }

            let offsets = match slot_offsets(&page, header.num_entries, reader.meta.endian) {
                Ok(offsets) => offsets,
                Err(_) => {
                    *done = true;
                    return Some(Err(ReadError::CorruptPage {
                        page_no,
                        reason: "slot table exceeds page",
                    }));
                }
            };

            *current = Some(PageCursor {
                page,
                page_no,
                offsets,
                free_area_offset: header.free_area_offset,
                next_pair: 0,
            });
        }
    }
}
