//! Shared test fixtures: byte-exact builders for RPM header blobs and
//! Berkeley DB Hash files, so the integration suites can fabricate
//! databases in both byte orders without an rpm installation.

#![allow(dead_code)]

use std::path::Path;

use rpmscan_engine::bdb::{Endian, PageHeader};
use rpmscan_engine::header::TagType;
use rpmscan_engine::package::PackageInfo;
use rpmscan_engine::tags::TagId;

/// Builds a valid header blob: intro, region trailer first in the index
/// table, entry data slots packed in push order, and the trailer's
/// back-pointer slot at the end of the data store.
pub struct HeaderBuilder {
    entries: Vec<(i32, u32, u32, Vec<u8>)>,
}

impl HeaderBuilder {
    pub fn new() -> Self {
        HeaderBuilder {
            entries: Vec::new(),
        }
    }

    pub fn raw(mut self, tag: TagId, typ: TagType, count: u32, data: Vec<u8>) -> Self {
        self.entries.push((tag.0, typ as u32, count, data));
        self
    }

    pub fn string(self, tag: TagId, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        self.raw(tag, TagType::String, 1, data)
    }

    pub fn i18n_string(self, tag: TagId, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        self.raw(tag, TagType::I18nString, 1, data)
    }

    pub fn string_array(self, tag: TagId, values: &[&str]) -> Self {
        let mut data = Vec::new();
        for value in values {
            data.extend_from_slice(value.as_bytes());
            data.push(0);
        }
        self.raw(tag, TagType::StringArray, values.len() as u32, data)
    }

    pub fn int32(self, tag: TagId, value: i32) -> Self {
        self.raw(tag, TagType::Int32, 1, value.to_be_bytes().to_vec())
    }

    pub fn bin(self, tag: TagId, bytes: &[u8]) -> Self {
        self.raw(tag, TagType::Bin, bytes.len() as u32, bytes.to_vec())
    }

    pub fn build(&self) -> Vec<u8> {
        let il = self.entries.len() + 1;

        let mut store = Vec::new();
        let mut offsets = Vec::with_capacity(self.entries.len());
        for (_, _, _, data) in &self.entries {
            offsets.push(store.len() as i32);
            store.extend_from_slice(data);
        }

        // Region trailer data slot: an entry-info quad whose offset points
        // back at the start of the immutable region.
        let trailer_offset = store.len() as i32;
        store.extend_from_slice(&TagId::HEADER_IMMUTABLE.0.to_be_bytes());
        store.extend_from_slice(&(TagType::Bin as u32).to_be_bytes());
        store.extend_from_slice(&(-((il as i32) * 16)).to_be_bytes());
        store.extend_from_slice(&16u32.to_be_bytes());

        let mut blob = Vec::with_capacity(16 + il * 16 + store.len());
        blob.extend_from_slice(&[0x8e, 0xad, 0xe8, 0x01]);
        blob.extend_from_slice(&[0; 4]);
        blob.extend_from_slice(&(il as u32).to_be_bytes());
        blob.extend_from_slice(&(store.len() as u32).to_be_bytes());

        blob.extend_from_slice(&TagId::HEADER_IMMUTABLE.0.to_be_bytes());
        blob.extend_from_slice(&(TagType::Bin as u32).to_be_bytes());
        blob.extend_from_slice(&trailer_offset.to_be_bytes());
        blob.extend_from_slice(&16u32.to_be_bytes());

        for (i, (tag, typ, count, _)) in self.entries.iter().enumerate() {
            blob.extend_from_slice(&tag.to_be_bytes());
            blob.extend_from_slice(&typ.to_be_bytes());
            blob.extend_from_slice(&offsets[i].to_be_bytes());
            blob.extend_from_slice(&count.to_be_bytes());
        }

        blob.extend_from_slice(&store);
        blob
    }
}

/// The nine NEVRA tags of the test package (ten index entries with the
/// region trailer).
pub fn bash_builder() -> HeaderBuilder {
    HeaderBuilder::new()
        .string(TagId::NAME, "bash")
        .int32(TagId::EPOCH, 0)
        .string(TagId::VERSION, "5.1.8")
        .string(TagId::RELEASE, "6.el9")
        .string(TagId::ARCH, "x86_64")
        .int32(TagId::SIZE, 7_000_000)
        .string(TagId::LICENSE, "GPLv3+")
        .string(TagId::VENDOR, "Red Hat, Inc.")
        .string(TagId::SOURCERPM, "bash-5.1.8-6.el9.src.rpm")
}

pub fn bash_header() -> Vec<u8> {
    bash_builder().build()
}

pub fn expected_bash() -> PackageInfo {
    PackageInfo {
        epoch: 0,
        name: "bash".into(),
        version: "5.1.8".into(),
        release: "6.el9".into(),
        arch: "x86_64".into(),
        source_rpm: "bash-5.1.8-6.el9.src.rpm".into(),
        size: 7_000_000,
        license: "GPLv3+".into(),
        vendor: "Red Hat, Inc.".into(),
    }
}

/// Builds a Berkeley DB Hash file in either byte order. Records are laid
/// out on bucket pages in pairs (key on the even slot, value on the odd
/// one); values that do not fit inline are written as offpage records
/// with an overflow chain appended after the bucket pages.
pub struct BdbBuilder {
    page_size: usize,
    endian: Endian,
    encryption_alg: u8,
    pages: Vec<Vec<(Vec<u8>, Vec<u8>)>>,
}

impl BdbBuilder {
    pub fn new(page_size: usize, endian: Endian) -> Self {
        BdbBuilder {
            page_size,
            endian,
            encryption_alg: 0,
            pages: Vec::new(),
        }
    }

    /// One record on its own bucket page.
    pub fn record(mut self, key: &[u8], value: &[u8]) -> Self {
        self.pages.push(vec![(key.to_vec(), value.to_vec())]);
        self
    }

    /// Several records sharing a single bucket page.
    pub fn page(mut self, records: &[(&[u8], &[u8])]) -> Self {
        self.pages.push(
            records
                .iter()
                .map(|(k, v)| (k.to_vec(), v.to_vec()))
                .collect(),
        );
        self
    }

    pub fn encryption_alg(mut self, alg: u8) -> Self {
        self.encryption_alg = alg;
        self
    }

    fn put16(&self, buf: &mut [u8], offset: usize, value: u16) {
        let bytes = match self.endian {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        };
        buf[offset..offset + 2].copy_from_slice(&bytes);
    }

    fn put32(&self, buf: &mut [u8], offset: usize, value: u32) {
        let bytes = match self.endian {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        };
        buf[offset..offset + 4].copy_from_slice(&bytes);
    }

    pub fn build(&self) -> Vec<u8> {
        let ps = self.page_size;
        let num_bucket_pages = self.pages.len();
        let mut hash_pages: Vec<Vec<u8>> = Vec::with_capacity(num_bucket_pages);
        let mut overflow_pages: Vec<Vec<u8>> = Vec::new();
        let mut next_overflow_page = num_bucket_pages as u32 + 1;

        for (i, page_records) in self.pages.iter().enumerate() {
            let page_no = i as u32 + 1;
            let mut page = vec![0u8; ps];
            let slot_table_end = PageHeader::SIZE + page_records.len() * 4;

            // Records grow backward from the page end.
            let mut cursor = ps;
            let mut offsets: Vec<u16> = Vec::new();
            for (key, value) in page_records {
                let key_off = cursor - (1 + key.len());
                page[key_off] = 1;
                page[key_off + 1..key_off + 1 + key.len()].copy_from_slice(key);
                offsets.push(key_off as u16);

                let inline_ok = key_off >= slot_table_end + 1 + value.len();
                let val_off = if inline_ok {
                    let off = key_off - (1 + value.len());
                    page[off] = 1;
                    page[off + 1..off + 1 + value.len()].copy_from_slice(value);
                    off
                } else {
                    // Offpage record referencing the overflow chain.
                    let off = key_off - 12;
                    page[off] = 3;
                    self.put32(&mut page, off + 4, next_overflow_page);
                    self.put32(&mut page, off + 8, value.len() as u32);

                    let chunk = ps - PageHeader::SIZE;
                    let chain_len = value.chunks(chunk).count() as u32;
                    for (j, piece) in value.chunks(chunk).enumerate() {
                        let opage_no = next_overflow_page + j as u32;
                        let next = if (j as u32) + 1 < chain_len {
                            opage_no + 1
                        } else {
                            0
                        };
                        let mut opage = vec![0u8; ps];
                        self.put32(&mut opage, 0x08, opage_no);
                        self.put32(&mut opage, 0x10, next);
                        self.put16(&mut opage, 0x16, piece.len() as u16);
                        opage[0x19] = 0x07;
                        opage[PageHeader::SIZE..PageHeader::SIZE + piece.len()]
                            .copy_from_slice(piece);
                        overflow_pages.push(opage);
                    }
                    next_overflow_page += chain_len;
                    off
                };
                offsets.push(val_off as u16);
                cursor = val_off;
            }

            self.put32(&mut page, 0x08, page_no);
            self.put16(&mut page, 0x14, offsets.len() as u16);
            self.put16(&mut page, 0x16, cursor as u16);
            page[0x19] = 0x02;
            for (slot, offset) in offsets.iter().enumerate() {
                self.put16(&mut page, PageHeader::SIZE + slot * 2, *offset);
            }
            hash_pages.push(page);
        }

        let last_page_no = (hash_pages.len() + overflow_pages.len()) as u32;
        let num_keys = self
            .pages
            .iter()
            .flatten()
            .filter(|(key, _)| !(key.len() == 4 && key.iter().all(|&b| b == 0)))
            .count() as u32;

        let mut meta = vec![0u8; ps];
        self.put32(&mut meta, 0x0C, 0x0006_1561);
        self.put32(&mut meta, 0x10, 9);
        self.put32(&mut meta, 0x14, ps as u32);
        meta[0x18] = self.encryption_alg;
        meta[0x19] = 0x08;
        self.put32(&mut meta, 0x20, last_page_no);
        self.put32(&mut meta, 0x48, num_bucket_pages as u32);
        self.put32(&mut meta, 0x58, num_keys);
        self.put32(&mut meta, 0x5C, 0x9b08_5895);

        let mut out = meta;
        for page in hash_pages {
            out.extend_from_slice(&page);
        }
        for page in overflow_pages {
            out.extend_from_slice(&page);
        }
        out
    }

    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}
