//! zip sniff helpers + metadata-only Zip32 central-directory reader.
//!
//! # Invariants
//! - All sizes/offsets are untrusted and validated against the stream length.
//! - Metadata reads are charged against `ArchiveConfig::max_archive_metadata_bytes`.
//! - Entry payloads are never read or decompressed.
//!
//! # Supported
//! - Zip32 (EOCD + central directory), any compression method.
//!
//! # Not Supported
//! - Zip64 (sentinel 0xFFFF/0xFFFFFFFF fields).
//! - Multi-disk archives.
//!
//! # Design Notes
//! - Entries are yielded in central-directory order, which is the order the
//!   writer recorded them.
//! - Oversized names are truncated to `max_entry_name_len` and flagged.

use std::io::{self, Read, Seek, SeekFrom};

use crate::archive::ArchiveConfig;

/// ZIP signatures are `PK..`.
///
/// Common ones:
/// - Local file header:      PK 03 04
/// - Central directory:      PK 01 02
/// - End of central dir:     PK 05 06
/// - Data descriptor:        PK 07 08
#[inline(always)]
pub fn is_zip_magic(header: &[u8]) -> bool {
    if header.len() < 4 {
        return false;
    }
    if header[0] != b'P' || header[1] != b'K' {
        return false;
    }
    matches!((header[2], header[3]), (1, 2) | (3, 4) | (5, 6) | (7, 8))
}

const SIG_EOCD: u32 = 0x0605_4b50;
const SIG_CDFH: u32 = 0x0201_4b50;

const EOCD_MIN_LEN: usize = 22;
const EOCD_SEARCH_MAX: usize = 66 * 1024; // 64 KiB comment + header margin

/// Central directory fixed header length.
const CDFH_LEN: usize = 46;

/// Structural reason an archive could not be (fully) walked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZipFault {
    /// Missing/invalid signatures or out-of-bounds offsets.
    Malformed,
    /// Zip64 or multi-disk archive.
    UnsupportedFeature,
    /// Declared entry count exceeds `max_entries_per_archive`.
    EntryCountExceeded,
    /// Parsing would exceed `max_archive_metadata_bytes`.
    MetadataBudgetExceeded,
}

/// Outcome of opening a ZIP container.
#[derive(Debug, PartialEq, Eq)]
pub enum ZipOpen {
    Ready,
    Fault(ZipFault),
}

/// Outcome of advancing the central-directory cursor.
pub enum ZipNext<'a> {
    End,
    Entry(ZipEntryMeta<'a>),
    Fault(ZipFault),
}

/// Central-directory metadata for a single entry.
pub struct ZipEntryMeta<'a> {
    pub name: &'a [u8],
    pub is_dir: bool,
    pub name_truncated: bool,
}

/// Streaming cursor over the central directory.
///
/// # Invariants
/// - `next_entry` advances monotonically through the central directory region.
/// - `name_buf` never grows past `max_entry_name_len`.
pub struct ZipCursor<R> {
    reader: Option<R>,

    cd_pos: u64,
    cd_end: u64,

    entries_total: u32,
    entries_seen: u32,

    metadata_used: u64,
    metadata_cap: u64,
    name_cap: usize,

    name_buf: Vec<u8>,
    eocd_buf: Vec<u8>,
    discard: [u8; 4096],
}

impl<R: Read + Seek> ZipCursor<R> {
    /// Construct a cursor with preallocated buffers.
    pub fn with_capacity(cfg: &ArchiveConfig) -> Self {
        Self {
            reader: None,
            cd_pos: 0,
            cd_end: 0,
            entries_total: 0,
            entries_seen: 0,
            metadata_used: 0,
            metadata_cap: cfg.max_archive_metadata_bytes,
            name_cap: cfg.max_entry_name_len,
            name_buf: Vec::with_capacity(cfg.max_entry_name_len),
            eocd_buf: vec![0u8; EOCD_SEARCH_MAX],
            discard: [0u8; 4096],
        }
    }

    /// Open a ZIP container and initialize central-directory traversal.
    ///
    /// Returns:
    /// - `ZipOpen::Ready` when the container is parsable.
    /// - `ZipOpen::Fault` for malformed data, unsupported features, or
    ///   exhausted limits.
    ///
    /// I/O errors (including truncation) are returned as `Err`.
    pub fn open(&mut self, mut reader: R, cfg: &ArchiveConfig) -> io::Result<ZipOpen> {
        self.reset();

        let stream_len = reader.seek(SeekFrom::End(0))?;
        if stream_len < EOCD_MIN_LEN as u64 {
            return Ok(ZipOpen::Fault(ZipFault::Malformed));
        }

        // Read tail window (bounded to the preallocated EOCD buffer).
        let win_len = (stream_len as usize).min(EOCD_SEARCH_MAX);
        let win_off = stream_len - win_len as u64;
        if !self.charge_metadata(win_len as u64) {
            return Ok(ZipOpen::Fault(ZipFault::MetadataBudgetExceeded));
        }

        reader.seek(SeekFrom::Start(win_off))?;
        let win = &mut self.eocd_buf[..win_len];
        read_exact_n(&mut reader, win)?;

        let eocd_rel = match find_eocd(win) {
            Some(i) => i,
            None => return Ok(ZipOpen::Fault(ZipFault::Malformed)),
        };
        let eocd = &win[eocd_rel..];

        let disk_no = le_u16(&eocd[4..6]);
        let cd_disk = le_u16(&eocd[6..8]);
        let entries_disk = le_u16(&eocd[8..10]);
        let entries_total = le_u16(&eocd[10..12]);
        let cd_size = le_u32(&eocd[12..16]);
        let cd_off = le_u32(&eocd[16..20]);

        // Multi-disk unsupported.
        if disk_no != 0 || cd_disk != 0 || entries_disk != entries_total {
            return Ok(ZipOpen::Fault(ZipFault::UnsupportedFeature));
        }

        // Zip64 sentinel values in EOCD -> unsupported.
        if entries_total == 0xFFFF || cd_size == 0xFFFF_FFFF || cd_off == 0xFFFF_FFFF {
            return Ok(ZipOpen::Fault(ZipFault::UnsupportedFeature));
        }

        let entries_total = entries_total as u32;
        if entries_total > cfg.max_entries_per_archive {
            return Ok(ZipOpen::Fault(ZipFault::EntryCountExceeded));
        }

        let cd_off = cd_off as u64;
        let cd_end = cd_off.saturating_add(cd_size as u64);
        if cd_off > stream_len || cd_end > stream_len {
            return Ok(ZipOpen::Fault(ZipFault::Malformed));
        }

        self.reader = Some(reader);
        self.cd_pos = cd_off;
        self.cd_end = cd_end;
        self.entries_total = entries_total;

        Ok(ZipOpen::Ready)
    }

    /// Number of entries declared by the end-of-central-directory record.
    #[inline]
    pub fn entries_total(&self) -> u32 {
        self.entries_total
    }

    /// Yield the next central-directory entry metadata.
    pub fn next_entry(&mut self) -> io::Result<ZipNext<'_>> {
        if self.entries_seen >= self.entries_total || self.cd_pos >= self.cd_end {
            return Ok(ZipNext::End);
        }
        if self.reader.is_none() {
            return Ok(ZipNext::Fault(ZipFault::Malformed));
        }
        if !self.charge_metadata(CDFH_LEN as u64) {
            return Ok(ZipNext::Fault(ZipFault::MetadataBudgetExceeded));
        }

        let cd_pos = self.cd_pos;
        let mut hdr = [0u8; CDFH_LEN];
        {
            let reader = self.reader_mut()?;
            reader.seek(SeekFrom::Start(cd_pos))?;
            read_exact_n(reader, &mut hdr)?;
        }

        if le_u32(&hdr[0..4]) != SIG_CDFH {
            return Ok(ZipNext::Fault(ZipFault::Malformed));
        }
        self.entries_seen = self.entries_seen.saturating_add(1);

        let comp_size = le_u32(&hdr[20..24]);
        let uncomp_size = le_u32(&hdr[24..28]);
        let name_len = le_u16(&hdr[28..30]) as usize;
        let extra_len = le_u16(&hdr[30..32]) as usize;
        let comment_len = le_u16(&hdr[32..34]) as usize;
        let lfh_off = le_u32(&hdr[42..46]);

        // Zip64 sentinel in CDFH -> unsupported.
        if comp_size == 0xFFFF_FFFF || uncomp_size == 0xFFFF_FFFF || lfh_off == 0xFFFF_FFFF {
            return Ok(ZipNext::Fault(ZipFault::UnsupportedFeature));
        }

        let var_total = name_len
            .saturating_add(extra_len)
            .saturating_add(comment_len);
        let rec_end = cd_pos.saturating_add((CDFH_LEN + var_total) as u64);
        if rec_end > self.cd_end {
            return Ok(ZipNext::Fault(ZipFault::Malformed));
        }
        if !self.charge_metadata(var_total as u64) {
            return Ok(ZipNext::Fault(ZipFault::MetadataBudgetExceeded));
        }

        // Read filename into bounded storage; skip the rest.
        let store_len = name_len.min(self.name_cap);
        let name_truncated = name_len > store_len;
        self.name_buf.clear();
        self.name_buf.resize(store_len, 0);
        {
            let reader = match self.reader.as_mut() {
                Some(r) => r,
                None => return Ok(ZipNext::Fault(ZipFault::Malformed)),
            };
            read_exact_n(reader, &mut self.name_buf)?;
            let mut skip = var_total - store_len;
            while skip > 0 {
                let step = self.discard.len().min(skip);
                read_exact_n(reader, &mut self.discard[..step])?;
                skip -= step;
            }
        }

        self.cd_pos = rec_end;

        // Directory heuristic: name ends with '/'.
        let is_dir = !name_truncated && self.name_buf.last().copied() == Some(b'/');

        Ok(ZipNext::Entry(ZipEntryMeta {
            name: &self.name_buf,
            is_dir,
            name_truncated,
        }))
    }

    fn reset(&mut self) {
        self.reader = None;
        self.cd_pos = 0;
        self.cd_end = 0;
        self.entries_total = 0;
        self.entries_seen = 0;
        self.metadata_used = 0;
        self.name_buf.clear();
    }

    fn reader_mut(&mut self) -> io::Result<&mut R> {
        self.reader
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "zip: stream closed"))
    }

    #[inline]
    fn charge_metadata(&mut self, n: u64) -> bool {
        let next = self.metadata_used.saturating_add(n);
        if next > self.metadata_cap {
            return false;
        }
        self.metadata_used = next;
        true
    }
}

/// Locate the EOCD record whose comment fits inside the window, scanning
/// backward past false-positive signatures.
fn find_eocd(win: &[u8]) -> Option<usize> {
    let mut end = win.len();
    while let Some(i) = rfind_sig_u32_le(&win[..end], SIG_EOCD) {
        if i + EOCD_MIN_LEN <= win.len() {
            let comment_len = le_u16(&win[i + 20..i + 22]) as usize;
            if i + EOCD_MIN_LEN + comment_len <= win.len() {
                return Some(i);
            }
        }
        end = i + 3;
    }
    None
}

fn rfind_sig_u32_le(hay: &[u8], sig: u32) -> Option<usize> {
    if hay.len() < 4 {
        return None;
    }
    let mut i = hay.len() - 4;
    loop {
        if le_u32(&hay[i..i + 4]) == sig {
            return Some(i);
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }
    None
}

#[inline(always)]
fn le_u16(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

#[inline(always)]
fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn read_exact_n<R: Read + ?Sized>(r: &mut R, dst: &mut [u8]) -> io::Result<()> {
    let mut off = 0;
    while off < dst.len() {
        let n = match r.read(&mut dst[off..]) {
            Ok(n) => n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "zip truncated",
            ));
        }
        off += n;
    }
    Ok(())
}
