//! Deterministic ZIP fixtures for unit tests.
//!
//! Output is Zip32-only, stored (method 0), with fixed timestamps and
//! explicit sizes (no data descriptors). CRCs are left at zero; the reader
//! under test never looks at payloads.

/// One entry of a fixture archive.
pub struct ZipEntrySpec {
    pub name: Vec<u8>,
    pub payload: Vec<u8>,
}

impl ZipEntrySpec {
    pub fn file(name: &str, payload: &[u8]) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            payload: payload.to_vec(),
        }
    }

    /// Directory entry; `name` should end with `/`.
    pub fn dir(name: &str) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            payload: Vec::new(),
        }
    }
}

/// Build archive bytes with entries in the given order.
pub fn build_zip_bytes(entries: &[ZipEntrySpec]) -> Vec<u8> {
    fn u16le(v: u16) -> [u8; 2] {
        v.to_le_bytes()
    }
    fn u32le(v: u32) -> [u8; 4] {
        v.to_le_bytes()
    }

    let mut out = Vec::new();
    let mut cd = Vec::new();

    for entry in entries {
        let name = entry.name.as_slice();
        let data = entry.payload.as_slice();
        let local_off = out.len() as u32;

        out.extend_from_slice(&u32le(0x04034b50));
        out.extend_from_slice(&u16le(20));
        out.extend_from_slice(&u16le(0));
        out.extend_from_slice(&u16le(0));
        out.extend_from_slice(&u16le(0));
        out.extend_from_slice(&u16le(0));
        out.extend_from_slice(&u32le(0));
        out.extend_from_slice(&u32le(data.len() as u32));
        out.extend_from_slice(&u32le(data.len() as u32));
        out.extend_from_slice(&u16le(name.len() as u16));
        out.extend_from_slice(&u16le(0));
        out.extend_from_slice(name);
        out.extend_from_slice(data);

        cd.extend_from_slice(&u32le(0x02014b50));
        cd.extend_from_slice(&u16le(0));
        cd.extend_from_slice(&u16le(20));
        cd.extend_from_slice(&u16le(0));
        cd.extend_from_slice(&u16le(0));
        cd.extend_from_slice(&u16le(0));
        cd.extend_from_slice(&u16le(0));
        cd.extend_from_slice(&u32le(0));
        cd.extend_from_slice(&u32le(data.len() as u32));
        cd.extend_from_slice(&u32le(data.len() as u32));
        cd.extend_from_slice(&u16le(name.len() as u16));
        cd.extend_from_slice(&u16le(0));
        cd.extend_from_slice(&u16le(0));
        cd.extend_from_slice(&u16le(0));
        cd.extend_from_slice(&u16le(0));
        cd.extend_from_slice(&u32le(0));
        cd.extend_from_slice(&u32le(local_off));
        cd.extend_from_slice(name);
    }

    let cd_start = out.len() as u32;
    let cd_size = cd.len() as u32;
    out.extend_from_slice(&cd);

    out.extend_from_slice(&u32le(0x06054b50));
    out.extend_from_slice(&u16le(0));
    out.extend_from_slice(&u16le(0));
    out.extend_from_slice(&u16le(entries.len() as u16));
    out.extend_from_slice(&u16le(entries.len() as u16));
    out.extend_from_slice(&u32le(cd_size));
    out.extend_from_slice(&u32le(cd_start));
    out.extend_from_slice(&u16le(0));

    out
}
