//! Loading `.BYS` captures from disk.
//!
//! The scanner needs random access to the whole buffer, so captures are read
//! in full before scanning. A CRC-32 of the raw bytes is kept as a fingerprint
//! for reports; the format itself carries no checksum.
use anyhow::{Context, Result};
use crc32fast::Hasher as Crc32;
use log::debug;
use std::fs;
use std::path::Path;

use crate::record::RawRecord;
use crate::scanner::{scan_with_summary, ScanSummary};

#[derive(Debug, Clone)]
pub struct Capture {
    name: String,
    len: usize,
    crc32: u32,
    records: Vec<RawRecord>,
    summary: ScanSummary,
}

impl Capture {
    /// Read and scan a capture file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("read {:?}", path))?;
        debug!("read {} bytes from {:?}", bytes.len(), path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_bytes(name, &bytes))
    }

    /// Scan an in-memory buffer.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        let mut hasher = Crc32::new();
        hasher.update(bytes);
        let crc32 = hasher.finalize();
        let scan = scan_with_summary(bytes);
        debug!(
            "scanned {} bytes (crc32={:08x}): {} records, {} overlapping pairs",
            bytes.len(),
            crc32,
            scan.summary.records,
            scan.summary.overlapping_pairs
        );
        Capture { name: name.into(), len: bytes.len(), crc32, records: scan.records, summary: scan.summary }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn crc32(&self) -> u32 { self.crc32 }
    pub fn records(&self) -> &[RawRecord] { &self.records }
    pub fn summary(&self) -> &ScanSummary { &self.summary }
}
