//! Marker scanner over a whole `.BYS` buffer.
//!
//! The format has no framing beyond the 4-byte marker, so the scanner walks
//! the buffer with a cursor, decodes a 30-byte window at every marker hit and
//! resumes the search right after the marker (not after the window). Two
//! records may therefore cover overlapping bytes; they are both returned.
//! A marker that starts inside the previous marker's own 4 bytes (the marker
//! can overlap itself by 3, as in `28 46 96 28 46 96 28`) is never matched.
use crate::record::{RawRecord, MAGIC, RECORD_LEN};

/// Find the next marker at or after `from`.
pub fn find_marker(buf: &[u8], from: usize) -> Option<usize> {
    buf.get(from..)?
        .windows(MAGIC.len())
        .position(|w| w == MAGIC)
        .map(|p| from + p)
}

/// Lazy iterator over the records of a buffer, in offset order.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    buf: &'a [u8],
    cursor: usize,
    truncated_at: Option<usize>,
    done: bool,
}

impl<'a> Records<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Records { buf, cursor: 0, truncated_at: None, done: false }
    }

    /// Offset of a marker whose window ran past the end of the buffer, once
    /// the iterator has reached it.
    pub fn truncated_at(&self) -> Option<usize> { self.truncated_at }
}

impl Iterator for Records<'_> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<RawRecord> {
        if self.done { return None; }
        let Some(idx) = find_marker(self.buf, self.cursor) else {
            self.done = true;
            return None;
        };
        let Some(window) = self.buf.get(idx..idx + RECORD_LEN) else {
            self.truncated_at = Some(idx);
            self.done = true;
            return None;
        };
        let mut w = [0u8; RECORD_LEN];
        w.copy_from_slice(window);
        self.cursor = idx + MAGIC.len();
        Some(RawRecord::decode(idx, &w))
    }
}

/// Every record in `buf`. Never fails; an unmatched or short buffer yields an
/// empty vector.
pub fn scan(buf: &[u8]) -> Vec<RawRecord> {
    Records::new(buf).collect()
}

/// What a scan saw besides the records themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub bytes_scanned: usize,
    pub records: usize,
    pub invalid_start: usize,
    pub invalid_end: usize,
    /// Marker offset of a final window dropped for lack of trailing bytes.
    pub truncated_tail: Option<usize>,
    /// Consecutive record pairs whose windows share bytes.
    pub overlapping_pairs: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub records: Vec<RawRecord>,
    pub summary: ScanSummary,
}

/// Same as [`scan`], plus a [`ScanSummary`] for the caller to report.
pub fn scan_with_summary(buf: &[u8]) -> Scan {
    let mut it = Records::new(buf);
    let records: Vec<RawRecord> = it.by_ref().collect();
    let overlapping_pairs = records.windows(2).filter(|p| p[0].overlaps(&p[1])).count();
    let summary = ScanSummary {
        bytes_scanned: buf.len(),
        records: records.len(),
        invalid_start: records.iter().filter(|r| !r.start_time.is_valid()).count(),
        invalid_end: records.iter().filter(|r| !r.end_time.is_valid()).count(),
        truncated_tail: it.truncated_at(),
        overlapping_pairs,
    };
    Scan { records, summary }
}
