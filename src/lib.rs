//! Yuwell `.BYS` therapy log reader and analyzer library.
//!
//! This crate provides the core types and logic used by the `bys_analyzer`
//! binary and the `bys_dump` tool:
//!
//! - `record`: 30-byte record layout, the record decoder and timestamp policy
//! - `scanner`: marker scan over a whole buffer, yielding records in offset
//!   order together with a scan summary
//! - `capture`: reads a capture file in full and scans it
//! - `analysis`, `stats`: session view, derived metrics and descriptive stats
//! - `export`, `report`: CSV summary and HTML report
//! - `pipeline`: the end-to-end run behind `bys_analyzer`
//!
//! `record` and `scanner` are total and side-effect free; everything that
//! touches the filesystem returns `anyhow::Result`.
pub mod record;
pub mod scanner;
pub mod capture;
pub mod stats;
pub mod analysis;
pub mod export;
pub mod report;
pub mod pipeline;

pub use record::{RawRecord, TimestampResult};
pub use scanner::{scan, scan_with_summary, Scan, ScanSummary};
