//! The `bys_analyzer` pipeline: scan a capture, write the CSV summary, print
//! statistics and write the HTML report.
//!
//! Output files are optional. The CSV is skipped when the capture holds no
//! records; the report is skipped when no record has a valid start time.
use anyhow::Result;
use log::{info, warn};
use std::io::Write;
use std::path::Path;

use crate::analysis::analyze;
use crate::capture::Capture;
use crate::export::write_csv;
use crate::report::{write_report, ReportMeta};
use crate::stats::write_block;

/// What a run found and wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub records: usize,
    pub sessions: usize,
    pub csv_written: bool,
    pub html_written: bool,
}

/// Run the analyzer over `input`. Statistics go to `out`; `None` for `csv` or
/// `html` skips that file.
pub fn run<W: Write>(input: &Path, csv: Option<&Path>, html: Option<&Path>, out: &mut W) -> Result<RunOutcome> {
    info!("Parsing {:?}...", input);
    let capture = Capture::open(input)?;
    let summary = capture.summary();
    info!("Found {} records in {} bytes (crc32={:08X}).", summary.records, capture.len(), capture.crc32());
    if summary.overlapping_pairs > 0 {
        warn!("{} record pairs overlap (marker found inside a previous record window)", summary.overlapping_pairs);
    }
    if let Some(off) = summary.truncated_tail {
        warn!("dropped truncated record window at 0x{:X}", off);
    }
    if summary.invalid_start > 0 {
        info!("{} records have an invalid start time and are excluded from analysis", summary.invalid_start);
    }

    let mut outcome = RunOutcome { records: capture.records().len(), ..RunOutcome::default() };
    if capture.records().is_empty() {
        info!("No records found. Exiting.");
        return Ok(outcome);
    }

    if let Some(path) = csv {
        write_csv(path, capture.records())?;
        outcome.csv_written = true;
        info!("Written to {:?}", path);
    }

    let analysis = analyze(capture.records());
    outcome.sessions = analysis.sessions.len();
    info!("Analyzing {} valid records...", analysis.sessions.len());
    let blocks = analysis.blocks();
    for (name, stats) in &blocks[..2] {
        write_block(&mut *out, name, *stats)?;
    }
    writeln!(out, "--- Derived Metrics ---")?;
    for (name, stats) in &blocks[2..] {
        write_block(&mut *out, name, *stats)?;
    }
    out.flush()?;

    match html {
        _ if analysis.sessions.is_empty() => warn!("no records with a valid start time; skipping report"),
        Some(path) => {
            let meta = ReportMeta::now(capture.name(), capture.crc32());
            write_report(path, &analysis.sessions, &meta)?;
            outcome.html_written = true;
            info!("Report generated: {:?}", path);
        }
        None => {}
    }
    Ok(outcome)
}
