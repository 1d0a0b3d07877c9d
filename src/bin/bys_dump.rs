use anyhow::Result;
use bys_analyzer::capture::Capture;
use bys_analyzer::record::RawRecord;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(about = "Dump the records found in a .BYS capture, one per line")]
struct Args {
    /// Input .BYS file to read
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Only print records whose window overlaps the previous record
    #[arg(long, default_value_t = false)]
    overlaps_only: bool,

    /// Only print records with an invalid start or end time
    #[arg(long, default_value_t = false)]
    invalid_only: bool,

    /// Stop after printing this many records
    #[arg(long)]
    limit: Option<usize>,
}

fn line(r: &RawRecord, overlap: bool) -> String {
    let v = r.values;
    format!(
        "0x{:08X} start={} end={} values=[{}, {}, {}, {}, {}, {}] spacer=0x{:04X}{}",
        r.offset, r.start_time, r.end_time, v[0], v[1], v[2], v[3], v[4], v[5], r.spacer,
        if overlap { " OVERLAP" } else { "" }
    )
}

fn main() -> Result<()> {
    let args = Args::parse();
    let capture = Capture::open(&args.input)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut printed = 0usize;
    let mut prev: Option<&RawRecord> = None;
    for r in capture.records() {
        let overlap = prev.is_some_and(|p| p.overlaps(r));
        prev = Some(r);
        if args.overlaps_only && !overlap { continue; }
        if args.invalid_only && r.start_time.is_valid() && r.end_time.is_valid() { continue; }
        if args.limit.is_some_and(|n| printed >= n) { break; }
        writeln!(out, "{}", line(r, overlap))?;
        printed += 1;
    }
    out.flush()?;

    let s = capture.summary();
    eprintln!(
        "{}: {} bytes, crc32={:08X}, {} records ({} printed), {} invalid start, {} invalid end, {} overlapping pairs{}",
        capture.name(),
        capture.len(),
        capture.crc32(),
        s.records,
        printed,
        s.invalid_start,
        s.invalid_end,
        s.overlapping_pairs,
        s.truncated_tail.map(|o| format!(", truncated tail at 0x{:X}", o)).unwrap_or_default()
    );
    Ok(())
}
