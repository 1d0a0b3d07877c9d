//! CSV summary of decoded records.
//!
//! Offsets and spacers are written as `0x`-prefixed uppercase hex, timestamps
//! as `YYYY-MM-DD HH:MM:SS` or `Invalid Date`.
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::record::RawRecord;

#[derive(Debug, Serialize)]
struct Row {
    #[serde(rename = "Offset")]
    offset: String,
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time")]
    end_time: String,
    #[serde(rename = "Duration (min)")]
    duration: u16,
    #[serde(rename = "Pressure Raw")]
    pressure_raw: u16,
    #[serde(rename = "Val1")]
    val1: u16,
    #[serde(rename = "Val2")]
    val2: u16,
    #[serde(rename = "Val3")]
    val3: u16,
    #[serde(rename = "Val4")]
    val4: u16,
    #[serde(rename = "Spacer")]
    spacer: String,
}

impl From<&RawRecord> for Row {
    fn from(r: &RawRecord) -> Self {
        Row {
            offset: format!("0x{:X}", r.offset),
            start_time: r.start_time.to_string(),
            end_time: r.end_time.to_string(),
            duration: r.duration_min(),
            pressure_raw: r.pressure_raw(),
            val1: r.values[0],
            val2: r.values[1],
            val3: r.values[2],
            val4: r.values[4],
            spacer: format!("0x{:04X}", r.spacer),
        }
    }
}

pub fn write_records<W: Write>(w: W, records: &[RawRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    for r in records {
        wtr.serialize(Row::from(r))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv(path: impl AsRef<Path>, records: &[RawRecord]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("create {:?}", path))?;
    write_records(BufWriter::new(file), records).with_context(|| format!("write csv {:?}", path))
}
