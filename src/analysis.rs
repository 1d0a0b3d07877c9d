//! Therapy-session view over decoded records and derived metrics.
//!
//! Only records with a valid start time become sessions. Two derived metrics
//! are estimated from the unnamed device fields:
//! - AHI: `Val3` events per hour of use, meaningful only above half an hour
//! - leak: `Val2 / 100` in L/min
//!
//! The statistics blocks drop short sessions from both metrics while the chart
//! series ([`ChartSeries`]) keep every session, plotting a zero AHI for short
//! ones and an unfiltered leak. Both behaviours are relied on by existing
//! reports and are kept separate on purpose.
use serde::Serialize;
use time::PrimitiveDateTime;
use time::macros::format_description;

use crate::record::{RawRecord, TimestampResult};
use crate::stats::Stats;

/// Device pressure units per cmH2O.
pub const PRESSURE_SCALE: f64 = 1000.0;
/// Device leak units per L/min.
pub const LEAK_SCALE: f64 = 100.0;
/// Sessions must be longer than this (hours) to get an AHI estimate.
pub const MIN_SCORED_HOURS: f64 = 0.5;
/// Sessions must be longer than this (minutes) to count towards leak stats.
pub const MIN_LEAK_MINUTES: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub offset: usize,
    pub start: PrimitiveDateTime,
    pub end: TimestampResult,
    pub duration_min: f64,
    pub pressure_cmh2o: f64,
    pub val1: f64,
    pub val2: f64,
    pub val3: f64,
    pub val4: f64,
}

impl Session {
    pub fn from_record(r: &RawRecord) -> Option<Self> {
        let start = r.start_time.valid()?;
        Some(Session {
            offset: r.offset,
            start,
            end: r.end_time,
            duration_min: f64::from(r.duration_min()),
            pressure_cmh2o: f64::from(r.pressure_raw()) / PRESSURE_SCALE,
            val1: f64::from(r.values[0]),
            val2: f64::from(r.leak_raw()),
            val3: f64::from(r.apnea_events()),
            val4: f64::from(r.values[4]),
        })
    }

    pub fn hours(&self) -> f64 { self.duration_min / 60.0 }

    /// Estimated apnea/hypopnea events per hour, `None` for short sessions.
    pub fn ahi(&self) -> Option<f64> {
        let hours = self.hours();
        (hours > MIN_SCORED_HOURS).then(|| self.val3 / hours)
    }

    /// Estimated leak in L/min.
    pub fn leak(&self) -> f64 { self.val2 / LEAK_SCALE }
}

pub fn sessions(records: &[RawRecord]) -> Vec<Session> {
    records.iter().filter_map(Session::from_record).collect()
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub sessions: Vec<Session>,
    pub duration: Option<Stats>,
    pub pressure: Option<Stats>,
    pub ahi: Option<Stats>,
    pub leak: Option<Stats>,
}

impl Analysis {
    /// Named stat blocks in display order.
    pub fn blocks(&self) -> [(&'static str, Option<&Stats>); 4] {
        [
            ("Duration (min)", self.duration.as_ref()),
            ("Pressure (cmH2O)", self.pressure.as_ref()),
            ("AHI (Val3 / Hour)", self.ahi.as_ref()),
            ("Leak Rate (Val2 / 100)", self.leak.as_ref()),
        ]
    }
}

pub fn analyze(records: &[RawRecord]) -> Analysis {
    let sessions = sessions(records);
    let duration: Vec<f64> = sessions.iter().map(|s| s.duration_min).collect();
    let pressure: Vec<f64> = sessions.iter().map(|s| s.pressure_cmh2o).collect();
    let ahi: Vec<f64> = sessions.iter().filter_map(Session::ahi).collect();
    let leak: Vec<f64> = sessions
        .iter()
        .filter(|s| s.duration_min > MIN_LEAK_MINUTES)
        .map(Session::leak)
        .collect();
    Analysis {
        duration: Stats::from_values(&duration),
        pressure: Stats::from_values(&pressure),
        ahi: Stats::from_values(&ahi),
        leak: Stats::from_values(&leak),
        sessions,
    }
}

/// Per-session series plotted in the HTML report, in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub dates: Vec<String>,
    pub durations: Vec<f64>,
    pub pressures: Vec<f64>,
    pub ahi: Vec<f64>,
    pub leak: Vec<f64>,
}

impl ChartSeries {
    pub fn from_sessions(sessions: &[Session]) -> Self {
        let fd = format_description!("[year]-[month]-[day]");
        let mut sorted: Vec<&Session> = sessions.iter().collect();
        sorted.sort_by_key(|s| s.start);
        let mut out = ChartSeries::default();
        for s in sorted {
            out.dates.push(s.start.format(&fd).unwrap_or_else(|_| s.start.date().to_string()));
            out.durations.push(s.duration_min);
            out.pressures.push(s.pressure_cmh2o);
            out.ahi.push(s.ahi().unwrap_or(0.0));
            out.leak.push(s.leak());
        }
        out
    }
}
