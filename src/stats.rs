//! Descriptive statistics printed by the analyzer.
use std::io::{self, Write};

/// How many leading samples are kept for display.
pub const SAMPLE_PREVIEW: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (n - 1); zero for a single value.
    pub stdev: f64,
    pub preview: Vec<f64>,
}

impl Stats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() { return None; }
        let n = values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / n;
        let stdev = if values.len() > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        Some(Stats {
            count: values.len(),
            min,
            max,
            mean,
            stdev,
            preview: values.iter().take(SAMPLE_PREVIEW).copied().collect(),
        })
    }
}

/// Write one named statistics block followed by a blank line.
pub fn write_block<W: Write>(w: &mut W, name: &str, stats: Option<&Stats>) -> io::Result<()> {
    writeln!(w, "--- {} ---", name)?;
    let Some(s) = stats else {
        writeln!(w, "No data available.")?;
        return writeln!(w);
    };
    writeln!(w, "Range: {:.2} - {:.2}", s.min, s.max)?;
    writeln!(w, "Mean:  {:.2}", s.mean)?;
    writeln!(w, "StdDev:{:.2}", s.stdev)?;
    let preview = s.preview.iter().map(|v| format!("{:.2}", v)).collect::<Vec<_>>();
    writeln!(w, "Samples: {} ...", preview.join(", "))?;
    writeln!(w)
}
