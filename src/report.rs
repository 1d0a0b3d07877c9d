//! Standalone HTML report with Chart.js charts.
//!
//! The page is a fixed template; chart data is embedded as JSON arrays taken
//! from [`ChartSeries`].
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::analysis::{ChartSeries, Session};

/// Provenance printed in the report header.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub source: String,
    pub crc32: u32,
    pub generated: OffsetDateTime,
}

impl ReportMeta {
    /// Stamped with the local time, or UTC if the local offset is unknown.
    pub fn now(source: impl Into<String>, crc32: u32) -> Self {
        let generated = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        ReportMeta { source: source.into(), crc32, generated }
    }
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Yuwell CPAP Data Analysis</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <style>
        body { font-family: "Microsoft YaHei", sans-serif; margin: 20px; color: #333; }
        .chart-container { width: 80%; margin: 20px auto; background: #fff; padding: 20px; box-shadow: 0 0 10px rgba(0,0,0,0.1); }
        .explanation { background: #f8f9fa; padding: 20px; border-left: 5px solid #007bff; margin: 20px auto; width: 80%; border-radius: 4px; }
        h1 { text-align: center; color: #2c3e50; }
        h2 { border-bottom: 2px solid #eaeaea; padding-bottom: 10px; margin-top: 0; color: #007bff; }
        ul { line-height: 1.6; }
        .meta { text-align: center; color: #666; }
    </style>
</head>
<body>
    <h1>Yuwell CPAP Therapy Report</h1>
    <p class="meta">Generated: @GENERATED@ &middot; Source: @SOURCE@ (CRC-32 @CRC@) &middot; Sessions: @COUNT@</p>

    <div class="explanation">
        <h2>1. Usage duration</h2>
        <p>Length of each therapy session in minutes.</p>
        <ul>
            <li><strong>Target:</strong> more than 4 hours (240 minutes) per night.</li>
            <li><strong>Trend:</strong> look for interrupted therapy or gradually increasing use.</li>
        </ul>
    </div>
    <div class="chart-container"><canvas id="durationChart"></canvas></div>

    <div class="explanation">
        <h2>2. Treatment pressure</h2>
        <p>Average pressure per session (cmH2O).</p>
        <ul>
            <li><strong>Meaning:</strong> higher pressure indicates more airway obstruction to overcome.</li>
            <li><strong>Stability:</strong> a steady pressure usually means the condition is well controlled.</li>
        </ul>
    </div>
    <div class="chart-container"><canvas id="pressureChart"></canvas></div>

    <div class="explanation">
        <h2>3. Apnea-hypopnea index (estimated)</h2>
        <p>Estimated apnea/hypopnea events per hour (Val3 / hours). Sessions of half an hour or less are plotted as 0.</p>
        <ul>
            <li><strong>Normal:</strong> &lt; 5 events/hour</li>
            <li><strong>Mild:</strong> 5-15 events/hour</li>
            <li><strong>Moderate:</strong> 15-30 events/hour</li>
            <li><strong>Severe:</strong> &gt; 30 events/hour</li>
            <li><strong>Note:</strong> device-side estimate, may differ from a polysomnography result.</li>
        </ul>
    </div>
    <div class="chart-container"><canvas id="ahiChart"></canvas></div>

    <div class="explanation">
        <h2>4. Leak rate (estimated)</h2>
        <p>Estimated mean leak per session (Val2 / 100, L/min).</p>
        <ul>
            <li><strong>Normal range:</strong> 0 - 60 L/min</li>
            <li><strong>Note:</strong> persistently high leak degrades therapy and data quality; check the mask fit.</li>
        </ul>
    </div>
    <div class="chart-container"><canvas id="leakChart"></canvas></div>

    <script>
        const dates = @DATES@;

        new Chart(document.getElementById('durationChart'), {
            type: 'line',
            data: { labels: dates, datasets: [{ label: 'Duration (min)', data: @DURATIONS@,
                borderColor: 'rgb(75, 192, 192)', backgroundColor: 'rgba(75, 192, 192, 0.2)', tension: 0.1, fill: true }] },
            options: { scales: { y: { beginAtZero: true, title: { display: true, text: 'Minutes' } } } }
        });

        new Chart(document.getElementById('pressureChart'), {
            type: 'line',
            data: { labels: dates, datasets: [{ label: 'Pressure (cmH2O)', data: @PRESSURES@,
                borderColor: 'rgb(255, 99, 132)', backgroundColor: 'rgba(255, 99, 132, 0.2)', tension: 0.1, fill: false }] },
            options: { scales: { y: { beginAtZero: false, title: { display: true, text: 'cmH2O' } } } }
        });

        new Chart(document.getElementById('ahiChart'), {
            type: 'bar',
            data: { labels: dates, datasets: [{ label: 'AHI (Events/Hr)', data: @AHI@,
                backgroundColor: 'rgb(54, 162, 235)' }] },
            options: { scales: { y: { beginAtZero: true, title: { display: true, text: 'Events / Hour' } } } }
        });

        new Chart(document.getElementById('leakChart'), {
            type: 'line',
            data: { labels: dates, datasets: [{ label: 'Leak (L/min)', data: @LEAK@,
                borderColor: 'rgb(153, 102, 255)', backgroundColor: 'rgba(153, 102, 255, 0.2)', tension: 0.1, fill: true }] },
            options: { scales: { y: { beginAtZero: true, title: { display: true, text: 'L/min' } } } }
        });
    </script>
</body>
</html>
"#;

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the report page for `sessions`.
pub fn render(sessions: &[Session], meta: &ReportMeta) -> Result<String> {
    let series = ChartSeries::from_sessions(sessions);
    let generated = meta
        .generated
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .context("format report timestamp")?;
    let html = TEMPLATE
        .replace("@GENERATED@", &generated)
        .replace("@CRC@", &format!("{:08X}", meta.crc32))
        .replace("@COUNT@", &sessions.len().to_string())
        .replace("@DATES@", &serde_json::to_string(&series.dates)?)
        .replace("@DURATIONS@", &serde_json::to_string(&series.durations)?)
        .replace("@PRESSURES@", &serde_json::to_string(&series.pressures)?)
        .replace("@AHI@", &serde_json::to_string(&series.ahi)?)
        .replace("@LEAK@", &serde_json::to_string(&series.leak)?)
        // last, so a file name can never be taken for a placeholder
        .replace("@SOURCE@", &escape_html(&meta.source));
    Ok(html)
}

pub fn write_report(path: impl AsRef<Path>, sessions: &[Session], meta: &ReportMeta) -> Result<()> {
    let path = path.as_ref();
    let html = render(sessions, meta)?;
    fs::write(path, html).with_context(|| format!("write report {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::sessions;
    use crate::record::{decode_timestamp, RawRecord, TimestampResult};
    use time::macros::datetime;

    fn meta() -> ReportMeta {
        ReportMeta { source: "A&B<1>.BYS".into(), crc32: 0xBEEF, generated: datetime!(2025-03-01 12:00:00 UTC) }
    }

    #[test]
    fn embeds_series_and_meta() {
        let recs = [
            RawRecord { offset: 30, values: [0, 4000, 2, 11000, 0, 20], start_time: decode_timestamp([24, 3, 2, 23, 0, 0]), end_time: TimestampResult::Invalid, spacer: 0 },
            RawRecord { offset: 0, values: [0, 2500, 8, 9500, 0, 240], start_time: decode_timestamp([24, 3, 1, 23, 0, 0]), end_time: TimestampResult::Invalid, spacer: 0 },
        ];
        let html = render(&sessions(&recs), &meta()).unwrap();
        assert!(html.contains(r#"const dates = ["2024-03-01","2024-03-02"];"#));
        assert!(html.contains("data: [240.0,20.0]"));
        assert!(html.contains("data: [9.5,11.0]"));
        assert!(html.contains("data: [2.0,0.0]"));
        assert!(html.contains("data: [25.0,40.0]"));
        assert!(html.contains("Generated: 2025-03-01 12:00:00"));
        assert!(html.contains("A&amp;B&lt;1&gt;.BYS"));
        assert!(html.contains("CRC-32 0000BEEF"));
        assert!(!html.contains('@'));
    }

    #[test]
    fn source_name_is_not_expanded() {
        let meta = ReportMeta { source: "@DATES@@CRC@.BYS".into(), ..meta() };
        let html = render(&[], &meta).unwrap();
        assert!(html.contains("Source: @DATES@@CRC@.BYS (CRC-32 0000BEEF)"));
        assert!(html.contains("const dates = [];"));
    }

    #[test]
    fn empty_report_still_renders() {
        let html = render(&[], &meta()).unwrap();
        assert!(html.contains("const dates = [];"));
        assert!(html.contains("Sessions: 0"));
    }
}
