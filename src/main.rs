use anyhow::Result;
use bys_analyzer::pipeline::run;
use clap::Parser;
use dotenvy::dotenv;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Yuwell CPAP .BYS log analyzer")]
struct Args {
    /// Path to the .BYS capture
    #[arg(env = "BYS_INPUT", default_value = "YHSD-NEW.BYS")]
    input: PathBuf,

    /// CSV summary output path
    #[arg(long, env = "BYS_CSV", default_value = "summary.csv")]
    csv: PathBuf,

    /// HTML report output path
    #[arg(long, env = "BYS_HTML", default_value = "report.html")]
    html: PathBuf,

    /// Skip writing the CSV summary
    #[arg(long, default_value_t = false)]
    no_csv: bool,

    /// Skip writing the HTML report
    #[arg(long, default_value_t = false)]
    no_html: bool,
}

fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let csv = (!args.no_csv).then_some(args.csv.as_path());
    let html = (!args.no_html).then_some(args.html.as_path());
    run(&args.input, csv, html, &mut io::stdout().lock())?;
    Ok(())
}
