//! risk-loader: Load a risk-score CSV, report what the dashboard would see, and
//! optionally export the shaped wide table.
//!
//! Usage:
//!   cargo run -p risk-loader -- --source data/doc_risk_scores_k7.csv
//!   cargo run -p risk-loader -- --source https://example.com/scores.csv --year 2022 --top 5
//!   cargo run -p risk-loader -- --export wide.csv

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use risk_loader::{write_wide_csv, DataSource, RiskLoader};

const DEFAULT_CSV_PATH: &str = "data/doc_risk_scores_k7.csv";
const DEFAULT_TOP: usize = 8;

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "risk_loader=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let source = match arg_value(&args, "--source") {
        Some(location) => DataSource::parse(location),
        None => match std::env::var("CSV_URL").ok().filter(|u| !u.trim().is_empty()) {
            Some(url) => DataSource::parse(&url),
            None => DataSource::Local(PathBuf::from(
                std::env::var("CSV_PATH").unwrap_or_else(|_| DEFAULT_CSV_PATH.to_string()),
            )),
        },
    };

    let timeout_secs: u64 = arg_value(&args, "--timeout")
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);
    let top: usize = arg_value(&args, "--top")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TOP);

    let loader = RiskLoader::new(Duration::from_secs(timeout_secs));
    let table = loader
        .load(&source)
        .await
        .with_context(|| format!("Failed to load risk scores from {}", source))?;

    for year in table.years() {
        tracing::info!(
            "{}: {} companies",
            year,
            table.companies_for_year(year).len()
        );
    }

    let year = arg_value(&args, "--year")
        .map(str::to_string)
        .or_else(|| table.latest_year().map(str::to_string));

    match year {
        Some(year) => {
            println!("Top {} companies by composite risk ({}):", top, year);
            for (rank, row) in table.top_rows(&year, top).iter().enumerate() {
                println!("{:>3}. {:<40} {:>8.2}", rank + 1, row.company, row.composite());
            }
        }
        None => println!("No rows loaded from {}", source),
    }

    if let Some(path) = arg_value(&args, "--export") {
        let path = PathBuf::from(path);
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_wide_csv(&table, std::io::BufWriter::new(file))?;
        tracing::info!("Exported {} rows to {}", table.len(), path.display());
    }

    Ok(())
}
