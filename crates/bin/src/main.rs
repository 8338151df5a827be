//! Haze CLI binary.
//!
//! Command-line dashboard correlating an air-quality series with a market
//! index over a shared historical window.

mod integration;

use clap::{Parser, Subcommand, ValueEnum};
use haze::{AlignedPair, GapFillStrategy, TimeSeriesTable, align, correlate, fill};
use haze_data::market::{IndexQuoteProvider, NIFTY_50};
use haze_data::meteo::{AirQualityClient, Location, MUMBAI};
use haze_output::{
    AnalysisExport, AnalysisSummary, ExportFormat, Exporter, scatter_chart, time_series_chart,
};
use indicatif::{ProgressBar, ProgressStyle};
use integration::cache_manager;
use integration::dashboard::{FetchConfig, load_air_quality, load_market_index, write_chart};
use std::path::PathBuf;
use std::process;
use std::time::Duration as StdDuration;

#[derive(Parser)]
#[command(name = "haze")]
#[command(about = "Haze: air quality vs market index correlation dashboard", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch both series, align them and report the correlation
    Analyze {
        /// Window length in days
        #[arg(long, default_value = "365")]
        days: u32,

        /// Latitude of the air-quality location
        #[arg(long, default_value_t = MUMBAI.latitude)]
        latitude: f64,

        /// Longitude of the air-quality location
        #[arg(long, default_value_t = MUMBAI.longitude)]
        longitude: f64,

        /// Market index ticker
        #[arg(long, default_value = NIFTY_50)]
        ticker: String,

        /// Gap-fill strategy applied to both series before alignment
        #[arg(long, value_enum, default_value = "forward-fill")]
        fill: FillArg,

        /// Disable caching (always fetch fresh data)
        #[arg(long)]
        no_cache: bool,

        /// Force refresh cached data
        #[arg(long)]
        refresh: bool,

        /// Also export the aligned data in this format
        #[arg(long, value_enum)]
        export: Option<ExportArg>,

        /// Directory chart and export artifacts are written to
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Inspect or clear the series cache
    Cache {
        /// Drop all cached entries
        #[arg(long)]
        clear: bool,
    },
}

/// CLI face of the gap-fill strategies.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FillArg {
    /// Carry the last observation forward
    ForwardFill,
    /// Linearly interpolate interior gaps
    Interpolate,
    /// Drop rows with missing values
    Drop,
}

impl From<FillArg> for GapFillStrategy {
    fn from(arg: FillArg) -> Self {
        match arg {
            FillArg::ForwardFill => Self::ForwardFill,
            FillArg::Interpolate => Self::Interpolate,
            FillArg::Drop => Self::Drop,
        }
    }
}

/// CLI face of the export formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportArg {
    /// Comma-separated values
    Csv,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    PrettyJson,
}

impl From<ExportArg> for ExportFormat {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Csv => Self::Csv,
            ExportArg::Json => Self::Json,
            ExportArg::PrettyJson => Self::PrettyJson,
        }
    }
}

/// Everything one `analyze` invocation needs.
struct AnalyzeOpts {
    days: u32,
    location: Location,
    ticker: String,
    strategy: GapFillStrategy,
    fetch: FetchConfig,
    export: Option<ExportFormat>,
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            days,
            latitude,
            longitude,
            ticker,
            fill,
            no_cache,
            refresh,
            export,
            out,
        } => {
            let opts = AnalyzeOpts {
                days,
                location: Location {
                    latitude,
                    longitude,
                },
                ticker,
                strategy: fill.into(),
                fetch: FetchConfig {
                    use_cache: !no_cache,
                    force_refresh: refresh,
                },
                export: export.map(Into::into),
                out,
            };
            run_analyze(opts).await?;
        }
        Commands::Cache { clear } => {
            run_cache(clear)?;
        }
    }

    Ok(())
}

async fn run_analyze(opts: AnalyzeOpts) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", "HAZE: AIR QUALITY vs MARKET INDEX");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Window: {} days", opts.days);
    println!(
        "Location: ({:.4}, {:.4})",
        opts.location.latitude, opts.location.longitude
    );
    println!("Index: {}", opts.ticker);

    if opts.fetch.use_cache {
        println!("Cache: {}", cache_manager::default_cache_path().display());
        if opts.fetch.force_refresh {
            println!("  Mode: Force refresh (re-fetching all data)");
        }
    } else {
        println!("Cache: Disabled");
    }
    println!();

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(StdDuration::from_millis(100));
    pb.set_message("Fetching air quality and index quotes...");

    let aqi_client = AirQualityClient::new()?;
    let index_provider = IndexQuoteProvider::new()?;

    // The two fetches have no ordering dependency; run them concurrently.
    let (aqi, close) = tokio::join!(
        load_air_quality(&aqi_client, opts.location, opts.days, &opts.fetch),
        load_market_index(&index_provider, &opts.ticker, opts.days, &opts.fetch),
    );
    pb.finish_and_clear();

    let aqi = match aqi {
        Ok(table) => {
            println!("✓ Air quality: {} daily rows", table.len());
            Some(table)
        }
        Err(e) => {
            eprintln!("✗ Failed to load air-quality data: {}", e);
            None
        }
    };
    let close = match close {
        Ok(table) => {
            println!("✓ {}: {} trading-day rows", opts.ticker, table.len());
            Some(table)
        }
        Err(e) => {
            eprintln!("✗ Failed to load index data for {}: {}", opts.ticker, e);
            None
        }
    };

    match (aqi, close) {
        (Some(aqi), Some(close)) => analyze_pair(&opts, &aqi, &close),
        // Render what loaded; correlation needs both sides.
        (Some(table), None) => {
            render_single(&opts, &table, &aqi_chart_title(opts.location), "AQI Value", "orange")
        }
        (None, Some(table)) => {
            let title = index_chart_title(&opts.ticker);
            render_single(&opts, &table, &title, "Closing Value", "blue")
        }
        (None, None) => Err("no series could be loaded; see the errors above".into()),
    }
}

fn analyze_pair(
    opts: &AnalyzeOpts,
    aqi: &TimeSeriesTable,
    close: &TimeSeriesTable,
) -> Result<(), Box<dyn std::error::Error>> {
    let aqi = fill(aqi, opts.strategy)?;
    let close = fill(close, opts.strategy)?;

    let pair = align(&aqi, &close)?;
    if pair.is_empty() {
        println!("\n⚠ No overlapping dates between the two series.");
    }

    let outcome = correlate(&pair);
    let summary = AnalysisSummary::from_outcome(&pair, &outcome)?;
    print!("\n{}", summary);

    write_artifacts(opts, &pair, summary.correlation)?;

    println!("\nInterpretation guide:");
    println!("  close to +1  the series move together");
    println!("  close to  0  little to no linear relationship");
    println!("  close to -1  the series move in opposite directions");

    Ok(())
}

fn render_single(
    opts: &AnalyzeOpts,
    table: &TimeSeriesTable,
    title: &str,
    y_label: &str,
    color: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let table = fill(table, opts.strategy)?;

    println!("\n{}: {} rows after gap filling", title, table.len());
    println!("Correlation skipped: only one series available.");

    if let Some(dir) = &opts.out {
        let chart = time_series_chart(&table, title, y_label, color)?;
        let path = write_chart(dir, "series_chart.json", &chart)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn write_artifacts(
    opts: &AnalyzeOpts,
    pair: &AlignedPair,
    correlation: Option<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = &opts.out {
        let index_name = index_display_name(&opts.ticker);

        let aqi_chart = time_series_chart(
            pair.left(),
            &aqi_chart_title(opts.location),
            "AQI Value",
            "orange",
        )?;
        let close_chart = time_series_chart(
            pair.right(),
            &index_chart_title(&opts.ticker),
            "Closing Value",
            "blue",
        )?;
        let scatter = scatter_chart(
            pair,
            &format!("AQI vs {}: Correlation Scatter Plot", index_name),
            "Air Quality Index (AQI)",
            &format!("{} Closing Value", index_name),
            true,
        )?;

        for (file_name, chart) in [
            ("aqi_chart.json", &aqi_chart),
            ("index_chart.json", &close_chart),
            ("scatter_chart.json", &scatter),
        ] {
            let path = write_chart(dir, file_name, chart)?;
            println!("Wrote {}", path.display());
        }
    }

    if let Some(format) = opts.export {
        let dir = opts.out.clone().unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("analysis.{}", format.extension()));
        AnalysisExport::from_pair(pair, opts.days, correlation)?.export_to_file(&path, format)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn run_cache(clear: bool) -> Result<(), Box<dyn std::error::Error>> {
    let cache = cache_manager::open_cache()?;

    if clear {
        cache.clear()?;
        println!("Cache cleared.");
        return Ok(());
    }

    let stats = cache.stats()?;
    println!("Cache: {}", cache_manager::default_cache_path().display());
    println!("  Cached series: {}", stats.series);
    println!("  Cached rows: {}", stats.rows);

    Ok(())
}

fn index_display_name(ticker: &str) -> String {
    if ticker == NIFTY_50 {
        "Nifty 50".to_string()
    } else {
        ticker.to_string()
    }
}

fn index_chart_title(ticker: &str) -> String {
    format!("{} Index", index_display_name(ticker))
}

fn aqi_chart_title(location: Location) -> String {
    if location == MUMBAI {
        "Mumbai Air Quality Index (AQI)".to_string()
    } else {
        format!(
            "Air Quality Index ({:.2}, {:.2})",
            location.latitude, location.longitude
        )
    }
}
