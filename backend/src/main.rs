//! GDP Trends CLI - analyze OECD GDP exports
//!
//! # Main Commands
//!
//! ```bash
//! gdp-trends analyze "GDP Hist.csv"              # Full report (JSON)
//! gdp-trends serve                               # Start HTTP server (port 3000)
//! gdp-trends default-config > analysis.json      # Editable configuration
//! ```
//!
//! # Single Stages
//!
//! ```bash
//! gdp-trends clean input.csv                     # Cleaned levels series
//! gdp-trends coverage input.csv                  # Countries per year
//! gdp-trends slice input.csv --year 2019         # Ranked single year
//! gdp-trends growth input.csv --from 1970 --to 2019
//! gdp-trends annual input.csv --country IRL
//! ```
//!
//! The input path may be omitted when `GDP_TRENDS_DATA` is set (a `.env`
//! file is honored).

use clap::{Parser, Subcommand};
use gdp_trends::{
    analyze_file, annual_growth, clean, cross_country_growth, load_file_auto, year_coverage, year_slice,
    AnalysisConfig, CleanedSeries,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const DATA_ENV: &str = "GDP_TRENDS_DATA";
const PORT_ENV: &str = "GDP_TRENDS_PORT";

#[derive(Parser)]
#[command(name = "gdp-trends")]
#[command(about = "Rank, grow and compare national GDP series from OECD exports", long_about = None)]
struct Cli {
    /// Analysis configuration (JSON); defaults apply otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every stage and output the full report
    Analyze {
        /// Input CSV file (default: $GDP_TRENDS_DATA)
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Output the cleaned levels series
    Clean {
        input: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Count reporting countries per year
    Coverage { input: Option<PathBuf> },

    /// Rank countries for one year (blocs excluded)
    Slice {
        input: Option<PathBuf>,

        /// Target year (default: configured reference year)
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Growth between two years for countries present in both
    Growth {
        input: Option<PathBuf>,

        #[arg(long)]
        from: Option<i32>,

        #[arg(long)]
        to: Option<i32>,
    },

    /// Year-over-year growth for one country
    Annual {
        input: Option<PathBuf>,

        /// Country code (default: configured focus country)
        #[arg(long)]
        country: Option<String>,
    },

    /// Print the default configuration
    DefaultConfig,

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: $GDP_TRENDS_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory of static files for a rendering client
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match load_config(cli.config.as_deref()) {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: AnalysisConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Analyze { input, output } => cmd_analyze(&resolve_input(input)?, &config, output.as_deref()),

        Commands::Clean { input, output } => {
            let cleaned = load_cleaned(&resolve_input(input)?, &config)?;
            write_json(&cleaned, output.as_deref())
        }

        Commands::Coverage { input } => {
            let cleaned = load_cleaned(&resolve_input(input)?, &config)?;
            write_json(&year_coverage(&cleaned), None)
        }

        Commands::Slice { input, year } => {
            let cleaned = load_cleaned(&resolve_input(input)?, &config)?;
            let year = year.unwrap_or(config.reference_year);
            write_json(&year_slice(&cleaned, year, &config.exclusions), None)
        }

        Commands::Growth { input, from, to } => {
            let cleaned = load_cleaned(&resolve_input(input)?, &config)?;
            let growth = cross_country_growth(
                &cleaned,
                from.unwrap_or(config.growth_start_year),
                to.unwrap_or(config.growth_end_year),
                &config.exclusions,
            )?;
            write_json(&growth, None)
        }

        Commands::Annual { input, country } => {
            let cleaned = load_cleaned(&resolve_input(input)?, &config)?;
            let country = country.unwrap_or_else(|| config.focus_country.clone());
            write_json(&annual_growth(&cleaned, &country)?, None)
        }

        Commands::DefaultConfig => {
            println!("{}", AnalysisConfig::default().to_json()?);
            Ok(())
        }

        Commands::Serve { port, static_dir } => {
            let port = match port {
                Some(p) => p,
                None => std::env::var(PORT_ENV)
                    .ok()
                    .map(|v| v.parse::<u16>())
                    .transpose()?
                    .unwrap_or(3000),
            };
            gdp_trends::server::start_server(port, config, static_dir).await
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            eprintln!("⚙️  Config: {}", p.display());
            Ok(AnalysisConfig::from_file(p)?)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn resolve_input(input: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match input {
        Some(p) => Ok(p),
        None => std::env::var(DATA_ENV)
            .map(PathBuf::from)
            .map_err(|_| format!("No input file given and {} is not set", DATA_ENV).into()),
    }
}

fn load_cleaned(input: &Path, config: &AnalysisConfig) -> Result<CleanedSeries, Box<dyn std::error::Error>> {
    eprintln!("📄 Loading: {}", input.display());
    let loaded = load_file_auto(input)?;
    eprintln!("   Encoding: {}", loaded.encoding);
    eprintln!("   Delimiter: '{}'", gdp_trends::transform::format_delimiter(loaded.delimiter));
    eprintln!("   Rows: {}", loaded.observations.len());
    Ok(clean(&loaded.observations, config.measure)?)
}

fn cmd_analyze(
    input: &Path,
    config: &AnalysisConfig,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Analyzing: {}", input.display());

    let report = analyze_file(input, config)?;

    eprintln!("\n📊 Summary");
    eprintln!("   Rows: {} raw, {} cleaned", report.raw_count, report.cleaned_count);
    if let Some(top) = report.ranking.rows.last() {
        eprintln!(
            "   Largest economy {}: {} ({:.0} MLN USD)",
            report.ranking.year, top.country_code, top.value
        );
    }
    if let (Some(low), Some(high)) = (report.growth.records.first(), report.growth.records.last()) {
        eprintln!(
            "   Growth {}-{}: lowest {} ({:.1}%), highest {} ({:.1}%)",
            report.growth.start_year,
            report.growth.end_year,
            low.country_code,
            low.pct_growth,
            high.country_code,
            high.pct_growth
        );
    }
    eprintln!("   Charts: {}", report.charts.len());

    write_json(&report, output)?;
    eprintln!("\n✨ Done!");
    Ok(())
}

fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string_pretty(value)?;
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
