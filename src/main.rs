use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use log::debug;
use wealth_gap::eda_statistics::QuartileBoundaries;
use wealth_gap::year_eda::{attribute_by_quartile, percent_of_whole_all, sector_shares_by_quartile};
use wealth_gap::{Attribute, Config, Dataset, Metric, Pipeline, Quartile, Year};

const DEFAULT_LOGGING_LEVEL: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "wealth-gap", version, about = "Merge country statistics and rank GDP quartiles")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Directory holding the dataset files (overrides the config)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Descriptive GDP statistics, quartile boundaries and sector sums by quartile
    Summary {
        #[arg(short, long)]
        year: Option<Year>,
    },
    /// Year-on-year percentage change for one country
    Change {
        #[arg(long)]
        country: String,
        #[arg(short, long, default_value = "gdp")]
        metric: Metric,
        #[arg(long)]
        start: Option<Year>,
        #[arg(long)]
        end: Option<Year>,
    },
    /// Each country's percentage of the world total, largest first
    Share {
        #[arg(short, long, default_value = "gdp")]
        metric: Metric,
        #[arg(short, long)]
        year: Option<Year>,
    },
    /// Countries grouped by GDP quartile
    Quartiles {
        #[arg(short, long)]
        year: Option<Year>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOGGING_LEVEL))
        .init();
    let args = Cli::parse();
    debug!("args: {args:?}");

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_directory = dir;
    }

    let dataset = Pipeline::new(config).run()?;
    let last_year = *dataset.years().end();

    match args.command {
        Command::Summary { year } => print_summary(&dataset, year.unwrap_or(last_year)),
        Command::Change {
            country,
            metric,
            start,
            end,
        } => {
            if dataset.records().get(&country).is_none() {
                bail!("Unknown country: {country}");
            }
            let start = start.unwrap_or(*dataset.years().start());
            let end = end.unwrap_or(last_year);
            println!("{metric} change for {country}:");
            for (year, change) in dataset.percent_change_over_time(metric, start, end, &country) {
                if change.is_nan() {
                    println!("  {year}: n/a");
                } else {
                    println!("  {year}: {change:+.2}%");
                }
            }
        }
        Command::Share { metric, year } => {
            let year = year.unwrap_or(last_year);
            let mut shares: Vec<(String, f64)> =
                percent_of_whole_all(dataset.records(), Attribute::Yearly(metric, year))
                    .into_iter()
                    .collect();
            shares.sort_by(|a, b| b.1.total_cmp(&a.1));
            println!("Share of world {metric} in {year}:");
            for (country, share) in shares {
                println!("  {country}: {share:.2}%");
            }
        }
        Command::Quartiles { year } => print_quartiles(&dataset, year.unwrap_or(last_year)),
    }
    Ok(())
}

fn print_boundaries(year: Year, boundaries: Option<&QuartileBoundaries>) {
    match boundaries {
        Some(b) => println!(
            "GDP quartile boundaries {year}: {:.2} / {:.2} / {:.2}",
            b.lower, b.median, b.upper
        ),
        None => println!("No GDP data for {year}"),
    }
}

fn print_summary(dataset: &Dataset, year: Year) {
    let summary = dataset.summarize(Metric::Gdp, year);
    let show = |v: Option<f64>| v.map_or("n/a".to_string(), |v| format!("{v:.2}"));
    println!("GDP statistics for {year}:");
    println!("Countries: {} ({} missing)", summary.count, summary.missing);
    println!("Mean: {}", show(summary.mean));
    println!("Median: {}", show(summary.median));
    println!("Std Dev: {}", show(summary.std_dev));
    println!("Min: {}  Max: {}", show(summary.min), show(summary.max));
    print_boundaries(year, dataset.gdp_boundaries(year));

    for shares in sector_shares_by_quartile(dataset.records(), year) {
        let parts: Vec<String> = shares
            .shares
            .iter()
            .map(|(sector, share)| format!("{} {share:.1}%", sector.name()))
            .collect();
        println!("  {}: {}", shares.quartile.label(), parts.join(", "));
    }

    for (kind, report) in dataset.reports() {
        debug!(
            "{kind}: {} rows, {} matched, {} anomalies",
            report.rows,
            report.matched,
            report.anomalies.len()
        );
    }
}

fn print_quartiles(dataset: &Dataset, year: Year) {
    print_boundaries(year, dataset.gdp_boundaries(year));
    let groups = attribute_by_quartile(dataset.records(), Metric::Gdp, year);
    for quartile in Quartile::ALL {
        let countries: Vec<&str> = dataset
            .records()
            .records()
            .filter(|record| record.gdp_quartile(year) == Some(quartile))
            .map(|record| record.name())
            .collect();
        let total: f64 = groups[quartile.index()].iter().map(|(gdp, _)| gdp).sum();
        println!(
            "{} ({} countries, total {total:.2}): {}",
            quartile.label(),
            countries.len(),
            countries.join(", ")
        );
    }
}
