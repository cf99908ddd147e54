//! Used-car pricing CLI
//!
//! Four commands:
//! - quote: price one vehicle from a baseline or a price table
//! - schedule: price a vehicle at every age up to a limit
//! - catalog: list brands, models and engine powers in a price table
//! - config: print the effective pricing configuration

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing::{info, Level};

use depreciation_engine::{
    BaselineEstimate, DecayOrder, DepreciationBreakdown, DepreciationEngine, PriceReport,
    PriceTable, PricingConfig, VehicleQuote,
};

#[derive(Parser)]
#[command(name = "pricing-cli")]
#[command(about = "Quote used-car prices from a factory-fresh baseline")]
#[command(version = "0.1.0")]
struct Cli {
    /// Pricing configuration (TOML). Falls back to PRICING_* environment variables.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log engine decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a single vehicle
    Quote {
        #[arg(long)]
        brand: String,

        #[arg(long)]
        model: String,

        /// Engine power in HP
        #[arg(long)]
        power: u32,

        /// Age in whole years
        #[arg(long, allow_hyphen_values = true)]
        age: i64,

        /// Mileage, thousands separators allowed (e.g. 100.000)
        #[arg(long, allow_hyphen_values = true)]
        mileage: String,

        /// Factory-fresh price, used instead of a price table
        #[arg(long, conflicts_with = "table")]
        baseline: Option<f64>,

        /// Price table (TOML) to look the factory-fresh price up in
        #[arg(long)]
        table: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Price a vehicle at every age from 0 to --max-age
    Schedule {
        #[arg(long)]
        baseline: f64,

        #[arg(long, default_value = "0")]
        mileage: String,

        #[arg(long, default_value = "15")]
        max_age: u32,
    },

    /// Browse a price table
    Catalog {
        #[arg(long)]
        table: PathBuf,

        #[arg(long)]
        brand: Option<String>,

        #[arg(long, requires = "brand")]
        model: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Quote { brand, model, power, age, mileage, baseline, table, json } => {
            let mileage = parse_mileage(&mileage)?;
            let quote = VehicleQuote::new(brand, model, age, mileage, power);
            let engine = DepreciationEngine::new(config)?;

            let report = match (baseline, table) {
                (Some(price), _) => {
                    let fixed = |_: &VehicleQuote| -> depreciation_engine::Result<BaselineEstimate> {
                        Ok(BaselineEstimate::point(price))
                    };
                    engine.quote(&fixed, &quote)?
                }
                (None, Some(path)) => {
                    let table = PriceTable::from_file(&path)
                        .with_context(|| format!("Failed to load price table {}", path.display()))?;
                    engine.quote(&table, &quote)?
                }
                (None, None) => anyhow::bail!("either --baseline or --table is required"),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Schedule { baseline, mileage, max_age } => {
            let mileage = parse_mileage(&mileage)?;
            let engine = DepreciationEngine::new(config)?;
            let schedule = engine.schedule(baseline, mileage, max_age)?;
            print_schedule(&schedule, mileage);
        }
        Commands::Catalog { table, brand, model } => {
            let table = PriceTable::from_file(&table)
                .with_context(|| format!("Failed to load price table {}", table.display()))?;
            match (brand, model) {
                (Some(brand), Some(model)) => {
                    for power in table.powers(&brand, &model) {
                        println!("{} HP", power);
                    }
                }
                (Some(brand), None) => table.models(&brand).iter().for_each(|m| println!("{}", m)),
                _ => table.brands().iter().for_each(|b| println!("{}", b)),
            }
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<PricingConfig> {
    let config = match path {
        Some(path) => PricingConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => PricingConfig::from_env().context("Failed to load configuration from environment")?,
    };
    info!("Using decay order {:?}, floor {}", config.decay_order, config.floor);
    Ok(config)
}

/// Parse a mileage typed with `.`, `,`, `_` or space as thousands separators
fn parse_mileage(input: &str) -> anyhow::Result<i64> {
    let cleaned: String =
        input.chars().filter(|c| !matches!(c, '.' | ',' | '_' | ' ')).collect();
    if cleaned.is_empty() {
        return Ok(0);
    }
    cleaned.parse().with_context(|| format!("Invalid mileage: {}", input))
}

/// Whole units with `.` as the thousands separator
fn format_amount(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn print_report(report: &PriceReport) {
    let b = &report.breakdown;
    let separator = "-".repeat(44);

    println!(
        "{} {} ({} HP)",
        report.quote.brand.bold(),
        report.quote.model.bold(),
        report.quote.power_hp
    );
    println!("Factory-fresh value: {}", format_amount(b.baseline_price));
    if let Some(spread) = &report.estimate.spread {
        println!(
            "  ensemble of {}: std {} | 90% {} - {}",
            spread.members,
            format_amount(spread.std_dev),
            format_amount(spread.p5),
            format_amount(spread.p95)
        );
    }
    println!("{}", separator);

    let age_line = format!(
        "Age ({} years): -{} (x{:.4})",
        report.quote.age_years,
        format_amount(b.age_loss),
        b.age_multiplier
    );
    let mileage_line = format!(
        "Mileage ({}): -{} (x{:.4})",
        format_amount(report.quote.mileage as f64),
        format_amount(b.mileage_loss),
        b.mileage_multiplier
    );
    match b.decay_order {
        DecayOrder::AgeFirst => {
            println!("{}", age_line.yellow());
            println!("{}", mileage_line.yellow());
        }
        DecayOrder::MileageFirst => {
            println!("{}", mileage_line.yellow());
            println!("{}", age_line.yellow());
        }
    }
    println!("{}", separator);

    println!("{} {}", "Estimated price:".bold(), format_amount(b.final_price).green().bold());
    if b.floor_applied {
        println!("{}", format!("(held at the floor of {})", format_amount(b.floor)).red());
    }
    if let Some((low, high)) = report.price_band() {
        println!("90% band: {} - {}", format_amount(low), format_amount(high));
    }
}

fn print_schedule(schedule: &[DepreciationBreakdown], mileage: i64) {
    println!("{}", format!("Mileage fixed at {}", format_amount(mileage as f64)).bold());
    println!("{:>4}  {:>14}  {:>8}  {:>14}", "age", "price", "x age", "age loss");
    for (age, row) in schedule.iter().enumerate() {
        let price = format!("{:>14}", format_amount(row.final_price));
        println!(
            "{:>4}  {}  {:>8.4}  {:>14}",
            age,
            if row.floor_applied { price.red() } else { price.normal() },
            row.age_multiplier,
            format_amount(row.age_loss)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mileage_separators() {
        assert_eq!(parse_mileage("100.000").unwrap(), 100_000);
        assert_eq!(parse_mileage("1,250,000").unwrap(), 1_250_000);
        assert_eq!(parse_mileage("75 000").unwrap(), 75_000);
        assert_eq!(parse_mileage("").unwrap(), 0);
        assert_eq!(parse_mileage("-5").unwrap(), -5);
        assert!(parse_mileage("lots").is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.4), "999");
        assert_eq!(format_amount(1_000.0), "1.000");
        assert_eq!(format_amount(743_750.0), "743.750");
        assert_eq!(format_amount(1_234_567.6), "1.234.568");
        assert_eq!(format_amount(-12_500.0), "-12.500");
    }

    #[test]
    fn test_cli_parses_quote() {
        let cli = Cli::try_parse_from([
            "pricing-cli", "quote", "--brand", "fiat", "--model", "egea", "--power", "95",
            "--age", "3", "--mileage", "120.000", "--baseline", "900000",
        ])
        .unwrap();
        match cli.command {
            Commands::Quote { age, mileage, baseline, .. } => {
                assert_eq!(age, 3);
                assert_eq!(mileage, "120.000");
                assert_eq!(baseline, Some(900_000.0));
            }
            _ => panic!("Expected Quote"),
        }
    }

    #[test]
    fn test_cli_baseline_conflicts_with_table() {
        let result = Cli::try_parse_from([
            "pricing-cli", "quote", "--brand", "a", "--model", "b", "--power", "1", "--age", "0",
            "--mileage", "0", "--baseline", "1", "--table", "t.toml",
        ]);
        assert!(result.is_err());
    }
}
