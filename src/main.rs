use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use invoice_calc::config::{config_dir, load_config_or_default, CONFIG_TEMPLATE};
use invoice_calc::format::{format_currency, format_percent, parse_decimal};
use invoice_calc::{load_document, payment_schedule, CalcError, ReportData, Result, ScheduleData};

#[derive(Parser)]
#[command(name = "invoice-calc")]
#[command(version, about = "Invoice line calculator (HT, TVA, TTC)", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.invoice-calc or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// List configured tax rates
    Rates,

    /// Compute lines, TVA and totals of a document file
    Compute {
        /// Document file (TOML)
        file: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Split a document's total into a deposit and payments
    Schedule {
        /// Document file (TOML)
        file: PathBuf,

        /// Deposit percentage (0, 5, 10, 20, ..., 100)
        #[arg(short, long, default_value_t = 0)]
        deposit: u32,

        /// Number of payments after the deposit (1 to 11)
        #[arg(short, long, default_value_t = 1)]
        times: u32,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse an amount as typed in a form and print it formatted
    Format {
        /// Raw amount (e.g., "15,25")
        value: String,

        /// Keep up to four decimals instead of cutting to cents
        #[arg(long)]
        precise: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("invoice_calc={level}"))),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Rates => cmd_rates(&cfg_dir),
        Commands::Compute { file, json } => cmd_compute(&cfg_dir, &file, json),
        Commands::Schedule {
            file,
            deposit,
            times,
            json,
        } => cmd_schedule(&cfg_dir, &file, deposit, times, json),
        Commands::Format { value, precise } => cmd_format(&cfg_dir, &value, precise),
    }
}

/// Initialize config directory with the template file
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    if cfg_dir.exists() {
        return Err(CalcError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized invoice-calc config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Adjust currency and tax rates:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Compute a document:             invoice-calc compute <document.toml>");

    Ok(())
}

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "VALUE")]
    value: u32,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "RATE")]
    rate: String,
    #[tabled(rename = "DEFAULT")]
    default: String,
}

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "COST")]
    cost: String,
    #[tabled(rename = "QTY")]
    quantity: String,
    #[tabled(rename = "TVA")]
    tva: String,
    #[tabled(rename = "TOTAL HT")]
    total: String,
}

#[derive(Tabled)]
struct InstalmentRow {
    #[tabled(rename = "#")]
    index: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

/// List configured tax rates
fn cmd_rates(cfg_dir: &Path) -> Result<()> {
    let config = load_config_or_default(cfg_dir)?;

    let rows: Vec<RateRow> = config
        .tax
        .rates
        .iter()
        .map(|entry| RateRow {
            value: entry.value.basis_points(),
            name: entry.name.clone(),
            rate: format_percent(entry.value.basis_points()),
            default: if entry.value == config.tax.default {
                "*".to_string()
            } else {
                String::new()
            },
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Compute and print a document's lines and totals
fn cmd_compute(cfg_dir: &Path, file: &Path, json: bool) -> Result<()> {
    let config = load_config_or_default(cfg_dir)?;
    let document = load_document(file, &config.tax)?;
    let report = ReportData::build(&document, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.lines.is_empty() {
        println!("No lines in {}", file.display());
    } else {
        let rows: Vec<LineRow> = report
            .lines
            .iter()
            .map(|line| LineRow {
                description: line.description.clone(),
                cost: line.cost.clone(),
                quantity: line.quantity.clone(),
                tva: line.tva.clone(),
                total: line.total.clone(),
            })
            .collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    println!();
    println!("Subtotal HT:    {}", report.tasks_ht);
    println!("Total HT:       {}", report.total_ht);
    for tax in &report.taxes {
        println!("TVA {:<10} {}", tax.label, tax.amount);
    }
    println!("Total TTC:      {}", report.total_ttc);

    if !report.payments.is_empty() {
        println!();
        println!("Payments:");
        for payment in &report.payments {
            match &payment.date {
                Some(date) => println!("  {} ({}) - {}", payment.description, date, payment.amount),
                None => println!("  {} - {}", payment.description, payment.amount),
            }
        }
        println!("Remaining HT:   {}", report.remaining_ht);
    }
    println!("Total:          {}", report.total);

    Ok(())
}

/// Print the deposit and payments of a document's total
fn cmd_schedule(cfg_dir: &Path, file: &Path, deposit: u32, times: u32, json: bool) -> Result<()> {
    let config = load_config_or_default(cfg_dir)?;
    let document = load_document(file, &config.tax)?;
    let balance = document.balance()?;

    let schedule = payment_schedule(balance.grand_total, deposit, times)?;
    let data = ScheduleData::build(&schedule, deposit, &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    let mut rows = vec![InstalmentRow {
        index: format!("Deposit ({}%)", data.deposit_percent),
        amount: data.deposit.clone(),
    }];
    rows.extend(
        data.instalments
            .iter()
            .enumerate()
            .map(|(idx, amount)| InstalmentRow {
                index: format!("Payment {}", idx + 1),
                amount: amount.clone(),
            }),
    );

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!("Total: {}", data.total);

    Ok(())
}

/// Format a raw amount the way line totals are displayed
fn cmd_format(cfg_dir: &Path, value: &str, precise: bool) -> Result<()> {
    let config = load_config_or_default(cfg_dir)?;
    let amount = parse_decimal(value);
    println!(
        "{}",
        format_currency(amount, !precise, &config.currency.symbol)
    );
    Ok(())
}
