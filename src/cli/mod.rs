use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};

use crate::application::ExpenseService;
use crate::domain::{
    DATE_FORMAT, Record, RecordId, RecordUpdate, display_cents, format_cents, parse_amount,
    parse_date,
};
use crate::storage::DEFAULT_DATA_FILE;

mod menu;
pub mod render;

pub use menu::Menu;
use render::{Palette, Tone, expense_table, paint, summary_table};

/// Ledger Shredder - terminal expense tracker
#[derive(Parser)]
#[command(name = "shredder")]
#[command(about = "Record, edit and summarize personal expenses kept in a CSV file")]
#[command(version)]
pub struct Cli {
    /// Expense file path
    #[arg(short, long, env = "SHREDDER_FILE", default_value = DEFAULT_DATA_FILE)]
    pub file: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Command to run (opens the interactive menu when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a new expense
    Add {
        /// Amount spent (e.g., "12.50" or "12")
        amount: String,

        /// Category (e.g., "Food", "Rent")
        #[arg(short, long)]
        category: String,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Free-text note
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Change fields of an existing expense
    Edit {
        /// Expense ID
        id: RecordId,

        /// New amount
        #[arg(short, long)]
        amount: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// New note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: RecordId,
    },

    /// List expenses
    List {
        /// Only this category (exact match)
        #[arg(short, long)]
        category: Option<String>,

        /// From date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// To date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// List distinct categories
    Categories,

    /// Total spending per month
    Summary {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Total spending across all expenses
    Total,

    /// Interactive menu
    Menu,
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default level.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let default_directive = if verbose {
        "ledger_shredder=debug"
    } else {
        "ledger_shredder=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A second init (tests, embedding) is harmless
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

impl Cli {
    fn palette(&self) -> &'static Palette {
        if self.no_color {
            &Palette::PLAIN
        } else {
            &Palette::DEFAULT
        }
    }

    pub fn run(self) -> Result<()> {
        init_tracing(self.verbose);
        let palette = self.palette();

        let mut service = ExpenseService::open(&self.file)
            .with_context(|| format!("Failed to load expenses from {}", self.file))?;

        match self.command {
            None | Some(Commands::Menu) => {
                let stdin = io::stdin();
                let stdout = io::stdout();
                run_menu(&mut service, stdin.lock(), stdout.lock(), palette)?;
            }

            Some(Commands::Add {
                amount,
                category,
                date,
                note,
            }) => {
                let amount = parse_amount(&amount)?;
                let date_text = date.unwrap_or_else(|| today().format(DATE_FORMAT).to_string());

                let record = service.add_expense(amount, &category, &date_text, &note)?;
                service.save()?;

                println!(
                    "{}",
                    paint(
                        palette,
                        Tone::Success,
                        &format!("Added expense {}", describe(&record))
                    )
                );
            }

            Some(Commands::Edit {
                id,
                amount,
                category,
                date,
                note,
            }) => {
                let update = build_update(amount, category, date, note)?;
                if update.is_empty() {
                    service.get_expense(id)?;
                    println!("{}", paint(palette, Tone::Warning, "Nothing to change."));
                    return Ok(());
                }

                let record = service.edit_expense(id, update)?;
                service.save()?;

                println!(
                    "{}",
                    paint(
                        palette,
                        Tone::Success,
                        &format!("Updated expense {}", describe(&record))
                    )
                );
            }

            Some(Commands::Delete { id }) => {
                let record = service.delete_expense(id)?;
                service.save()?;

                println!(
                    "{}",
                    paint(
                        palette,
                        Tone::Success,
                        &format!("Deleted expense {}", describe(&record))
                    )
                );
            }

            Some(Commands::List { category, from, to }) => {
                run_list_command(&service, palette, category, from, to)?;
            }

            Some(Commands::Categories) => {
                let categories = service.categories();
                if categories.is_empty() {
                    println!("{}", paint(palette, Tone::Warning, "No categories found."));
                }
                for category in categories {
                    println!("{}", category);
                }
            }

            Some(Commands::Summary { format }) => {
                run_summary_command(&service, palette, &format)?;
            }

            Some(Commands::Total) => {
                println!("{}", format_cents(service.total()?));
            }
        }

        Ok(())
    }
}

/// Drive the interactive menu over arbitrary input/output.
pub fn run_menu<R: BufRead, W: Write>(
    service: &mut ExpenseService,
    input: R,
    output: W,
    palette: &Palette,
) -> Result<()> {
    Menu::new(service, input, output, palette, today()).run()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn describe(record: &Record) -> String {
    format!(
        "{}: {} {} on {}",
        record.id().unwrap_or_default(),
        format_cents(record.amount()),
        record.category(),
        record.date().format(DATE_FORMAT)
    )
}

fn build_update(
    amount: Option<String>,
    category: Option<String>,
    date: Option<String>,
    note: Option<String>,
) -> Result<RecordUpdate> {
    let mut update = RecordUpdate::new();
    if let Some(amount) = amount {
        update = update.amount(parse_amount(&amount)?);
    }
    if let Some(category) = category {
        update = update.category(category);
    }
    if let Some(date) = date {
        update = update.date_text(&date)?;
    }
    if let Some(note) = note {
        update = update.note(note);
    }
    Ok(update)
}

fn run_list_command(
    service: &ExpenseService,
    palette: &Palette,
    category: Option<String>,
    from: Option<String>,
    to: Option<String>,
) -> Result<()> {
    let from = from
        .map(|s| parse_date(&s))
        .transpose()
        .context("Invalid from-date")?;
    let to = to
        .map(|s| parse_date(&s))
        .transpose()
        .context("Invalid to-date")?;

    let mut records = match &category {
        Some(name) => service.expenses_by_category(name),
        None => service.list_expenses(),
    };

    if from.is_some() || to.is_some() {
        let start = from.unwrap_or(NaiveDate::MIN);
        let end = to.unwrap_or(NaiveDate::MAX);
        records.retain(|r| start <= r.date() && r.date() <= end);
    }

    if records.is_empty() {
        println!("{}", paint(palette, Tone::Warning, "No expenses found."));
    } else {
        println!("{}", expense_table(records));
    }
    Ok(())
}

fn run_summary_command(service: &ExpenseService, palette: &Palette, format: &str) -> Result<()> {
    let report = service.monthly_report()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "csv" => {
            println!("month,total,count");
            for month in &report.months {
                println!(
                    "{},{},{}",
                    month.month,
                    format_cents(month.total),
                    month.count
                );
            }
        }
        "table" => {
            if report.is_empty() {
                println!("{}", paint(palette, Tone::Warning, "No expenses recorded."));
            } else {
                println!("{}", summary_table(&report));
                println!(
                    "{}",
                    paint(
                        palette,
                        Tone::Info,
                        &format!("Total: {}", display_cents(report.total))
                    )
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid summary format '{}'. Valid formats: table, json, csv",
                format
            );
        }
    }
    Ok(())
}
