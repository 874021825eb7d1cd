use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};

use restock_core::{ReminderPolicy, RestockStatus};
use restock_engine::{
    Ingestor, MemoryStore, RecordStore, StoreState, due_reminders, product_overview, purchase_log,
};

mod state;

#[derive(Parser, Debug)]
#[command(name = "restock", version, about = "Household restock reminders")]
struct Cli {
    /// Who is recording purchases
    #[arg(long, global = true, default_value = "demo-user")]
    user: String,

    /// Whose shelf this is
    #[arg(long, global = true, default_value = "demo-household")]
    household: String,

    /// Override the state file (default: ~/.restock/state.json)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest a receipt text file: match products, record purchases,
    /// refresh paces, schedule reminders
    Ingest {
        /// Path to receipt text (e.g. OCR output)
        receipt: PathBuf,

        /// Purchase date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List reminders due around today
    Due,

    /// Show every tracked product with its depletion estimate
    Products,

    /// Recent purchases grouped by shopping day
    History {
        /// Max purchase rows to consider
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Mark a reminder as handled
    Complete {
        /// Reminder id (as printed by `due`)
        #[arg(long)]
        id: String,
    },

    /// Load sample data into the state file
    Seed,
}

fn status_marker(status: RestockStatus) -> &'static str {
    match status {
        RestockStatus::Urgent => "!!",
        RestockStatus::Warning => " !",
        RestockStatus::Ok => "  ",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let state_path = match &cli.state {
        Some(p) => p.clone(),
        None => state::default_state_path()?,
    };
    let store = Arc::new(MemoryStore::from_state(state::read_state(&state_path)?));
    let policy = ReminderPolicy::default();
    let today = Utc::now().date_naive();

    match &cli.command {
        Command::Ingest { receipt, date } => {
            let text = std::fs::read_to_string(receipt)
                .with_context(|| format!("read {}", receipt.display()))?;
            let items = restock_ingest::extract_line_items(&text)?;
            if items.is_empty() {
                println!("No line items recognized in {}.", receipt.display());
                return Ok(());
            }

            let purchase_date = match date {
                Some(d) => Utc
                    .from_local_datetime(&d.and_hms_opt(12, 0, 0).context("invalid date")?)
                    .single()
                    .context("invalid purchase date")?,
                None => Utc::now(),
            };

            let ingestor = Ingestor::new(store.clone());
            let report = ingestor
                .ingest(&items, &cli.user, &cli.household, purchase_date)
                .await?;

            println!(
                "Saved {} item(s): {} product(s) created, {} updated, {} reminder(s) scheduled, {} skipped.",
                report.items_saved,
                report.products_created,
                report.products_updated,
                report.reminders_created,
                report.items_skipped,
            );
            for item in &report.items {
                let tag = if item.newly_created { "new" } else { "known" };
                println!(
                    "  {} [{}] ({}) -> remind {}",
                    item.name, item.category, tag, item.reminder_date
                );
            }
        }

        Command::Due => {
            let due = due_reminders(&*store, &cli.user, today, &policy).await?;
            if due.is_empty() {
                println!("Nothing due within {} day(s).", policy.due_window_days);
            }
            for r in due {
                let when = match r.status {
                    RestockStatus::Urgent if r.days > 0 => format!("{} day(s) overdue", r.days),
                    RestockStatus::Urgent => "due today".to_string(),
                    _ => format!("in {} day(s)", r.days),
                };
                println!(
                    "{} {}  {} ({})  id={}",
                    status_marker(r.status),
                    r.target_date,
                    r.product_name,
                    when,
                    r.id
                );
            }
        }

        Command::Products => {
            let overview = product_overview(&*store, &cli.household, today, &policy).await?;
            if overview.is_empty() {
                println!("No products tracked yet. Try `restock ingest` or `restock seed`.");
            }
            for p in overview {
                let stock = match (p.days_until_empty, p.status) {
                    (Some(days), Some(status)) => {
                        format!("{} ~{} day(s) left", status_marker(status), days)
                    }
                    _ => "   never purchased".to_string(),
                };
                println!(
                    "{}  {} [{}] pace {}d",
                    stock, p.name, p.category, p.current_consumption_days
                );
            }
        }

        Command::History { limit } => {
            let log = purchase_log(&*store, &cli.user, *limit).await?;
            if log.is_empty() {
                println!("No purchases recorded yet.");
            }
            for day in log {
                println!(
                    "{} — {} item(s), total {:.0}",
                    day.date, day.total_items, day.total_price
                );
                for line in day.items {
                    let price = line
                        .price
                        .map(|p| format!("{p:.0}"))
                        .unwrap_or_else(|| "-".to_string());
                    println!("    {} x{}  {}", line.name, line.quantity, price);
                }
            }
        }

        Command::Complete { id } => {
            store.complete_reminder(id).await?;
            println!("Reminder {id} completed.");
        }

        Command::Seed => {
            let sample = StoreState::sample(&cli.household, &cli.user, Utc::now());
            state::write_state(&state_path, &sample)?;
            println!(
                "Seeded {} product(s) into {}.",
                sample.products.len(),
                state_path.display()
            );
            return Ok(());
        }
    }

    state::write_state(&state_path, &store.snapshot().await)?;
    Ok(())
}
