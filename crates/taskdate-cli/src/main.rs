//! `taskdate` CLI — compute and check recurring task dates from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Next occurrence of a Monday/Wednesday task after a given date
//! taskdate next --now 20240305 --date 20240301 --repeat "w 1,3"
//!
//! # The next five occurrences, as JSON
//! taskdate next --date 20240115 --repeat "m -1" --count 5 --json
//!
//! # Validate a rule and print its canonical form
//! taskdate check "m 15,-1 12,1"
//!
//! # Date a task would be stored with
//! taskdate normalize --date 20240101 --repeat "d 7"
//!
//! # What marking a task done does to it
//! taskdate done --date 20240305 --repeat y
//! ```
//!
//! `--now` / `--today` default to `TASKDATE_NOW`, then to the local date.
//! Logging goes to stderr; set `TASKDATE_LOG` (e.g. `debug`) or pass `-v`.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::json;
use taskdate_engine::{
    complete_task, next_date, normalize_task_date, upcoming, Completion, Date, EngineError,
    RecurrenceRule,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "taskdate",
    version,
    about = "Next-occurrence calculator for recurring tasks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace); overrides TASKDATE_LOG
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the next occurrence(s) of a recurring task
    Next {
        /// Task anchor date (YYYYMMDD)
        #[arg(short, long)]
        date: String,
        /// Recurrence rule, e.g. "d 7", "w 1,3", "m -1 2,8", "y"
        #[arg(short, long)]
        repeat: String,
        /// Reference date (YYYYMMDD); results are strictly after it
        #[arg(short, long, env = "TASKDATE_NOW")]
        now: Option<Date>,
        /// Number of consecutive occurrences to print
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..=1000))]
        count: u16,
        /// Print JSON instead of plain dates
        #[arg(long)]
        json: bool,
    },
    /// Validate a recurrence rule and print its canonical form
    Check {
        /// Recurrence rule text
        rule: String,
    },
    /// Print the date a created or edited task would be stored with
    Normalize {
        /// Task date (YYYYMMDD); empty means today
        #[arg(short, long, default_value = "")]
        date: String,
        /// Recurrence rule; empty means the task does not repeat
        #[arg(short, long, default_value = "")]
        repeat: String,
        /// Today's date (YYYYMMDD)
        #[arg(short, long, env = "TASKDATE_NOW")]
        today: Option<Date>,
    },
    /// Print what marking a task done does: its new date, or "retire"
    Done {
        /// Task date (YYYYMMDD)
        #[arg(short, long)]
        date: String,
        /// Recurrence rule; empty means the task does not repeat
        #[arg(short, long, default_value = "")]
        repeat: String,
        /// Today's date (YYYYMMDD)
        #[arg(short, long, env = "TASKDATE_NOW")]
        today: Option<Date>,
        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Next {
            date,
            repeat,
            now,
            count,
            json,
        } => {
            let now = now.unwrap_or_else(Date::today);
            let dates = upcoming_dates(now, &date, &repeat, usize::from(count))
                .with_context(|| format!("Failed to compute next date for {:?}", repeat))?;

            if json {
                let body = match dates.as_slice() {
                    [only] => json!({ "next_date": only }),
                    all => json!({ "occurrences": all }),
                };
                println!("{}", body);
            } else {
                for date in dates {
                    println!("{}", date);
                }
            }
        }
        Commands::Check { rule } => {
            let parsed: RecurrenceRule = rule
                .parse()
                .with_context(|| format!("Invalid recurrence rule {:?}", rule))?;
            println!("{}", parsed);
        }
        Commands::Normalize {
            date,
            repeat,
            today,
        } => {
            let today = today.unwrap_or_else(Date::today);
            let stored = normalize_task_date(today, &date, &repeat)
                .context("Failed to normalize task date")?;
            println!("{}", stored);
        }
        Commands::Done {
            date,
            repeat,
            today,
            json,
        } => {
            let today = today.unwrap_or_else(Date::today);
            let completion =
                complete_task(today, &date, &repeat).context("Failed to complete task")?;
            if json {
                println!("{}", serde_json::to_string(&completion)?);
            } else {
                match completion {
                    Completion::Reschedule(next) => println!("{}", next),
                    Completion::Retire => println!("retire"),
                }
            }
        }
    }

    Ok(())
}

/// Parse the task fields once and collect `count` occurrences after `now`.
fn upcoming_dates(now: Date, date: &str, repeat: &str, count: usize) -> Result<Vec<Date>> {
    if count == 1 {
        return Ok(vec![next_date(now, date, repeat)?]);
    }
    debug!(%now, date, repeat, count, "computing upcoming dates");
    let anchor = Date::parse(date)?;
    if repeat.is_empty() {
        return Err(EngineError::EmptyRule.into());
    }
    let rule: RecurrenceRule = repeat.parse()?;
    Ok(upcoming(now, anchor, &rule, count)?)
}

/// Install a stderr fmt subscriber. `-v` flags win over `TASKDATE_LOG`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("TASKDATE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
