mod commands;
mod config;
mod textgen;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_delete, cmd_history, cmd_list, cmd_log, cmd_plan, cmd_profile_set, cmd_profile_show,
    cmd_reset, cmd_summary, cmd_update,
};
use crate::config::{Config, LOG_ENV};
use crate::textgen::TextGenClient;
use personalfit_core::progress::MAX_SERIES_DAYS;
use personalfit_core::service::TrackerService;

#[derive(Parser)]
#[command(
    name = "personalfit",
    version,
    about = "A simple, local-first nutrition tracker",
    long_about = "Set up your profile once to get a daily calorie goal, then log what you eat \
                  and see how each day compares."
)]
struct Cli {
    /// Enable debug logging (overrides PERSONALFIT_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage your profile and daily calorie goal
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Log a meal
    Log {
        /// What you ate
        description: String,
        /// Calories (e.g. "350" or "350kcal")
        calories: String,
        /// Meal category: breakfast, lunch, dinner, snack
        #[arg(short, long, default_value = "snack")]
        category: String,
        /// Date to log for (YYYY-MM-DD, RFC 3339, or today/yesterday/tomorrow)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a logged meal
    Update {
        /// Entry ID to update
        entry_id: String,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New calories
        #[arg(long)]
        calories: Option<String>,
        /// New meal category: breakfast, lunch, dinner, snack
        #[arg(long)]
        category: Option<String>,
        /// New date (YYYY-MM-DD or today/yesterday/tomorrow)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a logged meal by ID
    Delete {
        /// Entry ID to delete
        entry_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List meals for a day (defaults to today)
    List {
        /// Date to list (YYYY-MM-DD, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a day's meals grouped by category, with progress against the goal
    Summary {
        /// Date to show (YYYY-MM-DD, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show daily totals against the goal for the last N days
    History {
        /// Number of days to show (1-3660)
        #[arg(
            short,
            long,
            default_value = "7",
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_SERIES_DAYS))
        )]
        days: u32,
        /// Last day of the range (default: today)
        #[arg(long)]
        end: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest a one-day meal plan for your goal
    Plan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove your profile and every logged meal
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Set your physical stats and recompute the goal
    Set {
        /// Sex: M or F (anything else leaves the goal undefined)
        #[arg(long)]
        sex: String,
        /// Age in years
        #[arg(long)]
        age: u32,
        /// Weight in kg
        #[arg(long)]
        weight: f64,
        /// Height in cm
        #[arg(long)]
        height: f64,
        /// Activity level: sedentary, light, moderate, intense
        #[arg(long, default_value = "sedentary")]
        activity: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show your profile and goal
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        db = %config.db_path.display(),
        "opening store"
    );
    let svc = TrackerService::new(&config.db_path)?;

    match cli.command {
        Commands::Profile { command } => match command {
            ProfileCommands::Set {
                sex,
                age,
                weight,
                height,
                activity,
                json,
            } => cmd_profile_set(&svc, &sex, age, weight, height, &activity, json),
            ProfileCommands::Show { json } => cmd_profile_show(&svc, json),
        },
        Commands::Log {
            description,
            calories,
            category,
            date,
            json,
        } => cmd_log(&svc, &description, &calories, &category, date, json),
        Commands::Update {
            entry_id,
            description,
            calories,
            category,
            date,
            json,
        } => cmd_update(
            &svc,
            &entry_id,
            description,
            calories.as_deref(),
            category.as_deref(),
            date,
            json,
        ),
        Commands::Delete { entry_id, json } => cmd_delete(&svc, &entry_id, json),
        Commands::List { date, json } => cmd_list(&svc, date, json),
        Commands::Summary { date, json } => cmd_summary(&svc, date, json),
        Commands::History { days, end, json } => cmd_history(&svc, days, end, json),
        Commands::Plan { json } => {
            let textgen = config
                .textgen_url
                .as_deref()
                .map(|url| TextGenClient::new(url, config.textgen_key.clone()))
                .transpose()?;
            cmd_plan(&svc, textgen.as_ref(), json).await
        }
        Commands::Reset { yes, json } => cmd_reset(&svc, yes, json),
    }
}
