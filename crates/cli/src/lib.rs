pub mod commands;
pub mod logging;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "sitequote",
    about = "Sitequote operator CLI",
    long_about = "Operate the Sitequote estimator: migrations, catalog seeding, config inspection, \
                  readiness checks, and offline quotes and calculators.",
    after_help = "Examples:\n  sitequote doctor --json\n  sitequote estimate --type landing --feature seo\n  sitequote timeline --type ecommerce --start 2026-11-02"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the starter estimator catalog into the content store and verify it")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, DB connectivity, and catalog source readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Print the active estimator catalog and where it came from")]
    Catalog,
    #[command(about = "Price a project type plus features against the active catalog")]
    Estimate {
        #[arg(long = "type", value_name = "ID", help = "Project type id, e.g. `landing`")]
        project_type: String,
        #[arg(long = "feature", value_name = "ID", help = "Feature id; repeat for several")]
        features: Vec<String>,
    },
    #[command(about = "Project monthly revenue after a site rebuild")]
    Roi {
        #[arg(long)]
        visitors: u32,
        #[arg(long = "conversion-rate", value_name = "PCT")]
        conversion_rate: Decimal,
        #[arg(long = "customer-value")]
        customer_value: Decimal,
    },
    #[command(about = "Lay out delivery phases and launch date for a project type")]
    Timeline {
        #[arg(long = "type", value_name = "TYPE", help = "Project type label or id")]
        project_type: String,
        #[arg(long, value_name = "YYYY-MM-DD", help = "Defaults to today (UTC)")]
        start: Option<NaiveDate>,
    },
    #[command(name = "health-check", about = "Score website health quiz answers")]
    HealthCheck {
        #[arg(
            long,
            value_delimiter = ',',
            value_name = "INDEX,...",
            help = "Zero-based option index per question"
        )]
        answers: Vec<usize>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = logging::init_from_env() {
        eprintln!("logging disabled: {error}");
    }

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Catalog => commands::catalog::run(),
        Command::Estimate { project_type, features } => {
            commands::estimate::run(&project_type, &features)
        }
        Command::Roi { visitors, conversion_rate, customer_value } => {
            commands::roi::run(visitors, conversion_rate, customer_value)
        }
        Command::Timeline { project_type, start } => commands::timeline::run(&project_type, start),
        Command::HealthCheck { answers } => commands::health_check::run(&answers),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
