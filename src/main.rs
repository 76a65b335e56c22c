use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use uuid::Uuid;
use xpense::cli::setup::setup;
use xpense::core::log::init_logging;
use xpense::core::{Currency, ExpenseCategory};
use xpense::store::settings::Theme;
use xpense::{AppCommand, ExpenseEdit, ListOptions, NewExpense, SettingsCommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Record an expense, amount in the display currency
    Add {
        #[arg(short, long)]
        amount: f64,
        /// One of: food, transportation, utilities, entertainment, shopping,
        /// healthcare, education, housing, other
        #[arg(short = 'k', long)]
        category: ExpenseCategory,
        /// Date as YYYY-MM-DD, defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
        #[arg(short = 'm', long)]
        description: Option<String>,
    },
    /// Change fields of an existing expense
    Edit {
        id: Uuid,
        #[arg(short, long)]
        amount: Option<f64>,
        #[arg(short = 'k', long)]
        category: Option<ExpenseCategory>,
        #[arg(short, long)]
        date: Option<NaiveDate>,
        #[arg(short = 'm', long)]
        description: Option<String>,
    },
    /// Delete an expense
    Delete { id: Uuid },
    /// List expenses, newest first
    List {
        #[arg(short = 'k', long)]
        category: Option<ExpenseCategory>,
        /// Earliest date, inclusive
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest date, inclusive
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Show this month's spending and budget progress
    Dashboard,
    /// Display exchange rates
    Rates {
        /// Keep refreshing on the configured interval
        #[arg(short, long)]
        watch: bool,
    },
    /// Show or change user settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
    /// Export all expenses to a JSON file
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all expenses with the contents of a JSON export
    Import { path: PathBuf },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Print current settings
    Show,
    /// Set the display currency (NGN, USD, EUR, GBP)
    Currency { code: Currency },
    /// Set the monthly budget in NGN, 0 disables tracking
    Budget { amount: f64 },
    /// Set the theme (light, dark, system)
    Theme { theme: Theme },
    /// Show or hide the daily trend chart on the dashboard
    TrendChart { state: Toggle },
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl From<SettingsCommands> for SettingsCommand {
    fn from(cmd: SettingsCommands) -> SettingsCommand {
        match cmd {
            SettingsCommands::Show => SettingsCommand::Show,
            SettingsCommands::Currency { code } => SettingsCommand::Currency(code),
            SettingsCommands::Budget { amount } => SettingsCommand::Budget(amount),
            SettingsCommands::Theme { theme } => SettingsCommand::Theme(theme),
            SettingsCommands::TrendChart { state } => {
                SettingsCommand::TrendChart(matches!(state, Toggle::On))
            }
        }
    }
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Add {
                amount,
                category,
                date,
                description,
            } => AppCommand::Add(NewExpense {
                amount,
                category,
                date,
                description,
            }),
            Commands::Edit {
                id,
                amount,
                category,
                date,
                description,
            } => AppCommand::Edit(ExpenseEdit {
                id,
                amount,
                category,
                date,
                description,
            }),
            Commands::Delete { id } => AppCommand::Delete(id),
            Commands::List { category, from, to } => {
                AppCommand::List(ListOptions { category, from, to })
            }
            Commands::Dashboard => AppCommand::Dashboard,
            Commands::Rates { watch } => AppCommand::Rates { watch },
            Commands::Settings { command } => {
                AppCommand::Settings(command.map_or(SettingsCommand::Show, Into::into))
            }
            Commands::Export { output } => AppCommand::Export { output },
            Commands::Import { path } => AppCommand::Import { path },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => xpense::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
