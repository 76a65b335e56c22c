pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::Currency;
use crate::core::analytics;
use crate::core::budget::MonthlyBudget;
use crate::core::cache::Store;
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::AppConfig;
use crate::core::converter::CurrencyConverter;
use crate::core::currency::{ExchangeRateTable, RateProvider};
use crate::core::expense::{ExpenseCategory, ExpenseFilter};
use crate::core::notifier::{BudgetNotifier, Notification, NotificationSink};
use crate::providers::{CachedRateProvider, ExchangeRateApiProvider, caching::RATES_COLLECTION};
use crate::store::KeyValueStore;
use crate::store::expenses::ExpenseRepository;
use crate::store::settings::{SettingsStore, Theme};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

/// A new expense as typed by the user; `amount` is in the display currency.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: f64,
    pub category: ExpenseCategory,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// Changes to an existing expense; `amount` is in the display currency.
#[derive(Debug, Clone)]
pub struct ExpenseEdit {
    pub id: Uuid,
    pub amount: Option<f64>,
    pub category: Option<ExpenseCategory>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub category: Option<ExpenseCategory>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub enum SettingsCommand {
    Show,
    Currency(Currency),
    Budget(f64),
    Theme(Theme),
    TrendChart(bool),
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Add(NewExpense),
    Edit(ExpenseEdit),
    Delete(Uuid),
    List(ListOptions),
    Dashboard,
    Rates { watch: bool },
    Settings(SettingsCommand),
    Export { output: Option<PathBuf> },
    Import { path: PathBuf },
}

/// Everything a command needs, wired from one configuration.
pub struct App {
    pub config: AppConfig,
    pub expenses: ExpenseRepository,
    pub settings: SettingsStore,
    pub rates: CachedRateProvider<ExchangeRateApiProvider>,
    pub clock: Arc<dyn Clock>,
    notifier: Mutex<BudgetNotifier<Arc<dyn NotificationSink + Send + Sync>>>,
    // Keeps the keyspace open for the collections above
    _store: KeyValueStore,
}

impl App {
    /// Wires the app with the system clock and budget alerts on the console.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        App::new(config, Arc::new(SystemClock), Arc::new(cli::ui::ConsoleSink))
    }

    pub fn new(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink + Send + Sync>,
    ) -> Result<Self> {
        let data_path = config.default_data_path()?;
        let store = KeyValueStore::open(&data_path)?;

        let open = |name: &str| {
            store
                .get_collection(name, true, true)
                .with_context(|| format!("Failed to open {name} collection"))
        };

        let source = ExchangeRateApiProvider::new(
            &config.providers.exchange_rate.base_url,
            config.rates.fetch_timeout(),
        );
        let rates = CachedRateProvider::new(
            source,
            open(RATES_COLLECTION)?,
            Arc::clone(&clock),
            config.rates.cache_duration(),
        );
        let expenses = ExpenseRepository::new(open("expenses")?, Arc::clone(&clock));
        let settings = SettingsStore::new(open("settings")?);

        Ok(App {
            config,
            expenses,
            settings,
            rates,
            clock,
            notifier: Mutex::new(BudgetNotifier::new(sink)),
            _store: store,
        })
    }

    /// The user's calendar day, in the local time zone.
    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&Local).date_naive()
    }

    /// Base-currency spending in the current month.
    pub async fn month_spend(&self) -> Result<f64> {
        let (start, end) = analytics::month_bounds(self.today());
        let expenses = self
            .expenses
            .list(&ExpenseFilter::between(start, end))
            .await?;
        Ok(analytics::total(&expenses))
    }

    /// One notifier tick for the given spend and budget.
    pub fn evaluate_budget(&self, spent: f64, budget: MonthlyBudget) -> Option<Notification> {
        self.notifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .evaluate(spent, budget)
    }

    /// One notifier tick against the stored expenses and budget.
    pub async fn check_budget(&self) -> Result<Option<Notification>> {
        let spent = self.month_spend().await?;
        let budget = self.settings.load().await.monthly_budget;
        Ok(self.evaluate_budget(spent, budget))
    }

    /// Runs a change to expenses or the budget, then alerts if it moved the
    /// month's budget status. The status before the change is recorded
    /// first, so a budget that was already in warning is not announced again.
    pub async fn track_budget<T>(&self, change: impl Future<Output = Result<T>>) -> Result<T> {
        let spent = self.month_spend().await?;
        let budget = self.settings.load().await.monthly_budget;
        self.notifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(spent, budget);

        let outcome = change.await?;
        self.check_budget().await?;
        Ok(outcome)
    }

    /// Converter for the user's display currency. Rates are only looked up
    /// when the display currency differs from base.
    pub async fn converter(&self) -> CurrencyConverter {
        let currency = self.settings.load().await.currency;
        if currency.is_base() {
            return CurrencyConverter::new(currency, ExchangeRateTable::defaults());
        }
        let spinner = cli::ui::new_spinner("Fetching exchange rates...");
        let rates = self.rates.get_rates().await;
        spinner.finish_and_clear();
        CurrencyConverter::new(currency, rates)
    }

    /// Runs one command against this app's stores.
    pub async fn run(&self, command: AppCommand) -> Result<()> {
        match command {
            AppCommand::Add(new) => cli::expenses::add(self, new).await,
            AppCommand::Edit(edit) => cli::expenses::edit(self, edit).await,
            AppCommand::Delete(id) => cli::expenses::delete(self, id).await,
            AppCommand::List(options) => cli::expenses::list(self, options).await,
            AppCommand::Dashboard => cli::dashboard::run(self).await,
            AppCommand::Rates { watch } => cli::rates::run(self, watch).await,
            AppCommand::Settings(cmd) => cli::settings::run(self, cmd).await,
            AppCommand::Export { output } => cli::data::export(self, output).await,
            AppCommand::Import { path } => cli::data::import(self, &path).await,
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Expense tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    App::from_config(config)?.run(command).await
}
