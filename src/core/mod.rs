//! Core business logic abstractions

pub mod analytics;
pub mod budget;
pub mod cache;
pub mod clock;
pub mod config;
pub mod converter;
pub mod currency;
pub mod error;
pub mod expense;
pub mod log;
pub mod notifier;

// Re-export main types for cleaner imports
pub use budget::{BudgetSnapshot, BudgetStatus, MonthlyBudget};
pub use converter::CurrencyConverter;
pub use currency::{Currency, ExchangeRateTable, RateProvider, RateSource};
pub use expense::{Expense, ExpenseCategory, ExpenseDraft, ExpenseFilter, ExpensePatch};
pub use notifier::{BudgetNotifier, Notification, NotificationSink, Severity};
