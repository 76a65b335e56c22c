//! Expense records and the filters used to select them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Food,
    Transportation,
    Utilities,
    Entertainment,
    Shopping,
    Healthcare,
    Education,
    Housing,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 9] = [
        ExpenseCategory::Food,
        ExpenseCategory::Transportation,
        ExpenseCategory::Utilities,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Shopping,
        ExpenseCategory::Healthcare,
        ExpenseCategory::Education,
        ExpenseCategory::Housing,
        ExpenseCategory::Other,
    ];

    /// Returns display label and emoji for the category
    pub fn display_info(&self) -> (&'static str, &'static str) {
        match self {
            ExpenseCategory::Food => ("Food & Dining", "🍔"),
            ExpenseCategory::Transportation => ("Transportation", "🚗"),
            ExpenseCategory::Utilities => ("Utilities", "💡"),
            ExpenseCategory::Entertainment => ("Entertainment", "🎬"),
            ExpenseCategory::Shopping => ("Shopping", "🛒"),
            ExpenseCategory::Healthcare => ("Healthcare", "🏥"),
            ExpenseCategory::Education => ("Education", "📚"),
            ExpenseCategory::Housing => ("Housing", "🏠"),
            ExpenseCategory::Other => ("Other", "📦"),
        }
    }

    pub fn label(&self) -> &'static str {
        self.display_info().0
    }

    fn key(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "food",
            ExpenseCategory::Transportation => "transportation",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Entertainment => "entertainment",
            ExpenseCategory::Shopping => "shopping",
            ExpenseCategory::Healthcare => "healthcare",
            ExpenseCategory::Education => "education",
            ExpenseCategory::Housing => "housing",
            ExpenseCategory::Other => "other",
        }
    }
}

impl Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for ExpenseCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ExpenseCategory::ALL
            .into_iter()
            .find(|c| c.key() == wanted)
            .ok_or_else(|| anyhow::anyhow!("Unknown expense category: {}", s))
    }
}

/// A recorded expense. `amount` is always in base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a new expense; `amount` must already be converted to base.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub amount: f64,
    pub category: ExpenseCategory,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
}

/// Partial update. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub category: Option<ExpenseCategory>,
    pub description: Option<String>,
    pub expense_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    pub category: Option<ExpenseCategory>,
    pub start_date: Option<NaiveDate>,
    /// Inclusive
    pub end_date: Option<NaiveDate>,
}

impl ExpenseFilter {
    pub fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        ExpenseFilter {
            category: None,
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        self.category.is_none_or(|c| expense.category == c)
            && self.start_date.is_none_or(|d| expense.expense_date >= d)
            && self.end_date.is_none_or(|d| expense.expense_date <= d)
    }
}
