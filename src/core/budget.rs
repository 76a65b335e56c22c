//! Budget limit and the pure status evaluation derived from it.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Usage ratio at which a budget enters the warning state.
pub const WARNING_THRESHOLD: f64 = 0.8;

/// Usage ratio at which a budget is exceeded.
pub const EXCEEDED_THRESHOLD: f64 = 1.0;

/// Monthly spending limit in base currency. Zero disables budget tracking.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MonthlyBudget(f64);

impl MonthlyBudget {
    pub const DISABLED: MonthlyBudget = MonthlyBudget(0.0);

    pub fn new(limit: f64) -> Result<Self> {
        if !limit.is_finite() || limit < 0.0 {
            return Err(anyhow!(
                "Budget must be a non-negative number, got {}",
                limit
            ));
        }
        Ok(MonthlyBudget(limit))
    }

    pub fn limit(&self) -> f64 {
        self.0
    }

    pub fn is_enabled(&self) -> bool {
        self.0 > 0.0
    }
}

impl TryFrom<f64> for MonthlyBudget {
    type Error = anyhow::Error;

    fn try_from(value: f64) -> Result<Self> {
        MonthlyBudget::new(value)
    }
}

impl From<MonthlyBudget> for f64 {
    fn from(budget: MonthlyBudget) -> Self {
        budget.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Safe,
    Warning,
    Exceeded,
}

impl Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                BudgetStatus::Safe => "safe",
                BudgetStatus::Warning => "warning",
                BudgetStatus::Exceeded => "exceeded",
            }
        )
    }
}

/// Share of the budget spent, as a percentage clamped to `[0, 100]`.
/// Only meant for presentation; use [`status`] for decisions.
pub fn percentage_used(total_spend: f64, budget: MonthlyBudget) -> f64 {
    if !budget.is_enabled() {
        return 0.0;
    }
    (total_spend / budget.limit() * 100.0).clamp(0.0, 100.0)
}

/// Budget status from the unclamped usage ratio.
pub fn status(total_spend: f64, budget: MonthlyBudget) -> BudgetStatus {
    if !budget.is_enabled() {
        return BudgetStatus::Safe;
    }
    let ratio = total_spend / budget.limit();
    if ratio >= EXCEEDED_THRESHOLD {
        BudgetStatus::Exceeded
    } else if ratio >= WARNING_THRESHOLD {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Safe
    }
}

/// Everything a view needs to show budget progress for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSnapshot {
    pub spent: f64,
    pub budget: MonthlyBudget,
    pub percentage_used: f64,
    pub status: BudgetStatus,
    /// Base-currency headroom left; negative once exceeded.
    pub remaining: f64,
}

impl BudgetSnapshot {
    pub fn new(spent: f64, budget: MonthlyBudget) -> Self {
        BudgetSnapshot {
            spent,
            budget,
            percentage_used: percentage_used(spent, budget),
            status: status(spent, budget),
            remaining: budget.limit() - spent,
        }
    }
}
