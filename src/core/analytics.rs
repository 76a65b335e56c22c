//! Provides aggregate calculations over a period's expenses.
//!
//! Inputs are assumed to be filtered to the period already and denominated in
//! base currency.
use crate::core::expense::{Expense, ExpenseCategory};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

/// Total spent in one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: f64,
}

/// Total spent on one day of a month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyTotal {
    pub day: u32,
    pub total: f64,
}

/// Headline figures for a set of expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingSummary {
    pub total: f64,
    pub count: usize,
    pub average: f64,
    pub breakdown: Vec<CategoryTotal>,
}

impl SpendingSummary {
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        SpendingSummary {
            total: total(expenses),
            count: expenses.len(),
            average: average(expenses),
            breakdown: category_breakdown(expenses),
        }
    }

    pub fn categories_used(&self) -> usize {
        self.breakdown.len()
    }

    /// Share of the total, in percent, for a category total.
    pub fn share_of(&self, category_total: f64) -> f64 {
        if self.total == 0.0 {
            return 0.0;
        }
        category_total / self.total * 100.0
    }
}

pub fn total(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

pub fn average(expenses: &[Expense]) -> f64 {
    if expenses.is_empty() {
        return 0.0;
    }
    total(expenses) / expenses.len() as f64
}

/// Sums per category. Categories with no expenses are absent.
pub fn by_category(expenses: &[Expense]) -> HashMap<ExpenseCategory, f64> {
    let mut totals = HashMap::new();
    for expense in expenses {
        *totals.entry(expense.category).or_insert(0.0) += expense.amount;
    }
    totals
}

/// Category totals sorted by amount, largest first. Equal totals keep the
/// order in which their categories first appear in `expenses`.
pub fn category_breakdown(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut breakdown: Vec<CategoryTotal> = Vec::new();
    for expense in expenses {
        match breakdown.iter_mut().find(|c| c.category == expense.category) {
            Some(entry) => entry.total += expense.amount,
            None => breakdown.push(CategoryTotal {
                category: expense.category,
                total: expense.amount,
            }),
        }
    }
    // sort_by is stable
    breakdown.sort_by(|a, b| b.total.total_cmp(&a.total));
    breakdown
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).unwrap_or(date);
    let end = days_in_month(date.year(), date.month())
        .and_then(|days| date.with_day(days))
        .unwrap_or(date);
    (start, end)
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    first_of_next.pred_opt().map(|d| d.day())
}

/// Per-day totals for the month containing `today`, from day 1 through
/// `today`. Days without spending are zero. Expenses dated outside that month
/// are ignored.
pub fn daily_trend(expenses: &[Expense], today: NaiveDate) -> Vec<DailyTotal> {
    trend_through(expenses, today.year(), today.month(), today.day())
}

/// Per-day totals for a whole month, for periods that have already ended.
pub fn daily_trend_for_month(expenses: &[Expense], year: i32, month: u32) -> Vec<DailyTotal> {
    let last_day = days_in_month(year, month).unwrap_or(0);
    trend_through(expenses, year, month, last_day)
}

fn trend_through(expenses: &[Expense], year: i32, month: u32, through_day: u32) -> Vec<DailyTotal> {
    let mut daily: Vec<DailyTotal> = (1..=through_day)
        .map(|day| DailyTotal { day, total: 0.0 })
        .collect();

    for expense in expenses {
        let date = expense.expense_date;
        if date.year() != year || date.month() != month {
            continue;
        }
        if let Some(slot) = daily.get_mut(date.day() as usize - 1) {
            slot.total += expense.amount;
        }
    }
    daily
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn expense(category: ExpenseCategory, amount: f64, date: &str) -> Expense {
        let now = Utc::now();
        Expense {
            id: Uuid::new_v4(),
            amount,
            category,
            description: None,
            expense_date: date.parse().unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_summary_of_mixed_categories() {
        let expenses = vec![
            expense(ExpenseCategory::Food, 100.0, "2024-03-01"),
            expense(ExpenseCategory::Food, 50.0, "2024-03-02"),
            expense(ExpenseCategory::Transportation, 30.0, "2024-03-02"),
        ];

        let summary = SpendingSummary::from_expenses(&expenses);
        assert_eq!(summary.total, 180.0);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, 60.0);
        assert_eq!(
            summary.breakdown,
            vec![
                CategoryTotal {
                    category: ExpenseCategory::Food,
                    total: 150.0
                },
                CategoryTotal {
                    category: ExpenseCategory::Transportation,
                    total: 30.0
                },
            ]
        );
        assert_eq!(summary.categories_used(), 2);
    }

    #[test]
    fn test_empty_input() {
        let summary = SpendingSummary::from_expenses(&[]);
        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.average, 0.0);
        assert!(summary.breakdown.is_empty());
        assert_eq!(summary.share_of(10.0), 0.0);
    }

    #[test]
    fn test_by_category_omits_unused() {
        let expenses = vec![expense(ExpenseCategory::Housing, 500.0, "2024-03-01")];
        let totals = by_category(&expenses);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[&ExpenseCategory::Housing], 500.0);
        assert!(!totals.contains_key(&ExpenseCategory::Food));
    }

    #[test]
    fn test_breakdown_ties_keep_first_seen_order() {
        let expenses = vec![
            expense(ExpenseCategory::Shopping, 20.0, "2024-03-01"),
            expense(ExpenseCategory::Education, 40.0, "2024-03-01"),
            expense(ExpenseCategory::Food, 20.0, "2024-03-01"),
            expense(ExpenseCategory::Utilities, 20.0, "2024-03-01"),
        ];
        let order: Vec<_> = category_breakdown(&expenses)
            .into_iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(
            order,
            vec![
                ExpenseCategory::Education,
                ExpenseCategory::Shopping,
                ExpenseCategory::Food,
                ExpenseCategory::Utilities,
            ]
        );
    }

    #[test]
    fn test_month_bounds() {
        let (start, end) = month_bounds("2024-02-15".parse().unwrap());
        assert_eq!(start, "2024-02-01".parse::<NaiveDate>().unwrap());
        assert_eq!(end, "2024-02-29".parse::<NaiveDate>().unwrap());

        let (start, end) = month_bounds("2023-12-31".parse().unwrap());
        assert_eq!(start, "2023-12-01".parse::<NaiveDate>().unwrap());
        assert_eq!(end, "2023-12-31".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn test_daily_trend_through_today() {
        let expenses = vec![
            expense(ExpenseCategory::Food, 10.0, "2024-03-01"),
            expense(ExpenseCategory::Food, 5.0, "2024-03-03"),
            expense(ExpenseCategory::Other, 7.0, "2024-03-03"),
            expense(ExpenseCategory::Other, 99.0, "2024-02-03"),
            expense(ExpenseCategory::Other, 99.0, "2024-03-20"),
        ];
        let trend = daily_trend(&expenses, "2024-03-04".parse().unwrap());
        assert_eq!(trend.len(), 4);
        assert_eq!(trend[0], DailyTotal { day: 1, total: 10.0 });
        assert_eq!(trend[1], DailyTotal { day: 2, total: 0.0 });
        assert_eq!(trend[2], DailyTotal { day: 3, total: 12.0 });
        assert_eq!(trend[3], DailyTotal { day: 4, total: 0.0 });
    }

    #[test]
    fn test_daily_trend_for_past_month() {
        let expenses = vec![expense(ExpenseCategory::Food, 10.0, "2023-04-30")];
        let trend = daily_trend_for_month(&expenses, 2023, 4);
        assert_eq!(trend.len(), 30);
        assert_eq!(trend[29].total, 10.0);
    }
}
