use super::ui;
use crate::App;
use crate::core::analytics::{self, DailyTotal, SpendingSummary};
use crate::core::budget::{BudgetSnapshot, MonthlyBudget};
use crate::core::converter::CurrencyConverter;
use crate::core::expense::{Expense, ExpenseFilter};
use anyhow::Result;
use comfy_table::Cell;

const RECENT_EXPENSES: usize = 5;
const BAR_WIDTH: usize = 30;

/// Current-month view of spending.
pub struct Dashboard {
    pub summary: SpendingSummary,
    pub budget: Option<BudgetSnapshot>,
    pub trend: Option<Vec<DailyTotal>>,
    pub recent: Vec<Expense>,
}

impl Dashboard {
    /// `expenses` must already be limited to the current month.
    pub fn build(
        expenses: &[Expense],
        budget: MonthlyBudget,
        show_trend: bool,
        today: chrono::NaiveDate,
    ) -> Self {
        let summary = SpendingSummary::from_expenses(expenses);
        let budget = budget
            .is_enabled()
            .then(|| BudgetSnapshot::new(summary.total, budget));
        let trend = show_trend.then(|| analytics::daily_trend(expenses, today));
        let mut recent = expenses.to_vec();
        recent.sort_by(|a, b| {
            b.expense_date
                .cmp(&a.expense_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        recent.truncate(RECENT_EXPENSES);

        Dashboard {
            summary,
            budget,
            trend,
            recent,
        }
    }

    pub fn display(&self, converter: &CurrencyConverter) -> String {
        let mut output = format!(
            "{}\n\n",
            ui::style_text("Dashboard", ui::StyleType::Title)
        );

        if let Some(budget) = &self.budget {
            let mut goal = ui::new_styled_table();
            goal.set_header(vec![
                ui::header_cell("Monthly Budget Goal"),
                ui::header_cell("Spent"),
                ui::header_cell("Remaining"),
                ui::header_cell("Used"),
                ui::header_cell("Status"),
            ]);
            goal.add_row(vec![
                ui::amount_cell(converter.format(budget.budget.limit())),
                ui::amount_cell(converter.format(budget.spent)),
                ui::amount_cell(converter.format(budget.remaining)),
                ui::amount_cell(format!("{:.1}%", budget.percentage_used)),
                ui::status_cell(budget.status),
            ]);
            output.push_str(&goal.to_string());
            output.push_str(&format!(
                "\n{}\n\n",
                ui::percentage_bar(budget.percentage_used, BAR_WIDTH)
            ));
        }

        let mut stats = ui::new_styled_table();
        stats.set_header(vec![
            ui::header_cell("Total This Month"),
            ui::header_cell("Average Expense"),
            ui::header_cell("Categories Used"),
        ]);
        stats.add_row(vec![
            Cell::new(format!(
                "{}\n{} transactions",
                converter.format(self.summary.total),
                self.summary.count
            )),
            Cell::new(format!(
                "{}\nper transaction",
                converter.format(self.summary.average)
            )),
            Cell::new(self.summary.categories_used().to_string()),
        ]);
        output.push_str(&stats.to_string());

        if !self.summary.breakdown.is_empty() {
            let mut categories = ui::new_styled_table();
            categories.set_header(vec![
                ui::header_cell("Category"),
                ui::header_cell(&format!("Spent ({})", converter.currency())),
                ui::header_cell("Share (%)"),
            ]);
            for entry in &self.summary.breakdown {
                let (label, emoji) = entry.category.display_info();
                categories.add_row(vec![
                    Cell::new(format!("{emoji} {label}")),
                    ui::amount_cell(converter.format(entry.total)),
                    ui::amount_cell(format!("{:.1}%", self.summary.share_of(entry.total))),
                ]);
            }
            output.push_str("\n\n");
            output.push_str(&ui::style_text("Spending by Category", ui::StyleType::Title));
            output.push('\n');
            output.push_str(&categories.to_string());
        }

        if let Some(trend) = &self.trend {
            output.push_str("\n\n");
            output.push_str(&ui::style_text(
                "Spending Trend (Daily)",
                ui::StyleType::Title,
            ));
            output.push('\n');
            output.push_str(&trend_chart(trend, converter));
        }

        if !self.recent.is_empty() {
            output.push_str("\n\n");
            output.push_str(&ui::style_text("Recent Expenses", ui::StyleType::Title));
            output.push('\n');
            output.push_str(&super::expenses::expenses_table(&self.recent, converter));
        }

        output
    }
}

fn trend_chart(trend: &[DailyTotal], converter: &CurrencyConverter) -> String {
    let peak = trend.iter().map(|d| d.total).fold(0.0_f64, f64::max);
    trend
        .iter()
        .map(|d| {
            let share = if peak > 0.0 { d.total / peak * 100.0 } else { 0.0 };
            format!(
                "{:>2} {} {}",
                d.day,
                ui::percentage_bar(share, BAR_WIDTH),
                converter.format(d.total)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn run(app: &App) -> Result<()> {
    let today = app.today();
    let (start, end) = analytics::month_bounds(today);
    let expenses = app.expenses.list(&ExpenseFilter::between(start, end)).await?;
    let settings = app.settings.load().await;
    let converter = app.converter().await;

    let dashboard = Dashboard::build(
        &expenses,
        settings.monthly_budget,
        settings.show_trend_chart,
        today,
    );
    println!("{}", dashboard.display(&converter));

    // Notifier state lives for this process only, so a budget already in
    // warning or exceeded is announced once per run.
    app.evaluate_budget(dashboard.summary.total, settings.monthly_budget);
    Ok(())
}
