use super::ui;
use crate::core::converter::CurrencyConverter;
use crate::core::expense::{Expense, ExpenseDraft, ExpenseFilter, ExpensePatch};
use crate::{App, ExpenseEdit, ListOptions, NewExpense};
use anyhow::Result;
use comfy_table::Cell;
use uuid::Uuid;

/// Renders expenses as a table with amounts in the display currency.
pub fn expenses_table(expenses: &[Expense], converter: &CurrencyConverter) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Date"),
        ui::header_cell("Category"),
        ui::header_cell("Description"),
        ui::header_cell(&format!("Amount ({})", converter.currency())),
    ]);

    for expense in expenses {
        let (label, emoji) = expense.category.display_info();
        table.add_row(vec![
            Cell::new(expense.id.to_string()),
            Cell::new(expense.expense_date.format("%Y-%m-%d").to_string()),
            Cell::new(format!("{emoji} {label}")),
            Cell::new(expense.description.as_deref().unwrap_or("")),
            ui::amount_cell(converter.format(expense.amount)),
        ]);
    }
    table.to_string()
}

pub async fn add(app: &App, new: NewExpense) -> Result<()> {
    let converter = app.converter().await;
    let draft = ExpenseDraft {
        amount: converter.to_base(new.amount),
        category: new.category,
        description: new.description,
        expense_date: new.date.unwrap_or_else(|| app.today()),
    };
    let expense = app.track_budget(app.expenses.add(draft)).await?;
    println!(
        "{} {} on {} ({})",
        ui::style_text("Expense added:", ui::StyleType::TotalLabel),
        ui::style_text(&converter.format(expense.amount), ui::StyleType::TotalValue),
        expense.expense_date,
        expense.id
    );
    Ok(())
}

pub async fn edit(app: &App, edit: ExpenseEdit) -> Result<()> {
    let converter = app.converter().await;
    let before = app.expenses.get(edit.id).await?;
    let patch = ExpensePatch {
        amount: edit.amount.map(|a| converter.to_base(a)),
        category: edit.category,
        description: edit.description,
        expense_date: edit.date,
    };
    let after = app
        .track_budget(app.expenses.update(edit.id, patch))
        .await?;
    println!(
        "{} {} {} -> {} {}",
        ui::style_text("Expense updated:", ui::StyleType::TotalLabel),
        before.category,
        converter.format(before.amount),
        after.category,
        converter.format(after.amount),
    );
    Ok(())
}

pub async fn delete(app: &App, id: Uuid) -> Result<()> {
    app.track_budget(app.expenses.delete(id)).await?;
    println!("{}", ui::style_text("Expense deleted", ui::StyleType::TotalLabel));
    Ok(())
}

pub async fn list(app: &App, options: ListOptions) -> Result<()> {
    let filter = ExpenseFilter {
        category: options.category,
        start_date: options.from,
        end_date: options.to,
    };
    let expenses = app.expenses.list(&filter).await?;
    if expenses.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "No expenses match your current filters.",
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    let converter = app.converter().await;
    println!("{}", expenses_table(&expenses, &converter));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::{Currency, ExchangeRateTable};
    use crate::core::expense::ExpenseCategory;
    use chrono::Utc;

    #[test]
    fn test_expenses_table_uses_display_currency() {
        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4(),
            amount: 3000.0,
            category: ExpenseCategory::Food,
            description: Some("Groceries".to_string()),
            expense_date: "2024-03-05".parse().unwrap(),
            created_at: now,
            updated_at: now,
        };
        let converter = CurrencyConverter::new(Currency::Usd, ExchangeRateTable::defaults());

        let rendered = expenses_table(&[expense], &converter);
        assert!(rendered.contains("Amount (USD)"));
        assert!(rendered.contains("$2.00"));
        assert!(rendered.contains("Groceries"));
        assert!(rendered.contains("Food & Dining"));
    }
}
