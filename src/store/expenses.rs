//! Expense persistence on top of a key-value collection.
//!
//! Each expense is stored as one JSON document keyed by its id.

use crate::core::cache::{KeyValueCollection, get_json, put_json};
use crate::core::clock::Clock;
use crate::core::expense::{Expense, ExpenseDraft, ExpenseFilter, ExpensePatch};
use anyhow::{Context, Result, anyhow, bail};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct ExpenseRepository {
    collection: Arc<dyn KeyValueCollection>,
    clock: Arc<dyn Clock>,
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        bail!("Amount must be greater than 0, got {}", amount);
    }
    Ok(())
}

impl ExpenseRepository {
    pub fn new(collection: Arc<dyn KeyValueCollection>, clock: Arc<dyn Clock>) -> Self {
        ExpenseRepository { collection, clock }
    }

    pub async fn add(&self, draft: ExpenseDraft) -> Result<Expense> {
        validate_amount(draft.amount)?;
        let now = self.clock.now();
        let expense = Expense {
            id: Uuid::new_v4(),
            amount: draft.amount,
            category: draft.category,
            description: draft.description.filter(|d| !d.trim().is_empty()),
            expense_date: draft.expense_date,
            created_at: now,
            updated_at: now,
        };
        self.write(&expense).await?;
        info!(id = %expense.id, "Expense added");
        Ok(expense)
    }

    pub async fn get(&self, id: Uuid) -> Result<Expense> {
        match get_json::<Expense>(self.collection.as_ref(), &id.to_string()).await {
            Some(parsed) => parsed.with_context(|| format!("Failed to parse expense {id}")),
            None => Err(anyhow!("Expense not found: {}", id)),
        }
    }

    pub async fn update(&self, id: Uuid, patch: ExpensePatch) -> Result<Expense> {
        let mut expense = self.get(id).await?;
        if let Some(amount) = patch.amount {
            validate_amount(amount)?;
            expense.amount = amount;
        }
        if let Some(category) = patch.category {
            expense.category = category;
        }
        if let Some(description) = patch.description {
            expense.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(date) = patch.expense_date {
            expense.expense_date = date;
        }
        expense.updated_at = self.clock.now();

        self.write(&expense).await?;
        info!(id = %expense.id, "Expense updated");
        Ok(expense)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let key = id.to_string();
        if !self.collection.has(&key).await {
            bail!("Expense not found: {}", id);
        }
        self.collection.remove(&key).await?;
        info!(id = %id, "Expense deleted");
        Ok(())
    }

    /// Expenses matching `filter`, newest `expense_date` first.
    pub async fn list(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let mut expenses: Vec<Expense> = self
            .all()
            .await?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        expenses.sort_by(|a, b| b.expense_date.cmp(&a.expense_date));
        Ok(expenses)
    }

    async fn all(&self) -> Result<Vec<Expense>> {
        let mut expenses = Vec::new();
        for key in self.collection.keys().await? {
            match get_json::<Expense>(self.collection.as_ref(), &key).await {
                Some(Ok(expense)) => expenses.push(expense),
                Some(Err(e)) => warn!(key = %key, error = %e, "Skipping unreadable expense"),
                None => debug!(key = %key, "Expense vanished while listing"),
            }
        }
        Ok(expenses)
    }

    /// Every expense as a pretty-printed JSON array.
    pub async fn export_json(&self) -> Result<String> {
        let expenses = self.list(&ExpenseFilter::default()).await?;
        if expenses.is_empty() {
            bail!("No data to export");
        }
        Ok(serde_json::to_string_pretty(&expenses)?)
    }

    /// Replaces all stored expenses with the contents of a JSON array.
    /// Nothing is changed if the input is not a valid array of expenses.
    pub async fn import_json(&self, content: &str) -> Result<usize> {
        let value: serde_json::Value =
            serde_json::from_str(content).context("Failed to parse file")?;
        if !value.is_array() {
            bail!("Invalid file format: expected a JSON array of expenses");
        }
        let imported: Vec<Expense> =
            serde_json::from_value(value).context("Invalid file format")?;
        let mut ids = HashSet::with_capacity(imported.len());
        for expense in &imported {
            validate_amount(expense.amount)
                .with_context(|| format!("Invalid expense {}", expense.id))?;
            if !ids.insert(expense.id.to_string()) {
                bail!("Invalid file format: duplicate expense id {}", expense.id);
            }
        }

        // Stale keys go only after every record is written
        for expense in &imported {
            self.write(expense).await?;
        }
        for key in self.collection.keys().await? {
            if !ids.contains(&key) {
                self.collection.remove(&key).await?;
            }
        }
        info!(count = ids.len(), "Expenses imported");
        Ok(ids.len())
    }

    async fn write(&self, expense: &Expense) -> Result<()> {
        put_json(self.collection.as_ref(), &expense.id.to_string(), expense)
            .await
            .with_context(|| format!("Failed to save expense {}", expense.id))
    }
}
