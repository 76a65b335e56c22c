use super::ui;
use crate::App;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

fn default_backup_name(today: chrono::NaiveDate) -> PathBuf {
    PathBuf::from(format!("expenses_backup_{}.json", today.format("%Y-%m-%d")))
}

/// Writes every expense to `output`, or a dated backup file in the current
/// directory.
pub async fn export(app: &App, output: Option<PathBuf>) -> Result<()> {
    let json = app.expenses.export_json().await?;
    let path = output.unwrap_or_else(|| default_backup_name(app.today()));

    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    println!(
        "{} {}",
        ui::style_text("Data exported to", ui::StyleType::TotalLabel),
        path.display()
    );
    Ok(())
}

/// Replaces all stored expenses with the contents of a backup file.
pub async fn import(app: &App, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let count = app
        .track_budget(app.expenses.import_json(&content))
        .await?;
    println!(
        "{} {} expenses from {}",
        ui::style_text("Imported", ui::StyleType::TotalLabel),
        ui::style_text(&count.to_string(), ui::StyleType::TotalValue),
        path.display()
    );
    Ok(())
}
