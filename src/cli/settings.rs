use super::ui;
use crate::core::budget::MonthlyBudget;
use crate::core::converter::format_amount;
use crate::core::currency::Currency;
use crate::store::settings::UserSettings;
use crate::{App, SettingsCommand};
use anyhow::Result;
use comfy_table::Cell;

fn settings_table(settings: &UserSettings) -> String {
    let budget = if settings.monthly_budget.is_enabled() {
        format_amount(settings.monthly_budget.limit(), Currency::BASE)
    } else {
        "not set".to_string()
    };
    let trend = if settings.show_trend_chart { "on" } else { "off" };

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Setting"), ui::header_cell("Value")]);
    table.add_row(vec![
        Cell::new("Currency"),
        Cell::new(format!(
            "{} ({} {})",
            settings.currency.code(),
            settings.currency.symbol(),
            settings.currency.name()
        )),
    ]);
    table.add_row(vec![Cell::new("Monthly budget"), Cell::new(budget)]);
    table.add_row(vec![Cell::new("Theme"), Cell::new(settings.theme.to_string())]);
    table.add_row(vec![Cell::new("Trend chart"), Cell::new(trend)]);
    table.to_string()
}

pub async fn run(app: &App, command: SettingsCommand) -> Result<()> {
    let settings = match command {
        SettingsCommand::Show => app.settings.load().await,
        SettingsCommand::Currency(currency) => {
            app.settings.update(|s| s.currency = currency).await?
        }
        SettingsCommand::Budget(amount) => {
            let budget = MonthlyBudget::new(amount)?;
            app.track_budget(app.settings.update(|s| s.monthly_budget = budget))
                .await?
        }
        SettingsCommand::Theme(theme) => app.settings.update(|s| s.theme = theme).await?,
        SettingsCommand::TrendChart(show) => {
            app.settings.update(|s| s.show_trend_chart = show).await?
        }
    };

    println!("{}", ui::style_text("Settings", ui::StyleType::Title));
    println!("{}", settings_table(&settings));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::settings::Theme;

    #[test]
    fn test_settings_table_defaults() {
        let rendered = settings_table(&UserSettings::default());
        assert!(rendered.contains("NGN (₦ Nigerian Naira)"));
        assert!(rendered.contains("not set"));
        assert!(rendered.contains("system"));
        assert!(rendered.contains("on"));
    }

    #[test]
    fn test_settings_table_with_budget() {
        let settings = UserSettings {
            currency: Currency::Eur,
            monthly_budget: MonthlyBudget::new(250000.0).unwrap(),
            theme: Theme::Dark,
            show_trend_chart: false,
        };
        let rendered = settings_table(&settings);
        assert!(rendered.contains("EUR"));
        assert!(rendered.contains("₦250,000.00"));
        assert!(rendered.contains("dark"));
        assert!(rendered.contains("off"));
    }
}
