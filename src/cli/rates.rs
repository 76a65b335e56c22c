use super::ui;
use crate::App;
use crate::core::converter::format_amount;
use crate::core::currency::{Currency, ExchangeRateTable, RateProvider};
use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use comfy_table::Cell;
use tracing::info;

/// Renders the rate table with one row per currency, base first.
pub fn rates_table(rates: &ExchangeRateTable) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Name"),
        ui::header_cell(&format!("1 unit in {}", Currency::BASE)),
        ui::header_cell(&format!("{} 1000 buys", Currency::BASE.symbol())),
    ]);

    for (currency, rate) in rates.iter() {
        let name = if currency.is_base() {
            format!("{} (base)", currency.name())
        } else {
            currency.name().to_string()
        };
        table.add_row(vec![
            Cell::new(format!("{} ({})", currency.code(), currency.symbol())),
            Cell::new(name),
            ui::amount_cell(format_amount(rate.get(), Currency::BASE)),
            ui::amount_cell(format_amount(1000.0 / rate.get(), currency)),
        ]);
    }
    table.to_string()
}

fn fetched_line(last_fetched: Option<DateTime<Utc>>) -> String {
    match last_fetched {
        Some(at) => format!(
            "Last updated: {}",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        None => "Using built-in default rates".to_string(),
    }
}

async fn show(app: &App) {
    let spinner = ui::new_spinner("Fetching exchange rates...");
    let rates = app.rates.get_rates().await;
    spinner.finish_and_clear();

    println!("{}", ui::style_text("Exchange Rates", ui::StyleType::Title));
    println!("{}", rates_table(&rates));
    println!(
        "{}",
        ui::style_text(
            &fetched_line(app.rates.last_fetched().await),
            ui::StyleType::Subtle
        )
    );
}

/// Shows current rates, optionally refreshing them until interrupted.
pub async fn run(app: &App, watch: bool) -> Result<()> {
    if !watch {
        show(app).await;
        return Ok(());
    }

    let period = app.config.rates.refresh_interval();
    info!(?period, "Watching exchange rates");
    let mut interval = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                show(app).await;
                ui::print_separator();
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopped watching exchange rates");
                return Ok(());
            }
        }
    }
}
