use chrono::{DateTime, Local, TimeZone, Utc};
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing::info;
use xpense::core::clock::{Clock, SystemClock};
use xpense::core::config::AppConfig;
use xpense::core::currency::{Currency, ExchangeRateTable, RateProvider};
use xpense::core::{
    ExpenseCategory, ExpenseFilter, MonthlyBudget, Notification, NotificationSink, Severity,
};
use xpense::{App, AppCommand, ExpenseEdit, ListOptions, NewExpense, SettingsCommand};

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const RATES_RESPONSE: &str = r#"{
        "base": "NGN",
        "date": "2024-03-05",
        "rates": {"NGN": 1, "USD": 0.0005, "EUR": 0.0004, "GBP": 0.00025}
    }"#;

    /// Serves `template` for the latest-rates path, expecting `calls` hits.
    pub async fn create_rates_mock_server(template: ResponseTemplate, calls: u64) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/NGN"))
            .respond_with(template)
            .expect(calls)
            .mount(&mock_server)
            .await;
        mock_server
    }

    pub fn config_yaml(base_url: &str, data_path: &std::path::Path) -> String {
        format!(
            r#"
        providers:
          exchange_rate:
            base_url: "{}"
        rates:
          fetch_timeout_secs: 5
        data_path: "{}"
    "#,
            base_url,
            data_path.display()
        )
    }
}

fn config_for(base_url: &str, data_dir: &TempDir) -> AppConfig {
    let yaml = test_utils::config_yaml(base_url, data_dir.path());
    serde_yaml::from_str(&yaml).expect("Failed to parse config")
}

fn app_for(base_url: &str, data_dir: &TempDir) -> App {
    App::from_config(config_for(base_url, data_dir)).expect("Failed to build app")
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
struct RecordingSink {
    received: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    fn severities(&self) -> Vec<Severity> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.severity)
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: &Notification) {
        self.received.lock().unwrap().push(notification.clone());
    }
}

fn add_in_base(amount: f64) -> AppCommand {
    AppCommand::Add(NewExpense {
        amount,
        category: ExpenseCategory::Food,
        date: None,
        description: None,
    })
}

async fn all_expenses(app: &App) -> Vec<xpense::core::Expense> {
    app.expenses
        .list(&ExpenseFilter::default())
        .await
        .expect("Failed to list expenses")
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_in_foreign_currency() {
    let mock_server = test_utils::create_rates_mock_server(
        wiremock::ResponseTemplate::new(200).set_body_string(test_utils::RATES_RESPONSE),
        1,
    )
    .await;
    let data_dir = TempDir::new().unwrap();
    let app = app_for(&mock_server.uri(), &data_dir);

    app.run(AppCommand::Settings(SettingsCommand::Currency(Currency::Usd)))
        .await
        .unwrap();

    // 10 USD at 2000 NGN per dollar
    app.run(AppCommand::Add(NewExpense {
        amount: 10.0,
        category: ExpenseCategory::Food,
        date: None,
        description: Some("Lunch".to_string()),
    }))
    .await
    .unwrap();

    let expenses = all_expenses(&app).await;
    assert_eq!(expenses.len(), 1);
    assert!((expenses[0].amount - 20000.0).abs() < 1e-6);
    assert_eq!(expenses[0].expense_date, app.today());
    let id = expenses[0].id;

    app.run(AppCommand::Edit(ExpenseEdit {
        id,
        amount: Some(5.0),
        category: Some(ExpenseCategory::Shopping),
        date: None,
        description: None,
    }))
    .await
    .unwrap();
    let edited = app.expenses.get(id).await.unwrap();
    assert!((edited.amount - 10000.0).abs() < 1e-6);
    assert_eq!(edited.category, ExpenseCategory::Shopping);
    assert_eq!(edited.description.as_deref(), Some("Lunch"));

    app.run(AppCommand::List(ListOptions::default())).await.unwrap();

    // Budget is entered in NGN; 10,000 of 12,000 puts it in warning
    app.run(AppCommand::Settings(SettingsCommand::Budget(12000.0)))
        .await
        .unwrap();
    assert_eq!(
        app.settings.load().await.monthly_budget,
        MonthlyBudget::new(12000.0).unwrap()
    );
    app.run(AppCommand::Dashboard).await.unwrap();

    let backup = data_dir.path().join("backup.json");
    app.run(AppCommand::Export {
        output: Some(backup.clone()),
    })
    .await
    .unwrap();
    assert!(fs::read_to_string(&backup).unwrap().contains(&id.to_string()));

    app.run(AppCommand::Delete(id)).await.unwrap();
    assert!(all_expenses(&app).await.is_empty());

    app.run(AppCommand::Import { path: backup }).await.unwrap();
    let restored = all_expenses(&app).await;
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0], edited);

    info!("Rates were fetched once and served from cache afterwards");
}

#[test_log::test(tokio::test)]
async fn test_run_command_with_config_file() {
    let mock_server = test_utils::create_rates_mock_server(
        wiremock::ResponseTemplate::new(200).set_body_string(test_utils::RATES_RESPONSE),
        1,
    )
    .await;
    let data_dir = TempDir::new().unwrap();

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    fs::write(
        config_path,
        test_utils::config_yaml(&mock_server.uri(), data_dir.path()),
    )
    .expect("Failed to write config file");

    let result = xpense::run_command(
        AppCommand::Rates { watch: false },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Main function failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_rates_fall_back_to_defaults_when_provider_fails() {
    let mock_server =
        test_utils::create_rates_mock_server(wiremock::ResponseTemplate::new(500), 2).await;
    let data_dir = TempDir::new().unwrap();
    let app = app_for(&mock_server.uri(), &data_dir);

    assert_eq!(app.rates.get_rates().await, ExchangeRateTable::defaults());
    assert!(app.rates.last_fetched().await.is_none());

    // Nothing was cached, so the next command tries the network again
    app.run(AppCommand::Rates { watch: false }).await.unwrap();
}

#[test_log::test(tokio::test)]
async fn test_base_currency_never_fetches_rates() {
    let mock_server = test_utils::create_rates_mock_server(
        wiremock::ResponseTemplate::new(200).set_body_string(test_utils::RATES_RESPONSE),
        0,
    )
    .await;
    let data_dir = TempDir::new().unwrap();
    let app = app_for(&mock_server.uri(), &data_dir);

    app.run(AppCommand::Add(NewExpense {
        amount: 2500.0,
        category: ExpenseCategory::Transportation,
        date: Some("2024-03-05".parse().unwrap()),
        description: None,
    }))
    .await
    .unwrap();
    app.run(AppCommand::List(ListOptions {
        category: Some(ExpenseCategory::Transportation),
        ..Default::default()
    }))
    .await
    .unwrap();

    let expenses = all_expenses(&app).await;
    assert_eq!(expenses[0].amount, 2500.0);
}

#[test_log::test(tokio::test)]
async fn test_export_and_import_errors() {
    let data_dir = TempDir::new().unwrap();
    let app = app_for("http://127.0.0.1:1", &data_dir);

    let err = app
        .run(AppCommand::Export {
            output: Some(data_dir.path().join("empty.json")),
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No data to export"));

    app.run(AppCommand::Add(NewExpense {
        amount: 100.0,
        category: ExpenseCategory::Other,
        date: None,
        description: None,
    }))
    .await
    .unwrap();

    let bad = data_dir.path().join("bad.json");
    fs::write(&bad, r#"{"not": "an array"}"#).unwrap();
    let err = app
        .run(AppCommand::Import { path: bad })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid file format"));
    assert_eq!(all_expenses(&app).await.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_today_is_the_local_calendar_day() {
    let data_dir = TempDir::new().unwrap();
    // Late on the last day of the month in UTC; already April east of it
    let instant = Utc.with_ymd_and_hms(2024, 3, 31, 23, 30, 0).unwrap();
    let app = App::new(
        config_for("http://127.0.0.1:1", &data_dir),
        Arc::new(FixedClock(instant)),
        Arc::new(RecordingSink::default()),
    )
    .unwrap();

    let local_day = instant.with_timezone(&Local).date_naive();
    assert_eq!(app.today(), local_day);

    app.run(add_in_base(100.0)).await.unwrap();
    let expenses = all_expenses(&app).await;
    assert_eq!(expenses[0].expense_date, local_day);
    assert_eq!(app.month_spend().await.unwrap(), 100.0);
}

#[test_log::test(tokio::test)]
async fn test_budget_alerts_follow_expense_and_budget_changes() {
    let data_dir = TempDir::new().unwrap();
    let sink = Arc::new(RecordingSink::default());
    let app = App::new(
        config_for("http://127.0.0.1:1", &data_dir),
        Arc::new(SystemClock),
        sink.clone(),
    )
    .unwrap();

    app.run(AppCommand::Settings(SettingsCommand::Budget(1000.0)))
        .await
        .unwrap();
    assert!(sink.severities().is_empty());

    // 90% of the budget
    app.run(add_in_base(900.0)).await.unwrap();
    assert_eq!(sink.severities(), vec![Severity::Warning]);

    // Still in warning: nothing new
    app.run(add_in_base(50.0)).await.unwrap();
    assert_eq!(sink.severities(), vec![Severity::Warning]);

    app.run(add_in_base(200.0)).await.unwrap();
    assert_eq!(sink.severities(), vec![Severity::Warning, Severity::Error]);
    let overage = sink.received.lock().unwrap()[1].body.clone();
    assert!(overage.contains("₦150.00"), "{overage}");

    // Raising the budget back to safe is silent, and so is the dashboard
    app.run(AppCommand::Settings(SettingsCommand::Budget(10000.0)))
        .await
        .unwrap();
    app.run(AppCommand::Dashboard).await.unwrap();
    assert_eq!(sink.severities().len(), 2);

    // Lowering it below current spending alerts immediately
    app.run(AppCommand::Settings(SettingsCommand::Budget(1000.0)))
        .await
        .unwrap();
    assert_eq!(
        sink.severities(),
        vec![Severity::Warning, Severity::Error, Severity::Error]
    );

    // Deleting the largest expense brings spending back to safe, silently
    let largest = all_expenses(&app)
        .await
        .into_iter()
        .find(|e| e.amount == 900.0)
        .unwrap();
    app.run(AppCommand::Delete(largest.id)).await.unwrap();
    assert_eq!(sink.severities().len(), 3);
    assert!(app.check_budget().await.unwrap().is_none());
}
