use crate::core::budget::MonthlyBudget;
use crate::core::cache::{KeyValueCollection, get_json, put_json};
use crate::core::currency::Currency;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

const SETTINGS_KEY: &str = "user_settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Theme::Light => "light",
                Theme::Dark => "dark",
                Theme::System => "system",
            }
        )
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err(anyhow::anyhow!("Invalid theme: {}", s)),
        }
    }
}

fn default_show_trend_chart() -> bool {
    true
}

/// User preferences that are changed from within the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default = "default_currency")]
    pub currency: Currency,
    #[serde(default)]
    pub monthly_budget: MonthlyBudget,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_show_trend_chart")]
    pub show_trend_chart: bool,
}

fn default_currency() -> Currency {
    Currency::BASE
}

impl Default for UserSettings {
    fn default() -> Self {
        UserSettings {
            currency: Currency::BASE,
            monthly_budget: MonthlyBudget::DISABLED,
            theme: Theme::System,
            show_trend_chart: true,
        }
    }
}

pub struct SettingsStore {
    collection: Arc<dyn KeyValueCollection>,
}

impl SettingsStore {
    pub fn new(collection: Arc<dyn KeyValueCollection>) -> Self {
        SettingsStore { collection }
    }

    /// Stored settings, or defaults when none are saved or they are corrupt.
    pub async fn load(&self) -> UserSettings {
        match get_json::<UserSettings>(self.collection.as_ref(), SETTINGS_KEY).await {
            Some(Ok(settings)) => settings,
            Some(Err(e)) => {
                warn!(error = %e, "Stored settings are corrupt, using defaults");
                UserSettings::default()
            }
            None => UserSettings::default(),
        }
    }

    pub async fn save(&self, settings: &UserSettings) -> Result<()> {
        put_json(self.collection.as_ref(), SETTINGS_KEY, settings)
            .await
            .context("Failed to save settings")?;
        info!(?settings, "Settings saved");
        Ok(())
    }

    /// Loads, applies `change` and saves in one step.
    pub async fn update<F>(&self, change: F) -> Result<UserSettings>
    where
        F: FnOnce(&mut UserSettings),
    {
        let mut settings = self.load().await;
        change(&mut settings);
        self.save(&settings).await?;
        Ok(settings)
    }
}
