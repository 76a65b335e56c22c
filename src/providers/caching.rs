//! Cached exchange rates with a freshness window and a fallback chain.
//!
//! Lookup order for [`CachedRateProvider::get_rates`]:
//! 1. cached table, if fetched less than `cache_duration` ago
//! 2. live fetch from the [`RateSource`], written back to the cache
//! 3. cached table of any age
//! 4. [`ExchangeRateTable::defaults`]

use crate::core::cache::{KeyValueCollection, get_json, put_json};
use crate::core::clock::Clock;
use crate::core::currency::{ExchangeRateTable, RateProvider, RateSource};
use crate::core::error::InvalidCacheData;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const RATES_COLLECTION: &str = "rates";
const RATES_KEY: &str = "exchange_rates";
const TIMESTAMP_KEY: &str = "rates_timestamp";

pub struct CachedRateProvider<S: RateSource> {
    source: S,
    cache: Arc<dyn KeyValueCollection>,
    clock: Arc<dyn Clock>,
    cache_duration: Duration,
    // Held across check-fetch-store so overlapping callers share one fetch
    fetch_lock: Mutex<()>,
}

impl<S: RateSource> CachedRateProvider<S> {
    pub fn new(
        source: S,
        cache: Arc<dyn KeyValueCollection>,
        clock: Arc<dyn Clock>,
        cache_duration: Duration,
    ) -> Self {
        CachedRateProvider {
            source,
            cache,
            clock,
            cache_duration,
            fetch_lock: Mutex::new(()),
        }
    }

    /// When the cached table was last fetched, if known.
    pub async fn last_fetched(&self) -> Option<DateTime<Utc>> {
        let millis = self.read_timestamp().await?.ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }

    async fn read_table(&self) -> Option<Result<ExchangeRateTable, InvalidCacheData>> {
        get_json::<ExchangeRateTable>(self.cache.as_ref(), RATES_KEY)
            .await
            .map(|parsed| parsed.map_err(InvalidCacheData::from))
    }

    async fn read_timestamp(&self) -> Option<Result<i64, InvalidCacheData>> {
        let bytes = self.cache.get(TIMESTAMP_KEY).await?;
        let text = String::from_utf8_lossy(&bytes);
        Some(
            text.trim()
                .parse::<i64>()
                .map_err(|_| InvalidCacheData::Timestamp(text.to_string())),
        )
    }

    async fn is_fresh(&self) -> bool {
        let Some(Ok(fetched_at)) = self.read_timestamp().await else {
            return false;
        };
        let age_ms = self.clock.now().timestamp_millis() - fetched_at;
        // A timestamp from the future is not trusted
        age_ms >= 0 && (age_ms as u128) < self.cache_duration.as_millis()
    }

    async fn store(&self, table: &ExchangeRateTable) {
        let now = self.clock.now().timestamp_millis();
        let written = async {
            put_json(self.cache.as_ref(), RATES_KEY, table).await?;
            self.cache
                .put(TIMESTAMP_KEY, now.to_string().as_bytes())
                .await
        }
        .await;
        match written {
            Ok(()) => debug!(fetched_at = now, "Cached exchange rates"),
            Err(e) => warn!(error = %e, "Failed to cache exchange rates"),
        }
    }

    fn fallback(cached: Option<Result<ExchangeRateTable, InvalidCacheData>>) -> ExchangeRateTable {
        match cached {
            Some(Ok(table)) => {
                debug!("Using cached exchange rates regardless of age");
                table
            }
            Some(Err(e)) => {
                warn!(error = %e, "Using default exchange rates");
                ExchangeRateTable::defaults()
            }
            None => {
                debug!("No cached exchange rates, using defaults");
                ExchangeRateTable::defaults()
            }
        }
    }
}

#[async_trait]
impl<S: RateSource> RateProvider for CachedRateProvider<S> {
    async fn get_rates(&self) -> ExchangeRateTable {
        let _guard = self.fetch_lock.lock().await;

        let cached = self.read_table().await;
        if let Some(Ok(table)) = &cached {
            if self.is_fresh().await {
                debug!("Cache HIT for exchange rates");
                return table.clone();
            }
        }
        debug!("Cache MISS for exchange rates");

        match self.source.fetch_rates().await {
            Ok(table) => {
                self.store(&table).await;
                table
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to fetch live exchange rates, using cached or default rates"
                );
                Self::fallback(cached)
            }
        }
    }
}
