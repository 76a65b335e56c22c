pub mod caching;
pub mod exchange_rate_api;

pub use caching::CachedRateProvider;
pub use exchange_rate_api::ExchangeRateApiProvider;
