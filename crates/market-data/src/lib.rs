use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{MacroSeries, PriceSeries};

pub mod error;
pub mod fred;
pub mod live;
pub mod responses;
pub mod yahoo;

// --- Public API ---
pub use error::ProviderError;
pub use fred::FredClient;
pub use live::{with_retry, LiveProvider};
pub use yahoo::YahooClient;

/// The generic, abstract interface for a historical-series provider.
/// This trait is the contract the run orchestration uses, allowing the
/// underlying implementation (live or mock) to be swapped out.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Fetches the daily close series for one tradable instrument.
    async fn fetch_daily_prices(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ProviderError>;

    /// Fetches a monthly macro indicator series by its provider id.
    async fn fetch_macro_series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MacroSeries, ProviderError>;
}
