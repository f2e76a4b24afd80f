use crate::error::ProviderError;
use crate::fred::FredClient;
use crate::yahoo::YahooClient;
use crate::SeriesProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use configuration::ProviderConfig;
use core_types::{MacroSeries, PriceSeries};
use std::future::Future;
use std::time::Duration;

/// Retries a fetch operation a bounded number of times with a fixed delay.
///
/// Only transient failures are retried; once the attempts are exhausted the
/// failure surfaces as `DataUnavailable` for the series.
pub async fn with_retry<T, F, Fut>(
    series: &str,
    max_retries: u32,
    delay: Duration,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) if attempt >= max_retries => {
                tracing::error!(series, attempts = attempt + 1, error = %e, "fetch failed permanently");
                return Err(ProviderError::DataUnavailable {
                    series: series.to_string(),
                    attempts: attempt + 1,
                });
            }
            Err(e) => {
                attempt += 1;
                tracing::warn!(series, attempt, error = %e, "fetch failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// The production `SeriesProvider`: Yahoo for daily prices, FRED for the
/// macro series, both behind the bounded retry policy.
///
/// The FRED client is optional; runs that never touch a macro series don't
/// need the API key configured.
#[derive(Clone)]
pub struct LiveProvider {
    yahoo: YahooClient,
    fred: Option<FredClient>,
    max_retries: u32,
    retry_delay: Duration,
}

impl LiveProvider {
    pub fn new(yahoo: YahooClient, fred: Option<FredClient>, config: &ProviderConfig) -> Self {
        Self {
            yahoo,
            fred,
            max_retries: config.max_retries,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        }
    }
}

#[async_trait]
impl SeriesProvider for LiveProvider {
    async fn fetch_daily_prices(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ProviderError> {
        with_retry(symbol, self.max_retries, self.retry_delay, || {
            self.yahoo.daily_closes(symbol, start, end)
        })
        .await
    }

    async fn fetch_macro_series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MacroSeries, ProviderError> {
        let fred = self.fred.as_ref().ok_or(ProviderError::MissingApiKey)?;
        with_retry(series_id, self.max_retries, self.retry_delay, || {
            fred.monthly_observations(series_id, start, end)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let failures_left = Cell::new(2u32);
        let attempts = Cell::new(0u32);

        let result = with_retry("SPY", 3, Duration::from_millis(1), || {
            attempts.set(attempts.get() + 1);
            let fail = failures_left.get() > 0;
            if fail {
                failures_left.set(failures_left.get() - 1);
            }
            async move {
                if fail {
                    Err(ProviderError::Api {
                        series: "SPY".to_string(),
                        message: "503".to_string(),
                    })
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.get(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_data_unavailable() {
        let result: Result<i32, _> = with_retry("SPY", 2, Duration::from_millis(1), || async {
            Err(ProviderError::Api {
                series: "SPY".to_string(),
                message: "503".to_string(),
            })
        })
        .await;

        match result.unwrap_err() {
            ProviderError::DataUnavailable { series, attempts } => {
                assert_eq!(series, "SPY");
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let attempts = Cell::new(0u32);

        let result: Result<i32, _> = with_retry("UNRATE", 5, Duration::from_millis(1), || {
            attempts.set(attempts.get() + 1);
            async { Err(ProviderError::MissingApiKey) }
        })
        .await;

        assert!(matches!(result.unwrap_err(), ProviderError::MissingApiKey));
        assert_eq!(attempts.get(), 1);
    }
}
