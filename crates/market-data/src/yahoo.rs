use crate::error::ProviderError;
use crate::responses::{ChartResponse, ChartResult};
use chrono::{DateTime, NaiveDate, NaiveTime};
use core_types::{PriceSeries, SeriesPoint};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use rust_decimal::prelude::*;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Client for the Yahoo Finance v8 chart endpoint, used for daily closes.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self, ProviderError> {
        // Yahoo rejects requests without a browser-ish user agent.
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Fetches daily closes for `symbol` over `[start, end]`, preferring
    /// adjusted closes when the endpoint provides them.
    pub async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ProviderError> {
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();

        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await?
            .json::<ChartResponse>()
            .await?;

        if let Some(error) = response.chart.error {
            return Err(ProviderError::Api {
                series: symbol.to_string(),
                message: format!("{}: {}", error.code, error.description),
            });
        }

        let result = response
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| ProviderError::Api {
                series: symbol.to_string(),
                message: "empty chart result".to_string(),
            })?;

        price_series_from_chart(symbol, &result)
    }
}

/// Converts one chart result into a `PriceSeries`, dropping null closes.
pub(crate) fn price_series_from_chart(
    symbol: &str,
    result: &ChartResult,
) -> Result<PriceSeries, ProviderError> {
    let quote = result.indicators.quote.first().ok_or_else(|| {
        ProviderError::Deserialization(format!("no quote block for {symbol}"))
    })?;
    let adjusted = result
        .indicators
        .adjclose
        .as_ref()
        .and_then(|blocks| blocks.first());

    let mut points = Vec::with_capacity(result.timestamp.len());
    for (idx, &ts) in result.timestamp.iter().enumerate() {
        let close = adjusted
            .and_then(|a| a.adjclose.get(idx).copied().flatten())
            .or_else(|| quote.close.get(idx).copied().flatten());

        let Some(close) = close else {
            continue;
        };

        let date = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| {
                ProviderError::InvalidData(format!("invalid timestamp {ts} for {symbol}"))
            })?
            .date_naive();
        let value = Decimal::from_f64(close).ok_or_else(|| {
            ProviderError::InvalidData(format!("close {close} at {date} not representable"))
        })?;

        points.push(SeriesPoint::new(date, value));
    }

    PriceSeries::new(points).map_err(|e| ProviderError::InvalidData(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "SPY"},
                "timestamp": [1704153600, 1704240000, 1704326400],
                "indicators": {
                    "quote": [{"close": [470.1, null, 472.3]}],
                    "adjclose": [{"adjclose": [468.9, null, 471.0]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_chart_fixture_preferring_adjusted_closes() {
        let response: ChartResponse = serde_json::from_str(FIXTURE).unwrap();
        let result = &response.chart.result.unwrap()[0];

        let series = price_series_from_chart("SPY", result).unwrap();
        // The null middle entry is dropped.
        assert_eq!(series.len(), 2);
        let points = series.points();
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(points[0].value.to_f64().unwrap(), 468.9);
        assert_eq!(points[1].value.to_f64().unwrap(), 471.0);
    }

    #[test]
    fn falls_back_to_raw_closes_without_adjclose_block() {
        let raw = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600],
                    "indicators": {"quote": [{"close": [470.1]}]}
                }],
                "error": null
            }
        }"#;
        let response: ChartResponse = serde_json::from_str(raw).unwrap();
        let result = &response.chart.result.unwrap()[0];

        let series = price_series_from_chart("SPY", result).unwrap();
        assert_eq!(series.points()[0].value.to_f64().unwrap(), 470.1);
    }

    #[test]
    fn chart_error_payload_parses() {
        let error = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        }"#;
        let response: ChartResponse = serde_json::from_str(error).unwrap();
        assert!(response.chart.result.is_none());
        assert_eq!(response.chart.error.unwrap().code, "Not Found");
    }
}
