use crate::error::ProviderError;
use crate::responses::{Observation, ObservationsResponse};
use chrono::NaiveDate;
use core_types::{MacroSeries, SeriesPoint};
use rust_decimal::Decimal;
use std::str::FromStr;

const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org";

/// Client for the FRED `series/observations` endpoint, used for the monthly
/// macro indicator.
#[derive(Clone)]
pub struct FredClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FredClient {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, ProviderError> {
        if api_key.is_empty() {
            return Err(ProviderError::MissingApiKey);
        }
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Reads the API key from the `FRED_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var("FRED_API_KEY").map_err(|_| ProviderError::MissingApiKey)?;
        Self::new(api_key)
    }

    pub async fn monthly_observations(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MacroSeries, ProviderError> {
        let url = format!("{}/fred/series/observations", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", &start.to_string()),
                ("observation_end", &end.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api {
                series: series_id.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let payload = response.json::<ObservationsResponse>().await?;
        macro_series_from_observations(series_id, &payload.observations)
    }
}

/// Converts FRED observations into a `MacroSeries`, skipping missing periods.
pub(crate) fn macro_series_from_observations(
    series_id: &str,
    observations: &[Observation],
) -> Result<MacroSeries, ProviderError> {
    let mut points = Vec::with_capacity(observations.len());
    for obs in observations {
        // FRED marks periods with no reading as ".".
        if obs.value == "." {
            continue;
        }
        let value = Decimal::from_str(&obs.value).map_err(|e| {
            ProviderError::Deserialization(format!(
                "bad value '{}' at {} for {series_id}: {e}",
                obs.value, obs.date
            ))
        })?;
        points.push(SeriesPoint::new(obs.date, value));
    }

    MacroSeries::new(points).map_err(|e| ProviderError::InvalidData(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const FIXTURE: &str = r#"{
        "realtime_start": "2024-06-01",
        "realtime_end": "2024-06-01",
        "count": 3,
        "observations": [
            {"realtime_start": "2024-06-01", "realtime_end": "2024-06-01", "date": "2024-01-01", "value": "3.7"},
            {"realtime_start": "2024-06-01", "realtime_end": "2024-06-01", "date": "2024-02-01", "value": "."},
            {"realtime_start": "2024-06-01", "realtime_end": "2024-06-01", "date": "2024-03-01", "value": "3.8"}
        ]
    }"#;

    #[test]
    fn parses_observations_and_skips_missing_periods() {
        let response: ObservationsResponse = serde_json::from_str(FIXTURE).unwrap();
        let series = macro_series_from_observations("UNRATE", &response.observations).unwrap();

        assert_eq!(series.len(), 2);
        let points = series.points();
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(points[0].value, dec!(3.7));
        assert_eq!(points[1].value, dec!(3.8));
    }

    #[test]
    fn rejects_unparseable_values() {
        let observations = vec![Observation {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            value: "not-a-number".to_string(),
        }];
        assert!(macro_series_from_observations("UNRATE", &observations).is_err());
    }
}
