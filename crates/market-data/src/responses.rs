use chrono::NaiveDate;
use serde::Deserialize;

// --- Yahoo Finance v8 chart endpoint ---

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    pub quote: Vec<Quote>,
    /// Present when the endpoint returns dividend/split adjusted closes.
    pub adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
pub struct Quote {
    /// Null entries mark days the instrument did not price.
    pub close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct AdjClose {
    pub adjclose: Vec<Option<f64>>,
}

// --- FRED series/observations endpoint ---

#[derive(Debug, Deserialize)]
pub struct ObservationsResponse {
    pub observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    /// FRED encodes values as strings, with "." marking a missing period.
    pub value: String,
}
