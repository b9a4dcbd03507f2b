//! Pricing abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Suffix Yahoo uses for currency pair tickers, e.g. `EURUSD=X`.
pub const FX_TICKER_SUFFIX: &str = "=X";

/// Strips the ticker suffix so `EURUSD=X` and `EURUSD` name the same pair.
pub fn canonical_pair(pair: &str) -> String {
    let pair = pair.trim().to_uppercase();
    match pair.strip_suffix(FX_TICKER_SUFFIX) {
        Some(bare) => bare.to_string(),
        None => pair,
    }
}

/// Current price reading for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceObservation {
    pub symbol: String,
    pub current_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_low: Option<f64>,
}

/// Reference close a change is measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    pub symbol: String,
    pub previous_close: f64,
}

/// Raised when the prices document does not have the expected shape.
#[derive(Debug, Error)]
#[error("invalid input: {0}")]
pub struct InvalidInput(String);

/// The prices document written by the fetch step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    #[serde(default)]
    pub retrieved_at: Option<DateTime<Utc>>,
    pub data: Vec<PriceObservation>,
}

impl PriceSnapshot {
    pub fn new(data: Vec<PriceObservation>) -> Self {
        PriceSnapshot {
            retrieved_at: Some(Utc::now()),
            data,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, InvalidInput> {
        serde_json::from_str(text).map_err(|e| InvalidInput(e.to_string()))
    }
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_observation(&self, pair: &str) -> Result<PriceObservation>;
}

#[async_trait]
pub trait BaselineProvider: Send + Sync {
    async fn fetch_baseline(&self, pair: &str) -> Result<Baseline>;
}
