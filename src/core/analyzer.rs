//! Day-over-day percent change and top/bottom mover detection.
//!
//! Everything here is pure: the fetch and file steps hand in already
//! collected observations and baselines, and get back an [`AnalysisResult`].
use crate::core::price::{Baseline, PriceObservation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Number of decimal places kept in [`ChangeRecord::pct_change`].
pub const PCT_DECIMALS: i32 = 4;

/// Per-symbol failures. None of these abort a batch.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChangeError {
    #[error("no baseline for symbol: {symbol}")]
    MissingBaseline { symbol: String },

    #[error("baseline is zero for symbol: {symbol}")]
    ZeroBaseline { symbol: String },

    #[error("{field} is not a finite number for symbol: {symbol}")]
    NonFinitePrice { symbol: String, field: &'static str },
}

impl ChangeError {
    pub fn symbol(&self) -> &str {
        match self {
            ChangeError::MissingBaseline { symbol }
            | ChangeError::ZeroBaseline { symbol }
            | ChangeError::NonFinitePrice { symbol, .. } => symbol,
        }
    }
}

/// Percent change of one symbol against its baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub symbol: String,
    pub current_price: f64,
    pub previous_close: f64,
    pub pct_change: f64,
}

/// Output of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "analysis")]
    pub records: Vec<ChangeRecord>,
    pub top_gainer: Option<ChangeRecord>,
    pub top_loser: Option<ChangeRecord>,
}

/// Rounds half away from zero to [`PCT_DECIMALS`] places.
pub fn round_pct(value: f64) -> f64 {
    let scale = 10f64.powi(PCT_DECIMALS);
    (value * scale).round() / scale
}

/// Computes the rounded percent change for one observation.
///
/// `baseline` is the entry matched by symbol, if any.
pub fn compute_change(
    observation: &PriceObservation,
    baseline: Option<&Baseline>,
) -> Result<ChangeRecord, ChangeError> {
    let symbol = &observation.symbol;
    let baseline = baseline.ok_or_else(|| ChangeError::MissingBaseline {
        symbol: symbol.clone(),
    })?;

    if !observation.current_price.is_finite() {
        return Err(ChangeError::NonFinitePrice {
            symbol: symbol.clone(),
            field: "currentPrice",
        });
    }
    if !baseline.previous_close.is_finite() {
        return Err(ChangeError::NonFinitePrice {
            symbol: symbol.clone(),
            field: "previousClose",
        });
    }
    if baseline.previous_close == 0.0 {
        return Err(ChangeError::ZeroBaseline {
            symbol: symbol.clone(),
        });
    }

    let pct = (observation.current_price - baseline.previous_close) / baseline.previous_close
        * 100.0;
    // A tiny baseline can overflow the quotient or the rounding scale.
    let pct_change = Some(pct)
        .filter(|p| p.is_finite())
        .map(round_pct)
        .filter(|p| p.is_finite())
        .ok_or_else(|| ChangeError::NonFinitePrice {
            symbol: symbol.clone(),
            field: "pctChange",
        })?;

    Ok(ChangeRecord {
        symbol: symbol.clone(),
        current_price: observation.current_price,
        previous_close: baseline.previous_close,
        pct_change,
    })
}

/// Indexes baselines by symbol. The first baseline seen for a symbol wins.
fn index_baselines(baselines: &[Baseline]) -> HashMap<&str, &Baseline> {
    let mut index = HashMap::with_capacity(baselines.len());
    for baseline in baselines {
        if index.contains_key(baseline.symbol.as_str()) {
            debug!(symbol = %baseline.symbol, "Ignoring duplicate baseline");
            continue;
        }
        index.insert(baseline.symbol.as_str(), baseline);
    }
    index
}

/// One outcome per observation, in input order.
pub fn evaluate_batch(
    observations: &[PriceObservation],
    baselines: &[Baseline],
) -> Vec<Result<ChangeRecord, ChangeError>> {
    let index = index_baselines(baselines);
    observations
        .iter()
        .map(|obs| compute_change(obs, index.get(obs.symbol.as_str()).copied()))
        .collect()
}

/// Runs [`compute_change`] over the batch, keeping successes in input order.
///
/// Failed symbols are logged and left out; the batch itself never fails.
pub fn analyze_batch(observations: &[PriceObservation], baselines: &[Baseline]) -> AnalysisResult {
    let mut records = Vec::with_capacity(observations.len());
    for outcome in evaluate_batch(observations, baselines) {
        match outcome {
            Ok(record) => {
                debug!(symbol = %record.symbol, pct_change = record.pct_change, "Computed change");
                records.push(record);
            }
            Err(e) => warn!(symbol = %e.symbol(), "Skipping symbol: {e}"),
        }
    }

    let (top_gainer, top_loser) = find_extremes(&records);
    let (top_gainer, top_loser) = (top_gainer.cloned(), top_loser.cloned());
    AnalysisResult {
        generated_at: Utc::now(),
        records,
        top_gainer,
        top_loser,
    }
}

/// Returns `(top_gainer, top_loser)`.
///
/// Ties resolve to the earliest record in input order. Both are `None` for
/// an empty slice.
pub fn find_extremes(records: &[ChangeRecord]) -> (Option<&ChangeRecord>, Option<&ChangeRecord>) {
    let mut gainer: Option<&ChangeRecord> = None;
    let mut loser: Option<&ChangeRecord> = None;

    for record in records {
        // Strict comparisons keep the first of equal values.
        if gainer.is_none_or(|g| record.pct_change > g.pct_change) {
            gainer = Some(record);
        }
        if loser.is_none_or(|l| record.pct_change < l.pct_change) {
            loser = Some(record);
        }
    }

    (gainer, loser)
}
