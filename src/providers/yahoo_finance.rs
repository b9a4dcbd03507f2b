use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::core::cache::Cache;
use crate::core::price::{
    Baseline, BaselineProvider, FX_TICKER_SUFFIX, PriceObservation, QuoteProvider, canonical_pair,
};

/// The parts of a chart response both lookups need.
#[derive(Debug, Clone)]
pub struct FxChart {
    pub price: f64,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub market_time: Option<DateTime<Utc>>,
    pub previous_close: Option<f64>,
    /// Daily closes, oldest first, aligned with the bar timestamps.
    pub closes: Vec<Option<f64>>,
}

impl FxChart {
    fn from_item(item: ChartItem) -> Self {
        let meta = item.meta;
        let last_bar = item
            .timestamp
            .as_ref()
            .and_then(|ts| ts.last())
            .and_then(|ts| Utc.timestamp_opt(*ts, 0).single());
        let market_time = meta
            .regular_market_time
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .or(last_bar);
        let closes = item
            .indicators
            .and_then(|inds| inds.quote.into_iter().next())
            .and_then(|q| q.close)
            .unwrap_or_default();

        FxChart {
            price: meta.regular_market_price,
            day_high: meta.regular_market_day_high,
            day_low: meta.regular_market_day_low,
            market_time,
            previous_close: meta.previous_close.or(meta.chart_previous_close),
            closes,
        }
    }

    /// Close of the bar before the latest one, else the chart's previous close.
    ///
    /// The latest bar may still be open with a null close; the bar before it
    /// is yesterday's either way.
    fn prior_close(&self) -> Option<f64> {
        self.closes
            .len()
            .checked_sub(2)
            .and_then(|i| self.closes[i])
            .or(self.previous_close)
    }
}

#[derive(Deserialize, Debug)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Vec<ChartItem>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: f64,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_time: Option<i64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
}

/// Spot prices and prior closes for FX pairs from the Yahoo chart API.
pub struct YahooFxProvider {
    base_url: String,
    cache: Arc<Cache<String, FxChart>>,
}

impl YahooFxProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, FxChart>>) -> Self {
        YahooFxProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// One request per pair; later lookups for the same pair hit the cache.
    #[instrument(name = "YahooChartFetch", skip(self), fields(pair = %pair))]
    pub async fn fetch_chart(&self, pair: &str) -> Result<FxChart> {
        let pair = canonical_pair(pair);
        if let Some(cached) = self.cache.get(&pair).await {
            return Ok(cached);
        }

        let ticker = format!("{pair}{FX_TICKER_SUFFIX}");
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=5d",
            self.base_url, ticker
        );
        debug!("Requesting chart data from {}", url);

        let client = reqwest::Client::builder().user_agent("fxbrief/0.1").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for pair: {}", e, ticker))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for pair: {}",
                response.status(),
                ticker
            ));
        }

        let text = response.text().await?;
        let data: ChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", ticker, e))?;

        let item = data
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No price data found for pair: {}", ticker))?;

        let chart = FxChart::from_item(item);
        self.cache.put(pair, chart.clone()).await;
        Ok(chart)
    }
}

#[async_trait]
impl QuoteProvider for YahooFxProvider {
    async fn fetch_observation(&self, pair: &str) -> Result<PriceObservation> {
        let chart = self.fetch_chart(pair).await?;
        Ok(PriceObservation {
            symbol: canonical_pair(pair),
            current_price: chart.price,
            timestamp: chart.market_time,
            day_high: chart.day_high,
            day_low: chart.day_low,
        })
    }
}

#[async_trait]
impl BaselineProvider for YahooFxProvider {
    async fn fetch_baseline(&self, pair: &str) -> Result<Baseline> {
        let symbol = canonical_pair(pair);
        let chart = self.fetch_chart(&symbol).await?;
        let previous_close = chart
            .prior_close()
            .ok_or_else(|| anyhow!("Not enough history for {}", symbol))?;
        Ok(Baseline {
            symbol,
            previous_close,
        })
    }
}
