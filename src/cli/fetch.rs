use super::ui;
use crate::core::config::AppConfig;
use crate::core::price::{PriceObservation, PriceSnapshot, QuoteProvider};
use crate::core::report;
use anyhow::Result;
use comfy_table::Cell;
use tracing::{info, warn};

/// A pair the provider could not quote.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub pair: String,
    pub error: String,
}

/// Quotes each pair in turn. A failed pair is recorded and skipped.
pub async fn fetch_observations(
    pairs: &[String],
    provider: &dyn QuoteProvider,
) -> (Vec<PriceObservation>, Vec<FetchFailure>) {
    let pb = ui::new_progress_bar(pairs.len() as u64);
    let mut observations = Vec::with_capacity(pairs.len());
    let mut failures = Vec::new();

    for pair in pairs {
        pb.set_message(pair.clone());
        match provider.fetch_observation(pair).await {
            Ok(obs) => {
                info!(
                    symbol = %obs.symbol,
                    price = obs.current_price,
                    high = ?obs.day_high,
                    low = ?obs.day_low,
                    "Fetched quote"
                );
                observations.push(obs);
            }
            Err(e) => {
                warn!(%pair, "Error fetching quote: {e}");
                failures.push(FetchFailure {
                    pair: pair.clone(),
                    error: e.to_string(),
                });
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    (observations, failures)
}

/// Fetches all configured pairs and writes the prices file.
pub async fn run(config: &AppConfig, provider: &dyn QuoteProvider) -> Result<PriceSnapshot> {
    let pairs = config.canonical_pairs();
    let (observations, failures) = fetch_observations(&pairs, provider).await;

    let snapshot = PriceSnapshot::new(observations);
    let path = config.prices_path()?;
    report::write_snapshot(&path, &snapshot)?;

    display_results(&snapshot, &failures);
    println!(
        "Saved {} pairs to {}",
        snapshot.data.len(),
        path.display()
    );
    Ok(snapshot)
}

fn display_results(snapshot: &PriceSnapshot, failures: &[FetchFailure]) {
    println!("\n{}", ui::style_text("FX Spot Prices", ui::StyleType::Title));

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pair"),
        ui::header_cell("Price"),
        ui::header_cell("Day High"),
        ui::header_cell("Day Low"),
    ]);
    for obs in &snapshot.data {
        table.add_row(vec![
            Cell::new(&obs.symbol),
            ui::price_cell(Some(obs.current_price)),
            ui::price_cell(obs.day_high),
            ui::price_cell(obs.day_low),
        ]);
    }
    println!("{table}");

    for failure in failures {
        println!(
            "{}",
            ui::style_text(
                &format!("Error fetching {}: {}", failure.pair, failure.error),
                ui::StyleType::Error
            )
        );
    }
}
