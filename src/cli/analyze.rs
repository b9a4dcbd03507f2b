use super::ui;
use crate::core::analyzer::{self, AnalysisResult, ChangeRecord};
use crate::core::config::AppConfig;
use crate::core::price::{Baseline, BaselineProvider, PriceObservation};
use crate::core::report;
use anyhow::Result;
use comfy_table::Cell;
use tracing::{debug, warn};

/// Looks up one baseline per distinct symbol, sequentially.
///
/// A failed lookup leaves the symbol without a baseline; the analyzer then
/// reports it as missing.
pub async fn fetch_baselines(
    observations: &[PriceObservation],
    provider: &dyn BaselineProvider,
) -> Vec<Baseline> {
    let pb = ui::new_progress_bar(observations.len() as u64);
    let mut baselines: Vec<Baseline> = Vec::with_capacity(observations.len());

    for obs in observations {
        pb.set_message(obs.symbol.clone());
        if baselines.iter().any(|b| b.symbol == obs.symbol) {
            pb.inc(1);
            continue;
        }
        match provider.fetch_baseline(&obs.symbol).await {
            Ok(baseline) => {
                debug!(symbol = %baseline.symbol, close = baseline.previous_close, "Fetched baseline");
                baselines.push(baseline);
            }
            Err(e) => warn!(symbol = %obs.symbol, "Baseline lookup failed: {e}"),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    baselines
}

/// Reads the prices file, computes changes and writes the analysis file.
pub async fn run(config: &AppConfig, provider: &dyn BaselineProvider) -> Result<AnalysisResult> {
    let prices_path = config.prices_path()?;
    let snapshot = report::read_snapshot(&prices_path)?;

    let baselines = fetch_baselines(&snapshot.data, provider).await;
    let result = analyzer::analyze_batch(&snapshot.data, &baselines);

    let path = config.analysis_path()?;
    report::write_analysis(&path, &result)?;

    display_results(&result, snapshot.data.len());
    println!("Saved analysis to {}", path.display());
    Ok(result)
}

fn mover_line(label: &str, record: Option<&ChangeRecord>) -> String {
    match record {
        Some(r) => {
            let style = if r.pct_change >= 0.0 {
                ui::StyleType::Gain
            } else {
                ui::StyleType::Loss
            };
            format!(
                "{label:<10}: {} {}",
                r.symbol,
                ui::style_text(&format!("{:.4}%", r.pct_change), style)
            )
        }
        None => format!(
            "{label:<10}: {}",
            ui::style_text("N/A", ui::StyleType::Subtle)
        ),
    }
}

fn display_results(result: &AnalysisResult, observed: usize) {
    println!(
        "\n{}",
        ui::style_text("Change vs. Previous Close", ui::StyleType::Title)
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pair"),
        ui::header_cell("Price"),
        ui::header_cell("Prev Close"),
        ui::header_cell("Change"),
    ]);
    for record in &result.records {
        table.add_row(vec![
            Cell::new(&record.symbol),
            ui::price_cell(Some(record.current_price)),
            ui::price_cell(Some(record.previous_close)),
            ui::change_cell(record.pct_change),
        ]);
    }
    println!("{table}");

    println!("{}", mover_line("Top gainer", result.top_gainer.as_ref()));
    println!("{}", mover_line("Top loser", result.top_loser.as_ref()));

    let skipped = observed - result.records.len();
    if skipped > 0 {
        println!(
            "{}",
            ui::style_text(
                &format!("Skipped {skipped} of {observed} symbols"),
                ui::StyleType::Error
            )
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockBaselineProvider {
        call_count: AtomicUsize,
    }

    #[async_trait]
    impl BaselineProvider for MockBaselineProvider {
        async fn fetch_baseline(&self, pair: &str) -> Result<Baseline> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            match pair {
                "EURUSD" => Ok(Baseline {
                    symbol: pair.to_string(),
                    previous_close: 1.1,
                }),
                _ => Err(anyhow!("Not enough history for {pair}")),
            }
        }
    }

    fn obs(symbol: &str, price: f64) -> PriceObservation {
        PriceObservation {
            symbol: symbol.to_string(),
            current_price: price,
            timestamp: None,
            day_high: None,
            day_low: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_baselines_once_per_symbol() {
        let provider = MockBaselineProvider {
            call_count: AtomicUsize::new(0),
        };
        let observations = vec![obs("EURUSD", 1.105), obs("EURUSD", 1.106), obs("NZDUSD", 0.6)];

        let baselines = fetch_baselines(&observations, &provider).await;

        assert_eq!(baselines.len(), 1);
        assert_eq!(baselines[0].symbol, "EURUSD");
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 2);

        let result = analyzer::analyze_batch(&observations, &baselines);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.top_gainer.unwrap().current_price, 1.106);
        assert_eq!(result.top_loser.unwrap().current_price, 1.105);
    }

    #[test]
    fn test_mover_line_absent() {
        let line = mover_line("Top gainer", None);
        assert!(line.starts_with("Top gainer: "));
        assert!(line.contains("N/A"));
    }

    #[test]
    fn test_mover_line_labels_align() {
        let record = ChangeRecord {
            symbol: "USDJPY".to_string(),
            current_price: 150.0,
            previous_close: 160.0,
            pct_change: -6.25,
        };
        let loser = mover_line("Top loser", Some(&record));
        assert!(loser.starts_with("Top loser : USDJPY "));
        assert_eq!(
            loser.find(": "),
            mover_line("Top gainer", None).find(": ")
        );
    }
}
