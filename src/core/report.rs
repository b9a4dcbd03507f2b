//! Reading and writing the JSON documents exchanged between steps.
use crate::core::analyzer::AnalysisResult;
use crate::core::price::PriceSnapshot;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Creates `path` and its parents if missing.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    debug!("Ready directory: {}", path.display());
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Saved {}", path.display());
    Ok(())
}

pub fn write_snapshot(path: &Path, snapshot: &PriceSnapshot) -> Result<()> {
    write_json(path, snapshot)
}

pub fn read_snapshot(path: &Path) -> Result<PriceSnapshot> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read prices file: {}", path.display()))?;
    let snapshot = PriceSnapshot::from_json(&text)
        .with_context(|| format!("Failed to parse prices file: {}", path.display()))?;
    debug!(count = snapshot.data.len(), "Loaded price observations");
    Ok(snapshot)
}

pub fn write_analysis(path: &Path, result: &AnalysisResult) -> Result<()> {
    write_json(path, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analyzer::analyze_batch;
    use crate::core::price::{Baseline, PriceObservation};
    use tempfile::TempDir;

    fn observation(symbol: &str, price: f64) -> PriceObservation {
        PriceObservation {
            symbol: symbol.to_string(),
            current_price: price,
            timestamp: None,
            day_high: Some(price),
            day_low: Some(price),
        }
    }

    #[test]
    fn test_snapshot_write_then_read() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("forex_prices.json");
        let snapshot = PriceSnapshot::new(vec![observation("EURUSD", 1.105)]);

        write_snapshot(&path, &snapshot)?;
        let loaded = read_snapshot(&path)?;

        assert_eq!(loaded.data, snapshot.data);
        assert!(loaded.retrieved_at.is_some());
        Ok(())
    }

    #[test]
    fn test_read_snapshot_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read_snapshot(&dir.path().join("absent.json"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read prices file")
        );
    }

    #[test]
    fn test_read_snapshot_malformed() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("forex_prices.json");
        fs::write(&path, r#"{"data": "nope"}"#)?;

        let err = read_snapshot(&path).unwrap_err();
        assert!(format!("{err:#}").contains("invalid input"));
        Ok(())
    }

    #[test]
    fn test_write_analysis_document() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("forex_price_analysis.json");
        let result = analyze_batch(
            &[observation("EURUSD", 1.105)],
            &[Baseline {
                symbol: "EURUSD".to_string(),
                previous_close: 1.1,
            }],
        );

        write_analysis(&path, &result)?;

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(value["analysis"][0]["symbol"], "EURUSD");
        assert_eq!(value["analysis"][0]["pctChange"], 0.4545);
        assert_eq!(value["topGainer"]["symbol"], "EURUSD");
        assert_eq!(value["topLoser"]["symbol"], "EURUSD");
        Ok(())
    }
}
