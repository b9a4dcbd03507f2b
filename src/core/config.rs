use crate::core::price::canonical_pair;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            }),
        }
    }
}

impl ProvidersConfig {
    pub fn yahoo_base_url(&self) -> &str {
        self.yahoo
            .as_ref()
            .map_or(DEFAULT_YAHOO_BASE_URL, |p| p.base_url.as_str())
    }
}

fn default_prices_file() -> String {
    "forex_prices.json".to_string()
}

fn default_analysis_file() -> String {
    "forex_price_analysis.json".to_string()
}

/// File names, relative to the data directory.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FilesConfig {
    #[serde(default = "default_prices_file")]
    pub prices: String,
    #[serde(default = "default_analysis_file")]
    pub analysis: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        FilesConfig {
            prices: default_prices_file(),
            analysis: default_analysis_file(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub pairs: Vec<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub data_path: Option<String>,
    #[serde(default)]
    pub files: FilesConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "fxbrief").context("Could not determine project directories")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    pub fn prices_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(&self.files.prices))
    }

    pub fn analysis_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(&self.files.analysis))
    }

    /// Configured pairs in canonical form, duplicates removed, order kept.
    pub fn canonical_pairs(&self) -> Vec<String> {
        let mut pairs: Vec<String> = Vec::with_capacity(self.pairs.len());
        for pair in self.pairs.iter().map(|p| canonical_pair(p)) {
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
        pairs
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(blank) = self.pairs.iter().find(|p| canonical_pair(p).is_empty()) {
            bail!("Invalid currency pair in config: {blank:?}");
        }
        Ok(())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config = Self::from_yaml(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
pairs:
  - EURUSD
  - GBPUSD=X
  - eurusd=X
data_path: "/tmp/fx"
"#;

        let config = AppConfig::from_yaml(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.pairs.len(), 3);
        assert_eq!(config.canonical_pairs(), vec!["EURUSD", "GBPUSD"]);
        assert_eq!(config.providers.yahoo_base_url(), DEFAULT_YAHOO_BASE_URL);
        assert_eq!(config.files.prices, "forex_prices.json");
        assert_eq!(config.files.analysis, "forex_price_analysis.json");
        assert_eq!(
            config.prices_path().unwrap(),
            PathBuf::from("/tmp/fx/forex_prices.json")
        );
        assert_eq!(
            config.analysis_path().unwrap(),
            PathBuf::from("/tmp/fx/forex_price_analysis.json")
        );
    }

    #[test]
    fn test_config_with_providers_and_files() {
        let yaml_str = r#"
pairs: [USDJPY]
providers:
  yahoo:
    base_url: "http://example.com/yahoo"
files:
  prices: "p.json"
"#;
        let config = AppConfig::from_yaml(yaml_str).unwrap();
        assert_eq!(config.providers.yahoo_base_url(), "http://example.com/yahoo");
        assert_eq!(config.files.prices, "p.json");
        assert_eq!(config.files.analysis, "forex_price_analysis.json");
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_config_rejects_blank_pair() {
        let result = AppConfig::from_yaml("pairs: [\"EURUSD\", \" \"]");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid currency pair")
        );
    }

    #[test]
    fn test_config_requires_pairs() {
        assert!(AppConfig::from_yaml("data_path: /tmp").is_err());
    }
}
