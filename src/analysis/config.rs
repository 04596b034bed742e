//! Tunable analysis settings and loading.

use std::fmt::Write;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::ChartistError;

/// Analysis settings loaded from an optional JSON file.
///
/// Every field has a default, so `{}` is a valid file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Trailing candles handed to the reversal pattern library.
    pub pattern_window: usize,
    /// Trailing candles for the Fibonacci high/low range. `None` uses the
    /// whole series.
    pub fib_window: Option<usize>,
    /// ADX above this counts as a trending market.
    pub adx_threshold: Decimal,
    /// Funding rate (percent) beyond which the crowded side is faded.
    pub funding_threshold: Decimal,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pattern_window: 10,
            fib_window: None,
            adx_threshold: dec!(25),
            funding_threshold: dec!(0.01),
        }
    }
}

impl AnalysisConfig {
    /// Loads analysis settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or fails
    /// [`AnalysisConfig::validate`].
    pub fn load(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ChartistError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects windows too short for the detectors they feed.
    ///
    /// # Errors
    ///
    /// [`ChartistError::Config`] naming the offending field.
    pub fn validate(&self) -> crate::Result<()> {
        if self.pattern_window < 3 {
            return Err(ChartistError::Config(format!(
                "pattern_window must be at least 3, got {}",
                self.pattern_window
            )));
        }
        if let Some(w) = self.fib_window.filter(|&w| w < 2) {
            return Err(ChartistError::Config(format!(
                "fib_window must be at least 2, got {w}"
            )));
        }
        if self.adx_threshold < Decimal::ZERO || self.funding_threshold < Decimal::ZERO {
            return Err(ChartistError::Config(
                "thresholds must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns a human-readable summary of the effective settings.
    pub fn describe(&self) -> String {
        let mut out = String::from("Analysis settings:\n");
        let _ = writeln!(out, "  pattern_window: {}", self.pattern_window);
        match self.fib_window {
            Some(w) => {
                let _ = writeln!(out, "  fib_window: {w}");
            }
            None => {
                let _ = writeln!(out, "  fib_window: whole series");
            }
        }
        let _ = writeln!(out, "  adx_threshold: {}", self.adx_threshold);
        let _ = writeln!(out, "  funding_threshold: {}%", self.funding_threshold);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn empty_object_uses_defaults() {
        let config: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.pattern_window, 10);
        assert_eq!(config.adx_threshold, dec!(25));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"fib_window": 50, "adx_threshold": "20"}"#).unwrap();
        assert_eq!(config.fib_window, Some(50));
        assert_eq!(config.adx_threshold, dec!(20));
        assert_eq!(config.funding_threshold, dec!(0.01));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"pattern_window": 12}}"#).unwrap();
        let config = AnalysisConfig::load(file.path()).unwrap();
        assert_eq!(config.pattern_window, 12);
    }

    #[test]
    fn load_rejects_short_window() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"pattern_window": 2}}"#).unwrap();
        let err = AnalysisConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("pattern_window"));
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = AnalysisConfig::load(Path::new("/nonexistent/chartist.json")).unwrap_err();
        assert!(matches!(err, ChartistError::Config(_)));
    }

    #[test]
    fn bad_json_returns_error() {
        assert!(serde_json::from_str::<AnalysisConfig>("not json").is_err());
    }

    #[test]
    fn describe_lists_settings() {
        let desc = AnalysisConfig::default().describe();
        assert!(desc.contains("pattern_window: 10"));
        assert!(desc.contains("fib_window: whole series"));
        assert!(desc.contains("funding_threshold: 0.01%"));
    }
}
