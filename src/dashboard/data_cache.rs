//! Static market data shipped with the application.
//!
//! Prices, HMM regime labels and GARCH volatility levels are precomputed and
//! embedded at build time; nothing here is calculated at runtime.

use once_cell::sync::Lazy;
use serde::Deserialize;

const CANDLES_JSON: &str = include_str!("../../assets/mock/candles.json");
const REGIMES_JSON: &str = include_str!("../../assets/mock/regimes.json");
const GARCH_JSON: &str = include_str!("../../assets/mock/garch.json");

#[derive(Debug, Clone, Deserialize)]
pub struct Candle {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandleSeries {
    pub symbol: String,
    pub candles: Vec<Candle>,
}

/// Hidden Markov regime labels, one per candle.
#[derive(Debug, Clone, Deserialize)]
pub struct RegimeSeries {
    pub states: Vec<String>,
    pub regimes: Vec<usize>,
    pub transition: Vec<Vec<f64>>,
}

/// GARCH(1,1) fit: daily returns and conditional volatility, one per candle.
#[derive(Debug, Clone, Deserialize)]
pub struct GarchSeries {
    pub model: String,
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
    pub returns: Vec<f64>,
    pub sigma: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct MarketData {
    pub prices: CandleSeries,
    pub regimes: RegimeSeries,
    pub garch: GarchSeries,
}

impl MarketData {
    pub fn parse(candles: &str, regimes: &str, garch: &str) -> anyhow::Result<Self> {
        let data = Self {
            prices: serde_json::from_str(candles)?,
            regimes: serde_json::from_str(regimes)?,
            garch: serde_json::from_str(garch)?,
        };
        let n = data.prices.candles.len();
        if data.regimes.regimes.len() != n || data.garch.sigma.len() != n {
            anyhow::bail!("mock series lengths differ from the price series ({n} candles)");
        }
        if let Some(bad) = data
            .regimes
            .regimes
            .iter()
            .find(|&&r| r >= data.regimes.states.len())
        {
            anyhow::bail!("regime index {bad} has no state label");
        }
        Ok(data)
    }

    /// Stationary persistence of a regime: expected run length `1 / (1 - p_ii)`.
    pub fn expected_duration(&self, state: usize) -> Option<f64> {
        let p = *self.regimes.transition.get(state)?.get(state)?;
        (p < 1.0).then(|| 1.0 / (1.0 - p))
    }
}

static MARKET_DATA: Lazy<Result<MarketData, String>> = Lazy::new(|| {
    MarketData::parse(CANDLES_JSON, REGIMES_JSON, GARCH_JSON).map_err(|err| {
        tracing::error!(error = %err, "embedded market data is invalid");
        err.to_string()
    })
});

/// Shared embedded data set, parsed on first use.
pub fn market_data() -> Result<&'static MarketData, &'static str> {
    MARKET_DATA.as_ref().map_err(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_data_parses_and_lines_up() {
        let data = market_data().unwrap();
        assert_eq!(data.prices.candles.len(), data.regimes.regimes.len());
        assert_eq!(data.garch.sigma.len(), data.garch.returns.len());
        assert_eq!(data.regimes.states.len(), data.regimes.transition.len());
    }

    #[test]
    fn expected_duration_uses_diagonal() {
        let data = market_data().unwrap();
        let d = data.expected_duration(0).unwrap();
        let p = data.regimes.transition[0][0];
        assert!((d - 1.0 / (1.0 - p)).abs() < 1e-9);
        assert!(data.expected_duration(99).is_none());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = MarketData::parse(
            r#"{"symbol":"X","candles":[]}"#,
            r#"{"states":["A"],"regimes":[0],"transition":[[1.0]]}"#,
            r#"{"model":"m","omega":0,"alpha":0,"beta":0,"returns":[],"sigma":[]}"#,
        );
        assert!(err.is_err());
    }
}
