//! HTTP request DTOs.

use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::domain::{OptionLeg, OptionType, Position, VolatilityKey};
use crate::volatility::QuotedVolatility;

/// Request body for `POST /pop`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopRequest {
    /// Current underlying price.
    pub spot: f64,
    /// Calendar days until expiry.
    pub days_to_expiry: f64,
    /// Expiry label (informational).
    #[serde(default)]
    pub expiry: String,
    /// Underlying symbol (informational).
    #[serde(default)]
    pub symbol: String,
    /// Position legs.
    #[serde(alias = "optionList")]
    pub legs: Vec<OptionLeg>,
    /// Externally quoted volatilities; when non-empty they replace
    /// premium-implied ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quoted_volatility: Vec<QuotedVolatilityEntry>,
}

/// One quoted volatility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedVolatilityEntry {
    /// Strike price.
    pub strike: f64,
    /// Option type (`CE` / `PE`).
    pub option_type: OptionType,
    /// Annualized implied volatility.
    pub iv: f64,
}

impl PopRequest {
    /// Build the position, using the configured rate and day count.
    #[must_use]
    pub fn to_position(&self, pricing: &PricingConfig) -> Position {
        Position::from_days(
            self.spot,
            self.days_to_expiry,
            pricing.days_per_year,
            pricing.risk_free_rate,
            self.legs.clone(),
        )
        .with_metadata(self.symbol.as_str(), self.expiry.as_str())
    }

    /// Quote snapshot, if the request carried one.
    ///
    /// Entries with an unrecognised option type are dropped.
    #[must_use]
    pub fn quoted_source(&self) -> Option<QuotedVolatility> {
        if self.quoted_volatility.is_empty() {
            return None;
        }

        Some(
            self.quoted_volatility
                .iter()
                .filter_map(|entry| {
                    entry
                        .option_type
                        .kind()
                        .map(|kind| (VolatilityKey::new(entry.strike, kind), entry.iv))
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_option_list_and_ltp_aliases() {
        let json = r#"{
            "spot": 22913.15,
            "expiry": "28-MAR-2024",
            "daysToExpiry": 8,
            "symbol": "NIFTY",
            "optionList": [
                {"optionType": "CE", "transactionType": "B", "strike": 22950, "ltp": 154.7, "quantity": 75}
            ]
        }"#;

        let request: PopRequest = match serde_json::from_str(json) {
            Ok(request) => request,
            Err(e) => panic!("request should deserialize: {e}"),
        };

        assert_eq!(request.legs.len(), 1);
        assert_eq!(request.legs[0].premium(), 154.7);
        assert!(request.quoted_source().is_none());

        let position = request.to_position(&PricingConfig::default());
        assert_eq!(position.symbol(), "NIFTY");
        assert!((position.time_to_expiry() - 8.0 / 365.0).abs() < 1e-15);
        assert_eq!(position.risk_free_rate(), 0.065);
    }

    #[test]
    fn builds_quote_snapshot() {
        let json = r#"{
            "spot": 100,
            "daysToExpiry": 30,
            "legs": [],
            "quotedVolatility": [
                {"strike": 100, "optionType": "CE", "iv": 0.2},
                {"strike": 95, "optionType": "pe", "iv": 0.25},
                {"strike": 90, "optionType": "XX", "iv": 0.3}
            ]
        }"#;

        let request: PopRequest = match serde_json::from_str(json) {
            Ok(request) => request,
            Err(e) => panic!("request should deserialize: {e}"),
        };

        let Some(quotes) = request.quoted_source() else {
            panic!("quotes were provided");
        };
        assert_eq!(quotes.len(), 2);
    }
}
