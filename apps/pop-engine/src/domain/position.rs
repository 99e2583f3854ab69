//! Option Position Value Objects
//!
//! Legs as they arrive on the wire plus the request-scoped [`Position`] the
//! engine prices. Enum fields that carry exchange codes keep any value they
//! do not recognise so the caller's policy can decide what to do with it.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::pricing::OptionKind;

// ============================================================================
// Option Type
// ============================================================================

/// Option type as quoted by the exchange (`CE` / `PE`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// Call (`CE`).
    Call,
    /// Put (`PE`).
    Put,
    /// Anything else, kept verbatim.
    Unrecognized(String),
}

impl OptionType {
    /// Pricing kind, or `None` when the code was not recognised.
    #[must_use]
    pub const fn kind(&self) -> Option<OptionKind> {
        match self {
            Self::Call => Some(OptionKind::Call),
            Self::Put => Some(OptionKind::Put),
            Self::Unrecognized(_) => None,
        }
    }

    /// Wire code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Call => "CE",
            Self::Put => "PE",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Check if this is a known option type.
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<&str> for OptionType {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("CE") {
            Self::Call
        } else if trimmed.eq_ignore_ascii_case("PE") {
            Self::Put
        } else {
            Self::Unrecognized(value.to_string())
        }
    }
}

impl From<OptionKind> for OptionType {
    fn from(kind: OptionKind) -> Self {
        match kind {
            OptionKind::Call => Self::Call,
            OptionKind::Put => Self::Put,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OptionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OptionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

// ============================================================================
// Transaction Type
// ============================================================================

/// Direction of a leg.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Bought (`B` / `BUY`).
    Buy,
    /// Sold (`S` / `SELL`).
    Sell,
    /// Anything else, kept verbatim.
    Unrecognized(String),
}

impl TransactionType {
    /// Sign applied to the per-unit P&L, or `None` when unrecognised.
    #[must_use]
    pub const fn sign(&self) -> Option<f64> {
        match self {
            Self::Buy => Some(1.0),
            Self::Sell => Some(-1.0),
            Self::Unrecognized(_) => None,
        }
    }

    /// Wire code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Buy => "B",
            Self::Sell => "S",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Check if this is a known direction.
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<&str> for TransactionType {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("B") || trimmed.eq_ignore_ascii_case("BUY") {
            Self::Buy
        } else if trimmed.eq_ignore_ascii_case("S") || trimmed.eq_ignore_ascii_case("SELL") {
            Self::Sell
        } else {
            Self::Unrecognized(value.to_string())
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransactionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

// ============================================================================
// Volatility Key
// ============================================================================

/// Identity of a per-leg volatility estimate: strike (in cents) plus kind.
///
/// Ordering is by strike, then calls before puts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VolatilityKey {
    strike_cents: i64,
    kind: OptionKind,
}

impl VolatilityKey {
    /// Create a key from a strike and option kind.
    #[must_use]
    pub fn new(strike: f64, kind: OptionKind) -> Self {
        Self {
            strike_cents: (strike * 100.0).round() as i64,
            kind,
        }
    }

    /// Strike price.
    #[must_use]
    pub fn strike(&self) -> f64 {
        self.strike_cents as f64 / 100.0
    }

    /// Option kind.
    #[must_use]
    pub const fn kind(&self) -> OptionKind {
        self.kind
    }
}

impl fmt::Display for VolatilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}_{}", self.strike(), self.kind.code())
    }
}

// ============================================================================
// Option Leg
// ============================================================================

/// One option contract within a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionLeg {
    option_type: OptionType,
    transaction_type: TransactionType,
    strike: f64,
    #[serde(alias = "ltp")]
    premium: f64,
    quantity: u32,
}

impl OptionLeg {
    /// Create a new leg.
    #[must_use]
    pub const fn new(
        option_type: OptionType,
        transaction_type: TransactionType,
        strike: f64,
        premium: f64,
        quantity: u32,
    ) -> Self {
        Self {
            option_type,
            transaction_type,
            strike,
            premium,
            quantity,
        }
    }

    /// Create a bought leg.
    #[must_use]
    pub fn buy(kind: OptionKind, strike: f64, premium: f64, quantity: u32) -> Self {
        Self::new(kind.into(), TransactionType::Buy, strike, premium, quantity)
    }

    /// Create a sold leg.
    #[must_use]
    pub fn sell(kind: OptionKind, strike: f64, premium: f64, quantity: u32) -> Self {
        Self::new(kind.into(), TransactionType::Sell, strike, premium, quantity)
    }

    /// Get the option type.
    #[must_use]
    pub const fn option_type(&self) -> &OptionType {
        &self.option_type
    }

    /// Get the transaction type.
    #[must_use]
    pub const fn transaction_type(&self) -> &TransactionType {
        &self.transaction_type
    }

    /// Get the strike.
    #[must_use]
    pub const fn strike(&self) -> f64 {
        self.strike
    }

    /// Get the premium (last traded price).
    #[must_use]
    pub const fn premium(&self) -> f64 {
        self.premium
    }

    /// Get the quantity.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Volatility key for this leg, if its option type is recognised.
    #[must_use]
    pub fn volatility_key(&self) -> Option<VolatilityKey> {
        self.option_type
            .kind()
            .map(|kind| VolatilityKey::new(self.strike, kind))
    }

    /// Name of the first field holding an unrecognised code, with its raw value.
    #[must_use]
    pub fn unrecognized_field(&self) -> Option<(&'static str, &str)> {
        if !self.option_type.is_recognized() {
            return Some(("optionType", self.option_type.as_str()));
        }
        if !self.transaction_type.is_recognized() {
            return Some(("transactionType", self.transaction_type.as_str()));
        }
        None
    }
}

// ============================================================================
// Pricing Context
// ============================================================================

/// Market inputs shared by every leg of a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingContext {
    /// Current underlying price.
    pub spot: f64,
    /// Time to expiry in years.
    pub time_to_expiry: f64,
    /// Annualized risk-free rate.
    pub risk_free_rate: f64,
}

// ============================================================================
// Position
// ============================================================================

/// A multi-leg option position on one underlying and expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    symbol: String,
    expiry: String,
    context: PricingContext,
    legs: Vec<OptionLeg>,
}

impl Position {
    /// Create a position from spot, time to expiry (years), and rate.
    #[must_use]
    pub fn new(spot: f64, time_to_expiry: f64, risk_free_rate: f64, legs: Vec<OptionLeg>) -> Self {
        Self {
            symbol: String::new(),
            expiry: String::new(),
            context: PricingContext {
                spot,
                time_to_expiry,
                risk_free_rate,
            },
            legs,
        }
    }

    /// Create a position from a day count.
    #[must_use]
    pub fn from_days(
        spot: f64,
        days_to_expiry: f64,
        days_per_year: f64,
        risk_free_rate: f64,
        legs: Vec<OptionLeg>,
    ) -> Self {
        Self::new(spot, days_to_expiry / days_per_year, risk_free_rate, legs)
    }

    /// Attach descriptive metadata.
    #[must_use]
    pub fn with_metadata(mut self, symbol: impl Into<String>, expiry: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self.expiry = expiry.into();
        self
    }

    /// Underlying symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Expiry label.
    #[must_use]
    pub fn expiry(&self) -> &str {
        &self.expiry
    }

    /// Current underlying price.
    #[must_use]
    pub const fn spot(&self) -> f64 {
        self.context.spot
    }

    /// Time to expiry in years.
    #[must_use]
    pub const fn time_to_expiry(&self) -> f64 {
        self.context.time_to_expiry
    }

    /// Risk-free rate.
    #[must_use]
    pub const fn risk_free_rate(&self) -> f64 {
        self.context.risk_free_rate
    }

    /// Market inputs shared by all legs.
    #[must_use]
    pub const fn pricing_context(&self) -> &PricingContext {
        &self.context
    }

    /// Legs in request order.
    #[must_use]
    pub fn legs(&self) -> &[OptionLeg] {
        &self.legs
    }

    /// First leg carrying an unrecognised code: `(index, field, raw value)`.
    #[must_use]
    pub fn first_unrecognized_leg(&self) -> Option<(usize, &'static str, &str)> {
        self.legs.iter().enumerate().find_map(|(index, leg)| {
            leg.unrecognized_field()
                .map(|(field, raw)| (index, field, raw))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_type_parses_exchange_codes() {
        assert_eq!(OptionType::from("CE"), OptionType::Call);
        assert_eq!(OptionType::from("pe"), OptionType::Put);
        assert_eq!(OptionType::from(" ce "), OptionType::Call);
        assert_eq!(
            OptionType::from("FUT"),
            OptionType::Unrecognized("FUT".to_string())
        );
    }

    #[test]
    fn option_type_kind() {
        assert_eq!(OptionType::Call.kind(), Some(OptionKind::Call));
        assert_eq!(OptionType::Put.kind(), Some(OptionKind::Put));
        assert_eq!(OptionType::Unrecognized("X".into()).kind(), None);
        assert!(!OptionType::Unrecognized("X".into()).is_recognized());
    }

    #[test]
    fn transaction_type_accepts_short_and_long_forms() {
        assert_eq!(TransactionType::from("B"), TransactionType::Buy);
        assert_eq!(TransactionType::from("buy"), TransactionType::Buy);
        assert_eq!(TransactionType::from("S"), TransactionType::Sell);
        assert_eq!(TransactionType::from("Sell"), TransactionType::Sell);
        assert_eq!(
            TransactionType::from("HOLD"),
            TransactionType::Unrecognized("HOLD".to_string())
        );
    }

    #[test]
    fn transaction_type_sign() {
        assert_eq!(TransactionType::Buy.sign(), Some(1.0));
        assert_eq!(TransactionType::Sell.sign(), Some(-1.0));
        assert_eq!(TransactionType::Unrecognized("X".into()).sign(), None);
        assert!(!TransactionType::Unrecognized("X".into()).is_recognized());
    }

    #[test]
    fn unknown_direction_is_reported_as_transaction_type() {
        let leg = OptionLeg::new(
            OptionType::Put,
            TransactionType::from("HOLD"),
            22500.0,
            300.0,
            75,
        );

        assert_eq!(leg.unrecognized_field(), Some(("transactionType", "HOLD")));
        assert!(leg.volatility_key().is_some());
    }

    #[test]
    fn volatility_key_display_and_order() {
        let call = VolatilityKey::new(22950.0, OptionKind::Call);
        let put = VolatilityKey::new(22950.0, OptionKind::Put);
        let lower = VolatilityKey::new(22900.0, OptionKind::Put);

        assert_eq!(call.to_string(), "22950_CE");
        assert_eq!(put.to_string(), "22950_PE");
        assert!(lower < call);
        assert!(call < put);
        assert_eq!(call.strike(), 22950.0);
    }

    #[test]
    fn volatility_key_normalises_strike_to_cents() {
        assert_eq!(
            VolatilityKey::new(100.004, OptionKind::Call),
            VolatilityKey::new(100.0, OptionKind::Call)
        );
        assert_ne!(
            VolatilityKey::new(100.5, OptionKind::Call),
            VolatilityKey::new(100.0, OptionKind::Call)
        );
    }

    #[test]
    fn leg_deserializes_wire_aliases() {
        let json = r#"{"optionType":"ce","transactionType":"BUY","strike":22950,"ltp":154.7,"quantity":75}"#;
        let leg: OptionLeg = match serde_json::from_str(json) {
            Ok(leg) => leg,
            Err(e) => panic!("leg should deserialize: {e}"),
        };

        assert_eq!(leg, OptionLeg::buy(OptionKind::Call, 22950.0, 154.7, 75));
    }

    #[test]
    fn leg_keeps_unrecognized_codes() {
        let json = r#"{"optionType":"XX","transactionType":"S","strike":100,"premium":1.5,"quantity":1}"#;
        let leg: OptionLeg = match serde_json::from_str(json) {
            Ok(leg) => leg,
            Err(e) => panic!("leg should deserialize: {e}"),
        };

        assert_eq!(leg.option_type(), &OptionType::Unrecognized("XX".to_string()));
        assert_eq!(leg.volatility_key(), None);
        assert_eq!(leg.unrecognized_field(), Some(("optionType", "XX")));
    }

    #[test]
    fn leg_serializes_exchange_codes() {
        let leg = OptionLeg::sell(OptionKind::Put, 22900.0, 145.5, 75);
        let value = match serde_json::to_value(&leg) {
            Ok(value) => value,
            Err(e) => panic!("leg should serialize: {e}"),
        };

        assert_eq!(value["optionType"], "PE");
        assert_eq!(value["transactionType"], "S");
        assert_eq!(value["premium"], 145.5);
    }

    #[test]
    fn position_from_days() {
        let position = Position::from_days(22913.15, 8.0, 365.0, 0.065, vec![])
            .with_metadata("NIFTY", "2024-03-28");

        assert!((position.time_to_expiry() - 8.0 / 365.0).abs() < 1e-15);
        assert_eq!(position.symbol(), "NIFTY");
        assert_eq!(position.expiry(), "2024-03-28");
        assert_eq!(position.pricing_context().spot, 22913.15);
    }

    #[test]
    fn position_finds_first_unrecognized_leg() {
        let legs = vec![
            OptionLeg::buy(OptionKind::Call, 100.0, 2.0, 1),
            OptionLeg::new(
                OptionType::Put,
                TransactionType::Unrecognized("HOLD".into()),
                95.0,
                1.0,
                1,
            ),
        ];
        let position = Position::new(100.0, 0.1, 0.05, legs);

        assert_eq!(
            position.first_unrecognized_leg(),
            Some((1, "transactionType", "HOLD"))
        );
    }
}
