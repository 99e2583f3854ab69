//! Domain Layer
//!
//! Option legs, positions, and their expiry payoff. Nothing in here performs
//! I/O or randomness.

pub mod payoff;
pub mod position;

pub use payoff::{leg_pnl, position_payoff};
pub use position::{
    OptionLeg, OptionType, Position, PricingContext, TransactionType, VolatilityKey,
};
