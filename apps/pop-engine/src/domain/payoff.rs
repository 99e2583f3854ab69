//! Expiry payoff of a position.
//!
//! Profit and loss at a terminal underlying price, with no fees or margin.
//! Legs with an unrecognised option type or direction contribute nothing.

use super::position::OptionLeg;
use crate::pricing::intrinsic_value;

/// Profit or loss of one leg if the underlying settles at `terminal_price`.
#[must_use]
pub fn leg_pnl(terminal_price: f64, leg: &OptionLeg) -> f64 {
    let (Some(kind), Some(sign)) = (leg.option_type().kind(), leg.transaction_type().sign())
    else {
        return 0.0;
    };

    let payoff = intrinsic_value(terminal_price, leg.strike(), kind);
    sign * (payoff - leg.premium()) * f64::from(leg.quantity())
}

/// Total profit or loss of the position at `terminal_price`.
#[must_use]
pub fn position_payoff(terminal_price: f64, legs: &[OptionLeg]) -> f64 {
    legs.iter().map(|leg| leg_pnl(terminal_price, leg)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{OptionType, TransactionType};
    use crate::pricing::OptionKind;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn long_call_pnl() {
        let leg = OptionLeg::buy(OptionKind::Call, 100.0, 5.0, 10);

        assert!(approx_eq(leg_pnl(90.0, &leg), -50.0));
        assert!(approx_eq(leg_pnl(105.0, &leg), 0.0));
        assert!(approx_eq(leg_pnl(120.0, &leg), 150.0));
    }

    #[test]
    fn short_put_pnl() {
        let leg = OptionLeg::sell(OptionKind::Put, 100.0, 4.0, 2);

        assert!(approx_eq(leg_pnl(110.0, &leg), 8.0));
        assert!(approx_eq(leg_pnl(96.0, &leg), 0.0));
        assert!(approx_eq(leg_pnl(80.0, &leg), -32.0));
    }

    #[test]
    fn unrecognized_legs_contribute_nothing() {
        let bad_type = OptionLeg::new(
            OptionType::Unrecognized("FUT".into()),
            TransactionType::Buy,
            100.0,
            5.0,
            1,
        );
        let bad_side = OptionLeg::new(
            OptionType::Call,
            TransactionType::Unrecognized("HOLD".into()),
            100.0,
            5.0,
            1,
        );

        assert_eq!(leg_pnl(150.0, &bad_type), 0.0);
        assert_eq!(leg_pnl(150.0, &bad_side), 0.0);
    }

    #[test]
    fn put_spread_payoff() {
        let legs = vec![
            OptionLeg::sell(OptionKind::Put, 22900.0, 145.5, 75),
            OptionLeg::buy(OptionKind::Put, 22850.0, 98.2, 75),
        ];
        let credit = (145.5 - 98.2) * 75.0;

        // Above the short strike both puts expire worthless
        assert!(approx_eq(position_payoff(23000.0, &legs), credit));
        // Below the long strike the loss is capped at width minus credit
        let max_loss = credit - 50.0 * 75.0;
        assert!(approx_eq(position_payoff(22000.0, &legs), max_loss));
        // Breakeven sits at short strike minus net credit
        assert!(approx_eq(position_payoff(22900.0 - 47.3, &legs), 0.0));
    }

    #[test]
    fn empty_position_is_flat() {
        assert_eq!(position_payoff(100.0, &[]), 0.0);
    }
}
