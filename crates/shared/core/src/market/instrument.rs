use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MarketError;
use crate::entities::{InstrumentCode, Side};
use crate::values::{PRICE_FLOOR, Price, round_price};

/// A tradable instrument with its full price history
///
/// Invariant: `price_history` is never empty and its last element equals
/// `price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    code: InstrumentCode,
    price: Price,
    /// Maximum fractional price move per trade, in [0, 1)
    volatility: Decimal,
    price_history: Vec<Price>,
}

impl Instrument {
    /// Create an instrument whose history starts at `price`
    pub fn new(
        code: impl Into<InstrumentCode>,
        price: Price,
        volatility: Decimal,
    ) -> Result<Self, MarketError> {
        let code = code.into();
        if code.as_str().trim().is_empty() {
            return Err(MarketError::InvalidInstrument {
                code: code.0,
                reason: "code must not be empty".to_string(),
            });
        }
        if price <= Decimal::ZERO {
            return Err(MarketError::InvalidInstrument {
                code: code.0,
                reason: format!("price must be positive, got {}", price),
            });
        }
        if volatility < Decimal::ZERO || volatility >= Decimal::ONE {
            return Err(MarketError::InvalidInstrument {
                code: code.0,
                reason: format!("volatility must be in [0, 1), got {}", volatility),
            });
        }

        Ok(Self {
            code,
            price,
            volatility,
            price_history: vec![price],
        })
    }

    pub fn code(&self) -> &InstrumentCode {
        &self.code
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn volatility(&self) -> Decimal {
        self.volatility
    }

    /// Every recorded price, oldest first (never empty)
    pub fn price_history(&self) -> &[Price] {
        &self.price_history
    }

    /// Move the price after a trade.
    ///
    /// `draw` is a uniform sample in [0, 1); the fractional move is
    /// `draw × volatility`, so `Δ = draw × volatility × price`. Buys push the
    /// price up by Δ, sells push it down, never below [`PRICE_FLOOR`]. The
    /// new price is appended to the history and returned.
    pub fn apply_shock(&mut self, side: Side, draw: Decimal) -> Price {
        let draw = draw.clamp(Decimal::ZERO, Decimal::ONE);
        let delta = draw * self.volatility * self.price;

        let next = match side {
            Side::Buy => round_price(self.price + delta),
            Side::Sell => {
                let lowered = round_price(self.price - delta);
                if lowered < PRICE_FLOOR {
                    PRICE_FLOOR.min(self.price)
                } else {
                    lowered
                }
            }
        };

        self.price = next;
        self.price_history.push(next);
        next
    }

    /// Append the current (possibly unchanged) price to the history
    pub fn record_close(&mut self) {
        self.price_history.push(self.price);
    }
}
