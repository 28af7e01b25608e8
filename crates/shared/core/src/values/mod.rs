use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Cash balances and asset values
pub type Money = Decimal;

/// Whole share count. Unsigned, so negative orders cannot be expressed.
pub type Quantity = u64;

/// Simulation clock value (number of ticks executed since the clock started)
pub type Tick = u64;

/// Decimal places kept on every price after a shock
pub const PRICE_DP: u32 = 4;

/// Lowest price a sell-side shock can push an instrument to
pub const PRICE_FLOOR: Price = dec!(0.01);

/// Round a price to [`PRICE_DP`] places, half away from zero
pub fn round_price(price: Price) -> Price {
    price.round_dp_with_strategy(PRICE_DP, RoundingStrategy::MidpointAwayFromZero)
}
