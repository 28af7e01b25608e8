use bourse_core::Price;
use rust_decimal::Decimal;

/// Simple moving average of `prices`
pub fn sma(prices: &[Price]) -> Option<Price> {
    if prices.is_empty() {
        return None;
    }
    let sum: Decimal = prices.iter().copied().sum();
    Some(sum / Decimal::from(prices.len()))
}

/// Simple moving average of the last `window` prices.
///
/// `None` when the history is shorter than the window; exactly `window`
/// entries are enough.
pub fn trailing_sma(history: &[Price], window: usize) -> Option<Price> {
    if window == 0 || history.len() < window {
        return None;
    }
    sma(&history[history.len() - window..])
}
