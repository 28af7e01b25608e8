//! Deterministic moving-average signals
//!
//! Every signal acts only on the flat ↔ positioned transition: it opens a
//! position when flat and closes it when something is held. All averages
//! are simple moving averages over the trailing window.

use bourse_core::{Price, Quantity, Side};

use crate::indicators::trailing_sma;

/// Short/long SMA crossover
///
/// - **Buy**: short SMA above long SMA while flat
/// - **Sell**: short SMA below long SMA while holding
pub fn crossover_signal(
    history: &[Price],
    holding: Quantity,
    short_window: usize,
    long_window: usize,
) -> Option<Side> {
    let short_ma = trailing_sma(history, short_window)?;
    let long_ma = trailing_sma(history, long_window)?;

    if short_ma > long_ma && holding == 0 {
        Some(Side::Buy)
    } else if short_ma < long_ma && holding > 0 {
        Some(Side::Sell)
    } else {
        None
    }
}

/// Price against its trailing average, buying strength
///
/// - **Buy**: price above SMA while flat
/// - **Sell**: price below SMA while holding
pub fn trend_signal(
    history: &[Price],
    price: Price,
    holding: Quantity,
    window: usize,
) -> Option<Side> {
    let average = trailing_sma(history, window)?;

    if price > average && holding == 0 {
        Some(Side::Buy)
    } else if price < average && holding > 0 {
        Some(Side::Sell)
    } else {
        None
    }
}

/// Mirror of [`trend_signal`], buying weakness
///
/// - **Buy**: price below SMA while flat
/// - **Sell**: price above SMA while holding
pub fn reversion_signal(
    history: &[Price],
    price: Price,
    holding: Quantity,
    window: usize,
) -> Option<Side> {
    let average = trailing_sma(history, window)?;

    if price < average && holding == 0 {
        Some(Side::Buy)
    } else if price > average && holding > 0 {
        Some(Side::Sell)
    } else {
        None
    }
}
