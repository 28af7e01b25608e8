use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use super::{AccountId, InstrumentCode};
use crate::market::Market;
use crate::values::{Money, Quantity, Tick};

/// One (tick, total asset value) sample of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPoint {
    pub tick: Tick,
    pub value: Money,
}

/// Bounded asset-value history
///
/// Keeps the most recent `capacity` samples; pushing onto a full history
/// evicts the oldest sample first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetHistory {
    points: VecDeque<AssetPoint>,
    capacity: usize,
}

impl AssetHistory {
    /// Default number of samples retained per account
    pub const DEFAULT_CAPACITY: usize = 10_000;

    /// Create an empty history. A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, tick: Tick, value: Money) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(AssetPoint { tick, value });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<&AssetPoint> {
        self.points.back()
    }

    /// Samples oldest first
    pub fn iter(&self) -> impl Iterator<Item = &AssetPoint> {
        self.points.iter()
    }
}

impl Default for AssetHistory {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

/// An agent's cash, share holdings and asset-value history
///
/// Trading strategy is deliberately not part of the account; the engine
/// pairs each account with its strategy.
///
/// Invariants:
/// - `balance` is never reduced below zero by [`Account::debit`]
/// - holdings never contain a zero entry (absent means zero)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    balance: Money,
    holdings: BTreeMap<InstrumentCode, Quantity>,
    asset_history: AssetHistory,
}

impl Account {
    /// Create an account whose history is seeded with `(0, balance)`
    pub fn new(id: impl Into<AccountId>, balance: Money) -> Self {
        Self::with_history_capacity(id, balance, AssetHistory::DEFAULT_CAPACITY)
    }

    /// Create an account with a custom asset-history bound
    pub fn with_history_capacity(
        id: impl Into<AccountId>,
        balance: Money,
        capacity: usize,
    ) -> Self {
        let mut asset_history = AssetHistory::with_capacity(capacity);
        asset_history.push(0, balance);
        Self {
            id: id.into(),
            balance,
            holdings: BTreeMap::new(),
            asset_history,
        }
    }

    /// Attach previously persisted holdings. Zero quantities are ignored.
    pub fn with_holdings(
        mut self,
        holdings: impl IntoIterator<Item = (InstrumentCode, Quantity)>,
    ) -> Self {
        for (code, quantity) in holdings {
            self.add_holding(code, quantity);
        }
        self
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn holdings(&self) -> &BTreeMap<InstrumentCode, Quantity> {
        &self.holdings
    }

    /// Shares held of `code` (zero when absent)
    pub fn holding(&self, code: &str) -> Quantity {
        self.holdings.get(code).copied().unwrap_or_default()
    }

    pub fn asset_history(&self) -> &AssetHistory {
        &self.asset_history
    }

    pub fn can_afford(&self, cost: Money) -> bool {
        self.balance >= cost
    }

    /// Account is insolvent once its cash is at or below zero
    pub fn is_bankrupt(&self) -> bool {
        self.balance <= Decimal::ZERO
    }

    pub fn credit(&mut self, amount: Money) {
        self.balance += amount;
    }

    /// Withdraw `amount`. Returns false and leaves the balance untouched
    /// when the balance does not cover it.
    pub fn debit(&mut self, amount: Money) -> bool {
        if !self.can_afford(amount) {
            return false;
        }
        self.balance -= amount;
        true
    }

    /// Add shares of `code`. Returns the new holding.
    pub fn add_holding(&mut self, code: InstrumentCode, quantity: Quantity) -> Quantity {
        if quantity == 0 {
            return self.holding(code.as_str());
        }
        let held = self.holdings.entry(code).or_default();
        *held += quantity;
        *held
    }

    /// Remove shares of `code`. Returns the remaining holding, or `None`
    /// (with nothing changed) when fewer than `quantity` shares are held.
    pub fn remove_holding(&mut self, code: &str, quantity: Quantity) -> Option<Quantity> {
        let held = self.holding(code);
        if held < quantity {
            return None;
        }
        let remaining = held - quantity;
        if remaining == 0 {
            self.holdings.remove(code);
        } else if let Some(entry) = self.holdings.get_mut(code) {
            *entry = remaining;
        }
        Some(remaining)
    }

    /// Drop the whole holding of `code`, returning how many shares it had
    pub fn take_holding(&mut self, code: &str) -> Quantity {
        self.holdings.remove(code).unwrap_or_default()
    }

    /// `balance + Σ holdings[code] × price[code]`
    ///
    /// Holdings of instruments missing from the market contribute nothing;
    /// instrument removal liquidates holders, so this only happens for
    /// accounts built from inconsistent storage.
    pub fn total_asset_value(&self, market: &Market) -> Money {
        self.holdings
            .iter()
            .filter_map(|(code, quantity)| {
                market
                    .price(code.as_str())
                    .map(|price| price * Decimal::from(*quantity))
            })
            .fold(self.balance, |total, value| total + value)
    }

    /// Append `(tick, total asset value)` to the bounded history
    pub fn record_asset_value(&mut self, tick: Tick, market: &Market) -> Money {
        let value = self.total_asset_value(market);
        self.asset_history.push(tick, value);
        value
    }
}
