mod account;
mod ids;
mod side;

pub use account::{Account, AssetHistory, AssetPoint};
pub use ids::{AccountId, InstrumentCode};
pub use side::Side;
