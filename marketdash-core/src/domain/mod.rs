//! Domain types for the market dashboard

pub mod horizon;
pub mod reading;
pub mod snapshot;
pub mod ticker;

pub use horizon::Horizon;
pub use reading::{Missing, Reading};
pub use snapshot::QuoteSnapshot;
pub use ticker::{Category, ChangeUnit, TickerSpec};
