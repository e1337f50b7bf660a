//! Inventory Module
//! Mission: Catalog items, stock levels and the invariants guarding them

pub mod api;
pub mod models;
pub mod store;

pub use models::Sweet;
pub use store::SweetStore;
