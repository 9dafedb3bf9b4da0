//! Storage adapters implementing the snapshot and quantity seams.

pub mod warehouse_store;

pub use warehouse_store::InMemoryWarehouse;
