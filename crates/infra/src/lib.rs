//! Infrastructure layer: in-memory storage adapters and the analytics service facade.

pub mod read_model;
pub mod service;


pub use read_model::InMemoryWarehouse;
pub use service::AnalyticsService;
