pub mod api;
pub mod error;
pub mod models;
pub mod schema;
pub mod seed;
pub mod service;
pub mod store;
