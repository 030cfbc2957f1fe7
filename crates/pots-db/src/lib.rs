//! PostgreSQL persistence for the garden backend: connection config, pool and
//! migrations, row models, and one query module per table.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
