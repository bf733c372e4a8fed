//! Infrastructure layer: configuration, Postgres wiring, retries, read-model
//! stores and the query handlers built on them.

pub mod config;
pub mod db;
pub mod queries;
pub mod read_model;
pub mod retry;
