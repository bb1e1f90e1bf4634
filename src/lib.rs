//! Personal task manager: a SQLite-backed task store with validation, date
//! buckets, search, dashboard aggregation and bulk edits, exposed through
//! the string-typed [`shell::App`] facade.

pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod output;
pub mod service;
pub mod shell;
pub mod store;
pub mod usecase;
pub mod validate;

pub use error::{Error, Result};
