//! Catalog loading and queries.

pub mod catalog;
pub mod query_handlers;
