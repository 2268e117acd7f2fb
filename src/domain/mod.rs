//! Domain aggregates exposed by the lead service layer.

pub mod auth;
pub mod lead;
pub mod query;
pub mod types;
