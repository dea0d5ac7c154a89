//! Offline-first fitness log data core
//!
//! Embedded local store for workout sessions and their per-exercise
//! detail, with the query layer the calendar, monthly KPI, and insight
//! chart views read through. Single logical writer; cascade and replace
//! sequences run as single transactions so the entity graph is never
//! observed half-written.

pub mod backup;
pub mod catalog;
pub mod db;
pub mod insights;
pub mod models;
pub mod schema;
pub mod seed;
pub mod sessions;
pub mod store;

#[cfg(test)]
mod test_utils;

pub use store::{Key, Store, StoreError};
