//! Service layer for the research portal.
//! - `store` keeps every collection in memory and persists snapshots through `storage`.
//! - `flusher` runs the periodic flush.
//! - Business rules (auth, articles, understanding, config, push) sit on top of the store.

pub mod errors;
pub mod auth;
pub mod flusher;
pub mod push;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod store;
pub mod uploads;
