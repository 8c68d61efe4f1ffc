//! Persistence of per-user gating state

pub mod store;

pub use store::{user_key, RecordStore, Store, StoreError, UserRecord};
