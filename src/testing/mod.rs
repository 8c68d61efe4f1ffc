//! Testing utilities
//!
//! [`RecordingMessenger`] stands in for Telegram: it records every outbound
//! call and answers membership queries from a scripted table.

pub mod recorder;

pub use recorder::{Outbound, RecordingMessenger};
