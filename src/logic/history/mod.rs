//! History Module - past scans fetched from `/api/history`

pub mod types;
pub mod view;

pub use types::HistoryEntry;
pub use view::{HistoryView, VerdictFilter};
