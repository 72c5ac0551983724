//! Document store for normalized forecast records.
//!
//! One document per forecast timestamp. Writers upsert, readers (the web
//! front end, the `show` command) list in timestamp order.

pub mod backend;
pub mod memory;
pub mod record;
pub mod sqlite;

pub use backend::{ForecastStore, StoreError, StoreResult, UpsertOutcome};
pub use memory::MemoryForecastStore;
pub use record::StoredRecord;
pub use sqlite::SqliteForecastStore;
