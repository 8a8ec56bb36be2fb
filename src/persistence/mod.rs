//! Progression persistence
//!
//! Features:
//! - Logical save schema (`ProgressionState`)
//! - Pluggable stores behind `ProgressionStore`
//! - JSON file store with tmp-file swap on write
//! - Read failures degrade to default progression

pub mod state;
pub mod store;

pub use state::ProgressionState;
pub use store::{JsonFileStore, MemoryStore, PersistError, ProgressionStore, load_or_default};
