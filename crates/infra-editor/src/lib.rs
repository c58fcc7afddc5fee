pub mod error;
pub mod history;
pub mod store;

pub use error::StoreError;
pub use history::{HistoryEntry, HistoryLog};
pub use store::{GraphStore, Mutation, StoreConfig};
