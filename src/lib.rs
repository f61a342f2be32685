pub mod config;
pub mod error;
pub mod events;
pub mod feeds;
pub mod projection;
pub mod state;
pub mod store;

pub use error::{Error, OrderingViolation, Result};
pub use projection::{Outcome, Projector, ProjectorStats};
pub use store::{MemoryStore, Store};
