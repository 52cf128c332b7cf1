//! FTS Adapter - capability-probing bridge to an installed full-text search engine
//!
//! Library modules for hosts that drive the engine through its dynamic
//! object model without knowing its exact API version

pub mod adapter;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod indexing;
pub mod outcome;
pub mod probe;
pub mod search;

pub use adapter::{Capabilities, EngineAdapter};
pub use config::{AdapterConfig, AdapterError, DefaultsHandle, EngineDefaults};
pub use indexing::{IndexRequest, IndexSource};
pub use outcome::OperationOutcome;
pub use search::{SearchHit, SearchOptions, SearchOutcome, SearchRequest};
