//! Capability probing over the engine object model
//!
//! - `resolver`: locate types and members by candidate name
//! - `invoke`: the four guarded primitives every engine interaction goes through
//! - `job`: run an engine job whose execute method name is unknown

pub mod invoke;
pub mod job;
pub mod resolver;

pub use invoke::{Invoker, ProbeError};
pub use job::{ExecutableJob, JobStatus, ProbedJob, EXECUTE_METHODS};
pub use resolver::CapabilityResolver;
