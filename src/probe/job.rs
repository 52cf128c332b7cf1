//! Job execution protocol
//!
//! Engine jobs are configured, then executed through whichever execute-like
//! method the installed engine version exposes.

use super::invoke::{Invoker, ProbeError};
use crate::config::AdapterError;
use crate::engine::{MemberKind, ObjectRef, Value};

/// Execute method names, in priority order
pub const EXECUTE_METHODS: [&str; 6] = ["Execute", "Run", "DoExecute", "DoJob", "Perform", "Start"];

/// Result of running a job
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    /// Ran and reported success (code 0)
    Completed,
    /// Ran and reported a nonzero code (or `false`, mapped to -1)
    Failed { code: i64 },
    /// No execute-like method on the job
    NotExecutable { type_name: String },
    /// The execute method faulted
    Faulted { cause: ProbeError },
}

impl JobStatus {
    pub fn ok(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }

    /// Status code: 0 on success, the engine's code on failure, -1 otherwise
    pub fn code(&self) -> i64 {
        match self {
            JobStatus::Completed => 0,
            JobStatus::Failed { code } => *code,
            JobStatus::NotExecutable { .. } | JobStatus::Faulted { .. } => -1,
        }
    }

    /// Interpret an execute method's return value
    pub fn from_return(value: &Value) -> Self {
        match value {
            Value::Int(0) | Value::Bool(true) => JobStatus::Completed,
            Value::Int(code) => JobStatus::Failed { code: *code },
            Value::Bool(false) => JobStatus::Failed { code: -1 },
            _ => JobStatus::Completed,
        }
    }

    /// The hard error this status represents, if any
    pub fn error(&self) -> Option<AdapterError> {
        match self {
            JobStatus::Completed => None,
            JobStatus::Failed { code } => Some(AdapterError::JobFailed { code: *code }),
            JobStatus::NotExecutable { type_name } => Some(AdapterError::JobNotExecutable {
                type_name: type_name.clone(),
            }),
            JobStatus::Faulted { cause } => Some(match cause {
                ProbeError::Fault { member, cause, .. } => AdapterError::EngineFault {
                    member: member.clone(),
                    cause: cause.clone(),
                },
                other => AdapterError::EngineFault {
                    member: "execute".to_string(),
                    cause: other.to_string(),
                },
            }),
        }
    }
}

/// A unit of engine work that can be run to completion
pub trait ExecutableJob {
    fn execute(&self) -> JobStatus;
}

/// Job whose execute method is discovered by probing
pub struct ProbedJob<'a> {
    invoker: Invoker<'a>,
    job: &'a ObjectRef,
}

impl<'a> ProbedJob<'a> {
    pub fn new(invoker: Invoker<'a>, job: &'a ObjectRef) -> Self {
        Self { invoker, job }
    }
}

impl ExecutableJob for ProbedJob<'_> {
    fn execute(&self) -> JobStatus {
        let Some(method) = self
            .invoker
            .resolver()
            .find_first_member(self.job.as_ref(), &EXECUTE_METHODS, MemberKind::Method)
        else {
            return JobStatus::NotExecutable {
                type_name: self.job.type_name().to_string(),
            };
        };

        tracing::debug!("executing {}.{}()", self.job.type_name(), method.name);
        match self.invoker.try_call_ret(self.job, &method.name, &[]) {
            Ok(value) => JobStatus::from_return(&value),
            Err(cause) => JobStatus::Faulted { cause },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DynObject, DynRuntime, EngineFault};
    use crate::probe::CapabilityResolver;

    fn resolver() -> CapabilityResolver {
        CapabilityResolver::new(DynRuntime::new(Vec::new(), Vec::new()), Vec::new())
    }

    fn run(job: ObjectRef) -> JobStatus {
        let resolver = resolver();
        ProbedJob::new(Invoker::new(&resolver), &job).execute()
    }

    #[test]
    fn test_return_value_interpretation() {
        assert_eq!(JobStatus::from_return(&Value::Int(0)), JobStatus::Completed);
        assert_eq!(JobStatus::from_return(&Value::Int(7)), JobStatus::Failed { code: 7 });
        assert_eq!(JobStatus::from_return(&Value::Bool(true)), JobStatus::Completed);
        assert_eq!(JobStatus::from_return(&Value::Bool(false)), JobStatus::Failed { code: -1 });
        assert_eq!(JobStatus::from_return(&Value::Null), JobStatus::Completed);
        assert_eq!(JobStatus::from_return(&Value::Str("done".into())), JobStatus::Completed);
    }

    #[test]
    fn test_priority_order() {
        let job = DynObject::builder("J")
            .method("Start", |_, _| Ok(Value::Int(5)))
            .method("Run", |_, _| Ok(Value::Int(0)))
            .build();
        assert_eq!(run(job), JobStatus::Completed);
    }

    #[test]
    fn test_missing_execute_is_hard_error() {
        let status = run(DynObject::builder("J").method("Cancel", |_, _| Ok(Value::Null)).build());
        assert!(!status.ok());
        assert_eq!(status.code(), -1);
        assert!(matches!(status.error(), Some(AdapterError::JobNotExecutable { .. })));
    }

    #[test]
    fn test_fault_maps_to_minus_one() {
        let status = run(
            DynObject::builder("J")
                .method("DoJob", |_, _| Err(EngineFault::new("license expired")))
                .build(),
        );
        assert_eq!(status.code(), -1);
        let err = status.error().unwrap().to_string();
        assert!(err.contains("license expired"));
    }
}
