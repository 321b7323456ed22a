//! Deploys, executes and deletes state machines built with `stepforge-asl`.
//!
//! The remote service sits behind [`StateMachineClient`]; this crate only
//! shapes requests and sequences calls.

pub mod client;
pub mod errors;
pub mod flows;
pub mod machine;
pub mod memory;

pub use client::{ExecutionHandle, StartExecutionRequest, StateMachineClient};
pub use errors::{DeployError, DeployResult};
pub use flows::{DeployAction, DeployOutcome, delete, deploy, execute};
pub use machine::{AwsTarget, StateMachine, StateMachineType};
pub use memory::{ExecutionRecord, MemoryStateMachineClient};
