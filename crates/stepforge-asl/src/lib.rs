//! Builder and serializer for Amazon States Language workflow definitions.
//!
//! States are assembled into a `Workflow` graph through a cursor-driven
//! builder, validated, and emitted as canonical ASL JSON.

pub mod choice;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod fields;
pub mod ids;
pub mod lint;
pub mod object;
pub mod retry;
pub mod state;
pub mod workflow;

pub use choice::*;
pub use config::*;
pub use diagnostics::*;
pub use errors::*;
pub use fields::{ASL_FIELDS, ErrorCodeRegistry, ExpectedKind, FieldName, Operator, StateType, error_code};
pub use ids::*;
pub use lint::*;
pub use object::*;
pub use retry::*;
pub use state::*;
pub use workflow::*;
