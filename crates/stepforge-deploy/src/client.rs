use crate::DeployResult;
use serde::{Deserialize, Serialize};
use stepforge_asl::FieldMap;

/// Returned by `start_execution`. The builder never looks inside.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionHandle {
    pub execution_arn: String,
    pub start_date: Option<String>,
}

impl ExecutionHandle {
    /// Trailing segment of the execution ARN.
    pub fn execution_id(&self) -> &str {
        self.execution_arn
            .rsplit(':')
            .next()
            .unwrap_or(self.execution_arn.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartExecutionRequest {
    pub state_machine_arn: String,
    /// JSON document passed as execution input.
    pub input: Option<String>,
    pub name: Option<String>,
}

/// Remote side of a state machine deployment.
///
/// Requests and responses use the service's camelCase field names, as built
/// by `StateMachine::create_request` and `StateMachine::update_request`.
#[async_trait::async_trait]
pub trait StateMachineClient: Send + Sync {
    /// Returns `DeployError::NotFound` when no machine has this ARN.
    async fn describe(&self, state_machine_arn: &str) -> DeployResult<FieldMap>;

    async fn create(&self, request: FieldMap) -> DeployResult<FieldMap>;

    async fn update(&self, request: FieldMap) -> DeployResult<FieldMap>;

    async fn delete(&self, state_machine_arn: &str) -> DeployResult<()>;

    async fn start_execution(&self, request: StartExecutionRequest)
    -> DeployResult<ExecutionHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_id_expected_last_arn_segment() {
        let handle = ExecutionHandle {
            execution_arn: "arn:aws:states:us-east-1:111122223333:execution:orders:run-7"
                .to_string(),
            start_date: None,
        };
        assert_eq!(handle.execution_id(), "run-7");
    }
}
