use crate::client::{ExecutionHandle, StartExecutionRequest, StateMachineClient};
use crate::machine::AwsTarget;
use crate::{DeployError, DeployResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use stepforge_asl::FieldMap;

const POISONED: &str = "memory state machine client mutex poisoned";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionRecord {
    pub execution_arn: String,
    pub state_machine_arn: String,
    pub input: Option<String>,
}

#[derive(Clone, Debug, Default)]
struct StoredMachine {
    request: FieldMap,
    revision: u64,
}

#[derive(Debug, Default)]
struct MemoryState {
    machines: BTreeMap<String, StoredMachine>,
    executions: BTreeMap<String, ExecutionRecord>,
}

/// In-process `StateMachineClient` keyed by state machine ARN.
#[derive(Clone, Debug)]
pub struct MemoryStateMachineClient {
    target: AwsTarget,
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStateMachineClient {
    pub fn new(target: AwsTarget) -> Self {
        Self {
            target,
            inner: Arc::new(Mutex::new(MemoryState::default())),
        }
    }

    pub fn target(&self) -> &AwsTarget {
        &self.target
    }

    fn state(&self) -> DeployResult<MutexGuard<'_, MemoryState>> {
        self.inner
            .lock()
            .map_err(|_| DeployError::Backend(POISONED.to_string()))
    }

    /// Last create or update request stored for `state_machine_arn`.
    pub fn stored_request(&self, state_machine_arn: &str) -> DeployResult<Option<FieldMap>> {
        Ok(self
            .state()?
            .machines
            .get(state_machine_arn)
            .map(|machine| machine.request.clone()))
    }

    pub fn state_machine_arns(&self) -> DeployResult<Vec<String>> {
        Ok(self.state()?.machines.keys().cloned().collect())
    }

    pub fn executions(&self) -> DeployResult<Vec<ExecutionRecord>> {
        Ok(self.state()?.executions.values().cloned().collect())
    }
}

fn required_string(request: &FieldMap, key: &str) -> DeployResult<String> {
    request
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DeployError::InvalidInput(format!("request is missing '{key}'")))
}

fn not_found(arn: &str) -> DeployError {
    DeployError::NotFound {
        resource: "state machine",
        id: arn.to_string(),
    }
}

#[async_trait::async_trait]
impl StateMachineClient for MemoryStateMachineClient {
    async fn describe(&self, state_machine_arn: &str) -> DeployResult<FieldMap> {
        let state = self.state()?;
        let machine = state
            .machines
            .get(state_machine_arn)
            .ok_or_else(|| not_found(state_machine_arn))?;
        let mut description = FieldMap::new();
        description.insert(
            "stateMachineArn".to_string(),
            Value::String(state_machine_arn.to_string()),
        );
        description.extend(
            machine
                .request
                .iter()
                .filter(|(key, _)| key.as_str() != "stateMachineArn")
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        description.insert("revision".to_string(), Value::from(machine.revision));
        Ok(description)
    }

    async fn create(&self, request: FieldMap) -> DeployResult<FieldMap> {
        let name = required_string(&request, "name")?;
        required_string(&request, "definition")?;
        let arn = self.target.state_machine_arn(&name);

        let mut state = self.state()?;
        if state.machines.contains_key(&arn) {
            return Err(DeployError::Conflict(format!(
                "state machine '{arn}' already exists"
            )));
        }
        state.machines.insert(
            arn.clone(),
            StoredMachine {
                request,
                revision: 1,
            },
        );

        let mut response = FieldMap::new();
        response.insert("stateMachineArn".to_string(), Value::String(arn));
        Ok(response)
    }

    async fn update(&self, request: FieldMap) -> DeployResult<FieldMap> {
        let arn = required_string(&request, "stateMachineArn")?;
        let mut state = self.state()?;
        let machine = state.machines.get_mut(&arn).ok_or_else(|| not_found(&arn))?;
        for (key, value) in request {
            if key != "stateMachineArn" {
                machine.request.insert(key, value);
            }
        }
        machine.revision += 1;

        let mut response = FieldMap::new();
        response.insert("stateMachineArn".to_string(), Value::String(arn));
        response.insert("revision".to_string(), Value::from(machine.revision));
        Ok(response)
    }

    async fn delete(&self, state_machine_arn: &str) -> DeployResult<()> {
        let mut state = self.state()?;
        state
            .machines
            .remove(state_machine_arn)
            .ok_or_else(|| not_found(state_machine_arn))?;
        Ok(())
    }

    async fn start_execution(
        &self,
        request: StartExecutionRequest,
    ) -> DeployResult<ExecutionHandle> {
        if let Some(input) = &request.input {
            serde_json::from_str::<Value>(input)
                .map_err(|error| DeployError::InvalidInput(format!("input is not JSON: {error}")))?;
        }

        let mut state = self.state()?;
        let machine = state
            .machines
            .get(&request.state_machine_arn)
            .ok_or_else(|| not_found(&request.state_machine_arn))?;
        let machine_name = required_string(&machine.request, "name")?;
        let execution_name = request
            .name
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let execution_arn = self.target.execution_arn(&machine_name, &execution_name);
        if state.executions.contains_key(&execution_arn) {
            return Err(DeployError::Conflict(format!(
                "execution '{execution_arn}' already exists"
            )));
        }

        state.executions.insert(
            execution_arn.clone(),
            ExecutionRecord {
                execution_arn: execution_arn.clone(),
                state_machine_arn: request.state_machine_arn,
                input: request.input,
            },
        );
        Ok(ExecutionHandle {
            execution_arn,
            start_date: None,
        })
    }
}
