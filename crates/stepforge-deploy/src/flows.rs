use crate::client::{ExecutionHandle, StartExecutionRequest, StateMachineClient};
use crate::machine::{AwsTarget, StateMachine};
use crate::{DeployError, DeployResult};
use serde_json::Value;
use stepforge_asl::{FieldMap, SerializeConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeployAction {
    Created,
    Updated,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeployOutcome {
    pub action: DeployAction,
    pub response: FieldMap,
}

/// Creates the state machine, or updates it in place when its ARN already
/// exists. The definition is serialized with `config` before any call.
pub async fn deploy<C>(
    client: &C,
    target: &AwsTarget,
    machine: &StateMachine,
    config: &SerializeConfig,
) -> DeployResult<DeployOutcome>
where
    C: StateMachineClient + ?Sized,
{
    let arn = machine.arn(target);
    let create_request = machine.create_request(config)?;

    let outcome = match client.describe(&arn).await {
        Ok(_) => {
            log::info!("updating state machine {arn}");
            let response = client
                .update(machine.update_request(target, config)?)
                .await?;
            DeployOutcome {
                action: DeployAction::Updated,
                response,
            }
        }
        Err(error) if error.is_not_found() => {
            log::info!("creating state machine {arn}");
            let response = client.create(create_request).await?;
            DeployOutcome {
                action: DeployAction::Created,
                response,
            }
        }
        Err(error) => return Err(error),
    };

    log::info!("console: {}", target.console_url(&machine.name));
    log::info!("visual editor: {}", target.visual_editor_url(&machine.name));
    Ok(outcome)
}

pub async fn execute<C>(
    client: &C,
    target: &AwsTarget,
    machine: &StateMachine,
    payload: Option<&Value>,
    name: Option<&str>,
) -> DeployResult<ExecutionHandle>
where
    C: StateMachineClient + ?Sized,
{
    let input = payload
        .map(serde_json::to_string)
        .transpose()
        .map_err(|error| DeployError::Serialization(error.to_string()))?;
    let request = StartExecutionRequest {
        state_machine_arn: machine.arn(target),
        input,
        name: name.map(str::to_string),
    };

    let handle = client.start_execution(request).await?;
    log::info!("started execution {}", handle.execution_arn);
    log::info!(
        "execution console: {}",
        target.execution_console_url(&machine.name, handle.execution_id())
    );
    Ok(handle)
}

pub async fn delete<C>(client: &C, target: &AwsTarget, machine: &StateMachine) -> DeployResult<()>
where
    C: StateMachineClient + ?Sized,
{
    let arn = machine.arn(target);
    client.delete(&arn).await?;
    log::info!("deleted state machine {arn}");
    Ok(())
}
