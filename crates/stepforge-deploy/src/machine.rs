use crate::{DeployError, DeployResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use stepforge_asl::{AslError, AslObject, AslResult, FieldMap, FieldName, SerializeConfig, Workflow};

const NAME: FieldName = FieldName {
    attr: "name",
    wire: "name",
};
const DEFINITION: FieldName = FieldName {
    attr: "definition",
    wire: "definition",
};
const ROLE_ARN: FieldName = FieldName {
    attr: "role_arn",
    wire: "roleArn",
};
const MACHINE_TYPE: FieldName = FieldName {
    attr: "machine_type",
    wire: "type",
};
const LOGGING_CONFIGURATION: FieldName = FieldName {
    attr: "logging_configuration",
    wire: "loggingConfiguration",
};
const TRACING_CONFIGURATION: FieldName = FieldName {
    attr: "tracing_configuration",
    wire: "tracingConfiguration",
};
const TAGS: FieldName = FieldName {
    attr: "tags",
    wire: "tags",
};
const STATE_MACHINE_ARN: &str = "stateMachineArn";

const MACHINE_FIELDS: &[FieldName] = &[
    NAME,
    DEFINITION,
    ROLE_ARN,
    MACHINE_TYPE,
    LOGGING_CONFIGURATION,
    TRACING_CONFIGURATION,
    TAGS,
];

/// Longest state machine name the service accepts.
pub const MAX_NAME_LENGTH: usize = 80;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StateMachineType {
    #[default]
    Standard,
    Express,
}

impl StateMachineType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Express => "EXPRESS",
        }
    }
}

impl fmt::Display for StateMachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Region and account a state machine lives in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsTarget {
    pub region: String,
    pub account_id: String,
}

impl AwsTarget {
    pub fn new(region: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            account_id: account_id.into(),
        }
    }

    pub fn state_machine_arn(&self, name: &str) -> String {
        format!(
            "arn:aws:states:{}:{}:stateMachine:{name}",
            self.region, self.account_id
        )
    }

    pub fn execution_arn(&self, name: &str, execution_id: &str) -> String {
        format!(
            "arn:aws:states:{}:{}:execution:{name}:{execution_id}",
            self.region, self.account_id
        )
    }

    fn console_home(&self) -> String {
        format!(
            "https://{region}.console.aws.amazon.com/states/home?region={region}",
            region = self.region
        )
    }

    pub fn console_url(&self, name: &str) -> String {
        format!(
            "{}#/statemachines/view/{}",
            self.console_home(),
            self.state_machine_arn(name)
        )
    }

    pub fn visual_editor_url(&self, name: &str) -> String {
        format!(
            "{}#/visual-editor?stateMachineArn={}",
            self.console_home(),
            self.state_machine_arn(name)
        )
    }

    pub fn execution_console_url(&self, name: &str, execution_id: &str) -> String {
        format!(
            "{}#/executions/details/{}",
            self.console_home(),
            self.execution_arn(name, execution_id)
        )
    }
}

/// A deployable state machine: the workflow plus the service-side settings.
#[derive(Clone, Debug, PartialEq)]
pub struct StateMachine {
    pub name: String,
    pub workflow: Workflow,
    pub role_arn: String,
    pub machine_type: StateMachineType,
    pub tags: BTreeMap<String, String>,
    pub logging_configuration: Option<Value>,
    pub tracing_configuration: Option<Value>,
}

impl StateMachine {
    pub fn new(name: impl Into<String>, workflow: Workflow, role_arn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            workflow,
            role_arn: role_arn.into(),
            machine_type: StateMachineType::default(),
            tags: BTreeMap::new(),
            logging_configuration: None,
            tracing_configuration: None,
        }
    }

    pub fn with_type(mut self, machine_type: StateMachineType) -> Self {
        self.machine_type = machine_type;
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_logging_configuration(mut self, configuration: Value) -> Self {
        self.logging_configuration = Some(configuration);
        self
    }

    pub fn with_tracing_configuration(mut self, configuration: Value) -> Self {
        self.tracing_configuration = Some(configuration);
        self
    }

    pub fn arn(&self, target: &AwsTarget) -> String {
        target.state_machine_arn(&self.name)
    }

    /// Compact ASL JSON, as the service expects in `definition`.
    pub fn definition(&self, config: &SerializeConfig) -> DeployResult<String> {
        let data = self.workflow.serialize_with(config)?;
        serde_json::to_string(&Value::Object(data))
            .map_err(|error| DeployError::Serialization(error.to_string()))
    }

    /// Body of a create call: settings, `definition` and `tags` as
    /// `[{"key": .., "value": ..}]`.
    pub fn create_request(&self, config: &SerializeConfig) -> DeployResult<FieldMap> {
        let mut request = self.serialize_with(config)?;
        request.insert(
            DEFINITION.wire.to_string(),
            Value::String(self.definition(config)?),
        );
        if !self.tags.is_empty() {
            let tags = self
                .tags
                .iter()
                .map(|(key, value)| serde_json::json!({"key": key, "value": value}))
                .collect();
            request.insert(TAGS.wire.to_string(), Value::Array(tags));
        }
        Ok(request)
    }

    /// Body of an update call. Name, type and tags cannot change in place.
    pub fn update_request(
        &self,
        target: &AwsTarget,
        config: &SerializeConfig,
    ) -> DeployResult<FieldMap> {
        let mut settings = self.serialize_with(config)?;
        settings.remove(NAME.wire);
        settings.remove(MACHINE_TYPE.wire);

        let mut request = FieldMap::new();
        request.insert(
            STATE_MACHINE_ARN.to_string(),
            Value::String(self.arn(target)),
        );
        request.insert(
            DEFINITION.wire.to_string(),
            Value::String(self.definition(config)?),
        );
        request.extend(settings);
        Ok(request)
    }
}

impl AslObject for StateMachine {
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)> {
        vec![
            (NAME, Some(Value::String(self.name.clone()))),
            (ROLE_ARN, Some(Value::String(self.role_arn.clone()))),
            (
                MACHINE_TYPE,
                Some(Value::String(self.machine_type.as_str().to_string())),
            ),
            (LOGGING_CONFIGURATION, self.logging_configuration.clone()),
            (TRACING_CONFIGURATION, self.tracing_configuration.clone()),
        ]
    }

    fn alias_table(&self) -> &'static [FieldName] {
        MACHINE_FIELDS
    }

    fn field_order(&self) -> Option<&'static [FieldName]> {
        Some(MACHINE_FIELDS)
    }

    fn validate_before_serialize(&self, _config: &SerializeConfig) -> AslResult<()> {
        let entity = format!("state machine '{}'", self.name);
        if self.name.is_empty() || self.name.len() > MAX_NAME_LENGTH {
            return Err(AslError::state(
                entity,
                format!("name must be 1 to {MAX_NAME_LENGTH} characters"),
            ));
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(AslError::state(entity, "name must not contain whitespace"));
        }
        if !self.role_arn.starts_with("arn:") {
            return Err(AslError::state(
                entity,
                format!("roleArn '{}' is not an ARN", self.role_arn),
            ));
        }
        Ok(())
    }
}
