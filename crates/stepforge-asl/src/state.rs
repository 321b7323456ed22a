//! The eight ASL state variants and the capability groups they share.
//!
//! Reference: <https://states-language.net/spec.html#state-type-table>

use crate::fields::{
    BRANCHES, CATCH, CAUSE, CHOICES, COMMENT, DEFAULT, END, ERROR, HEARTBEAT_SECONDS,
    HEARTBEAT_SECONDS_PATH, INPUT_PATH, ITEMS_PATH, ITERATOR, MAX_CONCURRENCY, NEXT, OUTPUT_PATH,
    PARAMETERS, RESOURCE, RESULT, RESULT_PATH, RESULT_SELECTOR, RETRY, SECONDS, SECONDS_PATH,
    TIMEOUT_SECONDS, TIMEOUT_SECONDS_PATH, TIMESTAMP, TIMESTAMP_PATH, TYPE,
};
use crate::ids::prefixed_id;
use crate::object::string_value;
use crate::{
    AslError, AslObject, AslResult, Catch, ChoiceRule, FieldMap, FieldName, Retry,
    SerializeConfig, StateType, Workflow, ensure_reference_path,
};
use serde_json::Value;

/// `Next` XOR `End`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transition {
    pub next: Option<String>,
    pub end: bool,
}

impl Transition {
    fn attributes(&self) -> [(FieldName, Option<Value>); 2] {
        [
            (NEXT, string_value(&self.next)),
            (END, self.end.then_some(Value::Bool(true))),
        ]
    }

    pub fn next(&self) -> Option<&str> {
        self.next.as_deref().filter(|next| !next.is_empty())
    }

    fn check(&self, entity: &str) -> AslResult<()> {
        match (self.next(), self.end) {
            (Some(next), true) => Err(AslError::state(
                entity,
                format!("End is set together with Next '{next}'"),
            )),
            (None, false) => Err(AslError::state(entity, "either Next or End must be set")),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IoPaths {
    pub input_path: Option<String>,
    pub output_path: Option<String>,
}

impl IoPaths {
    fn check(&self, entity: &str) -> AslResult<()> {
        check_path(entity, INPUT_PATH, self.input_path.as_deref())?;
        check_path(entity, OUTPUT_PATH, self.output_path.as_deref())
    }
}

/// `ResultPath` holds either a reference path or JSON `null` (discard the
/// task result and pass the input through).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultShaping {
    pub result_selector: Option<Value>,
    pub result_path: Option<Value>,
}

impl ResultShaping {
    fn check(&self, entity: &str) -> AslResult<()> {
        check_object(entity, RESULT_SELECTOR, self.result_selector.as_ref())?;
        match &self.result_path {
            None | Some(Value::Null) => Ok(()),
            Some(Value::String(path)) => check_path(entity, RESULT_PATH, Some(path.as_str())),
            Some(other) => Err(AslError::state(
                entity,
                format!("ResultPath must be a reference path or null, got {other}"),
            )),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorHandling {
    pub retry: Vec<Retry>,
    pub catch: Vec<Catch>,
}

impl ErrorHandling {
    fn splice(&self, entity: &str, data: &mut FieldMap, config: &SerializeConfig) -> AslResult<()> {
        let keep_empty = !config.omit.exclude_empty_collection;
        if keep_empty || !self.retry.is_empty() {
            let retry = self
                .retry
                .iter()
                .enumerate()
                .map(|(index, retry)| {
                    retry
                        .serialize_with(config)
                        .map(Value::Object)
                        .map_err(|error| error.scoped(&format!("{entity}.Retry[{index}]")))
                })
                .collect::<AslResult<Vec<_>>>()?;
            data.insert(RETRY.wire.to_string(), Value::Array(retry));
        }
        if keep_empty || !self.catch.is_empty() {
            let catch = self
                .catch
                .iter()
                .enumerate()
                .map(|(index, catch)| {
                    catch
                        .serialize_with(config)
                        .map(Value::Object)
                        .map_err(|error| error.scoped(&format!("{entity}.Catch[{index}]")))
                })
                .collect::<AslResult<Vec<_>>>()?;
            data.insert(CATCH.wire.to_string(), Value::Array(catch));
        }
        Ok(())
    }
}

fn check_path(entity: &str, field: FieldName, path: Option<&str>) -> AslResult<()> {
    match path {
        Some(path) => ensure_reference_path(path)
            .map_err(|error| AslError::state(entity, format!("{}: {error}", field.wire))),
        None => Ok(()),
    }
}

fn check_object(entity: &str, field: FieldName, value: Option<&Value>) -> AslResult<()> {
    match value {
        None | Some(Value::Object(_)) => Ok(()),
        Some(other) => Err(AslError::state(
            entity,
            format!("{} must be a JSON object, got {other}", field.wire),
        )),
    }
}

fn type_attribute(state_type: StateType) -> (FieldName, Option<Value>) {
    (TYPE, Some(Value::String(state_type.as_str().to_string())))
}

pub trait HasTransition: Sized {
    fn transition_mut(&mut self) -> &mut Transition;

    /// Links to `state`. Only the id is kept; the target is resolved when the
    /// owning graph serializes.
    fn next_then(self, state: &State) -> Self {
        self.next_id(state.id())
    }

    fn next_id(mut self, id: impl Into<String>) -> Self {
        self.transition_mut().next = Some(id.into());
        self
    }

    fn end(mut self) -> Self {
        self.transition_mut().end = true;
        self
    }
}

pub trait HasIoPaths: Sized {
    fn io_paths_mut(&mut self) -> &mut IoPaths;

    fn with_input_path(mut self, path: impl Into<String>) -> Self {
        self.io_paths_mut().input_path = Some(path.into());
        self
    }

    fn with_output_path(mut self, path: impl Into<String>) -> Self {
        self.io_paths_mut().output_path = Some(path.into());
        self
    }
}

pub trait HasParameters: Sized {
    fn parameters_mut(&mut self) -> &mut Option<Value>;

    fn with_parameters(mut self, parameters: Value) -> Self {
        *self.parameters_mut() = Some(parameters);
        self
    }
}

pub trait HasResultShaping: Sized {
    fn result_shaping_mut(&mut self) -> &mut ResultShaping;

    fn with_result_selector(mut self, selector: Value) -> Self {
        self.result_shaping_mut().result_selector = Some(selector);
        self
    }

    fn with_result_path(mut self, path: impl Into<String>) -> Self {
        self.result_shaping_mut().result_path = Some(Value::String(path.into()));
        self
    }

    /// Replaces the state input with the result (`ResultPath: "$"`).
    fn use_task_result(self) -> Self {
        self.with_result_path("$")
    }

    /// Drops the result and forwards the input unchanged (`ResultPath: null`).
    fn discard_result(mut self) -> Self {
        self.result_shaping_mut().result_path = Some(Value::Null);
        self
    }
}

pub trait HasErrorHandling: Sized {
    fn error_handling_mut(&mut self) -> &mut ErrorHandling;

    fn with_retry(mut self, retry: Retry) -> Self {
        self.error_handling_mut().retry.push(retry);
        self
    }

    fn with_catch(mut self, catch: Catch) -> Self {
        self.error_handling_mut().catch.push(catch);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub id: String,
    pub comment: Option<String>,
    pub resource: String,
    pub transition: Transition,
    pub io: IoPaths,
    pub parameters: Option<Value>,
    pub result: ResultShaping,
    pub errors: ErrorHandling,
    pub timeout_seconds: Option<u32>,
    pub timeout_seconds_path: Option<String>,
    pub heartbeat_seconds: Option<u32>,
    pub heartbeat_seconds_path: Option<String>,
}

const TASK_ORDER: &[FieldName] = &[
    TYPE,
    COMMENT,
    RESOURCE,
    NEXT,
    END,
    INPUT_PATH,
    PARAMETERS,
    RESULT_SELECTOR,
    RESULT_PATH,
    OUTPUT_PATH,
    RETRY,
    CATCH,
    TIMEOUT_SECONDS_PATH,
    TIMEOUT_SECONDS,
    HEARTBEAT_SECONDS_PATH,
    HEARTBEAT_SECONDS,
];

impl Task {
    pub fn new(id: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            comment: None,
            resource: resource.into(),
            transition: Transition::default(),
            io: IoPaths::default(),
            parameters: None,
            result: ResultShaping::default(),
            errors: ErrorHandling::default(),
            timeout_seconds: None,
            timeout_seconds_path: None,
            heartbeat_seconds: None,
            heartbeat_seconds_path: None,
        }
    }

    pub fn auto(resource: impl Into<String>) -> Self {
        Self::new(prefixed_id(StateType::Task.as_str()), resource)
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: u32) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn with_timeout_seconds_path(mut self, path: impl Into<String>) -> Self {
        self.timeout_seconds_path = Some(path.into());
        self
    }

    pub fn with_heartbeat_seconds(mut self, seconds: u32) -> Self {
        self.heartbeat_seconds = Some(seconds);
        self
    }

    pub fn with_heartbeat_seconds_path(mut self, path: impl Into<String>) -> Self {
        self.heartbeat_seconds_path = Some(path.into());
        self
    }
}

impl AslObject for Task {
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)> {
        let mut attributes = vec![
            type_attribute(StateType::Task),
            (COMMENT, string_value(&self.comment)),
            (RESOURCE, Some(Value::String(self.resource.clone()))),
        ];
        attributes.extend(self.transition.attributes());
        attributes.extend([
            (INPUT_PATH, string_value(&self.io.input_path)),
            (PARAMETERS, self.parameters.clone()),
            (RESULT_SELECTOR, self.result.result_selector.clone()),
            (RESULT_PATH, self.result.result_path.clone()),
            (OUTPUT_PATH, string_value(&self.io.output_path)),
            (TIMEOUT_SECONDS_PATH, string_value(&self.timeout_seconds_path)),
            (TIMEOUT_SECONDS, self.timeout_seconds.map(Value::from)),
            (HEARTBEAT_SECONDS_PATH, string_value(&self.heartbeat_seconds_path)),
            (HEARTBEAT_SECONDS, self.heartbeat_seconds.map(Value::from)),
        ]);
        attributes
    }

    fn field_order(&self) -> Option<&'static [FieldName]> {
        Some(TASK_ORDER)
    }

    fn validate_before_serialize(&self, _config: &SerializeConfig) -> AslResult<()> {
        let entity = self.id.as_str();
        self.transition.check(entity)?;
        if self.resource.trim().is_empty() {
            return Err(AslError::state(entity, "Resource must not be empty"));
        }
        self.io.check(entity)?;
        check_object(entity, PARAMETERS, self.parameters.as_ref())?;
        self.result.check(entity)?;
        check_path(entity, TIMEOUT_SECONDS_PATH, self.timeout_seconds_path.as_deref())?;
        check_path(entity, HEARTBEAT_SECONDS_PATH, self.heartbeat_seconds_path.as_deref())?;
        for (field, value) in [
            (TIMEOUT_SECONDS, self.timeout_seconds),
            (HEARTBEAT_SECONDS, self.heartbeat_seconds),
        ] {
            if value == Some(0) {
                return Err(AslError::state(
                    entity,
                    format!("{} must be a positive integer", field.wire),
                ));
            }
        }
        Ok(())
    }

    fn build_fields(&self, config: &SerializeConfig) -> AslResult<FieldMap> {
        let mut data = self.to_wire_names(self.to_fields(config.omit));
        self.errors.splice(&self.id, &mut data, config)?;
        Ok(data)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parallel {
    pub id: String,
    pub comment: Option<String>,
    pub branches: Vec<Workflow>,
    pub transition: Transition,
    pub io: IoPaths,
    pub parameters: Option<Value>,
    pub result: ResultShaping,
    pub errors: ErrorHandling,
}

const PARALLEL_ORDER: &[FieldName] = &[
    TYPE,
    COMMENT,
    BRANCHES,
    NEXT,
    END,
    INPUT_PATH,
    PARAMETERS,
    RESULT_SELECTOR,
    RESULT_PATH,
    OUTPUT_PATH,
    RETRY,
    CATCH,
];

impl Parallel {
    pub fn new(id: impl Into<String>, branches: impl IntoIterator<Item = Workflow>) -> Self {
        Self {
            id: id.into(),
            comment: None,
            branches: branches.into_iter().collect(),
            transition: Transition::default(),
            io: IoPaths::default(),
            parameters: None,
            result: ResultShaping::default(),
            errors: ErrorHandling::default(),
        }
    }

    pub fn auto(branches: impl IntoIterator<Item = Workflow>) -> Self {
        Self::new(prefixed_id(StateType::Parallel.as_str()), branches)
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_branch(mut self, branch: Workflow) -> Self {
        self.branches.push(branch);
        self
    }
}

impl AslObject for Parallel {
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)> {
        let mut attributes = vec![
            type_attribute(StateType::Parallel),
            (COMMENT, string_value(&self.comment)),
        ];
        attributes.extend(self.transition.attributes());
        attributes.extend([
            (INPUT_PATH, string_value(&self.io.input_path)),
            (PARAMETERS, self.parameters.clone()),
            (RESULT_SELECTOR, self.result.result_selector.clone()),
            (RESULT_PATH, self.result.result_path.clone()),
            (OUTPUT_PATH, string_value(&self.io.output_path)),
        ]);
        attributes
    }

    fn field_order(&self) -> Option<&'static [FieldName]> {
        Some(PARALLEL_ORDER)
    }

    fn validate_before_serialize(&self, _config: &SerializeConfig) -> AslResult<()> {
        let entity = self.id.as_str();
        if self.branches.is_empty() {
            return Err(AslError::state(entity, "Parallel needs at least one branch"));
        }
        self.transition.check(entity)?;
        self.io.check(entity)?;
        check_object(entity, PARAMETERS, self.parameters.as_ref())?;
        self.result.check(entity)
    }

    fn build_fields(&self, config: &SerializeConfig) -> AslResult<FieldMap> {
        let mut data = self.to_wire_names(self.to_fields(config.omit));
        let branches = self
            .branches
            .iter()
            .enumerate()
            .map(|(index, branch)| {
                branch
                    .serialize_with(config)
                    .map(Value::Object)
                    .map_err(|error| error.scoped(&format!("{}[{index}]", self.id)))
            })
            .collect::<AslResult<Vec<_>>>()?;
        data.insert(BRANCHES.wire.to_string(), Value::Array(branches));
        self.errors.splice(&self.id, &mut data, config)?;
        Ok(data)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Map {
    pub id: String,
    pub comment: Option<String>,
    pub iterator: Option<Box<Workflow>>,
    pub items_path: Option<String>,
    pub max_concurrency: Option<u32>,
    pub transition: Transition,
    pub io: IoPaths,
    pub parameters: Option<Value>,
    pub result: ResultShaping,
    pub errors: ErrorHandling,
}

const MAP_ORDER: &[FieldName] = &[
    TYPE,
    COMMENT,
    ITERATOR,
    ITEMS_PATH,
    MAX_CONCURRENCY,
    NEXT,
    END,
    INPUT_PATH,
    PARAMETERS,
    RESULT_SELECTOR,
    RESULT_PATH,
    OUTPUT_PATH,
    RETRY,
    CATCH,
];

impl Map {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            comment: None,
            iterator: None,
            items_path: None,
            max_concurrency: None,
            transition: Transition::default(),
            io: IoPaths::default(),
            parameters: None,
            result: ResultShaping::default(),
            errors: ErrorHandling::default(),
        }
    }

    pub fn auto() -> Self {
        Self::new(prefixed_id(StateType::Map.as_str()))
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_iterator(mut self, iterator: Workflow) -> Self {
        self.iterator = Some(Box::new(iterator));
        self
    }

    pub fn with_items_path(mut self, path: impl Into<String>) -> Self {
        self.items_path = Some(path.into());
        self
    }

    /// `0` means no limit.
    pub fn with_max_concurrency(mut self, limit: u32) -> Self {
        self.max_concurrency = Some(limit);
        self
    }
}

impl AslObject for Map {
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)> {
        let mut attributes = vec![
            type_attribute(StateType::Map),
            (COMMENT, string_value(&self.comment)),
            (ITEMS_PATH, string_value(&self.items_path)),
            (MAX_CONCURRENCY, self.max_concurrency.map(Value::from)),
        ];
        attributes.extend(self.transition.attributes());
        attributes.extend([
            (INPUT_PATH, string_value(&self.io.input_path)),
            (PARAMETERS, self.parameters.clone()),
            (RESULT_SELECTOR, self.result.result_selector.clone()),
            (RESULT_PATH, self.result.result_path.clone()),
            (OUTPUT_PATH, string_value(&self.io.output_path)),
        ]);
        attributes
    }

    fn field_order(&self) -> Option<&'static [FieldName]> {
        Some(MAP_ORDER)
    }

    fn validate_before_serialize(&self, _config: &SerializeConfig) -> AslResult<()> {
        let entity = self.id.as_str();
        if self.iterator.is_none() {
            return Err(AslError::state(entity, "Map needs an Iterator sub-flow"));
        }
        check_path(entity, ITEMS_PATH, self.items_path.as_deref())?;
        self.transition.check(entity)?;
        self.io.check(entity)?;
        check_object(entity, PARAMETERS, self.parameters.as_ref())?;
        self.result.check(entity)
    }

    fn build_fields(&self, config: &SerializeConfig) -> AslResult<FieldMap> {
        let mut data = self.to_wire_names(self.to_fields(config.omit));
        if let Some(iterator) = &self.iterator {
            let serialized = iterator
                .serialize_with(config)
                .map_err(|error| error.scoped(&format!("{}.Iterator", self.id)))?;
            data.insert(ITERATOR.wire.to_string(), Value::Object(serialized));
        }
        self.errors.splice(&self.id, &mut data, config)?;
        Ok(data)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pass {
    pub id: String,
    pub comment: Option<String>,
    pub transition: Transition,
    pub io: IoPaths,
    pub parameters: Option<Value>,
    /// Fixed output injected in place of the input.
    pub result: Option<Value>,
    pub shaping: ResultShaping,
}

const PASS_ORDER: &[FieldName] = &[
    TYPE,
    COMMENT,
    NEXT,
    END,
    INPUT_PATH,
    PARAMETERS,
    RESULT,
    RESULT_PATH,
    OUTPUT_PATH,
];

impl Pass {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            comment: None,
            transition: Transition::default(),
            io: IoPaths::default(),
            parameters: None,
            result: None,
            shaping: ResultShaping::default(),
        }
    }

    pub fn auto() -> Self {
        Self::new(prefixed_id(StateType::Pass.as_str()))
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }
}

impl AslObject for Pass {
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)> {
        let mut attributes = vec![
            type_attribute(StateType::Pass),
            (COMMENT, string_value(&self.comment)),
        ];
        attributes.extend(self.transition.attributes());
        attributes.extend([
            (INPUT_PATH, string_value(&self.io.input_path)),
            (PARAMETERS, self.parameters.clone()),
            (RESULT, self.result.clone()),
            (RESULT_PATH, self.shaping.result_path.clone()),
            (OUTPUT_PATH, string_value(&self.io.output_path)),
        ]);
        attributes
    }

    fn field_order(&self) -> Option<&'static [FieldName]> {
        Some(PASS_ORDER)
    }

    fn validate_before_serialize(&self, _config: &SerializeConfig) -> AslResult<()> {
        let entity = self.id.as_str();
        if self.shaping.result_selector.is_some() {
            return Err(AslError::state(entity, "Pass states do not accept ResultSelector"));
        }
        self.transition.check(entity)?;
        self.io.check(entity)?;
        check_object(entity, PARAMETERS, self.parameters.as_ref())?;
        self.shaping.check(entity)
    }
}

/// The single time source a `Wait` state blocks on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WaitFor {
    Seconds(u32),
    /// RFC 3339 timestamp, e.g. `2026-01-01T00:00:00Z`.
    Timestamp(String),
    SecondsPath(String),
    TimestampPath(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Wait {
    pub id: String,
    pub comment: Option<String>,
    pub seconds: Option<u32>,
    pub timestamp: Option<String>,
    pub seconds_path: Option<String>,
    pub timestamp_path: Option<String>,
    pub transition: Transition,
    pub io: IoPaths,
}

const WAIT_ORDER: &[FieldName] = &[
    TYPE,
    COMMENT,
    SECONDS,
    TIMESTAMP,
    SECONDS_PATH,
    TIMESTAMP_PATH,
    NEXT,
    END,
    INPUT_PATH,
    OUTPUT_PATH,
];

const WAIT_SOURCES: [FieldName; 4] = [SECONDS, TIMESTAMP, SECONDS_PATH, TIMESTAMP_PATH];

impl Wait {
    pub fn new(id: impl Into<String>, wait_for: WaitFor) -> Self {
        let wait = Self {
            id: id.into(),
            comment: None,
            seconds: None,
            timestamp: None,
            seconds_path: None,
            timestamp_path: None,
            transition: Transition::default(),
            io: IoPaths::default(),
        };
        wait.with_wait_for(wait_for)
    }

    pub fn auto(wait_for: WaitFor) -> Self {
        Self::new(prefixed_id(StateType::Wait.as_str()), wait_for)
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets one more time source. A second source fails validation.
    pub fn with_wait_for(mut self, wait_for: WaitFor) -> Self {
        match wait_for {
            WaitFor::Seconds(seconds) => self.seconds = Some(seconds),
            WaitFor::Timestamp(timestamp) => self.timestamp = Some(timestamp),
            WaitFor::SecondsPath(path) => self.seconds_path = Some(path),
            WaitFor::TimestampPath(path) => self.timestamp_path = Some(path),
        }
        self
    }
}

impl AslObject for Wait {
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)> {
        let mut attributes = vec![
            type_attribute(StateType::Wait),
            (COMMENT, string_value(&self.comment)),
            (SECONDS, self.seconds.map(Value::from)),
            (TIMESTAMP, string_value(&self.timestamp)),
            (SECONDS_PATH, string_value(&self.seconds_path)),
            (TIMESTAMP_PATH, string_value(&self.timestamp_path)),
        ];
        attributes.extend(self.transition.attributes());
        attributes.extend([
            (INPUT_PATH, string_value(&self.io.input_path)),
            (OUTPUT_PATH, string_value(&self.io.output_path)),
        ]);
        attributes
    }

    fn field_order(&self) -> Option<&'static [FieldName]> {
        Some(WAIT_ORDER)
    }

    fn validate_before_serialize(&self, _config: &SerializeConfig) -> AslResult<()> {
        let entity = self.id.as_str();
        let sources = [
            self.seconds.is_some(),
            self.timestamp.is_some(),
            self.seconds_path.is_some(),
            self.timestamp_path.is_some(),
        ];
        if sources.iter().filter(|set| **set).count() != 1 {
            return Err(AslError::state(
                entity,
                "exactly one of Seconds, Timestamp, SecondsPath, TimestampPath must be set",
            ));
        }
        check_path(entity, SECONDS_PATH, self.seconds_path.as_deref())?;
        check_path(entity, TIMESTAMP_PATH, self.timestamp_path.as_deref())?;
        self.transition.check(entity)?;
        self.io.check(entity)
    }

    fn validate_after_serialize(
        &self,
        _config: &SerializeConfig,
        output: &FieldMap,
    ) -> AslResult<()> {
        let emitted = WAIT_SOURCES
            .iter()
            .filter(|field| output.contains_key(field.wire))
            .count();
        if emitted == 1 {
            Ok(())
        } else {
            Err(AslError::state(
                &self.id,
                format!("expected one time source in the output, found {emitted}"),
            ))
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Choice {
    pub id: String,
    pub comment: Option<String>,
    pub choices: Vec<ChoiceRule>,
    pub default: Option<String>,
    pub io: IoPaths,
}

const CHOICE_ORDER: &[FieldName] = &[TYPE, COMMENT, CHOICES, DEFAULT, INPUT_PATH, OUTPUT_PATH];

impl Choice {
    pub fn new(id: impl Into<String>, choices: impl IntoIterator<Item = ChoiceRule>) -> Self {
        Self {
            id: id.into(),
            comment: None,
            choices: choices.into_iter().collect(),
            default: None,
            io: IoPaths::default(),
        }
    }

    pub fn auto(choices: impl IntoIterator<Item = ChoiceRule>) -> Self {
        Self::new(prefixed_id(StateType::Choice.as_str()), choices)
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_rule(mut self, rule: ChoiceRule) -> Self {
        self.choices.push(rule);
        self
    }

    /// Target taken when no rule matches.
    pub fn with_default(self, state: &State) -> Self {
        self.with_default_id(state.id())
    }

    pub fn with_default_id(mut self, id: impl Into<String>) -> Self {
        self.default = Some(id.into());
        self
    }
}

impl AslObject for Choice {
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)> {
        vec![
            type_attribute(StateType::Choice),
            (COMMENT, string_value(&self.comment)),
            (DEFAULT, string_value(&self.default)),
            (INPUT_PATH, string_value(&self.io.input_path)),
            (OUTPUT_PATH, string_value(&self.io.output_path)),
        ]
    }

    fn field_order(&self) -> Option<&'static [FieldName]> {
        Some(CHOICE_ORDER)
    }

    fn validate_before_serialize(&self, _config: &SerializeConfig) -> AslResult<()> {
        let entity = self.id.as_str();
        if self.choices.is_empty() {
            return Err(AslError::state(entity, "Choice needs at least one rule"));
        }
        if let Some(rule) = self.choices.iter().find(|rule| rule.next().is_none()) {
            return Err(AslError::state(
                entity,
                format!("{} has no Next target", rule.label()),
            ));
        }
        self.io.check(entity)
    }

    fn build_fields(&self, config: &SerializeConfig) -> AslResult<FieldMap> {
        let mut data = self.to_wire_names(self.to_fields(config.omit));
        let choices = self
            .choices
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                rule.serialize_with(config)
                    .map(Value::Object)
                    .map_err(|error| error.scoped(&format!("{}.Choices[{index}]", self.id)))
            })
            .collect::<AslResult<Vec<_>>>()?;
        data.insert(CHOICES.wire.to_string(), Value::Array(choices));
        Ok(data)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Succeed {
    pub id: String,
    pub comment: Option<String>,
    pub io: IoPaths,
}

const SUCCEED_ORDER: &[FieldName] = &[TYPE, COMMENT, INPUT_PATH, OUTPUT_PATH];

impl Succeed {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            comment: None,
            io: IoPaths::default(),
        }
    }

    pub fn auto() -> Self {
        Self::new(prefixed_id(StateType::Succeed.as_str()))
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

impl AslObject for Succeed {
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)> {
        vec![
            type_attribute(StateType::Succeed),
            (COMMENT, string_value(&self.comment)),
            (INPUT_PATH, string_value(&self.io.input_path)),
            (OUTPUT_PATH, string_value(&self.io.output_path)),
        ]
    }

    fn field_order(&self) -> Option<&'static [FieldName]> {
        Some(SUCCEED_ORDER)
    }

    fn validate_before_serialize(&self, _config: &SerializeConfig) -> AslResult<()> {
        self.io.check(&self.id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Fail {
    pub id: String,
    pub comment: Option<String>,
    pub error: Option<String>,
    pub cause: Option<String>,
}

const FAIL_ORDER: &[FieldName] = &[TYPE, COMMENT, ERROR, CAUSE];

impl Fail {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            comment: None,
            error: None,
            cause: None,
        }
    }

    pub fn auto() -> Self {
        Self::new(prefixed_id(StateType::Fail.as_str()))
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

impl AslObject for Fail {
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)> {
        vec![
            type_attribute(StateType::Fail),
            (COMMENT, string_value(&self.comment)),
            (ERROR, string_value(&self.error)),
            (CAUSE, string_value(&self.cause)),
        ]
    }

    fn field_order(&self) -> Option<&'static [FieldName]> {
        Some(FAIL_ORDER)
    }
}

impl HasTransition for Task {
    fn transition_mut(&mut self) -> &mut Transition {
        &mut self.transition
    }
}

impl HasTransition for Parallel {
    fn transition_mut(&mut self) -> &mut Transition {
        &mut self.transition
    }
}

impl HasTransition for Map {
    fn transition_mut(&mut self) -> &mut Transition {
        &mut self.transition
    }
}

impl HasTransition for Pass {
    fn transition_mut(&mut self) -> &mut Transition {
        &mut self.transition
    }
}

impl HasTransition for Wait {
    fn transition_mut(&mut self) -> &mut Transition {
        &mut self.transition
    }
}

impl HasIoPaths for Task {
    fn io_paths_mut(&mut self) -> &mut IoPaths {
        &mut self.io
    }
}

impl HasIoPaths for Parallel {
    fn io_paths_mut(&mut self) -> &mut IoPaths {
        &mut self.io
    }
}

impl HasIoPaths for Map {
    fn io_paths_mut(&mut self) -> &mut IoPaths {
        &mut self.io
    }
}

impl HasIoPaths for Pass {
    fn io_paths_mut(&mut self) -> &mut IoPaths {
        &mut self.io
    }
}

impl HasIoPaths for Wait {
    fn io_paths_mut(&mut self) -> &mut IoPaths {
        &mut self.io
    }
}

impl HasIoPaths for Choice {
    fn io_paths_mut(&mut self) -> &mut IoPaths {
        &mut self.io
    }
}

impl HasIoPaths for Succeed {
    fn io_paths_mut(&mut self) -> &mut IoPaths {
        &mut self.io
    }
}

impl HasParameters for Task {
    fn parameters_mut(&mut self) -> &mut Option<Value> {
        &mut self.parameters
    }
}

impl HasParameters for Parallel {
    fn parameters_mut(&mut self) -> &mut Option<Value> {
        &mut self.parameters
    }
}

impl HasParameters for Map {
    fn parameters_mut(&mut self) -> &mut Option<Value> {
        &mut self.parameters
    }
}

impl HasParameters for Pass {
    fn parameters_mut(&mut self) -> &mut Option<Value> {
        &mut self.parameters
    }
}

impl HasResultShaping for Task {
    fn result_shaping_mut(&mut self) -> &mut ResultShaping {
        &mut self.result
    }
}

impl HasResultShaping for Parallel {
    fn result_shaping_mut(&mut self) -> &mut ResultShaping {
        &mut self.result
    }
}

impl HasResultShaping for Map {
    fn result_shaping_mut(&mut self) -> &mut ResultShaping {
        &mut self.result
    }
}

impl HasResultShaping for Pass {
    fn result_shaping_mut(&mut self) -> &mut ResultShaping {
        &mut self.shaping
    }
}

impl HasErrorHandling for Task {
    fn error_handling_mut(&mut self) -> &mut ErrorHandling {
        &mut self.errors
    }
}

impl HasErrorHandling for Parallel {
    fn error_handling_mut(&mut self) -> &mut ErrorHandling {
        &mut self.errors
    }
}

impl HasErrorHandling for Map {
    fn error_handling_mut(&mut self) -> &mut ErrorHandling {
        &mut self.errors
    }
}

/// One node of a workflow graph.
#[derive(Clone, Debug, PartialEq)]
pub enum State {
    Task(Task),
    Parallel(Parallel),
    Map(Map),
    Pass(Pass),
    Wait(Wait),
    Choice(Choice),
    Succeed(Succeed),
    Fail(Fail),
}

impl State {
    pub fn id(&self) -> &str {
        match self {
            Self::Task(state) => &state.id,
            Self::Parallel(state) => &state.id,
            Self::Map(state) => &state.id,
            Self::Pass(state) => &state.id,
            Self::Wait(state) => &state.id,
            Self::Choice(state) => &state.id,
            Self::Succeed(state) => &state.id,
            Self::Fail(state) => &state.id,
        }
    }

    pub fn state_type(&self) -> StateType {
        match self {
            Self::Task(_) => StateType::Task,
            Self::Parallel(_) => StateType::Parallel,
            Self::Map(_) => StateType::Map,
            Self::Pass(_) => StateType::Pass,
            Self::Wait(_) => StateType::Wait,
            Self::Choice(_) => StateType::Choice,
            Self::Succeed(_) => StateType::Succeed,
            Self::Fail(_) => StateType::Fail,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            Self::Task(state) => state.comment.as_deref(),
            Self::Parallel(state) => state.comment.as_deref(),
            Self::Map(state) => state.comment.as_deref(),
            Self::Pass(state) => state.comment.as_deref(),
            Self::Wait(state) => state.comment.as_deref(),
            Self::Choice(state) => state.comment.as_deref(),
            Self::Succeed(state) => state.comment.as_deref(),
            Self::Fail(state) => state.comment.as_deref(),
        }
    }

    /// `None` for Choice, Succeed and Fail.
    pub fn transition(&self) -> Option<&Transition> {
        match self {
            Self::Task(state) => Some(&state.transition),
            Self::Parallel(state) => Some(&state.transition),
            Self::Map(state) => Some(&state.transition),
            Self::Pass(state) => Some(&state.transition),
            Self::Wait(state) => Some(&state.transition),
            Self::Choice(_) | Self::Succeed(_) | Self::Fail(_) => None,
        }
    }

    pub fn transition_mut(&mut self) -> Option<&mut Transition> {
        match self {
            Self::Task(state) => Some(&mut state.transition),
            Self::Parallel(state) => Some(&mut state.transition),
            Self::Map(state) => Some(&mut state.transition),
            Self::Pass(state) => Some(&mut state.transition),
            Self::Wait(state) => Some(&mut state.transition),
            Self::Choice(_) | Self::Succeed(_) | Self::Fail(_) => None,
        }
    }

    pub fn set_next(&mut self, id: impl Into<String>) -> AslResult<()> {
        let state_id = self.id().to_string();
        let state_type = self.state_type();
        let transition = self.transition_mut().ok_or_else(|| {
            AslError::construction(format!("{state_type} state '{state_id}' cannot have Next"))
        })?;
        transition.next = Some(id.into());
        Ok(())
    }

    pub fn set_end(&mut self) -> AslResult<()> {
        let state_id = self.id().to_string();
        let state_type = self.state_type();
        let transition = self.transition_mut().ok_or_else(|| {
            AslError::construction(format!("{state_type} state '{state_id}' cannot have End"))
        })?;
        transition.end = true;
        Ok(())
    }

    pub fn error_handling(&self) -> Option<&ErrorHandling> {
        match self {
            Self::Task(state) => Some(&state.errors),
            Self::Parallel(state) => Some(&state.errors),
            Self::Map(state) => Some(&state.errors),
            _ => None,
        }
    }

    /// Every state id this state can hand control to: `Next`, catch
    /// fallbacks, choice rule targets and `Default`.
    pub fn next_targets(&self) -> Vec<&str> {
        let mut targets = Vec::new();
        if let Some(next) = self.transition().and_then(Transition::next) {
            targets.push(next);
        }
        if let Some(errors) = self.error_handling() {
            targets.extend(errors.catch.iter().filter_map(|catch| catch.next.as_deref()));
        }
        if let Self::Choice(choice) = self {
            targets.extend(choice.choices.iter().filter_map(ChoiceRule::next));
            if let Some(default) = choice.default.as_deref() {
                targets.push(default);
            }
        }
        targets
    }

    /// Nested sub-flows: Parallel branches or the Map iterator.
    pub fn subflows(&self) -> Vec<&Workflow> {
        match self {
            Self::Parallel(state) => state.branches.iter().collect(),
            Self::Map(state) => state.iterator.iter().map(|iterator| &**iterator).collect(),
            _ => Vec::new(),
        }
    }

    /// Ends this path: `End` is set, or the state is Succeed or Fail.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Succeed(_) | Self::Fail(_) => true,
            _ => self.transition().is_some_and(|transition| transition.end),
        }
    }

    /// The state's own checks plus its retry, catch and choice rules.
    /// Nested sub-flows are not visited.
    pub fn check_local(&self, config: &SerializeConfig) -> AslResult<()> {
        self.validate_before_serialize(config)?;
        let id = self.id();
        if let Some(errors) = self.error_handling() {
            for (index, retry) in errors.retry.iter().enumerate() {
                retry
                    .validate_before_serialize(config)
                    .map_err(|error| error.scoped(&format!("{id}.Retry[{index}]")))?;
            }
            for (index, catch) in errors.catch.iter().enumerate() {
                catch
                    .validate_before_serialize(config)
                    .map_err(|error| error.scoped(&format!("{id}.Catch[{index}]")))?;
            }
        }
        if let Self::Choice(choice) = self {
            for (index, rule) in choice.choices.iter().enumerate() {
                rule.serialize_with(config)
                    .map_err(|error| error.scoped(&format!("{id}.Choices[{index}]")))?;
            }
        }
        Ok(())
    }

    fn inner(&self) -> &dyn AslObject {
        match self {
            Self::Task(state) => state,
            Self::Parallel(state) => state,
            Self::Map(state) => state,
            Self::Pass(state) => state,
            Self::Wait(state) => state,
            Self::Choice(state) => state,
            Self::Succeed(state) => state,
            Self::Fail(state) => state,
        }
    }
}

impl AslObject for State {
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)> {
        self.inner().attributes()
    }

    fn field_order(&self) -> Option<&'static [FieldName]> {
        self.inner().field_order()
    }

    fn validate_before_serialize(&self, config: &SerializeConfig) -> AslResult<()> {
        self.inner().validate_before_serialize(config)
    }

    fn validate_after_serialize(&self, config: &SerializeConfig, output: &FieldMap) -> AslResult<()> {
        self.inner().validate_after_serialize(config, output)
    }

    fn build_fields(&self, config: &SerializeConfig) -> AslResult<FieldMap> {
        self.inner().build_fields(config)
    }
}

impl From<Task> for State {
    fn from(state: Task) -> Self {
        Self::Task(state)
    }
}

impl From<Parallel> for State {
    fn from(state: Parallel) -> Self {
        Self::Parallel(state)
    }
}

impl From<Map> for State {
    fn from(state: Map) -> Self {
        Self::Map(state)
    }
}

impl From<Pass> for State {
    fn from(state: Pass) -> Self {
        Self::Pass(state)
    }
}

impl From<Wait> for State {
    fn from(state: Wait) -> Self {
        Self::Wait(state)
    }
}

impl From<Choice> for State {
    fn from(state: Choice) -> Self {
        Self::Choice(state)
    }
}

impl From<Succeed> for State {
    fn from(state: Succeed) -> Self {
        Self::Succeed(state)
    }
}

impl From<Fail> for State {
    fn from(state: Fail) -> Self {
        Self::Fail(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorMatcher, Var};
    use serde_json::json;

    const LAMBDA: &str = "arn:aws:lambda:us-east-1:123456789012:function:app";

    fn keys(data: &FieldMap) -> Vec<&str> {
        data.keys().map(String::as_str).collect()
    }

    #[test]
    fn pass_next_and_end_expected_state_validation_error() {
        let error = Pass::new("a")
            .next_id("b")
            .end()
            .serialize()
            .expect_err("should fail");
        assert!(matches!(error, AslError::StateValidation { ref entity, .. } if entity == "a"));

        let error = Pass::new("a").serialize().expect_err("should fail");
        assert!(error.to_string().contains("either Next or End"));

        let data = Pass::new("a").end().serialize().expect("end only");
        assert_eq!(Value::Object(data), json!({"Type": "Pass", "End": true}));
        let data = Pass::new("a").next_id("b").serialize().expect("next only");
        assert_eq!(Value::Object(data), json!({"Type": "Pass", "Next": "b"}));
    }

    #[test]
    fn task_every_field_expected_canonical_order() {
        let task = Task::new("t", LAMBDA)
            .with_comment("calls the app")
            .next_id("after")
            .with_input_path("$.input")
            .with_parameters(json!({"Payload.$": "$"}))
            .with_result_selector(json!({"body.$": "$.Payload"}))
            .with_result_path("$.result")
            .with_output_path("$.result")
            .with_retry(Retry::new().if_all_error().with_max_attempts(2))
            .with_catch(Catch::new().if_all_error().next_id("after"))
            .with_timeout_seconds_path("$.timeout")
            .with_timeout_seconds(30)
            .with_heartbeat_seconds_path("$.heartbeat")
            .with_heartbeat_seconds(10);

        let data = task.serialize().expect("task should serialize");
        assert_eq!(
            keys(&data),
            vec![
                "Type",
                "Comment",
                "Resource",
                "Next",
                "InputPath",
                "Parameters",
                "ResultSelector",
                "ResultPath",
                "OutputPath",
                "Retry",
                "Catch",
                "TimeoutSecondsPath",
                "TimeoutSeconds",
                "HeartbeatSecondsPath",
                "HeartbeatSeconds",
            ]
        );
        assert_eq!(data["Resource"], json!(LAMBDA));
        assert_eq!(data["Parameters"], json!({"Payload.$": "$"}));
        assert_eq!(
            data["Retry"],
            json!([{"ErrorEquals": ["States.ALL"], "MaxAttempts": 2}])
        );
        assert_eq!(
            data["Catch"],
            json!([{"ErrorEquals": ["States.ALL"], "Next": "after"}])
        );
        assert_eq!(data["HeartbeatSeconds"], json!(10));
    }

    #[test]
    fn task_invalid_timeout_path_expected_error() {
        let error = Task::new("t", LAMBDA)
            .end()
            .with_timeout_seconds_path("foo")
            .serialize()
            .expect_err("should fail");
        assert!(matches!(error, AslError::StateValidation { .. }));
        assert!(error.to_string().contains("TimeoutSecondsPath"));
    }

    #[test]
    fn task_empty_resource_or_zero_timeout_expected_error() {
        assert!(Task::new("t", " ").end().serialize().is_err());
        assert!(
            Task::new("t", LAMBDA)
                .end()
                .with_heartbeat_seconds(0)
                .serialize()
                .is_err()
        );
    }

    #[test]
    fn task_discard_result_expected_null_result_path() {
        let data = Task::new("t", LAMBDA)
            .end()
            .discard_result()
            .serialize()
            .expect("task should serialize");
        assert_eq!(data["ResultPath"], Value::Null);

        let data = Task::new("t", LAMBDA)
            .end()
            .use_task_result()
            .serialize()
            .expect("task should serialize");
        assert_eq!(data["ResultPath"], json!("$"));
    }

    #[test]
    fn task_nested_retry_error_expected_scoped_entity() {
        let error = Task::new("t", LAMBDA)
            .end()
            .with_retry(Retry::new().if_error("NotARealCode"))
            .serialize()
            .expect_err("should fail");
        assert!(
            matches!(error, AslError::StateValidation { ref entity, .. } if entity == "t.Retry[0]/Retry")
        );
    }

    #[test]
    fn parallel_without_branches_expected_error() {
        let error = Parallel::new("p", Vec::new())
            .end()
            .serialize()
            .expect_err("should fail");
        assert!(matches!(error, AslError::StateValidation { .. }));
    }

    #[test]
    fn map_without_iterator_expected_error() {
        let error = Map::new("m").end().serialize().expect_err("should fail");
        assert!(matches!(error, AslError::StateValidation { .. }));
    }

    #[test]
    fn map_invalid_items_path_expected_error() {
        let error = Map::new("m")
            .with_iterator(Workflow::subflow_from(Pass::new("x").end()))
            .with_items_path("items")
            .end()
            .serialize()
            .expect_err("should fail");
        assert!(error.to_string().contains("ItemsPath"));
    }

    #[test]
    fn choice_without_rules_expected_error() {
        let error = Choice::new("c", Vec::new())
            .serialize()
            .expect_err("should fail");
        assert!(matches!(error, AslError::StateValidation { .. }));
    }

    #[test]
    fn choice_rule_without_next_expected_error() {
        let error = Choice::new("c", [Var::new("$.flag").boolean_equals(true)])
            .serialize()
            .expect_err("should fail");
        assert!(error.to_string().contains("no Next"));
    }

    #[test]
    fn choice_serialize_expected_choices_then_default() {
        let done = State::from(Succeed::new("done"));
        let choice = Choice::new("c", [Var::new("$.flag").boolean_equals(true).next_then(&done)])
            .with_default_id("fallback");
        let data = choice.serialize().expect("choice should serialize");
        assert_eq!(keys(&data), vec!["Type", "Choices", "Default"]);
        assert_eq!(
            data["Choices"],
            json!([{"Variable": "$.flag", "BooleanEquals": true, "Next": "done"}])
        );
    }

    #[test]
    fn wait_two_sources_expected_error() {
        let error = Wait::new("w", WaitFor::Seconds(5))
            .with_wait_for(WaitFor::TimestampPath("$.at".to_string()))
            .end()
            .serialize()
            .expect_err("should fail");
        assert!(error.to_string().contains("exactly one"));
    }

    #[test]
    fn wait_empty_timestamp_expected_post_serialize_error() {
        let error = Wait::new("w", WaitFor::Timestamp(String::new()))
            .end()
            .serialize()
            .expect_err("empty timestamp is omitted");
        assert!(error.to_string().contains("one time source"));
    }

    #[test]
    fn wait_seconds_expected_canonical_order() {
        let data = Wait::new("w", WaitFor::Seconds(10))
            .next_id("x")
            .serialize()
            .expect("wait should serialize");
        assert_eq!(
            Value::Object(data),
            json!({"Type": "Wait", "Seconds": 10, "Next": "x"})
        );
    }

    #[test]
    fn fail_serialize_expected_error_and_cause() {
        let data = Fail::new("f")
            .with_error("Boom")
            .with_cause("it broke")
            .serialize()
            .expect("fail should serialize");
        assert_eq!(keys(&data), vec!["Type", "Error", "Cause"]);
    }

    #[test]
    fn pass_result_selector_expected_error() {
        let error = Pass::new("p")
            .end()
            .with_result_selector(json!({"a": 1}))
            .serialize()
            .expect_err("should fail");
        assert!(error.to_string().contains("ResultSelector"));
    }

    #[test]
    fn state_set_next_on_terminal_variant_expected_construction_error() {
        let mut state = State::from(Succeed::new("done"));
        let error = state.set_next("x").expect_err("should fail");
        assert!(matches!(error, AslError::GraphConstruction { .. }));
        assert!(state.is_terminal());
    }

    #[test]
    fn state_next_targets_expected_next_catch_and_rules() {
        let task = State::from(
            Task::new("t", LAMBDA)
                .next_id("a")
                .with_catch(Catch::new().if_all_error().next_id("b")),
        );
        assert_eq!(task.next_targets(), vec!["a", "b"]);

        let choice = State::from(
            Choice::new("c", [Var::new("$.x").is_present().next_id("y")]).with_default_id("z"),
        );
        assert_eq!(choice.next_targets(), vec!["y", "z"]);
    }

    #[test]
    fn auto_ids_expected_type_prefix() {
        assert!(Task::auto(LAMBDA).id.starts_with("Task-"));
        assert!(Wait::auto(WaitFor::Seconds(1)).id.starts_with("Wait-"));
        assert_ne!(Pass::auto().id, Pass::auto().id);
    }
}
