use crate::fields::{COMMENT, START_AT, STATES, TIMEOUT_SECONDS, VERSION};
use crate::object::string_value;
use crate::{
    AslError, AslObject, AslResult, Choice, ChoiceRule, Fail, FieldMap, FieldName, Map,
    Parallel, SerializeConfig, State, Succeed, Wait, WaitFor,
};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;

/// Where the next linking call attaches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Cursor {
    #[default]
    Empty,
    /// The state still waits for its successor.
    At(String),
    /// Branching or terminal state: resume with `continue_from`.
    Detached(String),
}

impl Cursor {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::At(id) | Self::Detached(id) => Some(id),
        }
    }
}

/// A graph of named states plus the builder cursor used to chain them.
///
/// Branches of a `Parallel` and the iterator of a `Map` are `Workflow`s of
/// their own with an independent id namespace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workflow {
    start_at: Option<String>,
    comment: Option<String>,
    version: Option<String>,
    timeout_seconds: Option<u32>,
    order: Vec<String>,
    states: BTreeMap<String, State>,
    cursor: Cursor,
}

const WORKFLOW_ORDER: &[FieldName] = &[COMMENT, START_AT, TIMEOUT_SECONDS, VERSION, STATES];

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a fresh graph already started at `state`, for use as a branch
    /// or iterator body.
    pub fn subflow_from(state: impl Into<State>) -> Self {
        let state = state.into();
        let id = state.id().to_string();
        let mut workflow = Self::new();
        workflow.cursor = cursor_for(&state);
        workflow.start_at = Some(id.clone());
        workflow.order.push(id.clone());
        workflow.states.insert(id, state);
        workflow
    }

    /// Moves the built graph out, leaving an empty one behind.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    pub fn start_at(&self) -> Option<&str> {
        self.start_at.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn timeout_seconds(&self) -> Option<u32> {
        self.timeout_seconds
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn with_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_timeout_seconds(&mut self, seconds: u32) -> &mut Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Sets the entry state without touching the cursor. Resolved at
    /// serialize time.
    pub fn set_start_at(&mut self, id: impl Into<String>) -> &mut Self {
        self.start_at = Some(id.into());
        self
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.states.contains_key(id)
    }

    pub fn state(&self, id: &str) -> Option<&State> {
        self.states.get(id)
    }

    pub fn state_mut(&mut self, id: &str) -> Option<&mut State> {
        self.states.get_mut(id)
    }

    /// States in insertion order.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.order.iter().filter_map(|id| self.states.get(id))
    }

    pub fn add_state(&mut self, state: impl Into<State>) -> AslResult<&mut Self> {
        let state = state.into();
        if self.contains(state.id()) {
            return Err(AslError::construction(format!(
                "state '{}' already exists in this graph",
                state.id()
            )));
        }
        self.insert(state);
        Ok(self)
    }

    /// Returns whether the state was inserted; an existing state with the same
    /// id is kept as is.
    pub fn add_state_if_absent(&mut self, state: impl Into<State>) -> bool {
        let state = state.into();
        if self.contains(state.id()) {
            return false;
        }
        self.insert(state);
        true
    }

    pub fn remove_state(&mut self, id: &str) -> AslResult<State> {
        let state = self.states.remove(id).ok_or_else(|| {
            AslError::construction(format!("cannot remove '{id}': no such state"))
        })?;
        self.order.retain(|known| known != id);
        if self.cursor.id() == Some(id) {
            self.cursor = Cursor::Empty;
        }
        log::debug!("removed state '{id}'");
        Ok(state)
    }

    pub fn start(&mut self, state: impl Into<State>) -> AslResult<&mut Self> {
        if let Some(start_at) = &self.start_at {
            return Err(AslError::construction(format!(
                "workflow already starts at '{start_at}'"
            )));
        }
        if self.cursor != Cursor::Empty {
            return Err(AslError::construction(
                "start is only valid on an empty workflow",
            ));
        }
        let state = state.into();
        let id = state.id().to_string();
        self.cursor = cursor_for(self.state(&id).unwrap_or(&state));
        self.add_state_if_absent(state);
        self.start_at = Some(id);
        log::debug!("workflow starts at {:?}", self.cursor);
        Ok(self)
    }

    /// Links the state under the cursor to `state` and advances. Reusing an
    /// already inserted id links to the existing state.
    pub fn next_then(&mut self, state: impl Into<State>) -> AslResult<&mut Self> {
        let previous = self.linkable_cursor("next_then")?.to_string();
        let state = state.into();
        let id = state.id().to_string();
        let cursor = cursor_for(self.state(&id).unwrap_or(&state));
        self.link(&previous, &id)?;
        self.add_state_if_absent(state);
        self.cursor = cursor;
        Ok(self)
    }

    /// Adds a Parallel state with `branches` after the cursor. The cursor
    /// stays on the Parallel node, which still needs `next_then` or `end`.
    pub fn parallel(
        &mut self,
        branches: impl IntoIterator<Item = Workflow>,
        id: Option<&str>,
    ) -> AslResult<&mut Self> {
        let parallel = match id {
            Some(id) => Parallel::new(id, branches),
            None => Parallel::auto(branches),
        };
        self.attach_fresh("parallel", parallel.into())
    }

    pub fn map(
        &mut self,
        iterator: Workflow,
        items_path: Option<&str>,
        max_concurrency: Option<u32>,
        id: Option<&str>,
    ) -> AslResult<&mut Self> {
        let mut map = match id {
            Some(id) => Map::new(id),
            None => Map::auto(),
        }
        .with_iterator(iterator);
        if let Some(path) = items_path {
            map = map.with_items_path(path);
        }
        if let Some(limit) = max_concurrency {
            map = map.with_max_concurrency(limit);
        }
        self.attach_fresh("map", map.into())
    }

    /// Adds a Choice state after the cursor. Every rule must already carry
    /// its `Next`; the cursor is detached afterwards.
    pub fn choice(
        &mut self,
        rules: impl IntoIterator<Item = ChoiceRule>,
        default: Option<&str>,
        id: Option<&str>,
    ) -> AslResult<&mut Self> {
        let rules = rules.into_iter().collect::<Vec<_>>();
        if let Some(rule) = rules.iter().find(|rule| rule.next().is_none()) {
            return Err(AslError::construction(format!(
                "{} passed to choice has no Next target",
                rule.label()
            )));
        }
        let mut choice = match id {
            Some(id) => Choice::new(id, rules),
            None => Choice::auto(rules),
        };
        if let Some(default) = default {
            choice = choice.with_default_id(default);
        }
        self.attach_fresh("choice", choice.into())
    }

    /// Moves the cursor to `state`, inserting it when its id is new.
    pub fn continue_from(&mut self, state: impl Into<State>) -> AslResult<&mut Self> {
        if self.start_at.is_none() {
            return Err(AslError::construction(
                "continue_from needs a started workflow",
            ));
        }
        let state = state.into();
        let id = state.id().to_string();
        self.add_state_if_absent(state);
        self.continue_from_id(&id)
    }

    pub fn continue_from_id(&mut self, id: &str) -> AslResult<&mut Self> {
        let state = self.state(id).ok_or_else(|| {
            AslError::construction(format!("cannot continue from '{id}': no such state"))
        })?;
        self.cursor = cursor_for(state);
        log::debug!("cursor moved to {:?}", self.cursor);
        Ok(self)
    }

    /// Appends a Wait state, starting the workflow when it is empty.
    pub fn wait(&mut self, wait_for: WaitFor, id: Option<&str>) -> AslResult<&mut Self> {
        let wait = match id {
            Some(id) => Wait::new(id, wait_for),
            None => Wait::auto(wait_for),
        };
        self.append(wait.into())
    }

    /// Appends a Succeed state and closes the path.
    pub fn succeed(&mut self, id: Option<&str>) -> AslResult<&mut Self> {
        let succeed = match id {
            Some(id) => Succeed::new(id),
            None => Succeed::auto(),
        };
        self.append(succeed.into())
    }

    /// Appends a Fail state and closes the path.
    pub fn fail(
        &mut self,
        id: Option<&str>,
        error: Option<&str>,
        cause: Option<&str>,
    ) -> AslResult<&mut Self> {
        let mut fail = match id {
            Some(id) => Fail::new(id),
            None => Fail::auto(),
        };
        if let Some(error) = error {
            fail = fail.with_error(error);
        }
        if let Some(cause) = cause {
            fail = fail.with_cause(cause);
        }
        self.append(fail.into())
    }

    /// Marks the state under the cursor as the end of its path.
    pub fn end(&mut self) -> AslResult<&mut Self> {
        let id = self.linkable_cursor("end")?.to_string();
        let state = self
            .state_mut(&id)
            .ok_or_else(|| AslError::construction(format!("cursor state '{id}' was removed")))?;
        state.set_end()?;
        self.cursor = Cursor::Detached(id);
        log::debug!("path ends at {:?}", self.cursor);
        Ok(self)
    }

    /// Ids reachable from `StartAt` through every kind of transition.
    pub fn reachable_ids(&self) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        let Some(start) = self.start_at.as_deref().filter(|id| self.contains(id)) else {
            return visited;
        };

        let mut queue = VecDeque::new();
        visited.insert(start.to_string());
        queue.push_back(start.to_string());

        while let Some(id) = queue.pop_front() {
            let Some(state) = self.state(&id) else {
                continue;
            };
            for target in state.next_targets() {
                if self.contains(target) && visited.insert(target.to_string()) {
                    queue.push_back(target.to_string());
                }
            }
        }
        visited
    }

    /// `(from, to)` pairs whose target is not a state of this graph.
    pub fn dangling_transitions(&self) -> Vec<(String, String)> {
        let mut dangling = Vec::new();
        for state in self.states() {
            for target in state.next_targets() {
                if !self.contains(target) {
                    dangling.push((state.id().to_string(), target.to_string()));
                }
            }
        }
        dangling
    }

    /// Pretty-printed ASL definition with the default checks.
    pub fn to_json(&self) -> AslResult<String> {
        self.to_json_with(&SerializeConfig::default())
    }

    pub fn to_json_with(&self, config: &SerializeConfig) -> AslResult<String> {
        let data = self.serialize_with(config)?;
        Ok(serde_json::to_string_pretty(&Value::Object(data))?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> AslResult<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::debug!("wrote workflow definition to {}", path.display());
        Ok(())
    }

    fn insert(&mut self, state: State) {
        let id = state.id().to_string();
        log::debug!("inserted {} state '{id}'", state.state_type());
        self.order.push(id.clone());
        self.states.insert(id, state);
    }

    fn linkable_cursor(&self, operation: &str) -> AslResult<&str> {
        match &self.cursor {
            Cursor::At(id) => Ok(id),
            Cursor::Empty => Err(AslError::construction(format!(
                "{operation} called before start"
            ))),
            Cursor::Detached(id) => Err(AslError::construction(format!(
                "{operation} called while the cursor is detached at '{id}'; call continue_from first"
            ))),
        }
    }

    fn link(&mut self, from: &str, to: &str) -> AslResult<()> {
        let state = self
            .state_mut(from)
            .ok_or_else(|| AslError::construction(format!("cursor state '{from}' was removed")))?;
        state.set_next(to)?;
        log::debug!("linked '{from}' -> '{to}'");
        Ok(())
    }

    /// Links a newly built state after the cursor. Its id must be new.
    fn attach_fresh(&mut self, operation: &str, state: State) -> AslResult<&mut Self> {
        let previous = self.linkable_cursor(operation)?.to_string();
        let id = state.id().to_string();
        if self.contains(&id) {
            return Err(AslError::construction(format!(
                "{operation}: state '{id}' already exists in this graph"
            )));
        }
        self.link(&previous, &id)?;
        self.cursor = cursor_for(&state);
        self.insert(state);
        Ok(self)
    }

    fn append(&mut self, state: State) -> AslResult<&mut Self> {
        if self.cursor == Cursor::Empty && self.start_at.is_none() {
            self.start(state)
        } else {
            self.next_then(state)
        }
    }

    fn check_start_at(&self) -> AslResult<&str> {
        match self.start_at.as_deref() {
            None | Some("") => Err(AslError::graph("StartAt is not set")),
            Some(id) if !self.contains(id) => Err(AslError::graph(format!(
                "StartAt '{id}' does not name a state of this graph"
            ))),
            Some(id) => Ok(id),
        }
    }
}

fn cursor_for(state: &State) -> Cursor {
    let id = state.id().to_string();
    if state.state_type().has_transition() && !state.is_terminal() {
        Cursor::At(id)
    } else {
        Cursor::Detached(id)
    }
}

impl AslObject for Workflow {
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)> {
        vec![
            (COMMENT, string_value(&self.comment)),
            (START_AT, string_value(&self.start_at)),
            (
                TIMEOUT_SECONDS,
                self.timeout_seconds
                    .filter(|seconds| *seconds > 0)
                    .map(Value::from),
            ),
            (
                VERSION,
                self.version
                    .clone()
                    .filter(|version| !version.is_empty())
                    .map(Value::String),
            ),
        ]
    }

    fn field_order(&self) -> Option<&'static [FieldName]> {
        Some(WORKFLOW_ORDER)
    }

    fn validate_before_serialize(&self, config: &SerializeConfig) -> AslResult<()> {
        self.check_start_at()?;
        if config.check_next_targets {
            if let Some((from, to)) = self.dangling_transitions().into_iter().next() {
                return Err(AslError::graph(format!(
                    "state '{from}' transitions to '{to}', which is not a state of this graph"
                )));
            }
        }
        if config.check_reachability {
            let reachable = self.reachable_ids();
            let unreachable = self
                .order
                .iter()
                .filter(|id| !reachable.contains(*id))
                .map(String::as_str)
                .collect::<Vec<_>>();
            if !unreachable.is_empty() {
                return Err(AslError::graph(format!(
                    "unreachable from StartAt: {}",
                    unreachable.join(", ")
                )));
            }
        }
        Ok(())
    }

    fn build_fields(&self, config: &SerializeConfig) -> AslResult<FieldMap> {
        let mut data = self.to_wire_names(self.to_fields(config.omit));
        let mut states = FieldMap::new();
        for state in self.states() {
            states.insert(
                state.id().to_string(),
                Value::Object(state.serialize_with(config)?),
            );
        }
        log::debug!("serialized {} state(s)", states.len());
        data.insert(STATES.wire.to_string(), Value::Object(states));
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Catch, ErrorMatcher, HasErrorHandling, HasTransition, Pass, Task, Var};
    use serde_json::json;

    #[test]
    fn next_then_before_start_expected_construction_error() {
        let mut workflow = Workflow::new();
        let error = workflow.next_then(Pass::new("a")).expect_err("should fail");
        assert!(matches!(error, AslError::GraphConstruction { .. }));
    }

    #[test]
    fn start_twice_expected_construction_error() {
        let mut workflow = Workflow::new();
        workflow.start(Pass::new("a")).expect("first start");
        assert!(workflow.start(Pass::new("b")).is_err());
    }

    #[test]
    fn add_state_duplicate_and_remove_missing_expected_errors() {
        let mut workflow = Workflow::new();
        workflow.add_state(Pass::new("a")).expect("first insert");
        let error = workflow.add_state(Pass::new("a")).expect_err("duplicate");
        assert!(matches!(error, AslError::GraphConstruction { .. }));

        let error = workflow.remove_state("ghost").expect_err("missing");
        assert!(matches!(error, AslError::GraphConstruction { .. }));

        let removed = workflow.remove_state("a").expect("present");
        assert_eq!(removed.id(), "a");
        assert!(workflow.is_empty());
    }

    #[test]
    fn next_then_reused_state_expected_single_entry() {
        let mut workflow = Workflow::new();
        workflow
            .start(Task::new("poll", "arn:aws:lambda:us-east-1:1:function:poll"))
            .expect("start")
            .wait(WaitFor::Seconds(5), Some("pause"))
            .expect("wait")
            .next_then(Task::new("poll", "ignored"))
            .expect("loop back");

        assert_eq!(workflow.len(), 2);
        assert_eq!(workflow.cursor(), &Cursor::At("poll".to_string()));
        assert_eq!(
            workflow.state("pause").and_then(|state| state.transition()).and_then(|t| t.next()),
            Some("poll")
        );
    }

    #[test]
    fn next_then_after_choice_expected_construction_error() {
        let mut workflow = Workflow::new();
        workflow
            .start(Pass::new("a"))
            .expect("start")
            .choice([Var::new("$.ok").boolean_equals(true).next_id("yes")], Some("no"), Some("c"))
            .expect("choice");

        assert_eq!(workflow.cursor(), &Cursor::Detached("c".to_string()));
        let error = workflow.next_then(Pass::new("b")).expect_err("detached");
        assert!(error.to_string().contains("continue_from"));
    }

    #[test]
    fn choice_rule_without_next_expected_construction_error() {
        let mut workflow = Workflow::new();
        workflow.start(Pass::new("a")).expect("start");
        let error = workflow
            .choice([Var::new("$.ok").is_present()], None, None)
            .expect_err("rule lacks Next");
        assert!(matches!(error, AslError::GraphConstruction { .. }));
    }

    #[test]
    fn end_after_succeed_expected_construction_error() {
        let mut workflow = Workflow::new();
        workflow.succeed(Some("done")).expect("succeed starts");
        assert_eq!(workflow.start_at(), Some("done"));
        assert!(workflow.end().is_err());
    }

    #[test]
    fn serialize_without_start_at_expected_graph_validation_error() {
        let mut workflow = Workflow::new();
        workflow.add_state(Pass::new("a").end()).expect("insert");
        let error = workflow.serialize().expect_err("no StartAt");
        assert!(matches!(error, AslError::GraphValidation { .. }));

        workflow.set_start_at("ghost");
        let error = workflow.serialize().expect_err("unknown StartAt");
        assert!(error.to_string().contains("ghost"));
    }

    #[test]
    fn serialize_dangling_next_expected_error_unless_lenient() {
        let mut workflow = Workflow::new();
        workflow.start(Pass::new("a").next_id("later")).expect("start");
        let error = workflow.serialize().expect_err("dangling");
        assert!(matches!(error, AslError::GraphValidation { .. }));

        let data = workflow
            .serialize_with(&SerializeConfig::lenient())
            .expect("lenient skips closure");
        assert_eq!(data["States"]["a"]["Next"], json!("later"));
    }

    #[test]
    fn serialize_dangling_choice_default_expected_error() {
        let mut workflow = Workflow::new();
        workflow
            .start(
                Choice::new("c", [Var::new("$.x").is_present().next_id("done")])
                    .with_default_id("missing"),
            )
            .expect("start")
            .continue_from(Pass::new("done").end())
            .expect("continue");
        let error = workflow.serialize().expect_err("dangling default");
        assert!(
            matches!(&error, AslError::GraphValidation { message } if message.contains("'missing'"))
        );
    }

    #[test]
    fn serialize_dangling_catch_next_expected_error() {
        let mut workflow = Workflow::new();
        workflow
            .start(
                Task::new("t", "arn:aws:lambda:us-east-1:1:function:f")
                    .with_catch(Catch::new().if_all_error().next_id("recover"))
                    .end(),
            )
            .expect("start");
        let error = workflow.serialize().expect_err("dangling catch");
        assert!(
            matches!(&error, AslError::GraphValidation { message } if message.contains("'recover'"))
        );
    }

    #[test]
    fn start_with_stored_terminal_state_expected_detached_cursor() {
        let mut workflow = Workflow::new();
        workflow.add_state(Pass::new("a").end()).expect("insert");
        workflow.start(Pass::new("a")).expect("start");
        assert_eq!(workflow.cursor(), &Cursor::Detached("a".to_string()));
        assert!(workflow.state("a").is_some_and(State::is_terminal));

        let error = workflow
            .next_then(Pass::new("b").end())
            .expect_err("stored state already ends");
        assert!(matches!(error, AslError::GraphConstruction { .. }));
    }

    #[test]
    fn serialize_unreachable_state_expected_error() {
        let mut workflow = Workflow::new();
        workflow.start(Pass::new("a")).expect("start").end().expect("end");
        workflow.add_state(Pass::new("orphan").end()).expect("insert");
        let error = workflow.serialize().expect_err("orphan");
        assert!(error.to_string().contains("orphan"));
    }

    #[test]
    fn serialize_top_level_keys_expected_canonical_order() {
        let mut workflow = Workflow::new();
        workflow
            .with_version("1.0")
            .with_timeout_seconds(60)
            .with_comment("demo")
            .start(Pass::new("a"))
            .expect("start")
            .end()
            .expect("end");

        let data = workflow.serialize().expect("serialize");
        assert_eq!(
            data.keys().collect::<Vec<_>>(),
            vec!["Comment", "StartAt", "TimeoutSeconds", "Version", "States"]
        );
    }

    #[test]
    fn serialize_zero_timeout_and_empty_version_expected_omitted() {
        let mut workflow = Workflow::new();
        workflow
            .with_version("")
            .with_timeout_seconds(0)
            .start(Pass::new("a").end())
            .expect("start");
        let data = workflow.serialize().expect("serialize");
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["StartAt", "States"]);
    }

    #[test]
    fn states_expected_insertion_order() {
        let mut workflow = Workflow::new();
        workflow
            .start(Pass::new("z"))
            .expect("start")
            .next_then(Pass::new("a"))
            .expect("a")
            .next_then(Pass::new("m"))
            .expect("m");
        let ids = workflow.states().map(State::id).collect::<Vec<_>>();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }
}
