use crate::{Diagnostic, SerializeConfig, Severity, State, ValidationError, Workflow};

pub trait LintRule {
    fn name(&self) -> &str;
    fn apply(&self, workflow: &Workflow) -> Vec<Diagnostic>;
}

/// Collects every finding instead of stopping at the first one, recursing
/// into branch and iterator graphs. Per-state checks use the default
/// `SerializeConfig`; see `lint_with`.
pub fn lint(workflow: &Workflow, extra_rules: &[&dyn LintRule]) -> Vec<Diagnostic> {
    lint_with(workflow, &SerializeConfig::default(), extra_rules)
}

/// Like `lint`, with per-state checks run under `config` (for example a
/// registry holding extra error codes).
pub fn lint_with(
    workflow: &Workflow,
    config: &SerializeConfig,
    extra_rules: &[&dyn LintRule],
) -> Vec<Diagnostic> {
    let diagnostics = collect(workflow, config, extra_rules);
    for diagnostic in &diagnostics {
        let at = diagnostic.state_id.as_deref().unwrap_or("workflow");
        if diagnostic.is_error() {
            log::warn!("[{}] {at}: {}", diagnostic.rule, diagnostic.message);
        } else {
            log::debug!("[{}] {at}: {}", diagnostic.rule, diagnostic.message);
        }
    }
    diagnostics
}

pub fn lint_or_raise(
    workflow: &Workflow,
    extra_rules: &[&dyn LintRule],
) -> Result<Vec<Diagnostic>, ValidationError> {
    lint_or_raise_with(workflow, &SerializeConfig::default(), extra_rules)
}

pub fn lint_or_raise_with(
    workflow: &Workflow,
    config: &SerializeConfig,
    extra_rules: &[&dyn LintRule],
) -> Result<Vec<Diagnostic>, ValidationError> {
    let diagnostics = lint_with(workflow, config, extra_rules);
    if diagnostics.iter().any(Diagnostic::is_error) {
        return Err(ValidationError::new(diagnostics));
    }
    Ok(diagnostics)
}

fn collect(
    workflow: &Workflow,
    config: &SerializeConfig,
    extra_rules: &[&dyn LintRule],
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    diagnostics.extend(rule_start_at(workflow));
    diagnostics.extend(rule_next_target_exists(workflow));
    diagnostics.extend(rule_reachability(workflow));
    diagnostics.extend(rule_terminal_state(workflow));
    diagnostics.extend(rule_state_checks(workflow, config));
    diagnostics.extend(rule_heartbeat_within_timeout(workflow));
    diagnostics.extend(rule_choice_has_default(workflow));

    for rule in extra_rules {
        diagnostics.extend(rule.apply(workflow));
    }

    for state in workflow.states() {
        for (index, subflow) in state.subflows().into_iter().enumerate() {
            let scope = match state {
                State::Map(_) => format!("{}.Iterator", state.id()),
                _ => format!("{}[{index}]", state.id()),
            };
            diagnostics.extend(
                collect(subflow, config, extra_rules)
                    .into_iter()
                    .map(|diagnostic| diagnostic.scoped(&scope)),
            );
        }
    }

    diagnostics
}

fn rule_start_at(workflow: &Workflow) -> Vec<Diagnostic> {
    match workflow.start_at() {
        Some(id) if workflow.contains(id) => Vec::new(),
        Some(id) => vec![
            Diagnostic::new(
                "start_at",
                Severity::Error,
                format!("StartAt '{id}' does not name a state"),
            )
            .with_state_id(id),
        ],
        None => vec![
            Diagnostic::new("start_at", Severity::Error, "StartAt is not set")
                .with_fix("call start or set_start_at"),
        ],
    }
}

fn rule_next_target_exists(workflow: &Workflow) -> Vec<Diagnostic> {
    workflow
        .dangling_transitions()
        .into_iter()
        .map(|(from, to)| {
            Diagnostic::new(
                "next_target_exists",
                Severity::Error,
                format!("transition target '{to}' does not exist"),
            )
            .with_state_id(from.clone())
            .with_transition(from, to)
        })
        .collect()
}

fn rule_reachability(workflow: &Workflow) -> Vec<Diagnostic> {
    if !workflow.start_at().is_some_and(|id| workflow.contains(id)) {
        return Vec::new();
    }
    let reachable = workflow.reachable_ids();
    workflow
        .states()
        .filter(|state| !reachable.contains(state.id()))
        .map(|state| {
            Diagnostic::new(
                "reachability",
                Severity::Error,
                "state is unreachable from StartAt",
            )
            .with_state_id(state.id())
        })
        .collect()
}

fn rule_terminal_state(workflow: &Workflow) -> Vec<Diagnostic> {
    if workflow.is_empty() || workflow.states().any(State::is_terminal) {
        Vec::new()
    } else {
        vec![Diagnostic::new(
            "terminal_state",
            Severity::Error,
            "flow has no End, Succeed or Fail state",
        )]
    }
}

fn rule_state_checks(workflow: &Workflow, config: &SerializeConfig) -> Vec<Diagnostic> {
    workflow
        .states()
        .filter_map(|state| {
            state.check_local(config).err().map(|error| {
                Diagnostic::from_error("state_checks", &error).with_state_id(state.id())
            })
        })
        .collect()
}

fn rule_heartbeat_within_timeout(workflow: &Workflow) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for state in workflow.states() {
        let State::Task(task) = state else {
            continue;
        };
        if let (Some(heartbeat), Some(timeout)) = (task.heartbeat_seconds, task.timeout_seconds) {
            if heartbeat >= timeout {
                diagnostics.push(
                    Diagnostic::new(
                        "heartbeat_within_timeout",
                        Severity::Warning,
                        format!(
                            "HeartbeatSeconds ({heartbeat}) should be smaller than TimeoutSeconds ({timeout})"
                        ),
                    )
                    .with_state_id(task.id.clone()),
                );
            }
        }
    }
    diagnostics
}

fn rule_choice_has_default(workflow: &Workflow) -> Vec<Diagnostic> {
    workflow
        .states()
        .filter_map(|state| match state {
            State::Choice(choice) if choice.default.is_none() => Some(
                Diagnostic::new(
                    "choice_has_default",
                    Severity::Warning,
                    "Choice has no Default; unmatched input fails with States.NoChoiceMatched",
                )
                .with_state_id(choice.id.clone()),
            ),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorMatcher, HasErrorHandling, HasTransition, Pass, Retry, Task, Var};

    fn linted(workflow: &Workflow) -> Vec<Diagnostic> {
        lint(workflow, &[])
    }

    #[test]
    fn lint_missing_start_at_expected_error() {
        let mut workflow = Workflow::new();
        workflow.add_state(Pass::new("a").end()).expect("insert");
        assert!(
            linted(&workflow)
                .iter()
                .any(|d| d.rule == "start_at" && d.is_error())
        );
    }

    #[test]
    fn lint_dangling_and_unreachable_expected_errors() {
        let mut workflow = Workflow::new();
        workflow.start(Pass::new("a").next_id("ghost")).expect("start");
        workflow.add_state(Pass::new("orphan").end()).expect("insert");

        let diagnostics = linted(&workflow);
        assert!(diagnostics.iter().any(|d| {
            d.rule == "next_target_exists"
                && d.transition == Some(("a".to_string(), "ghost".to_string()))
        }));
        assert!(diagnostics.iter().any(|d| {
            d.rule == "reachability" && d.state_id.as_deref() == Some("orphan")
        }));
    }

    #[test]
    fn lint_loop_without_end_expected_terminal_state_error() {
        let mut workflow = Workflow::new();
        workflow
            .start(Pass::new("a"))
            .expect("start")
            .next_then(Pass::new("b"))
            .expect("b")
            .next_then(Pass::new("a"))
            .expect("loop");
        assert!(linted(&workflow).iter().any(|d| d.rule == "terminal_state"));
    }

    #[test]
    fn lint_heartbeat_exceeding_timeout_expected_warning() {
        let mut workflow = Workflow::new();
        workflow
            .start(
                Task::new("t", "arn:aws:lambda:us-east-1:1:function:f")
                    .with_timeout_seconds(10)
                    .with_heartbeat_seconds(10)
                    .end(),
            )
            .expect("start");
        let diagnostics = linted(&workflow);
        assert!(diagnostics.iter().any(|d| {
            d.rule == "heartbeat_within_timeout" && d.severity == Severity::Warning
        }));
        lint_or_raise(&workflow, &[]).expect("warnings only");
    }

    #[test]
    fn lint_choice_without_default_expected_warning() {
        let mut workflow = Workflow::new();
        workflow
            .start(Pass::new("a"))
            .expect("start")
            .choice([Var::new("$.x").is_present().next_id("done")], None, Some("c"))
            .expect("choice")
            .continue_from(Pass::new("done").end())
            .expect("resume");
        let diagnostics = lint_or_raise(&workflow, &[]).expect("no errors");
        assert!(diagnostics.iter().any(|d| d.rule == "choice_has_default"));
    }

    #[test]
    fn lint_nested_branch_error_expected_scoped_state_id() {
        let mut broken = Workflow::subflow_from(Pass::new("x"));
        let mut workflow = Workflow::new();
        workflow
            .start(Pass::new("a"))
            .expect("start")
            .parallel([broken.take()], Some("para"))
            .expect("parallel")
            .end()
            .expect("end");

        let error = lint_or_raise(&workflow, &[]).expect_err("branch state lacks End");
        assert!(error.errors_count > 0);
        assert!(error.diagnostics.iter().any(|d| {
            d.rule == "state_checks" && d.state_id.as_deref() == Some("para[0]/x")
        }));
    }

    #[test]
    fn lint_with_registered_error_code_expected_clean() {
        let mut workflow = Workflow::new();
        workflow
            .start(
                Task::new("t", "arn:aws:lambda:us-east-1:1:function:f")
                    .with_retry(Retry::new().if_error("MyApp.Throttled"))
                    .end(),
            )
            .expect("start");

        let diagnostics = lint(&workflow, &[]);
        let finding = diagnostics
            .iter()
            .find(|d| d.rule == "state_checks")
            .expect("unregistered code is reported");
        assert_eq!(finding.state_id.as_deref(), Some("t"));
        assert!(finding.fix.as_deref().is_some_and(|fix| fix.contains("with_error_code")));

        let config = SerializeConfig::default().with_error_code("MyApp.Throttled");
        let diagnostics = lint_or_raise_with(&workflow, &config, &[]).expect("code is registered");
        assert!(diagnostics.iter().all(|d| d.rule != "state_checks"));
    }

    #[test]
    fn lint_map_iterator_error_expected_iterator_scope() {
        let mut workflow = Workflow::new();
        workflow
            .start(Pass::new("a"))
            .expect("start")
            .map(Workflow::subflow_from(Pass::new("x")), None, None, Some("m"))
            .expect("map")
            .end()
            .expect("end");

        let error = lint_or_raise(&workflow, &[]).expect_err("iterator state lacks End");
        assert!(error.diagnostics.iter().any(|d| {
            d.rule == "state_checks" && d.state_id.as_deref() == Some("m.Iterator/x")
        }));
    }

    struct NoComments;

    impl LintRule for NoComments {
        fn name(&self) -> &str {
            "no_comments"
        }

        fn apply(&self, workflow: &Workflow) -> Vec<Diagnostic> {
            workflow
                .states()
                .filter(|state| state.comment().is_none())
                .map(|state| {
                    Diagnostic::new(self.name(), Severity::Info, "state has no comment")
                        .with_state_id(state.id())
                })
                .collect()
        }
    }

    #[test]
    fn lint_extra_rule_expected_applied() {
        let mut workflow = Workflow::new();
        workflow.start(Pass::new("a").end()).expect("start");
        let diagnostics = lint(&workflow, &[&NoComments]);
        assert!(diagnostics.iter().any(|d| d.rule == "no_comments"));
    }
}
