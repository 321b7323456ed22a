use crate::AslError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    pub state_id: Option<String>,
    pub transition: Option<(String, String)>,
    pub fix: Option<String>,
}

impl Diagnostic {
    pub fn new(rule: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            severity,
            message: message.into(),
            state_id: None,
            transition: None,
            fix: None,
        }
    }

    /// Error-severity finding for a failed definition check. Unknown error
    /// codes and malformed paths come with a fix hint.
    pub fn from_error(rule: impl Into<String>, error: &AslError) -> Self {
        let message = match error {
            AslError::StateValidation { entity, message } => format!("{entity}: {message}"),
            other => other.to_string(),
        };
        let fix = match error {
            AslError::PathFormat { .. } => Some("use '$' or a path starting with '$.'"),
            AslError::StateValidation { message, .. } if message.contains("not a reference path") => {
                Some("use '$' or a path starting with '$.'")
            }
            AslError::StateValidation { message, .. }
                if message.starts_with("unrecognized error code") =>
            {
                Some("register the code with SerializeConfig::with_error_code")
            }
            _ => None,
        };
        let diagnostic = Self::new(rule, Severity::Error, message);
        match fix {
            Some(fix) => diagnostic.with_fix(fix),
            None => diagnostic,
        }
    }

    pub fn with_state_id(mut self, state_id: impl Into<String>) -> Self {
        self.state_id = Some(state_id.into());
        self
    }

    pub fn with_transition(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.transition = Some((from.into(), to.into()));
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    /// Re-roots a diagnostic raised inside a nested branch or iterator graph.
    pub fn scoped(mut self, scope: &str) -> Self {
        self.state_id = Some(match self.state_id.take() {
            Some(id) => format!("{scope}/{id}"),
            None => scope.to_string(),
        });
        if let Some((from, to)) = self.transition.take() {
            self.transition = Some((format!("{scope}/{from}"), format!("{scope}/{to}")));
        }
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_nested_diagnostic_expected_prefixed_ids() {
        let diagnostic = Diagnostic::new("reachability", Severity::Error, "unreachable")
            .with_state_id("b")
            .with_transition("a", "b")
            .scoped("para[0]");
        assert_eq!(diagnostic.state_id.as_deref(), Some("para[0]/b"));
        assert_eq!(
            diagnostic.transition,
            Some(("para[0]/a".to_string(), "para[0]/b".to_string()))
        );
    }

    #[test]
    fn from_error_unknown_code_expected_registration_hint() {
        let error = AslError::state("t.Retry[0]/Retry", "unrecognized error code 'MyApp.Oops'");
        let diagnostic = Diagnostic::from_error("state_checks", &error);
        assert!(diagnostic.is_error());
        assert_eq!(
            diagnostic.message,
            "t.Retry[0]/Retry: unrecognized error code 'MyApp.Oops'"
        );
        assert_eq!(
            diagnostic.fix.as_deref(),
            Some("register the code with SerializeConfig::with_error_code")
        );
    }

    #[test]
    fn from_error_bad_path_expected_path_hint() {
        let error = AslError::PathFormat {
            path: "input".to_string(),
        };
        let diagnostic = Diagnostic::from_error("state_checks", &error);
        assert_eq!(diagnostic.fix.as_deref(), Some("use '$' or a path starting with '$.'"));

        let other = AslError::graph("workflow has no StartAt");
        assert!(Diagnostic::from_error("start_at", &other).fix.is_none());
    }
}
