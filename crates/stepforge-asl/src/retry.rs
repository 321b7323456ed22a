//! Error-matching policies attached to Task, Parallel and Map states.
//!
//! Reference: <https://docs.aws.amazon.com/step-functions/latest/dg/concepts-error-handling.html>

use crate::fields::{
    BACKOFF_RATE, ERROR_EQUALS, INTERVAL_SECONDS, MAX_ATTEMPTS, NEXT, RESULT_PATH, error_code,
};
use crate::object::string_value;
use crate::{
    AslError, AslObject, AslResult, ErrorCodeRegistry, FieldName, SerializeConfig, State,
    ensure_reference_path,
};
use serde_json::Value;

/// Builder methods shared by `Retry` and `Catch` for filling `ErrorEquals`.
pub trait ErrorMatcher: Sized {
    fn error_equals_mut(&mut self) -> &mut Vec<String>;

    /// Appends `code` unless it is already listed.
    fn if_error(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        let errors = self.error_equals_mut();
        if !errors.contains(&code) {
            errors.push(code);
        }
        self
    }

    fn if_all_error(self) -> Self {
        self.if_error(error_code::ALL)
    }

    fn if_heartbeat_timeout_error(self) -> Self {
        self.if_error(error_code::HEARTBEAT_TIMEOUT)
    }

    fn if_timeout_error(self) -> Self {
        self.if_error(error_code::TIMEOUT)
    }

    fn if_task_failed_error(self) -> Self {
        self.if_error(error_code::TASK_FAILED)
    }

    fn if_permissions_error(self) -> Self {
        self.if_error(error_code::PERMISSIONS)
    }

    fn if_result_path_match_failure_error(self) -> Self {
        self.if_error(error_code::RESULT_PATH_MATCH_FAILURE)
    }

    fn if_parameter_path_failure_error(self) -> Self {
        self.if_error(error_code::PARAMETER_PATH_FAILURE)
    }

    fn if_branch_failed_error(self) -> Self {
        self.if_error(error_code::BRANCH_FAILED)
    }

    fn if_no_choice_matched_error(self) -> Self {
        self.if_error(error_code::NO_CHOICE_MATCHED)
    }

    fn if_intrinsic_failure_error(self) -> Self {
        self.if_error(error_code::INTRINSIC_FAILURE)
    }

    fn if_lambda_service_error(self) -> Self {
        self.if_error(error_code::LAMBDA_SERVICE)
    }

    fn if_lambda_aws_error(self) -> Self {
        self.if_error(error_code::LAMBDA_AWS)
    }

    fn if_lambda_sdk_client_error(self) -> Self {
        self.if_error(error_code::LAMBDA_SDK_CLIENT)
    }

    fn if_lambda_too_many_requests_error(self) -> Self {
        self.if_error(error_code::LAMBDA_TOO_MANY_REQUESTS)
    }

    fn if_lambda_unknown_error(self) -> Self {
        self.if_error(error_code::LAMBDA_UNKNOWN)
    }
}

fn check_error_codes(
    entity: &str,
    error_equals: &[String],
    registry: &ErrorCodeRegistry,
) -> AslResult<()> {
    if error_equals.is_empty() {
        return Err(AslError::state(entity, "ErrorEquals must not be empty"));
    }
    for code in error_equals {
        if !registry.contains(code) {
            return Err(AslError::state(
                entity,
                format!("unrecognized error code '{code}'"),
            ));
        }
    }
    Ok(())
}

fn error_list(error_equals: &[String]) -> Option<Value> {
    Some(Value::Array(
        error_equals.iter().cloned().map(Value::String).collect(),
    ))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Retry {
    pub error_equals: Vec<String>,
    pub interval_seconds: Option<u32>,
    pub backoff_rate: Option<f64>,
    pub max_attempts: Option<u32>,
}

const RETRY_ORDER: &[FieldName] = &[ERROR_EQUALS, INTERVAL_SECONDS, BACKOFF_RATE, MAX_ATTEMPTS];

impl Retry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval_seconds(mut self, seconds: u32) -> Self {
        self.interval_seconds = Some(seconds);
        self
    }

    pub fn with_backoff_rate(mut self, rate: f64) -> Self {
        self.backoff_rate = Some(rate);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
}

impl ErrorMatcher for Retry {
    fn error_equals_mut(&mut self) -> &mut Vec<String> {
        &mut self.error_equals
    }
}

impl AslObject for Retry {
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)> {
        vec![
            (ERROR_EQUALS, error_list(&self.error_equals)),
            (INTERVAL_SECONDS, self.interval_seconds.map(Value::from)),
            (BACKOFF_RATE, self.backoff_rate.map(Value::from)),
            (MAX_ATTEMPTS, self.max_attempts.map(Value::from)),
        ]
    }

    fn field_order(&self) -> Option<&'static [FieldName]> {
        Some(RETRY_ORDER)
    }

    fn validate_before_serialize(&self, config: &SerializeConfig) -> AslResult<()> {
        check_error_codes("Retry", &self.error_equals, &config.error_codes)?;
        if let Some(rate) = self.backoff_rate {
            if !rate.is_finite() || rate < 1.0 {
                return Err(AslError::state(
                    "Retry",
                    format!("BackoffRate must be a number >= 1.0, got {rate}"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catch {
    pub error_equals: Vec<String>,
    pub result_path: Option<String>,
    pub next: Option<String>,
}

const CATCH_ORDER: &[FieldName] = &[ERROR_EQUALS, RESULT_PATH, NEXT];

impl Catch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }

    /// Routes matched errors to `state`. Only the id is kept.
    pub fn next_then(self, state: &State) -> Self {
        self.next_id(state.id())
    }

    pub fn next_id(mut self, id: impl Into<String>) -> Self {
        self.next = Some(id.into());
        self
    }
}

impl ErrorMatcher for Catch {
    fn error_equals_mut(&mut self) -> &mut Vec<String> {
        &mut self.error_equals
    }
}

impl AslObject for Catch {
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)> {
        vec![
            (ERROR_EQUALS, error_list(&self.error_equals)),
            (RESULT_PATH, string_value(&self.result_path)),
            (NEXT, string_value(&self.next)),
        ]
    }

    fn field_order(&self) -> Option<&'static [FieldName]> {
        Some(CATCH_ORDER)
    }

    fn validate_before_serialize(&self, config: &SerializeConfig) -> AslResult<()> {
        if self.next.as_deref().unwrap_or_default().is_empty() {
            return Err(AslError::state("Catch", "Next fallback state is required"));
        }
        check_error_codes("Catch", &self.error_equals, &config.error_codes)?;
        if let Some(path) = &self.result_path {
            ensure_reference_path(path)
                .map_err(|error| AslError::state("Catch", format!("ResultPath: {error}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pass;
    use serde_json::json;

    #[test]
    fn retry_serialize_lambda_errors_expected_canonical_order() {
        let retry = Retry::new()
            .with_interval_seconds(10)
            .with_backoff_rate(2.0)
            .with_max_attempts(3)
            .if_lambda_service_error()
            .if_lambda_aws_error()
            .if_lambda_sdk_client_error()
            .if_lambda_too_many_requests_error();

        let data = retry.serialize().expect("retry should serialize");
        assert_eq!(
            Value::Object(data.clone()),
            json!({
                "ErrorEquals": [
                    "Lambda.ServiceException",
                    "Lambda.AWSLambdaException",
                    "Lambda.SdkClientException",
                    "Lambda.TooManyRequestsException"
                ],
                "IntervalSeconds": 10,
                "BackoffRate": 2.0,
                "MaxAttempts": 3
            })
        );
        assert_eq!(
            data.keys().collect::<Vec<_>>(),
            vec!["ErrorEquals", "IntervalSeconds", "BackoffRate", "MaxAttempts"]
        );
    }

    #[test]
    fn retry_if_error_duplicate_expected_single_entry() {
        let retry = Retry::new().if_all_error().if_all_error();
        assert_eq!(retry.error_equals, vec!["States.ALL".to_string()]);
    }

    #[test]
    fn retry_empty_error_equals_expected_state_validation_error() {
        let error = Retry::new().serialize().expect_err("should fail");
        assert!(matches!(error, AslError::StateValidation { .. }));
    }

    #[test]
    fn retry_unknown_code_expected_error_unless_registered() {
        let retry = Retry::new().if_error("MyApp.Throttled");
        assert!(retry.serialize().is_err());

        let config = SerializeConfig::default().with_error_code("MyApp.Throttled");
        retry.serialize_with(&config).expect("registered code");
    }

    #[test]
    fn retry_backoff_below_one_expected_error() {
        let retry = Retry::new().if_all_error().with_backoff_rate(0.5);
        assert!(retry.serialize().is_err());
    }

    #[test]
    fn catch_serialize_expected_result_path_and_next() {
        let last = State::from(Pass::new("last"));
        let catch = Catch::new()
            .with_result_path("$.error")
            .next_then(&last)
            .if_lambda_unknown_error();

        let data = catch.serialize().expect("catch should serialize");
        assert_eq!(
            Value::Object(data),
            json!({
                "ErrorEquals": ["Lambda.Unknown"],
                "ResultPath": "$.error",
                "Next": "last"
            })
        );
    }

    #[test]
    fn catch_missing_next_expected_error_even_with_valid_codes() {
        let error = Catch::new()
            .if_all_error()
            .serialize()
            .expect_err("should fail");
        assert!(error.to_string().contains("Next"));
    }

    #[test]
    fn catch_invalid_result_path_expected_error() {
        let catch = Catch::new()
            .if_all_error()
            .with_result_path("error")
            .next_id("fallback");
        assert!(catch.serialize().is_err());
    }
}
