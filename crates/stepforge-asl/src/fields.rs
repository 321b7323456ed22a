//! Fixed ASL vocabulary: field names, state type tags, choice operators and
//! the recognized error codes.
//!
//! Reference: <https://states-language.net/spec.html>

use std::fmt;

/// One entry of an alias table: the builder's attribute name and the exact
/// name the ASL schema expects on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldName {
    pub attr: &'static str,
    pub wire: &'static str,
}

const fn field(attr: &'static str, wire: &'static str) -> FieldName {
    FieldName { attr, wire }
}

pub const TYPE: FieldName = field("type", "Type");
pub const COMMENT: FieldName = field("comment", "Comment");
pub const START_AT: FieldName = field("start_at", "StartAt");
pub const STATES: FieldName = field("states", "States");
pub const VERSION: FieldName = field("version", "Version");
pub const TIMEOUT_SECONDS: FieldName = field("timeout_seconds", "TimeoutSeconds");
pub const NEXT: FieldName = field("next", "Next");
pub const END: FieldName = field("end", "End");
pub const INPUT_PATH: FieldName = field("input_path", "InputPath");
pub const OUTPUT_PATH: FieldName = field("output_path", "OutputPath");
pub const PARAMETERS: FieldName = field("parameters", "Parameters");
pub const RESULT_SELECTOR: FieldName = field("result_selector", "ResultSelector");
pub const RESULT_PATH: FieldName = field("result_path", "ResultPath");
pub const RETRY: FieldName = field("retry", "Retry");
pub const CATCH: FieldName = field("catch", "Catch");
pub const RESOURCE: FieldName = field("resource", "Resource");
pub const TIMEOUT_SECONDS_PATH: FieldName = field("timeout_seconds_path", "TimeoutSecondsPath");
pub const HEARTBEAT_SECONDS: FieldName = field("heartbeat_seconds", "HeartbeatSeconds");
pub const HEARTBEAT_SECONDS_PATH: FieldName =
    field("heartbeat_seconds_path", "HeartbeatSecondsPath");
pub const BRANCHES: FieldName = field("branches", "Branches");
pub const ITERATOR: FieldName = field("iterator", "Iterator");
pub const ITEMS_PATH: FieldName = field("items_path", "ItemsPath");
pub const MAX_CONCURRENCY: FieldName = field("max_concurrency", "MaxConcurrency");
pub const RESULT: FieldName = field("result", "Result");
pub const SECONDS: FieldName = field("seconds", "Seconds");
pub const TIMESTAMP: FieldName = field("timestamp", "Timestamp");
pub const SECONDS_PATH: FieldName = field("seconds_path", "SecondsPath");
pub const TIMESTAMP_PATH: FieldName = field("timestamp_path", "TimestampPath");
pub const CHOICES: FieldName = field("choices", "Choices");
pub const DEFAULT: FieldName = field("default", "Default");
pub const ERROR: FieldName = field("error", "Error");
pub const CAUSE: FieldName = field("cause", "Cause");
pub const ERROR_EQUALS: FieldName = field("error_equals", "ErrorEquals");
pub const INTERVAL_SECONDS: FieldName = field("interval_seconds", "IntervalSeconds");
pub const BACKOFF_RATE: FieldName = field("backoff_rate", "BackoffRate");
pub const MAX_ATTEMPTS: FieldName = field("max_attempts", "MaxAttempts");
pub const VARIABLE: FieldName = field("variable", "Variable");
pub const AND: FieldName = field("and", "And");
pub const OR: FieldName = field("or", "Or");
pub const NOT: FieldName = field("not", "Not");

/// Alias table shared by every ASL entity.
pub const ASL_FIELDS: &[FieldName] = &[
    TYPE,
    COMMENT,
    START_AT,
    STATES,
    VERSION,
    TIMEOUT_SECONDS,
    NEXT,
    END,
    INPUT_PATH,
    OUTPUT_PATH,
    PARAMETERS,
    RESULT_SELECTOR,
    RESULT_PATH,
    RETRY,
    CATCH,
    RESOURCE,
    TIMEOUT_SECONDS_PATH,
    HEARTBEAT_SECONDS,
    HEARTBEAT_SECONDS_PATH,
    BRANCHES,
    ITERATOR,
    ITEMS_PATH,
    MAX_CONCURRENCY,
    RESULT,
    SECONDS,
    TIMESTAMP,
    SECONDS_PATH,
    TIMESTAMP_PATH,
    CHOICES,
    DEFAULT,
    ERROR,
    CAUSE,
    ERROR_EQUALS,
    INTERVAL_SECONDS,
    BACKOFF_RATE,
    MAX_ATTEMPTS,
    VARIABLE,
    AND,
    OR,
    NOT,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateType {
    Task,
    Parallel,
    Map,
    Pass,
    Wait,
    Choice,
    Succeed,
    Fail,
}

impl StateType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Parallel => "Parallel",
            Self::Map => "Map",
            Self::Pass => "Pass",
            Self::Wait => "Wait",
            Self::Choice => "Choice",
            Self::Succeed => "Succeed",
            Self::Fail => "Fail",
        }
    }

    /// Choice, Succeed and Fail carry neither `Next` nor `End`.
    pub fn has_transition(self) -> bool {
        !matches!(self, Self::Choice | Self::Succeed | Self::Fail)
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a data-test expression compares the variable against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpectedKind {
    Boolean,
    String,
    Number,
    Timestamp,
    Path,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    IsBoolean,
    IsNull,
    IsNumeric,
    IsPresent,
    IsString,
    IsTimestamp,
    StringEquals,
    StringEqualsPath,
    StringGreaterThan,
    StringGreaterThanPath,
    StringGreaterThanEquals,
    StringGreaterThanEqualsPath,
    StringLessThan,
    StringLessThanPath,
    StringLessThanEquals,
    StringLessThanEqualsPath,
    StringMatches,
    NumericEquals,
    NumericEqualsPath,
    NumericGreaterThan,
    NumericGreaterThanPath,
    NumericGreaterThanEquals,
    NumericGreaterThanEqualsPath,
    NumericLessThan,
    NumericLessThanPath,
    NumericLessThanEquals,
    NumericLessThanEqualsPath,
    BooleanEquals,
    BooleanEqualsPath,
    TimestampEquals,
    TimestampEqualsPath,
    TimestampGreaterThan,
    TimestampGreaterThanPath,
    TimestampGreaterThanEquals,
    TimestampGreaterThanEqualsPath,
    TimestampLessThan,
    TimestampLessThanPath,
    TimestampLessThanEquals,
    TimestampLessThanEqualsPath,
}

impl Operator {
    pub const ALL: &'static [Operator] = &[
        Self::IsBoolean,
        Self::IsNull,
        Self::IsNumeric,
        Self::IsPresent,
        Self::IsString,
        Self::IsTimestamp,
        Self::StringEquals,
        Self::StringEqualsPath,
        Self::StringGreaterThan,
        Self::StringGreaterThanPath,
        Self::StringGreaterThanEquals,
        Self::StringGreaterThanEqualsPath,
        Self::StringLessThan,
        Self::StringLessThanPath,
        Self::StringLessThanEquals,
        Self::StringLessThanEqualsPath,
        Self::StringMatches,
        Self::NumericEquals,
        Self::NumericEqualsPath,
        Self::NumericGreaterThan,
        Self::NumericGreaterThanPath,
        Self::NumericGreaterThanEquals,
        Self::NumericGreaterThanEqualsPath,
        Self::NumericLessThan,
        Self::NumericLessThanPath,
        Self::NumericLessThanEquals,
        Self::NumericLessThanEqualsPath,
        Self::BooleanEquals,
        Self::BooleanEqualsPath,
        Self::TimestampEquals,
        Self::TimestampEqualsPath,
        Self::TimestampGreaterThan,
        Self::TimestampGreaterThanPath,
        Self::TimestampGreaterThanEquals,
        Self::TimestampGreaterThanEqualsPath,
        Self::TimestampLessThan,
        Self::TimestampLessThanPath,
        Self::TimestampLessThanEquals,
        Self::TimestampLessThanEqualsPath,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::IsBoolean => "IsBoolean",
            Self::IsNull => "IsNull",
            Self::IsNumeric => "IsNumeric",
            Self::IsPresent => "IsPresent",
            Self::IsString => "IsString",
            Self::IsTimestamp => "IsTimestamp",
            Self::StringEquals => "StringEquals",
            Self::StringEqualsPath => "StringEqualsPath",
            Self::StringGreaterThan => "StringGreaterThan",
            Self::StringGreaterThanPath => "StringGreaterThanPath",
            Self::StringGreaterThanEquals => "StringGreaterThanEquals",
            Self::StringGreaterThanEqualsPath => "StringGreaterThanEqualsPath",
            Self::StringLessThan => "StringLessThan",
            Self::StringLessThanPath => "StringLessThanPath",
            Self::StringLessThanEquals => "StringLessThanEquals",
            Self::StringLessThanEqualsPath => "StringLessThanEqualsPath",
            Self::StringMatches => "StringMatches",
            Self::NumericEquals => "NumericEquals",
            Self::NumericEqualsPath => "NumericEqualsPath",
            Self::NumericGreaterThan => "NumericGreaterThan",
            Self::NumericGreaterThanPath => "NumericGreaterThanPath",
            Self::NumericGreaterThanEquals => "NumericGreaterThanEquals",
            Self::NumericGreaterThanEqualsPath => "NumericGreaterThanEqualsPath",
            Self::NumericLessThan => "NumericLessThan",
            Self::NumericLessThanPath => "NumericLessThanPath",
            Self::NumericLessThanEquals => "NumericLessThanEquals",
            Self::NumericLessThanEqualsPath => "NumericLessThanEqualsPath",
            Self::BooleanEquals => "BooleanEquals",
            Self::BooleanEqualsPath => "BooleanEqualsPath",
            Self::TimestampEquals => "TimestampEquals",
            Self::TimestampEqualsPath => "TimestampEqualsPath",
            Self::TimestampGreaterThan => "TimestampGreaterThan",
            Self::TimestampGreaterThanPath => "TimestampGreaterThanPath",
            Self::TimestampGreaterThanEquals => "TimestampGreaterThanEquals",
            Self::TimestampGreaterThanEqualsPath => "TimestampGreaterThanEqualsPath",
            Self::TimestampLessThan => "TimestampLessThan",
            Self::TimestampLessThanPath => "TimestampLessThanPath",
            Self::TimestampLessThanEquals => "TimestampLessThanEquals",
            Self::TimestampLessThanEqualsPath => "TimestampLessThanEqualsPath",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|operator| operator.as_str() == name)
    }

    pub fn is_path_variant(self) -> bool {
        self.as_str().ends_with("Path")
    }

    /// The `...Path` counterpart of a literal comparison, if one exists.
    pub fn path_variant(self) -> Option<Self> {
        if self.is_path_variant() {
            return None;
        }
        let wanted = format!("{}Path", self.as_str());
        Self::from_name(&wanted)
    }

    pub fn expected_kind(self) -> ExpectedKind {
        if self.is_path_variant() {
            return ExpectedKind::Path;
        }
        let name = self.as_str();
        if name.starts_with("Is") || name.starts_with("Boolean") {
            ExpectedKind::Boolean
        } else if name.starts_with("Numeric") {
            ExpectedKind::Number
        } else if name.starts_with("Timestamp") {
            ExpectedKind::Timestamp
        } else {
            ExpectedKind::String
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod error_code {
    pub const ALL: &str = "States.ALL";
    pub const HEARTBEAT_TIMEOUT: &str = "States.HeartbeatTimeout";
    pub const TIMEOUT: &str = "States.Timeout";
    pub const TASK_FAILED: &str = "States.TaskFailed";
    pub const PERMISSIONS: &str = "States.Permissions";
    pub const RESULT_PATH_MATCH_FAILURE: &str = "States.ResultPathMatchFailure";
    pub const PARAMETER_PATH_FAILURE: &str = "States.ParameterPathFailure";
    pub const BRANCH_FAILED: &str = "States.BranchFailed";
    pub const NO_CHOICE_MATCHED: &str = "States.NoChoiceMatched";
    pub const INTRINSIC_FAILURE: &str = "States.IntrinsicFailure";

    pub const LAMBDA_SERVICE: &str = "Lambda.ServiceException";
    pub const LAMBDA_AWS: &str = "Lambda.AWSLambdaException";
    pub const LAMBDA_SDK_CLIENT: &str = "Lambda.SdkClientException";
    pub const LAMBDA_TOO_MANY_REQUESTS: &str = "Lambda.TooManyRequestsException";
    pub const LAMBDA_UNKNOWN: &str = "Lambda.Unknown";

    pub const BUILT_IN: &[&str] = &[
        ALL,
        HEARTBEAT_TIMEOUT,
        TIMEOUT,
        TASK_FAILED,
        PERMISSIONS,
        RESULT_PATH_MATCH_FAILURE,
        PARAMETER_PATH_FAILURE,
        BRANCH_FAILED,
        NO_CHOICE_MATCHED,
        INTRINSIC_FAILURE,
        LAMBDA_SERVICE,
        LAMBDA_AWS,
        LAMBDA_SDK_CLIENT,
        LAMBDA_TOO_MANY_REQUESTS,
        LAMBDA_UNKNOWN,
    ];
}

/// Error codes accepted by `Retry`/`Catch` validation. Kept open because new
/// service integrations keep adding error names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorCodeRegistry {
    codes: Vec<String>,
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        Self {
            codes: error_code::BUILT_IN
                .iter()
                .map(|code| code.to_string())
                .collect(),
        }
    }
}

impl ErrorCodeRegistry {
    pub fn empty() -> Self {
        Self { codes: Vec::new() }
    }

    pub fn register(&mut self, code: impl Into<String>) -> &mut Self {
        let code = code.into();
        if !self.contains(&code) {
            self.codes.push(code);
        }
        self
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|known| known == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }
}
