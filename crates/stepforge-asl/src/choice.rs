//! Choice rules: data-test expressions and the And/Or/Not combinators.
//!
//! Reference: <https://states-language.net/spec.html#choice-state>

use crate::fields::{AND, NEXT, NOT, OR, VARIABLE};
use crate::object::string_value;
use crate::{
    AslError, AslObject, AslResult, ExpectedKind, FieldMap, FieldName, Operator, SerializeConfig,
    State, is_reference_path,
};
use serde_json::Value;

/// Compares the value at `variable` using `operator` against `expected`.
#[derive(Clone, Debug, PartialEq)]
pub struct DataTest {
    pub variable: String,
    pub operator: Operator,
    pub expected: Value,
    pub next: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChoiceRule {
    Test(DataTest),
    And {
        rules: Vec<ChoiceRule>,
        next: Option<String>,
    },
    Or {
        rules: Vec<ChoiceRule>,
        next: Option<String>,
    },
    Not {
        rule: Box<ChoiceRule>,
        next: Option<String>,
    },
}

pub fn and(rules: impl IntoIterator<Item = ChoiceRule>) -> ChoiceRule {
    ChoiceRule::And {
        rules: rules.into_iter().collect(),
        next: None,
    }
}

pub fn or(rules: impl IntoIterator<Item = ChoiceRule>) -> ChoiceRule {
    ChoiceRule::Or {
        rules: rules.into_iter().collect(),
        next: None,
    }
}

pub fn not(rule: ChoiceRule) -> ChoiceRule {
    ChoiceRule::Not {
        rule: Box::new(rule),
        next: None,
    }
}

impl ChoiceRule {
    pub fn next(&self) -> Option<&str> {
        match self {
            Self::Test(test) => test.next.as_deref(),
            Self::And { next, .. } | Self::Or { next, .. } | Self::Not { next, .. } => {
                next.as_deref()
            }
        }
    }

    /// Routes a match to `state`. Only the id is kept.
    pub fn next_then(self, state: &State) -> Self {
        self.next_id(state.id())
    }

    pub fn next_id(mut self, id: impl Into<String>) -> Self {
        let id = Some(id.into());
        match &mut self {
            Self::Test(test) => test.next = id,
            Self::And { next, .. } | Self::Or { next, .. } | Self::Not { next, .. } => *next = id,
        }
        self
    }

    pub fn label(&self) -> String {
        match self {
            Self::Test(test) => format!("{} rule on '{}'", test.operator, test.variable),
            Self::And { .. } => "And rule".to_string(),
            Self::Or { .. } => "Or rule".to_string(),
            Self::Not { .. } => "Not rule".to_string(),
        }
    }

    fn nested(&self) -> Vec<&ChoiceRule> {
        match self {
            Self::Test(_) => Vec::new(),
            Self::And { rules, .. } | Self::Or { rules, .. } => rules.iter().collect(),
            Self::Not { rule, .. } => vec![rule.as_ref()],
        }
    }
}

fn check_expected(test: &DataTest, label: &str) -> AslResult<()> {
    let ok = match (test.operator.expected_kind(), &test.expected) {
        (ExpectedKind::Boolean, Value::Bool(_)) => true,
        (ExpectedKind::Number, Value::Number(_)) => true,
        (ExpectedKind::String | ExpectedKind::Timestamp, Value::String(_)) => true,
        (ExpectedKind::Path, Value::String(path)) => is_reference_path(path),
        _ => false,
    };
    if ok {
        return Ok(());
    }
    let wanted = match test.operator.expected_kind() {
        ExpectedKind::Boolean => "a boolean",
        ExpectedKind::Number => "a number",
        ExpectedKind::String => "a string",
        ExpectedKind::Timestamp => "a timestamp string",
        ExpectedKind::Path => "a reference path",
    };
    Err(AslError::state(
        label,
        format!(
            "{} expects {wanted}, got {}",
            test.operator, test.expected
        ),
    ))
}

impl AslObject for ChoiceRule {
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)> {
        match self {
            Self::Test(test) => vec![
                (VARIABLE, Some(Value::String(test.variable.clone()))),
                (NEXT, string_value(&test.next)),
            ],
            Self::And { next, .. } | Self::Or { next, .. } | Self::Not { next, .. } => {
                vec![(NEXT, string_value(next))]
            }
        }
    }

    fn field_order(&self) -> Option<&'static [FieldName]> {
        match self {
            // The operator key is dynamic; construction order is canonical.
            Self::Test(_) => None,
            Self::And { .. } => Some(&[AND, NEXT]),
            Self::Or { .. } => Some(&[OR, NEXT]),
            Self::Not { .. } => Some(&[NOT, NEXT]),
        }
    }

    fn validate_before_serialize(&self, _config: &SerializeConfig) -> AslResult<()> {
        let label = self.label();
        match self {
            Self::Test(test) => {
                if !is_reference_path(&test.variable) {
                    return Err(AslError::state(
                        &label,
                        format!("Variable '{}' is not a reference path", test.variable),
                    ));
                }
                check_expected(test, &label)?;
            }
            Self::And { rules, .. } | Self::Or { rules, .. } => {
                if rules.is_empty() {
                    return Err(AslError::state(&label, "needs at least one nested rule"));
                }
            }
            Self::Not { .. } => {}
        }
        for nested in self.nested() {
            if let Some(next) = nested.next() {
                return Err(AslError::state(
                    &label,
                    format!(
                        "nested {} must not carry Next (found '{next}'); only the outermost rule routes",
                        nested.label()
                    ),
                ));
            }
        }
        Ok(())
    }

    fn build_fields(&self, config: &SerializeConfig) -> AslResult<FieldMap> {
        let mut data = FieldMap::new();
        match self {
            Self::Test(test) => {
                data.insert(
                    VARIABLE.wire.to_string(),
                    Value::String(test.variable.clone()),
                );
                data.insert(test.operator.as_str().to_string(), test.expected.clone());
            }
            Self::And { rules, .. } | Self::Or { rules, .. } => {
                let key = if matches!(self, Self::And { .. }) { AND } else { OR };
                let serialized = rules
                    .iter()
                    .map(|rule| rule.serialize_with(config).map(Value::Object))
                    .collect::<AslResult<Vec<_>>>()?;
                data.insert(key.wire.to_string(), Value::Array(serialized));
            }
            Self::Not { rule, .. } => {
                data.insert(
                    NOT.wire.to_string(),
                    Value::Object(rule.serialize_with(config)?),
                );
            }
        }
        if let Some(next) = self.next() {
            data.insert(NEXT.wire.to_string(), Value::String(next.to_string()));
        }
        Ok(data)
    }
}

/// Entry point for data-test expressions on a reference path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Var {
    path: String,
}

impl Var {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn test(&self, operator: Operator, expected: Value) -> ChoiceRule {
        ChoiceRule::Test(DataTest {
            variable: self.path.clone(),
            operator,
            expected,
            next: None,
        })
    }

    /// A string that is itself a reference path selects the `...Path`
    /// variant of `operator`.
    pub fn compare(&self, operator: Operator, expected: impl Into<Value>) -> ChoiceRule {
        let expected = expected.into();
        let operator = match (&expected, operator.path_variant()) {
            (Value::String(raw), Some(path_operator)) if is_reference_path(raw) => path_operator,
            _ => operator,
        };
        self.test(operator, expected)
    }

    /// Compares against the value at another reference path.
    pub fn compare_path(&self, operator: Operator, path: impl Into<String>) -> ChoiceRule {
        let operator = operator.path_variant().unwrap_or(operator);
        self.test(operator, Value::String(path.into()))
    }

    pub fn is_null(&self) -> ChoiceRule {
        self.test(Operator::IsNull, Value::Bool(true))
    }

    pub fn is_not_null(&self) -> ChoiceRule {
        self.test(Operator::IsNull, Value::Bool(false))
    }

    pub fn is_present(&self) -> ChoiceRule {
        self.test(Operator::IsPresent, Value::Bool(true))
    }

    pub fn is_not_present(&self) -> ChoiceRule {
        self.test(Operator::IsPresent, Value::Bool(false))
    }

    pub fn is_numeric(&self) -> ChoiceRule {
        self.test(Operator::IsNumeric, Value::Bool(true))
    }

    pub fn is_not_numeric(&self) -> ChoiceRule {
        self.test(Operator::IsNumeric, Value::Bool(false))
    }

    pub fn is_string(&self) -> ChoiceRule {
        self.test(Operator::IsString, Value::Bool(true))
    }

    pub fn is_not_string(&self) -> ChoiceRule {
        self.test(Operator::IsString, Value::Bool(false))
    }

    pub fn is_boolean(&self) -> ChoiceRule {
        self.test(Operator::IsBoolean, Value::Bool(true))
    }

    pub fn is_not_boolean(&self) -> ChoiceRule {
        self.test(Operator::IsBoolean, Value::Bool(false))
    }

    pub fn is_timestamp(&self) -> ChoiceRule {
        self.test(Operator::IsTimestamp, Value::Bool(true))
    }

    pub fn is_not_timestamp(&self) -> ChoiceRule {
        self.test(Operator::IsTimestamp, Value::Bool(false))
    }

    pub fn string_equals(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::StringEquals, value)
    }

    pub fn string_greater_than(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::StringGreaterThan, value)
    }

    pub fn string_greater_than_equals(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::StringGreaterThanEquals, value)
    }

    pub fn string_less_than(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::StringLessThan, value)
    }

    pub fn string_less_than_equals(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::StringLessThanEquals, value)
    }

    /// `pattern` may use `*` wildcards; it is never treated as a path.
    pub fn string_matches(&self, pattern: impl Into<String>) -> ChoiceRule {
        self.test(Operator::StringMatches, Value::String(pattern.into()))
    }

    pub fn numeric_equals(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::NumericEquals, value)
    }

    pub fn numeric_greater_than(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::NumericGreaterThan, value)
    }

    pub fn numeric_greater_than_equals(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::NumericGreaterThanEquals, value)
    }

    pub fn numeric_less_than(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::NumericLessThan, value)
    }

    pub fn numeric_less_than_equals(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::NumericLessThanEquals, value)
    }

    pub fn boolean_equals(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::BooleanEquals, value)
    }

    pub fn timestamp_equals(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::TimestampEquals, value)
    }

    pub fn timestamp_greater_than(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::TimestampGreaterThan, value)
    }

    pub fn timestamp_greater_than_equals(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::TimestampGreaterThanEquals, value)
    }

    pub fn timestamp_less_than(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::TimestampLessThan, value)
    }

    pub fn timestamp_less_than_equals(&self, value: impl Into<Value>) -> ChoiceRule {
        self.compare(Operator::TimestampLessThanEquals, value)
    }

    pub fn string_equals_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::StringEqualsPath, Value::String(path.into()))
    }

    pub fn string_greater_than_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::StringGreaterThanPath, Value::String(path.into()))
    }

    pub fn string_greater_than_equals_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::StringGreaterThanEqualsPath, Value::String(path.into()))
    }

    pub fn string_less_than_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::StringLessThanPath, Value::String(path.into()))
    }

    pub fn string_less_than_equals_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::StringLessThanEqualsPath, Value::String(path.into()))
    }

    pub fn numeric_equals_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::NumericEqualsPath, Value::String(path.into()))
    }

    pub fn numeric_greater_than_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::NumericGreaterThanPath, Value::String(path.into()))
    }

    pub fn numeric_greater_than_equals_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::NumericGreaterThanEqualsPath, Value::String(path.into()))
    }

    pub fn numeric_less_than_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::NumericLessThanPath, Value::String(path.into()))
    }

    pub fn numeric_less_than_equals_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::NumericLessThanEqualsPath, Value::String(path.into()))
    }

    pub fn boolean_equals_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::BooleanEqualsPath, Value::String(path.into()))
    }

    pub fn timestamp_equals_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::TimestampEqualsPath, Value::String(path.into()))
    }

    pub fn timestamp_greater_than_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::TimestampGreaterThanPath, Value::String(path.into()))
    }

    pub fn timestamp_greater_than_equals_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::TimestampGreaterThanEqualsPath, Value::String(path.into()))
    }

    pub fn timestamp_less_than_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::TimestampLessThanPath, Value::String(path.into()))
    }

    pub fn timestamp_less_than_equals_path(&self, path: impl Into<String>) -> ChoiceRule {
        self.test(Operator::TimestampLessThanEqualsPath, Value::String(path.into()))
    }
}
