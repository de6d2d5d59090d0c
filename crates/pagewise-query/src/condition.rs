//! Where-clause conditions and their evaluation.
//!
//! A [`Condition`] names a field, an operator, an optional pattern and an
//! optional option (a case-insensitivity flag, or regular expression
//! modifiers). [`evaluate`] is the single-shot evaluator; the filter uses
//! [`Condition::prepare`] so that regular expressions are compiled once per
//! run.
//!
//! Evaluation fails open: a missing value or pattern lets the record pass,
//! and so does an operator error, which is returned as a [`ConditionError`]
//! for the caller to log and report.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::{ConditionError, QueryError};
use crate::op::{Op, Operator};
use crate::value::{Number, Value};

/// A single where-clause predicate.
///
/// # Example
///
/// ```
/// use pagewise_query::{Condition, Op};
///
/// let by_name = Condition::new("name", Op::LikeB, "smith").insensitive();
/// let parsed: Condition = "name:like_b:smith:i".parse().unwrap();
/// assert_eq!(parsed.field, by_name.field);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// The field to read from each record.
    #[serde(default)]
    pub field: String,
    /// The comparison operator.
    #[serde(rename = "condition", default = "blank_operator")]
    pub op: Operator,
    /// The pattern compared against the field value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Pattern>,
    /// Case-insensitivity flag, or modifier flags for `regexp`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<ConditionOption>,
}

fn blank_operator() -> Operator {
    Operator::Unknown(String::new())
}

impl Condition {
    /// Creates a condition with a pattern and no option.
    pub fn new(field: impl Into<String>, op: impl Into<Operator>, value: impl Into<Pattern>) -> Self {
        Condition {
            field: field.into(),
            op: op.into(),
            value: Some(value.into()),
            option: None,
        }
    }

    /// Creates a condition without a pattern (`is_null`, `is_not_null`).
    pub fn unary(field: impl Into<String>, op: impl Into<Operator>) -> Self {
        Condition {
            field: field.into(),
            op: op.into(),
            value: None,
            option: None,
        }
    }

    /// Sets the option slot.
    pub fn with_option(mut self, option: impl Into<ConditionOption>) -> Self {
        self.option = Some(option.into());
        self
    }

    /// Marks the condition case-insensitive.
    pub fn insensitive(self) -> Self {
        self.with_option(true)
    }

    /// A condition with no field or no operator name is skipped by the filter.
    pub fn is_inert(&self) -> bool {
        self.field.is_empty() || self.op.is_blank()
    }

    /// Evaluates this condition against a field value.
    pub fn evaluate(&self, value: &Value<'_>) -> Result<bool, ConditionError> {
        self.prepare()?.evaluate(value)
    }

    /// Resolves the operator and compiles any regular expression.
    pub fn prepare(&self) -> Result<PreparedCondition<'_>, ConditionError> {
        let op = self.op.op().ok_or_else(|| ConditionError::UnknownOperator {
            field: self.field.clone(),
            name: self.op.name().to_string(),
        })?;
        let regex = match (op, &self.value) {
            (Op::Regexp, Some(pattern)) => Some(compile_regex(&pattern.text(), self.option.as_ref())?),
            _ => None,
        };
        Ok(PreparedCondition {
            condition: self,
            op,
            insensitive: self.option.as_ref().is_some_and(ConditionOption::is_set),
            regex,
        })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.op)?;
        if let Some(value) = &self.value {
            write!(f, ":{}", value.text())?;
        }
        if let Some(option) = &self.option {
            write!(f, ":{option}")?;
        }
        Ok(())
    }
}

impl FromStr for Condition {
    type Err = QueryError;

    /// Parses `field:op[:value[:option]]`.
    ///
    /// The value is read as a boolean or number when it looks like one and as
    /// a string otherwise. The option is a flag string (`i` for the text
    /// operators, regular expression flags for `regexp`). A value that itself
    /// contains `:` must be given through a structured where-clause instead.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parts = input.splitn(4, ':');
        let field = parts.next().unwrap_or_default().trim();
        if field.is_empty() {
            return Err(QueryError::condition(input, "missing field name"));
        }
        let op = match parts.next().map(str::trim) {
            Some(name) if !name.is_empty() => name
                .parse::<Op>()
                .map_err(|name| QueryError::condition(input, format!("unknown operator '{name}'")))?,
            _ => return Err(QueryError::condition(input, "missing operator")),
        };
        let value = parts.next().map(Pattern::infer);
        if value.is_none() && !op.is_presence_op() {
            return Err(QueryError::condition(input, format!("operator '{op}' needs a value")));
        }
        let option = parts
            .next()
            .filter(|flags| !flags.is_empty())
            .map(|flags| ConditionOption::Flags(flags.to_string()));
        Ok(Condition {
            field: field.to_string(),
            op: Operator::Known(op),
            value,
            option,
        })
    }
}

/// A condition whose operator is resolved and regex compiled.
#[derive(Debug)]
pub struct PreparedCondition<'c> {
    condition: &'c Condition,
    op: Op,
    insensitive: bool,
    regex: Option<Regex>,
}

impl<'c> PreparedCondition<'c> {
    /// The field this condition reads.
    pub fn field(&self) -> &'c str {
        &self.condition.field
    }

    /// The resolved operator.
    pub fn op(&self) -> Op {
        self.op
    }

    /// Evaluates against a field value.
    ///
    /// Prepared conditions cannot fail any more; the `Result` keeps the
    /// signature aligned with [`evaluate`].
    pub fn evaluate(&self, value: &Value<'_>) -> Result<bool, ConditionError> {
        Ok(self.matches(value))
    }

    /// Evaluates against a field value.
    pub fn matches(&self, value: &Value<'_>) -> bool {
        let pattern = self.condition.value.as_ref();
        match self.op {
            Op::Regexp => match (&self.regex, value.text()) {
                (Some(regex), Some(text)) => regex.is_match(&text),
                _ => true,
            },
            op => compare(op, value, pattern, self.insensitive),
        }
    }
}

/// Evaluates one operator against a value.
///
/// Absent values and patterns make the equality, ordering, text and regexp
/// operators pass. `is_null` and `is_not_null` ignore the pattern.
///
/// ```
/// use pagewise_query::{evaluate, Op, Operator, Pattern, Value};
///
/// let pattern = Pattern::from("Ab");
/// let op = Operator::Known(Op::LikeR);
/// assert_eq!(evaluate(&op, &Value::String("abc"), Some(&pattern), None), Ok(false));
/// assert_eq!(evaluate(&op, &Value::None, Some(&pattern), None), Ok(true));
/// ```
pub fn evaluate(
    op: &Operator,
    value: &Value<'_>,
    pattern: Option<&Pattern>,
    option: Option<&ConditionOption>,
) -> Result<bool, ConditionError> {
    let condition = Condition {
        field: String::new(),
        op: op.clone(),
        value: pattern.cloned(),
        option: option.cloned(),
    };
    condition.evaluate(value)
}

fn compare(op: Op, value: &Value<'_>, pattern: Option<&Pattern>, insensitive: bool) -> bool {
    match op {
        Op::IsNull => return value.text().map_or(true, |text| text.is_empty()),
        Op::IsNotNull => return value.text().is_some_and(|text| !text.is_empty()),
        _ => {}
    }
    let Some(pattern) = pattern else {
        return true;
    };
    if value.is_none() {
        return true;
    }
    let pattern = pattern.as_value();
    match op {
        Op::Eq => loose_eq(value, &pattern, insensitive),
        Op::Ne => !loose_eq(value, &pattern, insensitive),
        Op::Gt | Op::Ge | Op::Lt | Op::Le => loose_cmp(value, &pattern, insensitive)
            .is_some_and(|ordering| op.eval_ordering(ordering)),
        Op::LikeL | Op::LikeR | Op::LikeB => {
            let (Some(text), Some(needle)) = (value.text(), pattern.text()) else {
                return true;
            };
            let (text, needle) = if insensitive {
                (text.to_lowercase(), needle.to_lowercase())
            } else {
                (text.into_owned(), needle.into_owned())
            };
            match op {
                Op::LikeL => text.ends_with(&needle),
                Op::LikeR => text.starts_with(&needle),
                _ => text.contains(&needle),
            }
        }
        Op::IsNull | Op::IsNotNull | Op::Regexp => true,
    }
}

fn loose_eq(a: &Value<'_>, b: &Value<'_>, insensitive: bool) -> bool {
    if insensitive {
        if let (Some(a), Some(b)) = (a.text(), b.text()) {
            return a.to_lowercase() == b.to_lowercase();
        }
    }
    match (a, b) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a.compare(*b) == Some(Ordering::Equal),
        (Value::Composite(_), _) | (_, Value::Composite(_)) => a.text() == b.text(),
        _ => match (a.numeric(), b.numeric()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

fn loose_cmp(a: &Value<'_>, b: &Value<'_>, insensitive: bool) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) if insensitive => {
            Some(a.to_lowercase().cmp(&b.to_lowercase()))
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.compare(*b),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Composite(_), _) | (_, Value::Composite(_)) => None,
        _ => a.numeric()?.partial_cmp(&b.numeric()?),
    }
}

fn compile_regex(pattern: &str, option: Option<&ConditionOption>) -> Result<Regex, ConditionError> {
    let mut builder = RegexBuilder::new(pattern);
    match option {
        Some(ConditionOption::Flag(insensitive)) => {
            builder.case_insensitive(*insensitive);
        }
        Some(ConditionOption::Flags(flags)) => {
            for flag in flags.chars() {
                match flag {
                    'i' => builder.case_insensitive(true),
                    'm' => builder.multi_line(true),
                    's' => builder.dot_matches_new_line(true),
                    'x' => builder.ignore_whitespace(true),
                    'U' => builder.swap_greed(true),
                    // Global, sticky and unicode modes have no meaning for a
                    // single is-match test.
                    'g' | 'y' | 'u' => &mut builder,
                    other => return Err(ConditionError::InvalidRegexFlag { flag: other }),
                };
            }
        }
        None => {}
    }
    builder.build().map_err(|source| ConditionError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

/// Owned pattern stored in a condition.
///
/// Patterns are scalars; `null` in a serialized condition means "no pattern".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Json", into = "Json")]
pub enum Pattern {
    /// String pattern.
    String(String),
    /// Numeric pattern.
    Number(Number),
    /// Boolean pattern.
    Bool(bool),
}

impl Pattern {
    /// Reads a command-line value: booleans and numbers are recognised,
    /// anything else stays a string.
    pub fn infer(raw: &str) -> Self {
        match raw {
            "true" => return Pattern::Bool(true),
            "false" => return Pattern::Bool(false),
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Pattern::Number(Number::I64(i));
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Pattern::Number(Number::F64(f)),
            _ => Pattern::String(raw.to_string()),
        }
    }

    /// Borrowed view for comparison.
    pub fn as_value(&self) -> Value<'_> {
        match self {
            Pattern::String(s) => Value::String(s),
            Pattern::Number(n) => Value::Number(*n),
            Pattern::Bool(b) => Value::Bool(*b),
        }
    }

    /// Text form of the pattern.
    pub fn text(&self) -> String {
        self.as_value().text().unwrap_or_default().into_owned()
    }
}

impl TryFrom<Json> for Pattern {
    type Error = String;

    fn try_from(raw: Json) -> Result<Self, Self::Error> {
        match raw {
            Json::String(s) => Ok(Pattern::String(s)),
            Json::Number(n) => Ok(Pattern::Number(Number::from_json(&n))),
            Json::Bool(b) => Ok(Pattern::Bool(b)),
            other => Err(format!("condition value must be a scalar, got {other}")),
        }
    }
}

impl From<Pattern> for Json {
    fn from(pattern: Pattern) -> Self {
        match pattern {
            Pattern::String(s) => Json::String(s),
            Pattern::Number(n) => Json::from(n),
            Pattern::Bool(b) => Json::Bool(b),
        }
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Pattern::String(s.to_string())
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Pattern::String(s)
    }
}

impl From<bool> for Pattern {
    fn from(b: bool) -> Self {
        Pattern::Bool(b)
    }
}

impl From<Number> for Pattern {
    fn from(n: Number) -> Self {
        Pattern::Number(n)
    }
}

impl From<i32> for Pattern {
    fn from(n: i32) -> Self {
        Pattern::Number(Number::from(n))
    }
}

impl From<i64> for Pattern {
    fn from(n: i64) -> Self {
        Pattern::Number(Number::from(n))
    }
}

impl From<u64> for Pattern {
    fn from(n: u64) -> Self {
        Pattern::Number(Number::from(n))
    }
}

impl From<f64> for Pattern {
    fn from(n: f64) -> Self {
        Pattern::Number(Number::from(n))
    }
}

/// The option slot of a condition.
///
/// For the equality, ordering and text operators any truthy option turns on
/// case-insensitive comparison. For `regexp` a string option lists modifier
/// flags and `true` means `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionOption {
    /// Boolean flag.
    Flag(bool),
    /// Flag string such as `"i"` or `"im"`.
    Flags(String),
}

impl ConditionOption {
    /// Truthiness of the option.
    pub fn is_set(&self) -> bool {
        match self {
            ConditionOption::Flag(b) => *b,
            ConditionOption::Flags(s) => !s.is_empty(),
        }
    }
}

impl From<bool> for ConditionOption {
    fn from(b: bool) -> Self {
        ConditionOption::Flag(b)
    }
}

impl From<&str> for ConditionOption {
    fn from(s: &str) -> Self {
        ConditionOption::Flags(s.to_string())
    }
}

impl fmt::Display for ConditionOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionOption::Flag(b) => write!(f, "{b}"),
            ConditionOption::Flags(s) => f.write_str(s),
        }
    }
}
