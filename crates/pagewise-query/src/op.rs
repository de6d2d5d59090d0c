//! Comparison operators for where-clause conditions.
//!
//! The [`Op`] enum lists the supported operators under their wire names
//! (`eq`, `like_b`, `regexp`, ...). [`Operator`] is what a condition actually
//! carries: either a known [`Op`] or the unrecognised name it was given, so
//! that a bad operator can fail open when the condition is evaluated instead
//! of rejecting the whole where-clause at parse time.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Comparison operator for a condition.
///
/// - **Equality**: `Eq`, `Ne`
/// - **Ordering**: `Gt`, `Ge`, `Lt`, `Le`
/// - **Text**: `LikeR` (prefix), `LikeL` (suffix), `LikeB` (substring)
/// - **Presence**: `IsNull`, `IsNotNull`
/// - **Pattern**: `Regexp`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Wildcard on the left (`%PATTERN`): value ends with the pattern.
    LikeL,
    /// Wildcard on the right (`PATTERN%`): value starts with the pattern.
    LikeR,
    /// Wildcards on both sides (`%PATTERN%`): value contains the pattern.
    LikeB,
    /// Value is absent or empty.
    IsNull,
    /// Value is present and non-empty.
    IsNotNull,
    /// Value matches a regular expression.
    Regexp,
}

impl Op {
    /// All operators, in wire-name order.
    pub const ALL: [Op; 12] = [
        Op::Eq,
        Op::Ne,
        Op::Gt,
        Op::Ge,
        Op::Lt,
        Op::Le,
        Op::LikeL,
        Op::LikeR,
        Op::LikeB,
        Op::IsNull,
        Op::IsNotNull,
        Op::Regexp,
    ];

    /// Returns `true` for the operators that order values.
    pub fn is_ordering_op(self) -> bool {
        matches!(self, Op::Gt | Op::Ge | Op::Lt | Op::Le)
    }

    /// Returns `true` for the text-matching operators.
    pub fn is_like_op(self) -> bool {
        matches!(self, Op::LikeL | Op::LikeR | Op::LikeB)
    }

    /// Returns `true` for operators that ignore the pattern.
    pub fn is_presence_op(self) -> bool {
        matches!(self, Op::IsNull | Op::IsNotNull)
    }

    /// Evaluates an ordering operator given a comparison result.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Ge => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Le => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the wire name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Gt => "gt",
            Op::Ge => "ge",
            Op::Lt => "lt",
            Op::Le => "le",
            Op::LikeL => "like_l",
            Op::LikeR => "like_r",
            Op::LikeB => "like_b",
            Op::IsNull => "is_null",
            Op::IsNotNull => "is_not_null",
            Op::Regexp => "regexp",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Op::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// The operator slot of a condition.
///
/// Serializes as the bare operator name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    /// A supported operator.
    Known(Op),
    /// A name that matched no operator. Evaluating it is an error.
    Unknown(String),
}

impl Operator {
    /// Returns the known operator, if any.
    pub fn op(&self) -> Option<Op> {
        match self {
            Operator::Known(op) => Some(*op),
            Operator::Unknown(_) => None,
        }
    }

    /// Returns the name as written.
    pub fn name(&self) -> &str {
        match self {
            Operator::Known(op) => op.as_str(),
            Operator::Unknown(name) => name,
        }
    }

    /// Returns `true` when no operator name was given at all.
    pub fn is_blank(&self) -> bool {
        matches!(self, Operator::Unknown(name) if name.trim().is_empty())
    }
}

impl From<Op> for Operator {
    fn from(op: Op) -> Self {
        Operator::Known(op)
    }
}

impl From<String> for Operator {
    fn from(name: String) -> Self {
        match name.parse::<Op>() {
            Ok(op) => Operator::Known(op),
            Err(name) => Operator::Unknown(name),
        }
    }
}

impl From<&str> for Operator {
    fn from(name: &str) -> Self {
        Operator::from(name.to_string())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Known(op) => op.as_str().to_string(),
            Operator::Unknown(name) => name,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
