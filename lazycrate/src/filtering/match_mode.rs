//! Match modes and their allowed value types.
//!
//! A [`MatchMode`] names the comparison a filter constraint performs. Each mode
//! declares the JSON value types it accepts through [`MatchMode::allowed_types`];
//! the validator checks values against that table and the compiler relies on it
//! when choosing a predicate.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Runtime type of a JSON filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer,
    Float,
    Boolean,
    String,
    Array,
    Object,
    Null,
}

impl ValueType {
    /// Classify a JSON value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    #[must_use]
    pub const fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Float | Self::Boolean | Self::String
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        };
        f.write_str(name)
    }
}

const STRING_ONLY: &[ValueType] = &[ValueType::String];
const SCALARS: &[ValueType] = &[
    ValueType::Integer,
    ValueType::Float,
    ValueType::Boolean,
    ValueType::String,
];
const NUMERIC: &[ValueType] = &[ValueType::Integer, ValueType::Float];
const ARRAY_ONLY: &[ValueType] = &[ValueType::Array];

/// Comparison semantics of a single filter constraint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum MatchMode {
    StartsWith,
    EndsWith,
    Contains,
    NotContains,
    Equals,
    NotEquals,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    In,
    NotIn,
    InMany,
    NotInMany,
    InMorphMany,
    NotInMorphMany,
    DateAfter,
    DateBefore,
    DateIs,
    DateIsNot,
    DateTimeAfter,
    DateTimeBefore,
    DateTimeIs,
    DateTimeIsNot,
}

impl MatchMode {
    pub const ALL: [Self; 25] = [
        Self::StartsWith,
        Self::EndsWith,
        Self::Contains,
        Self::NotContains,
        Self::Equals,
        Self::NotEquals,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Between,
        Self::In,
        Self::NotIn,
        Self::InMany,
        Self::NotInMany,
        Self::InMorphMany,
        Self::NotInMorphMany,
        Self::DateAfter,
        Self::DateBefore,
        Self::DateIs,
        Self::DateIsNot,
        Self::DateTimeAfter,
        Self::DateTimeBefore,
        Self::DateTimeIs,
        Self::DateTimeIsNot,
    ];

    /// Wire name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Between => "between",
            Self::In => "in",
            Self::NotIn => "notIn",
            Self::InMany => "inMany",
            Self::NotInMany => "notInMany",
            Self::InMorphMany => "inMorphMany",
            Self::NotInMorphMany => "notInMorphMany",
            Self::DateAfter => "dateAfter",
            Self::DateBefore => "dateBefore",
            Self::DateIs => "dateIs",
            Self::DateIsNot => "dateIsNot",
            Self::DateTimeAfter => "dateTimeAfter",
            Self::DateTimeBefore => "dateTimeBefore",
            Self::DateTimeIs => "dateTimeIs",
            Self::DateTimeIsNot => "dateTimeIsNot",
        }
    }

    /// Value types accepted by this mode.
    #[must_use]
    pub const fn allowed_types(self) -> &'static [ValueType] {
        match self {
            Self::StartsWith
            | Self::EndsWith
            | Self::Contains
            | Self::NotContains
            | Self::DateAfter
            | Self::DateBefore
            | Self::DateIs
            | Self::DateIsNot
            | Self::DateTimeAfter
            | Self::DateTimeBefore
            | Self::DateTimeIs
            | Self::DateTimeIsNot => STRING_ONLY,
            Self::Equals | Self::NotEquals => SCALARS,
            Self::Gt | Self::Gte | Self::Lt | Self::Lte => NUMERIC,
            Self::Between
            | Self::In
            | Self::NotIn
            | Self::InMany
            | Self::NotInMany
            | Self::InMorphMany
            | Self::NotInMorphMany => ARRAY_ONLY,
        }
    }

    /// Calendar-date comparisons that ignore time of day.
    #[must_use]
    pub const fn is_date(self) -> bool {
        matches!(
            self,
            Self::DateAfter | Self::DateBefore | Self::DateIs | Self::DateIsNot
        )
    }

    /// Full timestamp comparisons.
    #[must_use]
    pub const fn is_date_time(self) -> bool {
        matches!(
            self,
            Self::DateTimeAfter | Self::DateTimeBefore | Self::DateTimeIs | Self::DateTimeIsNot
        )
    }

    /// Modes whose value is a list of scalars.
    #[must_use]
    pub const fn takes_scalar_list(self) -> bool {
        matches!(
            self,
            Self::In | Self::NotIn | Self::InMany | Self::NotInMany
        )
    }

    #[must_use]
    pub const fn takes_morph_refs(self) -> bool {
        matches!(self, Self::InMorphMany | Self::NotInMorphMany)
    }

    /// Modes that can compare text, and so fold case under the global filter
    /// when their value is text.
    #[must_use]
    pub const fn compares_text(self) -> bool {
        matches!(
            self,
            Self::StartsWith
                | Self::EndsWith
                | Self::Contains
                | Self::NotContains
                | Self::Equals
                | Self::NotEquals
                | Self::In
                | Self::NotIn
        )
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a match mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMatchMode(pub String);

impl fmt::Display for UnknownMatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown match mode '{}'", self.0)
    }
}

impl std::error::Error for UnknownMatchMode {}

impl FromStr for MatchMode {
    type Err = UnknownMatchMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownMatchMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_mode_round_trips_through_its_name() {
        for mode in MatchMode::ALL {
            assert_eq!(mode.as_str().parse::<MatchMode>(), Ok(mode));
            assert_eq!(serde_json::to_value(mode).unwrap(), json!(mode.as_str()));
        }
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!("like".parse::<MatchMode>().is_err());
        assert!("Equals".parse::<MatchMode>().is_err());
    }

    #[test]
    fn test_value_type_classification() {
        assert_eq!(ValueType::of(&json!(1)), ValueType::Integer);
        assert_eq!(ValueType::of(&json!(1.5)), ValueType::Float);
        assert_eq!(ValueType::of(&json!(true)), ValueType::Boolean);
        assert_eq!(ValueType::of(&json!("a")), ValueType::String);
        assert_eq!(ValueType::of(&json!([1])), ValueType::Array);
        assert_eq!(ValueType::of(&json!({"a": 1})), ValueType::Object);
        assert_eq!(ValueType::of(&json!(null)), ValueType::Null);
    }

    #[test]
    fn test_allowed_types_table() {
        assert_eq!(MatchMode::Contains.allowed_types(), &[ValueType::String]);
        assert!(MatchMode::Equals.allowed_types().contains(&ValueType::Boolean));
        assert!(!MatchMode::Gt.allowed_types().contains(&ValueType::String));
        assert_eq!(MatchMode::InMorphMany.allowed_types(), &[ValueType::Array]);
        assert_eq!(MatchMode::DateTimeIs.allowed_types(), &[ValueType::String]);
    }
}
