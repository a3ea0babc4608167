//! Reusable validation rules.
//!
//! - [`exclusive_key_groups`] checks that an object carries keys from exactly
//!   one of two alternative groups. It backs both the filter-entry shapes
//!   (`value`/`matchMode` versus `operator`/`constraints`), the sort
//!   representations (`sortField`/`sortOrder` versus `multiSortMeta`) and the
//!   `rows`/`pageSize` alias.
//! - [`filter_value`] checks a filter value against its match mode's allowed
//!   types and mode-specific structure, producing a typed [`FilterValue`].

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use super::match_mode::{MatchMode, ValueType};
use crate::config::LazyLoadConfig;
use crate::models::{FilterValue, MorphRef, Scalar};
use crate::validation::{ValidationError, ValidationErrors};

const MORPH_KEYS: [&str; 2] = ["id", "morphType"];

const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

/// Join an attribute prefix and a key into a dotted path.
#[must_use]
pub fn path(attribute: &str, key: &str) -> String {
    if attribute.is_empty() {
        key.to_string()
    } else {
        format!("{attribute}.{key}")
    }
}

/// A key counts as present when it exists and is not `null`.
#[must_use]
pub fn is_present(object: &Map<String, Value>, key: &str) -> bool {
    object.get(key).is_some_and(|value| !value.is_null())
}

/// Two alternative key groups of one object.
#[derive(Debug, Clone, Copy)]
pub struct KeyGroups<'a> {
    pub first: &'a [&'a str],
    pub second: &'a [&'a str],
    /// Whether one of the groups must be present.
    pub required: bool,
}

/// Which of the two groups an object uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupPresence {
    Neither,
    First,
    Second,
    Both,
}

/// Check that `object` carries keys from at most one group (exactly one when
/// `groups.required`). Errors are recorded against `attribute`; dependent
/// checks should be skipped unless the result is `First` or `Second`.
pub fn exclusive_key_groups(
    object: &Map<String, Value>,
    attribute: &str,
    groups: KeyGroups<'_>,
    errors: &mut ValidationErrors,
) -> GroupPresence {
    let present = |keys: &[&str]| -> Vec<String> {
        keys.iter()
            .filter(|key| is_present(object, key))
            .map(|key| (*key).to_string())
            .collect()
    };
    let first = present(groups.first);
    let second = present(groups.second);

    match (first.is_empty(), second.is_empty()) {
        (true, true) => {
            if groups.required {
                let describe = |keys: &[&str]| {
                    keys.iter()
                        .map(|key| path(attribute, key))
                        .collect::<Vec<_>>()
                        .join(" and ")
                };
                errors.add(ValidationError::shape(
                    attribute,
                    format!(
                        "The fields {} or {} must be present",
                        describe(groups.first),
                        describe(groups.second)
                    ),
                ));
            }
            GroupPresence::Neither
        }
        (false, true) => GroupPresence::First,
        (true, false) => GroupPresence::Second,
        (false, false) => {
            for (present_keys, prohibited_keys) in [(&first, &second), (&second, &first)] {
                for present_key in present_keys {
                    for prohibited in prohibited_keys {
                        errors.add(ValidationError::shape(
                            path(attribute, prohibited),
                            format!(
                                "The {} field must be missing when {} is present",
                                path(attribute, prohibited),
                                path(attribute, present_key)
                            ),
                        ));
                    }
                }
            }
            GroupPresence::Both
        }
    }
}

/// Reject keys outside `allowed`. Returns false when any was found.
pub fn only_keys(
    object: &Map<String, Value>,
    attribute: &str,
    allowed: &[&str],
    errors: &mut ValidationErrors,
) -> bool {
    let mut clean = true;
    for key in object.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.add(ValidationError::shape(
                path(attribute, key),
                format!("The {} field is not allowed", path(attribute, key)),
            ));
            clean = false;
        }
    }
    clean
}

/// Convert a JSON scalar. Returns `None` for arrays, objects and null.
#[must_use]
pub fn scalar(value: &Value) -> Option<Scalar> {
    match value {
        Value::Bool(b) => Some(Scalar::Boolean(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(Scalar::Integer)
            .or_else(|| n.as_f64().map(Scalar::Float)),
        Value::String(s) => Some(Scalar::Text(s.clone())),
        Value::Array(_) | Value::Object(_) | Value::Null => None,
    }
}

/// Parse a date or date-time string; offset-less input is taken as UTC.
#[must_use]
pub fn parse_date_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }
    if let Some(parsed) = OFFSET_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
    {
        return Some(parsed);
    }
    let utc = FixedOffset::east_opt(0)?;
    let naive = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    naive.and_local_timezone(utc).single()
}

/// Validate `value` for `mode` and convert it.
///
/// Records errors against `attribute` and returns `None` when the value is
/// rejected.
pub fn filter_value(
    attribute: &str,
    mode: MatchMode,
    value: &Value,
    config: &LazyLoadConfig,
    errors: &mut ValidationErrors,
) -> Option<FilterValue> {
    if !(config.value_types)(mode).contains(&ValueType::of(value)) {
        errors.add(ValidationError::invalid_type(
            attribute,
            "Invalid filter value data type",
        ));
        return None;
    }

    match mode {
        MatchMode::Between => between(attribute, mode, value, errors),
        m if m.takes_scalar_list() => scalar_list(attribute, mode, value, errors),
        m if m.takes_morph_refs() => morph_refs(attribute, mode, value, config, errors),
        m if m.is_date() || m.is_date_time() => {
            let parsed = value.as_str().and_then(parse_date_time);
            match parsed {
                Some(parsed) if m.is_date() => Some(FilterValue::Date(parsed.date_naive())),
                Some(parsed) => Some(FilterValue::DateTime(parsed.with_timezone(&Utc))),
                None => {
                    errors.add(ValidationError::structural(
                        attribute,
                        format!("The {attribute} must be a valid date string"),
                    ));
                    None
                }
            }
        }
        _ => match scalar(value) {
            Some(scalar) => Some(FilterValue::Scalar(scalar)),
            None => {
                errors.add(ValidationError::invalid_type(
                    attribute,
                    "Invalid filter value data type",
                ));
                None
            }
        },
    }
}

fn items(value: &Value) -> &[Value] {
    value.as_array().map_or(&[], Vec::as_slice)
}

fn scalar_list(
    attribute: &str,
    mode: MatchMode,
    value: &Value,
    errors: &mut ValidationErrors,
) -> Option<FilterValue> {
    let scalars: Option<Vec<Scalar>> = items(value).iter().map(scalar).collect();
    if scalars.is_none() {
        errors.add(ValidationError::invalid_type(
            attribute,
            format!("Filter value items for match mode '{mode}' must be scalars only"),
        ));
    }
    scalars.map(FilterValue::List)
}

fn between(
    attribute: &str,
    mode: MatchMode,
    value: &Value,
    errors: &mut ValidationErrors,
) -> Option<FilterValue> {
    let [low, high] = items(value) else {
        errors.add(ValidationError::structural(
            attribute,
            format!("Filter value items count for match mode '{mode}' must be exactly 2"),
        ));
        return None;
    };

    let bound = |item: &Value| match item {
        Value::Number(_) | Value::String(_) => scalar(item),
        _ => None,
    };
    match (bound(low), bound(high)) {
        (Some(low), Some(high)) => Some(FilterValue::Range(low, high)),
        _ => {
            errors.add(ValidationError::invalid_type(
                attribute,
                format!("Filter value items for match mode '{mode}' must be numeric or string only"),
            ));
            None
        }
    }
}

fn morph_refs(
    attribute: &str,
    mode: MatchMode,
    value: &Value,
    config: &LazyLoadConfig,
    errors: &mut ValidationErrors,
) -> Option<FilterValue> {
    let before = errors.len();
    let mut refs = Vec::new();

    for (index, item) in items(value).iter().enumerate() {
        let item_attribute = path(attribute, &index.to_string());
        let record = item
            .as_object()
            .filter(|record| record.len() == MORPH_KEYS.len() && MORPH_KEYS.iter().all(|k| record.contains_key(*k)));
        let Some(record) = record else {
            errors.add(ValidationError::structural(
                item_attribute,
                format!("Filter value items for match mode '{mode}' must contain exactly the keys id and morphType"),
            ));
            continue;
        };

        let id = scalar(&record["id"]);
        if id.is_none() {
            errors.add(ValidationError::invalid_type(
                path(&item_attribute, "id"),
                format!("Filter value item ids for match mode '{mode}' must be scalars"),
            ));
        }

        let morph_type = match record["morphType"].as_str() {
            Some(morph_type) if config.allows_morph_type(morph_type) => Some(morph_type),
            Some(morph_type) => {
                errors.add(ValidationError::structural(
                    path(&item_attribute, "morphType"),
                    format!("The morph type '{morph_type}' is not allowed"),
                ));
                None
            }
            None => {
                errors.add(ValidationError::invalid_type(
                    path(&item_attribute, "morphType"),
                    format!("Filter value item morph types for match mode '{mode}' must be strings"),
                ));
                None
            }
        };

        if let (Some(id), Some(morph_type)) = (id, morph_type) {
            refs.push(MorphRef {
                id,
                morph_type: morph_type.to_string(),
            });
        }
    }

    (errors.len() == before).then_some(FilterValue::MorphRefs(refs))
}
