//! Descriptor validation.
//!
//! [`validate`] checks a raw JSON descriptor against the shape grammar and the
//! per-match-mode type table, and converts it into a [`ValidatedDescriptor`].
//! Independent sub-trees (each filter entry, each sort entry, the global
//! filter fields, pagination) are all checked in one pass so the caller gets
//! the complete error list; once a sub-tree fails, checks that depend on it are
//! skipped.

use serde_json::{Map, Value};

use super::match_mode::MatchMode;
use super::rules::{self, GroupPresence, KeyGroups, exclusive_key_groups, is_present, only_keys, path};
use crate::config::LazyLoadConfig;
use crate::models::{
    Constraint, FieldFilter, FilterEntry, FilterOperator, Pagination, SortEntry, SortOrder,
    Sorting, ValidatedDescriptor,
};
use crate::validation::{ValidationError, ValidationErrors};

/// Reserved filter key holding the global filter.
pub const GLOBAL_FILTER_KEY: &str = "global";

const FILTER_KEYS: [&str; 4] = ["value", "matchMode", "operator", "constraints"];
const CONSTRAINT_KEYS: [&str; 2] = ["value", "matchMode"];
const SORT_META_KEYS: [&str; 2] = ["field", "order"];

const FILTER_SHAPES: KeyGroups<'static> = KeyGroups {
    first: &["value", "matchMode"],
    second: &["operator", "constraints"],
    required: true,
};

const SORT_SHAPES: KeyGroups<'static> = KeyGroups {
    first: &["sortField", "sortOrder"],
    second: &["multiSortMeta"],
    required: false,
};

const ROWS_ALIASES: KeyGroups<'static> = KeyGroups {
    first: &["rows"],
    second: &["pageSize"],
    required: false,
};

/// Validate a raw descriptor.
///
/// # Errors
///
/// Returns every problem found when the descriptor cannot be compiled safely.
pub fn validate(
    raw: &Value,
    config: &LazyLoadConfig,
) -> Result<ValidatedDescriptor, ValidationErrors> {
    let Some(root) = raw.as_object() else {
        return Err(ValidationError::shape("descriptor", "The descriptor must be an object").into());
    };

    let mut errors = ValidationErrors::new();
    let (filters, global) = validate_filters(root, config, &mut errors);
    let global_filter_fields = validate_global_filter_fields(root, config, &mut errors);
    let sorting = validate_sorting(root, config, &mut errors);
    let pagination = validate_pagination(root, &mut errors);

    if !errors.is_empty() {
        tracing::debug!(error_count = errors.len(), "Lazy load descriptor rejected");
        return Err(errors);
    }

    Ok(ValidatedDescriptor {
        filters,
        global,
        global_filter_fields,
        sorting,
        pagination: pagination.unwrap_or_default(),
    })
}

fn validate_filters(
    root: &Map<String, Value>,
    config: &LazyLoadConfig,
    errors: &mut ValidationErrors,
) -> (Vec<FieldFilter>, Option<Constraint>) {
    let mut filters = Vec::new();
    let mut global = None;

    if !is_present(root, "filters") {
        return (filters, global);
    }
    let Some(entries) = root["filters"].as_object() else {
        errors.add(ValidationError::invalid_type("filters", "The filters field must be an object"));
        return (filters, global);
    };

    for (field, raw_entry) in entries {
        let attribute = path("filters", field);
        let Some(entry) = filter_entry(&attribute, raw_entry, config, errors) else {
            continue;
        };

        if field == GLOBAL_FILTER_KEY {
            match entry {
                FilterEntry::Simple(constraint) => global = Some(constraint),
                FilterEntry::Compound { .. } => errors.add(ValidationError::shape(
                    attribute,
                    "The filters.global field must use value and matchMode",
                )),
            }
        } else {
            filters.push(FieldFilter {
                field: field.clone(),
                entry,
            });
        }
    }

    (filters, global)
}

fn filter_entry(
    attribute: &str,
    raw: &Value,
    config: &LazyLoadConfig,
    errors: &mut ValidationErrors,
) -> Option<FilterEntry> {
    let Some(entry) = raw.as_object() else {
        errors.add(ValidationError::shape(
            attribute,
            format!("The {attribute} field must be an object"),
        ));
        return None;
    };
    if !only_keys(entry, attribute, &FILTER_KEYS, errors) {
        return None;
    }

    match exclusive_key_groups(entry, attribute, FILTER_SHAPES, errors) {
        GroupPresence::First => {
            if !require_together(entry, attribute, "value", "matchMode", errors) {
                return None;
            }
            constraint(attribute, entry, config, errors).map(FilterEntry::Simple)
        }
        GroupPresence::Second => compound(attribute, entry, config, errors),
        GroupPresence::Neither | GroupPresence::Both => None,
    }
}

/// Each of two keys requires the other.
fn require_together(
    object: &Map<String, Value>,
    attribute: &str,
    first: &str,
    second: &str,
    errors: &mut ValidationErrors,
) -> bool {
    let mut ok = true;
    for (present, missing) in [(first, second), (second, first)] {
        if is_present(object, present) && !is_present(object, missing) {
            errors.add(ValidationError::shape(
                path(attribute, missing),
                format!(
                    "The {} field is required when {} is present",
                    path(attribute, missing),
                    path(attribute, present)
                ),
            ));
            ok = false;
        }
    }
    ok
}

fn constraint(
    attribute: &str,
    object: &Map<String, Value>,
    config: &LazyLoadConfig,
    errors: &mut ValidationErrors,
) -> Option<Constraint> {
    let mode_attribute = path(attribute, "matchMode");
    let mode = object["matchMode"]
        .as_str()
        .and_then(|raw| raw.parse::<MatchMode>().ok())
        .filter(|mode| config.allows_mode(*mode));
    let Some(mode) = mode else {
        errors.add(ValidationError::invalid_type(
            &mode_attribute,
            format!("The selected {mode_attribute} is invalid"),
        ));
        return None;
    };

    let value_attribute = path(attribute, "value");
    rules::filter_value(&value_attribute, mode, &object["value"], config, errors)
        .map(|value| Constraint::new(mode, value))
}

fn compound(
    attribute: &str,
    entry: &Map<String, Value>,
    config: &LazyLoadConfig,
    errors: &mut ValidationErrors,
) -> Option<FilterEntry> {
    if !require_together(entry, attribute, "operator", "constraints", errors) {
        return None;
    }

    let operator_attribute = path(attribute, "operator");
    let operator = entry["operator"].as_str().and_then(FilterOperator::parse);
    if operator.is_none() {
        errors.add(ValidationError::invalid_type(
            &operator_attribute,
            format!("The selected {operator_attribute} is invalid"),
        ));
    }

    let constraints_attribute = path(attribute, "constraints");
    let Some(raw_constraints) = entry["constraints"].as_array() else {
        errors.add(ValidationError::invalid_type(
            &constraints_attribute,
            format!("The {constraints_attribute} field must be an array"),
        ));
        return None;
    };
    if raw_constraints.is_empty() {
        errors.add(ValidationError::shape(
            &constraints_attribute,
            format!("The {constraints_attribute} field must not be empty"),
        ));
        return None;
    }

    let before = errors.len();
    let mut constraints = Vec::with_capacity(raw_constraints.len());
    for (index, raw) in raw_constraints.iter().enumerate() {
        let item_attribute = path(&constraints_attribute, &index.to_string());
        let Some(item) = raw.as_object() else {
            errors.add(ValidationError::shape(
                &item_attribute,
                format!("The {item_attribute} field must be an object"),
            ));
            continue;
        };
        if !only_keys(item, &item_attribute, &CONSTRAINT_KEYS, errors) {
            continue;
        }
        let mut missing = false;
        for key in CONSTRAINT_KEYS {
            if !is_present(item, key) {
                errors.add(ValidationError::shape(
                    path(&item_attribute, key),
                    format!("The {} field is required", path(&item_attribute, key)),
                ));
                missing = true;
            }
        }
        if missing {
            continue;
        }
        if let Some(constraint) = constraint(&item_attribute, item, config, errors) {
            constraints.push(constraint);
        }
    }

    match operator {
        Some(operator) if errors.len() == before => Some(FilterEntry::Compound {
            operator,
            constraints,
        }),
        _ => None,
    }
}

/// Non-empty string of at most `max` characters.
fn field_name(
    attribute: &str,
    raw: Option<&Value>,
    max: usize,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match raw {
        None | Some(Value::Null) => {
            errors.add(ValidationError::shape(
                attribute,
                format!("The {attribute} field is required"),
            ));
            None
        }
        Some(Value::String(name)) if name.is_empty() => {
            errors.add(ValidationError::shape(
                attribute,
                format!("The {attribute} field is required"),
            ));
            None
        }
        Some(Value::String(name)) if name.chars().count() > max => {
            errors.add(ValidationError::structural(
                attribute,
                format!("The {attribute} field must not be greater than {max} characters"),
            ));
            None
        }
        Some(Value::String(name)) => Some(name.clone()),
        Some(_) => {
            errors.add(ValidationError::invalid_type(
                attribute,
                format!("The {attribute} field must be a string"),
            ));
            None
        }
    }
}

/// Flag every entry whose name occurs more than once.
fn distinct(attribute: &str, suffix: Option<&str>, names: &[(usize, String)], errors: &mut ValidationErrors) -> bool {
    let mut unique = true;
    for (index, name) in names {
        if names.iter().filter(|(_, other)| other == name).count() > 1 {
            let item = path(attribute, &index.to_string());
            let item = suffix.map_or_else(|| item.clone(), |suffix| path(&item, suffix));
            errors.add(ValidationError::structural(
                &item,
                format!("The {item} field has a duplicate value"),
            ));
            unique = false;
        }
    }
    unique
}

fn validate_global_filter_fields(
    root: &Map<String, Value>,
    config: &LazyLoadConfig,
    errors: &mut ValidationErrors,
) -> Option<Vec<String>> {
    const ATTRIBUTE: &str = "globalFilterFields";

    if !is_present(root, ATTRIBUTE) {
        return None;
    }
    let Some(raw_fields) = root[ATTRIBUTE].as_array() else {
        errors.add(ValidationError::invalid_type(
            ATTRIBUTE,
            "The globalFilterFields field must be an array",
        ));
        return None;
    };

    let before = errors.len();
    let names: Vec<(usize, String)> = raw_fields
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let attribute = path(ATTRIBUTE, &index.to_string());
            field_name(&attribute, Some(raw), config.max_field_length, errors).map(|name| (index, name))
        })
        .collect();
    let unique = distinct(ATTRIBUTE, None, &names, errors);

    (unique && errors.len() == before).then(|| names.into_iter().map(|(_, name)| name).collect())
}

fn sort_order(attribute: &str, raw: &Value, errors: &mut ValidationErrors) -> Option<SortOrder> {
    let order = raw.as_i64().and_then(SortOrder::from_code);
    if order.is_none() {
        errors.add(ValidationError::invalid_type(
            attribute,
            format!("The selected {attribute} is invalid"),
        ));
    }
    order
}

fn validate_sorting(
    root: &Map<String, Value>,
    config: &LazyLoadConfig,
    errors: &mut ValidationErrors,
) -> Sorting {
    match exclusive_key_groups(root, "", SORT_SHAPES, errors) {
        GroupPresence::First => single_sort(root, config, errors),
        GroupPresence::Second => multi_sort(root, config, errors),
        GroupPresence::Neither | GroupPresence::Both => Sorting::None,
    }
}

fn single_sort(
    root: &Map<String, Value>,
    config: &LazyLoadConfig,
    errors: &mut ValidationErrors,
) -> Sorting {
    if !is_present(root, "sortField") {
        errors.add(ValidationError::shape(
            "sortField",
            "The sortField field is required when sortOrder is present",
        ));
        return Sorting::None;
    }

    let field = field_name("sortField", root.get("sortField"), config.max_field_length, errors);
    let order = if is_present(root, "sortOrder") {
        sort_order("sortOrder", &root["sortOrder"], errors)
    } else {
        Some(SortOrder::Ascending)
    };

    match (field, order) {
        (Some(field), Some(order)) => Sorting::Single(SortEntry::new(field, order)),
        _ => Sorting::None,
    }
}

fn multi_sort(
    root: &Map<String, Value>,
    config: &LazyLoadConfig,
    errors: &mut ValidationErrors,
) -> Sorting {
    const ATTRIBUTE: &str = "multiSortMeta";

    let Some(raw_entries) = root[ATTRIBUTE].as_array() else {
        errors.add(ValidationError::invalid_type(
            ATTRIBUTE,
            "The multiSortMeta field must be an array",
        ));
        return Sorting::None;
    };

    let before = errors.len();
    let mut entries = Vec::with_capacity(raw_entries.len());
    let mut names = Vec::with_capacity(raw_entries.len());
    for (index, raw) in raw_entries.iter().enumerate() {
        let attribute = path(ATTRIBUTE, &index.to_string());
        let Some(entry) = raw.as_object() else {
            errors.add(ValidationError::shape(
                &attribute,
                format!("The {attribute} field must be an object"),
            ));
            continue;
        };
        if !only_keys(entry, &attribute, &SORT_META_KEYS, errors) {
            continue;
        }

        let field = field_name(
            &path(&attribute, "field"),
            entry.get("field"),
            config.max_field_length,
            errors,
        );
        let order = if is_present(entry, "order") {
            sort_order(&path(&attribute, "order"), &entry["order"], errors)
        } else {
            let order_attribute = path(&attribute, "order");
            errors.add(ValidationError::shape(
                &order_attribute,
                format!("The {order_attribute} field is required"),
            ));
            None
        };

        if let Some(field) = &field {
            names.push((index, field.clone()));
        }
        if let (Some(field), Some(order)) = (field, order) {
            entries.push(SortEntry::new(field, order));
        }
    }

    let unique = distinct(ATTRIBUTE, Some("field"), &names, errors);
    if unique && errors.len() == before {
        Sorting::Multi(entries)
    } else {
        Sorting::None
    }
}

fn page_number(
    root: &Map<String, Value>,
    key: &str,
    min: u64,
    errors: &mut ValidationErrors,
) -> Option<u64> {
    let raw = &root[key];
    if raw.as_i64().is_none() && raw.as_u64().is_none() {
        errors.add(ValidationError::invalid_type(
            key,
            format!("The {key} field must be an integer"),
        ));
        return None;
    }
    match raw.as_u64() {
        Some(number) if number >= min => Some(number),
        _ => {
            errors.add(ValidationError::structural(
                key,
                format!("The {key} field must be at least {min}"),
            ));
            None
        }
    }
}

fn validate_pagination(root: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<Pagination> {
    if !is_present(root, "paginate") {
        errors.add(ValidationError::shape("paginate", "The paginate field is required"));
        return None;
    }
    let Some(paginate) = root["paginate"].as_bool() else {
        errors.add(ValidationError::invalid_type(
            "paginate",
            "The paginate field must be true or false",
        ));
        return None;
    };
    if !paginate {
        return Some(Pagination::Unbounded);
    }

    let rows = match exclusive_key_groups(root, "", ROWS_ALIASES, errors) {
        GroupPresence::First => page_number(root, "rows", 0, errors),
        GroupPresence::Second => page_number(root, "pageSize", 0, errors),
        GroupPresence::Neither => {
            errors.add(ValidationError::shape(
                "rows",
                "The rows field is required when paginate is true",
            ));
            None
        }
        GroupPresence::Both => None,
    };
    let page = if is_present(root, "page") {
        page_number(root, "page", 1, errors)
    } else {
        errors.add(ValidationError::shape(
            "page",
            "The page field is required when paginate is true",
        ));
        None
    };

    Some(Pagination::Paged {
        rows: rows?,
        page: page?,
    })
}
