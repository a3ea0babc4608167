//! Descriptor compilation.
//!
//! [`compile`] turns a [`ValidatedDescriptor`] into a backend-neutral
//! [`QueryPlan`]. Field predicates are AND-combined; OR only appears inside a
//! compound `or` entry, across the fields of the global filter and across the
//! types of a polymorphic filter. Translating a plan into SQL happens in
//! [`crate::core::query`].

use chrono::{DateTime, NaiveDate, Utc};

use super::match_mode::MatchMode;
use super::sort::{Ordering, ordering};
use crate::models::{
    Constraint, FilterEntry, FilterOperator, FilterValue, MorphRef, Pagination, Scalar,
    ValidatedDescriptor,
};

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// How the members of a [`Predicate::Group`] are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    All,
    Any,
}

impl From<FilterOperator> for Connective {
    fn from(operator: FilterOperator) -> Self {
        match operator {
            FilterOperator::And => Self::All,
            FilterOperator::Or => Self::Any,
        }
    }
}

/// One compiled condition. Field names are columns of the table the predicate
/// is evaluated against: the resource itself, or the related table inside
/// [`Predicate::Related`] and [`Predicate::Morph`].
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        field: String,
        op: Comparison,
        value: Scalar,
        /// Compare `LOWER(field)` instead of the raw column.
        fold_case: bool,
    },
    /// `LIKE` with `\` as escape character.
    Like {
        field: String,
        pattern: String,
        negated: bool,
        fold_case: bool,
    },
    /// Inclusive range.
    Between {
        field: String,
        low: Scalar,
        high: Scalar,
    },
    InSet {
        field: String,
        values: Vec<Scalar>,
        negated: bool,
        fold_case: bool,
    },
    /// Calendar-date part of `field` compared to `date`.
    Date {
        field: String,
        op: Comparison,
        date: NaiveDate,
    },
    DateTime {
        field: String,
        op: Comparison,
        at: DateTime<Utc>,
    },
    /// Related row matching `nested` exists (or not, when negated).
    Related {
        relation: String,
        negated: bool,
        nested: Box<Predicate>,
    },
    /// Polymorphic relation: for each `(morph_type, nested)` pair, the row has
    /// that type and a target row matching `nested` exists (or not). The pairs
    /// are OR-combined.
    Morph {
        relation: String,
        negated: bool,
        per_type: Vec<(String, Predicate)>,
    },
    Group {
        connective: Connective,
        predicates: Vec<Predicate>,
    },
}

/// Everything needed to run one lazy load.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// AND-combined.
    pub predicates: Vec<Predicate>,
    pub ordering: Vec<Ordering>,
    pub pagination: Pagination,
}

/// Escape `LIKE` wildcards so the value matches literally.
#[must_use]
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const fn comparison(mode: MatchMode) -> Comparison {
    match mode {
        MatchMode::NotEquals | MatchMode::DateIsNot | MatchMode::DateTimeIsNot => Comparison::Ne,
        MatchMode::Gt | MatchMode::DateAfter | MatchMode::DateTimeAfter => Comparison::Gt,
        MatchMode::Gte => Comparison::Gte,
        MatchMode::Lt | MatchMode::DateBefore | MatchMode::DateTimeBefore => Comparison::Lt,
        MatchMode::Lte => Comparison::Lte,
        _ => Comparison::Eq,
    }
}

/// True when every leaf of `value` is text. Only such values are folded; a
/// numeric or boolean value compares against the raw column.
fn is_text(value: &FilterValue) -> bool {
    match value {
        FilterValue::Scalar(scalar) => scalar.as_text().is_some(),
        FilterValue::List(items) => !items.is_empty() && items.iter().all(|item| item.as_text().is_some()),
        _ => false,
    }
}

fn lowercase(value: &FilterValue) -> FilterValue {
    match value {
        FilterValue::Scalar(scalar) => FilterValue::Scalar(scalar.to_lowercase()),
        FilterValue::List(items) => FilterValue::List(items.iter().map(Scalar::to_lowercase).collect()),
        other => other.clone(),
    }
}

/// Group morph references by type, keeping first-seen type order.
fn group_by_type(refs: &[MorphRef]) -> Vec<(String, Vec<Scalar>)> {
    let mut groups: Vec<(String, Vec<Scalar>)> = Vec::new();
    for morph in refs {
        match groups.iter_mut().find(|(t, _)| *t == morph.morph_type) {
            Some((_, ids)) => ids.push(morph.id.clone()),
            None => groups.push((morph.morph_type.clone(), vec![morph.id.clone()])),
        }
    }
    groups
}

/// Compile one `{value, matchMode}` pair against `field`.
///
/// Relation modes recurse on the related table's `id` with mode `in`.
#[must_use]
pub fn compile_clause(
    field: &str,
    mode: MatchMode,
    value: &FilterValue,
    fold_case: bool,
) -> Predicate {
    let field_name = field.to_string();
    let text = |scalar: &Scalar| match scalar {
        Scalar::Text(text) => escape_like(text),
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Boolean(b) => b.to_string(),
    };
    let like = |prefix: &str, suffix: &str, negated: bool| match value {
        FilterValue::Scalar(scalar) => Predicate::Like {
            field: field_name.clone(),
            pattern: format!("{prefix}{}{suffix}", text(scalar)),
            negated,
            fold_case,
        },
        _ => empty_match(),
    };

    match (mode, value) {
        (MatchMode::StartsWith, _) => like("", "%", false),
        (MatchMode::EndsWith, _) => like("%", "", false),
        (MatchMode::Contains, _) => like("%", "%", false),
        (MatchMode::NotContains, _) => like("%", "%", true),
        (MatchMode::Between, FilterValue::Range(low, high)) => Predicate::Between {
            field: field_name,
            low: low.clone(),
            high: high.clone(),
        },
        (MatchMode::In | MatchMode::NotIn, FilterValue::List(values)) => Predicate::InSet {
            field: field_name,
            values: values.clone(),
            negated: mode == MatchMode::NotIn,
            fold_case,
        },
        (MatchMode::InMany | MatchMode::NotInMany, _) => Predicate::Related {
            relation: field_name,
            negated: mode == MatchMode::NotInMany,
            nested: Box::new(compile_clause("id", MatchMode::In, value, false)),
        },
        (MatchMode::InMorphMany | MatchMode::NotInMorphMany, FilterValue::MorphRefs(refs)) => {
            let per_type = group_by_type(refs)
                .into_iter()
                .map(|(morph_type, ids)| {
                    let nested = compile_clause("id", MatchMode::In, &FilterValue::List(ids), false);
                    (morph_type, nested)
                })
                .collect();
            Predicate::Morph {
                relation: field_name,
                negated: mode == MatchMode::NotInMorphMany,
                per_type,
            }
        }
        (_, FilterValue::Date(date)) => Predicate::Date {
            field: field_name,
            op: comparison(mode),
            date: *date,
        },
        (_, FilterValue::DateTime(at)) => Predicate::DateTime {
            field: field_name,
            op: comparison(mode),
            at: *at,
        },
        (_, FilterValue::Scalar(scalar)) => Predicate::Compare {
            field: field_name,
            op: comparison(mode),
            value: scalar.clone(),
            fold_case,
        },
        _ => empty_match(),
    }
}

/// A predicate no row satisfies. Only reachable for mode/value pairs the
/// validator never produces.
fn empty_match() -> Predicate {
    Predicate::Group {
        connective: Connective::Any,
        predicates: Vec::new(),
    }
}

fn compile_constraint(field: &str, constraint: &Constraint) -> Predicate {
    compile_clause(field, constraint.match_mode, &constraint.value, false)
}

fn compile_entry(field: &str, entry: &FilterEntry) -> Predicate {
    match entry {
        FilterEntry::Simple(constraint) => compile_constraint(field, constraint),
        FilterEntry::Compound {
            operator,
            constraints,
        } => Predicate::Group {
            connective: (*operator).into(),
            predicates: constraints
                .iter()
                .map(|constraint| compile_constraint(field, constraint))
                .collect(),
        },
    }
}

/// The global filter applied to each of `fields`, OR-combined.
///
/// Text values of text-comparing modes are lower-cased and compared against
/// `LOWER(column)`, so matching is case-insensitive. Every other value,
/// including `between` bounds, is compared as sent.
fn compile_global(global: &Constraint, fields: &[&str]) -> Option<Predicate> {
    if fields.is_empty() {
        return None;
    }
    let fold_case = global.match_mode.compares_text() && is_text(&global.value);
    let value = if fold_case {
        lowercase(&global.value)
    } else {
        global.value.clone()
    };
    Some(Predicate::Group {
        connective: Connective::Any,
        predicates: fields
            .iter()
            .map(|field| compile_clause(field, global.match_mode, &value, fold_case))
            .collect(),
    })
}

/// Compile a validated descriptor.
///
/// `fallback_global_fields` is used for the global filter when the descriptor
/// does not carry its own `globalFilterFields`.
#[must_use]
pub fn compile(descriptor: &ValidatedDescriptor, fallback_global_fields: &[&str]) -> QueryPlan {
    let mut predicates: Vec<Predicate> = descriptor
        .filters()
        .iter()
        .map(|filter| compile_entry(&filter.field, &filter.entry))
        .collect();

    if let Some(global) = descriptor.global() {
        let requested: Option<Vec<&str>> = descriptor
            .global_filter_fields()
            .map(|fields| fields.iter().map(String::as_str).collect());
        let fields = requested.as_deref().unwrap_or(fallback_global_fields);
        predicates.extend(compile_global(global, fields));
    }

    let plan = QueryPlan {
        predicates,
        ordering: ordering(descriptor.sorting()),
        pagination: descriptor.pagination(),
    };
    tracing::debug!(
        predicates = plan.predicates.len(),
        orderings = plan.ordering.len(),
        pagination = ?plan.pagination,
        "Compiled lazy load plan"
    );
    plan
}
