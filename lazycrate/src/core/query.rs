//! Plan translation.
//!
//! Turns the predicates and ordering of a [`QueryPlan`] into Sea-ORM query
//! parts for one table. Columns are always table-qualified so relation
//! subqueries can refer back to the outer row.

use sea_orm::{
    Condition, DbErr, EntityTrait, QueryFilter, QueryOrder, Select, Value,
    sea_query::{
        Alias, ConditionalStatement, Expr, Func, LikeExpr, Query, SelectStatement, SimpleExpr,
    },
};
use uuid::Uuid;

use crate::filtering::conditions::{Comparison, Connective, Predicate, QueryPlan};
use crate::filtering::relations::{MorphLink, RelationLink, find_morph, find_relation};
use crate::filtering::sort::Ordering;
use crate::models::Scalar;

const LIKE_ESCAPE: char = '\\';

/// Table and relation metadata predicates are resolved against.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub table: &'a str,
    pub relations: &'a [RelationLink],
    pub morphs: &'a [MorphLink],
}

impl<'a> QueryContext<'a> {
    #[must_use]
    pub const fn new(
        table: &'a str,
        relations: &'a [RelationLink],
        morphs: &'a [MorphLink],
    ) -> Self {
        Self {
            table,
            relations,
            morphs,
        }
    }

    /// Context for a related table; relation filters do not nest further.
    const fn related(table: &'a str) -> Self {
        Self {
            table,
            relations: &[],
            morphs: &[],
        }
    }
}

fn column(table: &str, field: &str) -> Expr {
    Expr::col((Alias::new(table), Alias::new(field)))
}

fn folded(table: &str, field: &str, fold_case: bool) -> Expr {
    if fold_case {
        Expr::expr(Func::lower(column(table, field)))
    } else {
        column(table, field)
    }
}

/// Bind a scalar. UUID-shaped strings are bound as UUIDs so they match UUID keys.
fn scalar_value(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Boolean(b) => Value::from(*b),
        Scalar::Integer(n) => Value::from(*n),
        Scalar::Float(f) => Value::from(*f),
        Scalar::Text(text) => Uuid::parse_str(text).map_or_else(|_| Value::from(text.as_str()), Value::from),
    }
}

/// Text comparisons under case folding compare against the raw lower-cased text.
fn compared_value(scalar: &Scalar, fold_case: bool) -> Value {
    match scalar {
        Scalar::Text(text) if fold_case => Value::from(text.as_str()),
        other => scalar_value(other),
    }
}

fn compare<V: Into<SimpleExpr>>(expr: Expr, op: Comparison, value: V) -> SimpleExpr {
    match op {
        Comparison::Eq => expr.eq(value),
        Comparison::Ne => expr.ne(value),
        Comparison::Gt => expr.gt(value),
        Comparison::Gte => expr.gte(value),
        Comparison::Lt => expr.lt(value),
        Comparison::Lte => expr.lte(value),
    }
}

/// Always-false expression for empty disjunctions.
fn never() -> SimpleExpr {
    Expr::val(1).eq(0)
}

fn exists(subquery: SelectStatement, negated: bool) -> SimpleExpr {
    let expr = Expr::exists(subquery);
    if negated { expr.not() } else { expr }
}

fn related_subquery(
    parent: &str,
    relation: &RelationLink,
    nested: &Predicate,
) -> Result<SelectStatement, DbErr> {
    let nested = predicate_condition(nested, &QueryContext::related(relation.table))?;
    let mut subquery = Query::select();
    subquery.expr(Expr::val(1));

    match &relation.pivot {
        Some(pivot) => {
            subquery
                .from(Alias::new(pivot.table))
                .inner_join(
                    Alias::new(relation.table),
                    column(relation.table, relation.foreign_key)
                        .equals((Alias::new(pivot.table), Alias::new(pivot.related_key))),
                )
                .and_where(
                    column(pivot.table, pivot.parent_key)
                        .equals((Alias::new(parent), Alias::new(relation.local_key))),
                );
        }
        None => {
            subquery.from(Alias::new(relation.table)).and_where(
                column(relation.table, relation.foreign_key)
                    .equals((Alias::new(parent), Alias::new(relation.local_key))),
            );
        }
    }

    subquery.cond_where(nested);
    Ok(subquery)
}

fn morph_condition(
    parent: &str,
    morph: &MorphLink,
    negated: bool,
    per_type: &[(String, Predicate)],
) -> Result<Condition, DbErr> {
    if per_type.is_empty() {
        return Ok(Condition::all().add(never()));
    }

    let mut any = Condition::any();
    for (morph_type, nested) in per_type {
        let target = morph.target(morph_type).ok_or_else(|| {
            DbErr::Custom(format!(
                "Unknown morph type '{morph_type}' for relation '{}'",
                morph.name
            ))
        })?;
        let nested = predicate_condition(nested, &QueryContext::related(target.table))?;

        let mut subquery = Query::select();
        subquery
            .expr(Expr::val(1))
            .from(Alias::new(target.table))
            .and_where(
                column(target.table, target.key)
                    .equals((Alias::new(parent), Alias::new(morph.id_column))),
            )
            .cond_where(nested);

        any = any.add(
            Condition::all()
                .add(column(parent, morph.type_column).eq(morph_type.as_str()))
                .add(exists(subquery, negated)),
        );
    }
    Ok(any)
}

/// Translate one predicate.
///
/// # Errors
///
/// Returns `DbErr::Custom` when a predicate names a relation or morph type the
/// context does not declare.
pub fn predicate_condition(predicate: &Predicate, ctx: &QueryContext<'_>) -> Result<Condition, DbErr> {
    let table = ctx.table;
    let expr = match predicate {
        Predicate::Compare {
            field,
            op,
            value,
            fold_case,
        } => compare(
            folded(table, field, *fold_case),
            *op,
            compared_value(value, *fold_case),
        ),
        Predicate::Like {
            field,
            pattern,
            negated,
            fold_case,
        } => {
            let like = LikeExpr::new(pattern.as_str()).escape(LIKE_ESCAPE);
            let expr = folded(table, field, *fold_case);
            if *negated { expr.not_like(like) } else { expr.like(like) }
        }
        Predicate::Between { field, low, high } => {
            column(table, field).between(scalar_value(low), scalar_value(high))
        }
        Predicate::InSet {
            field,
            values,
            negated,
            fold_case,
        } => {
            let values = values.iter().map(|v| compared_value(v, *fold_case));
            let expr = folded(table, field, *fold_case);
            if *negated { expr.is_not_in(values) } else { expr.is_in(values) }
        }
        Predicate::Date { field, op, date } => compare(
            Expr::expr(Func::cust(Alias::new("DATE")).arg(column(table, field))),
            *op,
            Value::from(*date),
        ),
        Predicate::DateTime { field, op, at } => compare(column(table, field), *op, Value::from(*at)),
        Predicate::Related {
            relation,
            negated,
            nested,
        } => {
            let link = find_relation(ctx.relations, relation).ok_or_else(|| {
                DbErr::Custom(format!("Unknown relation '{relation}' on '{table}'"))
            })?;
            exists(related_subquery(table, link, nested)?, *negated)
        }
        Predicate::Morph {
            relation,
            negated,
            per_type,
        } => {
            let morph = find_morph(ctx.morphs, relation).ok_or_else(|| {
                DbErr::Custom(format!("Unknown morph relation '{relation}' on '{table}'"))
            })?;
            return morph_condition(table, morph, *negated, per_type);
        }
        Predicate::Group {
            connective,
            predicates,
        } => {
            if predicates.is_empty() {
                return Ok(match connective {
                    Connective::All => Condition::all(),
                    Connective::Any => Condition::all().add(never()),
                });
            }
            let mut group = match connective {
                Connective::All => Condition::all(),
                Connective::Any => Condition::any(),
            };
            for nested in predicates {
                group = group.add(predicate_condition(nested, ctx)?);
            }
            return Ok(group);
        }
    };
    Ok(Condition::all().add(expr))
}

/// AND-combine every predicate of `plan`.
///
/// # Errors
///
/// See [`predicate_condition`].
pub fn plan_condition(plan: &QueryPlan, ctx: &QueryContext<'_>) -> Result<Condition, DbErr> {
    plan.predicates
        .iter()
        .try_fold(Condition::all(), |all, predicate| {
            Ok(all.add(predicate_condition(predicate, ctx)?))
        })
}

/// Apply the plan's filters to `select`.
///
/// # Errors
///
/// See [`predicate_condition`].
pub fn filter_select<E: EntityTrait>(
    select: Select<E>,
    plan: &QueryPlan,
    ctx: &QueryContext<'_>,
) -> Result<Select<E>, DbErr> {
    Ok(select.filter(plan_condition(plan, ctx)?))
}

/// Apply `ordering` to `select` in precedence order.
#[must_use]
pub fn order_select<E: EntityTrait>(select: Select<E>, table: &str, ordering: &[Ordering]) -> Select<E> {
    ordering.iter().fold(select, |select, order| {
        let expr: SimpleExpr = column(table, &order.field).into();
        select.order_by(expr, order.direction.clone())
    })
}
