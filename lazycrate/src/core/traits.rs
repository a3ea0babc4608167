use async_trait::async_trait;
use sea_orm::{
    DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QuerySelect, Select,
};
use serde_json::Value;

use super::query::{QueryContext, filter_select, order_select};
use crate::config::LazyLoadConfig;
use crate::errors::LazyLoadError;
use crate::filtering::pagination::{Page, offset};
use crate::filtering::{MorphLink, QueryPlan, RelationLink, compile, validate};
use crate::models::{LazyLoaded, Pagination, ValidatedDescriptor};

/// A collection that can be lazily loaded from a descriptor.
///
/// Implementors name their entity and table; everything else has defaults.
/// Override the configuration methods to narrow the grammar, declare
/// relations for `inMany`/`inMorphMany` filters, or scope every query.
///
/// ```rust,ignore
/// impl LazyResource for Person {
///     type EntityType = person::Entity;
///     const TABLE_NAME: &'static str = "people";
///     const RESOURCE_NAME_PLURAL: &'static str = "people";
///
///     fn global_filter_fields() -> Vec<&'static str> {
///         vec!["first_name", "last_name"]
///     }
/// }
/// ```
#[async_trait]
pub trait LazyResource: Sized + Send + Sync
where
    Self::EntityType: EntityTrait + Sync,
    <Self::EntityType as EntityTrait>::Model: Sync,
    Self: From<<Self::EntityType as EntityTrait>::Model>,
{
    type EntityType: EntityTrait + Sync;

    const TABLE_NAME: &'static str;
    const RESOURCE_NAME_PLURAL: &'static str;

    #[must_use]
    fn lazy_load_config() -> LazyLoadConfig {
        LazyLoadConfig::default()
    }

    /// Fields searched by the global filter when the request names none.
    #[must_use]
    fn global_filter_fields() -> Vec<&'static str> {
        vec![]
    }

    #[must_use]
    fn relations() -> Vec<RelationLink> {
        vec![]
    }

    #[must_use]
    fn morph_relations() -> Vec<MorphLink> {
        vec![]
    }

    /// Query every lazy load starts from. Override to scope rows, e.g. to a tenant.
    #[must_use]
    fn base_query() -> Select<Self::EntityType> {
        Self::EntityType::find()
    }

    /// Filtered but unordered query for `plan`.
    ///
    /// # Errors
    ///
    /// Returns `DbErr::Custom` when the plan names an undeclared relation.
    fn filtered_query(plan: &QueryPlan) -> Result<Select<Self::EntityType>, DbErr> {
        let relations = Self::relations();
        let morphs = Self::morph_relations();
        let ctx = QueryContext::new(Self::TABLE_NAME, &relations, &morphs);
        filter_select(Self::base_query(), plan, &ctx)
    }

    async fn fetch_all(db: &DatabaseConnection, plan: &QueryPlan) -> Result<Vec<Self>, DbErr> {
        let select = order_select(Self::filtered_query(plan)?, Self::TABLE_NAME, &plan.ordering);
        let models = select.all(db).await?;
        Ok(models.into_iter().map(Self::from).collect())
    }

    async fn fetch_page(
        db: &DatabaseConnection,
        plan: &QueryPlan,
        rows: u64,
        page: u64,
    ) -> Result<Page<Self>, DbErr> {
        let filtered = Self::filtered_query(plan)?;
        let total = PaginatorTrait::count(filtered.clone(), db).await?;

        let items = if rows == 0 {
            Vec::new()
        } else {
            order_select(filtered, Self::TABLE_NAME, &plan.ordering)
                .offset(offset(rows, page))
                .limit(rows)
                .all(db)
                .await?
                .into_iter()
                .map(Self::from)
                .collect()
        };

        Ok(Page::new(items, total, rows, page))
    }

    /// Compile and run an already validated descriptor.
    async fn lazy_load(
        db: &DatabaseConnection,
        descriptor: &ValidatedDescriptor,
    ) -> Result<LazyLoaded<Self>, DbErr> {
        let plan = compile(descriptor, &Self::global_filter_fields());
        match plan.pagination {
            Pagination::Unbounded => Self::fetch_all(db, &plan).await.map(LazyLoaded::All),
            Pagination::Paged { rows, page } => Self::fetch_page(db, &plan, rows, page)
                .await
                .map(LazyLoaded::Page),
        }
    }
}

/// Validate `raw` against `R`'s grammar, then compile and run it.
///
/// # Errors
///
/// [`LazyLoadError::Invalid`] with every validation problem, or
/// [`LazyLoadError::Store`] when the query fails.
pub async fn lazy_load<R>(db: &DatabaseConnection, raw: &Value) -> Result<LazyLoaded<R>, LazyLoadError>
where
    R: LazyResource,
    R::EntityType: EntityTrait + Sync,
    <R::EntityType as EntityTrait>::Model: Sync,
    R: From<<R::EntityType as EntityTrait>::Model>,
{
    let descriptor = validate(raw, &R::lazy_load_config()).map_err(LazyLoadError::Invalid)?;
    R::lazy_load(db, &descriptor).await.map_err(LazyLoadError::Store)
}
