use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::filtering::MatchMode;
use crate::filtering::pagination::Page;

/// A single non-compound filter value.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Lower-cases text; other scalars are returned unchanged.
    #[must_use]
    pub fn to_lowercase(&self) -> Self {
        match self {
            Self::Text(text) => Self::Text(text.to_lowercase()),
            other => other.clone(),
        }
    }
}

/// One `{id, morphType}` element of a polymorphic relation filter.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MorphRef {
    pub id: Scalar,
    pub morph_type: String,
}

/// Typed filter value, produced by validation.
///
/// Serializes back to the JSON the client sent (dates in canonical form).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
    Range(Scalar, Scalar),
    MorphRefs(Vec<MorphRef>),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

/// A `{value, matchMode}` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    pub value: FilterValue,
    pub match_mode: MatchMode,
}

impl Constraint {
    #[must_use]
    pub fn new(match_mode: MatchMode, value: FilterValue) -> Self {
        Self { value, match_mode }
    }
}

/// How the constraints of a compound filter are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    And,
    Or,
}

impl FilterOperator {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }
}

/// Filter on one field: either one constraint, or several combined by an operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterEntry {
    Simple(Constraint),
    Compound {
        operator: FilterOperator,
        constraints: Vec<Constraint>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub entry: FilterEntry,
}

/// Sort direction code: `-1` descending, `1` ascending, `0` unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Descending,
    Unspecified,
    Ascending,
}

impl SortOrder {
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(Self::Descending),
            0 => Some(Self::Unspecified),
            1 => Some(Self::Ascending),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> i8 {
        match self {
            Self::Descending => -1,
            Self::Unspecified => 0,
            Self::Ascending => 1,
        }
    }
}

impl Serialize for SortOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SortEntry {
    pub field: String,
    #[schema(value_type = i8)]
    pub order: SortOrder,
}

impl SortEntry {
    #[must_use]
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

/// Which sort representation the request used.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Sorting {
    #[default]
    None,
    /// `sortField` / `sortOrder`
    Single(SortEntry),
    /// `multiSortMeta`
    Multi(Vec<SortEntry>),
}

impl Sorting {
    /// Entries in precedence order.
    #[must_use]
    pub fn entries(&self) -> &[SortEntry] {
        match self {
            Self::None => &[],
            Self::Single(entry) => std::slice::from_ref(entry),
            Self::Multi(entries) => entries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pagination {
    #[default]
    Unbounded,
    /// `rows` items per page, 1-indexed `page`.
    Paged { rows: u64, page: u64 },
}

/// A fully checked descriptor. Only the validator constructs one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidatedDescriptor {
    pub(crate) filters: Vec<FieldFilter>,
    pub(crate) global: Option<Constraint>,
    pub(crate) global_filter_fields: Option<Vec<String>>,
    pub(crate) sorting: Sorting,
    pub(crate) pagination: Pagination,
}

impl ValidatedDescriptor {
    /// Per-field filters, excluding the global filter.
    #[must_use]
    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    #[must_use]
    pub fn global(&self) -> Option<&Constraint> {
        self.global.as_ref()
    }

    /// Fields named by the request's `globalFilterFields`, if it sent any.
    #[must_use]
    pub fn global_filter_fields(&self) -> Option<&[String]> {
        self.global_filter_fields.as_deref()
    }

    #[must_use]
    pub fn sorting(&self) -> &Sorting {
        &self.sorting
    }

    #[must_use]
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }
}

impl Serialize for ValidatedDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        if !self.filters.is_empty() || self.global.is_some() {
            let mut filters = serde_json::Map::new();
            for filter in &self.filters {
                let entry = serde_json::to_value(&filter.entry).map_err(serde::ser::Error::custom)?;
                filters.insert(filter.field.clone(), entry);
            }
            if let Some(global) = &self.global {
                let entry = serde_json::to_value(global).map_err(serde::ser::Error::custom)?;
                filters.insert(crate::filtering::GLOBAL_FILTER_KEY.to_string(), entry);
            }
            map.serialize_entry("filters", &filters)?;
        }

        if let Some(fields) = &self.global_filter_fields {
            map.serialize_entry("globalFilterFields", fields)?;
        }

        match &self.sorting {
            Sorting::None => {}
            Sorting::Single(entry) => {
                map.serialize_entry("sortField", &entry.field)?;
                map.serialize_entry("sortOrder", &entry.order)?;
            }
            Sorting::Multi(entries) => map.serialize_entry("multiSortMeta", entries)?,
        }

        match self.pagination {
            Pagination::Unbounded => map.serialize_entry("paginate", &false)?,
            Pagination::Paged { rows, page } => {
                map.serialize_entry("paginate", &true)?;
                map.serialize_entry("rows", &rows)?;
                map.serialize_entry("page", &page)?;
            }
        }

        map.end()
    }
}

/// Result of a lazy load: the full ordered set, or one page of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LazyLoaded<T> {
    All(Vec<T>),
    Page(Page<T>),
}

impl<T> LazyLoaded<T> {
    /// Items of the result, whichever variant it is.
    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::All(items) => items,
            Self::Page(page) => &page.items,
        }
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::All(items) => items,
            Self::Page(page) => page.items,
        }
    }

    #[must_use]
    pub fn as_page(&self) -> Option<&Page<T>> {
        match self {
            Self::Page(page) => Some(page),
            Self::All(_) => None,
        }
    }

    /// Apply `f` to every item, keeping page metadata.
    pub fn map<U, F>(self, f: F) -> LazyLoaded<U>
    where
        F: FnMut(T) -> U,
    {
        match self {
            Self::All(items) => LazyLoaded::All(items.into_iter().map(f).collect()),
            Self::Page(page) => LazyLoaded::Page(page.map(f)),
        }
    }
}
