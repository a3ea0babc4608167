//! # Lazy-load descriptors
//!
//! This module turns a client-supplied descriptor (filters, sorting and
//! pagination for a collection) into a [`QueryPlan`]. It is used by data-table
//! front ends that load rows lazily, one page at a time.
//!
//! ## Pipeline
//!
//! 1. **[`validate`]** checks the raw JSON against the descriptor grammar and
//!    the per-match-mode value types, producing a
//!    [`ValidatedDescriptor`](crate::models::ValidatedDescriptor).
//! 2. **[`compile`]** walks the validated descriptor and builds a
//!    [`QueryPlan`]: predicates, ordering and pagination.
//! 3. [`crate::core::query`] translates the plan into a Sea-ORM `Condition`
//!    against a concrete resource.
//!
//! ## Descriptor Examples
//!
//! ### Simple and compound filters
//! ```rust,ignore
//! {
//!     "filters": {
//!         "status": {"value": "open", "matchMode": "equals"},
//!         "age": {"operator": "or", "constraints": [
//!             {"value": 18, "matchMode": "lt"},
//!             {"value": 65, "matchMode": "gte"}
//!         ]}
//!     },
//!     "paginate": false
//! }
//! ```
//!
//! ### Global filter, multi-sort and pagination
//! ```rust,ignore
//! {
//!     "filters": {"global": {"value": "ann", "matchMode": "contains"}},
//!     "globalFilterFields": ["firstName", "lastName"],
//!     "multiSortMeta": [{"field": "lastName", "order": 1}, {"field": "age", "order": -1}],
//!     "paginate": true,
//!     "rows": 25,
//!     "page": 1
//! }
//! ```
//!
//! ### Relation filters
//! ```rust,ignore
//! // rows with at least one related tag whose id is 1 or 2
//! {"filters": {"tags": {"value": [1, 2], "matchMode": "inMany"}}, "paginate": false}
//!
//! // rows attached to post 3 or video 9
//! {"filters": {"commentable": {"value": [
//!     {"id": 3, "morphType": "post"},
//!     {"id": 9, "morphType": "video"}
//! ], "matchMode": "inMorphMany"}}, "paginate": false}
//! ```

pub mod conditions;
pub mod match_mode;
pub mod pagination;
pub mod relations;
pub mod rules;
pub mod sort;
pub mod validator;

// Re-export commonly used items
pub use conditions::{Comparison, Connective, Predicate, QueryPlan, compile};
pub use match_mode::{MatchMode, UnknownMatchMode, ValueType};
pub use pagination::{Page, calculate_content_range};
pub use relations::{MorphLink, MorphTarget, PivotLink, RelationLink};
pub use sort::{Ordering, ordering};
pub use validator::{GLOBAL_FILTER_KEY, validate};
