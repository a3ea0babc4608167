//! # lazycrate
//!
//! Declarative list queries for Sea-ORM resources. A client sends a descriptor
//! of filters, sorting and pagination; lazycrate validates it against a strict
//! grammar, compiles it into a query plan and runs it.
//!
//! ```rust,ignore
//! use lazycrate::{LazyLoaded, LazyResource, lazy_load};
//!
//! let descriptor = serde_json::json!({
//!     "filters": {"status": {"value": "open", "matchMode": "equals"}},
//!     "sortField": "created_at",
//!     "sortOrder": -1,
//!     "paginate": true,
//!     "rows": 25,
//!     "page": 1
//! });
//! let page: LazyLoaded<Person> = lazy_load::<Person>(&db, &descriptor).await?;
//! ```

pub mod config;
pub mod core;
pub mod errors;
pub mod filtering;
pub mod handler;
pub mod models;
pub mod validation;

pub use config::LazyLoadConfig;
pub use core::{LazyResource, lazy_load};
pub use errors::{ApiError, LazyLoadError};
pub use filtering::{MatchMode, Page, QueryPlan, compile, validate};
pub use models::{LazyLoaded, ValidatedDescriptor};
pub use validation::{ValidationError, ValidationErrorKind, ValidationErrors};
