// Resource integration: the LazyResource trait and plan translation

pub mod query;
pub mod traits;

// Re-export commonly used items
pub use query::{QueryContext, filter_select, order_select, plan_condition};
pub use traits::{LazyResource, lazy_load};
