use sea_orm::sea_query::Order;

use crate::models::{SortOrder, Sorting};

/// One `ORDER BY` instruction of a compiled plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    pub field: String,
    pub direction: Order,
}

/// Convert a sort code to a direction; `Unspecified` leaves the field unordered.
fn parse_order(order: SortOrder) -> Option<Order> {
    match order {
        SortOrder::Descending => Some(Order::Desc),
        SortOrder::Ascending => Some(Order::Asc),
        SortOrder::Unspecified => None,
    }
}

/// Ordering instructions for `sorting`, in precedence order.
#[must_use]
pub fn ordering(sorting: &Sorting) -> Vec<Ordering> {
    sorting
        .entries()
        .iter()
        .filter_map(|entry| {
            parse_order(entry.order).map(|direction| Ordering {
                field: entry.field.clone(),
                direction,
            })
        })
        .collect()
}
