//! Route ranking.
//!
//! Forward queries rank by output. Reverse queries first pick the path that
//! needs the least input, then re-quote every other path forward with that
//! input so all routes compare on the same footing.

use std::cmp::Ordering;

use itertools::Itertools;

use crate::routes::types::Route;

/// Best first: more output, then the higher combined fee, then the lower
/// price impact.
#[must_use]
pub fn forward_ordering(a: &Route, b: &Route) -> Ordering {
    b.quote_output_amount
        .cmp(&a.quote_output_amount)
        .then_with(|| b.combined_fee().cmp(&a.combined_fee()))
        .then_with(|| a.price_impact.cmp(&b.price_impact))
}

/// Sorts forward routes best first. Equal routes keep their path order.
#[must_use]
pub fn sort_forward(routes: Vec<Route>) -> Vec<Route> {
    routes.into_iter().sorted_by(forward_ordering).collect()
}

/// Position of the route needing the least input, the earliest one on ties.
#[must_use]
pub fn cheapest(routes: &[Route]) -> Option<usize> {
    routes.iter().position_min_by_key(|route| route.input_amount)
}

/// The reverse-selected route first, then the forward re-quotes of the other
/// paths, best first.
#[must_use]
pub fn order_reverse(selected: Route, others: Vec<Route>) -> Vec<Route> {
    std::iter::once(selected)
        .chain(sort_forward(others))
        .collect()
}
