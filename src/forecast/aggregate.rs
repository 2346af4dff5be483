//! Feature aggregation - per-product summary statistics.
//!
//! Groups flattened observations by product and computes the aggregate
//! features the predictor consumes. `order_frequency` counts line-item
//! occurrences, not distinct orders: a product appearing twice in one order
//! counts twice. Products with no observations are simply absent; a
//! zero-observation aggregate cannot exist.

use crate::forecast::extract::Observation;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-product sales statistics derived from all historical line items.
/// Computed fresh per forecast request; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    /// Product these statistics describe
    pub product_id: i64,
    /// Sum of quantities across all line items for this product
    pub total_quantity: i64,
    /// Arithmetic mean quantity per line item
    pub avg_quantity: f64,
    /// Number of line-item occurrences for this product
    pub order_frequency: u64,
}

/// Groups observations by product and computes sum, mean, and count.
///
/// Returns a map keyed by product id, so iteration order is deterministic.
#[must_use]
pub fn aggregate(observations: &[Observation]) -> BTreeMap<i64, ProductSales> {
    let mut totals: BTreeMap<i64, (i64, u64)> = BTreeMap::new();
    for obs in observations {
        let entry = totals.entry(obs.product_id).or_insert((0, 0));
        entry.0 += obs.quantity;
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|(product_id, (total_quantity, order_frequency))| {
            // order_frequency >= 1 here: the group exists only because at
            // least one observation was seen
            let avg_quantity = total_quantity as f64 / order_frequency as f64;
            (
                product_id,
                ProductSales {
                    product_id,
                    total_quantity,
                    avg_quantity,
                    order_frequency,
                },
            )
        })
        .collect()
}
