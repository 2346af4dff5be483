//! Line-item extraction - flattens order payloads into observations.
//!
//! Each historical order carries its line items as a JSON array. This module
//! decodes those payloads and flattens them into independent
//! `(product_id, quantity)` observations for the aggregator. A malformed
//! payload skips its order and is counted; it never aborts the batch.

use serde::Serialize;
use tracing::warn;

/// One `(product_id, quantity)` pair observed in some order's line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Observation {
    /// Product the line item refers to
    pub product_id: i64,
    /// Units ordered in that line item
    pub quantity: i64,
}

/// Result of flattening a batch of order payloads.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Flattened observations across all decodable orders
    pub observations: Vec<Observation>,
    /// Orders whose line-items payload failed to decode
    pub skipped_orders: usize,
}

/// Flattens the line items of every order payload into observations.
///
/// Orders with an empty line-items list contribute zero observations.
/// Decoding failures are surfaced through `skipped_orders`, per order;
/// valid orders are unaffected.
pub fn extract_observations<'a, I>(payloads: I) -> Extraction
where
    I: IntoIterator<Item = &'a str>,
{
    let mut extraction = Extraction::default();

    for payload in payloads {
        match crate::core::order::parse_line_items(payload) {
            Ok(items) => {
                extraction
                    .observations
                    .extend(items.iter().map(|item| Observation {
                        product_id: item.product_id,
                        quantity: item.quantity,
                    }));
            }
            Err(e) => {
                warn!(error = %e, "Skipping order with undecodable line items");
                extraction.skipped_orders += 1;
            }
        }
    }

    extraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_flattens_all_orders() {
        let payloads = [
            r#"[{"product_id":1,"quantity":10}]"#,
            r#"[{"product_id":1,"quantity":20},{"product_id":2,"quantity":5}]"#,
        ];
        let extraction = extract_observations(payloads);

        assert_eq!(extraction.skipped_orders, 0);
        assert_eq!(
            extraction.observations,
            vec![
                Observation {
                    product_id: 1,
                    quantity: 10
                },
                Observation {
                    product_id: 1,
                    quantity: 20
                },
                Observation {
                    product_id: 2,
                    quantity: 5
                },
            ]
        );
    }

    #[test]
    fn test_extract_skips_malformed_payloads() {
        let payloads = [
            r#"[{"product_id":1,"quantity":10}]"#,
            "not json",
            r#"[{"quantity":3}]"#,
        ];
        let extraction = extract_observations(payloads);

        assert_eq!(extraction.skipped_orders, 2);
        assert_eq!(extraction.observations.len(), 1);
    }

    #[test]
    fn test_extract_empty_line_items() {
        let extraction = extract_observations(["[]", "[]"]);
        assert!(extraction.observations.is_empty());
        assert_eq!(extraction.skipped_orders, 0);
    }

    #[test]
    fn test_extract_no_orders() {
        let extraction = extract_observations(Vec::<&str>::new());
        assert!(extraction.observations.is_empty());
        assert_eq!(extraction.skipped_orders, 0);
    }
}
