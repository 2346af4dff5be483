//! Stock-level forecasting pipeline.
//!
//! Turns a historical-orders CSV (one row per order, line items as nested
//! JSON) into a per-product stock recommendation:
//!
//! 1. [`extract`] flattens each order's line items into observations
//! 2. [`aggregate`] groups them into per-product sales statistics
//! 3. [`predict`] maps each aggregate to a recommended stock level
//!
//! The orchestrator returns an explicit `Result`: an unreadable or
//! malformed dataset is an error, while a readable dataset with no orders
//! is a legitimate empty report. Callers can always tell "no data" from
//! "pipeline failure". Orders whose line items fail to decode are skipped
//! and counted, never fatal.

pub mod aggregate;
pub mod extract;
pub mod model;
pub mod predict;

use crate::errors::{Error, Result};
use crate::forecast::predict::{HeuristicPredictor, StockPredictor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{error, info};

/// Columns a historical-orders dataset must carry.
const REQUIRED_COLUMNS: [&str; 6] = [
    "order_id",
    "order_date",
    "customer_email",
    "total_amount",
    "status",
    "line_items",
];

/// One row of the historical-orders dataset. Only the line items feed the
/// pipeline; the other columns are validated by header.
#[derive(Debug, Deserialize)]
struct HistoricalOrderRow {
    line_items: String,
}

/// Forecast output for one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockForecast {
    /// Total quantity ordered historically
    pub total_quantity: i64,
    /// Average quantity per line item
    pub avg_quantity: f64,
    /// Recommended stock level: floor of 1.5x the average
    pub predicted_stock: i64,
}

/// Full result of a forecast run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastReport {
    /// Per-product forecasts, keyed by product id
    pub products: BTreeMap<i64, StockForecast>,
    /// Orders read from the dataset
    pub orders_seen: usize,
    /// Orders skipped because their line items failed to decode
    pub orders_skipped: usize,
}

/// Aggregates loaded from a dataset, along with batch counters.
#[derive(Debug, Clone, Default)]
pub struct LoadedAggregates {
    /// One aggregate per distinct product seen, sorted by product id
    pub aggregates: Vec<aggregate::ProductSales>,
    /// Orders read from the dataset
    pub orders_seen: usize,
    /// Orders skipped because their line items failed to decode
    pub orders_skipped: usize,
}

fn open_dataset(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "Cannot open historical orders dataset");
        Error::Forecast {
            message: format!("Cannot open dataset {}: {e}", path.display()),
        }
    })
}

/// Reads a historical-orders CSV and runs extraction + aggregation.
///
/// # Errors
/// Returns an error if the CSV cannot be parsed or is missing a required
/// column. Per-order line-item decode failures are counted, not fatal.
pub fn load_aggregates<R: Read>(reader: R) -> Result<LoadedAggregates> {
    let mut rdr = crate::core::ingest::csv_reader(reader)?;
    crate::core::ingest::require_columns(rdr.headers()?, &REQUIRED_COLUMNS).map_err(|e| {
        Error::Forecast {
            message: e.to_string(),
        }
    })?;

    let mut payloads = Vec::new();
    for row in rdr.deserialize() {
        let row: HistoricalOrderRow = row.map_err(|e| Error::Forecast {
            message: format!("Malformed dataset row: {e}"),
        })?;
        payloads.push(row.line_items);
    }

    let orders_seen = payloads.len();
    let extraction = extract::extract_observations(payloads.iter().map(String::as_str));
    let aggregates = aggregate::aggregate(&extraction.observations)
        .into_values()
        .collect();

    Ok(LoadedAggregates {
        aggregates,
        orders_seen,
        orders_skipped: extraction.skipped_orders,
    })
}

/// Runs the full heuristic pipeline against a historical-orders CSV file.
///
/// # Errors
/// Returns an error if the file cannot be opened or the dataset is
/// malformed. An empty dataset is not an error.
pub fn run_forecast(path: &Path) -> Result<ForecastReport> {
    forecast_from_reader(open_dataset(path)?)
}

/// Runs the full heuristic pipeline against any readable CSV source.
///
/// # Errors
/// Returns an error if the CSV cannot be parsed or is missing a required
/// column.
pub fn forecast_from_reader<R: Read>(reader: R) -> Result<ForecastReport> {
    let loaded = load_aggregates(reader)?;
    let aggregates = loaded.aggregates;
    let predictions = HeuristicPredictor.predict(&aggregates)?;

    let products = aggregates
        .iter()
        .zip(&predictions)
        .map(|(sales, prediction)| {
            (
                sales.product_id,
                StockForecast {
                    total_quantity: sales.total_quantity,
                    avg_quantity: sales.avg_quantity,
                    predicted_stock: prediction.predicted_stock,
                },
            )
        })
        .collect();

    info!(
        orders_seen = loaded.orders_seen,
        orders_skipped = loaded.orders_skipped,
        products = aggregates.len(),
        "Forecast pipeline complete"
    );

    Ok(ForecastReport {
        products,
        orders_seen: loaded.orders_seen,
        orders_skipped: loaded.orders_skipped,
    })
}

/// Scores a historical-orders dataset with a previously trained model.
///
/// Learned mode is explicit: a missing or undecodable artifact at
/// `artifact_path` fails the request rather than falling back to the
/// heuristic. The returned predictions carry the model's R² on this
/// dataset as their confidence.
///
/// # Errors
/// Returns an error if the dataset cannot be read or the artifact cannot
/// be loaded.
pub fn score_with_model(path: &Path, artifact_path: &Path) -> Result<Vec<predict::StockPrediction>> {
    let predictor = predict::LearnedPredictor::load(artifact_path)?;
    let loaded = load_aggregates(open_dataset(path)?)?;
    predictor.predict(&loaded.aggregates)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    const HEADER: &str = "order_id,order_date,customer_email,total_amount,status,line_items\n";

    fn dataset(rows: &[&str]) -> String {
        let mut csv = HEADER.to_string();
        for row in rows {
            csv.push_str(row);
            csv.push('\n');
        }
        csv
    }

    #[test]
    fn test_worked_example() {
        // Order A: [{1, 10}]; Order B: [{1, 20}, {2, 5}]
        let csv = dataset(&[
            r#"1,2026-01-01,a@b.com,100.0,completed,"[{""product_id"":1,""quantity"":10}]""#,
            r#"2,2026-01-02,c@d.com,250.0,completed,"[{""product_id"":1,""quantity"":20},{""product_id"":2,""quantity"":5}]""#,
        ]);

        let report = forecast_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(report.orders_seen, 2);
        assert_eq!(report.orders_skipped, 0);
        assert_eq!(report.products.len(), 2);

        let p1 = &report.products[&1];
        assert_eq!(p1.total_quantity, 30);
        assert_eq!(p1.avg_quantity, 15.0);
        assert_eq!(p1.predicted_stock, 22);

        let p2 = &report.products[&2];
        assert_eq!(p2.total_quantity, 5);
        assert_eq!(p2.avg_quantity, 5.0);
        assert_eq!(p2.predicted_stock, 7);
    }

    #[test]
    fn test_every_product_appears_exactly_once() {
        let csv = dataset(&[
            r#"1,2026-01-01,a@b.com,1.0,pending,"[{""product_id"":3,""quantity"":1},{""product_id"":5,""quantity"":2}]""#,
            r#"2,2026-01-02,a@b.com,1.0,pending,"[{""product_id"":5,""quantity"":4},{""product_id"":9,""quantity"":1}]""#,
        ]);

        let report = forecast_from_reader(csv.as_bytes()).unwrap();
        let keys: Vec<i64> = report.products.keys().copied().collect();
        assert_eq!(keys, vec![3, 5, 9]);
    }

    #[test]
    fn test_idempotence() {
        let csv = dataset(&[
            r#"1,2026-01-01,a@b.com,1.0,pending,"[{""product_id"":1,""quantity"":7}]""#,
        ]);
        let first = forecast_from_reader(csv.as_bytes()).unwrap();
        let second = forecast_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_order_equivalent_to_absent_order() {
        let with_bad = dataset(&[
            r#"1,2026-01-01,a@b.com,1.0,pending,"[{""product_id"":1,""quantity"":10}]""#,
            "2,2026-01-02,c@d.com,1.0,pending,not json",
        ]);
        let without = dataset(&[
            r#"1,2026-01-01,a@b.com,1.0,pending,"[{""product_id"":1,""quantity"":10}]""#,
        ]);

        let report_bad = forecast_from_reader(with_bad.as_bytes()).unwrap();
        let report_clean = forecast_from_reader(without.as_bytes()).unwrap();

        assert_eq!(report_bad.products, report_clean.products);
        assert_eq!(report_bad.orders_skipped, 1);
        assert_eq!(report_clean.orders_skipped, 0);
    }

    #[test]
    fn test_empty_dataset_is_not_an_error() {
        let report = forecast_from_reader(dataset(&[]).as_bytes()).unwrap();
        assert!(report.products.is_empty());
        assert_eq!(report.orders_seen, 0);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let csv = "order_id,order_date,status\n1,2026-01-01,pending\n";
        assert!(forecast_from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = run_forecast(Path::new("/nonexistent/orders.csv"));
        assert!(matches!(
            result.unwrap_err(),
            Error::Forecast { message: _ }
        ));
    }

    #[test]
    fn test_run_forecast_from_file() -> Result<()> {
        use std::io::Write;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("orders.csv");
        let mut file = std::fs::File::create(&path)?;
        write!(
            file,
            "{}",
            dataset(&[
                r#"1,2026-01-01,a@b.com,1.0,pending,"[{""product_id"":4,""quantity"":12}]""#,
            ])
        )?;

        let report = run_forecast(&path)?;
        assert_eq!(report.products[&4].predicted_stock, 18); // floor(12 * 1.5)
        Ok(())
    }
}
