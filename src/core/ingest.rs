//! CSV ingest - bulk import of inventory and order snapshots.
//!
//! Inventory CSVs (`productid, productname, price, stock`) replace the whole
//! product table. Order CSVs (`order_id, order_date, customer_email,
//! total_amount, status, line_items`) are imported row by row; a row with an
//! undecodable `line_items` payload or a duplicate order id is skipped with a
//! notice rather than failing the upload. Headers are matched
//! case-insensitively with surrounding whitespace trimmed.

use crate::errors::{Error, Result};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::{info, warn};

/// One row of an inventory CSV
#[derive(Debug, Clone, Deserialize)]
struct InventoryRecord {
    productid: i64,
    productname: String,
    price: f64,
    stock: i64,
}

/// One row of an orders CSV
#[derive(Debug, Clone, Deserialize)]
struct OrderRecord {
    order_id: i64,
    order_date: String,
    customer_email: String,
    total_amount: f64,
    status: String,
    line_items: String,
}

/// Outcome of a tolerant per-row import.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    /// Rows successfully inserted
    pub imported: usize,
    /// Per-row notices for rows that were skipped
    pub skipped: Vec<String>,
}

pub(crate) fn csv_reader<R: Read>(reader: R) -> Result<csv::Reader<R>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Normalize headers so "ProductID" and " productid " both match
    let normalized: csv::StringRecord = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    rdr.set_headers(normalized);
    Ok(rdr)
}

/// Replaces the entire inventory with the contents of an inventory CSV.
///
/// Returns the number of products imported.
///
/// # Errors
/// Returns an error if the CSV cannot be read, a required column is missing,
/// a row fails to decode, or the database replacement fails. Inventory upload
/// is all-or-nothing; unlike order import there is no per-row tolerance.
pub async fn import_inventory<R: Read>(db: &DatabaseConnection, reader: R) -> Result<usize> {
    let mut rdr = csv_reader(reader)?;

    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        let record: InventoryRecord = record?;
        rows.push((
            record.productid,
            record.productname,
            record.price,
            record.stock,
        ));
    }

    let imported = crate::core::product::replace_all(db, rows).await?;
    info!(imported, "Replaced inventory from CSV upload");
    Ok(imported)
}

/// Imports orders from an orders CSV, row by row.
///
/// Rows with invalid `line_items` JSON or an order id already present are
/// skipped and reported in the returned [`ImportReport`].
///
/// # Errors
/// Returns an error if the CSV itself cannot be read or is missing required
/// columns, or if a database operation fails.
pub async fn import_orders<R: Read>(db: &DatabaseConnection, reader: R) -> Result<ImportReport> {
    let mut rdr = csv_reader(reader)?;

    let mut report = ImportReport::default();
    for record in rdr.deserialize() {
        let record: OrderRecord = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Skipping undecodable order row");
                report.skipped.push(format!("Undecodable row: {e}"));
                continue;
            }
        };

        if crate::core::order::parse_line_items(&record.line_items).is_err() {
            report.skipped.push(format!(
                "Invalid JSON in line_items for order {}",
                record.order_id
            ));
            continue;
        }

        if crate::core::order::get_order_by_id(db, record.order_id)
            .await?
            .is_some()
        {
            report
                .skipped
                .push(format!("Order {} already exists", record.order_id));
            continue;
        }

        crate::core::order::insert_imported_order(
            db,
            record.order_id,
            record.order_date,
            record.customer_email,
            record.total_amount,
            record.status,
            record.line_items,
        )
        .await?;
        report.imported += 1;
    }

    info!(
        imported = report.imported,
        skipped = report.skipped.len(),
        "Imported orders from CSV upload"
    );
    Ok(report)
}

/// Ensures an uploaded CSV looks like the expected table by checking that
/// every required column is present in the header row.
///
/// # Errors
/// Returns [`Error::InvalidInput`] naming the missing columns.
pub fn require_columns(headers: &csv::StringRecord, required: &[&str]) -> Result<()> {
    let present: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let missing: Vec<&str> = required
        .iter()
        .filter(|c| !present.iter().any(|p| p == *c))
        .copied()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidInput {
            message: format!("File is missing required columns: {}", missing.join(", ")),
        })
    }
}
