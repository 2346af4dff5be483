//! Initial product seeding from a TOML configuration file.
//!
//! An operator can point `STOCKROOM_SEED_FILE` at a TOML file listing
//! products to ensure exist on startup. Seeding only inserts products that
//! are not already present by name; it never overwrites live inventory.

use crate::errors::{Error, Result};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Top-level structure of the seed file
#[derive(Debug, Deserialize)]
pub struct SeedConfig {
    /// List of products to seed
    pub products: Vec<ProductSeed>,
}

/// One seeded product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductSeed {
    /// Product name (unique)
    pub name: String,
    /// Unit price in dollars
    pub price: f64,
    /// Initial units on hand
    pub stock_level: i64,
}

/// Loads a seed configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or if a required
/// field is missing.
pub fn load_seed_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read seed file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file: {e}"),
    })
}

/// Inserts every seeded product that does not already exist by name.
///
/// # Errors
/// Returns an error if a database query or insert fails.
pub async fn apply_seed(db: &DatabaseConnection, config: &SeedConfig) -> Result<()> {
    let mut inserted = 0usize;
    for seed in &config.products {
        if crate::core::product::get_product_by_name(db, &seed.name)
            .await?
            .is_none()
        {
            crate::core::product::create_product(db, seed.name.clone(), seed.price, seed.stock_level)
                .await?;
            inserted += 1;
        }
    }
    info!(inserted, total = config.products.len(), "Applied product seed");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_parse_seed_config() {
        let toml_str = r#"
            [[products]]
            name = "Widget"
            price = 9.99
            stock_level = 120

            [[products]]
            name = "Gadget"
            price = 24.50
            stock_level = 40
        "#;

        let config: SeedConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.products.len(), 2);
        assert_eq!(config.products[0].name, "Widget");
        assert_eq!(config.products[0].price, 9.99);
        assert_eq!(config.products[1].stock_level, 40);
    }

    #[tokio::test]
    async fn test_apply_seed_skips_existing() -> Result<()> {
        let db = setup_test_db().await?;
        crate::core::product::create_product(&db, "Widget".to_string(), 1.0, 5).await?;

        let config = SeedConfig {
            products: vec![
                ProductSeed {
                    name: "Widget".to_string(),
                    price: 9.99,
                    stock_level: 120,
                },
                ProductSeed {
                    name: "Gadget".to_string(),
                    price: 24.50,
                    stock_level: 40,
                },
            ],
        };
        apply_seed(&db, &config).await?;

        // Existing product untouched, missing product inserted
        let widget = crate::core::product::get_product_by_name(&db, "Widget")
            .await?
            .unwrap();
        assert_eq!(widget.price, 1.0);
        assert_eq!(widget.stock_level, 5);

        let gadget = crate::core::product::get_product_by_name(&db, "Gadget")
            .await?
            .unwrap();
        assert_eq!(gadget.stock_level, 40);

        Ok(())
    }
}
