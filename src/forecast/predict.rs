//! Stock prediction - maps aggregate features to recommended stock levels.
//!
//! Two predictors implement the same capability. The heuristic one backs the
//! default forecast flow: a fixed 50% safety buffer over the historical
//! average line-item quantity, with no state and no training step. The
//! learned one wraps a persisted scaler + linear model and reports its R² on
//! the aggregates being scored as the confidence figure.

use crate::errors::Result;
use crate::forecast::aggregate::ProductSales;
use crate::forecast::model::{
    FeatureRow, LinearModel, ModelArtifact, StandardScaler, train_test_split,
};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Safety buffer applied by the heuristic: stock 1.5x the average demand.
pub const HEURISTIC_BUFFER: f64 = 1.5;

/// Fraction of samples held out for evaluation during training.
const TEST_FRACTION: f64 = 0.2;

/// A recommended stock level for one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockPrediction {
    /// Product the recommendation applies to
    pub product_id: i64,
    /// Average quantity per line item, carried through from the aggregate
    pub avg_quantity: f64,
    /// Recommended units to hold in stock
    pub predicted_stock: i64,
    /// Goodness-of-fit of the predictor (1.0 for the heuristic)
    pub confidence: f64,
}

/// The single capability both modes share: estimate stock levels from
/// aggregate features.
pub trait StockPredictor {
    /// Produces one prediction per aggregate, in input order.
    ///
    /// # Errors
    /// Returns an error if the predictor cannot score the batch.
    fn predict(&self, aggregates: &[ProductSales]) -> Result<Vec<StockPrediction>>;
}

/// Deterministic predictor: `floor(avg_quantity * 1.5)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPredictor;

impl StockPredictor for HeuristicPredictor {
    fn predict(&self, aggregates: &[ProductSales]) -> Result<Vec<StockPrediction>> {
        Ok(aggregates
            .iter()
            .map(|sales| StockPrediction {
                product_id: sales.product_id,
                avg_quantity: sales.avg_quantity,
                predicted_stock: (sales.avg_quantity * HEURISTIC_BUFFER).floor() as i64,
                confidence: 1.0,
            })
            .collect())
    }
}

/// Predictor backed by a fitted scaler + linear model artifact.
///
/// Constructed from an explicit artifact handle; there is no ambient model
/// path and no fallback when the artifact is missing.
#[derive(Debug, Clone)]
pub struct LearnedPredictor {
    artifact: ModelArtifact,
}

fn feature_row(sales: &ProductSales) -> FeatureRow {
    [sales.avg_quantity, sales.order_frequency as f64]
}

impl LearnedPredictor {
    /// Wraps an already-loaded artifact.
    #[must_use]
    pub const fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    /// Loads the artifact from disk.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::ModelArtifact`] if the artifact is
    /// missing or undecodable.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(ModelArtifact::load(path)?))
    }

    /// Trains a new model on the given aggregates and saves the artifact.
    ///
    /// The samples are split into train/test partitions, the scaler is fit
    /// on the training partition only, and the model is fit on the scaled
    /// training features against each product's total quantity. Returns the
    /// predictor along with its R² on the held-out partition (or on the
    /// training data when the split leaves no test samples).
    ///
    /// # Errors
    /// Returns an error if there is too little data to fit or the artifact
    /// cannot be written.
    pub fn train(aggregates: &[ProductSales], artifact_path: &Path) -> Result<(Self, f64)> {
        let features: Vec<FeatureRow> = aggregates.iter().map(feature_row).collect();
        let targets: Vec<f64> = aggregates
            .iter()
            .map(|sales| sales.total_quantity as f64)
            .collect();

        let mut rng = rand::thread_rng();
        let (train_idx, test_idx) = train_test_split(features.len(), TEST_FRACTION, &mut rng);

        let train_features: Vec<FeatureRow> = train_idx.iter().map(|&i| features[i]).collect();
        let train_targets: Vec<f64> = train_idx.iter().map(|&i| targets[i]).collect();

        let scaler = StandardScaler::fit(&train_features)?;
        let scaled_train = scaler.transform(&train_features);
        let model = LinearModel::fit(&scaled_train, &train_targets)?;

        let score = if test_idx.is_empty() {
            model.r_squared(&scaled_train, &train_targets)
        } else {
            let test_features: Vec<FeatureRow> = test_idx
                .iter()
                .map(|&i| scaler.transform_row(&features[i]))
                .collect();
            let test_targets: Vec<f64> = test_idx.iter().map(|&i| targets[i]).collect();
            model.r_squared(&test_features, &test_targets)
        };

        let artifact = ModelArtifact { scaler, model };
        artifact.save(artifact_path)?;
        info!(
            path = %artifact_path.display(),
            r_squared = score,
            samples = aggregates.len(),
            "Trained and saved stock prediction model"
        );

        Ok((Self::new(artifact), score))
    }
}

impl StockPredictor for LearnedPredictor {
    fn predict(&self, aggregates: &[ProductSales]) -> Result<Vec<StockPrediction>> {
        let scaled: Vec<FeatureRow> = aggregates
            .iter()
            .map(|sales| self.artifact.scaler.transform_row(&feature_row(sales)))
            .collect();
        let targets: Vec<f64> = aggregates
            .iter()
            .map(|sales| sales.total_quantity as f64)
            .collect();

        // One goodness-of-fit figure for the whole evaluation set
        let confidence = self.artifact.model.r_squared(&scaled, &targets);

        Ok(aggregates
            .iter()
            .zip(&scaled)
            .map(|(sales, row)| StockPrediction {
                product_id: sales.product_id,
                avg_quantity: sales.avg_quantity,
                predicted_stock: self.artifact.model.predict_row(row).floor() as i64,
                confidence,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    fn sales(product_id: i64, total: i64, freq: u64) -> ProductSales {
        ProductSales {
            product_id,
            total_quantity: total,
            avg_quantity: total as f64 / freq as f64,
            order_frequency: freq,
        }
    }

    #[test]
    fn test_heuristic_applies_fifty_percent_buffer() {
        let predictions = HeuristicPredictor
            .predict(&[sales(1, 30, 2), sales(2, 5, 1)])
            .unwrap();

        assert_eq!(predictions[0].avg_quantity, 15.0);
        assert_eq!(predictions[0].predicted_stock, 22); // floor(15.0 * 1.5)
        assert_eq!(predictions[1].predicted_stock, 7); // floor(5.0 * 1.5)
        assert!(predictions.iter().all(|p| p.confidence == 1.0));
    }

    #[test]
    fn test_heuristic_floors_not_rounds() {
        // avg 1.9 -> 2.85 -> 2, never 3
        let predictions = HeuristicPredictor.predict(&[sales(9, 19, 10)]).unwrap();
        assert_eq!(predictions[0].predicted_stock, 2);
    }

    #[test]
    fn test_heuristic_empty_batch() {
        assert!(HeuristicPredictor.predict(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_learned_train_and_predict() -> crate::errors::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("model.json");

        // Plenty of samples with varying totals, frequencies, and averages
        let aggregates: Vec<ProductSales> = (1..=40)
            .map(|i| {
                let freq = 1 + (i % 5) as u64;
                sales(i, i * 3 + (i % 7), freq)
            })
            .collect();

        let (predictor, score) = LearnedPredictor::train(&aggregates, &path)?;
        assert!(score <= 1.0);
        assert!(path.is_file());

        let predictions = predictor.predict(&aggregates[..3])?;
        assert_eq!(predictions.len(), 3);
        assert_eq!(predictions[0].product_id, 1);
        // Batch shares one confidence figure
        assert!(
            predictions
                .iter()
                .all(|p| p.confidence == predictions[0].confidence)
        );

        // Reloading from the artifact gives identical predictions
        let reloaded = LearnedPredictor::load(&path)?;
        assert_eq!(reloaded.predict(&aggregates[..3])?, predictions);

        Ok(())
    }

    #[test]
    fn test_learned_load_missing_artifact_is_fatal() {
        let result = LearnedPredictor::load(Path::new("/nonexistent/model.json"));
        assert!(matches!(
            result.unwrap_err(),
            crate::errors::Error::ModelArtifact { message: _ }
        ));
    }

    #[test]
    fn test_learned_train_rejects_too_little_data() -> crate::errors::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("model.json");

        let result = LearnedPredictor::train(&[sales(1, 10, 2)], &path);
        assert!(result.is_err());
        assert!(!path.exists());

        Ok(())
    }
}
