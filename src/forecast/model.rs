//! Learned-mode model internals: feature scaling, ordinary least squares,
//! and the persisted model artifact.
//!
//! The learned predictor maps standardized `[avg_quantity, order_frequency]`
//! features to a total-quantity target with a linear model fitted by OLS
//! (normal equations). The fitted scaler and model are serialized together as
//! a JSON artifact at an explicit path; nothing here touches ambient global
//! state.

use crate::errors::{Error, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of input features: `[avg_quantity, order_frequency]`.
pub const NUM_FEATURES: usize = 2;

/// One row of model input.
pub type FeatureRow = [f64; NUM_FEATURES];

const EPSILON: f64 = 1e-10;

/// Per-feature zero-mean / unit-variance scaler.
///
/// Fit only on the training partition; the same parameters are then applied
/// to every row scored later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Per-feature mean
    pub mean: [f64; NUM_FEATURES],
    /// Per-feature standard deviation (1.0 where a feature is constant)
    pub std_dev: [f64; NUM_FEATURES],
}

impl StandardScaler {
    /// Fits the scaler to the given rows.
    ///
    /// # Errors
    /// Returns an error if `rows` is empty.
    pub fn fit(rows: &[FeatureRow]) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::InvalidInput {
                message: "Cannot fit a scaler to zero rows".to_string(),
            });
        }

        let n = rows.len() as f64;
        let mut mean = [0.0; NUM_FEATURES];
        let mut std_dev = [0.0; NUM_FEATURES];

        for feature in 0..NUM_FEATURES {
            let sum: f64 = rows.iter().map(|row| row[feature]).sum();
            mean[feature] = sum / n;

            let variance: f64 = rows
                .iter()
                .map(|row| (row[feature] - mean[feature]).powi(2))
                .sum::<f64>()
                / n;
            let sd = variance.sqrt();
            // A constant feature standardizes to all zeros
            std_dev[feature] = if sd < EPSILON { 1.0 } else { sd };
        }

        Ok(Self { mean, std_dev })
    }

    /// Applies the fitted scaling to one row.
    #[must_use]
    pub fn transform_row(&self, row: &FeatureRow) -> FeatureRow {
        let mut out = [0.0; NUM_FEATURES];
        for feature in 0..NUM_FEATURES {
            out[feature] = (row[feature] - self.mean[feature]) / self.std_dev[feature];
        }
        out
    }

    /// Applies the fitted scaling to a batch of rows.
    #[must_use]
    pub fn transform(&self, rows: &[FeatureRow]) -> Vec<FeatureRow> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }
}

/// Linear regression over the feature rows, fit by ordinary least squares.
///
/// Predicts `intercept + coefficients · row`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Constant term
    pub intercept: f64,
    /// Per-feature weights
    pub coefficients: [f64; NUM_FEATURES],
}

impl LinearModel {
    /// Fits the model via the normal equations.
    ///
    /// # Errors
    /// Returns an error if there are fewer rows than parameters or the
    /// design matrix is singular (e.g. perfectly collinear features).
    pub fn fit(rows: &[FeatureRow], targets: &[f64]) -> Result<Self> {
        let n = rows.len();
        if n != targets.len() || n <= NUM_FEATURES {
            return Err(Error::InvalidInput {
                message: format!(
                    "Need more than {NUM_FEATURES} samples to fit the model, got {n}"
                ),
            });
        }

        // Build X^T X and X^T y for the design matrix [1, f0, f1]
        const P: usize = NUM_FEATURES + 1;
        let mut xtx = [[0.0f64; P]; P];
        let mut xty = [0.0f64; P];

        for (row, &y) in rows.iter().zip(targets) {
            let design = [1.0, row[0], row[1]];
            for i in 0..P {
                xty[i] += design[i] * y;
                for j in 0..P {
                    xtx[i][j] += design[i] * design[j];
                }
            }
        }

        let params = solve_linear_system(xtx, xty)?;
        Ok(Self {
            intercept: params[0],
            coefficients: [params[1], params[2]],
        })
    }

    /// Predicts the target for one (already scaled) feature row.
    #[must_use]
    pub fn predict_row(&self, row: &FeatureRow) -> f64 {
        self.intercept + self.coefficients[0] * row[0] + self.coefficients[1] * row[1]
    }

    /// Coefficient of determination (R²) of the model on the given set.
    ///
    /// Returns 0.0 when the targets have no variance to explain.
    #[must_use]
    pub fn r_squared(&self, rows: &[FeatureRow], targets: &[f64]) -> f64 {
        if rows.is_empty() {
            return 0.0;
        }

        let mean_target: f64 = targets.iter().sum::<f64>() / targets.len() as f64;
        let ss_tot: f64 = targets.iter().map(|y| (y - mean_target).powi(2)).sum();
        if ss_tot < EPSILON {
            return 0.0;
        }

        let ss_res: f64 = rows
            .iter()
            .zip(targets)
            .map(|(row, y)| (y - self.predict_row(row)).powi(2))
            .sum();

        1.0 - ss_res / ss_tot
    }
}

/// Solves a small dense linear system with Gaussian elimination and partial
/// pivoting.
fn solve_linear_system<const P: usize>(mut a: [[f64; P]; P], mut b: [f64; P]) -> Result<[f64; P]> {
    for col in 0..P {
        let pivot = (col..P)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < EPSILON {
            return Err(Error::InvalidInput {
                message: "Singular design matrix; features carry no independent signal"
                    .to_string(),
            });
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..P {
            let factor = a[row][col] / a[col][col];
            for k in col..P {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; P];
    for row in (0..P).rev() {
        let mut acc = b[row];
        for col in (row + 1)..P {
            acc -= a[row][col] * x[col];
        }
        x[row] = acc / a[row][row];
    }
    Ok(x)
}

/// Splits `n` sample indices into shuffled (train, test) partitions.
///
/// The test partition gets `ceil(n * test_fraction)` samples, but the train
/// partition always keeps at least one.
pub fn train_test_split<R: Rng>(
    n: usize,
    test_fraction: f64,
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    let test_len = ((n as f64 * test_fraction).ceil() as usize).min(n.saturating_sub(1));
    let train = indices.split_off(test_len);
    (train, indices)
}

/// The persisted learned-mode artifact: fitted scaler plus fitted model,
/// serialized together as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Scaler fitted on the training partition
    pub scaler: StandardScaler,
    /// OLS model fitted on the scaled training partition
    pub model: LinearModel,
}

impl ModelArtifact {
    /// Writes the artifact to the given path as JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written or serialized.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Loads an artifact from the given path.
    ///
    /// A missing or undecodable artifact is a hard error: when learned mode
    /// is requested there is no silent fallback to the heuristic.
    ///
    /// # Errors
    /// Returns [`Error::ModelArtifact`] naming the path and cause.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| Error::ModelArtifact {
            message: format!("Cannot open model artifact {}: {e}", path.display()),
        })?;
        serde_json::from_reader(file).map_err(|e| Error::ModelArtifact {
            message: format!("Cannot decode model artifact {}: {e}", path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_scaler_zero_mean_unit_variance() {
        let rows = vec![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();

        let scaled = scaler.transform(&rows);
        for feature in 0..NUM_FEATURES {
            let mean: f64 = scaled.iter().map(|r| r[feature]).sum::<f64>() / 3.0;
            let var: f64 = scaled.iter().map(|r| r[feature].powi(2)).sum::<f64>() / 3.0;
            assert!(mean.abs() < 1e-9);
            assert!((var - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_scaler_constant_feature() {
        let rows = vec![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let scaled = scaler.transform(&rows);
        // Constant feature maps to zero instead of dividing by zero
        assert!(scaled.iter().all(|r| r[0] == 0.0));
    }

    #[test]
    fn test_scaler_rejects_empty_input() {
        assert!(StandardScaler::fit(&[]).is_err());
    }

    #[test]
    fn test_linear_model_recovers_exact_relationship() {
        // y = 2 + 3*f0 + 0.5*f1, noiseless
        let rows: Vec<FeatureRow> = vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [2.0, 3.0],
            [4.0, 1.0],
        ];
        let targets: Vec<f64> = rows.iter().map(|r| 2.0 + 3.0 * r[0] + 0.5 * r[1]).collect();

        let model = LinearModel::fit(&rows, &targets).unwrap();
        assert!((model.intercept - 2.0).abs() < 1e-8);
        assert!((model.coefficients[0] - 3.0).abs() < 1e-8);
        assert!((model.coefficients[1] - 0.5).abs() < 1e-8);

        // Perfect fit scores R^2 of 1
        assert!((model.r_squared(&rows, &targets) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_model_rejects_tiny_samples() {
        let rows = vec![[1.0, 2.0], [3.0, 4.0]];
        let targets = vec![1.0, 2.0];
        assert!(LinearModel::fit(&rows, &targets).is_err());
    }

    #[test]
    fn test_linear_model_rejects_collinear_features() {
        // f1 is exactly 2 * f0
        let rows = vec![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]];
        let targets = vec![1.0, 2.0, 3.0, 4.0];
        assert!(LinearModel::fit(&rows, &targets).is_err());
    }

    #[test]
    fn test_r_squared_zero_variance_targets() {
        let rows = vec![[0.0, 0.0], [1.0, 1.0], [2.0, 0.0], [0.0, 2.0]];
        let targets = vec![3.0, 3.0, 3.0, 3.0];
        let model = LinearModel {
            intercept: 3.0,
            coefficients: [0.0, 0.0],
        };
        assert_eq!(model.r_squared(&rows, &targets), 0.0);
    }

    #[test]
    fn test_train_test_split_partitions() {
        let mut rng = StdRng::seed_from_u64(7);
        let (train, test) = train_test_split(10, 0.2, &mut rng);

        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_train_test_split_keeps_a_training_sample() {
        let mut rng = StdRng::seed_from_u64(7);
        let (train, test) = train_test_split(1, 0.9, &mut rng);
        assert_eq!(train.len(), 1);
        assert!(test.is_empty());
    }

    #[test]
    fn test_artifact_round_trip_and_missing_path() -> crate::errors::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("model.json");

        let artifact = ModelArtifact {
            scaler: StandardScaler {
                mean: [1.0, 2.0],
                std_dev: [0.5, 1.5],
            },
            model: LinearModel {
                intercept: 0.25,
                coefficients: [1.0, -1.0],
            },
        };
        artifact.save(&path)?;

        let loaded = ModelArtifact::load(&path)?;
        assert_eq!(loaded, artifact);

        let missing = ModelArtifact::load(&dir.path().join("absent.json"));
        assert!(matches!(
            missing.unwrap_err(),
            crate::errors::Error::ModelArtifact { message: _ }
        ));

        Ok(())
    }
}
