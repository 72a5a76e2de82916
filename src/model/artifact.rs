//! On-disk model artifact: feature pipeline + gradient-boosted trees
//!
//! The artifact is a JSON document exported from the training pipeline:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "name": "pipeline_lgb",
//!   "target_transform": "log1p",
//!   "input_columns": ["course_type", "subcategory", ...],
//!   "features": [{"kind": "numeric", "column": "amount"}, ...],
//!   "ensemble": {
//!     "base_score": 6.2,
//!     "trees": [{"nodes": [
//!       {"type": "split", "feature": 0, "threshold": 49.5, "left": 1, "right": 2},
//!       {"type": "leaf", "value": 0.4},
//!       {"type": "leaf", "value": -0.3}
//!     ]}]
//!   }
//! }
//! ```
//!
//! Split nodes send a value `<= threshold` left; NaN follows `default_left`.
//! Children must appear after their parent in the node array, which keeps
//! every traversal finite.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::features::{FeatureEncoder, FeatureSpec};
use super::{InferenceError, ModelLoadError, RevenueModel};
use crate::types::{model_column_names, PriceSweepRow};

/// Supported artifact format version.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// The only target transform the simulator knows how to invert.
pub const TARGET_TRANSFORM_LOG1P: &str = "log1p";

/// Serialized model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub target_transform: String,
    pub input_columns: Vec<String>,
    pub features: Vec<FeatureSpec>,
    pub ensemble: TreeEnsemble,
}

/// Additive tree ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

/// One regression tree stored as a flat node array; node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default)]
        default_left: bool,
    },
    Leaf {
        value: f64,
    },
}

impl Tree {
    /// Structural checks: non-empty, forward-pointing children, feature
    /// indices within the encoded width, finite numbers.
    fn validate(&self, tree_index: usize, width: usize) -> Result<(), ModelLoadError> {
        let fail = |msg: String| ModelLoadError::Incompatible(format!("tree {tree_index}: {msg}"));

        if self.nodes.is_empty() {
            return Err(fail("has no nodes".to_string()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if feature >= width {
                        return Err(fail(format!(
                            "node {i} splits on feature {feature} but only {width} features are encoded"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(fail(format!("node {i} has non-finite threshold")));
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(fail(format!("node {i} has invalid child index {child}")));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(fail(format!("node {i} has non-finite leaf value")));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf. Assumes [`Tree::validate`] passed.
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = features[feature];
                    let go_left = if x.is_nan() { default_left } else { x <= threshold };
                    index = if go_left { left } else { right };
                }
            }
        }
    }
}

/// In-process model evaluated from a loaded artifact.
#[derive(Debug)]
pub struct ArtifactModel {
    name: String,
    encoder: FeatureEncoder,
    ensemble: TreeEnsemble,
}

impl ArtifactModel {
    /// Read and validate an artifact file.
    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let artifact: ModelArtifact =
            serde_json::from_str(&contents).map_err(|source| ModelLoadError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        let model = Self::from_artifact(artifact)?;
        info!(
            path = %path.display(),
            model = %model.name,
            trees = model.tree_count(),
            features = model.feature_count(),
            "Loaded model artifact"
        );
        Ok(model)
    }

    /// Validate an artifact against the input schema and compile it.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelLoadError> {
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelLoadError::Incompatible(format!(
                "unsupported format_version {} (expected {ARTIFACT_FORMAT_VERSION})",
                artifact.format_version
            )));
        }
        if artifact.target_transform != TARGET_TRANSFORM_LOG1P {
            return Err(ModelLoadError::Incompatible(format!(
                "unsupported target_transform '{}' (expected '{TARGET_TRANSFORM_LOG1P}')",
                artifact.target_transform
            )));
        }

        let expected = model_column_names();
        if artifact.input_columns != expected {
            return Err(ModelLoadError::Incompatible(format!(
                "input columns {:?} do not match expected {:?}",
                artifact.input_columns, expected
            )));
        }

        let encoder = FeatureEncoder::compile(&artifact.features)?;
        if !artifact.ensemble.base_score.is_finite() {
            return Err(ModelLoadError::Incompatible("non-finite base_score".to_string()));
        }
        for (i, tree) in artifact.ensemble.trees.iter().enumerate() {
            tree.validate(i, encoder.width())?;
        }

        Ok(Self {
            name: artifact.name.unwrap_or_else(|| "unnamed".to_string()),
            encoder,
            ensemble: artifact.ensemble,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tree_count(&self) -> usize {
        self.ensemble.trees.len()
    }

    pub const fn feature_count(&self) -> usize {
        self.encoder.width()
    }

    fn predict_row(&self, row_index: usize, row: &PriceSweepRow) -> Result<f64, InferenceError> {
        let features = self.encoder.encode(row_index, row)?;
        Ok(self.ensemble.base_score
            + self
                .ensemble
                .trees
                .iter()
                .map(|t| t.evaluate(&features))
                .sum::<f64>())
    }
}

#[async_trait]
impl RevenueModel for ArtifactModel {
    async fn predict(&self, rows: &[PriceSweepRow]) -> Result<Vec<f64>, InferenceError> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| self.predict_row(i, row))
            .collect()
    }

    fn backend_name(&self) -> &'static str {
        "artifact"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CourseType, InstructionalLevel};
    use std::io::Write;

    fn artifact_json() -> serde_json::Value {
        serde_json::json!({
            "format_version": 1,
            "name": "test-pipeline",
            "target_transform": "log1p",
            "input_columns": model_column_names(),
            "features": [
                {"kind": "numeric", "column": "amount"},
                {"kind": "one_hot", "column": "course_type", "categories": ["Design", "Development"]}
            ],
            "ensemble": {
                "base_score": 5.0,
                "trees": [
                    {"nodes": [
                        {"type": "split", "feature": 0, "threshold": 50.0, "left": 1, "right": 2},
                        {"type": "leaf", "value": 1.0},
                        {"type": "leaf", "value": -1.0}
                    ]},
                    {"nodes": [
                        {"type": "split", "feature": 2, "threshold": 0.5, "left": 1, "right": 2},
                        {"type": "leaf", "value": 0.0},
                        {"type": "leaf", "value": 0.25}
                    ]}
                ]
            }
        })
    }

    fn row(price: f64) -> PriceSweepRow {
        PriceSweepRow {
            category: CourseType::Development,
            subcategory: "Web Development".to_string(),
            level: InstructionalLevel::Beginner,
            total_hours: 10.0,
            lecture_count: 20,
            price,
            title: "Master Python Fast".to_string(),
            headline: "Build real-world apps with Python".to_string(),
            rating: 4.0,
            review_count: 100,
        }
    }

    fn model() -> ArtifactModel {
        let artifact: ModelArtifact = serde_json::from_value(artifact_json()).unwrap();
        ArtifactModel::from_artifact(artifact).unwrap()
    }

    #[tokio::test]
    async fn test_predict_sums_base_score_and_trees() {
        let m = model();
        let preds = m.predict(&[row(10.0), row(50.0), row(120.0)]).await.unwrap();
        assert_eq!(preds, vec![6.25, 6.25, 4.25]);
    }

    #[tokio::test]
    async fn test_predict_empty_batch() {
        assert!(model().predict(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_metadata() {
        let m = model();
        assert_eq!(m.name(), "test-pipeline");
        assert_eq!(m.tree_count(), 2);
        assert_eq!(m.feature_count(), 3);
        assert_eq!(m.backend_name(), "artifact");
    }

    #[test]
    fn test_column_mismatch_rejected() {
        let mut json = artifact_json();
        json["input_columns"] = serde_json::json!(["category", "subcategory"]);
        let artifact: ModelArtifact = serde_json::from_value(json).unwrap();
        let err = ArtifactModel::from_artifact(artifact).unwrap_err();
        assert!(err.to_string().contains("input columns"));
    }

    #[test]
    fn test_column_order_matters() {
        let mut json = artifact_json();
        let mut cols = model_column_names();
        cols.swap(0, 1);
        json["input_columns"] = serde_json::json!(cols);
        let artifact: ModelArtifact = serde_json::from_value(json).unwrap();
        assert!(ArtifactModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn test_wrong_transform_rejected() {
        let mut json = artifact_json();
        json["target_transform"] = serde_json::json!("log");
        let artifact: ModelArtifact = serde_json::from_value(json).unwrap();
        assert!(ArtifactModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn test_backward_child_rejected() {
        let mut json = artifact_json();
        json["ensemble"]["trees"][0]["nodes"][0]["left"] = serde_json::json!(0);
        let artifact: ModelArtifact = serde_json::from_value(json).unwrap();
        assert!(ArtifactModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn test_out_of_range_feature_rejected() {
        let mut json = artifact_json();
        json["ensemble"]["trees"][0]["nodes"][0]["feature"] = serde_json::json!(3);
        let artifact: ModelArtifact = serde_json::from_value(json).unwrap();
        assert!(ArtifactModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn test_nan_follows_default_direction() {
        let tree = Tree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 1.0,
                    left: 1,
                    right: 2,
                    default_left: false,
                },
                TreeNode::Leaf { value: 10.0 },
                TreeNode::Leaf { value: 20.0 },
            ],
        };
        assert_eq!(tree.evaluate(&[f64::NAN]), 20.0);
        assert_eq!(tree.evaluate(&[0.5]), 10.0);
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", artifact_json()).unwrap();
        let m = ArtifactModel::load(file.path()).unwrap();
        assert_eq!(m.tree_count(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ArtifactModel::load(Path::new("/nonexistent/pipeline_lgb.json")).unwrap_err();
        assert!(matches!(err, ModelLoadError::Io { .. }));
    }
}
