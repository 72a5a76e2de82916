//! Feature encoding for the artifact pipeline
//!
//! Turns a [`PriceSweepRow`] into the dense feature vector the tree ensemble
//! was trained on. Each encoder reads one input column:
//!
//! - `numeric`: the value itself
//! - `one_hot`: one slot per known category; unseen values encode as all zeros
//! - `text_length`: number of word tokens
//! - `text_terms`: count of each vocabulary term among the word tokens
//!
//! Tokens are maximal runs of lowercase ASCII letters and digits after
//! lowercasing the text.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{InferenceError, ModelLoadError};
use crate::types::{ColumnType, ColumnValue, PriceSweepRow, MODEL_COLUMNS};

/// Serialized feature encoder definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureSpec {
    Numeric { column: String },
    OneHot { column: String, categories: Vec<String> },
    TextLength { column: String },
    TextTerms { column: String, vocabulary: Vec<String> },
}

impl FeatureSpec {
    pub fn column(&self) -> &str {
        match self {
            Self::Numeric { column }
            | Self::OneHot { column, .. }
            | Self::TextLength { column }
            | Self::TextTerms { column, .. } => column,
        }
    }

    /// Number of output slots this encoder produces.
    pub fn width(&self) -> usize {
        match self {
            Self::Numeric { .. } | Self::TextLength { .. } => 1,
            Self::OneHot { categories, .. } => categories.len(),
            Self::TextTerms { vocabulary, .. } => vocabulary.len(),
        }
    }
}

#[derive(Debug)]
enum Encoder {
    Numeric,
    OneHot(HashMap<String, usize>),
    TextLength,
    TextTerms(HashMap<String, usize>),
}

#[derive(Debug)]
struct CompiledFeature {
    column: String,
    offset: usize,
    encoder: Encoder,
}

/// Validated, ready-to-run feature pipeline.
#[derive(Debug)]
pub struct FeatureEncoder {
    features: Vec<CompiledFeature>,
    width: usize,
    tokenizer: Regex,
}

impl FeatureEncoder {
    /// Check every feature spec against the model input schema and precompute
    /// lookup tables.
    pub fn compile(specs: &[FeatureSpec]) -> Result<Self, ModelLoadError> {
        let tokenizer = Regex::new(r"[a-z0-9]+")
            .map_err(|e| ModelLoadError::Incompatible(format!("tokenizer: {e}")))?;

        let mut features = Vec::with_capacity(specs.len());
        let mut offset = 0;
        for (i, spec) in specs.iter().enumerate() {
            let column = spec.column();
            let column_type = MODEL_COLUMNS
                .iter()
                .find(|(name, _)| *name == column)
                .map(|(_, ty)| *ty)
                .ok_or_else(|| {
                    ModelLoadError::Incompatible(format!(
                        "feature {i} reads unknown column '{column}'"
                    ))
                })?;

            let encoder = match spec {
                FeatureSpec::Numeric { .. } => {
                    if column_type == ColumnType::Text {
                        return Err(ModelLoadError::Incompatible(format!(
                            "feature {i}: numeric encoder on text column '{column}'"
                        )));
                    }
                    Encoder::Numeric
                }
                FeatureSpec::OneHot { categories, .. } => {
                    Self::require_text(i, "one_hot", column, column_type)?;
                    Encoder::OneHot(Self::index(categories))
                }
                FeatureSpec::TextLength { .. } => {
                    Self::require_text(i, "text_length", column, column_type)?;
                    Encoder::TextLength
                }
                FeatureSpec::TextTerms { vocabulary, .. } => {
                    Self::require_text(i, "text_terms", column, column_type)?;
                    let lowered: Vec<String> = vocabulary.iter().map(|t| t.to_lowercase()).collect();
                    Encoder::TextTerms(Self::index(&lowered))
                }
            };

            features.push(CompiledFeature {
                column: column.to_string(),
                offset,
                encoder,
            });
            offset += spec.width();
        }

        Ok(Self {
            features,
            width: offset,
            tokenizer,
        })
    }

    fn require_text(
        index: usize,
        kind: &str,
        column: &str,
        column_type: ColumnType,
    ) -> Result<(), ModelLoadError> {
        if column_type == ColumnType::Text {
            Ok(())
        } else {
            Err(ModelLoadError::Incompatible(format!(
                "feature {index}: {kind} encoder on non-text column '{column}'"
            )))
        }
    }

    fn index(values: &[String]) -> HashMap<String, usize> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), i))
            .collect()
    }

    /// Total number of encoded features.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Encode one row into a fresh feature vector.
    #[allow(clippy::cast_precision_loss)]
    pub fn encode(&self, row_index: usize, row: &PriceSweepRow) -> Result<Vec<f64>, InferenceError> {
        let mut out = vec![0.0; self.width];
        for feature in &self.features {
            let value = row.column(&feature.column).ok_or_else(|| InferenceError::MalformedRow {
                row: row_index,
                message: format!("missing column '{}'", feature.column),
            })?;

            match (&feature.encoder, value) {
                (Encoder::Numeric, ColumnValue::Number(n)) => out[feature.offset] = n,
                (Encoder::OneHot(categories), ColumnValue::Text(text)) => {
                    if let Some(slot) = categories.get(text) {
                        out[feature.offset + slot] = 1.0;
                    }
                }
                (Encoder::TextLength, ColumnValue::Text(text)) => {
                    out[feature.offset] = self.tokens(text).len() as f64;
                }
                (Encoder::TextTerms(vocabulary), ColumnValue::Text(text)) => {
                    for token in self.tokens(text) {
                        if let Some(slot) = vocabulary.get(token.as_str()) {
                            out[feature.offset + slot] += 1.0;
                        }
                    }
                }
                _ => {
                    return Err(InferenceError::MalformedRow {
                        row: row_index,
                        message: format!("column '{}' has the wrong type", feature.column),
                    })
                }
            }
        }
        Ok(out)
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.tokenizer
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CourseType, InstructionalLevel};

    fn row() -> PriceSweepRow {
        PriceSweepRow {
            category: CourseType::Development,
            subcategory: "Web Development".to_string(),
            level: InstructionalLevel::Beginner,
            total_hours: 10.0,
            lecture_count: 20,
            price: 49.99,
            title: "Master Python Fast".to_string(),
            headline: "Build real-world apps with Python, fast!".to_string(),
            rating: 4.0,
            review_count: 100,
        }
    }

    #[test]
    fn test_encodes_each_kind() {
        let specs = vec![
            FeatureSpec::Numeric { column: "amount".to_string() },
            FeatureSpec::OneHot {
                column: "instructional_level".to_string(),
                categories: vec!["All".to_string(), "Beginner".to_string()],
            },
            FeatureSpec::TextLength { column: "title".to_string() },
            FeatureSpec::TextTerms {
                column: "headline".to_string(),
                vocabulary: vec!["Python".to_string(), "fast".to_string(), "java".to_string()],
            },
        ];
        let encoder = FeatureEncoder::compile(&specs).unwrap();
        assert_eq!(encoder.width(), 1 + 2 + 1 + 3);

        let features = encoder.encode(0, &row()).unwrap();
        assert_eq!(features, vec![49.99, 0.0, 1.0, 3.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_unseen_category_encodes_as_zeros() {
        let specs = vec![FeatureSpec::OneHot {
            column: "subcategory".to_string(),
            categories: vec!["Data Science".to_string()],
        }];
        let encoder = FeatureEncoder::compile(&specs).unwrap();
        assert_eq!(encoder.encode(0, &row()).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_unknown_column_rejected() {
        let specs = vec![FeatureSpec::Numeric { column: "price".to_string() }];
        assert!(matches!(
            FeatureEncoder::compile(&specs),
            Err(ModelLoadError::Incompatible(_))
        ));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let specs = vec![FeatureSpec::Numeric { column: "title".to_string() }];
        assert!(FeatureEncoder::compile(&specs).is_err());
        let specs = vec![FeatureSpec::TextLength { column: "rating".to_string() }];
        assert!(FeatureEncoder::compile(&specs).is_err());
    }

    #[test]
    fn test_spec_json_shape() {
        let spec: FeatureSpec =
            serde_json::from_str(r#"{"kind": "one_hot", "column": "course_type", "categories": ["Design"]}"#)
                .unwrap();
        assert_eq!(spec.width(), 1);
        assert_eq!(spec.column(), "course_type");
    }
}
