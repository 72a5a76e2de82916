//! Raw form input as submitted by the page, a query string or CLI flags

use serde::{Deserialize, Serialize};

use super::course::{parse_selection, CourseDescription, FormError};
use crate::config::defaults;

/// Loosely typed form submission. Select boxes arrive as free text and may
/// still hold the placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseForm {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub level: Option<String>,
    pub total_hours: f64,
    pub lecture_count: u32,
    pub title: String,
    pub headline: String,
    pub rating: f64,
    pub review_count: u64,
}

impl Default for CourseForm {
    fn default() -> Self {
        Self {
            category: None,
            subcategory: None,
            level: None,
            total_hours: defaults::FORM_TOTAL_HOURS,
            lecture_count: defaults::FORM_LECTURE_COUNT,
            title: defaults::FORM_TITLE.to_string(),
            headline: defaults::FORM_HEADLINE.to_string(),
            rating: defaults::FORM_RATING,
            review_count: defaults::FORM_REVIEW_COUNT,
        }
    }
}

impl CourseForm {
    /// Map placeholders to `Unselected` and parse enum names.
    ///
    /// Numeric bounds are not checked here; see [`CourseDescription::validate`].
    pub fn resolve(&self) -> Result<CourseDescription, FormError> {
        Ok(CourseDescription {
            category: parse_selection(self.category.as_deref(), str::parse)?,
            subcategory: parse_selection(self.subcategory.as_deref(), |s| Ok(s.to_string()))?,
            level: parse_selection(self.level.as_deref(), str::parse)?,
            total_hours: self.total_hours,
            lecture_count: self.lecture_count,
            title: self.title.clone(),
            headline: self.headline.clone(),
            rating: self.rating,
            review_count: self.review_count,
        })
    }
}
