//! Course attributes entered through the simulator form

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::catalog::Catalog;

/// Placeholder shown as the first option of every select box.
pub const PLACEHOLDER: &str = "Please select";

// ============================================================================
// Selection
// ============================================================================

/// A select-box value that is either still on the placeholder or holds a
/// concrete choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    Unselected,
    Selected(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self::Unselected
    }
}

impl<T> Selection<T> {
    pub const fn is_selected(&self) -> bool {
        matches!(self, Self::Selected(_))
    }

    pub const fn as_selected(&self) -> Option<&T> {
        match self {
            Self::Selected(v) => Some(v),
            Self::Unselected => None,
        }
    }
}

impl<T> From<Option<T>> for Selection<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unselected, Self::Selected)
    }
}

/// Interpret raw select-box text: missing, blank or the placeholder mean
/// nothing has been chosen yet.
pub fn parse_selection<T, F>(raw: Option<&str>, parse: F) -> Result<Selection<T>, FormError>
where
    F: FnOnce(&str) -> Result<T, FormError>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(Selection::Unselected),
        Some(v) if v == PLACEHOLDER => Ok(Selection::Unselected),
        Some(v) => parse(v).map(Selection::Selected),
    }
}

// ============================================================================
// Course Type / Instructional Level
// ============================================================================

/// Top-level course category offered in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CourseType {
    Business,
    Design,
    Development,
    Marketing,
}

impl CourseType {
    /// All course types in presentation (alphabetical) order.
    pub const ALL: [Self; 4] = [Self::Business, Self::Design, Self::Development, Self::Marketing];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Business => "Business",
            Self::Design => "Design",
            Self::Development => "Development",
            Self::Marketing => "Marketing",
        }
    }
}

impl std::fmt::Display for CourseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseType {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FormError::UnknownOption {
                field: "category",
                value: s.to_string(),
            })
    }
}

/// Instructional level of the course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionalLevel {
    All,
    Beginner,
    Intermediate,
    Expert,
}

impl InstructionalLevel {
    /// Levels in presentation order (sorted by name).
    pub const ALL: [Self; 4] = [Self::All, Self::Beginner, Self::Expert, Self::Intermediate];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Expert => "Expert",
        }
    }
}

impl std::fmt::Display for InstructionalLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstructionalLevel {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| FormError::UnknownOption {
                field: "level",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// Form Errors
// ============================================================================

/// Boundary validation failures. These never reach the model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("unknown {field} '{value}'")]
    UnknownOption { field: &'static str, value: String },

    #[error("{field} must be {constraint} (got {value})")]
    OutOfRange {
        field: &'static str,
        constraint: &'static str,
        value: f64,
    },

    #[error("subcategory '{subcategory}' is not offered under {category}")]
    SubcategoryNotInCatalog {
        category: CourseType,
        subcategory: String,
    },
}

// ============================================================================
// Course Description
// ============================================================================

/// The fixed attributes of one simulation run. Only price is swept.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDescription {
    pub category: Selection<CourseType>,
    pub subcategory: Selection<String>,
    pub level: Selection<InstructionalLevel>,
    pub total_hours: f64,
    pub lecture_count: u32,
    pub title: String,
    pub headline: String,
    pub rating: f64,
    pub review_count: u64,
}

/// Borrowed view of the three select-box values once all are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedAttributes<'a> {
    pub category: CourseType,
    pub subcategory: &'a str,
    pub level: InstructionalLevel,
}

impl CourseDescription {
    /// Names of the select boxes still on the placeholder.
    pub fn missing_selections(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.category.is_selected() {
            missing.push("category");
        }
        if !self.subcategory.is_selected() {
            missing.push("subcategory");
        }
        if !self.level.is_selected() {
            missing.push("level");
        }
        missing
    }

    /// The concrete select-box values, or the names of those still missing.
    pub fn selected(&self) -> Result<SelectedAttributes<'_>, Vec<&'static str>> {
        match (&self.category, &self.subcategory, &self.level) {
            (Selection::Selected(category), Selection::Selected(subcategory), Selection::Selected(level)) => {
                Ok(SelectedAttributes {
                    category: *category,
                    subcategory: subcategory.as_str(),
                    level: *level,
                })
            }
            _ => Err(self.missing_selections()),
        }
    }

    /// Check numeric bounds and catalog membership of the subcategory.
    ///
    /// Membership is only checked once both category and subcategory are
    /// chosen; completeness itself is the simulator's concern.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), FormError> {
        if !self.total_hours.is_finite() || self.total_hours < 0.0 {
            return Err(FormError::OutOfRange {
                field: "total_hours",
                constraint: "a finite number >= 0",
                value: self.total_hours,
            });
        }
        if self.lecture_count < 1 {
            return Err(FormError::OutOfRange {
                field: "lecture_count",
                constraint: ">= 1",
                value: f64::from(self.lecture_count),
            });
        }
        if !self.rating.is_finite() || !(0.0..=5.0).contains(&self.rating) {
            return Err(FormError::OutOfRange {
                field: "rating",
                constraint: "between 0 and 5",
                value: self.rating,
            });
        }

        if let (Selection::Selected(category), Selection::Selected(subcategory)) =
            (&self.category, &self.subcategory)
        {
            if !catalog.contains(*category, subcategory) {
                return Err(FormError::SubcategoryNotInCatalog {
                    category: *category,
                    subcategory: subcategory.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn course() -> CourseDescription {
        CourseDescription {
            category: Selection::Selected(CourseType::Development),
            subcategory: Selection::Selected("Web Development".to_string()),
            level: Selection::Selected(InstructionalLevel::Beginner),
            total_hours: 10.0,
            lecture_count: 20,
            title: "Master Python Fast".to_string(),
            headline: "Build real-world apps with Python".to_string(),
            rating: 4.0,
            review_count: 100,
        }
    }

    fn catalog() -> Catalog {
        let mut map = BTreeMap::new();
        map.insert(
            "Development".to_string(),
            vec!["Web Development".to_string(), "Unknown".to_string()],
        );
        Catalog::from_mapping(map)
    }

    #[test]
    fn test_placeholder_parses_as_unselected() {
        let sel = parse_selection(Some(PLACEHOLDER), |s| s.parse::<CourseType>()).unwrap();
        assert_eq!(sel, Selection::Unselected);
        let sel = parse_selection(Some("  "), |s| s.parse::<CourseType>()).unwrap();
        assert_eq!(sel, Selection::Unselected);
        let sel = parse_selection(None, |s| s.parse::<CourseType>()).unwrap();
        assert_eq!(sel, Selection::Unselected);
    }

    #[test]
    fn test_unknown_category_is_a_form_error() {
        let err = parse_selection(Some("Cooking"), |s| s.parse::<CourseType>()).unwrap_err();
        assert!(matches!(err, FormError::UnknownOption { field: "category", .. }));
    }

    #[test]
    fn test_levels_presented_alphabetically() {
        let names: Vec<_> = InstructionalLevel::ALL.iter().map(|l| l.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_missing_selections_names_every_unset_box() {
        let mut c = course();
        c.category = Selection::Unselected;
        c.level = Selection::Unselected;
        assert_eq!(c.missing_selections(), vec!["category", "level"]);
        assert_eq!(c.selected().unwrap_err(), vec!["category", "level"]);
    }

    #[test]
    fn test_validate_accepts_default_course() {
        assert!(course().validate(&catalog()).is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut c = course();
        c.rating = 5.5;
        assert!(matches!(c.validate(&catalog()), Err(FormError::OutOfRange { field: "rating", .. })));

        let mut c = course();
        c.total_hours = -1.0;
        assert!(matches!(c.validate(&catalog()), Err(FormError::OutOfRange { field: "total_hours", .. })));

        let mut c = course();
        c.lecture_count = 0;
        assert!(matches!(c.validate(&catalog()), Err(FormError::OutOfRange { field: "lecture_count", .. })));
    }

    #[test]
    fn test_validate_rejects_subcategory_outside_catalog() {
        let mut c = course();
        c.subcategory = Selection::Selected("Graphic Design".to_string());
        assert!(matches!(
            c.validate(&catalog()),
            Err(FormError::SubcategoryNotInCatalog { .. })
        ));
    }
}
