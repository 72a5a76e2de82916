//! Course type → subcategory catalog
//!
//! Loaded once at startup from a JSON object mapping each course type to its
//! subcategories. Lookups never fail: an unknown course type simply has no
//! subcategories.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::types::CourseType;

/// Catch-all subcategory bucket, always listed last.
pub const UNKNOWN_SUBCATEGORY: &str = "Unknown";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Immutable course type → subcategory lookup table.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<CourseType, Vec<String>>,
}

impl Catalog {
    /// Load the catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: BTreeMap<String, Vec<String>> =
            serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::from_mapping(raw);
        info!(
            path = %path.display(),
            course_types = catalog.entries.len(),
            subcategories = catalog.entries.values().map(Vec::len).sum::<usize>(),
            "Loaded course catalog"
        );
        Ok(catalog)
    }

    /// Build from an in-memory mapping. Keys that are not a known course type
    /// are skipped with a warning.
    pub fn from_mapping(raw: BTreeMap<String, Vec<String>>) -> Self {
        let mut entries = BTreeMap::new();
        for (key, subcategories) in raw {
            match key.parse::<CourseType>() {
                Ok(course_type) => {
                    entries.insert(course_type, Self::ordered(subcategories));
                }
                Err(_) => warn!(course_type = %key, "Ignoring catalog entry for unknown course type"),
            }
        }
        Self { entries }
    }

    /// Alphabetical order, duplicates removed, "Unknown" moved to the end.
    fn ordered(subcategories: Vec<String>) -> Vec<String> {
        let has_unknown = subcategories.iter().any(|s| s == UNKNOWN_SUBCATEGORY);
        let mut named: Vec<String> = subcategories
            .into_iter()
            .filter(|s| s != UNKNOWN_SUBCATEGORY)
            .collect();
        named.sort();
        named.dedup();
        if has_unknown {
            named.push(UNKNOWN_SUBCATEGORY.to_string());
        }
        named
    }

    /// Course types offered by the form, alphabetical.
    pub const fn course_types() -> &'static [CourseType] {
        &CourseType::ALL
    }

    /// Valid subcategories for a course type; empty when the type has no
    /// catalog entry.
    pub fn subcategories(&self, course_type: CourseType) -> &[String] {
        self.entries
            .get(&course_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// String-keyed lookup for request paths. Unrecognised names yield an
    /// empty list.
    pub fn subcategories_by_name(&self, course_type: &str) -> &[String] {
        course_type
            .parse::<CourseType>()
            .map(|t| self.subcategories(t))
            .unwrap_or_default()
    }

    pub fn contains(&self, course_type: CourseType, subcategory: &str) -> bool {
        self.subcategories(course_type).iter().any(|s| s == subcategory)
    }

    /// Number of course types with at least one catalog entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn mapping() -> BTreeMap<String, Vec<String>> {
        let mut map = BTreeMap::new();
        map.insert(
            "Development".to_string(),
            vec![
                "Web Development".to_string(),
                "Unknown".to_string(),
                "Data Science".to_string(),
                "Mobile Apps".to_string(),
            ],
        );
        map.insert(
            "Design".to_string(),
            vec!["Web Design".to_string(), "Graphic Design".to_string()],
        );
        map.insert("Cooking".to_string(), vec!["Baking".to_string()]);
        map
    }

    #[test]
    fn test_unknown_sorted_last() {
        let catalog = Catalog::from_mapping(mapping());
        assert_eq!(
            catalog.subcategories(CourseType::Development),
            ["Data Science", "Mobile Apps", "Web Development", "Unknown"]
        );
    }

    #[test]
    fn test_without_unknown_is_plain_alphabetical() {
        let catalog = Catalog::from_mapping(mapping());
        assert_eq!(
            catalog.subcategories(CourseType::Design),
            ["Graphic Design", "Web Design"]
        );
    }

    #[test]
    fn test_lookup_miss_is_empty() {
        let catalog = Catalog::from_mapping(mapping());
        assert!(catalog.subcategories(CourseType::Marketing).is_empty());
        assert!(catalog.subcategories_by_name("Cooking").is_empty());
        assert!(catalog.subcategories_by_name("nonsense").is_empty());
    }

    #[test]
    fn test_unknown_course_types_are_dropped() {
        let catalog = Catalog::from_mapping(mapping());
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_course_types_are_all_types_alphabetical() {
        let names: Vec<&str> = Catalog::course_types().iter().map(|t| t.as_str()).collect();
        assert_eq!(names, ["Business", "Design", "Development", "Marketing"]);
    }

    #[test]
    fn test_contains() {
        let catalog = Catalog::from_mapping(mapping());
        assert!(catalog.contains(CourseType::Development, "Unknown"));
        assert!(!catalog.contains(CourseType::Design, "Unknown"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Business": ["Finance", "Unknown", "Entrepreneurship"]}}"#).unwrap();
        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(
            catalog.subcategories(CourseType::Business),
            ["Entrepreneurship", "Finance", "Unknown"]
        );
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(Catalog::load(file.path()), Err(CatalogError::Parse { .. })));
        assert!(matches!(
            Catalog::load(Path::new("/nonexistent/course_mapping.json")),
            Err(CatalogError::Io { .. })
        ));
    }
}
