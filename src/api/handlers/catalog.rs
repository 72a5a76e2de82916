//! Catalog endpoints: select-box options for the form

use axum::extract::{Path, State};
use axum::response::Response;
use serde::Serialize;

use super::SimulatorContext;
use crate::api::envelope::ApiResponse;
use crate::catalog::Catalog;
use crate::types::{CourseForm, InstructionalLevel, PLACEHOLDER};

/// Everything the page needs to draw the empty form.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub page_title: String,
    pub currency: String,
    /// Placeholder first, then course types alphabetically
    pub course_types: Vec<String>,
    /// Placeholder first, then levels by name
    pub levels: Vec<String>,
    pub defaults: CourseForm,
}

#[derive(Debug, Serialize)]
pub struct SubcategoriesResponse {
    pub category: String,
    pub subcategories: Vec<String>,
}

fn with_placeholder(options: impl IntoIterator<Item = &'static str>) -> Vec<String> {
    std::iter::once(PLACEHOLDER)
        .chain(options)
        .map(str::to_string)
        .collect()
}

/// GET /api/v1/catalog
pub async fn get_catalog(State(ctx): State<SimulatorContext>) -> Response {
    ApiResponse::ok(CatalogResponse {
        page_title: ctx.display.page_title.clone(),
        currency: ctx.display.currency.clone(),
        course_types: with_placeholder(Catalog::course_types().iter().map(|t| t.as_str())),
        levels: with_placeholder(InstructionalLevel::ALL.iter().map(|l| l.as_str())),
        defaults: CourseForm::default(),
    })
}

/// GET /api/v1/catalog/:category/subcategories
///
/// Unknown categories (including the placeholder) yield an empty list.
pub async fn get_subcategories(
    State(ctx): State<SimulatorContext>,
    Path(category): Path<String>,
) -> Response {
    let subcategories = ctx.catalog.subcategories_by_name(&category).to_vec();
    ApiResponse::ok(SubcategoriesResponse {
        category,
        subcategories,
    })
}
