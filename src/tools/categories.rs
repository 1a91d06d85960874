/// Tools for managing categories
///
/// This module implements the category_list, category_create,
/// category_update and category_delete MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{Category, CategoryDraft, CategoryId};
use crate::storage::{HabitStorage, StorageError};
use crate::tools::NoParams;

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub linked_habits: u32,
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategorySummary>,
    pub message: String,
}

/// All categories with the number of habits in each
pub fn list_categories<S: HabitStorage>(
    storage: &S,
    _params: NoParams,
) -> Result<CategoryListResponse, StorageError> {
    let categories = storage
        .list_categories()?
        .into_iter()
        .map(|c| {
            Ok(CategorySummary {
                linked_habits: storage.count_linked_habits(c.id)?,
                category_id: c.id,
                name: c.name,
                description: c.description,
            })
        })
        .collect::<Result<Vec<_>, StorageError>>()?;

    let message = if categories.is_empty() {
        "No categories yet. Create one with category_create.".to_string()
    } else {
        categories
            .iter()
            .map(|c| {
                format!(
                    "🏷️ {} (#{}): {} habit(s){}",
                    c.name,
                    c.category_id,
                    c.linked_habits,
                    c.description.as_deref().map(|d| format!(" - {}", d)).unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    Ok(CategoryListResponse { categories, message })
}

/// Parameters for creating a category
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateCategoryParams {
    /// Unique category name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub success: bool,
    pub category: Category,
    pub message: String,
}

pub fn create_category<S: HabitStorage>(
    storage: &S,
    params: CreateCategoryParams,
) -> Result<CategoryResponse, StorageError> {
    let draft = CategoryDraft::new(&params.name, params.description)?;
    let category = storage.add_category(&draft)?;

    Ok(CategoryResponse {
        success: true,
        message: format!("✅ Created category '{}'", category.name),
        category,
    })
}

/// Parameters for renaming or re-describing a category
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateCategoryParams {
    /// ID of the category to change
    pub category_id: CategoryId,
    /// New name (unchanged if omitted)
    pub name: Option<String>,
    /// New description (unchanged if omitted)
    pub description: Option<String>,
}

pub fn update_category<S: HabitStorage>(
    storage: &S,
    params: UpdateCategoryParams,
) -> Result<CategoryResponse, StorageError> {
    let current = storage.get_category(params.category_id)?;

    let name = params.name.unwrap_or(current.name);
    let draft = CategoryDraft::new(&name, params.description.or(current.description))?;
    let category = storage.modify_category(params.category_id, &draft)?;

    Ok(CategoryResponse {
        success: true,
        message: format!("✅ Updated category '{}'", category.name),
        category,
    })
}

/// Parameters for deleting a category
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteCategoryParams {
    /// ID of the category to delete
    pub category_id: CategoryId,
}

#[derive(Debug, Serialize)]
pub struct DeleteCategoryResponse {
    pub success: bool,
    /// Habits still filed under the category when deletion was refused
    pub linked_habits: u32,
    pub message: String,
}

/// Delete a category
///
/// A category that still has habits is not deleted; the response then
/// carries `success: false` and a warning instead of an error.
pub fn delete_category<S: HabitStorage>(
    storage: &S,
    params: DeleteCategoryParams,
) -> Result<DeleteCategoryResponse, StorageError> {
    match storage.delete_category(params.category_id) {
        Ok(category) => Ok(DeleteCategoryResponse {
            success: true,
            linked_habits: 0,
            message: format!("🗑️ Deleted category '{}'", category.name),
        }),
        Err(StorageError::CategoryInUse { linked_habits, .. }) => Ok(DeleteCategoryResponse {
            success: false,
            linked_habits,
            message: format!(
                "⚠️ You still have {} habit(s) in this category. Move or delete them before deleting it.",
                linked_habits
            ),
        }),
        Err(e) => Err(e),
    }
}
