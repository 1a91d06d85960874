/// Category entity
///
/// Categories group habits into life areas ("Health", "Work", ...). A
/// category can only be removed once no habit refers to it.

use serde::{Deserialize, Serialize};
use crate::domain::{CategoryId, DomainError};

const MAX_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

/// Validated name and description for inserting or renaming a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryDraft {
    pub fn new(name: &str, description: Option<String>) -> Result<Self, DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidCategoryName(
                "Category name cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::InvalidCategoryName(
                format!("Category name cannot be longer than {} characters", MAX_NAME_LEN)
            ));
        }

        Ok(Self {
            name: trimmed.to_string(),
            description: description.filter(|d| !d.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_name_is_trimmed() {
        let draft = CategoryDraft::new(" Health ", Some("Body and mind".to_string())).unwrap();
        assert_eq!(draft.name, "Health");
        assert_eq!(draft.description.as_deref(), Some("Body and mind"));
    }

    #[test]
    fn test_empty_category_name_rejected() {
        assert!(CategoryDraft::new("", None).is_err());
        assert!(CategoryDraft::new("   ", None).is_err());
    }
}
