use serde::Deserialize;

use inventorix_core::validate::{required, text};
use inventorix_core::{CategoryId, DomainResult, Entity, Owned, UserId};

const NAME_MAX: usize = 50;

/// A product category owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub in_stock: bool,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryDraft {
    pub name: Option<String>,
    pub in_stock: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub in_stock: bool,
}

/// Patchable fields of a category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub in_stock: Option<bool>,
}

impl CategoryDraft {
    pub fn validate(self) -> DomainResult<NewCategory> {
        Ok(NewCategory {
            name: text("name", required("name", self.name)?, NAME_MAX)?,
            in_stock: self.in_stock.unwrap_or(true),
        })
    }
}

impl Category {
    pub fn apply(&self, patch: CategoryPatch) -> DomainResult<Category> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = text("name", name, NAME_MAX)?;
        }
        if let Some(in_stock) = patch.in_stock {
            next.in_stock = in_stock;
        }
        Ok(next)
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

impl Owned for Category {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventorix_core::DomainError;

    fn category() -> Category {
        Category {
            id: CategoryId::new(1),
            name: "Tools".into(),
            in_stock: true,
            user_id: UserId::new(1),
        }
    }

    #[test]
    fn in_stock_defaults_to_true() {
        let new = CategoryDraft {
            name: Some("Tools".into()),
            in_stock: None,
        }
        .validate()
        .unwrap();
        assert!(new.in_stock);
    }

    #[test]
    fn name_is_required_and_bounded() {
        assert_eq!(
            CategoryDraft::default().validate().unwrap_err(),
            DomainError::validation("name is required")
        );
        assert!(
            CategoryDraft {
                name: Some("x".repeat(51)),
                in_stock: None
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn patch_changes_only_supplied_fields() {
        let updated = category()
            .apply(CategoryPatch {
                in_stock: Some(false),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.name, "Tools");
        assert!(!updated.in_stock);
    }

    #[test]
    fn failed_patch_leaves_original_untouched() {
        let original = category();
        let err = original
            .apply(CategoryPatch {
                name: Some("  ".into()),
                in_stock: Some(false),
            })
            .unwrap_err();
        assert_eq!(err, DomainError::validation("name cannot be empty"));
        assert_eq!(original, category());
    }

    #[test]
    fn patch_rejects_unknown_keys() {
        let res = serde_json::from_str::<CategoryPatch>(r#"{"user_id": 2}"#);
        assert!(res.is_err());
    }
}
