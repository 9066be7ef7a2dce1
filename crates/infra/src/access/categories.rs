use inventorix_core::{CategoryId, UserId};
use inventorix_inventory::{Category, CategoryDraft, CategoryPatch};

use super::{AccessError, AccessResult};
use crate::store::UnitOfWork;

pub async fn list(uow: &mut dyn UnitOfWork, owner: UserId) -> AccessResult<Vec<Category>> {
    Ok(uow.categories(owner).await?)
}

pub async fn create(
    uow: &mut dyn UnitOfWork,
    owner: UserId,
    draft: CategoryDraft,
) -> AccessResult<Category> {
    let new = draft.validate()?;
    Ok(uow.insert_category(owner, new).await?)
}

pub async fn get(uow: &mut dyn UnitOfWork, owner: UserId, id: CategoryId) -> AccessResult<Category> {
    uow.category(owner, id).await?.ok_or(AccessError::NotFound)
}

pub async fn patch(
    uow: &mut dyn UnitOfWork,
    owner: UserId,
    id: CategoryId,
    patch: CategoryPatch,
) -> AccessResult<Category> {
    let current = uow.category_for_update(owner, id).await?.ok_or(AccessError::NotFound)?;
    let updated = current.apply(patch)?;
    uow.update_category(&updated).await?;
    Ok(updated)
}

pub async fn delete(uow: &mut dyn UnitOfWork, owner: UserId, id: CategoryId) -> AccessResult<()> {
    if uow.delete_category(owner, id).await? {
        Ok(())
    } else {
        Err(AccessError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::testing::seed_user;
    use crate::store::{InMemoryStore, Store};

    fn tools() -> CategoryDraft {
        CategoryDraft {
            name: Some("Tools".into()),
            in_stock: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_owner() {
        let store = InMemoryStore::new();
        let user = seed_user(&store, "alice").await;
        let mut uow = store.begin().await.unwrap();
        let category = create(uow.as_mut(), user.id, tools()).await.unwrap();
        assert_eq!(category.user_id, user.id);
        assert!(category.in_stock);
    }

    #[tokio::test]
    async fn other_users_category_is_not_found() {
        let store = InMemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bobby").await;
        let mut uow = store.begin().await.unwrap();
        let category = create(uow.as_mut(), alice.id, tools()).await.unwrap();

        let uow = uow.as_mut();
        assert_eq!(get(uow, bob.id, category.id).await, Err(AccessError::NotFound));
        assert_eq!(
            patch(uow, bob.id, category.id, CategoryPatch::default()).await,
            Err(AccessError::NotFound)
        );
        assert_eq!(delete(uow, bob.id, category.id).await, Err(AccessError::NotFound));
        assert!(list(uow, bob.id).await.unwrap().is_empty());
        assert_eq!(list(uow, alice.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_patch_leaves_row_unchanged() {
        let store = InMemoryStore::new();
        let user = seed_user(&store, "alice").await;
        let mut uow = store.begin().await.unwrap();
        let category = create(uow.as_mut(), user.id, tools()).await.unwrap();

        let res = patch(
            uow.as_mut(),
            user.id,
            category.id,
            CategoryPatch {
                name: Some("".into()),
                in_stock: Some(false),
            },
        )
        .await;
        assert!(matches!(res, Err(AccessError::Validation(_))));
        assert_eq!(get(uow.as_mut(), user.id, category.id).await.unwrap(), category);
    }
}
