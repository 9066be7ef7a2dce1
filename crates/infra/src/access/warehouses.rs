use inventorix_core::{UserId, WarehouseId};
use inventorix_inventory::{Warehouse, WarehouseDraft, WarehousePatch};

use super::{AccessError, AccessResult};
use crate::store::UnitOfWork;

pub async fn list(uow: &mut dyn UnitOfWork, owner: UserId) -> AccessResult<Vec<Warehouse>> {
    Ok(uow.warehouses(owner).await?)
}

pub async fn create(
    uow: &mut dyn UnitOfWork,
    owner: UserId,
    draft: WarehouseDraft,
) -> AccessResult<Warehouse> {
    let new = draft.validate()?;
    Ok(uow.insert_warehouse(owner, new).await?)
}

pub async fn get(uow: &mut dyn UnitOfWork, owner: UserId, id: WarehouseId) -> AccessResult<Warehouse> {
    uow.warehouse(owner, id).await?.ok_or(AccessError::NotFound)
}

pub async fn patch(
    uow: &mut dyn UnitOfWork,
    owner: UserId,
    id: WarehouseId,
    patch: WarehousePatch,
) -> AccessResult<Warehouse> {
    let current = uow.warehouse_for_update(owner, id).await?.ok_or(AccessError::NotFound)?;
    let updated = current.apply(patch)?;
    uow.update_warehouse(&updated).await?;
    Ok(updated)
}

pub async fn delete(uow: &mut dyn UnitOfWork, owner: UserId, id: WarehouseId) -> AccessResult<()> {
    if uow.delete_warehouse(owner, id).await? {
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

    fn main_dock() -> WarehouseDraft {
        WarehouseDraft {
            name: Some("Main".into()),
            location: Some("Dock 4".into()),
            supplier: Some("Acme".into()),
        }
    }

    #[tokio::test]
    async fn create_then_patch_supplier() {
        let store = InMemoryStore::new();
        let user = seed_user(&store, "alice").await;
        let mut uow = store.begin().await.unwrap();
        let warehouse = create(uow.as_mut(), user.id, main_dock()).await.unwrap();
        assert_eq!(warehouse.supplier.as_deref(), Some("Acme"));

        let updated = patch(
            uow.as_mut(),
            user.id,
            warehouse.id,
            WarehousePatch {
                supplier: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.supplier, None);
        assert_eq!(updated.location, "Dock 4");
    }

    #[tokio::test]
    async fn missing_location_is_a_validation_error() {
        let store = InMemoryStore::new();
        let user = seed_user(&store, "alice").await;
        let mut uow = store.begin().await.unwrap();
        let res = create(
            uow.as_mut(),
            user.id,
            WarehouseDraft {
                location: None,
                ..main_dock()
            },
        )
        .await;
        assert_eq!(res, Err(AccessError::Validation("location is required".into())));
        assert!(list(uow.as_mut(), user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cross_tenant_delete_is_not_found() {
        let store = InMemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bobby").await;
        let mut uow = store.begin().await.unwrap();
        let warehouse = create(uow.as_mut(), alice.id, main_dock()).await.unwrap();

        assert_eq!(delete(uow.as_mut(), bob.id, warehouse.id).await, Err(AccessError::NotFound));
        assert!(get(uow.as_mut(), alice.id, warehouse.id).await.is_ok());
        assert_eq!(delete(uow.as_mut(), alice.id, warehouse.id).await, Ok(()));
        assert_eq!(get(uow.as_mut(), alice.id, warehouse.id).await, Err(AccessError::NotFound));
    }
}
