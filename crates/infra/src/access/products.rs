//! Product operations. Besides ownership of the product itself, the category
//! and warehouse a product points at must belong to the same user; a reference
//! to another tenant's row is rejected exactly like a reference to a missing one.

use std::collections::HashMap;

use chrono::Utc;

use inventorix_core::{CategoryId, ProductId, UserId, WarehouseId};
use inventorix_inventory::{Product, ProductDraft, ProductPatch};

use super::{AccessError, AccessResult};
use crate::store::UnitOfWork;

/// A product together with the names of the rows it references.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductView {
    pub product: Product,
    pub category: Option<String>,
    pub warehouse: Option<String>,
}

async fn ensure_category(uow: &mut dyn UnitOfWork, owner: UserId, id: CategoryId) -> AccessResult<String> {
    uow.category(owner, id)
        .await?
        .map(|c| c.name)
        .ok_or_else(|| AccessError::Validation(format!("category_id {id} does not exist")))
}

async fn ensure_warehouse(uow: &mut dyn UnitOfWork, owner: UserId, id: WarehouseId) -> AccessResult<String> {
    uow.warehouse(owner, id)
        .await?
        .map(|w| w.name)
        .ok_or_else(|| AccessError::Validation(format!("warehouse_id {id} does not exist")))
}

async fn view(uow: &mut dyn UnitOfWork, owner: UserId, product: Product) -> AccessResult<ProductView> {
    let category = uow.category(owner, product.category_id).await?.map(|c| c.name);
    let warehouse = uow.warehouse(owner, product.warehouse_id).await?.map(|w| w.name);
    Ok(ProductView {
        product,
        category,
        warehouse,
    })
}

pub async fn list(uow: &mut dyn UnitOfWork, owner: UserId) -> AccessResult<Vec<ProductView>> {
    let categories: HashMap<CategoryId, String> = uow
        .categories(owner)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let warehouses: HashMap<WarehouseId, String> = uow
        .warehouses(owner)
        .await?
        .into_iter()
        .map(|w| (w.id, w.name))
        .collect();

    Ok(uow
        .products(owner)
        .await?
        .into_iter()
        .map(|product| ProductView {
            category: categories.get(&product.category_id).cloned(),
            warehouse: warehouses.get(&product.warehouse_id).cloned(),
            product,
        })
        .collect())
}

pub async fn create(
    uow: &mut dyn UnitOfWork,
    owner: UserId,
    draft: ProductDraft,
) -> AccessResult<ProductView> {
    let new = draft.validate()?;
    let category = ensure_category(uow, owner, new.category_id).await?;
    let warehouse = ensure_warehouse(uow, owner, new.warehouse_id).await?;
    let product = uow.insert_product(owner, new, Utc::now()).await?;
    Ok(ProductView {
        product,
        category: Some(category),
        warehouse: Some(warehouse),
    })
}

pub async fn get(uow: &mut dyn UnitOfWork, owner: UserId, id: ProductId) -> AccessResult<ProductView> {
    let product = uow.product(owner, id).await?.ok_or(AccessError::NotFound)?;
    view(uow, owner, product).await
}

/// All-or-nothing: field checks and reference checks all pass before the row is written.
pub async fn patch(
    uow: &mut dyn UnitOfWork,
    owner: UserId,
    id: ProductId,
    patch: ProductPatch,
) -> AccessResult<ProductView> {
    let current = uow.product_for_update(owner, id).await?.ok_or(AccessError::NotFound)?;
    let (category_id, warehouse_id) = patch.references();
    let updated = current.apply(patch)?;
    if let Some(category_id) = category_id {
        ensure_category(uow, owner, category_id).await?;
    }
    if let Some(warehouse_id) = warehouse_id {
        ensure_warehouse(uow, owner, warehouse_id).await?;
    }
    uow.update_product(&updated).await?;
    view(uow, owner, updated).await
}

pub async fn delete(uow: &mut dyn UnitOfWork, owner: UserId, id: ProductId) -> AccessResult<()> {
    if uow.delete_product(owner, id).await? {
        Ok(())
    } else {
        Err(AccessError::NotFound)
    }
}
