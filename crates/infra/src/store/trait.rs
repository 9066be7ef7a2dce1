use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use inventorix_auth::{NewUser, User};
use inventorix_core::{CategoryId, ProductId, UserId, WarehouseId};
use inventorix_inventory::{Category, NewCategory, NewProduct, NewWarehouse, Product, Warehouse};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in a store.
///
/// - **Conflict**: A uniqueness constraint was violated (username/email)
/// - **Backend**: Any other failure of the underlying engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),

    #[error("store error: {0}")]
    Backend(String),
}

/// Per-user row counts.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OwnerCounts {
    pub total_products: i64,
    pub total_categories: i64,
    pub total_warehouses: i64,
}

/// Factory for units of work.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;
}

/// A single atomic transaction over every table.
///
/// ## Tenant isolation
///
/// Every lookup, update and delete of an owned row takes the owning `UserId`
/// and filters on it. A row owned by another user behaves exactly like a
/// missing row (`None` / `false`).
///
/// ## Cascades
///
/// - Deleting a user removes its categories, warehouses and products.
/// - Deleting a category or warehouse removes the products referencing it.
///
/// ## Read-modify-write
///
/// `*_for_update` lookups hold the row until the unit of work ends, so two
/// patches of the same row apply one after the other instead of the later
/// write restoring fields from a stale read.
#[async_trait]
pub trait UnitOfWork: Send {
    // Users
    async fn insert_user(&mut self, user: NewUser, created_at: DateTime<Utc>) -> StoreResult<User>;
    async fn user(&mut self, id: UserId) -> StoreResult<Option<User>>;
    async fn user_by_username(&mut self, username: &str) -> StoreResult<Option<User>>;
    async fn delete_user(&mut self, id: UserId) -> StoreResult<bool>;

    // Categories
    async fn categories(&mut self, owner: UserId) -> StoreResult<Vec<Category>>;
    async fn category(&mut self, owner: UserId, id: CategoryId) -> StoreResult<Option<Category>>;
    async fn category_for_update(&mut self, owner: UserId, id: CategoryId) -> StoreResult<Option<Category>>;
    async fn insert_category(&mut self, owner: UserId, new: NewCategory) -> StoreResult<Category>;
    async fn update_category(&mut self, category: &Category) -> StoreResult<()>;
    async fn delete_category(&mut self, owner: UserId, id: CategoryId) -> StoreResult<bool>;

    // Warehouses
    async fn warehouses(&mut self, owner: UserId) -> StoreResult<Vec<Warehouse>>;
    async fn warehouse(&mut self, owner: UserId, id: WarehouseId) -> StoreResult<Option<Warehouse>>;
    async fn warehouse_for_update(
        &mut self,
        owner: UserId,
        id: WarehouseId,
    ) -> StoreResult<Option<Warehouse>>;
    async fn insert_warehouse(&mut self, owner: UserId, new: NewWarehouse) -> StoreResult<Warehouse>;
    async fn update_warehouse(&mut self, warehouse: &Warehouse) -> StoreResult<()>;
    async fn delete_warehouse(&mut self, owner: UserId, id: WarehouseId) -> StoreResult<bool>;

    // Products
    async fn products(&mut self, owner: UserId) -> StoreResult<Vec<Product>>;
    async fn product(&mut self, owner: UserId, id: ProductId) -> StoreResult<Option<Product>>;
    async fn product_for_update(&mut self, owner: UserId, id: ProductId) -> StoreResult<Option<Product>>;
    async fn insert_product(
        &mut self,
        owner: UserId,
        new: NewProduct,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Product>;
    async fn update_product(&mut self, product: &Product) -> StoreResult<()>;
    async fn delete_product(&mut self, owner: UserId, id: ProductId) -> StoreResult<bool>;

    async fn counts(&mut self, owner: UserId) -> StoreResult<OwnerCounts>;

    /// Publish every write made through this unit of work.
    async fn commit(self: Box<Self>) -> StoreResult<()>;

    /// Discard every write made through this unit of work.
    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}
