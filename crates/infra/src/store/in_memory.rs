use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use inventorix_auth::{NewUser, User};
use inventorix_core::{CategoryId, Owned, ProductId, UserId, WarehouseId};
use inventorix_inventory::{Category, NewCategory, NewProduct, NewWarehouse, Product, Warehouse};

use super::r#trait::{OwnerCounts, Store, StoreError, StoreResult, UnitOfWork};

#[derive(Debug, Clone, Default)]
struct Sequences {
    user: i64,
    category: i64,
    warehouse: i64,
    product: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    categories: BTreeMap<CategoryId, Category>,
    warehouses: BTreeMap<WarehouseId, Warehouse>,
    products: BTreeMap<ProductId, Product>,
    seq: Sequences,
}

impl Tables {
    fn remove_products_where(&mut self, pred: impl Fn(&Product) -> bool) {
        self.products.retain(|_, p| !pred(p));
    }
}

/// In-memory store.
///
/// Intended for tests/dev. A unit of work holds the single table lock for its
/// whole lifetime, so units of work are fully serialized.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let guard = self.tables.clone().lock_owned().await;
        Ok(Box::new(InMemoryUnitOfWork {
            guard,
            staged: None,
        }))
    }
}

/// Copy-on-write transaction: the first write clones the committed tables,
/// later reads and writes go to the staged copy.
struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    staged: Option<Tables>,
}

impl InMemoryUnitOfWork {
    fn read(&self) -> &Tables {
        self.staged.as_ref().unwrap_or(&*self.guard)
    }

    fn write(&mut self) -> &mut Tables {
        let committed = &self.guard;
        self.staged.get_or_insert_with(|| Tables::clone(committed))
    }
}

fn owned<T: Owned + Clone>(row: Option<&T>, owner: UserId) -> Option<T> {
    row.filter(|r| r.is_owned_by(owner)).cloned()
}

fn missing(kind: &str) -> StoreError {
    StoreError::Backend(format!("{kind} row disappeared during update"))
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn insert_user(&mut self, user: NewUser, created_at: DateTime<Utc>) -> StoreResult<User> {
        let tables = self.write();
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("username already exists".into()));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already exists".into()));
        }

        let id = UserId::new(next(&mut tables.seq.user));
        let row = User {
            id,
            business_name: user.business_name,
            username: user.username,
            email: user.email,
            credential: user.credential,
            created_at,
        };
        tables.users.insert(id, row.clone());
        Ok(row)
    }

    async fn user(&mut self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.read().users.get(&id).cloned())
    }

    async fn user_by_username(&mut self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn delete_user(&mut self, id: UserId) -> StoreResult<bool> {
        if !self.read().users.contains_key(&id) {
            return Ok(false);
        }
        let tables = self.write();
        tables.users.remove(&id);
        tables.categories.retain(|_, c| c.user_id != id);
        tables.warehouses.retain(|_, w| w.user_id != id);
        tables.remove_products_where(|p| p.user_id == id);
        Ok(true)
    }

    async fn categories(&mut self, owner: UserId) -> StoreResult<Vec<Category>> {
        Ok(self
            .read()
            .categories
            .values()
            .filter(|c| c.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn category(&mut self, owner: UserId, id: CategoryId) -> StoreResult<Option<Category>> {
        Ok(owned(self.read().categories.get(&id), owner))
    }

    // The unit of work already holds the store-wide lock.
    async fn category_for_update(&mut self, owner: UserId, id: CategoryId) -> StoreResult<Option<Category>> {
        self.category(owner, id).await
    }

    async fn insert_category(&mut self, owner: UserId, new: NewCategory) -> StoreResult<Category> {
        let tables = self.write();
        let id = CategoryId::new(next(&mut tables.seq.category));
        let row = Category {
            id,
            name: new.name,
            in_stock: new.in_stock,
            user_id: owner,
        };
        tables.categories.insert(id, row.clone());
        Ok(row)
    }

    async fn update_category(&mut self, category: &Category) -> StoreResult<()> {
        let slot = self
            .write()
            .categories
            .get_mut(&category.id)
            .filter(|c| c.user_id == category.user_id)
            .ok_or_else(|| missing("category"))?;
        *slot = category.clone();
        Ok(())
    }

    async fn delete_category(&mut self, owner: UserId, id: CategoryId) -> StoreResult<bool> {
        if owned(self.read().categories.get(&id), owner).is_none() {
            return Ok(false);
        }
        let tables = self.write();
        tables.categories.remove(&id);
        tables.remove_products_where(|p| p.category_id == id);
        Ok(true)
    }

    async fn warehouses(&mut self, owner: UserId) -> StoreResult<Vec<Warehouse>> {
        Ok(self
            .read()
            .warehouses
            .values()
            .filter(|w| w.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn warehouse(&mut self, owner: UserId, id: WarehouseId) -> StoreResult<Option<Warehouse>> {
        Ok(owned(self.read().warehouses.get(&id), owner))
    }

    async fn warehouse_for_update(
        &mut self,
        owner: UserId,
        id: WarehouseId,
    ) -> StoreResult<Option<Warehouse>> {
        self.warehouse(owner, id).await
    }

    async fn insert_warehouse(&mut self, owner: UserId, new: NewWarehouse) -> StoreResult<Warehouse> {
        let tables = self.write();
        let id = WarehouseId::new(next(&mut tables.seq.warehouse));
        let row = Warehouse {
            id,
            name: new.name,
            location: new.location,
            supplier: new.supplier,
            user_id: owner,
        };
        tables.warehouses.insert(id, row.clone());
        Ok(row)
    }

    async fn update_warehouse(&mut self, warehouse: &Warehouse) -> StoreResult<()> {
        let slot = self
            .write()
            .warehouses
            .get_mut(&warehouse.id)
            .filter(|w| w.user_id == warehouse.user_id)
            .ok_or_else(|| missing("warehouse"))?;
        *slot = warehouse.clone();
        Ok(())
    }

    async fn delete_warehouse(&mut self, owner: UserId, id: WarehouseId) -> StoreResult<bool> {
        if owned(self.read().warehouses.get(&id), owner).is_none() {
            return Ok(false);
        }
        let tables = self.write();
        tables.warehouses.remove(&id);
        tables.remove_products_where(|p| p.warehouse_id == id);
        Ok(true)
    }

    async fn products(&mut self, owner: UserId) -> StoreResult<Vec<Product>> {
        Ok(self
            .read()
            .products
            .values()
            .filter(|p| p.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn product(&mut self, owner: UserId, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(owned(self.read().products.get(&id), owner))
    }

    async fn product_for_update(&mut self, owner: UserId, id: ProductId) -> StoreResult<Option<Product>> {
        self.product(owner, id).await
    }

    async fn insert_product(
        &mut self,
        owner: UserId,
        new: NewProduct,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Product> {
        let tables = self.write();
        let id = ProductId::new(next(&mut tables.seq.product));
        let row = Product {
            id,
            name: new.name,
            price: new.price,
            quantity: new.quantity,
            created_at,
            category_id: new.category_id,
            warehouse_id: new.warehouse_id,
            user_id: owner,
        };
        tables.products.insert(id, row.clone());
        Ok(row)
    }

    async fn update_product(&mut self, product: &Product) -> StoreResult<()> {
        let slot = self
            .write()
            .products
            .get_mut(&product.id)
            .filter(|p| p.user_id == product.user_id)
            .ok_or_else(|| missing("product"))?;
        *slot = product.clone();
        Ok(())
    }

    async fn delete_product(&mut self, owner: UserId, id: ProductId) -> StoreResult<bool> {
        if owned(self.read().products.get(&id), owner).is_none() {
            return Ok(false);
        }
        self.write().products.remove(&id);
        Ok(true)
    }

    async fn counts(&mut self, owner: UserId) -> StoreResult<OwnerCounts> {
        let tables = self.read();
        let count = |n: usize| n as i64;
        Ok(OwnerCounts {
            total_products: count(tables.products.values().filter(|p| p.is_owned_by(owner)).count()),
            total_categories: count(tables.categories.values().filter(|c| c.is_owned_by(owner)).count()),
            total_warehouses: count(tables.warehouses.values().filter(|w| w.is_owned_by(owner)).count()),
        })
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let InMemoryUnitOfWork { mut guard, staged } = *self;
        if let Some(staged) = staged {
            *guard = staged;
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventorix_auth::Credential;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            business_name: "Biz".into(),
            username: name.into(),
            email: format!("{name}@example.com"),
            credential: Credential::from_phc("$argon2id$stub"),
        }
    }

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.into(),
            in_stock: true,
        }
    }

    #[tokio::test]
    async fn ids_start_at_one_per_table() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let user = uow.insert_user(new_user("bob123"), Utc::now()).await.unwrap();
        let cat = uow.insert_category(user.id, new_category("Tools")).await.unwrap();
        assert_eq!(user.id, UserId::new(1));
        assert_eq!(cat.id, CategoryId::new(1));
        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn rollback_discards_writes() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.insert_user(new_user("bob123"), Utc::now()).await.unwrap();
        uow.rollback().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        assert!(uow.user(UserId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn dropping_without_commit_discards_writes() {
        let store = InMemoryStore::new();
        {
            let mut uow = store.begin().await.unwrap();
            uow.insert_user(new_user("bob123"), Utc::now()).await.unwrap();
        }
        let mut uow = store.begin().await.unwrap();
        assert!(uow.user_by_username("bob123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_and_email_conflict() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.insert_user(new_user("bob123"), Utc::now()).await.unwrap();

        let err = uow.insert_user(new_user("bob123"), Utc::now()).await.unwrap_err();
        assert_eq!(err, StoreError::Conflict("username already exists".into()));

        let mut same_email = new_user("robert");
        same_email.email = "bob123@example.com".into();
        let err = uow.insert_user(same_email, Utc::now()).await.unwrap_err();
        assert_eq!(err, StoreError::Conflict("email already exists".into()));
    }

    #[tokio::test]
    async fn lookups_are_owner_scoped() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let a = uow.insert_user(new_user("alice"), Utc::now()).await.unwrap();
        let b = uow.insert_user(new_user("bobby"), Utc::now()).await.unwrap();
        let cat = uow.insert_category(a.id, new_category("Tools")).await.unwrap();

        assert!(uow.category(a.id, cat.id).await.unwrap().is_some());
        assert!(uow.category(b.id, cat.id).await.unwrap().is_none());
        assert!(uow.categories(b.id).await.unwrap().is_empty());
        assert!(!uow.delete_category(b.id, cat.id).await.unwrap());
        assert!(uow.category(a.id, cat.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_everything_owned() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let user = uow.insert_user(new_user("alice"), Utc::now()).await.unwrap();
        let cat = uow.insert_category(user.id, new_category("Tools")).await.unwrap();
        let wh = uow
            .insert_warehouse(
                user.id,
                NewWarehouse {
                    name: "Main".into(),
                    location: "Dock".into(),
                    supplier: None,
                },
            )
            .await
            .unwrap();
        uow.insert_product(
            user.id,
            NewProduct {
                name: "Hammer".into(),
                price: 5.0,
                quantity: 1,
                category_id: cat.id,
                warehouse_id: wh.id,
            },
            Utc::now(),
        )
        .await
        .unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        assert!(uow.delete_user(user.id).await.unwrap());
        assert_eq!(uow.counts(user.id).await.unwrap(), OwnerCounts::default());
        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn deleting_category_removes_its_products_only() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let user = uow.insert_user(new_user("alice"), Utc::now()).await.unwrap();
        let tools = uow.insert_category(user.id, new_category("Tools")).await.unwrap();
        let paint = uow.insert_category(user.id, new_category("Paint")).await.unwrap();
        let wh = uow
            .insert_warehouse(
                user.id,
                NewWarehouse {
                    name: "Main".into(),
                    location: "Dock".into(),
                    supplier: None,
                },
            )
            .await
            .unwrap();
        for category_id in [tools.id, paint.id] {
            uow.insert_product(
                user.id,
                NewProduct {
                    name: "Thing".into(),
                    price: 1.0,
                    quantity: 0,
                    category_id,
                    warehouse_id: wh.id,
                },
                Utc::now(),
            )
            .await
            .unwrap();
        }

        assert!(uow.delete_category(user.id, tools.id).await.unwrap());
        let remaining = uow.products(user.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].category_id, paint.id);
    }
}
