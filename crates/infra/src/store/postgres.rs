//! Postgres-backed store.
//!
//! Each unit of work is one SQL transaction. Dropping a unit of work without
//! committing rolls the transaction back.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | Other | N/A | `Backend` |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use inventorix_auth::{Credential, NewUser, User};
use inventorix_core::{CategoryId, ProductId, UserId, WarehouseId};
use inventorix_inventory::{Category, NewCategory, NewProduct, NewWarehouse, Product, Warehouse};

use super::r#trait::{OwnerCounts, Store, StoreError, StoreResult, UnitOfWork};

const SCHEMA: &str = include_str!("../../schema/postgres.sql");

/// Postgres store over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and install the schema if it is not already present.
    #[instrument(skip_all)]
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.install_schema().await?;
        Ok(store)
    }

    pub async fn install_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("install_schema", e))?;
        tracing::info!("database schema installed");
        Ok(())
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Ok(Box::new(PostgresUnitOfWork { tx }))
    }
}

struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: UserId::new(row.try_get("id")?),
        business_name: row.try_get("business_name")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        credential: Credential::from_phc(row.try_get::<String, _>("password_hash")?),
        created_at: row.try_get("created_at")?,
    })
}

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: CategoryId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        in_stock: row.try_get("in_stock")?,
        user_id: UserId::new(row.try_get("user_id")?),
    })
}

fn warehouse_from_row(row: &PgRow) -> Result<Warehouse, sqlx::Error> {
    Ok(Warehouse {
        id: WarehouseId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        supplier: row.try_get("supplier")?,
        user_id: UserId::new(row.try_get("user_id")?),
    })
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        price: row.try_get("price")?,
        quantity: row.try_get("quantity")?,
        created_at: row.try_get("created_at")?,
        category_id: CategoryId::new(row.try_get("category_id")?),
        warehouse_id: WarehouseId::new(row.try_get("warehouse_id")?),
        user_id: UserId::new(row.try_get("user_id")?),
    })
}

fn one<T>(
    operation: &str,
    row: Result<PgRow, sqlx::Error>,
    map: fn(&PgRow) -> Result<T, sqlx::Error>,
) -> StoreResult<T> {
    row.and_then(|r| map(&r)).map_err(|e| map_sqlx_error(operation, e))
}

fn optional<T>(
    operation: &str,
    row: Result<Option<PgRow>, sqlx::Error>,
    map: fn(&PgRow) -> Result<T, sqlx::Error>,
) -> StoreResult<Option<T>> {
    row.and_then(|r| r.as_ref().map(map).transpose())
        .map_err(|e| map_sqlx_error(operation, e))
}

fn many<T>(
    operation: &str,
    rows: Result<Vec<PgRow>, sqlx::Error>,
    map: fn(&PgRow) -> Result<T, sqlx::Error>,
) -> StoreResult<Vec<T>> {
    rows.and_then(|rs| rs.iter().map(map).collect())
        .map_err(|e| map_sqlx_error(operation, e))
}

fn expect_one_row(operation: &str, affected: Result<u64, sqlx::Error>) -> StoreResult<()> {
    match affected.map_err(|e| map_sqlx_error(operation, e))? {
        1 => Ok(()),
        n => Err(StoreError::Backend(format!(
            "{operation}: expected 1 affected row, got {n}"
        ))),
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    #[instrument(skip_all, fields(username = %user.username))]
    async fn insert_user(&mut self, user: NewUser, created_at: DateTime<Utc>) -> StoreResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (business_name, username, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, business_name, username, email, password_hash, created_at
            "#,
        )
        .bind(&user.business_name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.credential.as_phc())
        .bind(created_at)
        .fetch_one(&mut *self.tx)
        .await;
        one("insert_user", row, user_from_row)
    }

    async fn user(&mut self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, business_name, username, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&mut *self.tx)
        .await;
        optional("get_user", row, user_from_row)
    }

    async fn user_by_username(&mut self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, business_name, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&mut *self.tx)
        .await;
        optional("get_user_by_username", row, user_from_row)
    }

    async fn delete_user(&mut self, id: UserId) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.get())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;
        Ok(res.rows_affected() > 0)
    }

    async fn categories(&mut self, owner: UserId) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, name, in_stock, user_id FROM categories WHERE user_id = $1 ORDER BY id",
        )
        .bind(owner.get())
        .fetch_all(&mut *self.tx)
        .await;
        many("list_categories", rows, category_from_row)
    }

    async fn category(&mut self, owner: UserId, id: CategoryId) -> StoreResult<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, name, in_stock, user_id FROM categories WHERE id = $1 AND user_id = $2",
        )
        .bind(id.get())
        .bind(owner.get())
        .fetch_optional(&mut *self.tx)
        .await;
        optional("get_category", row, category_from_row)
    }

    async fn category_for_update(&mut self, owner: UserId, id: CategoryId) -> StoreResult<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, in_stock, user_id
            FROM categories
            WHERE id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(id.get())
        .bind(owner.get())
        .fetch_optional(&mut *self.tx)
        .await;
        optional("lock_category", row, category_from_row)
    }

    async fn insert_category(&mut self, owner: UserId, new: NewCategory) -> StoreResult<Category> {
        let row = sqlx::query(
            r#"
            INSERT INTO categories (name, in_stock, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, in_stock, user_id
            "#,
        )
        .bind(&new.name)
        .bind(new.in_stock)
        .bind(owner.get())
        .fetch_one(&mut *self.tx)
        .await;
        one("insert_category", row, category_from_row)
    }

    async fn update_category(&mut self, category: &Category) -> StoreResult<()> {
        let res = sqlx::query(
            "UPDATE categories SET name = $1, in_stock = $2 WHERE id = $3 AND user_id = $4",
        )
        .bind(&category.name)
        .bind(category.in_stock)
        .bind(category.id.get())
        .bind(category.user_id.get())
        .execute(&mut *self.tx)
        .await;
        expect_one_row("update_category", res.map(|r| r.rows_affected()))
    }

    async fn delete_category(&mut self, owner: UserId, id: CategoryId) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
            .bind(id.get())
            .bind(owner.get())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_category", e))?;
        Ok(res.rows_affected() > 0)
    }

    async fn warehouses(&mut self, owner: UserId) -> StoreResult<Vec<Warehouse>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, location, supplier, user_id
            FROM warehouses
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner.get())
        .fetch_all(&mut *self.tx)
        .await;
        many("list_warehouses", rows, warehouse_from_row)
    }

    async fn warehouse(&mut self, owner: UserId, id: WarehouseId) -> StoreResult<Option<Warehouse>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, location, supplier, user_id
            FROM warehouses
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id.get())
        .bind(owner.get())
        .fetch_optional(&mut *self.tx)
        .await;
        optional("get_warehouse", row, warehouse_from_row)
    }

    async fn warehouse_for_update(
        &mut self,
        owner: UserId,
        id: WarehouseId,
    ) -> StoreResult<Option<Warehouse>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, location, supplier, user_id
            FROM warehouses
            WHERE id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(id.get())
        .bind(owner.get())
        .fetch_optional(&mut *self.tx)
        .await;
        optional("lock_warehouse", row, warehouse_from_row)
    }

    async fn insert_warehouse(&mut self, owner: UserId, new: NewWarehouse) -> StoreResult<Warehouse> {
        let row = sqlx::query(
            r#"
            INSERT INTO warehouses (name, location, supplier, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, location, supplier, user_id
            "#,
        )
        .bind(&new.name)
        .bind(&new.location)
        .bind(&new.supplier)
        .bind(owner.get())
        .fetch_one(&mut *self.tx)
        .await;
        one("insert_warehouse", row, warehouse_from_row)
    }

    async fn update_warehouse(&mut self, warehouse: &Warehouse) -> StoreResult<()> {
        let res = sqlx::query(
            r#"
            UPDATE warehouses
            SET name = $1, location = $2, supplier = $3
            WHERE id = $4 AND user_id = $5
            "#,
        )
        .bind(&warehouse.name)
        .bind(&warehouse.location)
        .bind(&warehouse.supplier)
        .bind(warehouse.id.get())
        .bind(warehouse.user_id.get())
        .execute(&mut *self.tx)
        .await;
        expect_one_row("update_warehouse", res.map(|r| r.rows_affected()))
    }

    async fn delete_warehouse(&mut self, owner: UserId, id: WarehouseId) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM warehouses WHERE id = $1 AND user_id = $2")
            .bind(id.get())
            .bind(owner.get())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_warehouse", e))?;
        Ok(res.rows_affected() > 0)
    }

    async fn products(&mut self, owner: UserId) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, price, quantity, created_at, category_id, warehouse_id, user_id
            FROM products
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner.get())
        .fetch_all(&mut *self.tx)
        .await;
        many("list_products", rows, product_from_row)
    }

    async fn product(&mut self, owner: UserId, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price, quantity, created_at, category_id, warehouse_id, user_id
            FROM products
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id.get())
        .bind(owner.get())
        .fetch_optional(&mut *self.tx)
        .await;
        optional("get_product", row, product_from_row)
    }

    async fn product_for_update(&mut self, owner: UserId, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price, quantity, created_at, category_id, warehouse_id, user_id
            FROM products
            WHERE id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(id.get())
        .bind(owner.get())
        .fetch_optional(&mut *self.tx)
        .await;
        optional("lock_product", row, product_from_row)
    }

    async fn insert_product(
        &mut self,
        owner: UserId,
        new: NewProduct,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Product> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (name, price, quantity, created_at, category_id, warehouse_id, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, price, quantity, created_at, category_id, warehouse_id, user_id
            "#,
        )
        .bind(&new.name)
        .bind(new.price)
        .bind(new.quantity)
        .bind(created_at)
        .bind(new.category_id.get())
        .bind(new.warehouse_id.get())
        .bind(owner.get())
        .fetch_one(&mut *self.tx)
        .await;
        one("insert_product", row, product_from_row)
    }

    async fn update_product(&mut self, product: &Product) -> StoreResult<()> {
        let res = sqlx::query(
            r#"
            UPDATE products
            SET name = $1, price = $2, quantity = $3, category_id = $4, warehouse_id = $5
            WHERE id = $6 AND user_id = $7
            "#,
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(product.quantity)
        .bind(product.category_id.get())
        .bind(product.warehouse_id.get())
        .bind(product.id.get())
        .bind(product.user_id.get())
        .execute(&mut *self.tx)
        .await;
        expect_one_row("update_product", res.map(|r| r.rows_affected()))
    }

    async fn delete_product(&mut self, owner: UserId, id: ProductId) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM products WHERE id = $1 AND user_id = $2")
            .bind(id.get())
            .bind(owner.get())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        Ok(res.rows_affected() > 0)
    }

    async fn counts(&mut self, owner: UserId) -> StoreResult<OwnerCounts> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products   WHERE user_id = $1) AS total_products,
                (SELECT COUNT(*) FROM categories WHERE user_id = $1) AS total_categories,
                (SELECT COUNT(*) FROM warehouses WHERE user_id = $1) AS total_warehouses
            "#,
        )
        .bind(owner.get())
        .fetch_one(&mut *self.tx)
        .await;
        one("count_owned", row, |r| {
            Ok(OwnerCounts {
                total_products: r.try_get("total_products")?,
                total_categories: r.try_get("total_categories")?,
                total_warehouses: r.try_get("total_warehouses")?,
            })
        })
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))
    }
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                let what = match db_err.constraint() {
                    Some(c) if c.contains("username") => "username already exists".to_string(),
                    Some(c) if c.contains("email") => "email already exists".to_string(),
                    _ => db_err.message().to_string(),
                };
                return StoreError::Conflict(what);
            }
            StoreError::Backend(format!(
                "database error in {}: {}",
                operation,
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
