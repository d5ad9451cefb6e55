//! Postgres-backed document collections.
//!
//! Each collection is a table of `(id UUID, document JSONB)` rows. The product
//! collection carries a unique expression index on `document->>'code'`, which
//! is the source of truth for code uniqueness.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Domain(DuplicateCode)` |
//! | Database (other) | Any other | `Connection` |
//! | PoolClosed / Io / Tls / Other | N/A | `Connection` |
//! | JSON decode of `document` | N/A | `Decode` |

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use shopfront_carts::Cart;
use shopfront_core::{CartId, DomainError, ProductId};
use shopfront_products::{NewProduct, Product};

use super::{CartMutation, CartRepository, ProductRepository, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id         UUID PRIMARY KEY,
        document   JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS products_code_key
        ON products ((document->>'code'))
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS carts (
        id         UUID PRIMARY KEY,
        document   JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

/// Postgres document store holding the `products` and `carts` collections.
///
/// Cloning is cheap: the pool is reference-counted internally.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `url` and make sure the collections exist.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the collection tables and indexes if they are missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for PostgresDocumentStore {
    #[instrument(skip(self, product), fields(code = %product.code()), err)]
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        let id = ProductId::new();
        let document =
            serde_json::to_value(&product).map_err(|e| StoreError::Decode(e.to_string()))?;

        let result = sqlx::query("INSERT INTO products (id, document) VALUES ($1, $2)")
            .bind(id.as_uuid())
            .bind(document)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(product.into_product(id)),
            Err(e) if is_unique_violation(&e) => {
                Err(DomainError::duplicate_code(product.code()).into())
            }
            Err(e) => Err(map_sqlx_error("insert_product", e)),
        }
    }

    #[instrument(skip(self), err)]
    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT id, document FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_code(&self, code: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT id, document FROM products WHERE document->>'code' = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product_by_code", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query("SELECT id, document FROM products ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn remove(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_product", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CartRepository for PostgresDocumentStore {
    #[instrument(skip(self), err)]
    async fn create(&self) -> Result<Cart, StoreError> {
        let cart = Cart::empty(CartId::new());
        let document = serde_json::to_value(&cart).map_err(|e| StoreError::Decode(e.to_string()))?;

        sqlx::query("INSERT INTO carts (id, document) VALUES ($1, $2)")
            .bind(cart.id_typed().as_uuid())
            .bind(document)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_cart", e))?;

        Ok(cart)
    }

    #[instrument(skip(self), err)]
    async fn find(&self, id: CartId) -> Result<Option<Cart>, StoreError> {
        let row = sqlx::query("SELECT document FROM carts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_cart", e))?;

        row.as_ref().map(cart_from_row).transpose()
    }

    /// Row-locks the cart (`SELECT ... FOR UPDATE`) for the whole
    /// read-modify-write, inside one transaction.
    #[instrument(skip(self, mutation), err)]
    async fn update(&self, id: CartId, mutation: CartMutation) -> Result<Cart, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update_cart", e))?;

        let row = sqlx::query("SELECT document FROM carts WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_cart", e))?;

        let Some(row) = row else {
            return Err(DomainError::not_found(format!("cart {id}")).into());
        };
        let mut cart = cart_from_row(&row)?;
        mutation(&mut cart)?;

        let document = serde_json::to_value(&cart).map_err(|e| StoreError::Decode(e.to_string()))?;
        sqlx::query("UPDATE carts SET document = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(document)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_cart", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("update_cart", e))?;
        Ok(cart)
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let id: Uuid = row.try_get("id").map_err(|e| StoreError::Decode(e.to_string()))?;
    let document: serde_json::Value = row
        .try_get("document")
        .map_err(|e| StoreError::Decode(e.to_string()))?;
    let product: NewProduct =
        serde_json::from_value(document).map_err(|e| StoreError::Decode(e.to_string()))?;
    Ok(product.into_product(ProductId::from_uuid(id)))
}

fn cart_from_row(row: &PgRow) -> Result<Cart, StoreError> {
    let document: serde_json::Value = row
        .try_get("document")
        .map_err(|e| StoreError::Decode(e.to_string()))?;
    serde_json::from_value(document).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Check if an error is a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Connection(format!(
            "database error in {}: {}",
            operation,
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            StoreError::Connection(format!("connection pool closed in {}", operation))
        }
        other => StoreError::Connection(format!("sqlx error in {}: {}", operation, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_database_errors_can_be_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::PoolClosed));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn driver_failures_map_to_connection_errors() {
        let err = map_sqlx_error("list_products", sqlx::Error::PoolClosed);
        assert!(matches!(&err, StoreError::Connection(m) if m == "connection pool closed in list_products"));

        let err = map_sqlx_error("find_cart", sqlx::Error::RowNotFound);
        assert!(matches!(&err, StoreError::Connection(m) if m.starts_with("sqlx error in find_cart")));
        assert!(err.domain().is_none());
    }
}
