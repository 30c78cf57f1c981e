//! `SQLite` implementation of the `CatalogRepository` trait.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use pricewatch_core::domain::{NewProduct, NewRetailer, Product, ProductId, Retailer, RetailerId};
use pricewatch_core::ports::{CatalogRepository, RepositoryError};

use super::row_mappers::{
    PRODUCT_SELECT_COLUMNS, ProductRow, RETAILER_SELECT_COLUMNS, RetailerRow, contains_pattern,
    map_sqlx_error,
};

/// `SQLite` implementation of the catalog repository.
pub struct SqliteCatalogRepository {
    pool: SqlitePool,
}

impl SqliteCatalogRepository {
    /// Create a new `SQLite` catalog repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    async fn get_product(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_SELECT_COLUMNS} FROM products WHERE id = ?");
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(Product::from)
            .ok_or_else(|| RepositoryError::NotFound(format!("Product with id {id}")))
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql =
            format!("SELECT {PRODUCT_SELECT_COLUMNS} FROM products ORDER BY name COLLATE NOCASE, id");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            r"SELECT {PRODUCT_SELECT_COLUMNS} FROM products
              WHERE name LIKE ?1 ESCAPE '\' OR code LIKE ?1 ESCAPE '\'
              ORDER BY name COLLATE NOCASE, id"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(contains_pattern(query))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO products (name, search_name, code, image, url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.name)
        .bind(&product.search_name)
        .bind(&product.code)
        .bind(&product.image)
        .bind(&product.url)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        self.get_product(result.last_insert_rowid()).await
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?, search_name = ?, code = ?, image = ?, url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.search_name)
        .bind(&product.code)
        .bind(&product.image)
        .bind(&product.url)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Product with id {id}")));
        }
        self.get_product(id).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Product with id {id}")));
        }
        Ok(())
    }

    async fn list_retailers(&self) -> Result<Vec<Retailer>, RepositoryError> {
        let sql = format!("SELECT {RETAILER_SELECT_COLUMNS} FROM retailers ORDER BY id");
        let rows = sqlx::query_as::<_, RetailerRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Retailer::from).collect())
    }

    async fn get_retailer(&self, id: RetailerId) -> Result<Retailer, RepositoryError> {
        let sql = format!("SELECT {RETAILER_SELECT_COLUMNS} FROM retailers WHERE id = ?");
        sqlx::query_as::<_, RetailerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(Retailer::from)
            .ok_or_else(|| RepositoryError::NotFound(format!("Retailer with id {id}")))
    }

    async fn insert_retailer(&self, retailer: &NewRetailer) -> Result<Retailer, RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO retailers (name, logo, url, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&retailer.name)
        .bind(&retailer.logo)
        .bind(&retailer.url)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match map_sqlx_error(e) {
            RepositoryError::AlreadyExists(_) => {
                RepositoryError::AlreadyExists(format!("Retailer '{}'", retailer.name))
            }
            other => other,
        })?;

        self.get_retailer(result.last_insert_rowid()).await
    }
}
