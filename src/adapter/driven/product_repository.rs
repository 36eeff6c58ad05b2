use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{Money, Product, ProductId, ProductSpecs};
use crate::domain::port::{ProductRepository, RepositoryError};
use async_trait::async_trait;

// MySQL関連のインポート
use sqlx::{MySql, Pool, Row};

/// MySQL商品リポジトリ
/// MySQLデータベースを使用して商品と在庫を永続化する
#[derive(Clone)]
pub struct MySqlProductRepository {
    pool: Pool<MySql>,
}

impl MySqlProductRepository {
    /// 新しいMySQL商品リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// データベースの行から商品を再構築する
    fn build_product(row: &sqlx::mysql::MySqlRow) -> Result<Product, RepositoryError> {
        let product_id = ProductId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("商品IDの解析に失敗しました: {}", e))
        })?;

        let price = Money::new(row.get("price_amount"), row.get("price_currency"))
            .map_err(|e| RepositoryError::FetchFailed(format!("金額の構築に失敗しました: {}", e)))?;

        // スペックはJSONカラムに保存されている（NULLはスペックなし）
        let specifications = row
            .get::<Option<String>, _>("specifications")
            .map(|json| serde_json::from_str::<ProductSpecs>(&json))
            .transpose()
            .map_err(|e| {
                RepositoryError::FetchFailed(format!("商品スペックの解析に失敗しました: {}", e))
            })?;

        Product::new(
            product_id,
            row.get("name"),
            price,
            row.get::<u32, _>("stock"),
            row.get("is_active"),
            row.get("main_image"),
            specifications,
        )
        .map_err(|e| RepositoryError::FetchFailed(format!("商品の再構築に失敗しました: {}", e)))
    }
}

#[async_trait]
impl ProductRepository for MySqlProductRepository {
    async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        let specifications = product
            .specifications()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| {
                RepositoryError::OperationFailed(format!(
                    "商品スペックのシリアライズに失敗しました: {}",
                    e
                ))
            })?;

        // 商品データをproductsテーブルにUPSERT
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price_amount, price_currency, stock, is_active, main_image, specifications)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                name = VALUES(name),
                price_amount = VALUES(price_amount),
                price_currency = VALUES(price_currency),
                stock = VALUES(stock),
                is_active = VALUES(is_active),
                main_image = VALUES(main_image),
                specifications = VALUES(specifications)
            "#,
        )
        .bind(product.id().to_string())
        .bind(product.name())
        .bind(product.price().amount())
        .bind(product.price().currency())
        .bind(product.stock())
        .bind(product.is_active())
        .bind(product.main_image())
        .bind(specifications)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("商品の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, product_id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price_amount, price_currency, stock, is_active, main_image, specifications
            FROM products
            WHERE id = ?
            "#,
        )
        .bind(product_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("商品の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(Self::build_product(&row)?)),
            None => Ok(None),
        }
    }

    async fn decrement_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        // チェックと減算を1文で行う条件付きUPDATE。
        // 別々のread-then-writeにすると同時注文の割り込みで
        // 最後の1個を二重に売ってしまう
        let result = sqlx::query(
            "UPDATE products SET stock = stock - ? WHERE id = ? AND stock >= ?",
        )
        .bind(quantity)
        .bind(product_id.to_string())
        .bind(quantity)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("在庫の減算に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(result.rows_affected() == 1)
    }

    async fn increment_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE products SET stock = stock + ? WHERE id = ?")
            .bind(quantity)
            .bind(product_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("在庫の返却に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::OperationFailed(format!(
                "在庫を返却する商品が見つかりません: {}",
                product_id
            )));
        }

        Ok(())
    }
}
