use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{
    Cart, CartId, CartItem, CartItemId, Money, ProductId, SelectedOptions, UserId,
};
use crate::domain::port::{CartRepository, RepositoryError};
use async_trait::async_trait;

// MySQL関連のインポート
use sqlx::{MySql, Pool, Row};

/// MySQLカートリポジトリ
/// MySQLデータベースを使用してカートを永続化する
#[derive(Clone)]
pub struct MySqlCartRepository {
    pool: Pool<MySql>,
}

impl MySqlCartRepository {
    /// 新しいMySQLカートリポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// データベースの行からカート明細を再構築する
    fn build_item(row: &sqlx::mysql::MySqlRow) -> Result<CartItem, RepositoryError> {
        let item_id = CartItemId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("明細IDの解析に失敗しました: {}", e))
        })?;

        let product_id = ProductId::from_string(row.get("product_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("商品IDの解析に失敗しました: {}", e))
        })?;

        let unit_price = Money::new(row.get("unit_price_amount"), row.get("unit_price_currency"))
            .map_err(|e| {
                RepositoryError::FetchFailed(format!("金額の構築に失敗しました: {}", e))
            })?;

        let selected_options = SelectedOptions {
            size: row.get("option_size"),
            color: row.get("option_color"),
            weight: row.get("option_weight"),
        };

        CartItem::new(
            item_id,
            product_id,
            row.get::<u32, _>("quantity"),
            unit_price,
            selected_options,
        )
        .map_err(|e| {
            RepositoryError::FetchFailed(format!("カート明細の再構築に失敗しました: {}", e))
        })
    }
}

#[async_trait]
impl CartRepository for MySqlCartRepository {
    async fn save(&self, cart: &Cart) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| {
                DatabaseError::ConnectionError(format!(
                    "トランザクション開始に失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)?;

        // カートデータをcartsテーブルにUPSERT
        sqlx::query(
            r#"
            INSERT INTO carts (id, user_id, total_items, total_amount)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                total_items = VALUES(total_items),
                total_amount = VALUES(total_amount)
            "#,
        )
        .bind(cart.id().to_string())
        .bind(cart.user_id().to_string())
        .bind(cart.total_items())
        .bind(cart.total_amount().amount())
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("カートの保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        // 既存の明細を削除
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart.id().to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("カート明細の削除に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        // 明細データをcart_itemsテーブルにINSERT
        // 明細の並び順を保つためpositionを採番する
        for (position, item) in cart.items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cart_items
                    (id, cart_id, product_id, quantity, unit_price_amount, unit_price_currency,
                     option_size, option_color, option_weight, position)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(item.id().to_string())
            .bind(cart.id().to_string())
            .bind(item.product_id().to_string())
            .bind(item.quantity())
            .bind(item.unit_price().amount())
            .bind(item.unit_price().currency())
            .bind(item.selected_options().size.as_deref())
            .bind(item.selected_options().color.as_deref())
            .bind(item.selected_options().weight.as_deref())
            .bind(position as u32)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("カート明細の保存に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;
        }

        // トランザクションをコミット
        tx.commit()
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!(
                    "トランザクションのコミットに失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let cart_row = sqlx::query("SELECT id FROM carts WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("カートの取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        let Some(cart_row) = cart_row else {
            return Ok(None);
        };

        let cart_id = CartId::from_string(cart_row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("カートIDの解析に失敗しました: {}", e))
        })?;

        let item_rows = sqlx::query(
            r#"
            SELECT id, product_id, quantity, unit_price_amount, unit_price_currency,
                   option_size, option_color, option_weight
            FROM cart_items
            WHERE cart_id = ?
            ORDER BY position ASC
            "#,
        )
        .bind(cart_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("カート明細の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        let mut items = Vec::with_capacity(item_rows.len());
        for row in &item_rows {
            items.push(Self::build_item(row)?);
        }

        Ok(Some(Cart::reconstruct(cart_id, user_id, items)))
    }

    fn next_identity(&self) -> CartId {
        CartId::new()
    }
}
