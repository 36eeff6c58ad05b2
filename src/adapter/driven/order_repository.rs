use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{
    Money, Order, OrderId, OrderItem, OrderStatus, PaymentMethod, PaymentResult, ProductId,
    SelectedOptions, ShippingAddress, UserId,
};
use crate::domain::port::{OrderRepository, Page, RepositoryError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};

// MySQL関連のインポート
use sqlx::{MySql, Pool, Row};

/// MySQL注文リポジトリ
/// MySQLデータベースを使用して注文を永続化する
pub struct MySqlOrderRepository {
    pool: Pool<MySql>,
}

impl MySqlOrderRepository {
    /// 新しいMySQL注文リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(naive, Utc)
    }

    /// ヘッダー行と明細行から注文集約を再構築する
    fn build_order(
        header: &sqlx::mysql::MySqlRow,
        item_rows: &[sqlx::mysql::MySqlRow],
    ) -> Result<Order, RepositoryError> {
        let order_id = OrderId::from_string(header.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("注文IDの解析に失敗しました: {}", e))
        })?;

        let user_id = UserId::from_string(header.get("user_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("ユーザーIDの解析に失敗しました: {}", e))
        })?;

        let shipping_address = ShippingAddress::new(
            header.get("recipient_name"),
            header.get("phone"),
            header.get("street"),
            header.get("city"),
            header.get("district"),
            header.get("zip_code"),
            header.get("address_note"),
        )
        .map_err(|e| {
            RepositoryError::FetchFailed(format!("配送先住所の構築に失敗しました: {}", e))
        })?;

        let payment_method =
            PaymentMethod::from_string(header.get("payment_method")).map_err(|e| {
                RepositoryError::FetchFailed(format!("支払い方法の解析に失敗しました: {}", e))
            })?;

        // 支払い結果はいずれかのカラムが埋まっていれば記録ありとみなす
        let payment_result = {
            let id: Option<String> = header.get("payment_result_id");
            let status: Option<String> = header.get("payment_result_status");
            let update_time: Option<String> = header.get("payment_result_update_time");
            let email_address: Option<String> = header.get("payment_result_email");
            if id.is_some() || status.is_some() || update_time.is_some() || email_address.is_some()
            {
                Some(PaymentResult {
                    id,
                    status,
                    update_time,
                    email_address,
                })
            } else {
                None
            }
        };

        let status = OrderStatus::from_string(header.get("status")).map_err(|e| {
            RepositoryError::FetchFailed(format!("注文ステータスの解析に失敗しました: {}", e))
        })?;

        let mut items = Vec::with_capacity(item_rows.len());
        for row in item_rows {
            let product_id = ProductId::from_string(row.get("product_id")).map_err(|e| {
                RepositoryError::FetchFailed(format!("商品IDの解析に失敗しました: {}", e))
            })?;

            let unit_price =
                Money::new(row.get("unit_price_amount"), row.get("unit_price_currency")).map_err(
                    |e| RepositoryError::FetchFailed(format!("金額の構築に失敗しました: {}", e)),
                )?;

            let selected_options = SelectedOptions {
                size: row.get("option_size"),
                color: row.get("option_color"),
                weight: row.get("option_weight"),
            };

            let item = OrderItem::new(
                product_id,
                row.get("name"),
                row.get::<u32, _>("quantity"),
                unit_price,
                row.get("image"),
                selected_options,
            )
            .map_err(|e| {
                RepositoryError::FetchFailed(format!("注文明細の再構築に失敗しました: {}", e))
            })?;

            items.push(item);
        }

        Order::reconstruct(
            order_id,
            user_id,
            items,
            shipping_address,
            payment_method,
            payment_result,
            Money::vnd(header.get("items_price")),
            Money::vnd(header.get("tax_price")),
            Money::vnd(header.get("shipping_price")),
            Money::vnd(header.get("total_price")),
            status,
            header.get("is_paid"),
            header
                .get::<Option<NaiveDateTime>, _>("paid_at")
                .map(Self::to_utc),
            header.get("is_delivered"),
            header
                .get::<Option<NaiveDateTime>, _>("delivered_at")
                .map(Self::to_utc),
            header.get("cancel_reason"),
            header.get("tracking_number"),
            Self::to_utc(header.get::<NaiveDateTime, _>("created_at")),
        )
        .map_err(|e| {
            RepositoryError::FetchFailed(format!("注文集約の再構築に失敗しました: {}", e))
        })
    }

    /// 指定された注文の明細行を取得する
    async fn fetch_item_rows(
        &self,
        order_id: &str,
    ) -> Result<Vec<sqlx::mysql::MySqlRow>, RepositoryError> {
        sqlx::query(
            r#"
            SELECT product_id, name, quantity, unit_price_amount, unit_price_currency,
                   image, option_size, option_color, option_weight
            FROM order_items
            WHERE order_id = ?
            ORDER BY position ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("注文明細の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)
    }

    /// ヘッダー行の集合から注文のリストを組み立てる
    async fn build_orders(
        &self,
        headers: Vec<sqlx::mysql::MySqlRow>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut orders = Vec::with_capacity(headers.len());
        for header in &headers {
            let order_id: String = header.get("id");
            let item_rows = self.fetch_item_rows(&order_id).await?;
            orders.push(Self::build_order(header, &item_rows)?);
        }
        Ok(orders)
    }
}

#[async_trait]
impl OrderRepository for MySqlOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
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

        let address = order.shipping_address();

        // 注文データをordersテーブルにUPSERT
        // 明細は不変なので更新対象はステータスと支払い関連のみ
        sqlx::query(
            r#"
            INSERT INTO orders
                (id, user_id, recipient_name, phone, street, city, district, zip_code, address_note,
                 payment_method, payment_result_id, payment_result_status,
                 payment_result_update_time, payment_result_email,
                 items_price, tax_price, shipping_price, total_price,
                 status, is_paid, paid_at, is_delivered, delivered_at,
                 cancel_reason, tracking_number, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                payment_result_id = VALUES(payment_result_id),
                payment_result_status = VALUES(payment_result_status),
                payment_result_update_time = VALUES(payment_result_update_time),
                payment_result_email = VALUES(payment_result_email),
                status = VALUES(status),
                is_paid = VALUES(is_paid),
                paid_at = VALUES(paid_at),
                is_delivered = VALUES(is_delivered),
                delivered_at = VALUES(delivered_at),
                cancel_reason = VALUES(cancel_reason),
                tracking_number = VALUES(tracking_number)
            "#,
        )
        .bind(order.id().to_string())
        .bind(order.user_id().to_string())
        .bind(address.recipient_name())
        .bind(address.phone())
        .bind(address.street())
        .bind(address.city())
        .bind(address.district())
        .bind(address.zip_code())
        .bind(address.note())
        .bind(order.payment_method().to_string())
        .bind(order.payment_result().and_then(|r| r.id.as_deref()))
        .bind(order.payment_result().and_then(|r| r.status.as_deref()))
        .bind(order.payment_result().and_then(|r| r.update_time.as_deref()))
        .bind(order.payment_result().and_then(|r| r.email_address.as_deref()))
        .bind(order.items_price().amount())
        .bind(order.tax_price().amount())
        .bind(order.shipping_price().amount())
        .bind(order.total_price().amount())
        .bind(order.status().to_string())
        .bind(order.is_paid())
        .bind(order.paid_at().map(|t| t.naive_utc()))
        .bind(order.is_delivered())
        .bind(order.delivered_at().map(|t| t.naive_utc()))
        .bind(order.cancel_reason())
        .bind(order.tracking_number())
        .bind(order.created_at().naive_utc())
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("注文の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        // 既存の明細を削除してから入れ直す
        sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(order.id().to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("注文明細の削除に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        for (position, item) in order.items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items
                    (order_id, product_id, name, quantity, unit_price_amount, unit_price_currency,
                     image, option_size, option_color, option_weight, position)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(order.id().to_string())
            .bind(item.product_id().to_string())
            .bind(item.name())
            .bind(item.quantity())
            .bind(item.unit_price().amount())
            .bind(item.unit_price().currency())
            .bind(item.image())
            .bind(item.selected_options().size.as_deref())
            .bind(item.selected_options().color.as_deref())
            .bind(item.selected_options().weight.as_deref())
            .bind(position as u32)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("注文明細の保存に失敗しました: {}", e))
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

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let header = sqlx::query("SELECT * FROM orders WHERE id = ?")
            .bind(order_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("注文の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        let Some(header) = header else {
            return Ok(None);
        };

        let item_rows = self.fetch_item_rows(&order_id.to_string()).await?;
        Ok(Some(Self::build_order(&header, &item_rows)?))
    }

    async fn find_by_user(
        &self,
        user_id: UserId,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Order>, RepositoryError> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM orders WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("注文件数の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?
            .get("total");

        let offset = (page.saturating_sub(1)) * page_size;
        let headers = sqlx::query(
            "SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id.to_string())
        .bind(page_size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("注文一覧の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(Page {
            items: self.build_orders(headers).await?,
            total: total as u64,
        })
    }

    async fn find_page(
        &self,
        status: Option<OrderStatus>,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Order>, RepositoryError> {
        let offset = (page.saturating_sub(1)) * page_size;

        let (total, headers) = match status {
            Some(status) => {
                let total: i64 =
                    sqlx::query("SELECT COUNT(*) AS total FROM orders WHERE status = ?")
                        .bind(status.to_string())
                        .fetch_one(&self.pool)
                        .await
                        .map_err(|e| {
                            DatabaseError::QueryError(format!(
                                "注文件数の取得に失敗しました: {}",
                                e
                            ))
                        })
                        .map_err(RepositoryError::from)?
                        .get("total");

                let headers = sqlx::query(
                    "SELECT * FROM orders WHERE status = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(status.to_string())
                .bind(page_size)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    DatabaseError::QueryError(format!(
                        "ステータス別注文一覧の取得に失敗しました: {}",
                        e
                    ))
                })
                .map_err(RepositoryError::from)?;

                (total, headers)
            }
            None => {
                let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM orders")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| {
                        DatabaseError::QueryError(format!("注文件数の取得に失敗しました: {}", e))
                    })
                    .map_err(RepositoryError::from)?
                    .get("total");

                let headers =
                    sqlx::query("SELECT * FROM orders ORDER BY created_at DESC LIMIT ? OFFSET ?")
                        .bind(page_size)
                        .bind(offset)
                        .fetch_all(&self.pool)
                        .await
                        .map_err(|e| {
                            DatabaseError::QueryError(format!(
                                "注文一覧の取得に失敗しました: {}",
                                e
                            ))
                        })
                        .map_err(RepositoryError::from)?;

                (total, headers)
            }
        };

        Ok(Page {
            items: self.build_orders(headers).await?,
            total: total as u64,
        })
    }

    async fn delete(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        // order_itemsはON DELETE CASCADEで一緒に消える
        sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(order_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("注文の削除に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        Ok(())
    }

    fn next_identity(&self) -> OrderId {
        OrderId::new()
    }
}
