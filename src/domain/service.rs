// ドメインサービス
// 複数の集約にまたがるビジネスロジックを実装

use crate::domain::error::DomainError;
use crate::domain::model::{CartItem, OrderItem, Product, ProductId};
use crate::domain::port::ProductRepository;
use std::sync::Arc;

/// 在庫に対する要求（商品IDと数量の組）
/// カート明細からも注文明細からも作れる
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl From<&CartItem> for StockLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id(),
            quantity: item.quantity(),
        }
    }
}

impl From<&OrderItem> for StockLine {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id(),
            quantity: item.quantity(),
        }
    }
}

/// 在庫サービス（在庫ゲート）
/// 商品在庫に対する検証・引当・返却の境界。
/// 在庫はこのシステムで唯一、ユーザー間で競合する共有リソースであり、
/// すべての変更はここを通る
pub struct InventoryService {
    product_repository: Arc<dyn ProductRepository>,
}

impl InventoryService {
    /// 新しい在庫サービスを作成
    ///
    /// # Arguments
    /// * `product_repository` - 商品リポジトリ
    pub fn new(product_repository: Arc<dyn ProductRepository>) -> Self {
        Self { product_repository }
    }

    /// すべての明細について在庫を検証する
    /// 呼び出し時点の最新の在庫を読み直す（キャッシュ済みスナップショットを
    /// 信用すると、古い在庫情報に対して注文を通してしまうため）。
    /// 成功時は検証済みの商品を明細と同じ順序で返す
    ///
    /// # Returns
    /// * `Ok(Vec<Product>)` - 全明細が充足可能
    /// * `Err(DomainError::ProductUnavailable)` - 商品が存在しない、または販売停止
    /// * `Err(DomainError::OutOfStock)` - 在庫不足
    pub async fn validate(&self, lines: &[StockLine]) -> Result<Vec<Product>, DomainError> {
        let mut products = Vec::with_capacity(lines.len());

        for line in lines {
            let product = self
                .product_repository
                .find_by_id(line.product_id)
                .await
                .map_err(|e| DomainError::RepositoryFailure(format!("在庫の取得に失敗: {}", e)))?;

            let product = match product {
                Some(product) if product.is_active() => product,
                Some(product) => {
                    return Err(DomainError::ProductUnavailable {
                        product_name: product.name().to_string(),
                    })
                }
                None => {
                    return Err(DomainError::ProductUnavailable {
                        product_name: "không xác định".to_string(),
                    })
                }
            };

            if !product.has_available_stock(line.quantity) {
                return Err(DomainError::OutOfStock {
                    product_name: product.name().to_string(),
                    available: product.stock(),
                });
            }

            products.push(product);
        }

        Ok(products)
    }

    /// すべての明細の在庫を引き当てる
    /// 各商品への減算は条件付きの単一操作。途中で失敗した場合は
    /// 適用済みの減算を補償（加算で巻き戻し）してから失敗を返すので、
    /// 部分的に適用されたままにはならない。
    /// 補償自体が失敗した場合のみ StockInconsistency を返す
    pub async fn commit(&self, lines: &[StockLine]) -> Result<(), DomainError> {
        let mut applied: Vec<StockLine> = Vec::new();

        for line in lines {
            let result = self
                .product_repository
                .decrement_stock(line.product_id, line.quantity)
                .await;

            match result {
                Ok(true) => applied.push(*line),
                Ok(false) => {
                    // 検証後に他の注文が在庫を取った場合にここに来る
                    self.rollback_applied(&applied).await?;
                    return Err(self.out_of_stock_error(line).await);
                }
                Err(e) => {
                    self.rollback_applied(&applied).await?;
                    return Err(DomainError::RepositoryFailure(format!(
                        "在庫の引当に失敗: {}",
                        e
                    )));
                }
            }
        }

        Ok(())
    }

    /// すべての明細の在庫を戻す（キャンセル・削除時）
    /// 一部の商品で失敗した場合は、戻せなかった商品IDを列挙した
    /// StockInconsistency を返す（手動リコンサイルの手がかりにする）
    pub async fn restore(&self, lines: &[StockLine]) -> Result<(), DomainError> {
        let mut failed: Vec<String> = Vec::new();

        for line in lines {
            if let Err(e) = self
                .product_repository
                .increment_stock(line.product_id, line.quantity)
                .await
            {
                failed.push(format!("{} ({})", line.product_id, e));
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(DomainError::StockInconsistency(format!(
                "在庫を戻せなかった商品: {}",
                failed.join(", ")
            )))
        }
    }

    /// 適用済みの減算を巻き戻す
    async fn rollback_applied(&self, applied: &[StockLine]) -> Result<(), DomainError> {
        let mut failed: Vec<String> = Vec::new();

        for line in applied {
            if let Err(e) = self
                .product_repository
                .increment_stock(line.product_id, line.quantity)
                .await
            {
                failed.push(format!("{} ({})", line.product_id, e));
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(DomainError::StockInconsistency(format!(
                "補償処理に失敗した商品: {}",
                failed.join(", ")
            )))
        }
    }

    /// 減算に失敗した明細から在庫不足エラーを組み立てる
    /// 商品名と残数を入れるために読み直す（取れなければIDで代用）
    async fn out_of_stock_error(&self, line: &StockLine) -> DomainError {
        match self.product_repository.find_by_id(line.product_id).await {
            Ok(Some(product)) => DomainError::OutOfStock {
                product_name: product.name().to_string(),
                available: product.stock(),
            },
            _ => DomainError::OutOfStock {
                product_name: line.product_id.to_string(),
                available: 0,
            },
        }
    }
}
