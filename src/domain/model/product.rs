use crate::domain::error::DomainError;
use crate::domain::model::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// カテゴリ別の商品スペック
/// カテゴリごとに適用されるフィールドを型で固定する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ProductSpecs {
    /// ラケット
    Racket {
        balance: Option<String>,
        flexibility: Option<String>,
        string_tension: Option<String>,
        shaft_material: Option<String>,
        weight: Option<String>,
    },
    /// シューズ
    Shoes {
        sole: Option<String>,
        cushioning: Option<String>,
        upper_material: Option<String>,
        size: Option<String>,
    },
    /// ウェア
    Apparel {
        fabric: Option<String>,
        fit: Option<String>,
        breathability: Option<String>,
        size: Option<String>,
    },
    /// その他（自由なキーと値のリスト）
    Custom { specs: Vec<CustomSpec> },
}

/// 自由記述のスペック項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSpec {
    pub name: String,
    pub value: String,
}

/// 商品
/// カタログ管理は外部コラボレーターの責務であり、
/// このコアは注文処理が依存するフィールド（価格・在庫・販売状態・
/// スナップショット用の名前と画像）だけを扱う
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: ProductId,
    name: String,
    price: Money,
    stock: u32,
    is_active: bool,
    main_image: String,
    specifications: Option<ProductSpecs>,
}

impl Product {
    /// 新しい商品を作成
    pub fn new(
        id: ProductId,
        name: String,
        price: Money,
        stock: u32,
        is_active: bool,
        main_image: String,
        specifications: Option<ProductSpecs>,
    ) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidValue(
                "商品名は空にできません".to_string(),
            ));
        }
        if price.is_negative() {
            return Err(DomainError::InvalidPrice);
        }
        Ok(Self {
            id,
            name,
            price,
            stock,
            is_active,
            main_image,
            specifications,
        })
    }

    /// 商品IDを取得
    pub fn id(&self) -> ProductId {
        self.id
    }

    /// 商品名を取得
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 価格を取得
    pub fn price(&self) -> Money {
        self.price
    }

    /// 在庫数を取得
    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// 販売中かどうか
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// 商品画像を取得
    pub fn main_image(&self) -> &str {
        &self.main_image
    }

    /// スペックを取得
    pub fn specifications(&self) -> Option<&ProductSpecs> {
        self.specifications.as_ref()
    }

    /// 指定された数量の在庫が利用可能かチェック
    pub fn has_available_stock(&self, quantity: u32) -> bool {
        self.stock >= quantity
    }

    /// 在庫を引き当てる
    /// 在庫不足の場合は失敗し、在庫数は変化しない
    pub fn reserve(&mut self, quantity: u32) -> Result<(), DomainError> {
        if !self.has_available_stock(quantity) {
            return Err(DomainError::OutOfStock {
                product_name: self.name.clone(),
                available: self.stock,
            });
        }
        self.stock -= quantity;
        Ok(())
    }

    /// 在庫を戻す（キャンセル・削除時など）
    pub fn release(&mut self, quantity: u32) {
        self.stock = self.stock.saturating_add(quantity);
    }
}
