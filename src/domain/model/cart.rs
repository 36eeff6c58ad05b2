use crate::domain::error::DomainError;
use crate::domain::model::{
    CartId, CartItem, CartItemId, Money, ProductId, SelectedOptions, UserId,
};
use crate::domain::pricing::{self, PriceBreakdown};

/// カート集約
/// ユーザーごとに1つだけ存在し、注文前の明細を保持する。
/// 派生値（totalItems / totalAmount）はすべての変更操作で
/// 明示的に再計算してから永続化する。
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    id: CartId,
    user_id: UserId,
    items: Vec<CartItem>,
    total_items: u32,
    total_amount: Money,
}

/// カートの概要（明細の詳細を含まない軽量ビュー）
#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary {
    pub total_items: u32,
    pub total_amount: Money,
    pub item_count: usize,
}

impl Cart {
    /// 新しい空のカートを作成
    /// カートは最初の「カートに追加」で遅延作成される
    pub fn new(id: CartId, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            items: Vec::new(),
            total_items: 0,
            total_amount: Money::vnd(0),
        }
    }

    /// データベースから取得したデータでカートを再構築
    /// 派生値は保存値を信用せず再計算する
    pub fn reconstruct(id: CartId, user_id: UserId, items: Vec<CartItem>) -> Self {
        let mut cart = Self {
            id,
            user_id,
            items,
            total_items: 0,
            total_amount: Money::vnd(0),
        };
        cart.recompute_totals();
        cart
    }

    /// カートIDを取得
    pub fn id(&self) -> CartId {
        self.id
    }

    /// 所有ユーザーIDを取得
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// 明細のリストを取得
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// 合計数量を取得
    pub fn total_items(&self) -> u32 {
        self.total_items
    }

    /// 合計金額を取得
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// カートが空かどうか
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 明細IDで明細を検索
    pub fn find_item(&self, item_id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == item_id)
    }

    /// 商品をカートに追加
    /// 同じ商品かつ同じ選択オプションの明細が既にあれば数量を増加、
    /// なければ新しい明細を末尾に追加する（単価は変更しない）
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        unit_price: Money,
        selected_options: SelectedOptions,
    ) -> Result<(), DomainError> {
        if let Some(existing) = self.items.iter_mut().find(|item| {
            item.product_id() == product_id && item.selected_options() == &selected_options
        }) {
            existing.increase_quantity(quantity)?;
        } else {
            let item = CartItem::new(
                CartItemId::new(),
                product_id,
                quantity,
                unit_price,
                selected_options,
            )?;
            self.items.push(item);
        }

        self.recompute_totals();
        Ok(())
    }

    /// 明細の数量を置き換える
    /// 呼び出し側は事前に現在庫に対する再検証を済ませていること
    /// （明細追加後に在庫が変わっている可能性があるため）
    pub fn update_item_quantity(
        &mut self,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), DomainError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == item_id)
            .ok_or(DomainError::CartItemNotFound)?;

        item.set_quantity(quantity)?;
        self.recompute_totals();
        Ok(())
    }

    /// 明細を削除
    /// 該当IDが存在しない場合は何もしない（冪等な削除）
    pub fn remove_item(&mut self, item_id: CartItemId) {
        self.items.retain(|item| item.id() != item_id);
        self.recompute_totals();
    }

    /// カートを空にする
    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute_totals();
    }

    /// 派生値を再計算
    /// totalItems = Σ 数量、totalAmount = Σ 単価 × 数量
    fn recompute_totals(&mut self) {
        self.total_items = self.items.iter().map(|item| item.quantity()).sum();
        self.total_amount = self
            .items
            .iter()
            .map(|item| item.subtotal())
            .fold(Money::vnd(0), |acc, amount| acc.add(&amount).unwrap_or(acc));
    }

    /// カートプレビュー用の価格内訳を取得
    /// （閾値 2,000,000 / 配送料 30,000 / 税率 8%）
    pub fn preview_totals(&self) -> PriceBreakdown {
        let lines: Vec<(Money, u32)> = self
            .items
            .iter()
            .map(|item| (item.unit_price(), item.quantity()))
            .collect();
        pricing::cart_preview_breakdown(&lines)
    }

    /// カートの概要を取得
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            total_items: self.total_items,
            total_amount: self.total_amount,
            item_count: self.items.len(),
        }
    }
}
