use crate::domain::error::DomainError;
use crate::domain::model::{
    Money, OrderId, OrderItem, OrderStatus, PaymentMethod, PaymentResult, ShippingAddress, UserId,
};
use crate::domain::pricing;
use chrono::{DateTime, Utc};

/// キャンセル理由の最小文字数
pub const MIN_CANCEL_REASON_CHARS: usize = 10;
/// キャンセル理由の最大文字数
pub const MAX_CANCEL_REASON_CHARS: usize = 500;

/// 注文集約
/// 明細は作成時点のスナップショットで、以後は不変。
/// 変更できるのはステータスと支払い関連のフィールドのみ。
/// 不変条件: totalPrice = itemsPrice + taxPrice + shippingPrice
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    items: Vec<OrderItem>,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
    payment_result: Option<PaymentResult>,
    items_price: Money,
    tax_price: Money,
    shipping_price: Money,
    total_price: Money,
    status: OrderStatus,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    is_delivered: bool,
    delivered_at: Option<DateTime<Utc>>,
    cancel_reason: Option<String>,
    tracking_number: Option<String>,
    created_at: DateTime<Utc>,
}

impl Order {
    /// 新しい注文を作成
    /// 明細は1つ以上必要。価格は注文確定用の定数
    /// （閾値 500,000 / 配送料 30,000 / 税率 10%）で一度だけ導出し、
    /// 以後は再計算しない
    pub fn new(
        id: OrderId,
        user_id: UserId,
        items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::OrderValidation(
                "注文明細が空です".to_string(),
            ));
        }

        let lines: Vec<(Money, u32)> = items
            .iter()
            .map(|item| (item.unit_price(), item.quantity()))
            .collect();
        let breakdown = pricing::order_breakdown(&lines);

        Ok(Self {
            id,
            user_id,
            items,
            shipping_address,
            payment_method,
            payment_result: None,
            items_price: breakdown.subtotal,
            tax_price: breakdown.tax,
            shipping_price: breakdown.shipping,
            total_price: breakdown.total,
            status: OrderStatus::Pending,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            cancel_reason: None,
            tracking_number: None,
            created_at: Utc::now(),
        })
    }

    /// データベースから取得したデータで注文を再構築
    /// 保存済みの価格をそのまま信用する（履歴を書き換えない）
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: OrderId,
        user_id: UserId,
        items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        payment_result: Option<PaymentResult>,
        items_price: Money,
        tax_price: Money,
        shipping_price: Money,
        total_price: Money,
        status: OrderStatus,
        is_paid: bool,
        paid_at: Option<DateTime<Utc>>,
        is_delivered: bool,
        delivered_at: Option<DateTime<Utc>>,
        cancel_reason: Option<String>,
        tracking_number: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::OrderValidation(
                "注文明細が空です".to_string(),
            ));
        }
        Ok(Self {
            id,
            user_id,
            items,
            shipping_address,
            payment_method,
            payment_result,
            items_price,
            tax_price,
            shipping_price,
            total_price,
            status,
            is_paid,
            paid_at,
            is_delivered,
            delivered_at,
            cancel_reason,
            tracking_number,
            created_at,
        })
    }

    /// 注文IDを取得
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// 所有ユーザーIDを取得
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// 明細のリストを取得
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// 配送先住所を取得
    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    /// 支払い方法を取得
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// 支払い結果を取得
    pub fn payment_result(&self) -> Option<&PaymentResult> {
        self.payment_result.as_ref()
    }

    /// 商品小計を取得
    pub fn items_price(&self) -> Money {
        self.items_price
    }

    /// 税額を取得
    pub fn tax_price(&self) -> Money {
        self.tax_price
    }

    /// 配送料を取得
    pub fn shipping_price(&self) -> Money {
        self.shipping_price
    }

    /// 合計金額を取得
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// ステータスを取得
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// 支払い済みかどうか
    pub fn is_paid(&self) -> bool {
        self.is_paid
    }

    /// 支払い日時を取得
    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    /// 配達完了かどうか
    pub fn is_delivered(&self) -> bool {
        self.is_delivered
    }

    /// 配達完了日時を取得
    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    /// キャンセル理由を取得
    pub fn cancel_reason(&self) -> Option<&str> {
        self.cancel_reason.as_deref()
    }

    /// 追跡番号を取得
    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    /// 作成日時を取得
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// ユーザー向けの短い注文番号（IDの末尾8桁・大文字）
    pub fn order_number(&self) -> String {
        let simple = self.id.as_uuid().simple().to_string();
        simple[simple.len() - 8..].to_uppercase()
    }

    /// 在庫が引き当てられたままの注文かどうか
    /// 在庫は注文作成時に引き当てられ、キャンセル時にのみ戻されるため、
    /// cancelled 以外のすべてのステータスが該当する
    pub fn has_committed_stock(&self) -> bool {
        self.status != OrderStatus::Cancelled
    }

    /// ステータスを遷移させる
    /// 遷移表にない遷移は拒否し、ステータスは変更しない。
    /// cancelled への遷移は理由が必須なので cancel を使うこと
    pub fn update_status(&mut self, new_status: OrderStatus) -> Result<(), DomainError> {
        if new_status == OrderStatus::Cancelled {
            return Err(DomainError::InvalidOrderState(
                "キャンセルには理由が必要です".to_string(),
            ));
        }
        if !self.status.can_transition_to(new_status) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: new_status.to_string(),
            });
        }

        self.status = new_status;

        if new_status == OrderStatus::Delivered {
            self.is_delivered = true;
            self.delivered_at = Some(Utc::now());
        }

        Ok(())
    }

    /// 注文をキャンセルする
    /// 事前条件:
    /// - ステータスが pending / confirmed / processing のいずれか
    /// - 理由が10〜500文字
    pub fn cancel(&mut self, reason: &str) -> Result<(), DomainError> {
        if !self.status.is_cancellable() {
            return Err(DomainError::InvalidOrderState(format!(
                "{} 状態の注文はキャンセルできません",
                self.status
            )));
        }

        let reason = reason.trim();
        let len = reason.chars().count();
        if !(MIN_CANCEL_REASON_CHARS..=MAX_CANCEL_REASON_CHARS).contains(&len) {
            return Err(DomainError::InvalidCancelReason);
        }

        self.status = OrderStatus::Cancelled;
        self.cancel_reason = Some(reason.to_string());
        Ok(())
    }

    /// 支払い済みにマークする
    /// ステータス遷移とは独立。既に支払い済みなら失敗する
    pub fn mark_as_paid(&mut self, payment_result: PaymentResult) -> Result<(), DomainError> {
        if self.is_paid {
            return Err(DomainError::AlreadyPaid);
        }
        self.is_paid = true;
        self.paid_at = Some(Utc::now());
        self.payment_result = Some(payment_result);
        Ok(())
    }

    /// 追跡番号を設定する（発送時）
    pub fn set_tracking_number(&mut self, tracking_number: String) {
        self.tracking_number = Some(tracking_number);
    }
}
