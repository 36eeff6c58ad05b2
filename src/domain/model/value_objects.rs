use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// 1明細あたりの最小数量
pub const MIN_LINE_QUANTITY: u32 = 1;
/// 1明細あたりの最大数量
pub const MAX_LINE_QUANTITY: u32 = 100;

/// 注文の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    /// 新しい一意のOrderIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから OrderId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からOrderIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

/// 商品の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(Uuid);

impl ProductId {
    /// 新しい一意のProductIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから ProductId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からProductIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

/// ユーザーの一意識別子
/// 認証コラボレーターが発行した主体IDをそのまま保持する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// 新しい一意のUserIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから UserId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からUserIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// カートの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartId(Uuid);

impl CartId {
    /// 新しい一意のCartIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから CartId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からCartIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for CartId {
    fn default() -> Self {
        Self::new()
    }
}

/// カート明細の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartItemId(Uuid);

impl CartItemId {
    /// 新しい一意のCartItemIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから CartItemId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からCartItemIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for CartItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for CartItemId {
    fn default() -> Self {
        Self::new()
    }
}

/// 通貨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// ベトナムドン
    #[allow(clippy::upper_case_acronyms)]
    VND,
}

/// 金額を表す値オブジェクト
/// ベトナムドンは整数単位で扱う（小数なし）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// 金額と通貨から作成
    pub fn new(amount: i64, currency: String) -> Result<Self, DomainError> {
        let currency = match currency.as_str() {
            "VND" => Currency::VND,
            _ => {
                return Err(DomainError::InvalidValue(format!(
                    "サポートされていない通貨: {}",
                    currency
                )))
            }
        };
        Ok(Self { amount, currency })
    }

    /// ベトナムドンの金額を作成
    pub fn vnd(amount: i64) -> Self {
        Self {
            amount,
            currency: Currency::VND,
        }
    }

    /// 金額を取得
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// 通貨を文字列として取得
    pub fn currency(&self) -> String {
        match self.currency {
            Currency::VND => "VND".to_string(),
        }
    }

    /// 金額を加算
    pub fn add(&self, other: &Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch);
        }
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// 金額を乗算
    pub fn multiply(&self, factor: u32) -> Money {
        Money {
            amount: self.amount * factor as i64,
            currency: self.currency,
        }
    }

    /// 負の金額かどうか
    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }
}

/// 商品オプションの選択内容（サイズ・色・重量）
/// 同一商品でも選択内容が異なればカート上は別の明細になる
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOptions {
    pub size: Option<String>,
    pub color: Option<String>,
    pub weight: Option<String>,
}

impl SelectedOptions {
    /// 何も選択されていないオプションを作成
    pub fn none() -> Self {
        Self::default()
    }

    /// いずれのオプションも未選択かどうか
    pub fn is_empty(&self) -> bool {
        self.size.is_none() && self.color.is_none() && self.weight.is_none()
    }
}

/// カート明細
/// 追加時点の単価スナップショットを保持する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    id: CartItemId,
    product_id: ProductId,
    quantity: u32,
    unit_price: Money,
    selected_options: SelectedOptions,
}

impl CartItem {
    /// 新しいカート明細を作成
    /// 数量は1〜100、単価は0以上である必要がある
    pub fn new(
        id: CartItemId,
        product_id: ProductId,
        quantity: u32,
        unit_price: Money,
        selected_options: SelectedOptions,
    ) -> Result<Self, DomainError> {
        if !(MIN_LINE_QUANTITY..=MAX_LINE_QUANTITY).contains(&quantity) {
            return Err(DomainError::InvalidQuantity);
        }
        if unit_price.is_negative() {
            return Err(DomainError::InvalidPrice);
        }
        Ok(Self {
            id,
            product_id,
            quantity,
            unit_price,
            selected_options,
        })
    }

    /// 明細IDを取得
    pub fn id(&self) -> CartItemId {
        self.id
    }

    /// 商品IDを取得
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// 数量を取得
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// 単価スナップショットを取得
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// 選択オプションを取得
    pub fn selected_options(&self) -> &SelectedOptions {
        &self.selected_options
    }

    /// 小計を計算（単価 × 数量）
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    /// 数量を増加させる（同じ商品・同じオプションを追加した場合）
    /// 合計が上限を超える場合は失敗する
    pub fn increase_quantity(&mut self, additional_quantity: u32) -> Result<(), DomainError> {
        if additional_quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        let new_quantity = self.quantity.saturating_add(additional_quantity);
        if new_quantity > MAX_LINE_QUANTITY {
            return Err(DomainError::InvalidQuantity);
        }
        self.quantity = new_quantity;
        Ok(())
    }

    /// 数量を置き換える
    pub fn set_quantity(&mut self, quantity: u32) -> Result<(), DomainError> {
        if !(MIN_LINE_QUANTITY..=MAX_LINE_QUANTITY).contains(&quantity) {
            return Err(DomainError::InvalidQuantity);
        }
        self.quantity = quantity;
        Ok(())
    }
}

/// 注文明細（スナップショット）
/// 注文作成時点の商品名・単価・画像を固定し、
/// 以後の商品編集が過去の注文に波及しないようにする
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    product_id: ProductId,
    name: String,
    quantity: u32,
    unit_price: Money,
    image: String,
    selected_options: SelectedOptions,
}

impl OrderItem {
    /// 新しい注文明細を作成
    pub fn new(
        product_id: ProductId,
        name: String,
        quantity: u32,
        unit_price: Money,
        image: String,
        selected_options: SelectedOptions,
    ) -> Result<Self, DomainError> {
        if quantity < MIN_LINE_QUANTITY {
            return Err(DomainError::InvalidQuantity);
        }
        if unit_price.is_negative() {
            return Err(DomainError::InvalidPrice);
        }
        Ok(Self {
            product_id,
            name,
            quantity,
            unit_price,
            image,
            selected_options,
        })
    }

    /// 商品IDを取得
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// スナップショット時点の商品名を取得
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 数量を取得
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// スナップショット時点の単価を取得
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// スナップショット時点の画像を取得
    pub fn image(&self) -> &str {
        &self.image
    }

    /// 選択オプションを取得
    pub fn selected_options(&self) -> &SelectedOptions {
        &self.selected_options
    }

    /// 小計を計算（単価 × 数量）
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// 配送先住所を表す値オブジェクト
/// バリデーション:
/// - 受取人名は2〜50文字
/// - 電話番号は10〜11桁の数字
/// - 番地・市・区は空でない必要がある
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    recipient_name: String,
    phone: String,
    street: String,
    city: String,
    district: String,
    zip_code: Option<String>,
    note: Option<String>,
}

impl ShippingAddress {
    /// 新しい配送先住所を作成
    pub fn new(
        recipient_name: String,
        phone: String,
        street: String,
        city: String,
        district: String,
        zip_code: Option<String>,
        note: Option<String>,
    ) -> Result<Self, DomainError> {
        let name_len = recipient_name.trim().chars().count();
        if !(2..=50).contains(&name_len) {
            return Err(DomainError::InvalidAddress(
                "Tên người nhận phải từ 2-50 ký tự".to_string(),
            ));
        }
        if !Self::is_valid_phone(&phone) {
            return Err(DomainError::InvalidAddress(
                "Số điện thoại không hợp lệ".to_string(),
            ));
        }
        if street.trim().is_empty() {
            return Err(DomainError::InvalidAddress(
                "Địa chỉ là bắt buộc".to_string(),
            ));
        }
        if city.trim().is_empty() {
            return Err(DomainError::InvalidAddress(
                "Thành phố là bắt buộc".to_string(),
            ));
        }
        if district.trim().is_empty() {
            return Err(DomainError::InvalidAddress(
                "Quận/huyện là bắt buộc".to_string(),
            ));
        }

        Ok(Self {
            recipient_name,
            phone,
            street,
            city,
            district,
            zip_code,
            note,
        })
    }

    /// 電話番号が有効かチェック（10〜11桁の数字）
    fn is_valid_phone(phone: &str) -> bool {
        (10..=11).contains(&phone.len()) && phone.chars().all(|c| c.is_ascii_digit())
    }

    /// 受取人名を取得
    pub fn recipient_name(&self) -> &str {
        &self.recipient_name
    }

    /// 電話番号を取得
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// 番地を取得
    pub fn street(&self) -> &str {
        &self.street
    }

    /// 市を取得
    pub fn city(&self) -> &str {
        &self.city
    }

    /// 区を取得
    pub fn district(&self) -> &str {
        &self.district
    }

    /// 郵便番号を取得
    pub fn zip_code(&self) -> Option<&str> {
        self.zip_code.as_deref()
    }

    /// 配送メモを取得
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// 支払い方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// 代金引換
    Cod,
    /// 銀行振込
    BankTransfer,
    /// MoMoウォレット
    Momo,
    /// VNPAYゲートウェイ
    Vnpay,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method_str = match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Momo => "momo",
            PaymentMethod::Vnpay => "vnpay",
        };
        write!(f, "{}", method_str)
    }
}

impl PaymentMethod {
    /// 文字列からPaymentMethodを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "cod" => Ok(PaymentMethod::Cod),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "momo" => Ok(PaymentMethod::Momo),
            "vnpay" => Ok(PaymentMethod::Vnpay),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な支払い方法: {}",
                s
            ))),
        }
    }
}

/// 支払い確認の結果
/// ゲートウェイからの応答を記録するだけで、決済処理自体は行わない
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub id: Option<String>,
    pub status: Option<String>,
    pub update_time: Option<String>,
    pub email_address: Option<String>,
}

/// 注文のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// 保留中（作成直後、在庫は既に引当済み）
    Pending,
    /// 確認済み
    Confirmed,
    /// 処理中
    Processing,
    /// 発送済み
    Shipped,
    /// 配達完了
    Delivered,
    /// キャンセル済み
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_str = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", status_str)
    }
}

impl OrderStatus {
    /// 文字列からOrderStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な注文ステータス: {}",
                s
            ))),
        }
    }

    /// 遷移表に含まれる遷移かどうか
    /// pending → confirmed → processing → shipped → delivered の一本道と、
    /// pending/confirmed/processing からの cancelled のみを許可する
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Confirmed, OrderStatus::Processing)
                | (OrderStatus::Processing, OrderStatus::Shipped)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Confirmed, OrderStatus::Cancelled)
                | (OrderStatus::Processing, OrderStatus::Cancelled)
        )
    }

    /// キャンセル可能な状態かどうか
    pub fn is_cancellable(&self) -> bool {
        self.can_transition_to(OrderStatus::Cancelled)
    }

    /// 終端状態かどうか
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}
