/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 無効な数量（例: 0、または100を超える）
    InvalidQuantity,
    /// 無効な価格（例: 負の単価）
    InvalidPrice,
    /// 無効な住所（例: 電話番号の桁数が不正）
    InvalidAddress(String),
    /// 注文の検証失敗（例: 明細が空の状態で注文を作成しようとした）
    OrderValidation(String),
    /// 無効な注文状態（例: 発送済みの注文をキャンセルしようとした）
    InvalidOrderState(String),
    /// 遷移表にないステータス遷移
    InvalidStatusTransition { from: String, to: String },
    /// キャンセル理由の不備（10〜500文字が必要）
    InvalidCancelReason,
    /// 既に支払い済みの注文を再度支払おうとした
    AlreadyPaid,
    /// 在庫不足（商品名と残数を保持する）
    OutOfStock { product_name: String, available: u32 },
    /// 商品が存在しない、または販売停止中
    ProductUnavailable { product_name: String },
    /// カート内に該当明細がない
    CartItemNotFound,
    /// 通貨の不一致
    CurrencyMismatch,
    /// 無効な値
    InvalidValue(String),
    /// 在庫と注文の整合性が崩れた（補償処理の失敗）
    /// 手動リコンサイルが必要な深刻な状態
    StockInconsistency(String),
    /// リポジトリ操作の失敗
    RepositoryFailure(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::InvalidQuantity => write!(f, "Invalid quantity"),
            DomainError::InvalidPrice => write!(f, "Invalid price"),
            DomainError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            DomainError::OrderValidation(msg) => write!(f, "Order validation failed: {}", msg),
            DomainError::InvalidOrderState(msg) => write!(f, "Invalid order state: {}", msg),
            DomainError::InvalidStatusTransition { from, to } => {
                write!(f, "Invalid status transition: {} -> {}", from, to)
            }
            DomainError::InvalidCancelReason => write!(f, "Invalid cancel reason"),
            DomainError::AlreadyPaid => write!(f, "Order is already paid"),
            DomainError::OutOfStock {
                product_name,
                available,
            } => write!(
                f,
                "Out of stock: {} (available: {})",
                product_name, available
            ),
            DomainError::ProductUnavailable { product_name } => {
                write!(f, "Product unavailable: {}", product_name)
            }
            DomainError::CartItemNotFound => write!(f, "Cart item not found"),
            DomainError::CurrencyMismatch => write!(f, "Currency mismatch"),
            DomainError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            DomainError::StockInconsistency(msg) => write!(f, "Stock inconsistency: {}", msg),
            DomainError::RepositoryFailure(msg) => write!(f, "Repository failure: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
