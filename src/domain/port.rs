// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::model::{
    Cart, CartId, Order, OrderId, OrderStatus, Product, ProductId, UserId,
};
use async_trait::async_trait;

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum RepositoryError {
    /// データベース接続に失敗
    ConnectionFailed(String),
    /// 操作に失敗
    OperationFailed(String),
    /// データの取得に失敗
    FetchFailed(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            RepositoryError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
            RepositoryError::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// ページネーションされた取得結果
/// `total` はフィルタ条件に合致する全件数
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// 商品リポジトリトレイト
/// 在庫は複数のサーバープロセスから同時に触られる唯一の共有リソースなので、
/// 減算は読み取り・書き込みの分離ではなく条件付きの単一操作として公開する
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 商品を保存する
    async fn save(&self, product: &Product) -> Result<(), RepositoryError>;

    /// 商品IDで商品を検索する
    ///
    /// # Returns
    /// * `Ok(Some(Product))` - 商品が見つかった
    /// * `Ok(None)` - 商品が見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, product_id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// 在庫が十分な場合に限り、在庫を指定数だけ減らす
    /// 「stock >= quantity なら減算」を単一のアトミック操作として実行し、
    /// チェックと更新の間に他のリクエストが割り込む余地をなくす
    ///
    /// # Returns
    /// * `Ok(true)` - 減算が適用された
    /// * `Ok(false)` - 在庫不足または商品が存在せず、何も変更されなかった
    /// * `Err(RepositoryError)` - 操作失敗
    async fn decrement_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError>;

    /// 在庫を指定数だけ戻す（キャンセル・削除時の逆操作）
    async fn increment_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RepositoryError>;
}

/// カートリポジトリトレイト
/// カート集約の永続化を抽象化する
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// カートを保存する
    async fn save(&self, cart: &Cart) -> Result<(), RepositoryError>;

    /// 所有ユーザーIDでカートを検索する
    /// カートはユーザーごとに1つだけ存在する
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError>;

    /// 新しい一意のカートIDを生成する
    fn next_identity(&self) -> CartId;
}

/// 注文リポジトリトレイト
/// 注文集約の永続化を抽象化する
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// 注文を保存する
    async fn save(&self, order: &Order) -> Result<(), RepositoryError>;

    /// 注文IDで注文を検索する
    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// 指定ユーザーの注文を作成日時の降順で取得する
    ///
    /// # Arguments
    /// * `page` - 1始まりのページ番号
    /// * `page_size` - 1ページあたりの件数
    async fn find_by_user(
        &self,
        user_id: UserId,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Order>, RepositoryError>;

    /// すべての注文をページネーションして取得する（管理者向け）
    /// ステータスが指定された場合はそのステータスのみに絞り込む
    async fn find_page(
        &self,
        status: Option<OrderStatus>,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Order>, RepositoryError>;

    /// 注文を削除する
    async fn delete(&self, order_id: OrderId) -> Result<(), RepositoryError>;

    /// 新しい一意の注文IDを生成する
    fn next_identity(&self) -> OrderId;
}
