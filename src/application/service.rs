use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{
    Cart, CartItemId, CartSummary, Order, OrderId, OrderItem, OrderStatus, PaymentMethod,
    PaymentResult, Product, ProductId, SelectedOptions, ShippingAddress, UserId,
};
use crate::domain::port::{CartRepository, OrderRepository, Page, ProductRepository};
use crate::domain::service::{InventoryService, StockLine};
use std::sync::Arc;

/// 自分の注文一覧の1ページあたりの件数
pub const USER_ORDERS_PAGE_SIZE: u32 = 10;
/// 管理者向け注文一覧の1ページあたりの件数
pub const ADMIN_ORDERS_PAGE_SIZE: u32 = 20;

/// ページネーションされた注文一覧
#[derive(Debug)]
pub struct PagedOrders {
    pub orders: Vec<Order>,
    pub page: u32,
    pub pages: u32,
    pub total: u64,
}

fn paged(page_result: Page<Order>, page: u32, page_size: u32) -> PagedOrders {
    let pages = ((page_result.total + page_size as u64 - 1) / page_size as u64) as u32;
    PagedOrders {
        orders: page_result.items,
        page,
        pages,
        total: page_result.total,
    }
}

/// カートアプリケーションサービス
pub struct CartApplicationService {
    cart_repository: Arc<dyn CartRepository>,
    product_repository: Arc<dyn ProductRepository>,
}

impl CartApplicationService {
    /// 新しいカートアプリケーションサービスを作成
    pub fn new(
        cart_repository: Arc<dyn CartRepository>,
        product_repository: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            cart_repository,
            product_repository,
        }
    }

    /// ユーザーのカートを取得
    /// 存在しなければ空のカートを遅延作成して返す
    pub async fn get_cart(&self, user_id: UserId) -> Result<Cart, ApplicationError> {
        match self.cart_repository.find_by_user(user_id).await? {
            Some(cart) => Ok(cart),
            None => {
                let cart = Cart::new(self.cart_repository.next_identity(), user_id);
                self.cart_repository.save(&cart).await?;
                Ok(cart)
            }
        }
    }

    /// カートの概要を取得
    /// カートが未作成のユーザーにはゼロ値を返す（作成はしない）
    pub async fn get_summary(&self, user_id: UserId) -> Result<CartSummary, ApplicationError> {
        match self.cart_repository.find_by_user(user_id).await? {
            Some(cart) => Ok(cart.summary()),
            None => Ok(CartSummary {
                total_items: 0,
                total_amount: crate::domain::model::Money::vnd(0),
                item_count: 0,
            }),
        }
    }

    /// 商品をカートに追加
    /// 商品の存在・販売状態・現在庫を確認した上で、
    /// その時点の商品価格をスナップショットとして明細に書き込む
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        selected_options: SelectedOptions,
    ) -> Result<Cart, ApplicationError> {
        let product = self
            .product_repository
            .find_by_id(product_id)
            .await?
            .filter(|product| product.is_active())
            .ok_or_else(|| {
                ApplicationError::NotFound("Sản phẩm không tồn tại".to_string())
            })?;

        if !product.has_available_stock(quantity) {
            return Err(DomainError::OutOfStock {
                product_name: product.name().to_string(),
                available: product.stock(),
            }
            .into());
        }

        let mut cart = match self.cart_repository.find_by_user(user_id).await? {
            Some(cart) => cart,
            None => Cart::new(self.cart_repository.next_identity(), user_id),
        };

        cart.add_item(product_id, quantity, product.price(), selected_options)?;
        self.cart_repository.save(&cart).await?;
        Ok(cart)
    }

    /// カート明細の数量を変更
    /// 明細追加後に在庫が変わっている可能性があるため、
    /// 変更前に現在庫を読み直して検証する
    pub async fn update_item_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<Cart, ApplicationError> {
        let mut cart = self
            .cart_repository
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound("Giỏ hàng không tồn tại".to_string())
            })?;

        let item = cart
            .find_item(item_id)
            .ok_or_else(|| {
                ApplicationError::NotFound("Sản phẩm không có trong giỏ hàng".to_string())
            })?;

        let product = self
            .product_repository
            .find_by_id(item.product_id())
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound("Sản phẩm không tồn tại".to_string())
            })?;

        if !product.has_available_stock(quantity) {
            return Err(DomainError::OutOfStock {
                product_name: product.name().to_string(),
                available: product.stock(),
            }
            .into());
        }

        cart.update_item_quantity(item_id, quantity)?;
        self.cart_repository.save(&cart).await?;
        Ok(cart)
    }

    /// カート明細を削除（冪等: 存在しない明細IDでもエラーにしない）
    pub async fn remove_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<Cart, ApplicationError> {
        let mut cart = self
            .cart_repository
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound("Giỏ hàng không tồn tại".to_string())
            })?;

        cart.remove_item(item_id);
        self.cart_repository.save(&cart).await?;
        Ok(cart)
    }

    /// カートを空にする
    pub async fn clear_cart(&self, user_id: UserId) -> Result<Cart, ApplicationError> {
        let mut cart = self
            .cart_repository
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound("Giỏ hàng không tồn tại".to_string())
            })?;

        cart.clear();
        self.cart_repository.save(&cart).await?;
        Ok(cart)
    }
}

/// 注文アプリケーションサービス
/// 注文確定ワークフロー（このシステムのトランザクション的な中核）と
/// 注文のライフサイクル操作を担当する
pub struct OrderApplicationService {
    order_repository: Arc<dyn OrderRepository>,
    cart_repository: Arc<dyn CartRepository>,
    inventory_service: InventoryService,
}

impl OrderApplicationService {
    /// 新しい注文アプリケーションサービスを作成
    pub fn new(
        order_repository: Arc<dyn OrderRepository>,
        cart_repository: Arc<dyn CartRepository>,
        inventory_service: InventoryService,
    ) -> Self {
        Self {
            order_repository,
            cart_repository,
            inventory_service,
        }
    }

    /// 注文確定ワークフロー
    ///
    /// 1. カートを読み込む
    /// 2. 在庫ゲートで全明細を検証（失敗したら副作用ゼロで中断）
    /// 3. カート明細を注文明細にスナップショット
    /// 4. 注文を pending で永続化（注文確定用の定数で価格を導出）
    /// 5. 在庫ゲートで在庫を引き当てる
    /// 6. カートを空にする
    /// 7. 作成した注文を返す
    ///
    /// ステップ5が失敗した場合は注文を巻き戻す。巻き戻しにも失敗したら
    /// 整合性エラーとして注文ID・商品IDを添えて通知する
    pub async fn place_order(
        &self,
        user_id: UserId,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> Result<Order, ApplicationError> {
        // 1. カートを読み込む
        let mut cart = self
            .cart_repository
            .find_by_user(user_id)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or_else(|| ApplicationError::Validation("Giỏ hàng trống".to_string()))?;

        let lines: Vec<StockLine> = cart.items().iter().map(StockLine::from).collect();

        // 2. 呼び出し時点の在庫で全明細を検証（ここまで書き込みなし）
        let products = self.inventory_service.validate(&lines).await?;

        // 3. この瞬間の商品名・画像と、カートの単価スナップショットで明細を固定
        let items = Self::snapshot_items(&cart, &products)?;

        // 4. 注文を pending で永続化
        let order = Order::new(
            self.order_repository.next_identity(),
            user_id,
            items,
            shipping_address,
            payment_method,
        )?;
        self.order_repository.save(&order).await?;

        // 5. 在庫を引き当てる（失敗時は注文を巻き戻す）
        if let Err(err) = self.inventory_service.commit(&lines).await {
            return Err(self.compensate_failed_commit(&order, &lines, err).await);
        }

        // 6. カートを空にする
        cart.clear();
        if let Err(err) = self.cart_repository.save(&cart).await {
            // 注文は成立しているため失敗扱いにはせず、警告に留める
            tracing::warn!(
                order_id = %order.id(),
                error = %err,
                "注文確定後のカートクリアに失敗"
            );
        }

        // 7. 作成した注文を返す
        Ok(order)
    }

    /// カート明細と検証済み商品から注文明細を組み立てる
    /// 単価はカートに追加した時点のスナップショットを使う
    fn snapshot_items(cart: &Cart, products: &[Product]) -> Result<Vec<OrderItem>, DomainError> {
        cart.items()
            .iter()
            .zip(products.iter())
            .map(|(item, product)| {
                OrderItem::new(
                    product.id(),
                    product.name().to_string(),
                    item.quantity(),
                    item.unit_price(),
                    product.main_image().to_string(),
                    item.selected_options().clone(),
                )
            })
            .collect()
    }

    /// 在庫引当に失敗した注文を巻き戻す
    /// 巻き戻せた場合は元のエラー（在庫不足など）をそのまま返し、
    /// 巻き戻せなかった場合は整合性エラーに格上げする
    async fn compensate_failed_commit(
        &self,
        order: &Order,
        lines: &[StockLine],
        err: DomainError,
    ) -> ApplicationError {
        if let DomainError::StockInconsistency(detail) = &err {
            let product_ids: Vec<String> =
                lines.iter().map(|l| l.product_id.to_string()).collect();
            tracing::error!(
                order_id = %order.id(),
                product_ids = ?product_ids,
                detail = %detail,
                "在庫引当の補償処理に失敗、手動リコンサイルが必要"
            );
            return ApplicationError::Inconsistency(format!(
                "đơn hàng {}: {}",
                order.id(),
                detail
            ));
        }

        match self.order_repository.delete(order.id()).await {
            Ok(()) => err.into(),
            Err(delete_err) => {
                let product_ids: Vec<String> =
                    lines.iter().map(|l| l.product_id.to_string()).collect();
                tracing::error!(
                    order_id = %order.id(),
                    product_ids = ?product_ids,
                    error = %delete_err,
                    "在庫未引当の注文を削除できず、手動リコンサイルが必要"
                );
                ApplicationError::Inconsistency(format!(
                    "đơn hàng {} đã được lưu nhưng chưa trừ kho",
                    order.id()
                ))
            }
        }
    }

    /// 自分の注文一覧を取得（作成日時の降順）
    pub async fn get_user_orders(
        &self,
        user_id: UserId,
        page: u32,
    ) -> Result<PagedOrders, ApplicationError> {
        let page = page.max(1);
        let result = self
            .order_repository
            .find_by_user(user_id, page, USER_ORDERS_PAGE_SIZE)
            .await?;
        Ok(paged(result, page, USER_ORDERS_PAGE_SIZE))
    }

    /// 注文を取得（所有者または管理者のみ）
    pub async fn get_order(
        &self,
        order_id: OrderId,
        requester: UserId,
        is_admin: bool,
    ) -> Result<Order, ApplicationError> {
        let order = self.find_order(order_id).await?;

        if order.user_id() != requester && !is_admin {
            return Err(ApplicationError::Forbidden(
                "Không có quyền truy cập".to_string(),
            ));
        }

        Ok(order)
    }

    /// すべての注文をページネーションして取得（管理者向け）
    pub async fn get_all_orders(
        &self,
        status: Option<OrderStatus>,
        page: u32,
    ) -> Result<PagedOrders, ApplicationError> {
        let page = page.max(1);
        let result = self
            .order_repository
            .find_page(status, page, ADMIN_ORDERS_PAGE_SIZE)
            .await?;
        Ok(paged(result, page, ADMIN_ORDERS_PAGE_SIZE))
    }

    /// 注文ステータスを変更（管理者向け）
    /// cancelled への変更は理由が必須で、在庫の返却も行う
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
        note: Option<String>,
        tracking_number: Option<String>,
    ) -> Result<Order, ApplicationError> {
        let mut order = self.find_order(order_id).await?;

        if new_status == OrderStatus::Cancelled {
            let reason = note.ok_or_else(|| {
                ApplicationError::Validation("Lý do hủy là bắt buộc".to_string())
            })?;
            return self.cancel_internal(order, &reason).await;
        }

        order.update_status(new_status)?;
        if new_status == OrderStatus::Shipped {
            if let Some(tracking_number) = tracking_number {
                order.set_tracking_number(tracking_number);
            }
        }
        self.order_repository.save(&order).await?;
        Ok(order)
    }

    /// 注文をキャンセル（所有者のみ）
    /// 在庫は注文作成時に引き当て済みのため、どのキャンセル可能状態からでも
    /// 引き当てた数量をそのまま返却する
    pub async fn cancel_order(
        &self,
        order_id: OrderId,
        requester: UserId,
        reason: &str,
    ) -> Result<Order, ApplicationError> {
        let order = self.find_order(order_id).await?;

        if order.user_id() != requester {
            return Err(ApplicationError::Forbidden(
                "Không có quyền hủy đơn hàng này".to_string(),
            ));
        }

        self.cancel_internal(order, reason).await
    }

    async fn cancel_internal(
        &self,
        mut order: Order,
        reason: &str,
    ) -> Result<Order, ApplicationError> {
        order.cancel(reason)?;
        self.order_repository.save(&order).await?;

        let lines: Vec<StockLine> = order.items().iter().map(StockLine::from).collect();
        if let Err(err) = self.inventory_service.restore(&lines).await {
            let product_ids: Vec<String> =
                lines.iter().map(|l| l.product_id.to_string()).collect();
            tracing::error!(
                order_id = %order.id(),
                product_ids = ?product_ids,
                error = %err,
                "キャンセル時の在庫返却に失敗、手動リコンサイルが必要"
            );
            return Err(ApplicationError::Inconsistency(format!(
                "đơn hàng {} đã hủy nhưng chưa hoàn kho",
                order.id()
            )));
        }

        Ok(order)
    }

    /// 注文を支払い済みにマーク（管理者向け）
    pub async fn mark_order_as_paid(
        &self,
        order_id: OrderId,
        payment_result: PaymentResult,
    ) -> Result<Order, ApplicationError> {
        let mut order = self.find_order(order_id).await?;
        order.mark_as_paid(payment_result)?;
        self.order_repository.save(&order).await?;
        Ok(order)
    }

    /// 注文を削除（管理者向け）
    /// 在庫が引き当てられたままの注文（cancelled 以外）は
    /// 削除前に在庫を返却する
    pub async fn delete_order(&self, order_id: OrderId) -> Result<(), ApplicationError> {
        let order = self.find_order(order_id).await?;

        if order.has_committed_stock() {
            let lines: Vec<StockLine> = order.items().iter().map(StockLine::from).collect();
            if let Err(err) = self.inventory_service.restore(&lines).await {
                let product_ids: Vec<String> =
                    lines.iter().map(|l| l.product_id.to_string()).collect();
                tracing::error!(
                    order_id = %order.id(),
                    product_ids = ?product_ids,
                    error = %err,
                    "削除時の在庫返却に失敗、削除を中断"
                );
                return Err(ApplicationError::Inconsistency(format!(
                    "đơn hàng {} chưa hoàn kho",
                    order.id()
                )));
            }
        }

        self.order_repository.delete(order_id).await?;
        Ok(())
    }

    async fn find_order(&self, order_id: OrderId) -> Result<Order, ApplicationError> {
        self.order_repository
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound("Không tìm thấy đơn hàng".to_string())
            })
    }
}

/// 商品アプリケーションサービス
/// カタログ管理は外部コラボレーターの責務。ここでは在庫ゲートの検証対象を
/// 用意するための登録と参照だけを提供する
pub struct ProductApplicationService {
    product_repository: Arc<dyn ProductRepository>,
}

impl ProductApplicationService {
    /// 新しい商品アプリケーションサービスを作成
    pub fn new(product_repository: Arc<dyn ProductRepository>) -> Self {
        Self { product_repository }
    }

    /// 商品を登録する
    pub async fn create_product(&self, product: &Product) -> Result<(), ApplicationError> {
        self.product_repository
            .save(product)
            .await
            .map_err(ApplicationError::from)
    }

    /// 商品IDで商品を取得
    pub async fn get_product(
        &self,
        product_id: ProductId,
    ) -> Result<Option<Product>, ApplicationError> {
        self.product_repository
            .find_by_id(product_id)
            .await
            .map_err(ApplicationError::from)
    }
}
