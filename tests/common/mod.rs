// テスト用のインメモリリポジトリ
// ポートのトレイトをHashMapで実装する。在庫の減算はMutexの内側で
// チェックと更新を行うため、本番のMySQL実装の条件付きUPDATEと同じく
// アトミックに振る舞う

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use sportshop_order_management::application::service::{
    CartApplicationService, OrderApplicationService, ProductApplicationService,
};
use sportshop_order_management::domain::model::{
    Cart, CartId, Money, Order, OrderId, OrderStatus, Product, ProductId, ShippingAddress, UserId,
};
use sportshop_order_management::domain::port::{
    CartRepository, OrderRepository, Page, ProductRepository, RepositoryError,
};
use sportshop_order_management::domain::service::InventoryService;

pub struct InMemoryProductRepository {
    products: Arc<Mutex<HashMap<ProductId, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn add_product(&self, product: Product) {
        let mut products = self.products.lock().await;
        products.insert(product.id(), product);
    }

    /// テストのアサーション用: 現在の在庫数を取得
    pub async fn stock_of(&self, product_id: ProductId) -> u32 {
        let products = self.products.lock().await;
        products
            .get(&product_id)
            .map(|product| product.stock())
            .unwrap_or(0)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut products = self.products.lock().await;
        products.insert(product.id(), product.clone());
        Ok(())
    }

    async fn find_by_id(&self, product_id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.lock().await;
        Ok(products.get(&product_id).cloned())
    }

    async fn decrement_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        // ロックの内側でチェックと減算を行う（条件付きUPDATE相当）
        let mut products = self.products.lock().await;
        match products.get_mut(&product_id) {
            Some(product) => Ok(product.reserve(quantity).is_ok()),
            None => Ok(false),
        }
    }

    async fn increment_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        let mut products = self.products.lock().await;
        match products.get_mut(&product_id) {
            Some(product) => {
                product.release(quantity);
                Ok(())
            }
            None => Err(RepositoryError::OperationFailed(format!(
                "product not found: {}",
                product_id
            ))),
        }
    }
}

pub struct InMemoryCartRepository {
    carts: Arc<Mutex<HashMap<UserId, Cart>>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self {
            carts: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn save(&self, cart: &Cart) -> Result<(), RepositoryError> {
        let mut carts = self.carts.lock().await;
        carts.insert(cart.user_id(), cart.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let carts = self.carts.lock().await;
        Ok(carts.get(&user_id).cloned())
    }

    fn next_identity(&self) -> CartId {
        CartId::new()
    }
}

pub struct InMemoryOrderRepository {
    orders: Arc<Mutex<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self {
            orders: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn count(&self) -> usize {
        let orders = self.orders.lock().await;
        orders.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.lock().await;
        orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let orders = self.orders.lock().await;
        Ok(orders.get(&order_id).cloned())
    }

    async fn find_by_user(
        &self,
        user_id: UserId,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Order>, RepositoryError> {
        let orders = self.orders.lock().await;
        let mut matched: Vec<Order> = orders
            .values()
            .filter(|order| order.user_id() == user_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(((page.max(1) - 1) * page_size) as usize)
            .take(page_size as usize)
            .collect();

        Ok(Page { items, total })
    }

    async fn find_page(
        &self,
        status: Option<OrderStatus>,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Order>, RepositoryError> {
        let orders = self.orders.lock().await;
        let mut matched: Vec<Order> = orders
            .values()
            .filter(|order| status.map_or(true, |status| order.status() == status))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(((page.max(1) - 1) * page_size) as usize)
            .take(page_size as usize)
            .collect();

        Ok(Page { items, total })
    }

    async fn delete(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        let mut orders = self.orders.lock().await;
        orders.remove(&order_id);
        Ok(())
    }

    fn next_identity(&self) -> OrderId {
        OrderId::new()
    }
}

/// テストで使うサービス一式とリポジトリへの参照
pub struct Fixture {
    pub cart_service: Arc<CartApplicationService>,
    pub order_service: Arc<OrderApplicationService>,
    pub product_service: Arc<ProductApplicationService>,
    pub products: Arc<InMemoryProductRepository>,
    pub carts: Arc<InMemoryCartRepository>,
    pub orders: Arc<InMemoryOrderRepository>,
}

impl Fixture {
    pub fn new() -> Self {
        let products = Arc::new(InMemoryProductRepository::new());
        let carts = Arc::new(InMemoryCartRepository::new());
        let orders = Arc::new(InMemoryOrderRepository::new());

        let cart_service = Arc::new(CartApplicationService::new(
            carts.clone(),
            products.clone(),
        ));
        let order_service = Arc::new(OrderApplicationService::new(
            orders.clone(),
            carts.clone(),
            InventoryService::new(products.clone()),
        ));
        let product_service = Arc::new(ProductApplicationService::new(products.clone()));

        Self {
            cart_service,
            order_service,
            product_service,
            products,
            carts,
            orders,
        }
    }
}

/// テスト用の販売中商品を作成
pub fn active_product(name: &str, price: i64, stock: u32) -> Product {
    Product::new(
        ProductId::new(),
        name.to_string(),
        Money::vnd(price),
        stock,
        true,
        format!("/uploads/{}.jpg", stock),
        None,
    )
    .unwrap()
}

/// テスト用の販売停止中の商品を作成
pub fn inactive_product(name: &str, price: i64, stock: u32) -> Product {
    Product::new(
        ProductId::new(),
        name.to_string(),
        Money::vnd(price),
        stock,
        false,
        "/uploads/discontinued.jpg".to_string(),
        None,
    )
    .unwrap()
}

/// テスト用の配送先住所を作成
pub fn sample_address() -> ShippingAddress {
    ShippingAddress::new(
        "Nguyễn Văn An".to_string(),
        "0912345678".to_string(),
        "12 Lê Lợi".to_string(),
        "Hồ Chí Minh".to_string(),
        "Quận 1".to_string(),
        Some("700000".to_string()),
        None,
    )
    .unwrap()
}
