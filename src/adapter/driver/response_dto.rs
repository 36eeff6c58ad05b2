use crate::application::service::PagedOrders;
use crate::domain::model::{
    Cart, CartItem, CartSummary, Order, OrderItem, Product, ProductSpecs, SelectedOptions,
    ShippingAddress,
};
use serde::Serialize;

/// 商品オプション選択のレスポンスDTO
#[derive(Serialize)]
pub struct SelectedOptionsResponse {
    pub size: Option<String>,
    pub color: Option<String>,
    pub weight: Option<String>,
}

impl SelectedOptionsResponse {
    fn from_options(options: &SelectedOptions) -> Self {
        Self {
            size: options.size.clone(),
            color: options.color.clone(),
            weight: options.weight.clone(),
        }
    }
}

/// カート明細用のレスポンスDTO
#[derive(Serialize)]
pub struct CartItemResponse {
    pub id: String,
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub subtotal: i64,
    pub selected_options: SelectedOptionsResponse,
}

impl CartItemResponse {
    /// ドメインオブジェクトからCartItemResponseを作成
    pub fn from_cart_item(item: &CartItem) -> Self {
        Self {
            id: item.id().to_string(),
            product_id: item.product_id().to_string(),
            quantity: item.quantity(),
            unit_price: item.unit_price().amount(),
            subtotal: item.subtotal().amount(),
            selected_options: SelectedOptionsResponse::from_options(item.selected_options()),
        }
    }
}

/// カート用のレスポンスDTO
/// プレビュー価格（小計・配送料・税・合計）を含む
#[derive(Serialize)]
pub struct CartResponse {
    pub id: String,
    pub user_id: String,
    pub items: Vec<CartItemResponse>,
    pub total_items: u32,
    pub total_amount: i64,
    pub subtotal: i64,
    pub shipping: i64,
    pub tax: i64,
    pub total: i64,
}

impl CartResponse {
    /// ドメインオブジェクトからCartResponseを作成
    pub fn from_cart(cart: &Cart) -> Self {
        let totals = cart.preview_totals();
        Self {
            id: cart.id().to_string(),
            user_id: cart.user_id().to_string(),
            items: cart.items().iter().map(CartItemResponse::from_cart_item).collect(),
            total_items: cart.total_items(),
            total_amount: cart.total_amount().amount(),
            subtotal: totals.subtotal.amount(),
            shipping: totals.shipping.amount(),
            tax: totals.tax.amount(),
            total: totals.total.amount(),
        }
    }
}

/// カート概要用のレスポンスDTO
#[derive(Serialize)]
pub struct CartSummaryResponse {
    pub total_items: u32,
    pub total_amount: i64,
    pub item_count: usize,
}

impl CartSummaryResponse {
    /// ドメインオブジェクトからCartSummaryResponseを作成
    pub fn from_summary(summary: &CartSummary) -> Self {
        Self {
            total_items: summary.total_items,
            total_amount: summary.total_amount.amount(),
            item_count: summary.item_count,
        }
    }
}

/// 配送先住所用のレスポンスDTO
#[derive(Serialize)]
pub struct ShippingAddressResponse {
    pub name: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub district: String,
    pub zip_code: Option<String>,
    pub note: Option<String>,
}

impl ShippingAddressResponse {
    /// ドメインオブジェクトからShippingAddressResponseを作成
    pub fn from_shipping_address(address: &ShippingAddress) -> Self {
        Self {
            name: address.recipient_name().to_string(),
            phone: address.phone().to_string(),
            street: address.street().to_string(),
            city: address.city().to_string(),
            district: address.district().to_string(),
            zip_code: address.zip_code().map(|s| s.to_string()),
            note: address.note().map(|s| s.to_string()),
        }
    }
}

/// 注文明細用のレスポンスDTO
#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub subtotal: i64,
    pub image: String,
    pub selected_options: SelectedOptionsResponse,
}

impl OrderItemResponse {
    /// ドメインオブジェクトからOrderItemResponseを作成
    pub fn from_order_item(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id().to_string(),
            name: item.name().to_string(),
            quantity: item.quantity(),
            unit_price: item.unit_price().amount(),
            subtotal: item.subtotal().amount(),
            image: item.image().to_string(),
            selected_options: SelectedOptionsResponse::from_options(item.selected_options()),
        }
    }
}

/// 支払い結果用のレスポンスDTO
#[derive(Serialize)]
pub struct PaymentResultResponse {
    pub id: Option<String>,
    pub status: Option<String>,
    pub update_time: Option<String>,
    pub email_address: Option<String>,
}

/// 注文詳細用のレスポンスDTO
#[derive(Serialize)]
pub struct OrderDetailResponse {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub items: Vec<OrderItemResponse>,
    pub shipping_address: ShippingAddressResponse,
    pub payment_method: String,
    pub payment_result: Option<PaymentResultResponse>,
    pub items_price: i64,
    pub tax_price: i64,
    pub shipping_price: i64,
    pub total_price: i64,
    pub status: String,
    pub is_paid: bool,
    pub paid_at: Option<String>,
    pub is_delivered: bool,
    pub delivered_at: Option<String>,
    pub cancel_reason: Option<String>,
    pub tracking_number: Option<String>,
    pub created_at: String,
}

impl OrderDetailResponse {
    /// ドメインオブジェクトからOrderDetailResponseを作成
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            order_number: order.order_number(),
            user_id: order.user_id().to_string(),
            items: order.items().iter().map(OrderItemResponse::from_order_item).collect(),
            shipping_address: ShippingAddressResponse::from_shipping_address(
                order.shipping_address(),
            ),
            payment_method: order.payment_method().to_string(),
            payment_result: order.payment_result().map(|r| PaymentResultResponse {
                id: r.id.clone(),
                status: r.status.clone(),
                update_time: r.update_time.clone(),
                email_address: r.email_address.clone(),
            }),
            items_price: order.items_price().amount(),
            tax_price: order.tax_price().amount(),
            shipping_price: order.shipping_price().amount(),
            total_price: order.total_price().amount(),
            status: order.status().to_string(),
            is_paid: order.is_paid(),
            paid_at: order.paid_at().map(|t| t.to_rfc3339()),
            is_delivered: order.is_delivered(),
            delivered_at: order.delivered_at().map(|t| t.to_rfc3339()),
            cancel_reason: order.cancel_reason().map(|s| s.to_string()),
            tracking_number: order.tracking_number().map(|s| s.to_string()),
            created_at: order.created_at().to_rfc3339(),
        }
    }
}

/// 注文一覧の1件分のレスポンスDTO
#[derive(Serialize)]
pub struct OrderSummaryResponse {
    pub id: String,
    pub order_number: String,
    pub status: String,
    pub is_paid: bool,
    pub total_price: i64,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl OrderSummaryResponse {
    /// ドメインオブジェクトからOrderSummaryResponseを作成
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            order_number: order.order_number(),
            status: order.status().to_string(),
            is_paid: order.is_paid(),
            total_price: order.total_price().amount(),
            created_at: order.created_at().to_rfc3339(),
            items: order.items().iter().map(OrderItemResponse::from_order_item).collect(),
        }
    }
}

/// ページネーションされた注文一覧のレスポンスDTO
#[derive(Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderSummaryResponse>,
    pub page: u32,
    pub pages: u32,
    pub total: u64,
}

impl OrderListResponse {
    /// ページネーション結果からOrderListResponseを作成
    pub fn from_paged(paged: &PagedOrders) -> Self {
        Self {
            orders: paged.orders.iter().map(OrderSummaryResponse::from_order).collect(),
            page: paged.page,
            pages: paged.pages,
            total: paged.total,
        }
    }
}

/// 商品用のレスポンスDTO
#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub stock: u32,
    pub is_active: bool,
    pub main_image: String,
    pub specifications: Option<ProductSpecs>,
}

impl ProductResponse {
    /// ドメインオブジェクトからProductResponseを作成
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id().to_string(),
            name: product.name().to_string(),
            price: product.price().amount(),
            stock: product.stock(),
            is_active: product.is_active(),
            main_image: product.main_image().to_string(),
            specifications: product.specifications().cloned(),
        }
    }
}
