use crate::domain::model::{ProductSpecs, SelectedOptions};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 商品オプション選択のリクエストDTO
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectedOptionsDto {
    pub size: Option<String>,
    pub color: Option<String>,
    pub weight: Option<String>,
}

impl SelectedOptionsDto {
    /// ドメインの値オブジェクトに変換
    pub fn into_domain(self) -> SelectedOptions {
        SelectedOptions {
            size: self.size,
            color: self.color,
            weight: self.weight,
        }
    }
}

/// カート追加用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    pub quantity: u32,
    pub selected_options: Option<SelectedOptionsDto>,
}

/// カート明細の数量変更用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

/// 配送先住所のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct ShippingAddressRequest {
    pub name: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub district: String,
    pub zip_code: Option<String>,
}

/// 注文作成用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub shipping_address: ShippingAddressRequest,
    pub payment_method: String,
    pub note: Option<String>,
}

/// 注文ステータス変更用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
    pub note: Option<String>,
    pub tracking_number: Option<String>,
}

/// 注文キャンセル用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CancelOrderRequest {
    pub reason: String,
}

/// 支払い結果のリクエストDTO
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentResultDto {
    pub id: Option<String>,
    pub status: Option<String>,
    pub update_time: Option<String>,
    pub email_address: Option<String>,
}

/// 支払い記録用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct PayOrderRequest {
    pub payment_result: PaymentResultDto,
}

/// 商品登録用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub id: Option<Uuid>,
    pub name: String,
    pub price: i64,
    pub stock: u32,
    pub main_image: String,
    pub is_active: Option<bool>,
    pub specifications: Option<ProductSpecs>,
}

/// 注文一覧取得用のクエリパラメータ
#[derive(Deserialize)]
pub struct OrdersQueryParams {
    pub page: Option<u32>,
}

/// 管理者向け注文一覧取得用のクエリパラメータ
#[derive(Deserialize)]
pub struct AdminOrdersQueryParams {
    pub page: Option<u32>,
    pub status: Option<String>,
}
