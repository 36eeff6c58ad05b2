use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapter::driver::request_dto::{
    AddCartItemRequest, AdminOrdersQueryParams, CancelOrderRequest, CreateOrderRequest,
    CreateProductRequest, OrdersQueryParams, PayOrderRequest, UpdateCartItemRequest,
    UpdateOrderStatusRequest,
};
use crate::adapter::driver::response_dto::{
    CartResponse, CartSummaryResponse, OrderDetailResponse, OrderListResponse, ProductResponse,
};
use crate::application::service::{
    CartApplicationService, OrderApplicationService, ProductApplicationService,
};
use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{
    CartItemId, Money, OrderId, OrderStatus, PaymentMethod, PaymentResult, Product, ProductId,
    ShippingAddress, UserId, MAX_LINE_QUANTITY, MIN_LINE_QUANTITY,
};

/// エラーレスポンスDTO
#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

/// 認証コラボレーターが付与するロール
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Admin,
}

/// リクエストに付随する認証済み主体
/// 上流のゲートウェイが設定する x-user-id / x-user-role ヘッダーを信用し、
/// このコアでは資格情報の再検証は行わない
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let unauthorized = || {
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiError {
                    error: "Chưa đăng nhập".to_string(),
                    code: "UNAUTHORIZED".to_string(),
                }),
            )
        };

        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .map(UserId::from_uuid)
            .ok_or_else(unauthorized)?;

        // ロールヘッダーがない場合は一般顧客として扱う
        let role = match parts
            .headers
            .get("x-user-role")
            .and_then(|value| value.to_str().ok())
        {
            None | Some("customer") => Role::Customer,
            Some("admin") => Role::Admin,
            Some(_) => return Err(unauthorized()),
        };

        Ok(Principal { user_id, role })
    }
}

/// アプリケーションサービスを含む状態
#[derive(Clone)]
pub struct AppState {
    pub cart_service: Arc<CartApplicationService>,
    pub order_service: Arc<OrderApplicationService>,
    pub product_service: Arc<ProductApplicationService>,
}

/// REST APIルーターを作成
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        // カート
        .route("/cart", get(get_cart).post(add_cart_item).delete(clear_cart))
        .route("/cart/summary", get(get_cart_summary))
        .route(
            "/cart/:item_id",
            put(update_cart_item).delete(remove_cart_item),
        )
        // 注文
        .route("/orders", post(create_order).get(get_user_orders))
        .route("/orders/admin/all", get(get_all_orders))
        .route("/orders/:order_id", get(get_order).delete(delete_order))
        .route("/orders/:order_id/status", put(update_order_status))
        .route("/orders/:order_id/cancel", put(cancel_order))
        .route("/orders/:order_id/pay", put(pay_order))
        // 商品（シード用。カタログ管理は外部コラボレーターの責務）
        .route("/products", post(create_product))
        .route("/products/:product_id", get(get_product))
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "sportshop-order-management",
        "version": "0.1.0"
    }))
}

// 管理者権限を要求するヘルパー
fn require_admin(principal: &Principal) -> Result<(), (StatusCode, Json<ApiError>)> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(ApiError {
                error: "Không có quyền truy cập".to_string(),
                code: "FORBIDDEN".to_string(),
            }),
        ))
    }
}

// 数量の範囲チェック（1〜100）
fn validate_quantity(quantity: u32) -> Result<(), (StatusCode, Json<ApiError>)> {
    if (MIN_LINE_QUANTITY..=MAX_LINE_QUANTITY).contains(&quantity) {
        Ok(())
    } else {
        Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "Số lượng phải từ 1-100".to_string(),
                code: "INVALID_QUANTITY".to_string(),
            }),
        ))
    }
}

// カート取得エンドポイント
async fn get_cart(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<CartResponse>, (StatusCode, Json<ApiError>)> {
    match state.cart_service.get_cart(principal.user_id).await {
        Ok(cart) => Ok(Json(CartResponse::from_cart(&cart))),
        Err(err) => Err(map_application_error(err)),
    }
}

// カート概要取得エンドポイント
async fn get_cart_summary(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<CartSummaryResponse>, (StatusCode, Json<ApiError>)> {
    match state.cart_service.get_summary(principal.user_id).await {
        Ok(summary) => Ok(Json(CartSummaryResponse::from_summary(&summary))),
        Err(err) => Err(map_application_error(err)),
    }
}

// カート追加エンドポイント
async fn add_cart_item(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<AddCartItemRequest>,
) -> Result<Json<CartResponse>, (StatusCode, Json<ApiError>)> {
    validate_quantity(request.quantity)?;

    let product_id = ProductId::from_uuid(request.product_id);
    let options = request
        .selected_options
        .unwrap_or_default()
        .into_domain();

    match state
        .cart_service
        .add_item(principal.user_id, product_id, request.quantity, options)
        .await
    {
        Ok(cart) => Ok(Json(CartResponse::from_cart(&cart))),
        Err(err) => Err(map_application_error(err)),
    }
}

// カート明細の数量変更エンドポイント
async fn update_cart_item(
    State(state): State<AppState>,
    principal: Principal,
    Path(item_id): Path<Uuid>,
    Json(request): Json<UpdateCartItemRequest>,
) -> Result<Json<CartResponse>, (StatusCode, Json<ApiError>)> {
    validate_quantity(request.quantity)?;

    let item_id = CartItemId::from_uuid(item_id);
    match state
        .cart_service
        .update_item_quantity(principal.user_id, item_id, request.quantity)
        .await
    {
        Ok(cart) => Ok(Json(CartResponse::from_cart(&cart))),
        Err(err) => Err(map_application_error(err)),
    }
}

// カート明細削除エンドポイント（冪等）
async fn remove_cart_item(
    State(state): State<AppState>,
    principal: Principal,
    Path(item_id): Path<Uuid>,
) -> Result<Json<CartResponse>, (StatusCode, Json<ApiError>)> {
    let item_id = CartItemId::from_uuid(item_id);
    match state
        .cart_service
        .remove_item(principal.user_id, item_id)
        .await
    {
        Ok(cart) => Ok(Json(CartResponse::from_cart(&cart))),
        Err(err) => Err(map_application_error(err)),
    }
}

// カートクリアエンドポイント
async fn clear_cart(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiError>)> {
    match state.cart_service.clear_cart(principal.user_id).await {
        Ok(_) => Ok(Json(serde_json::json!({
            "message": "Giỏ hàng đã được làm trống"
        }))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 注文作成エンドポイント
async fn create_order(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDetailResponse>), (StatusCode, Json<ApiError>)> {
    let address = request.shipping_address;
    let shipping_address = match ShippingAddress::new(
        address.name,
        address.phone,
        address.street,
        address.city,
        address.district,
        address.zip_code,
        request.note,
    ) {
        Ok(address) => address,
        Err(err) => return Err(map_domain_error(err)),
    };

    let payment_method = match PaymentMethod::from_string(&request.payment_method) {
        Ok(method) => method,
        Err(_) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError {
                    error: "Phương thức thanh toán không hợp lệ".to_string(),
                    code: "INVALID_PAYMENT_METHOD".to_string(),
                }),
            ))
        }
    };

    match state
        .order_service
        .place_order(principal.user_id, shipping_address, payment_method)
        .await
    {
        Ok(order) => Ok((
            StatusCode::CREATED,
            Json(OrderDetailResponse::from_order(&order)),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 自分の注文一覧取得エンドポイント
async fn get_user_orders(
    State(state): State<AppState>,
    principal: Principal,
    query: Result<Query<OrdersQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<OrderListResponse>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "Tham số không hợp lệ".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;

    match state
        .order_service
        .get_user_orders(principal.user_id, params.page.unwrap_or(1))
        .await
    {
        Ok(paged) => Ok(Json(OrderListResponse::from_paged(&paged))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 全注文一覧取得エンドポイント（管理者のみ）
async fn get_all_orders(
    State(state): State<AppState>,
    principal: Principal,
    query: Result<Query<AdminOrdersQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<OrderListResponse>, (StatusCode, Json<ApiError>)> {
    require_admin(&principal)?;

    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "Tham số không hợp lệ".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;

    let status = match params.status.as_deref() {
        Some(status_str) => match OrderStatus::from_string(status_str) {
            Ok(status) => Some(status),
            Err(_) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ApiError {
                        error: "Trạng thái không hợp lệ".to_string(),
                        code: "INVALID_STATUS".to_string(),
                    }),
                ))
            }
        },
        None => None,
    };

    match state
        .order_service
        .get_all_orders(status, params.page.unwrap_or(1))
        .await
    {
        Ok(paged) => Ok(Json(OrderListResponse::from_paged(&paged))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 注文詳細取得エンドポイント（所有者または管理者のみ）
async fn get_order(
    State(state): State<AppState>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetailResponse>, (StatusCode, Json<ApiError>)> {
    let order_id = OrderId::from_uuid(order_id);

    match state
        .order_service
        .get_order(order_id, principal.user_id, principal.is_admin())
        .await
    {
        Ok(order) => Ok(Json(OrderDetailResponse::from_order(&order))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 注文ステータス変更エンドポイント（管理者のみ）
async fn update_order_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderDetailResponse>, (StatusCode, Json<ApiError>)> {
    require_admin(&principal)?;

    let order_id = OrderId::from_uuid(order_id);
    let status = match OrderStatus::from_string(&request.status) {
        Ok(status) => status,
        Err(_) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError {
                    error: "Trạng thái không hợp lệ".to_string(),
                    code: "INVALID_STATUS".to_string(),
                }),
            ))
        }
    };

    match state
        .order_service
        .update_order_status(order_id, status, request.note, request.tracking_number)
        .await
    {
        Ok(order) => Ok(Json(OrderDetailResponse::from_order(&order))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 注文キャンセルエンドポイント（所有者のみ）
async fn cancel_order(
    State(state): State<AppState>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
    Json(request): Json<CancelOrderRequest>,
) -> Result<Json<OrderDetailResponse>, (StatusCode, Json<ApiError>)> {
    let order_id = OrderId::from_uuid(order_id);

    match state
        .order_service
        .cancel_order(order_id, principal.user_id, &request.reason)
        .await
    {
        Ok(order) => Ok(Json(OrderDetailResponse::from_order(&order))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 支払い記録エンドポイント（管理者のみ）
async fn pay_order(
    State(state): State<AppState>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
    Json(request): Json<PayOrderRequest>,
) -> Result<Json<OrderDetailResponse>, (StatusCode, Json<ApiError>)> {
    require_admin(&principal)?;

    let order_id = OrderId::from_uuid(order_id);
    let payment_result = PaymentResult {
        id: request.payment_result.id,
        status: request.payment_result.status,
        update_time: request.payment_result.update_time,
        email_address: request.payment_result.email_address,
    };

    match state
        .order_service
        .mark_order_as_paid(order_id, payment_result)
        .await
    {
        Ok(order) => Ok(Json(OrderDetailResponse::from_order(&order))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 注文削除エンドポイント（管理者のみ）
// 在庫が引き当てられたままの注文は削除前に在庫を返却する
async fn delete_order(
    State(state): State<AppState>,
    principal: Principal,
    Path(order_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiError>)> {
    require_admin(&principal)?;

    let order_id = OrderId::from_uuid(order_id);
    match state.order_service.delete_order(order_id).await {
        Ok(()) => Ok(Json(serde_json::json!({
            "message": "Đơn hàng đã được xóa"
        }))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 商品登録エンドポイント（管理者のみ・シード用）
async fn create_product(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), (StatusCode, Json<ApiError>)> {
    require_admin(&principal)?;

    let product_id = request
        .id
        .map(ProductId::from_uuid)
        .unwrap_or_else(ProductId::new);

    let product = match Product::new(
        product_id,
        request.name,
        Money::vnd(request.price),
        request.stock,
        request.is_active.unwrap_or(true),
        request.main_image,
        request.specifications,
    ) {
        Ok(product) => product,
        Err(err) => return Err(map_domain_error(err)),
    };

    match state.product_service.create_product(&product).await {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(ProductResponse::from_product(&product)),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 商品取得エンドポイント
async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ProductResponse>, (StatusCode, Json<ApiError>)> {
    let product_id = ProductId::from_uuid(product_id);

    match state.product_service.get_product(product_id).await {
        Ok(Some(product)) => Ok(Json(ProductResponse::from_product(&product))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "Sản phẩm không tồn tại".to_string(),
                code: "PRODUCT_NOT_FOUND".to_string(),
            }),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ApplicationError::DomainError(domain_err) => map_domain_error(domain_err),
        ApplicationError::RepositoryError(repo_err) => {
            // ストレージ層のエラー内容はクライアントに出さない
            tracing::error!(error = %repo_err, "repository error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError {
                    error: "Lỗi server".to_string(),
                    code: "REPOSITORY_ERROR".to_string(),
                }),
            )
        }
        ApplicationError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: msg,
                code: "NOT_FOUND".to_string(),
            }),
        ),
        ApplicationError::Forbidden(msg) => (
            StatusCode::FORBIDDEN,
            Json(ApiError {
                error: msg,
                code: "FORBIDDEN".to_string(),
            }),
        ),
        ApplicationError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "VALIDATION_ERROR".to_string(),
            }),
        ),
        ApplicationError::Inconsistency(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: msg,
                code: "INCONSISTENCY".to_string(),
            }),
        ),
    }
}

// ドメインエラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_domain_error(domain_err: DomainError) -> (StatusCode, Json<ApiError>) {
    match domain_err {
        DomainError::InvalidQuantity => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "Số lượng phải từ 1-100".to_string(),
                code: "INVALID_QUANTITY".to_string(),
            }),
        ),
        DomainError::InvalidPrice => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "Giá không được âm".to_string(),
                code: "INVALID_PRICE".to_string(),
            }),
        ),
        DomainError::InvalidAddress(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_ADDRESS".to_string(),
            }),
        ),
        DomainError::OrderValidation(_) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "Giỏ hàng trống".to_string(),
                code: "ORDER_VALIDATION".to_string(),
            }),
        ),
        DomainError::InvalidOrderState(_) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "Không thể hủy đơn hàng ở trạng thái này".to_string(),
                code: "INVALID_ORDER_STATE".to_string(),
            }),
        ),
        DomainError::InvalidStatusTransition { from, to } => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: format!("Không thể chuyển trạng thái từ {} sang {}", from, to),
                code: "INVALID_STATUS_TRANSITION".to_string(),
            }),
        ),
        DomainError::InvalidCancelReason => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "Lý do hủy phải từ 10-500 ký tự".to_string(),
                code: "INVALID_CANCEL_REASON".to_string(),
            }),
        ),
        DomainError::AlreadyPaid => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "Đơn hàng đã được thanh toán".to_string(),
                code: "ALREADY_PAID".to_string(),
            }),
        ),
        DomainError::OutOfStock {
            product_name,
            available,
        } => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: format!("Sản phẩm {} chỉ còn {} sản phẩm", product_name, available),
                code: "OUT_OF_STOCK".to_string(),
            }),
        ),
        DomainError::ProductUnavailable { product_name } => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: format!("Sản phẩm {} không còn bán", product_name),
                code: "PRODUCT_UNAVAILABLE".to_string(),
            }),
        ),
        DomainError::CartItemNotFound => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "Sản phẩm không có trong giỏ hàng".to_string(),
                code: "CART_ITEM_NOT_FOUND".to_string(),
            }),
        ),
        DomainError::CurrencyMismatch => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "Đơn vị tiền tệ không hợp lệ".to_string(),
                code: "CURRENCY_MISMATCH".to_string(),
            }),
        ),
        DomainError::InvalidValue(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_VALUE".to_string(),
            }),
        ),
        DomainError::StockInconsistency(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: msg,
                code: "STOCK_INCONSISTENCY".to_string(),
            }),
        ),
        DomainError::RepositoryFailure(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: "Lỗi server".to_string(),
                code: "REPOSITORY_ERROR".to_string(),
            }),
        ),
    }
}
