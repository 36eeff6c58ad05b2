// REST APIサーフェスのテスト
// インメモリリポジトリを注入したルーターをaxum-testで叩き、
// ステータスコードとエラーボディのマッピングを検証する

mod common;

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use common::{active_product, inactive_product, sample_address, Fixture};
use serde_json::{json, Value};
use sportshop_order_management::adapter::driver::rest_api::{create_router, AppState};
use sportshop_order_management::domain::model::{PaymentMethod, SelectedOptions, UserId};
use uuid::Uuid;

fn test_server(fixture: &Fixture) -> TestServer {
    let state = AppState {
        cart_service: fixture.cart_service.clone(),
        order_service: fixture.order_service.clone(),
        product_service: fixture.product_service.clone(),
    };
    TestServer::new(create_router().with_state(state)).unwrap()
}

fn user_header(user_id: UserId) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-user-id"),
        HeaderValue::from_str(&user_id.to_string()).unwrap(),
    )
}

fn admin_header() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-user-role"),
        HeaderValue::from_static("admin"),
    )
}

/// 注文用の標準的なリクエストボディ
fn order_body() -> Value {
    json!({
        "shipping_address": {
            "name": "Nguyễn Văn An",
            "phone": "0912345678",
            "street": "12 Lê Lợi",
            "city": "Hồ Chí Minh",
            "district": "Quận 1"
        },
        "payment_method": "cod"
    })
}

#[tokio::test]
async fn test_request_without_principal_is_unauthorized() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);

    let response = server.get("/cart").await;

    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_get_cart_lazily_creates_empty_cart() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let user_id = UserId::new();
    let (name, value) = user_header(user_id);

    let response = server.get("/cart").add_header(name, value).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["total_items"], 0);
    assert_eq!(body["subtotal"], 0);
    assert_eq!(body["shipping"], 0);
    assert_eq!(body["tax"], 0);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_add_to_cart_returns_preview_totals() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let user_id = UserId::new();

    let product = active_product("Vợt cầu lông Yonex Astrox 88D", 600_000, 10);
    let product_id = product.id();
    fixture.products.add_product(product).await;

    let (name, value) = user_header(user_id);
    let response = server
        .post("/cart")
        .add_header(name, value)
        .json(&json!({
            "product_id": product_id.to_string(),
            "quantity": 3
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    // 小計 1,800,000（閾値 2,000,000 以下・0 より大きい）:
    // 配送料 30,000 / 税 8% = 144,000 / 合計 1,974,000
    assert_eq!(body["subtotal"], 1_800_000);
    assert_eq!(body["shipping"], 30_000);
    assert_eq!(body["tax"], 144_000);
    assert_eq!(body["total"], 1_974_000);
}

#[tokio::test]
async fn test_add_to_cart_rejects_quantity_out_of_range() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let user_id = UserId::new();

    let product = active_product("Vợt cầu lông Yonex Astrox 88D", 600_000, 10);
    let product_id = product.id();
    fixture.products.add_product(product).await;

    for quantity in [0u32, 101] {
        let (name, value) = user_header(user_id);
        let response = server
            .post("/cart")
            .add_header(name, value)
            .json(&json!({
                "product_id": product_id.to_string(),
                "quantity": quantity
            }))
            .await;

        assert_eq!(response.status_code(), 400);
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_QUANTITY");
    }
}

#[tokio::test]
async fn test_add_unknown_or_inactive_product_is_not_found() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let user_id = UserId::new();

    let discontinued = inactive_product("Vợt cầu lông cũ", 100_000, 5);
    let discontinued_id = discontinued.id();
    fixture.products.add_product(discontinued).await;

    for product_id in [Uuid::new_v4().to_string(), discontinued_id.to_string()] {
        let (name, value) = user_header(user_id);
        let response = server
            .post("/cart")
            .add_header(name, value)
            .json(&json!({
                "product_id": product_id,
                "quantity": 1
            }))
            .await;

        assert_eq!(response.status_code(), 404);
        let body: Value = response.json();
        assert_eq!(body["error"], "Sản phẩm không tồn tại");
    }
}

#[tokio::test]
async fn test_add_to_cart_exceeding_stock_is_rejected() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let user_id = UserId::new();

    let product = active_product("Vợt cầu lông Yonex Astrox 88D", 600_000, 2);
    let product_id = product.id();
    fixture.products.add_product(product).await;

    let (name, value) = user_header(user_id);
    let response = server
        .post("/cart")
        .add_header(name, value)
        .json(&json!({
            "product_id": product_id.to_string(),
            "quantity": 3
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "OUT_OF_STOCK");
}

#[tokio::test]
async fn test_update_cart_item_not_found_cases() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let user_id = UserId::new();

    // カート自体が存在しない
    let (name, value) = user_header(user_id);
    let response = server
        .put(&format!("/cart/{}", Uuid::new_v4()))
        .add_header(name, value)
        .json(&json!({ "quantity": 2 }))
        .await;
    assert_eq!(response.status_code(), 404);

    // カートはあるが明細がない
    let product = active_product("Vợt cầu lông Yonex Astrox 88D", 600_000, 10);
    let product_id = product.id();
    fixture.products.add_product(product).await;
    fixture
        .cart_service
        .add_item(user_id, product_id, 1, SelectedOptions::none())
        .await
        .unwrap();

    let (name, value) = user_header(user_id);
    let response = server
        .put(&format!("/cart/{}", Uuid::new_v4()))
        .add_header(name, value)
        .json(&json!({ "quantity": 2 }))
        .await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["error"], "Sản phẩm không có trong giỏ hàng");
}

#[tokio::test]
async fn test_remove_cart_item_is_idempotent() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let user_id = UserId::new();

    let product = active_product("Vợt cầu lông Yonex Astrox 88D", 600_000, 10);
    let product_id = product.id();
    fixture.products.add_product(product).await;

    let cart = fixture
        .cart_service
        .add_item(user_id, product_id, 1, SelectedOptions::none())
        .await
        .unwrap();
    let item_id = cart.items()[0].id();

    // 1回目の削除で明細が消える
    let (name, value) = user_header(user_id);
    let response = server
        .delete(&format!("/cart/{}", item_id))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);

    // 2回目も200で、カートは空のまま
    let (name, value) = user_header(user_id);
    let response = server
        .delete(&format!("/cart/{}", item_id))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["total_items"], 0);
}

#[tokio::test]
async fn test_cart_summary_without_cart_returns_zeroes() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let (name, value) = user_header(UserId::new());

    let response = server.get("/cart/summary").add_header(name, value).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["total_items"], 0);
    assert_eq!(body["total_amount"], 0);
    assert_eq!(body["item_count"], 0);
}

#[tokio::test]
async fn test_place_order_created_and_listed() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let user_id = UserId::new();

    let product = active_product("Vợt cầu lông Yonex Astrox 88D", 600_000, 10);
    let product_id = product.id();
    fixture.products.add_product(product).await;
    fixture
        .cart_service
        .add_item(user_id, product_id, 2, SelectedOptions::none())
        .await
        .unwrap();

    let (name, value) = user_header(user_id);
    let response = server
        .post("/orders")
        .add_header(name, value)
        .json(&order_body())
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["status"], "pending");
    assert_eq!(body["items_price"], 1_200_000);
    assert_eq!(body["tax_price"], 120_000);
    assert_eq!(body["shipping_price"], 0);
    assert_eq!(body["total_price"], 1_320_000);
    assert_eq!(body["order_number"].as_str().unwrap().len(), 8);

    // 在庫が減り、カートは空になっている
    assert_eq!(fixture.products.stock_of(product_id).await, 8);

    // 一覧にページネーション付きで出てくる
    let (name, value) = user_header(user_id);
    let response = server.get("/orders").add_header(name, value).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pages"], 1);
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_place_order_with_empty_cart_is_bad_request() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let (name, value) = user_header(UserId::new());

    let response = server
        .post("/orders")
        .add_header(name, value)
        .json(&order_body())
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Giỏ hàng trống");
}

#[tokio::test]
async fn test_place_order_with_invalid_payment_method() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let (name, value) = user_header(UserId::new());

    let mut body = order_body();
    body["payment_method"] = json!("paypal");

    let response = server.post("/orders").add_header(name, value).json(&body).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_PAYMENT_METHOD");
}

#[tokio::test]
async fn test_place_order_with_invalid_address() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let (name, value) = user_header(UserId::new());

    let mut body = order_body();
    body["shipping_address"]["phone"] = json!("abc");

    let response = server.post("/orders").add_header(name, value).json(&body).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_ADDRESS");
}

#[tokio::test]
async fn test_get_order_owner_or_admin_only() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let owner = UserId::new();
    let stranger = UserId::new();

    let product = active_product("Vợt cầu lông Yonex Astrox 88D", 600_000, 10);
    let product_id = product.id();
    fixture.products.add_product(product).await;
    fixture
        .cart_service
        .add_item(owner, product_id, 1, SelectedOptions::none())
        .await
        .unwrap();
    let order = fixture
        .order_service
        .place_order(owner, sample_address(), PaymentMethod::Cod)
        .await
        .unwrap();

    // 所有者は見える
    let (name, value) = user_header(owner);
    let response = server
        .get(&format!("/orders/{}", order.id()))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), 200);

    // 他人は403
    let (name, value) = user_header(stranger);
    let response = server
        .get(&format!("/orders/{}", order.id()))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), 403);
    let body: Value = response.json();
    assert_eq!(body["error"], "Không có quyền truy cập");

    // 管理者は見える
    let (name, value) = user_header(stranger);
    let (role_name, role_value) = admin_header();
    let response = server
        .get(&format!("/orders/{}", order.id()))
        .add_header(name, value)
        .add_header(role_name, role_value)
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_admin_endpoints_require_admin_role() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let user_id = UserId::new();
    let order_id = Uuid::new_v4();

    // ステータス変更
    let (name, value) = user_header(user_id);
    let response = server
        .put(&format!("/orders/{}/status", order_id))
        .add_header(name, value)
        .json(&json!({ "status": "confirmed" }))
        .await;
    assert_eq!(response.status_code(), 403);

    // 支払い記録
    let (name, value) = user_header(user_id);
    let response = server
        .put(&format!("/orders/{}/pay", order_id))
        .add_header(name, value)
        .json(&json!({ "payment_result": {} }))
        .await;
    assert_eq!(response.status_code(), 403);

    // 注文削除
    let (name, value) = user_header(user_id);
    let response = server
        .delete(&format!("/orders/{}", order_id))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), 403);

    // 管理者向け一覧
    let (name, value) = user_header(user_id);
    let response = server
        .get("/orders/admin/all")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_update_status_with_invalid_value() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let (name, value) = user_header(UserId::new());
    let (role_name, role_value) = admin_header();

    let response = server
        .put(&format!("/orders/{}/status", Uuid::new_v4()))
        .add_header(name, value)
        .add_header(role_name, role_value)
        .json(&json!({ "status": "done" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_STATUS");
}

#[tokio::test]
async fn test_update_status_invalid_transition_is_rejected() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let user_id = UserId::new();

    let product = active_product("Vợt cầu lông Yonex Astrox 88D", 600_000, 10);
    let product_id = product.id();
    fixture.products.add_product(product).await;
    fixture
        .cart_service
        .add_item(user_id, product_id, 1, SelectedOptions::none())
        .await
        .unwrap();
    let order = fixture
        .order_service
        .place_order(user_id, sample_address(), PaymentMethod::Cod)
        .await
        .unwrap();

    let (name, value) = user_header(user_id);
    let (role_name, role_value) = admin_header();
    let response = server
        .put(&format!("/orders/{}/status", order.id()))
        .add_header(name, value)
        .add_header(role_name, role_value)
        .json(&json!({ "status": "delivered" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_STATUS_TRANSITION");
}

#[tokio::test]
async fn test_pay_order_twice_is_rejected() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let user_id = UserId::new();

    let product = active_product("Vợt cầu lông Yonex Astrox 88D", 600_000, 10);
    let product_id = product.id();
    fixture.products.add_product(product).await;
    fixture
        .cart_service
        .add_item(user_id, product_id, 1, SelectedOptions::none())
        .await
        .unwrap();
    let order = fixture
        .order_service
        .place_order(user_id, sample_address(), PaymentMethod::Momo)
        .await
        .unwrap();

    let pay_body = json!({
        "payment_result": {
            "id": "MOMO-123456",
            "status": "completed",
            "update_time": "2024-05-01T10:00:00Z",
            "email_address": "an.nguyen@example.com"
        }
    });

    let (name, value) = user_header(user_id);
    let (role_name, role_value) = admin_header();
    let response = server
        .put(&format!("/orders/{}/pay", order.id()))
        .add_header(name, value)
        .add_header(role_name, role_value)
        .json(&pay_body)
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["is_paid"], true);

    let (name, value) = user_header(user_id);
    let (role_name, role_value) = admin_header();
    let response = server
        .put(&format!("/orders/{}/pay", order.id()))
        .add_header(name, value)
        .add_header(role_name, role_value)
        .json(&pay_body)
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Đơn hàng đã được thanh toán");
}

#[tokio::test]
async fn test_cancel_order_via_api_restores_stock() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let user_id = UserId::new();

    let product = active_product("Vợt cầu lông Yonex Astrox 88D", 600_000, 10);
    let product_id = product.id();
    fixture.products.add_product(product).await;
    fixture
        .cart_service
        .add_item(user_id, product_id, 2, SelectedOptions::none())
        .await
        .unwrap();
    let order = fixture
        .order_service
        .place_order(user_id, sample_address(), PaymentMethod::Cod)
        .await
        .unwrap();
    assert_eq!(fixture.products.stock_of(product_id).await, 8);

    // 短すぎる理由は400
    let (name, value) = user_header(user_id);
    let response = server
        .put(&format!("/orders/{}/cancel", order.id()))
        .add_header(name, value)
        .json(&json!({ "reason": "ngắn quá" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_CANCEL_REASON");

    // 正しい理由ならキャンセルされ、在庫が戻る
    let (name, value) = user_header(user_id);
    let response = server
        .put(&format!("/orders/{}/cancel", order.id()))
        .add_header(name, value)
        .json(&json!({ "reason": "không còn nhu cầu mua nữa" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["cancel_reason"], "không còn nhu cầu mua nữa");
    assert_eq!(fixture.products.stock_of(product_id).await, 10);

    // キャンセル済みの注文は再キャンセルできない
    let (name, value) = user_header(user_id);
    let response = server
        .put(&format!("/orders/{}/cancel", order.id()))
        .add_header(name, value)
        .json(&json!({ "reason": "không còn nhu cầu mua nữa" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_ORDER_STATE");
}

#[tokio::test]
async fn test_admin_delete_order_restores_stock() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let user_id = UserId::new();

    let product = active_product("Vợt cầu lông Yonex Astrox 88D", 600_000, 10);
    let product_id = product.id();
    fixture.products.add_product(product).await;
    fixture
        .cart_service
        .add_item(user_id, product_id, 3, SelectedOptions::none())
        .await
        .unwrap();
    let order = fixture
        .order_service
        .place_order(user_id, sample_address(), PaymentMethod::Cod)
        .await
        .unwrap();
    assert_eq!(fixture.products.stock_of(product_id).await, 7);

    let (name, value) = user_header(user_id);
    let (role_name, role_value) = admin_header();
    let response = server
        .delete(&format!("/orders/{}", order.id()))
        .add_header(name, value)
        .add_header(role_name, role_value)
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(fixture.products.stock_of(product_id).await, 10);

    // 削除後は404
    let (name, value) = user_header(user_id);
    let response = server
        .get(&format!("/orders/{}", order.id()))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_admin_list_filters_by_status() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);
    let user_id = UserId::new();

    let product = active_product("Quấn cán vợt Yonex AC102", 25_000, 100);
    let product_id = product.id();
    fixture.products.add_product(product).await;

    // 2件注文して1件だけキャンセルする
    for _ in 0..2 {
        fixture
            .cart_service
            .add_item(user_id, product_id, 1, SelectedOptions::none())
            .await
            .unwrap();
        fixture
            .order_service
            .place_order(user_id, sample_address(), PaymentMethod::Cod)
            .await
            .unwrap();
    }
    let paged = fixture
        .order_service
        .get_user_orders(user_id, 1)
        .await
        .unwrap();
    fixture
        .order_service
        .cancel_order(paged.orders[0].id(), user_id, "không còn nhu cầu mua nữa")
        .await
        .unwrap();

    let (name, value) = user_header(user_id);
    let (role_name, role_value) = admin_header();
    let response = server
        .get("/orders/admin/all?status=pending")
        .add_header(name, value)
        .add_header(role_name, role_value)
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["orders"][0]["status"], "pending");

    // 不正なステータス値は400
    let (name, value) = user_header(user_id);
    let (role_name, role_value) = admin_header();
    let response = server
        .get("/orders/admin/all?status=finished")
        .add_header(name, value)
        .add_header(role_name, role_value)
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_admin_creates_product_for_seeding() {
    let fixture = Fixture::new();
    let server = test_server(&fixture);

    let (name, value) = user_header(UserId::new());
    let (role_name, role_value) = admin_header();
    let response = server
        .post("/products")
        .add_header(name, value)
        .add_header(role_name, role_value)
        .json(&json!({
            "name": "Vợt cầu lông Yonex Astrox 88D",
            "price": 2_500_000,
            "stock": 10,
            "main_image": "/uploads/astrox-88d.jpg",
            "specifications": {
                "category": "racket",
                "balance": "Head Heavy",
                "flexibility": "stiff",
                "string_tension": "20-28 lbs",
                "shaft_material": "Carbon Fiber",
                "weight": "3U"
            }
        }))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["stock"], 10);
    assert_eq!(body["specifications"]["category"], "racket");

    // 登録した商品は取得できる
    let product_id = body["id"].as_str().unwrap().to_string();
    let response = server.get(&format!("/products/{}", product_id)).await;
    assert_eq!(response.status_code(), 200);
}
