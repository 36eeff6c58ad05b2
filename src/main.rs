use sportshop_order_management::adapter::driven::{
    MySqlCartRepository, MySqlOrderRepository, MySqlProductRepository,
};
use sportshop_order_management::adapter::driver::rest_api::{create_router, AppState};
use sportshop_order_management::adapter::{DatabaseConfig, DatabaseMigration};
use sportshop_order_management::application::service::{
    CartApplicationService, OrderApplicationService, ProductApplicationService,
};
use sportshop_order_management::domain::service::InventoryService;

use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // データベース設定を読み込む
    let config = DatabaseConfig::from_env()?;
    tracing::info!(host = %config.host, port = config.port, "データベース設定を読み込みました");

    // 接続プールを作成
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await?;

    // マイグレーションを実行
    let migration = DatabaseMigration::new(pool.clone());
    migration.run().await?;

    // MySQLリポジトリを作成
    let product_repository = Arc::new(MySqlProductRepository::new(pool.clone()));
    let cart_repository = Arc::new(MySqlCartRepository::new(pool.clone()));
    let order_repository = Arc::new(MySqlOrderRepository::new(pool.clone()));

    // アプリケーションサービスを作成（依存はすべてここで注入する）
    let cart_service = Arc::new(CartApplicationService::new(
        cart_repository.clone(),
        product_repository.clone(),
    ));
    let order_service = Arc::new(OrderApplicationService::new(
        order_repository,
        cart_repository,
        InventoryService::new(product_repository.clone()),
    ));
    let product_service = Arc::new(ProductApplicationService::new(product_repository));

    // アプリケーション状態を作成
    let app_state = AppState {
        cart_service,
        order_service,
        product_service,
    };

    // REST APIルーターを作成
    let app = create_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // サーバーを起動
    let port = std::env::var("SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "注文管理APIサーバーが起動しました");

    axum::serve(listener, app).await?;

    Ok(())
}
