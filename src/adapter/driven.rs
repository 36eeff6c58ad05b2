// 駆動される側アダプター（リポジトリ実装）

mod cart_repository;
mod order_repository;
mod product_repository;

pub use cart_repository::MySqlCartRepository;
pub use order_repository::MySqlOrderRepository;
pub use product_repository::MySqlProductRepository;
