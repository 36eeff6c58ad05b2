// アプリケーション層
// ユースケースを実装するアプリケーションサービス

pub mod error;
pub mod service;

pub use error::ApplicationError;
