use crate::domain::error::DomainError;
use crate::domain::port::RepositoryError;

/// アプリケーション層のエラー型
/// ドメインエラーとリポジトリエラーをラップし、
/// ユースケース固有の失敗（権限なし・未発見・整合性崩れ）を追加する
#[derive(Debug)]
pub enum ApplicationError {
    /// ドメインエラー（ビジネスルール違反）
    DomainError(DomainError),
    /// リポジトリエラー（永続化の失敗）
    RepositoryError(RepositoryError),
    /// エンティティが見つからない
    NotFound(String),
    /// 操作する権限がない（所有者でも管理者でもない）
    Forbidden(String),
    /// 入力値の検証失敗
    Validation(String),
    /// ワークフローが途中で失敗し、注文と在庫の整合性が崩れた。
    /// 通常の4xxとして握りつぶしてはならず、
    /// リコンサイルに必要なコンテキストを付けて通知する
    Inconsistency(String),
}

impl std::fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationError::DomainError(err) => write!(f, "Domain error: {}", err),
            ApplicationError::RepositoryError(err) => write!(f, "Repository error: {}", err),
            ApplicationError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApplicationError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApplicationError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            ApplicationError::Inconsistency(msg) => write!(f, "Inconsistency: {}", msg),
        }
    }
}

impl std::error::Error for ApplicationError {}

// From実装でエラー変換を簡潔に
impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        ApplicationError::DomainError(err)
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        ApplicationError::RepositoryError(err)
    }
}
