use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::models::order::OrderStatus;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Doğrulama hatası")]
    ValidationError(#[from] ValidationErrors),

    /// Business-rule validation failures, already phrased for the user.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{0} bulunamadı")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Sipariş durumu {from} -> {to} olarak değiştirilemez")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("E-posta veya şifre hatalı")]
    InvalidCredentials,

    #[error("Geçersiz veya eksik kimlik doğrulama anahtarı")]
    InvalidToken,

    #[error("Bu işlem için yetkiniz yok")]
    Forbidden,

    #[error("Veritabanı hatası: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Elektronik tablo okunamadı: {0}")]
    Spreadsheet(String),

    #[error("Dahili hata: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt hatası: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT hatası: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::Validation(_)
            | AppError::InvalidStatusTransition { .. }
            | AppError::Spreadsheet(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::JwtError(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The list of messages shown to the client.
    pub fn messages(&self) -> Vec<String> {
        match self {
            AppError::ValidationError(errors) => {
                let mut messages = Vec::new();
                collect_messages(errors, &mut messages);
                messages.sort();
                messages.dedup();
                messages
            }
            AppError::Validation(messages) => messages.clone(),
            AppError::JwtError(_) => vec![AppError::InvalidToken.to_string()],
            e if e.status().is_server_error() => vec!["Beklenmeyen bir hata oluştu.".to_string()],
            e => vec![e.to_string()],
        }
    }
}

/// Walks nested structs and lists too (checkout items are validated per line).
fn collect_messages(errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.extend(field_errors.iter().map(|e| match &e.message {
                    Some(m) => m.to_string(),
                    None => format!("{}: geçersiz değer", field),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect_messages(inner, out);
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("internal server error: {}", self);
        }

        let body = Json(json!({ "errors": self.messages() }));
        (status, body).into_response()
    }
}

/// Maps a unique-violation to `Conflict` and passes everything else through.
pub(crate) fn map_unique_violation(e: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(message());
        }
    }
    e.into()
}

/// Maps a foreign-key violation (row still referenced) to `Conflict`.
pub(crate) fn map_fk_violation(e: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::Conflict(message());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::Validate;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_render_as_message_list() {
        let (status, body) = body_of(AppError::Validation(vec![
            "SKU zaten kullanılıyor: ABC".into(),
            "Fiyat gerekli".into(),
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0], "SKU zaten kullanılıyor: ABC");
        assert_eq!(body["errors"][1], "Fiyat gerekli");
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, body) = body_of(AppError::NotFound("Ürün".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0], "Ürün bulunamadı");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) = body_of(AppError::InternalServerError(anyhow::anyhow!("pool exhausted"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["errors"][0], "Beklenmeyen bir hata oluştu.");
    }

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "Ad zorunludur."))]
        name: String,
    }

    #[tokio::test]
    async fn validator_messages_are_flattened() {
        let errors = Payload { name: String::new() }.validate().unwrap_err();
        let (status, body) = body_of(AppError::ValidationError(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0], "Ad zorunludur.");
    }

    #[derive(Validate)]
    struct Line {
        #[validate(range(min = 1, message = "Adet en az 1 olmalıdır."))]
        quantity: i32,
    }

    #[derive(Validate)]
    struct Cart {
        #[validate(nested)]
        lines: Vec<Line>,
    }

    #[test]
    fn nested_list_errors_are_collected_once() {
        let cart = Cart { lines: vec![Line { quantity: 0 }, Line { quantity: 2 }, Line { quantity: -1 }] };
        let err = AppError::ValidationError(cart.validate().unwrap_err());
        assert_eq!(err.messages(), vec!["Adet en az 1 olmalıdır.".to_string()]);
    }
}
