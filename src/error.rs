use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Entity;
use crate::repo::RepoError;
use crate::validation::ValidationError;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorBody {
    pub status: String, // "fail" for client errors, "error" for server errors
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0} tidak ditemukan")] NotFound(Entity),
    #[error("anda tidak berhak mengakses resource ini")] Forbidden,
    #[error(transparent)] Validation(#[from] ValidationError),
    #[error("Missing authentication")] Unauthorized,
    #[error("permintaan bertabrakan dengan perubahan lain")] Conflict,
    #[error("terjadi kegagalan pada server kami")] Internal,
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(entity) => ApiError::NotFound(entity),
            RepoError::Forbidden(_) => ApiError::Forbidden,
            RepoError::Conflict => ApiError::Conflict,
            RepoError::Database(err) => {
                log::error!("storage failure: {err}");
                ApiError::Internal
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = match self {
            ApiError::Internal => "error",
            _ => "fail",
        };
        HttpResponse::build(self.status_code()).json(ApiErrorBody {
            status: status.to_string(),
            message: self.to_string(),
        })
    }
}
