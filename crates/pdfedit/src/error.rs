use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pdfedit_core::EditError;

use crate::storage::StoreError;

/// Errors reported by the HTTP API.
///
/// Serialized into the response body as `{"detail": "..."}`.
#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EditError> for Error {
    fn from(e: EditError) -> Self {
        if e.is_invalid_input() {
            Error::BadRequest(e.to_string())
        } else {
            Error::Internal(e.to_string())
        }
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => Error::NotFound("PDF not found".to_string()),
            other => Error::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{self}");
        }
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use pdfedit_core::ModelError;

    use super::*;

    #[test]
    fn test_edit_errors_map_to_status() {
        let invalid = Error::from(EditError::InvalidHitIndex { index: 3, hits: 1 });
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let page = Error::from(EditError::InvalidPage {
            page: 4,
            page_count: 2,
        });
        assert_eq!(page.status(), StatusCode::BAD_REQUEST);

        let empty = Error::from(EditError::EmptyQuery);
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
        assert_eq!(empty.to_string(), "old_text cannot be empty");

        let broken = Error::from(EditError::Document(ModelError::Failed("bad xref".into())));
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_document_is_not_found() {
        let err = Error::from(StoreError::NotFound("abc".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "PDF not found");
    }

    #[test]
    fn test_response_status() {
        let response = Error::BadRequest("Invalid hit_index".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
