use encore_core::model::type_enum::EntityKind;
use encore_core::CatalogError;
use hyper::{Method, StatusCode};
use thiserror::Error;

pub use crate::http::error::HttpError;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// A store failure, reported to the client only as `message`.
    #[error("{message}")]
    Store {
        message: String,
        #[source]
        source: sea_orm::DbErr,
    },
    #[error("Http error: {0}")]
    Http(#[from] HttpError),
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Unsupported content type: {0}")]
    UnsupportedMediaType(String),
    #[error("Wrong id: {0}")]
    WrongId(String),
    #[error("No such {0} {1}")]
    NoSuch(EntityKind, i64),
    #[error("No route for {0}")]
    NoRoute(String),
    #[error("Method {0} not allowed")]
    MethodNotAllowed(Method),
}

impl ProcessError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProcessError::Catalog(e) => match e {
                CatalogError::Invalid(_) | CatalogError::MissingReference { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
                CatalogError::InUse { .. } => StatusCode::CONFLICT,
                CatalogError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ProcessError::Store { .. } | ProcessError::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProcessError::Http(HttpError::BodyTooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            ProcessError::Http(_) | ProcessError::Decode(_) => StatusCode::BAD_REQUEST,
            ProcessError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ProcessError::WrongId(_) | ProcessError::NoSuch(..) | ProcessError::NoRoute(_) => {
                StatusCode::NOT_FOUND
            }
            ProcessError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Text safe to show to the client. Store details stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            ProcessError::Catalog(CatalogError::Db(_)) | ProcessError::Encode(_) => {
                "An error occurred.".to_string()
            }
            ProcessError::Catalog(CatalogError::Invalid(_)) => "Invalid input.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Turns store failures into a generic `what` message.
pub trait OrFail<T> {
    fn or_fail<F: FnOnce() -> String>(self, what: F) -> Result<T, ProcessError>;
}

impl<T> OrFail<T> for Result<T, CatalogError> {
    fn or_fail<F: FnOnce() -> String>(self, what: F) -> Result<T, ProcessError> {
        self.map_err(|e| match e {
            CatalogError::Db(source) => ProcessError::Store {
                message: format!("An error occurred. {}", what()),
                source,
            },
            other => ProcessError::Catalog(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_core::ValidationErrors;

    #[test]
    fn test_status_mapping() {
        let invalid: ProcessError = CatalogError::Invalid(ValidationErrors::default()).into();
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let in_use: ProcessError = CatalogError::InUse {
            kind: EntityKind::Venue,
            id: 1,
            shows: 2,
        }
        .into();
        assert_eq!(in_use.status(), StatusCode::CONFLICT);

        let too_large = ProcessError::Http(HttpError::BodyTooLarge(10));
        assert_eq!(too_large.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_store_failure_hides_details() {
        let failed: Result<(), _> =
            Err(CatalogError::Db(sea_orm::DbErr::Custom("disk I/O error".into())));
        let err = failed
            .or_fail(|| "Venue The Musical Hop could not be listed.".to_string())
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.public_message(),
            "An error occurred. Venue The Musical Hop could not be listed."
        );
    }
}
