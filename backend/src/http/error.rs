use http_body_util::LengthLimitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Hyper body error: {0}")]
    HyperBody(#[from] hyper::Error),
    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(usize),
    #[error("Request body error: {0}")]
    Body(String),
}

impl HttpError {
    /// Classifies a failure from a `Limited` request body.
    pub fn from_limited(err: Box<dyn std::error::Error + Send + Sync>, limit: usize) -> Self {
        if err.downcast_ref::<LengthLimitError>().is_some() {
            return HttpError::BodyTooLarge(limit);
        }
        match err.downcast::<hyper::Error>() {
            Ok(e) => HttpError::HyperBody(*e),
            Err(e) => HttpError::Body(e.to_string()),
        }
    }
}
