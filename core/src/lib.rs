pub mod clock;
pub mod db;
pub mod error;
pub mod form;
pub mod model;
pub mod view;

pub use error::{CatalogError, ValidationErrors};
pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
