//! Products service errors.

use thiserror::Error;

use crate::store::{StoreError, UniqueConstraint};

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    #[error("authentication required")]
    Unauthorized,

    #[error("operation not permitted for this role")]
    Forbidden,

    #[error("product or owning node not found")]
    NotFound,

    #[error("a product with this name and model already exists")]
    DuplicateProduct,

    #[error("price cannot be negative")]
    InvalidPrice,

    #[error("missing required field: {0}")]
    ValidationRequired(&'static str),

    #[error("storage error")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for ProductsServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::RowNotFound | StoreError::ForeignKeyViolation(_) => Self::NotFound,
            StoreError::UniqueViolation(UniqueConstraint::ProductNameModel) => {
                Self::DuplicateProduct
            }
            StoreError::UniqueViolation(
                UniqueConstraint::NodeNameLevel
                | UniqueConstraint::NodeEmail
                | UniqueConstraint::NodePhone,
            ) => Self::Storage(error),
        }
    }
}
