//! Nodes service errors.

use thiserror::Error;

use crate::store::{StoreError, UniqueConstraint};

#[derive(Debug, Error)]
pub enum NodesServiceError {
    #[error("authentication required")]
    Unauthorized,

    #[error("operation not permitted for this role")]
    Forbidden,

    #[error("network node not found")]
    NotFound,

    #[error("supplier level does not match node level")]
    InvalidSupplierForLevel,

    #[error("a node with this name and level already exists")]
    DuplicateNameLevel,

    #[error("a node with this email already exists")]
    DuplicateEmail,

    #[error("a node with this phone already exists")]
    DuplicatePhone,

    #[error("debt cannot be modified through this operation")]
    ImmutableFieldModified,

    #[error("missing required field: {0}")]
    ValidationRequired(&'static str),

    #[error("storage error")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for NodesServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::RowNotFound => Self::NotFound,
            StoreError::UniqueViolation(UniqueConstraint::NodeNameLevel) => Self::DuplicateNameLevel,
            StoreError::UniqueViolation(UniqueConstraint::NodeEmail) => Self::DuplicateEmail,
            StoreError::UniqueViolation(UniqueConstraint::NodePhone) => Self::DuplicatePhone,
            StoreError::ForeignKeyViolation(_) => Self::InvalidSupplierForLevel,
            StoreError::UniqueViolation(UniqueConstraint::ProductNameModel) => Self::Storage(error),
        }
    }
}
