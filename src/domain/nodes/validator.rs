//! Hierarchy validation for network nodes.
//!
//! Validation is an explicit phase, separate from persistence: the functions
//! here perform read-only lookups against an open transaction and return a
//! normalized draft, which the caller then persists in the same transaction.

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{
    domain::nodes::{
        errors::NodesServiceError,
        models::{NewNode, Node, NodeLevel, NodeUpdate, NodeUuid},
    },
    store::Transaction,
};

/// A draft that passed hierarchy and uniqueness validation: the full merged
/// field set, with the level in canonical form and the supplier reference
/// known to resolve. Deliberately carries no debt or creation timestamp;
/// those never come from a draft.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedNode {
    pub level: NodeLevel,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub tax_id: Option<String>,
    pub tax_registration_code: Option<String>,
    pub supplier: Option<NodeUuid>,
}

impl ValidatedNode {
    /// Materialize a [`Node`] from the validated fields plus the values only
    /// the store may decide.
    #[must_use]
    pub fn into_node(self, uuid: NodeUuid, debt: Decimal, created_at: Timestamp) -> Node {
        Node {
            uuid,
            level: self.level,
            name: self.name,
            email: self.email,
            phone: self.phone,
            country: self.country,
            region: self.region,
            city: self.city,
            street: self.street,
            house_number: self.house_number,
            postal_code: self.postal_code,
            tax_id: self.tax_id,
            tax_registration_code: self.tax_registration_code,
            supplier: self.supplier,
            debt,
            created_at,
        }
    }
}

/// Validate a creation draft.
///
/// # Errors
///
/// [`NodesServiceError::ImmutableFieldModified`] when the draft carries a
/// debt value, [`NodesServiceError::InvalidSupplierForLevel`] when the
/// supplier rule is violated, and the `Duplicate*` variants on uniqueness
/// conflicts.
pub fn validate_create(
    draft: &NewNode,
    tx: &Transaction<'_>,
) -> Result<ValidatedNode, NodesServiceError> {
    if draft.debt.is_some() {
        return Err(NodesServiceError::ImmutableFieldModified);
    }

    let candidate = ValidatedNode {
        level: draft.level,
        name: draft.name.clone(),
        email: draft.email.clone(),
        phone: draft.phone.clone(),
        country: draft.country.clone(),
        region: draft.region.clone(),
        city: draft.city.clone(),
        street: draft.street.clone(),
        house_number: draft.house_number.clone(),
        postal_code: draft.postal_code.clone(),
        tax_id: draft.tax_id.clone(),
        tax_registration_code: draft.tax_registration_code.clone(),
        supplier: draft.supplier,
    };

    check(candidate, None, tx)
}

/// Validate an update draft against the stored node it targets.
///
/// Absent fields fall back to the stored value; `supplier` is always taken
/// from the draft (absent clears the reference) and `level` must be present.
///
/// # Errors
///
/// [`NodesServiceError::ValidationRequired`] when the draft omits `level`,
/// plus everything [`validate_create`] can return. Uniqueness checks exclude
/// `existing` itself.
pub fn validate_update(
    draft: &NodeUpdate,
    existing: &Node,
    tx: &Transaction<'_>,
) -> Result<ValidatedNode, NodesServiceError> {
    if draft.debt.is_some() {
        return Err(NodesServiceError::ImmutableFieldModified);
    }

    let Some(level) = draft.level else {
        return Err(NodesServiceError::ValidationRequired("level"));
    };

    let candidate = ValidatedNode {
        level,
        name: draft.name.clone().unwrap_or_else(|| existing.name.clone()),
        email: draft
            .email
            .clone()
            .unwrap_or_else(|| existing.email.clone()),
        phone: draft
            .phone
            .clone()
            .unwrap_or_else(|| existing.phone.clone()),
        country: draft
            .country
            .clone()
            .unwrap_or_else(|| existing.country.clone()),
        region: draft
            .region
            .clone()
            .unwrap_or_else(|| existing.region.clone()),
        city: draft.city.clone().unwrap_or_else(|| existing.city.clone()),
        street: draft
            .street
            .clone()
            .unwrap_or_else(|| existing.street.clone()),
        house_number: draft
            .house_number
            .clone()
            .unwrap_or_else(|| existing.house_number.clone()),
        postal_code: draft
            .postal_code
            .clone()
            .unwrap_or_else(|| existing.postal_code.clone()),
        tax_id: draft.tax_id.clone().or_else(|| existing.tax_id.clone()),
        tax_registration_code: draft
            .tax_registration_code
            .clone()
            .or_else(|| existing.tax_registration_code.clone()),
        supplier: draft.supplier,
    };

    check(candidate, Some(existing), tx)
}

fn check(
    candidate: ValidatedNode,
    existing: Option<&Node>,
    tx: &Transaction<'_>,
) -> Result<ValidatedNode, NodesServiceError> {
    let exclude = existing.map(|node| node.uuid);

    // A node can never supply itself; the stored level would otherwise
    // satisfy the rule during a level-changing update.
    if candidate.supplier.is_some() && candidate.supplier == exclude {
        return Err(NodesServiceError::InvalidSupplierForLevel);
    }

    match (candidate.level.required_supplier_level(), candidate.supplier) {
        (None, None) => {}
        (None, Some(_)) | (Some(_), None) => {
            return Err(NodesServiceError::InvalidSupplierForLevel);
        }
        (Some(required), Some(supplier)) => {
            let supplier = tx
                .node(supplier)
                .ok_or(NodesServiceError::InvalidSupplierForLevel)?;

            if supplier.level != required {
                return Err(NodesServiceError::InvalidSupplierForLevel);
            }
        }
    }

    if tx.node_with_name_level_exists(&candidate.name, candidate.level, exclude) {
        return Err(NodesServiceError::DuplicateNameLevel);
    }

    if tx.node_with_email_exists(&candidate.email, exclude) {
        return Err(NodesServiceError::DuplicateEmail);
    }

    if tx.node_with_phone_exists(&candidate.phone, exclude) {
        return Err(NodesServiceError::DuplicatePhone);
    }

    Ok(candidate)
}
