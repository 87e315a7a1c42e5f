//! Role-based access policy.
//!
//! A single explicit table mapping (role, operation) to allow/deny, instead
//! of per-endpoint permission checks scattered through the calling layer.

use serde::{Deserialize, Serialize};

/// Roles an authenticated principal can hold. The set is closed; anything
/// else is unauthenticated and denied everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to every operation, including delete and debt clearing.
    Admin,

    /// Create, read and update; delete denied.
    Manager,

    /// Read only.
    Employee,
}

/// The authenticated actor performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    role: Option<Role>,
}

impl Principal {
    /// A principal authenticated with the given role.
    #[must_use]
    pub const fn authenticated(role: Role) -> Self {
        Self { role: Some(role) }
    }

    /// An unauthenticated (or unknown-role) principal.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { role: None }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.role.is_some()
    }

    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.role
    }
}

/// Operations a principal can attempt against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

/// The kinds of resource the policy gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Node,
    Product,
}

/// Table-driven access policy shared by every service.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Whether `principal` may perform `operation` on `resource`.
    ///
    /// Delete is gated before the role table: only [`Role::Admin`] may
    /// delete, whatever the resource kind.
    #[must_use]
    pub fn authorize(
        &self,
        principal: Principal,
        operation: Operation,
        resource: ResourceKind,
    ) -> bool {
        let Some(role) = principal.role() else {
            return false;
        };

        if operation == Operation::Delete {
            return role == Role::Admin;
        }

        match (role, operation, resource) {
            (Role::Admin, _, _) => true,
            (Role::Manager, Operation::Create | Operation::Read | Operation::Update, _) => true,
            (Role::Employee, Operation::Read, _) => true,
            (Role::Manager | Role::Employee, _, _) => false,
        }
    }

    /// Whether `principal` may perform administrative store operations such
    /// as clearing debt. Never granted below [`Role::Admin`].
    #[must_use]
    pub fn authorize_administrative(&self, principal: Principal) -> bool {
        principal.role() == Some(Role::Admin)
    }
}
