//! Node Models

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Node UUID
pub type NodeUuid = TypedUuid<Node>;

/// Position of a node in the three-level distribution hierarchy.
///
/// Serialized as its wire integer (0, 1, 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NodeLevel {
    /// Level 0: manufactures products, sources from nobody.
    Factory,

    /// Level 1: sources from a factory.
    RetailNetwork,

    /// Level 2: sources from a retail network.
    IndividualSeller,
}

impl NodeLevel {
    /// The level a supplier of this node must have, or `None` when the node
    /// may not have a supplier at all.
    #[must_use]
    pub const fn required_supplier_level(self) -> Option<Self> {
        match self {
            Self::Factory => None,
            Self::RetailNetwork => Some(Self::Factory),
            Self::IndividualSeller => Some(Self::RetailNetwork),
        }
    }

    /// The integer form used on the wire.
    #[must_use]
    pub const fn as_wire(self) -> u8 {
        match self {
            Self::Factory => 0,
            Self::RetailNetwork => 1,
            Self::IndividualSeller => 2,
        }
    }
}

/// Raised when a wire integer does not name a hierarchy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown network level: {0}")]
pub struct UnknownLevel(pub u8);

impl TryFrom<u8> for NodeLevel {
    type Error = UnknownLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Factory),
            1 => Ok(Self::RetailNetwork),
            2 => Ok(Self::IndividualSeller),
            other => Err(UnknownLevel(other)),
        }
    }
}

impl From<NodeLevel> for u8 {
    fn from(value: NodeLevel) -> Self {
        value.as_wire()
    }
}

/// A persisted hierarchy node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Unique node identifier, store-assigned.
    pub uuid: NodeUuid,

    /// Hierarchy level.
    pub level: NodeLevel,

    /// Display name, unique per (name, level).
    pub name: String,

    /// Contact email, globally unique.
    pub email: String,

    /// Contact phone, globally unique.
    pub phone: String,

    pub country: String,
    pub region: String,
    pub city: String,
    pub street: String,
    pub house_number: String,
    pub postal_code: String,

    /// Tax identifier, where registered.
    pub tax_id: Option<String>,

    /// Tax registration code, where registered.
    pub tax_registration_code: Option<String>,

    /// The node one level up that this node sources from.
    pub supplier: Option<NodeUuid>,

    /// Outstanding debt towards the supplier. Only administrative
    /// operations may change this; the public update path never does.
    pub debt: Decimal,

    /// Creation timestamp, immutable.
    pub created_at: Timestamp,
}

/// Payload for creating a node.
///
/// `debt` is not a settable field: it exists here only so that an external
/// caller supplying one can be detected and rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNode {
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

    #[serde(default)]
    pub tax_id: Option<String>,

    #[serde(default)]
    pub tax_registration_code: Option<String>,

    #[serde(default)]
    pub supplier: Option<NodeUuid>,

    #[serde(default)]
    pub debt: Option<Decimal>,
}

/// Partial update payload for a node.
///
/// Absent fields keep their current value, except `supplier`, which is
/// always re-applied (absent clears the reference), and `level`, which the
/// public update path requires. As on [`NewNode`], `debt` only exists to be
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdate {
    #[serde(default)]
    pub level: Option<NodeLevel>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub street: Option<String>,

    #[serde(default)]
    pub house_number: Option<String>,

    #[serde(default)]
    pub postal_code: Option<String>,

    #[serde(default)]
    pub tax_id: Option<String>,

    #[serde(default)]
    pub tax_registration_code: Option<String>,

    #[serde(default)]
    pub supplier: Option<NodeUuid>,

    #[serde(default)]
    pub debt: Option<Decimal>,
}

/// Listing filter for nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeFilter {
    /// Restrict to nodes in this country. Country-filtered listings never
    /// expose individual sellers.
    #[serde(default)]
    pub country: Option<String>,
}
