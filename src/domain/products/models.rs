//! Product Models

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{domain::nodes::models::NodeUuid, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// A product sold by a network node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    /// Unique product identifier, store-assigned.
    pub uuid: ProductUuid,

    /// Product name, unique together with `model`.
    pub name: String,

    /// Model designation.
    pub model: String,

    /// Market release date.
    pub release_date: Date,

    /// Unit price, never negative.
    pub price: Decimal,

    pub manufacturer_country: String,

    /// Owning node; the product is removed when the node is deleted.
    pub node: NodeUuid,
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub model: String,
    pub release_date: Date,
    pub price: Decimal,
    pub manufacturer_country: String,
    pub node: NodeUuid,
}

/// Partial update payload for a product. Absent fields keep their current
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub release_date: Option<Date>,

    #[serde(default)]
    pub price: Option<Decimal>,

    #[serde(default)]
    pub manufacturer_country: Option<String>,

    #[serde(default)]
    pub node: Option<NodeUuid>,
}

/// Listing filter for products. All criteria are conjunctive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub release_date: Option<Date>,

    #[serde(default)]
    pub manufacturer_country: Option<String>,

    #[serde(default)]
    pub node: Option<NodeUuid>,
}
