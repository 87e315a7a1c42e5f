//! Test Helpers
//!
//! Draft and row fixtures. Email and phone are derived from the node name,
//! so distinct names never trip the global uniqueness constraints.

use jiff::{Timestamp, civil::date};
use rust_decimal::Decimal;

use crate::{
    domain::{
        nodes::{
            NodesServiceError, NodesService,
            models::{NewNode, Node, NodeLevel, NodeUuid},
        },
        products::models::{NewProduct, Product, ProductUuid},
    },
    test::TestContext,
};

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

fn node_draft(level: NodeLevel, name: &str, supplier: Option<NodeUuid>) -> NewNode {
    NewNode {
        level,
        name: name.to_string(),
        email: format!("{}@example.com", slug(name)),
        phone: format!("+7 {}", slug(name)),
        country: "Russia".to_string(),
        region: "Moscow Oblast".to_string(),
        city: "Moscow".to_string(),
        street: "Lenina".to_string(),
        house_number: "10".to_string(),
        postal_code: "123456".to_string(),
        tax_id: None,
        tax_registration_code: None,
        supplier,
        debt: None,
    }
}

pub(crate) fn factory_draft(name: &str) -> NewNode {
    node_draft(NodeLevel::Factory, name, None)
}

pub(crate) fn retail_draft(name: &str, supplier: NodeUuid) -> NewNode {
    node_draft(NodeLevel::RetailNetwork, name, Some(supplier))
}

pub(crate) fn seller_draft(name: &str, supplier: NodeUuid) -> NewNode {
    node_draft(NodeLevel::IndividualSeller, name, Some(supplier))
}

/// A fully materialized node row, for tests that drive the store directly.
pub(crate) fn bare_node(name: &str, level: NodeLevel, supplier: Option<NodeUuid>) -> Node {
    Node {
        uuid: NodeUuid::new(),
        level,
        name: name.to_string(),
        email: format!("{}@example.com", slug(name)),
        phone: format!("+7 {}", slug(name)),
        country: "Russia".to_string(),
        region: "Moscow Oblast".to_string(),
        city: "Moscow".to_string(),
        street: "Lenina".to_string(),
        house_number: "10".to_string(),
        postal_code: "123456".to_string(),
        tax_id: None,
        tax_registration_code: None,
        supplier,
        debt: Decimal::ZERO,
        created_at: Timestamp::now(),
    }
}

pub(crate) fn product_draft(name: &str, model: &str, node: NodeUuid) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        model: model.to_string(),
        release_date: date(2024, 1, 15),
        price: Decimal::new(19_999_00, 2),
        manufacturer_country: "Russia".to_string(),
        node,
    }
}

/// A fully materialized product row, for tests that drive the store
/// directly.
pub(crate) fn bare_product(name: &str, model: &str, node: NodeUuid) -> Product {
    Product {
        uuid: ProductUuid::new(),
        name: name.to_string(),
        model: model.to_string(),
        release_date: date(2024, 1, 15),
        price: Decimal::new(19_999_00, 2),
        manufacturer_country: "Russia".to_string(),
        node,
    }
}

pub(crate) async fn create_factory(
    ctx: &TestContext,
    name: &str,
) -> Result<Node, NodesServiceError> {
    ctx.nodes.create_node(ctx.admin, factory_draft(name)).await
}

/// Create a full factory → retail → seller chain.
pub(crate) async fn create_chain(
    ctx: &TestContext,
) -> Result<(Node, Node, Node), NodesServiceError> {
    let factory = create_factory(ctx, "Plant").await?;

    let retail = ctx
        .nodes
        .create_node(ctx.admin, retail_draft("Retail", factory.uuid))
        .await?;

    let seller = ctx
        .nodes
        .create_node(ctx.admin, seller_draft("Seller", retail.uuid))
        .await?;

    Ok((factory, retail, seller))
}
