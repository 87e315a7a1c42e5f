//! Test support.

mod helpers;

pub(crate) use context::TestContext;
pub(crate) use helpers::{
    bare_node, bare_product, create_chain, create_factory, factory_draft, product_draft,
    retail_draft, seller_draft,
};
