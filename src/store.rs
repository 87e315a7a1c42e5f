//! Transactional in-memory entity store.
//!
//! The store never performs business validation; it only enforces the
//! constraint backstops a relational schema would declare (unique indexes
//! and reference existence), so a raced duplicate is still rejected
//! atomically even if a validator pre-check was bypassed.

use std::sync::Arc;

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::domain::{
    nodes::models::{Node, NodeLevel, NodeUuid},
    products::models::{Product, ProductUuid},
};

/// Unique indexes declared on the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueConstraint {
    /// (name, level) across all nodes.
    NodeNameLevel,

    /// email across all nodes.
    NodeEmail,

    /// phone across all nodes.
    NodePhone,

    /// (name, model) across all products.
    ProductNameModel,
}

/// Storage faults, classified the way a database driver reports constraint
/// violations so services can map them onto their own error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("row not found")]
    RowNotFound,

    #[error("unique constraint violated: {0:?}")]
    UniqueViolation(UniqueConstraint),

    #[error("reference violated: {0}")]
    ForeignKeyViolation(&'static str),
}

#[derive(Debug, Clone)]
struct NodeRow {
    node: Node,
    seq: u64,
}

#[derive(Debug, Clone)]
struct ProductRow {
    product: Product,
    seq: u64,
}

#[derive(Debug, Clone, Default)]
struct State {
    nodes: FxHashMap<NodeUuid, NodeRow>,
    products: FxHashMap<ProductUuid, ProductRow>,
    next_seq: u64,
}

/// Shared handle to the entity store.
///
/// Cloning is cheap; all clones see the same committed state.
#[derive(Debug, Clone, Default)]
pub struct Store {
    state: Arc<RwLock<State>>,
}

impl Store {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a transaction.
    ///
    /// The transaction holds the single writer slot for its whole lifetime,
    /// so the reads a validator performs and the write that follows them are
    /// one atomic unit. Dropping the transaction without [`Transaction::commit`]
    /// discards every change.
    pub async fn begin(&self) -> Transaction<'_> {
        let slot = self.state.write().await;
        let state = slot.clone();

        Transaction { slot, state }
    }
}

/// An in-flight transaction working on a private copy of the committed
/// state.
#[derive(Debug)]
pub struct Transaction<'a> {
    slot: RwLockWriteGuard<'a, State>,
    state: State,
}

impl Transaction<'_> {
    /// Publish the transaction's changes atomically.
    pub fn commit(self) {
        let Self { mut slot, state } = self;

        *slot = state;
    }

    pub fn node(&self, uuid: NodeUuid) -> Option<&Node> {
        self.state.nodes.get(&uuid).map(|row| &row.node)
    }

    pub fn product(&self, uuid: ProductUuid) -> Option<&Product> {
        self.state.products.get(&uuid).map(|row| &row.product)
    }

    /// All nodes, in insertion order.
    #[must_use]
    pub fn nodes_in_order(&self) -> Vec<Node> {
        let mut rows: Vec<&NodeRow> = self.state.nodes.values().collect();
        rows.sort_by_key(|row| row.seq);

        rows.into_iter().map(|row| row.node.clone()).collect()
    }

    /// All products, in insertion order.
    #[must_use]
    pub fn products_in_order(&self) -> Vec<Product> {
        let mut rows: Vec<&ProductRow> = self.state.products.values().collect();
        rows.sort_by_key(|row| row.seq);

        rows.into_iter().map(|row| row.product.clone()).collect()
    }

    pub fn node_with_name_level_exists(
        &self,
        name: &str,
        level: NodeLevel,
        exclude: Option<NodeUuid>,
    ) -> bool {
        self.state.nodes.values().any(|row| {
            Some(row.node.uuid) != exclude && row.node.level == level && row.node.name == name
        })
    }

    pub fn node_with_email_exists(&self, email: &str, exclude: Option<NodeUuid>) -> bool {
        self.state
            .nodes
            .values()
            .any(|row| Some(row.node.uuid) != exclude && row.node.email == email)
    }

    pub fn node_with_phone_exists(&self, phone: &str, exclude: Option<NodeUuid>) -> bool {
        self.state
            .nodes
            .values()
            .any(|row| Some(row.node.uuid) != exclude && row.node.phone == phone)
    }

    pub fn product_with_name_model_exists(
        &self,
        name: &str,
        model: &str,
        exclude: Option<ProductUuid>,
    ) -> bool {
        self.state.products.values().any(|row| {
            Some(row.product.uuid) != exclude
                && row.product.name == name
                && row.product.model == model
        })
    }

    /// Insert a node.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError::UniqueViolation`] when a unique index would be
    /// violated, or [`StoreError::ForeignKeyViolation`] when the supplier
    /// reference does not resolve.
    pub fn insert_node(&mut self, node: Node) -> Result<(), StoreError> {
        self.check_node_constraints(&node, None)?;

        let seq = self.next_seq();
        self.state.nodes.insert(node.uuid, NodeRow { node, seq });

        Ok(())
    }

    /// Replace a stored node, keeping its position in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RowNotFound`] when the node does not exist, and
    /// the same constraint errors as [`Transaction::insert_node`].
    pub fn update_node(&mut self, node: Node) -> Result<(), StoreError> {
        if !self.state.nodes.contains_key(&node.uuid) {
            return Err(StoreError::RowNotFound);
        }

        self.check_node_constraints(&node, Some(node.uuid))?;

        if let Some(row) = self.state.nodes.get_mut(&node.uuid) {
            row.node = node;
        }

        Ok(())
    }

    /// Delete a node, its products, and any inbound supplier references as
    /// one unit within this transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RowNotFound`] when the node does not exist.
    pub fn delete_node(&mut self, uuid: NodeUuid) -> Result<(), StoreError> {
        if self.state.nodes.remove(&uuid).is_none() {
            return Err(StoreError::RowNotFound);
        }

        self.state
            .products
            .retain(|_, row| row.product.node != uuid);

        for row in self.state.nodes.values_mut() {
            if row.node.supplier == Some(uuid) {
                row.node.supplier = None;
            }
        }

        Ok(())
    }

    /// Administrative debt mutation. Not reachable from the public update
    /// path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RowNotFound`] when the node does not exist.
    pub fn set_debt(&mut self, uuid: NodeUuid, debt: Decimal) -> Result<(), StoreError> {
        let row = self
            .state
            .nodes
            .get_mut(&uuid)
            .ok_or(StoreError::RowNotFound)?;

        row.node.debt = debt;

        Ok(())
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError::UniqueViolation`] when (name, model) is taken,
    /// or [`StoreError::ForeignKeyViolation`] when the owning node does not
    /// resolve.
    pub fn insert_product(&mut self, product: Product) -> Result<(), StoreError> {
        self.check_product_constraints(&product, None)?;

        let seq = self.next_seq();
        self.state
            .products
            .insert(product.uuid, ProductRow { product, seq });

        Ok(())
    }

    /// Replace a stored product, keeping its position in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RowNotFound`] when the product does not exist,
    /// and the same constraint errors as [`Transaction::insert_product`].
    pub fn update_product(&mut self, product: Product) -> Result<(), StoreError> {
        if !self.state.products.contains_key(&product.uuid) {
            return Err(StoreError::RowNotFound);
        }

        self.check_product_constraints(&product, Some(product.uuid))?;

        if let Some(row) = self.state.products.get_mut(&product.uuid) {
            row.product = product;
        }

        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RowNotFound`] when the product does not exist.
    pub fn delete_product(&mut self, uuid: ProductUuid) -> Result<(), StoreError> {
        self.state
            .products
            .remove(&uuid)
            .map(|_| ())
            .ok_or(StoreError::RowNotFound)
    }

    fn check_node_constraints(
        &self,
        node: &Node,
        exclude: Option<NodeUuid>,
    ) -> Result<(), StoreError> {
        if self.node_with_name_level_exists(&node.name, node.level, exclude) {
            return Err(StoreError::UniqueViolation(UniqueConstraint::NodeNameLevel));
        }

        if self.node_with_email_exists(&node.email, exclude) {
            return Err(StoreError::UniqueViolation(UniqueConstraint::NodeEmail));
        }

        if self.node_with_phone_exists(&node.phone, exclude) {
            return Err(StoreError::UniqueViolation(UniqueConstraint::NodePhone));
        }

        if let Some(supplier) = node.supplier {
            if !self.state.nodes.contains_key(&supplier) {
                return Err(StoreError::ForeignKeyViolation("node.supplier"));
            }
        }

        Ok(())
    }

    fn check_product_constraints(
        &self,
        product: &Product,
        exclude: Option<ProductUuid>,
    ) -> Result<(), StoreError> {
        if self.product_with_name_model_exists(&product.name, &product.model, exclude) {
            return Err(StoreError::UniqueViolation(
                UniqueConstraint::ProductNameModel,
            ));
        }

        if !self.state.nodes.contains_key(&product.node) {
            return Err(StoreError::ForeignKeyViolation("product.node"));
        }

        Ok(())
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.state.next_seq;
        self.state.next_seq += 1;

        seq
    }
}
