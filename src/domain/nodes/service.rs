//! Nodes service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use tracing::info;

use crate::{
    domain::nodes::{
        errors::NodesServiceError,
        models::{NewNode, Node, NodeFilter, NodeLevel, NodeUpdate, NodeUuid},
        validator,
    },
    policy::{AccessPolicy, Operation, Principal, ResourceKind},
    store::Store,
};

#[derive(Debug, Clone)]
pub struct StoreNodesService {
    store: Store,
    policy: AccessPolicy,
}

impl StoreNodesService {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            policy: AccessPolicy::new(),
        }
    }

    fn gate(&self, principal: Principal, operation: Operation) -> Result<(), NodesServiceError> {
        if !principal.is_authenticated() {
            return Err(NodesServiceError::Unauthorized);
        }

        if !self.policy.authorize(principal, operation, ResourceKind::Node) {
            return Err(NodesServiceError::Forbidden);
        }

        Ok(())
    }
}

#[async_trait]
impl NodesService for StoreNodesService {
    #[tracing::instrument(name = "nodes.service.create_node", skip(self, node), err)]
    async fn create_node(
        &self,
        principal: Principal,
        node: NewNode,
    ) -> Result<Node, NodesServiceError> {
        self.gate(principal, Operation::Create)?;

        let mut tx = self.store.begin().await;

        let validated = validator::validate_create(&node, &tx)?;

        let node = validated.into_node(NodeUuid::new(), Decimal::ZERO, Timestamp::now());

        tx.insert_node(node.clone())?;
        tx.commit();

        info!(node_uuid = %node.uuid, level = node.level.as_wire(), "created network node");

        Ok(node)
    }

    #[tracing::instrument(name = "nodes.service.update_node", skip(self, update), err)]
    async fn update_node(
        &self,
        principal: Principal,
        node: NodeUuid,
        update: NodeUpdate,
    ) -> Result<Node, NodesServiceError> {
        self.gate(principal, Operation::Update)?;

        let mut tx = self.store.begin().await;

        let existing = tx
            .node(node)
            .cloned()
            .ok_or(NodesServiceError::NotFound)?;

        let validated = validator::validate_update(&update, &existing, &tx)?;

        // Debt and creation timestamp never come from the draft.
        let node = validated.into_node(existing.uuid, existing.debt, existing.created_at);

        tx.update_node(node.clone())?;
        tx.commit();

        info!(node_uuid = %node.uuid, "updated network node");

        Ok(node)
    }

    #[tracing::instrument(name = "nodes.service.delete_node", skip(self), err)]
    async fn delete_node(
        &self,
        principal: Principal,
        node: NodeUuid,
    ) -> Result<(), NodesServiceError> {
        self.gate(principal, Operation::Delete)?;

        let mut tx = self.store.begin().await;

        tx.delete_node(node)?;
        tx.commit();

        info!(node_uuid = %node, "deleted network node");

        Ok(())
    }

    async fn get_node(
        &self,
        principal: Principal,
        node: NodeUuid,
    ) -> Result<Node, NodesServiceError> {
        self.gate(principal, Operation::Read)?;

        let tx = self.store.begin().await;

        tx.node(node).cloned().ok_or(NodesServiceError::NotFound)
    }

    async fn list_nodes(
        &self,
        principal: Principal,
        filter: NodeFilter,
    ) -> Result<Vec<Node>, NodesServiceError> {
        self.gate(principal, Operation::Read)?;

        let tx = self.store.begin().await;

        let mut nodes = tx.nodes_in_order();

        if let Some(country) = filter.country {
            // Country-filtered listings never expose individual sellers.
            nodes.retain(|node| {
                node.country == country && node.level != NodeLevel::IndividualSeller
            });
        }

        Ok(nodes)
    }

    #[tracing::instrument(name = "nodes.service.clear_debt", skip(self, nodes), err)]
    async fn clear_debt(
        &self,
        principal: Principal,
        nodes: Vec<NodeUuid>,
    ) -> Result<u64, NodesServiceError> {
        if !principal.is_authenticated() {
            return Err(NodesServiceError::Unauthorized);
        }

        if !self.policy.authorize_administrative(principal) {
            return Err(NodesServiceError::Forbidden);
        }

        let mut tx = self.store.begin().await;

        let unique: FxHashSet<NodeUuid> = nodes.into_iter().collect();

        let mut cleared = 0;

        for uuid in unique {
            // Unknown ids are skipped, not an error: the count reports how
            // many rows were actually touched.
            if tx.set_debt(uuid, Decimal::ZERO).is_ok() {
                cleared += 1;
            }
        }

        tx.commit();

        info!(cleared, "cleared node debt");

        Ok(cleared)
    }
}

#[automock]
#[async_trait]
pub trait NodesService: Send + Sync {
    /// Creates a node after hierarchy validation, with debt zeroed.
    async fn create_node(
        &self,
        principal: Principal,
        node: NewNode,
    ) -> Result<Node, NodesServiceError>;

    /// Applies a partial update; debt and creation timestamp are untouched.
    async fn update_node(
        &self,
        principal: Principal,
        node: NodeUuid,
        update: NodeUpdate,
    ) -> Result<Node, NodesServiceError>;

    /// Deletes a node, cascading its products and detaching dependants.
    async fn delete_node(
        &self,
        principal: Principal,
        node: NodeUuid,
    ) -> Result<(), NodesServiceError>;

    /// Retrieve a single node.
    async fn get_node(
        &self,
        principal: Principal,
        node: NodeUuid,
    ) -> Result<Node, NodesServiceError>;

    /// Retrieves nodes in insertion order, optionally filtered.
    async fn list_nodes(
        &self,
        principal: Principal,
        filter: NodeFilter,
    ) -> Result<Vec<Node>, NodesServiceError>;

    /// Administrative bulk reset of debt to zero. Returns the number of
    /// nodes touched.
    async fn clear_debt(
        &self,
        principal: Principal,
        nodes: Vec<NodeUuid>,
    ) -> Result<u64, NodesServiceError>;
}
