//! Products service.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    domain::products::{
        errors::ProductsServiceError,
        models::{NewProduct, Product, ProductFilter, ProductUpdate, ProductUuid},
    },
    policy::{AccessPolicy, Operation, Principal, ResourceKind},
    store::Store,
};

#[derive(Debug, Clone)]
pub struct StoreProductsService {
    store: Store,
    policy: AccessPolicy,
}

impl StoreProductsService {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            policy: AccessPolicy::new(),
        }
    }

    fn gate(&self, principal: Principal, operation: Operation) -> Result<(), ProductsServiceError> {
        if !principal.is_authenticated() {
            return Err(ProductsServiceError::Unauthorized);
        }

        if !self
            .policy
            .authorize(principal, operation, ResourceKind::Product)
        {
            return Err(ProductsServiceError::Forbidden);
        }

        Ok(())
    }
}

#[async_trait]
impl ProductsService for StoreProductsService {
    #[tracing::instrument(name = "products.service.create_product", skip(self, product), err)]
    async fn create_product(
        &self,
        principal: Principal,
        product: NewProduct,
    ) -> Result<Product, ProductsServiceError> {
        self.gate(principal, Operation::Create)?;

        if product.price < Decimal::ZERO {
            return Err(ProductsServiceError::InvalidPrice);
        }

        let mut tx = self.store.begin().await;

        if tx.node(product.node).is_none() {
            return Err(ProductsServiceError::NotFound);
        }

        if tx.product_with_name_model_exists(&product.name, &product.model, None) {
            return Err(ProductsServiceError::DuplicateProduct);
        }

        let product = Product {
            uuid: ProductUuid::new(),
            name: product.name,
            model: product.model,
            release_date: product.release_date,
            price: product.price,
            manufacturer_country: product.manufacturer_country,
            node: product.node,
        };

        tx.insert_product(product.clone())?;
        tx.commit();

        info!(product_uuid = %product.uuid, "created product");

        Ok(product)
    }

    #[tracing::instrument(name = "products.service.update_product", skip(self, update), err)]
    async fn update_product(
        &self,
        principal: Principal,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<Product, ProductsServiceError> {
        self.gate(principal, Operation::Update)?;

        let mut tx = self.store.begin().await;

        let existing = tx
            .product(product)
            .cloned()
            .ok_or(ProductsServiceError::NotFound)?;

        let merged = Product {
            uuid: existing.uuid,
            name: update.name.unwrap_or(existing.name),
            model: update.model.unwrap_or(existing.model),
            release_date: update.release_date.unwrap_or(existing.release_date),
            price: update.price.unwrap_or(existing.price),
            manufacturer_country: update
                .manufacturer_country
                .unwrap_or(existing.manufacturer_country),
            node: update.node.unwrap_or(existing.node),
        };

        if merged.price < Decimal::ZERO {
            return Err(ProductsServiceError::InvalidPrice);
        }

        if tx.node(merged.node).is_none() {
            return Err(ProductsServiceError::NotFound);
        }

        if tx.product_with_name_model_exists(&merged.name, &merged.model, Some(merged.uuid)) {
            return Err(ProductsServiceError::DuplicateProduct);
        }

        tx.update_product(merged.clone())?;
        tx.commit();

        info!(product_uuid = %merged.uuid, "updated product");

        Ok(merged)
    }

    #[tracing::instrument(name = "products.service.delete_product", skip(self), err)]
    async fn delete_product(
        &self,
        principal: Principal,
        product: ProductUuid,
    ) -> Result<(), ProductsServiceError> {
        self.gate(principal, Operation::Delete)?;

        let mut tx = self.store.begin().await;

        tx.delete_product(product)?;
        tx.commit();

        info!(product_uuid = %product, "deleted product");

        Ok(())
    }

    async fn get_product(
        &self,
        principal: Principal,
        product: ProductUuid,
    ) -> Result<Product, ProductsServiceError> {
        self.gate(principal, Operation::Read)?;

        let tx = self.store.begin().await;

        tx.product(product)
            .cloned()
            .ok_or(ProductsServiceError::NotFound)
    }

    async fn list_products(
        &self,
        principal: Principal,
        filter: ProductFilter,
    ) -> Result<Vec<Product>, ProductsServiceError> {
        self.gate(principal, Operation::Read)?;

        let tx = self.store.begin().await;

        let mut products = tx.products_in_order();

        if let Some(release_date) = filter.release_date {
            products.retain(|product| product.release_date == release_date);
        }

        if let Some(country) = filter.manufacturer_country {
            products.retain(|product| product.manufacturer_country == country);
        }

        if let Some(node) = filter.node {
            products.retain(|product| product.node == node);
        }

        Ok(products)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Creates a product owned by an existing node.
    async fn create_product(
        &self,
        principal: Principal,
        product: NewProduct,
    ) -> Result<Product, ProductsServiceError>;

    /// Applies a partial update to a product.
    async fn update_product(
        &self,
        principal: Principal,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<Product, ProductsServiceError>;

    /// Deletes a product.
    async fn delete_product(
        &self,
        principal: Principal,
        product: ProductUuid,
    ) -> Result<(), ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(
        &self,
        principal: Principal,
        product: ProductUuid,
    ) -> Result<Product, ProductsServiceError>;

    /// Retrieves products in insertion order, optionally filtered.
    async fn list_products(
        &self,
        principal: Principal,
        filter: ProductFilter,
    ) -> Result<Vec<Product>, ProductsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use crate::test::{TestContext, create_chain, create_factory, product_draft};

    use super::*;

    #[tokio::test]
    async fn create_product_returns_persisted_fields() -> TestResult {
        let ctx = TestContext::new();

        let factory = create_factory(&ctx, "Plant").await?;

        let product = ctx
            .products
            .create_product(ctx.admin, product_draft("Widget", "W-1", factory.uuid))
            .await?;

        assert_eq!(product.name, "Widget");
        assert_eq!(product.model, "W-1");
        assert_eq!(product.node, factory.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn create_product_for_unknown_node_returns_not_found() {
        let ctx = TestContext::new();

        let draft = product_draft("Widget", "W-1", crate::domain::nodes::models::NodeUuid::new());

        let result = ctx.products.create_product(ctx.admin, draft).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn duplicate_name_model_on_same_node_is_rejected() -> TestResult {
        let ctx = TestContext::new();

        let factory = create_factory(&ctx, "Plant").await?;

        ctx.products
            .create_product(ctx.admin, product_draft("X1", "M1", factory.uuid))
            .await?;

        let result = ctx
            .products
            .create_product(ctx.admin, product_draft("X1", "M1", factory.uuid))
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::DuplicateProduct)),
            "expected DuplicateProduct, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_name_model_across_nodes_is_rejected() -> TestResult {
        let ctx = TestContext::new();

        let (factory, retail, _seller) = create_chain(&ctx).await?;

        ctx.products
            .create_product(ctx.admin, product_draft("X1", "M1", factory.uuid))
            .await?;

        // (name, model) is unique globally, not per node.
        let result = ctx
            .products
            .create_product(ctx.admin, product_draft("X1", "M1", retail.uuid))
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::DuplicateProduct)),
            "expected DuplicateProduct, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn negative_price_is_rejected() -> TestResult {
        let ctx = TestContext::new();

        let factory = create_factory(&ctx, "Plant").await?;

        let mut draft = product_draft("Widget", "W-1", factory.uuid);
        draft.price = "-0.01".parse()?;

        let result = ctx.products.create_product(ctx.admin, draft).await;

        assert!(
            matches!(result, Err(ProductsServiceError::InvalidPrice)),
            "expected InvalidPrice, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_excludes_itself_from_uniqueness() -> TestResult {
        let ctx = TestContext::new();

        let factory = create_factory(&ctx, "Plant").await?;

        let product = ctx
            .products
            .create_product(ctx.admin, product_draft("X1", "M1", factory.uuid))
            .await?;

        let update = ProductUpdate {
            price: Some("123.45".parse()?),
            ..ProductUpdate::default()
        };

        let updated = ctx
            .products
            .update_product(ctx.admin, product.uuid, update)
            .await?;

        assert_eq!(updated.price, "123.45".parse()?);
        assert_eq!(updated.name, "X1");

        Ok(())
    }

    #[tokio::test]
    async fn update_onto_taken_name_model_is_rejected() -> TestResult {
        let ctx = TestContext::new();

        let factory = create_factory(&ctx, "Plant").await?;

        ctx.products
            .create_product(ctx.admin, product_draft("X1", "M1", factory.uuid))
            .await?;

        let other = ctx
            .products
            .create_product(ctx.admin, product_draft("X2", "M2", factory.uuid))
            .await?;

        let update = ProductUpdate {
            name: Some("X1".to_string()),
            model: Some("M1".to_string()),
            ..ProductUpdate::default()
        };

        let result = ctx
            .products
            .update_product(ctx.admin, other.uuid, update)
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::DuplicateProduct)),
            "expected DuplicateProduct, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_is_admin_only() -> TestResult {
        let ctx = TestContext::new();

        let factory = create_factory(&ctx, "Plant").await?;

        let product = ctx
            .products
            .create_product(ctx.manager, product_draft("X1", "M1", factory.uuid))
            .await?;

        let result = ctx.products.delete_product(ctx.manager, product.uuid).await;
        assert!(matches!(result, Err(ProductsServiceError::Forbidden)));

        let result = ctx.products.delete_product(ctx.employee, product.uuid).await;
        assert!(matches!(result, Err(ProductsServiceError::Forbidden)));

        ctx.products.delete_product(ctx.admin, product.uuid).await?;

        let result = ctx.products.get_product(ctx.admin, product.uuid).await;
        assert!(matches!(result, Err(ProductsServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn employee_cannot_create_products() -> TestResult {
        let ctx = TestContext::new();

        let factory = create_factory(&ctx, "Plant").await?;

        let result = ctx
            .products
            .create_product(ctx.employee, product_draft("X1", "M1", factory.uuid))
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::Forbidden)),
            "expected Forbidden, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn listing_filters_are_conjunctive() -> TestResult {
        let ctx = TestContext::new();

        let (factory, retail, _seller) = create_chain(&ctx).await?;

        let mut domestic = product_draft("X1", "M1", factory.uuid);
        domestic.release_date = date(2024, 1, 15);
        domestic.manufacturer_country = "Russia".to_string();

        let mut imported = product_draft("X2", "M2", retail.uuid);
        imported.release_date = date(2024, 1, 15);
        imported.manufacturer_country = "China".to_string();

        ctx.products.create_product(ctx.admin, domestic).await?;
        ctx.products.create_product(ctx.admin, imported).await?;

        let filter = ProductFilter {
            release_date: Some(date(2024, 1, 15)),
            manufacturer_country: Some("Russia".to_string()),
            node: None,
        };

        let products = ctx.products.list_products(ctx.employee, filter).await?;

        assert_eq!(products.len(), 1);
        assert_eq!(
            products.first().map(|product| product.name.as_str()),
            Some("X1")
        );

        let by_node = ctx
            .products
            .list_products(
                ctx.employee,
                ProductFilter {
                    node: Some(retail.uuid),
                    ..ProductFilter::default()
                },
            )
            .await?;

        assert_eq!(by_node.len(), 1);
        assert_eq!(
            by_node.first().map(|product| product.model.as_str()),
            Some("M2")
        );

        Ok(())
    }
}
