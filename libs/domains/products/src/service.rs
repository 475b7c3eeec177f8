//! Product Service - Business logic layer

use domain_users::{UserError, UserRepository, UserService};
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::maintenance::OwnerMaintenance;
use crate::models::{
    CreateProduct, Product, ProductChanges, ProductFilter, ProductResponse, StockUpdate,
    UpdateProduct,
};
use crate::repository::ProductRepository;

/// Product service providing business logic operations
///
/// Owners are resolved through the users service: on writes to check that
/// they exist, and on reads to embed the `{id, name, email}` summary.
pub struct ProductService<R: ProductRepository, U: UserRepository> {
    repository: Arc<R>,
    users: UserService<U>,
}

impl<R: ProductRepository, U: UserRepository> Clone for ProductService<R, U> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            users: self.users.clone(),
        }
    }
}

impl<R: ProductRepository, U: UserRepository> ProductService<R, U> {
    pub fn new(repository: R, users: UserService<U>) -> Self {
        Self {
            repository: Arc::new(repository),
            users,
        }
    }

    /// Owner repair and diagnostics over the same repository
    pub fn maintenance(&self) -> OwnerMaintenance<R> {
        OwnerMaintenance::new(Arc::clone(&self.repository))
    }

    /// Create a new product owned by an existing user
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<ProductResponse> {
        input.validate()?;

        let owner = self.resolve_owner(&input.owner).await?;
        let created = self.repository.create(Product::new(input, owner)).await?;

        info!(
            target: "business",
            event = "product_created",
            product_id = %created.id,
            owner_id = %created.owner,
            price = created.price,
            "Product created"
        );
        self.render_one(created).await
    }

    pub async fn list_products(&self) -> ProductResult<Vec<ProductResponse>> {
        self.list(ProductFilter::default()).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ObjectId) -> ProductResult<ProductResponse> {
        let product = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        self.render_one(product).await
    }

    pub async fn list_by_owner(&self, owner: ObjectId) -> ProductResult<Vec<ProductResponse>> {
        self.list(ProductFilter::by_owner(owner)).await
    }

    pub async fn list_available(&self) -> ProductResult<Vec<ProductResponse>> {
        self.list(ProductFilter::available()).await
    }

    pub async fn list_by_category(&self, category: &str) -> ProductResult<Vec<ProductResponse>> {
        self.list(ProductFilter::in_category(category)).await
    }

    /// Products with `min <= price <= max`. An inverted range matches nothing.
    pub async fn list_by_price_range(
        &self,
        min: f64,
        max: f64,
    ) -> ProductResult<Vec<ProductResponse>> {
        if min > max {
            debug!(min, max, "Inverted price range");
            return Ok(Vec::new());
        }
        self.list(ProductFilter::price_between(min, max)).await
    }

    /// Partial update of the given fields. A new owner is checked like on create.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: ObjectId,
        input: UpdateProduct,
    ) -> ProductResult<ProductResponse> {
        input.validate()?;

        let owner = match input.owner {
            Some(ref raw) => Some(self.resolve_owner(raw).await?),
            None => None,
        };

        let changes = ProductChanges::from_update(input, owner);
        let updated = self.repository.update(id, changes).await?;
        info!(target: "business", event = "product_updated", product_id = %updated.id, "Product updated");
        self.render_one(updated).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ObjectId) -> ProductResult<()> {
        let deleted = self
            .repository
            .delete(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        info!(
            target: "business",
            event = "product_deleted",
            product_id = %id,
            name = %deleted.name,
            "Product deleted"
        );
        Ok(())
    }

    /// Sets the stock level; the product is available exactly when stock > 0.
    #[instrument(skip(self, input))]
    pub async fn update_stock(
        &self,
        id: ObjectId,
        input: StockUpdate,
    ) -> ProductResult<ProductResponse> {
        input.validate()?;

        let current = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        let updated = self
            .repository
            .update(id, ProductChanges::stock(input.quantity))
            .await?;
        let (old_stock, old_availability) = (current.stock, current.is_available);

        info!(
            target: "business",
            event = "stock_updated",
            product_id = %id,
            product_name = %updated.name,
            old_stock,
            new_stock = updated.stock,
            old_availability,
            new_availability = updated.is_available,
            "Stock updated"
        );
        log_stock_level(&updated);

        self.render_one(updated).await
    }

    /// Parses and checks an owner id. Both a malformed id and an unknown
    /// user are validation failures.
    async fn resolve_owner(&self, raw: &str) -> ProductResult<ObjectId> {
        let owner = ObjectId::parse_str(raw.trim())
            .map_err(|_| ProductError::Validation("Invalid owner ID format".to_string()))?;

        match self.users.get_user(owner).await {
            Ok(_) => {
                debug!(owner_id = %owner, "Owner validation successful");
                Ok(owner)
            }
            Err(UserError::NotFound(_)) => Err(ProductError::Validation(format!(
                "Owner with ID {} does not exist",
                raw.trim()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<ProductResponse>> {
        let products = self.repository.list(filter).await?;
        self.render(products).await
    }

    async fn render_one(&self, product: Product) -> ProductResult<ProductResponse> {
        let owner_ids: Vec<ObjectId> = product.owner.id().into_iter().collect();
        let owners = self.users.user_summaries(&owner_ids).await?;
        Ok(ProductResponse::new(product, &owners))
    }

    /// Joins owner summaries with one lookup for the whole batch.
    async fn render(&self, products: Vec<Product>) -> ProductResult<Vec<ProductResponse>> {
        let owner_ids: Vec<ObjectId> = products.iter().filter_map(|p| p.owner.id()).collect();
        let owners = self.users.user_summaries(&owner_ids).await?;

        Ok(products
            .into_iter()
            .map(|product| ProductResponse::new(product, &owners))
            .collect())
    }
}

fn log_stock_level(product: &Product) {
    match product.stock {
        0 => warn!(product_id = %product.id, name = %product.name, "Product out of stock"),
        1..=5 => warn!(
            product_id = %product.id,
            name = %product.name,
            stock = product.stock,
            "Low stock"
        ),
        n if n > 100 => info!(product_id = %product.id, name = %product.name, stock = n, "High stock level"),
        n => debug!(product_id = %product.id, stock = n, "Stock level normal"),
    }
}
