use async_trait::async_trait;
use mongodb::bson::{self, Document, oid::ObjectId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::maintenance::OwnerRecord;
use crate::models::{Product, ProductChanges, ProductFilter};

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: Product) -> ProductResult<Product>;

    async fn get_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>>;

    /// Products matching `filter`, in insertion order
    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>>;

    /// Writes only the changed fields and returns the stored result.
    /// Fails with `NotFound` when the id is gone.
    async fn update(&self, id: ObjectId, changes: ProductChanges) -> ProductResult<Product>;

    /// Remove a product, returning it if it existed
    async fn delete(&self, id: ObjectId) -> ProductResult<Option<Product>>;

    /// Id, name and raw owner of every product, without decoding the rest
    async fn owner_records(&self) -> ProductResult<Vec<OwnerRecord>>;

    /// Overwrite the stored owner. Returns whether the product exists.
    async fn set_owner(&self, id: ObjectId, owner: ObjectId) -> ProductResult<bool>;
}

/// In-memory implementation of ProductRepository (for development/testing)
///
/// Records are kept as BSON documents so legacy shapes can be seeded with
/// [`InMemoryProductRepository::insert_document`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<BTreeMap<ObjectId, Document>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw document as-is. It must carry an ObjectId `_id`.
    pub async fn insert_document(&self, doc: Document) -> ProductResult<ObjectId> {
        let id = doc
            .get_object_id("_id")
            .map_err(|e| ProductError::Validation(format!("document needs an ObjectId _id: {}", e)))?;
        self.products.write().await.insert(id, doc);
        Ok(id)
    }

    fn encode(product: &Product) -> ProductResult<Document> {
        bson::to_document(product).map_err(|e| ProductError::Internal(e.to_string()))
    }

    fn decode(doc: &Document) -> ProductResult<Product> {
        bson::from_document(doc.clone()).map_err(|e| ProductError::Database(e.to_string()))
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: Product) -> ProductResult<Product> {
        let doc = Self::encode(&product)?;
        self.products.write().await.insert(product.id, doc);
        Ok(product)
    }

    async fn get_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        products.get(&id).map(Self::decode).transpose()
    }

    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        let mut matching = Vec::new();
        for doc in products.values() {
            let product = Self::decode(doc)?;
            if filter.matches(&product) {
                matching.push(product);
            }
        }
        Ok(matching)
    }

    async fn update(&self, id: ObjectId, changes: ProductChanges) -> ProductResult<Product> {
        let mut products = self.products.write().await;
        let stored = products.get_mut(&id).ok_or(ProductError::NotFound(id))?;

        for (key, value) in changes.to_document() {
            stored.insert(key, value);
        }
        Self::decode(stored)
    }

    async fn delete(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        let removed = self.products.write().await.remove(&id);
        removed.as_ref().map(Self::decode).transpose()
    }

    async fn owner_records(&self) -> ProductResult<Vec<OwnerRecord>> {
        let products = self.products.read().await;
        Ok(products.values().filter_map(OwnerRecord::from_document).collect())
    }

    async fn set_owner(&self, id: ObjectId, owner: ObjectId) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        match products.get_mut(&id) {
            Some(doc) => {
                doc.insert("owner", owner);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
