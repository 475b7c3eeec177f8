//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use database::timed;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, oid::ObjectId},
    options::{IndexOptions, ReturnDocument},
};
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::maintenance::OwnerRecord;
use crate::models::{Product, ProductChanges, ProductFilter};
use crate::repository::ProductRepository;

/// MongoDB implementation of the ProductRepository
#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, "products")
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<Product>(collection_name),
        }
    }

    /// Initialize indexes for the listing queries
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let index = |keys: Document, name: &str| {
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(name.to_string()).build())
                .build()
        };

        let indexes = vec![
            index(doc! { "name": 1 }, "idx_name"),
            index(doc! { "owner": 1 }, "idx_owner"),
            index(doc! { "isAvailable": 1, "stock": 1 }, "idx_availability"),
            index(doc! { "price": 1 }, "idx_price"),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    pub fn collection(&self) -> &Collection<Product> {
        &self.collection
    }

    /// Owners match whether stored as an ObjectId or as the legacy hex string.
    fn build_filter(filter: &ProductFilter) -> Document {
        let mut doc = Document::new();

        if let Some(owner) = filter.owner {
            doc.insert(
                "$or",
                vec![doc! { "owner": owner }, doc! { "owner": owner.to_hex() }],
            );
        }

        if filter.available_only {
            doc.insert("isAvailable", true);
            doc.insert("stock", doc! { "$gt": 0 });
        }

        if let Some(ref category) = filter.category {
            doc.insert("categories", category.as_str());
        }

        if let Some((min, max)) = filter.price_range {
            doc.insert("price", doc! { "$gte": min, "$lte": max });
        }

        doc
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn create(&self, product: Product) -> ProductResult<Product> {
        timed("products.insert_one", self.collection.insert_one(&product)).await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        let product =
            timed("products.find_one", self.collection.find_one(doc! { "_id": id })).await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let cursor = timed(
            "products.find",
            self.collection
                .find(Self::build_filter(&filter))
                .sort(doc! { "_id": 1 }),
        )
        .await?;
        let products: Vec<Product> = cursor.try_collect().await?;
        Ok(products)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: ObjectId, changes: ProductChanges) -> ProductResult<Product> {
        let updated = timed(
            "products.find_one_and_update",
            self.collection
                .find_one_and_update(doc! { "_id": id }, doc! { "$set": changes.to_document() })
                .return_document(ReturnDocument::After),
        )
        .await?;

        updated.ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        let deleted = timed(
            "products.find_one_and_delete",
            self.collection.find_one_and_delete(doc! { "_id": id }),
        )
        .await?;
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn owner_records(&self) -> ProductResult<Vec<OwnerRecord>> {
        let raw = self.collection.clone_with_type::<Document>();
        let cursor = timed(
            "products.find",
            raw.find(doc! {})
                .projection(doc! { "name": 1, "owner": 1 })
                .sort(doc! { "_id": 1 }),
        )
        .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;

        Ok(docs.iter().filter_map(OwnerRecord::from_document).collect())
    }

    #[instrument(skip(self))]
    async fn set_owner(&self, id: ObjectId, owner: ObjectId) -> ProductResult<bool> {
        let result = timed(
            "products.update_one",
            self.collection
                .update_one(doc! { "_id": id }, doc! { "$set": { "owner": owner } }),
        )
        .await?;
        Ok(result.matched_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoProductRepository::build_filter(&ProductFilter::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_owner_matches_both_shapes() {
        let owner = ObjectId::new();
        let doc = MongoProductRepository::build_filter(&ProductFilter::by_owner(owner));

        let branches = doc.get_array("$or").unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(
            branches[0].as_document().unwrap().get_object_id("owner").unwrap(),
            owner
        );
        assert_eq!(
            branches[1].as_document().unwrap().get_str("owner").unwrap(),
            owner.to_hex()
        );
    }

    #[test]
    fn test_build_filter_available() {
        let doc = MongoProductRepository::build_filter(&ProductFilter::available());
        assert!(doc.get_bool("isAvailable").unwrap());
        assert_eq!(doc.get_document("stock").unwrap(), &doc! { "$gt": 0 });
    }

    #[test]
    fn test_build_filter_category() {
        let doc = MongoProductRepository::build_filter(&ProductFilter::in_category("books"));
        assert_eq!(doc.get_str("categories").unwrap(), "books");
    }

    #[test]
    fn test_build_filter_price_range_is_inclusive() {
        let doc = MongoProductRepository::build_filter(&ProductFilter::price_between(10.0, 20.0));
        let price = doc.get_document("price").unwrap();
        assert_eq!(price.get_f64("$gte").unwrap(), 10.0);
        assert_eq!(price.get_f64("$lte").unwrap(), 20.0);
    }
}
