//! Integration tests for Products domain
//!
//! Run against a real MongoDB via testcontainers: filters, the legacy owner
//! shape and the owner repair. Requires Docker:
//! `cargo test -p domain_products -- --ignored`

use domain_products::{
    CreateProduct, MongoProductRepository, ProductOwner, ProductService, StockUpdate,
    UpdateProduct,
};
use domain_users::{CreateUser, MongoUserRepository, UserService};
use mongodb::Database;
use mongodb::bson::{Document, doc, oid::ObjectId};
use test_utils::{TestDataBuilder, TestMongo};

type Service = ProductService<MongoProductRepository, MongoUserRepository>;

async fn setup(mongo: &TestMongo, test_name: &str) -> (Service, Database, String) {
    let builder = TestDataBuilder::from_test_name(test_name);
    let db = mongo.database(&builder.database_name());

    let user_repo = MongoUserRepository::new(&db);
    user_repo.init_indexes().await.unwrap();
    let users = UserService::new(user_repo);
    let owner = users
        .create_user(CreateUser {
            name: builder.name("owner", "main"),
            email: builder.email("owner"),
            age: 33,
            is_active: None,
            tags: vec![],
        })
        .await
        .unwrap();

    let products = MongoProductRepository::new(&db);
    products.init_indexes().await.unwrap();
    (ProductService::new(products, users), db, owner.id)
}

fn input(owner: &str, name: &str, price: f64, stock: i64) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        description: "integration".to_string(),
        price,
        stock: Some(stock),
        is_available: None,
        categories: vec!["tools".to_string()],
        owner: owner.to_string(),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_filters_against_mongo() {
    let mongo = TestMongo::new().await;
    let (service, _, owner) = setup(&mongo, "filters_against_mongo").await;

    service.create_product(input(&owner, "cheap", 5.0, 0)).await.unwrap();
    service.create_product(input(&owner, "edge", 10.0, 2)).await.unwrap();
    service.create_product(input(&owner, "pricey", 50.0, 8)).await.unwrap();

    let in_range = service.list_by_price_range(5.0, 10.0).await.unwrap();
    assert_eq!(in_range.len(), 2);

    let available = service.list_available().await.unwrap();
    let names: Vec<_> = available.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["edge", "pricey"]);

    assert_eq!(service.list_by_category("tools").await.unwrap().len(), 3);
    assert!(matches!(
        service.list_products().await.unwrap()[0].owner,
        ProductOwner::Summary(_)
    ));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_owner_repair_against_mongo() {
    let mongo = TestMongo::new().await;
    let (service, db, owner) = setup(&mongo, "owner_repair_against_mongo").await;
    let owner_id = ObjectId::parse_str(&owner).unwrap();

    service.create_product(input(&owner, "typed", 1.0, 1)).await.unwrap();
    db.collection::<Document>("products")
        .insert_one(doc! {
            "_id": ObjectId::new(),
            "name": "legacy",
            "description": "seeded",
            "price": 2.0,
            "stock": 1,
            "isAvailable": true,
            "categories": [],
            "owner": owner.clone(),
            "createdAt": "2024-05-01T12:00:00Z",
            "updatedAt": "2024-05-01T12:00:00Z",
        })
        .await
        .unwrap();

    // both shapes are found before the repair
    assert_eq!(service.list_by_owner(owner_id).await.unwrap().len(), 2);

    let maintenance = service.maintenance();
    let report = maintenance.migrate_owners().await.unwrap();
    assert_eq!((report.total, report.migrated, report.skipped, report.failed), (2, 1, 1, 0));

    let again = maintenance.migrate_owners().await.unwrap();
    assert_eq!(again.migrated, 0);
    assert_eq!(again.failed, 0);

    let diagnostics = maintenance.owner_diagnostics().await.unwrap();
    assert!(diagnostics.iter().all(|d| d.owner_type == "objectId"));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_updates_touch_only_changed_fields() {
    let mongo = TestMongo::new().await;
    let (service, db, owner) = setup(&mongo, "updates_touch_only_changed_fields").await;
    let raw = db.collection::<Document>("products");

    let created = service.create_product(input(&owner, "drill", 80.0, 4)).await.unwrap();
    let id = ObjectId::parse_str(&created.id).unwrap();
    raw.update_one(doc! { "_id": id }, doc! { "$set": { "__v": 0, "sku": "DRL-80" } })
        .await
        .unwrap();

    let emptied = service.update_stock(id, StockUpdate { quantity: 0 }).await.unwrap();
    assert!(!emptied.is_available);

    let renamed = service
        .update_product(
            id,
            UpdateProduct {
                name: Some("cordless drill".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "cordless drill");
    assert_eq!(renamed.stock, 0);

    let stored = raw.find_one(doc! { "_id": id }).await.unwrap().unwrap();
    assert_eq!(stored.get_str("sku").unwrap(), "DRL-80");
    assert!(stored.contains_key("__v"));
    assert!(stored.get_datetime("updatedAt").is_ok());
    assert!(stored.get_object_id("owner").is_ok());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unresolvable_owner_is_listed_against_mongo() {
    let mongo = TestMongo::new().await;
    let (service, db, owner) = setup(&mongo, "unresolvable_owner").await;

    service.create_product(input(&owner, "typed", 1.0, 1)).await.unwrap();
    db.collection::<Document>("products")
        .insert_one(doc! {
            "_id": ObjectId::new(),
            "name": "orphan",
            "description": "seeded",
            "price": 2.0,
            "stock": 1,
            "categories": ["tools"],
            "owner": "legacy-user-7",
            "createdAt": "2024-05-01T12:00:00Z",
            "updatedAt": "2024-05-01T12:00:00Z",
        })
        .await
        .unwrap();

    let all = service.list_products().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].owner, ProductOwner::Reference("legacy-user-7".to_string()));
    assert_eq!(service.list_by_category("tools").await.unwrap().len(), 2);
}
