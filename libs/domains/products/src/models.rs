use chrono::{DateTime, Utc};
use database::mongodb::bson_datetime;
use domain_users::UserSummary;
use mongodb::bson::{Bson, Document, oid::ObjectId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Product entity as stored in the `products` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub owner: OwnerRef,
    #[serde(with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

fn default_available() -> bool {
    true
}

/// Owner reference as stored on a product.
///
/// Writes always store an ObjectId. Records from before the owner repair may
/// hold the id as a hex string, which reads as [`OwnerRef::Id`], or some
/// other value, which is kept verbatim as [`OwnerRef::Unresolved`] so the
/// record stays listable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerRef {
    Id(ObjectId),
    Unresolved(String),
}

impl OwnerRef {
    pub fn id(&self) -> Option<ObjectId> {
        match self {
            OwnerRef::Id(id) => Some(*id),
            OwnerRef::Unresolved(_) => None,
        }
    }
}

impl Default for OwnerRef {
    /// A record without an owner field
    fn default() -> Self {
        OwnerRef::Unresolved(String::new())
    }
}

impl From<ObjectId> for OwnerRef {
    fn from(id: ObjectId) -> Self {
        OwnerRef::Id(id)
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerRef::Id(id) => write!(f, "{}", id.to_hex()),
            OwnerRef::Unresolved(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for OwnerRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OwnerRef::Id(id) => id.serialize(serializer),
            OwnerRef::Unresolved(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for OwnerRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Bson::deserialize(deserializer)? {
            Bson::ObjectId(id) => OwnerRef::Id(id),
            Bson::String(raw) => match ObjectId::parse_str(raw.trim()) {
                Ok(id) => OwnerRef::Id(id),
                Err(_) => OwnerRef::Unresolved(raw),
            },
            Bson::Null => OwnerRef::default(),
            other => OwnerRef::Unresolved(other.to_string()),
        })
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

impl Product {
    /// Builds a new product for an already resolved owner.
    pub fn new(input: CreateProduct, owner: ObjectId) -> Self {
        let now = bson_datetime::now();
        Self {
            id: ObjectId::new(),
            name: input.name.trim().to_string(),
            description: input.description.trim().to_string(),
            price: input.price,
            stock: input.stock.unwrap_or(0),
            is_available: input.is_available.unwrap_or(true),
            categories: input.categories,
            owner: OwnerRef::Id(owner),
            created_at: now,
            updated_at: now,
        }
    }
}

/// The fields a product write sets. Anything absent stays as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub is_available: Option<bool>,
    pub categories: Option<Vec<String>>,
    pub owner: Option<ObjectId>,
    pub updated_at: DateTime<Utc>,
}

impl ProductChanges {
    /// A partial update. `owner` is the replacement owner, already resolved.
    pub fn from_update(update: UpdateProduct, owner: Option<ObjectId>) -> Self {
        Self {
            name: update.name.map(|name| name.trim().to_string()),
            description: update
                .description
                .map(|description| description.trim().to_string()),
            price: update.price,
            stock: update.stock,
            is_available: update.is_available,
            categories: update.categories,
            owner,
            updated_at: bson_datetime::now(),
        }
    }

    /// A stock level; availability follows it.
    pub fn stock(quantity: i64) -> Self {
        Self {
            name: None,
            description: None,
            price: None,
            stock: Some(quantity),
            is_available: Some(quantity > 0),
            categories: None,
            owner: None,
            updated_at: bson_datetime::now(),
        }
    }

    /// Body of the `$set` stage: changed fields and `updatedAt`.
    pub fn to_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(ref name) = self.name {
            set.insert("name", name.as_str());
        }
        if let Some(ref description) = self.description {
            set.insert("description", description.as_str());
        }
        if let Some(price) = self.price {
            set.insert("price", price);
        }
        if let Some(stock) = self.stock {
            set.insert("stock", stock);
        }
        if let Some(is_available) = self.is_available {
            set.insert("isAvailable", is_available);
        }
        if let Some(ref categories) = self.categories {
            set.insert("categories", categories.clone());
        }
        if let Some(owner) = self.owner {
            set.insert("owner", owner);
        }
        set.insert("updatedAt", bson_datetime::to_bson(&self.updated_at));
        set
    }
}

/// DTO for creating a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProduct {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Mechanical keyboard")]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Tenkeyless, hot-swappable switches")]
    pub description: String,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    #[schema(example = 129.99, minimum = 0)]
    pub price: f64,
    /// Defaults to 0
    #[validate(range(min = 0, message = "must not be negative"))]
    #[schema(minimum = 0)]
    pub stock: Option<i64>,
    /// Defaults to `true`
    pub is_available: Option<bool>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// ID of the owning user
    #[schema(example = "665f1c2b9d3e4a0012345678")]
    pub owner: String,
}

/// DTO for a partial product update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProduct {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    #[schema(minimum = 0)]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "must not be negative"))]
    #[schema(minimum = 0)]
    pub stock: Option<i64>,
    pub is_available: Option<bool>,
    pub categories: Option<Vec<String>>,
    /// New owner; must reference an existing user
    pub owner: Option<String>,
}

/// Body of `PATCH /products/{id}/stock`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct StockUpdate {
    #[validate(range(min = 0, message = "must be a non-negative integer"))]
    #[schema(example = 25, minimum = 0)]
    pub quantity: i64,
}

/// Query of `GET /products/price-range`
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PriceRangeQuery {
    /// Lower bound, inclusive
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub min: f64,
    /// Upper bound, inclusive
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub max: f64,
}

/// Repository-level filter. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub owner: Option<ObjectId>,
    /// `isAvailable == true` and `stock > 0`
    pub available_only: bool,
    pub category: Option<String>,
    /// Inclusive on both ends
    pub price_range: Option<(f64, f64)>,
}

impl ProductFilter {
    pub fn by_owner(owner: ObjectId) -> Self {
        Self {
            owner: Some(owner),
            ..Default::default()
        }
    }

    pub fn available() -> Self {
        Self {
            available_only: true,
            ..Default::default()
        }
    }

    pub fn in_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Default::default()
        }
    }

    pub fn price_between(min: f64, max: f64) -> Self {
        Self {
            price_range: Some((min, max)),
            ..Default::default()
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.owner.is_none_or(|owner| product.owner.id() == Some(owner))
            && (!self.available_only || (product.is_available && product.stock > 0))
            && self
                .category
                .as_ref()
                .is_none_or(|category| product.categories.contains(category))
            && self
                .price_range
                .is_none_or(|(min, max)| product.price >= min && product.price <= max)
    }
}

/// Owner as rendered on a product: the user summary, or the stored reference
/// when it does not resolve to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ProductOwner {
    Summary(UserSummary),
    Reference(String),
}

/// Product as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[schema(example = "665f1c2b9d3e4a0087654321")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub is_available: bool,
    pub categories: Vec<String>,
    pub owner: ProductOwner,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    pub fn new(product: Product, owners: &HashMap<ObjectId, UserSummary>) -> Self {
        let owner = match product.owner.id().and_then(|id| owners.get(&id)) {
            Some(summary) => ProductOwner::Summary(summary.clone()),
            None => ProductOwner::Reference(product.owner.to_string()),
        };

        Self {
            id: product.id.to_hex(),
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            is_available: product.is_available,
            categories: product.categories,
            owner,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, from_document, to_document};

    fn create_input() -> CreateProduct {
        CreateProduct {
            name: " Keyboard ".to_string(),
            description: "Tenkeyless".to_string(),
            price: 99.5,
            stock: None,
            is_available: None,
            categories: vec!["peripherals".to_string()],
            owner: ObjectId::new().to_hex(),
        }
    }

    fn product(price: f64, stock: i64, is_available: bool) -> Product {
        let mut product = Product::new(create_input(), ObjectId::new());
        product.price = price;
        product.stock = stock;
        product.is_available = is_available;
        product
    }

    #[test]
    fn test_new_product_defaults() {
        let product = Product::new(create_input(), ObjectId::new());
        assert_eq!(product.name, "Keyboard");
        assert_eq!(product.stock, 0);
        assert!(product.is_available);
    }

    #[test]
    fn test_stock_changes_drive_availability() {
        let empty = ProductChanges::stock(0).to_document();
        assert_eq!(empty.get_i64("stock").unwrap(), 0);
        assert!(!empty.get_bool("isAvailable").unwrap());

        let restocked = ProductChanges::stock(3).to_document();
        assert!(restocked.get_bool("isAvailable").unwrap());
        assert!(restocked.get_datetime("updatedAt").is_ok());
    }

    #[test]
    fn test_update_changes_set_only_given_fields() {
        let owner = ObjectId::new();
        let changes = ProductChanges::from_update(
            UpdateProduct {
                name: Some("  Lamp ".to_string()),
                price: Some(12.5),
                ..Default::default()
            },
            Some(owner),
        );
        let set = changes.to_document();

        let mut keys: Vec<_> = set.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["name", "owner", "price", "updatedAt"]);
        assert_eq!(set.get_str("name").unwrap(), "Lamp");
        assert_eq!(set.get_object_id("owner").unwrap(), owner);
    }

    #[test]
    fn test_timestamps_and_owner_stored_natively() {
        let item = product(1.0, 1, true);
        let doc = to_document(&item).unwrap();
        assert!(doc.get_datetime("createdAt").is_ok());
        assert_eq!(doc.get_object_id("owner").unwrap(), item.owner.id().unwrap());
        assert_eq!(from_document::<Product>(doc).unwrap(), item);
    }

    #[test]
    fn test_owner_reads_legacy_string() {
        let owner = ObjectId::new();
        let now = "2024-05-01T12:00:00Z";
        let typed = doc! {
            "_id": ObjectId::new(), "name": "a", "description": "b", "price": 1.0,
            "owner": owner, "createdAt": now, "updatedAt": now,
        };
        let legacy = doc! {
            "_id": ObjectId::new(), "name": "a", "description": "b", "price": 1.0,
            "owner": owner.to_hex(), "createdAt": now, "updatedAt": now,
        };

        let typed: Product = from_document(typed).unwrap();
        let legacy: Product = from_document(legacy).unwrap();
        assert_eq!(typed.owner, OwnerRef::Id(owner));
        assert_eq!(legacy.owner, OwnerRef::Id(owner));
        assert!(legacy.is_available);
        assert_eq!(legacy.stock, 0);
    }

    #[test]
    fn test_unparseable_owner_is_kept_verbatim() {
        let now = "2024-05-01T12:00:00Z";
        let stored = |owner: Bson| {
            let mut doc = doc! {
                "_id": ObjectId::new(), "name": "a", "description": "b", "price": 1.0,
                "createdAt": now, "updatedAt": now,
            };
            if owner != Bson::Null {
                doc.insert("owner", owner);
            }
            from_document::<Product>(doc).unwrap()
        };

        let legacy = stored(Bson::String("legacy-user-7".to_string()));
        assert_eq!(legacy.owner, OwnerRef::Unresolved("legacy-user-7".to_string()));
        assert_eq!(legacy.owner.id(), None);

        assert_eq!(stored(Bson::Int32(42)).owner, OwnerRef::Unresolved("42".to_string()));
        assert_eq!(stored(Bson::Null).owner, OwnerRef::default());

        let response = ProductResponse::new(legacy, &HashMap::new());
        assert_eq!(response.owner, ProductOwner::Reference("legacy-user-7".to_string()));
    }

    #[test]
    fn test_filter_price_range_is_inclusive() {
        let filter = ProductFilter::price_between(10.0, 20.0);
        assert!(filter.matches(&product(10.0, 1, true)));
        assert!(filter.matches(&product(20.0, 1, true)));
        assert!(!filter.matches(&product(20.01, 1, true)));
        assert!(!filter.matches(&product(9.99, 1, true)));
    }

    #[test]
    fn test_filter_available_requires_stock() {
        let filter = ProductFilter::available();
        assert!(filter.matches(&product(1.0, 1, true)));
        assert!(!filter.matches(&product(1.0, 0, true)));
        assert!(!filter.matches(&product(1.0, 5, false)));
    }

    #[test]
    fn test_filter_category_and_owner() {
        let item = product(1.0, 1, true);
        assert!(ProductFilter::in_category("peripherals").matches(&item));
        assert!(!ProductFilter::in_category("garden").matches(&item));
        assert!(ProductFilter::by_owner(item.owner.id().unwrap()).matches(&item));
        assert!(!ProductFilter::by_owner(ObjectId::new()).matches(&item));
    }

    #[test]
    fn test_stock_update_rejects_negative() {
        assert!(StockUpdate { quantity: -1 }.validate().is_err());
        assert!(StockUpdate { quantity: 0 }.validate().is_ok());
    }

    #[test]
    fn test_response_falls_back_to_owner_id() {
        let item = product(1.0, 1, true);
        let owner = item.owner.id().unwrap();
        let response = ProductResponse::new(item.clone(), &HashMap::new());
        assert_eq!(response.owner, ProductOwner::Reference(owner.to_hex()));

        let summary = UserSummary {
            id: owner.to_hex(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };
        let owners = HashMap::from([(owner, summary.clone())]);
        let json = serde_json::to_value(ProductResponse::new(item, &owners)).unwrap();
        assert_eq!(json["owner"]["email"], "ada@example.com");
        assert_eq!(json["isAvailable"], true);
    }
}
