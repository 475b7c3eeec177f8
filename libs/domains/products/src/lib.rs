//! Products Domain
//!
//! Products owned by users. Every product response embeds its owner's
//! `{id, name, email}` summary, and writes check that the owner exists.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐
//! │  Handlers   │────►│ Maintenance  │  ← owner repair / diagnostics
//! └──────┬──────┘     └──────┬───────┘
//!        │                   │
//! ┌──────▼──────┐            │
//! │   Service   │──► domain_users (owner checks and summaries)
//! └──────┬──────┘            │
//!        │                   │
//! ┌──────▼───────────────────▼──┐
//! │        Repository           │  ← Trait + MongoDB / in-memory
//! └──────┬──────────────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{handlers, InMemoryProductRepository, ProductService};
//! use domain_users::{InMemoryUserRepository, UserService};
//!
//! let users = UserService::new(InMemoryUserRepository::new());
//! let service = ProductService::new(InMemoryProductRepository::new(), users);
//! let router = handlers::router(service);
//! ```

pub mod error;
pub mod handlers;
pub mod maintenance;
pub mod models;
mod mongodb;
pub mod repository;
pub mod service;

pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use maintenance::{MigrationReport, OwnerDiagnostic, OwnerMaintenance, OwnerRecord, StoredOwner};
pub use models::{
    CreateProduct, OwnerRef, PriceRangeQuery, Product, ProductChanges, ProductFilter,
    ProductOwner, ProductResponse, StockUpdate, UpdateProduct,
};
pub use crate::mongodb::MongoProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
