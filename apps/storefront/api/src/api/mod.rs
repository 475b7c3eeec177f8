//! API routes module
//!
//! Wires the domain routers to their MongoDB repositories.

pub mod health;
pub mod products;
pub mod users;

use axum::Router;
use mongodb::Database;

use crate::state::AppState;

/// All API routes, mounted at the root by `axum_helpers::create_router`
pub fn routes(state: &AppState) -> Router {
    let user_service = users::service(state);

    Router::new()
        .nest("/users", users::router(user_service.clone()))
        .nest("/products", products::router(state, user_service))
        .merge(health::router(state.clone()))
}

/// Creates the indexes both collections rely on.
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    domain_users::MongoUserRepository::new(db).init_indexes().await?;
    domain_products::MongoProductRepository::new(db)
        .init_indexes()
        .await?;
    Ok(())
}
