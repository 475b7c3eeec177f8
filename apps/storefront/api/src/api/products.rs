//! Products API routes

use axum::Router;
use domain_products::{MongoProductRepository, ProductService, handlers};

use super::users::MongoUserService;
use crate::state::AppState;

/// Products router; owners are checked and rendered through `users`.
pub fn router(state: &AppState, users: MongoUserService) -> Router {
    let repository = MongoProductRepository::new(&state.db);
    handlers::router(ProductService::new(repository, users))
}
