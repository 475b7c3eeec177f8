//! Users API routes

use axum::Router;
use domain_users::{MongoUserRepository, UserService, handlers};

use crate::state::AppState;

pub type MongoUserService = UserService<MongoUserRepository>;

/// Users service backed by the `users` collection; shared with products.
pub fn service(state: &AppState) -> MongoUserService {
    UserService::new(MongoUserRepository::new(&state.db))
}

pub fn router(service: MongoUserService) -> Router {
    handlers::router(service)
}
