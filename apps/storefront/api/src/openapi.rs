//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = "Users and the products they own, stored in MongoDB"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    nest(
        (path = "/users", api = domain_users::ApiDoc),
        (path = "/products", api = domain_products::ApiDoc)
    ),
    tags(
        (name = "Users", description = "User management endpoints"),
        (name = "Products", description = "Product management endpoints"),
        (name = "Maintenance", description = "Owner reference repair")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_paths_are_nested() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/users",
            "/users/active",
            "/users/email/{email}",
            "/users/{id}",
            "/products",
            "/products/price-range",
            "/products/{id}/stock",
            "/products/migrate/owners",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}
