//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "statusCode": 500,
        "timestamp": "2024-05-01T12:00:00Z",
        "path": "/products",
        "message": "Internal server error"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "statusCode": 400,
        "timestamp": "2024-05-01T12:00:00Z",
        "path": "/users",
        "message": "Validation failed: email: must be a valid email address",
        "details": {
            "email": [{
                "code": "email",
                "message": "must be a valid email address",
                "params": {"value": "not-an-email"}
            }]
        }
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Invalid ObjectId",
    content_type = "application/json",
    example = json!({
        "statusCode": 400,
        "timestamp": "2024-05-01T12:00:00Z",
        "path": "/users/123",
        "message": "Invalid MongoDB ObjectId: 123"
    })
)]
pub struct BadRequestObjectIdResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "statusCode": 404,
        "timestamp": "2024-05-01T12:00:00Z",
        "path": "/users/665f1c2b9d3e4a0012345678",
        "message": "User with ID 665f1c2b9d3e4a0012345678 not found"
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Conflict - Resource already exists",
    content_type = "application/json",
    example = json!({
        "statusCode": 409,
        "timestamp": "2024-05-01T12:00:00Z",
        "path": "/users",
        "message": "Email already exists"
    })
)]
pub struct ConflictResponse(pub ErrorResponse);
