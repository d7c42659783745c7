use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::auth::SessionManager;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Session token signer/verifier
    pub sessions: SessionManager,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::subscriptions::get_all_subscriptions,
        crate::handlers::subscriptions::get_subscriptions_with_category,
        crate::handlers::subscriptions::get_subscription_by_name,
        crate::handlers::subscriptions::create_subscription,
        crate::handlers::subscriptions::update_subscription,
        crate::handlers::subscriptions::delete_subscription,
        crate::handlers::subscriptions::get_total_amount,
        crate::handlers::subscriptions::get_weekly_total,
        crate::handlers::subscriptions::get_monthly_total,
        crate::handlers::subscriptions::get_annual_total,
        crate::handlers::categories::get_all_categories,
        crate::handlers::categories::get_category_by_name,
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::users::get_all_users,
        crate::handlers::users::create_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::login,
        crate::handlers::users::logout,
        crate::handlers::users::protected,
    ),
    components(
        schemas(
            ApiResponse<crate::handlers::subscriptions::SubscriptionResponse>,
            ApiResponse<Vec<crate::handlers::subscriptions::SubscriptionResponse>>,
            ApiResponse<Vec<crate::handlers::subscriptions::SubscriptionWithCategoryResponse>>,
            ApiResponse<crate::handlers::categories::CategoryResponse>,
            ApiResponse<Vec<crate::handlers::categories::CategoryResponse>>,
            ApiResponse<crate::handlers::users::UserResponse>,
            ApiResponse<Vec<crate::handlers::users::UserResponse>>,
            ErrorResponse,
            HealthResponse,
            crate::handlers::subscriptions::SubscriptionResponse,
            crate::handlers::subscriptions::SubscriptionWithCategoryResponse,
            crate::handlers::subscriptions::TotalAmountResponse,
            crate::handlers::subscriptions::CreateSubscriptionRequest,
            crate::handlers::subscriptions::UpdateSubscriptionRequest,
            crate::handlers::subscriptions::SubscriptionNameQuery,
            crate::handlers::categories::CategoryResponse,
            crate::handlers::categories::CreateCategoryRequest,
            crate::handlers::categories::UpdateCategoryRequest,
            crate::handlers::categories::CategoryNameQuery,
            crate::handlers::users::UserResponse,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UpdateUserRequest,
            crate::handlers::users::LoginRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "subscriptions", description = "Subscription tracking endpoints"),
        (name = "categories", description = "Subscription category endpoints"),
        (name = "users", description = "User account and session endpoints"),
    ),
    info(
        title = "WhatSub API",
        description = "Subscription tracker API - manage recurring subscriptions, their categories and user accounts",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
