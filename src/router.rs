use crate::auth::require_session;
use crate::handlers::{
    categories::{
        create_category, delete_category, get_all_categories, get_category_by_name, update_category,
    },
    health::health_check,
    subscriptions::{
        create_subscription, delete_subscription, get_all_subscriptions, get_annual_total,
        get_monthly_total, get_subscription_by_name, get_subscriptions_with_category,
        get_total_amount, get_weekly_total, update_subscription,
    },
    users::{create_user, delete_user, get_all_users, login, logout, protected, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Subscription routes
        .route("/abonnement/get_all_abonnements", get(get_all_subscriptions))
        .route(
            "/abonnement/get_all_abonnements_with_categorie",
            get(get_subscriptions_with_category),
        )
        .route(
            "/abonnement/get_abonnement_by_nom_abonnement",
            get(get_subscription_by_name),
        )
        .route("/abonnement/create_abonnement", post(create_subscription))
        .route("/abonnement/update_abonnement", put(update_subscription))
        .route("/abonnement/delete_abonnement", delete(delete_subscription))
        // Subscription totals
        .route("/abonnement/total_amount", get(get_total_amount))
        .route("/abonnement/total_weekly_amount", get(get_weekly_total))
        .route("/abonnement/total_monthly_amount", get(get_monthly_total))
        .route("/abonnement/total_annual_amount", get(get_annual_total))
        // Category routes
        .route("/categorie/get_all_categories", get(get_all_categories))
        .route("/categorie/get_categorie_by_nom", get(get_category_by_name))
        .route("/categorie/create_categorie", post(create_category))
        .route("/categorie/update_categorie", put(update_category))
        .route("/categorie/delete_categorie", delete(delete_category))
        // User routes
        .route("/users/get_all_users", get(get_all_users))
        .route("/users/create_user", post(create_user))
        .route("/users/update_user", put(update_user))
        .route("/users/delete_user", delete(delete_user))
        // Session routes
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route(
            "/users/protected",
            get(protected).layer(middleware::from_fn_with_state(state.clone(), require_session)),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
