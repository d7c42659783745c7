use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use model::entities::category;
use serde::{Deserialize, Serialize};
use store::category::CategoryPatch;
use store::CategoryStore;
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

use crate::handlers::store_error_response;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for creating a new category
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCategoryRequest {
    /// Category name (must be unique)
    pub nom: String,
    /// Display color
    pub couleur: String,
}

/// Request body for updating a category
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateCategoryRequest {
    /// Current category name, identifies the row to update
    pub current_nom: String,
    pub nom: Option<String>,
    pub couleur: Option<String>,
}

/// Request body for deleting a category
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DeleteCategoryRequest {
    pub nom: String,
}

/// Query parameter for name lookups
#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryNameQuery {
    pub nom: String,
}

/// Category response model
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id_categorie: i32,
    pub nom: String,
    pub couleur: String,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id_categorie: model.id,
            nom: model.name,
            couleur: model.color,
        }
    }
}

/// Get all categories
#[utoipa::path(
    get,
    path = "/categorie/get_all_categories",
    tag = "categories",
    responses(
        (status = 200, description = "Categories retrieved successfully", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_all_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_all_categories function");
    debug!("Fetching all categories from database");

    let store = CategoryStore::new(&state.db);
    let categories = store.list_all().await.map_err(store_error_response)?;

    info!("Successfully retrieved {} categories", categories.len());
    Ok(Json(ApiResponse {
        data: categories.into_iter().map(CategoryResponse::from).collect(),
        message: "Categories retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get a category by its name
#[utoipa::path(
    get,
    path = "/categorie/get_categorie_by_nom",
    tag = "categories",
    params(
        ("nom" = String, Query, description = "Category name"),
    ),
    responses(
        (status = 200, description = "Category retrieved successfully", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_category_by_name(
    State(state): State<AppState>,
    Query(query): Query<CategoryNameQuery>,
) -> Result<Json<ApiResponse<CategoryResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_category_by_name function");
    debug!("Fetching category named '{}'", query.nom);

    let store = CategoryStore::new(&state.db);
    let model = store
        .get_by_name(&query.nom)
        .await
        .map_err(store_error_response)?;

    info!("Successfully retrieved category '{}'", model.name);
    Ok(Json(ApiResponse {
        data: CategoryResponse::from(model),
        message: "Category retrieved successfully".to_string(),
        success: true,
    }))
}

/// Create a new category
#[utoipa::path(
    post,
    path = "/categorie/create_categorie",
    tag = "categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryResponse>),
        (status = 409, description = "Name already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_category function");
    debug!("Creating category named '{}'", request.nom);

    let store = CategoryStore::new(&state.db);
    let model = store
        .insert(&request.nom, &request.couleur)
        .await
        .map_err(store_error_response)?;

    info!(
        "Category created successfully with ID: {}, name: {}",
        model.id, model.name
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: CategoryResponse::from(model),
            message: "Category created successfully".to_string(),
            success: true,
        }),
    ))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/categorie/update_categorie",
    tag = "categories",
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated successfully", body = ApiResponse<String>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_category(
    State(state): State<AppState>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_category function");
    debug!("Updating category named '{}'", request.current_nom);

    let store = CategoryStore::new(&state.db);
    store
        .update(
            &request.current_nom,
            CategoryPatch {
                name: request.nom,
                color: request.couleur,
            },
        )
        .await
        .map_err(store_error_response)?;

    info!("Category '{}' updated successfully", request.current_nom);
    Ok(Json(ApiResponse {
        data: format!("Category '{}' updated", request.current_nom),
        message: "Category updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a category by name
#[utoipa::path(
    delete,
    path = "/categorie/delete_categorie",
    tag = "categories",
    request_body = DeleteCategoryRequest,
    responses(
        (status = 200, description = "Category deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_category(
    State(state): State<AppState>,
    Json(request): Json<DeleteCategoryRequest>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_category function");
    debug!("Deleting category named '{}'", request.nom);

    let store = CategoryStore::new(&state.db);
    store
        .delete(&request.nom)
        .await
        .map_err(store_error_response)?;

    info!("Category '{}' deleted successfully", request.nom);
    Ok(Json(ApiResponse {
        data: format!("Category '{}' deleted", request.nom),
        message: "Category deleted successfully".to_string(),
        success: true,
    }))
}
