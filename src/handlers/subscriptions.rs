use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use model::entities::subscription;
use model::BillingPeriod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use store::subscription::SubscriptionWithCategory;
use store::{CategoryRef, NewSubscription, StoreError, SubscriptionPatch, SubscriptionStore};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

use crate::handlers::store_error_response;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for creating a new subscription
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    /// Subscription name (must be unique)
    pub nom_abonnement: String,
    /// Supplier the subscription is billed by
    pub nom_fournisseur: String,
    /// Billed amount
    #[serde(with = "rust_decimal::serde::float")]
    pub montant: Decimal,
    /// Billing frequency: week, month or year
    pub frequence_prelevement: String,
    /// Next due date (YYYY-MM-DD)
    pub date_echeance: NaiveDate,
    /// Commitment end date, required when under commitment
    pub date_fin_engagement: Option<NaiveDate>,
    /// Whether the subscription is under a commitment period
    #[serde(rename = "IsEngagement")]
    pub is_engagement: bool,
    /// Category id; alternative to (nom_categorie, couleur)
    pub id_categorie: Option<i32>,
    /// Category name, resolved or created together with couleur
    pub nom_categorie: Option<String>,
    /// Category color, paired with nom_categorie
    pub couleur: Option<String>,
}

/// Request body for updating a subscription
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateSubscriptionRequest {
    /// Current subscription name, identifies the row to update
    pub current_nom_abonnement: String,
    pub new_nom_abonnement: Option<String>,
    pub new_nom_fournisseur: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub new_montant: Option<Decimal>,
    pub new_frequence_prelevement: Option<String>,
    pub new_date_echeance: Option<NaiveDate>,
    pub new_date_fin_engagement: Option<NaiveDate>,
    #[serde(rename = "new_IsEngagement")]
    pub new_is_engagement: Option<bool>,
    pub new_id_categorie: Option<i32>,
}

/// Request body for deleting a subscription
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DeleteSubscriptionRequest {
    pub nom_abonnement: String,
}

/// Query parameter for name lookups
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscriptionNameQuery {
    pub nom_abonnement: String,
}

/// Subscription response model
#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id_abonnement: i32,
    pub nom_abonnement: String,
    pub nom_fournisseur: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub montant: Decimal,
    pub frequence_prelevement: String,
    pub date_echeance: NaiveDate,
    pub date_fin_engagement: Option<NaiveDate>,
    #[serde(rename = "IsEngagement")]
    pub is_engagement: bool,
    pub id_categorie: i32,
}

impl From<subscription::Model> for SubscriptionResponse {
    fn from(model: subscription::Model) -> Self {
        Self {
            id_abonnement: model.id,
            nom_abonnement: model.name.clone(),
            nom_fournisseur: model.supplier.clone(),
            montant: model.amount,
            frequence_prelevement: model.period.as_str().to_string(),
            date_echeance: model.due_date,
            date_fin_engagement: model.commitment_end,
            is_engagement: model.commitment_flag(),
            id_categorie: model.category_id,
        }
    }
}

/// Subscription joined with its category
#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionWithCategoryResponse {
    pub nom_abonnement: String,
    pub nom_fournisseur: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub montant: Decimal,
    pub frequence_prelevement: String,
    pub date_echeance: NaiveDate,
    pub date_fin_engagement: Option<NaiveDate>,
    #[serde(rename = "IsEngagement")]
    pub is_engagement: bool,
    pub nom_categorie: String,
    pub couleur: String,
}

impl From<SubscriptionWithCategory> for SubscriptionWithCategoryResponse {
    fn from(row: SubscriptionWithCategory) -> Self {
        let is_engagement = row.commitment_flag();
        Self {
            nom_abonnement: row.name,
            nom_fournisseur: row.supplier,
            montant: row.amount,
            frequence_prelevement: row.period.as_str().to_string(),
            date_echeance: row.due_date,
            date_fin_engagement: row.commitment_end,
            is_engagement,
            nom_categorie: row.category_name,
            couleur: row.category_color,
        }
    }
}

/// Summed amount over a set of subscriptions
#[derive(Debug, Serialize, ToSchema)]
pub struct TotalAmountResponse {
    pub success: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_montant: Decimal,
}

/// Get all subscriptions
#[utoipa::path(
    get,
    path = "/abonnement/get_all_abonnements",
    tag = "subscriptions",
    responses(
        (status = 200, description = "Subscriptions retrieved successfully", body = ApiResponse<Vec<SubscriptionResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_all_subscriptions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SubscriptionResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_all_subscriptions function");
    debug!("Fetching all subscriptions from database");

    let store = SubscriptionStore::new(&state.db);
    let subscriptions = store.list_all().await.map_err(store_error_response)?;

    info!("Successfully retrieved {} subscriptions", subscriptions.len());
    Ok(Json(ApiResponse {
        data: subscriptions
            .into_iter()
            .map(SubscriptionResponse::from)
            .collect(),
        message: "Subscriptions retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get all subscriptions with their category
#[utoipa::path(
    get,
    path = "/abonnement/get_all_abonnements_with_categorie",
    tag = "subscriptions",
    responses(
        (status = 200, description = "Subscriptions retrieved successfully", body = ApiResponse<Vec<SubscriptionWithCategoryResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_subscriptions_with_category(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SubscriptionWithCategoryResponse>>>, (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering get_subscriptions_with_category function");

    let store = SubscriptionStore::new(&state.db);
    let rows = store
        .list_with_category()
        .await
        .map_err(store_error_response)?;

    debug!("Retrieved {} joined subscription rows", rows.len());
    Ok(Json(ApiResponse {
        data: rows
            .into_iter()
            .map(SubscriptionWithCategoryResponse::from)
            .collect(),
        message: "Subscriptions retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get a subscription by its name
#[utoipa::path(
    get,
    path = "/abonnement/get_abonnement_by_nom_abonnement",
    tag = "subscriptions",
    params(
        ("nom_abonnement" = String, Query, description = "Subscription name"),
    ),
    responses(
        (status = 200, description = "Subscription retrieved successfully", body = ApiResponse<SubscriptionResponse>),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_subscription_by_name(
    State(state): State<AppState>,
    Query(query): Query<SubscriptionNameQuery>,
) -> Result<Json<ApiResponse<SubscriptionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_subscription_by_name function");
    debug!("Fetching subscription named '{}'", query.nom_abonnement);

    let store = SubscriptionStore::new(&state.db);
    let model = store
        .get_by_name(&query.nom_abonnement)
        .await
        .map_err(store_error_response)?;

    info!("Successfully retrieved subscription '{}'", model.name);
    Ok(Json(ApiResponse {
        data: SubscriptionResponse::from(model),
        message: "Subscription retrieved successfully".to_string(),
        success: true,
    }))
}

/// Create a new subscription
#[utoipa::path(
    post,
    path = "/abonnement/create_abonnement",
    tag = "subscriptions",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created successfully", body = ApiResponse<SubscriptionResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SubscriptionResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering create_subscription function");
    debug!("Creating subscription named '{}'", request.nom_abonnement);

    let category = match (request.id_categorie, request.nom_categorie, request.couleur) {
        (Some(id), _, _) => CategoryRef::Id(id),
        (None, Some(name), Some(color)) => CategoryRef::Named { name, color },
        (None, _, _) => {
            warn!("Subscription create request carried no category reference");
            return Err(store_error_response(StoreError::MissingField(
                "id_categorie",
            )));
        }
    };

    let store = SubscriptionStore::new(&state.db);
    let model = store
        .insert(NewSubscription {
            name: request.nom_abonnement,
            supplier: request.nom_fournisseur,
            amount: request.montant,
            period: request.frequence_prelevement,
            due_date: request.date_echeance,
            is_commitment: request.is_engagement,
            commitment_end: request.date_fin_engagement,
            category,
        })
        .await
        .map_err(store_error_response)?;

    info!(
        "Subscription created successfully with ID: {}, name: {}",
        model.id, model.name
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: SubscriptionResponse::from(model),
            message: "Subscription created successfully".to_string(),
            success: true,
        }),
    ))
}

/// Update a subscription
#[utoipa::path(
    put,
    path = "/abonnement/update_abonnement",
    tag = "subscriptions",
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated successfully", body = ApiResponse<String>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_subscription(
    State(state): State<AppState>,
    Json(request): Json<UpdateSubscriptionRequest>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_subscription function");
    debug!(
        "Updating subscription named '{}'",
        request.current_nom_abonnement
    );

    let store = SubscriptionStore::new(&state.db);
    store
        .update(
            &request.current_nom_abonnement,
            SubscriptionPatch {
                name: request.new_nom_abonnement,
                supplier: request.new_nom_fournisseur,
                amount: request.new_montant,
                period: request.new_frequence_prelevement,
                due_date: request.new_date_echeance,
                is_commitment: request.new_is_engagement,
                commitment_end: request.new_date_fin_engagement,
                category_id: request.new_id_categorie,
            },
        )
        .await
        .map_err(store_error_response)?;

    info!(
        "Subscription '{}' updated successfully",
        request.current_nom_abonnement
    );
    Ok(Json(ApiResponse {
        data: format!("Subscription '{}' updated", request.current_nom_abonnement),
        message: "Subscription updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a subscription by name
#[utoipa::path(
    delete,
    path = "/abonnement/delete_abonnement",
    tag = "subscriptions",
    request_body = DeleteSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_subscription(
    State(state): State<AppState>,
    Json(request): Json<DeleteSubscriptionRequest>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_subscription function");
    debug!("Deleting subscription named '{}'", request.nom_abonnement);

    let store = SubscriptionStore::new(&state.db);
    store
        .delete(&request.nom_abonnement)
        .await
        .map_err(store_error_response)?;

    info!(
        "Subscription '{}' deleted successfully",
        request.nom_abonnement
    );
    Ok(Json(ApiResponse {
        data: format!("Subscription '{}' deleted", request.nom_abonnement),
        message: "Subscription deleted successfully".to_string(),
        success: true,
    }))
}

async fn total_for(
    state: &AppState,
    period: Option<BillingPeriod>,
) -> Result<Json<TotalAmountResponse>, (StatusCode, Json<ErrorResponse>)> {
    let store = SubscriptionStore::new(&state.db);
    let total = store.aggregate(period).await.map_err(store_error_response)?;

    debug!(?period, %total, "Computed subscription total");
    Ok(Json(TotalAmountResponse {
        success: true,
        total_montant: total,
    }))
}

/// Total amount over all subscriptions, regardless of frequency
#[utoipa::path(
    get,
    path = "/abonnement/total_amount",
    tag = "subscriptions",
    responses(
        (status = 200, description = "Total computed", body = TotalAmountResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_total_amount(
    State(state): State<AppState>,
) -> Result<Json<TotalAmountResponse>, (StatusCode, Json<ErrorResponse>)> {
    total_for(&state, None).await
}

/// Total amount over weekly subscriptions
#[utoipa::path(
    get,
    path = "/abonnement/total_weekly_amount",
    tag = "subscriptions",
    responses(
        (status = 200, description = "Total computed", body = TotalAmountResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_weekly_total(
    State(state): State<AppState>,
) -> Result<Json<TotalAmountResponse>, (StatusCode, Json<ErrorResponse>)> {
    total_for(&state, Some(BillingPeriod::Week)).await
}

/// Total amount over monthly subscriptions
#[utoipa::path(
    get,
    path = "/abonnement/total_monthly_amount",
    tag = "subscriptions",
    responses(
        (status = 200, description = "Total computed", body = TotalAmountResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_monthly_total(
    State(state): State<AppState>,
) -> Result<Json<TotalAmountResponse>, (StatusCode, Json<ErrorResponse>)> {
    total_for(&state, Some(BillingPeriod::Month)).await
}

/// Total amount over annual subscriptions
#[utoipa::path(
    get,
    path = "/abonnement/total_annual_amount",
    tag = "subscriptions",
    responses(
        (status = 200, description = "Total computed", body = TotalAmountResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_annual_total(
    State(state): State<AppState>,
) -> Result<Json<TotalAmountResponse>, (StatusCode, Json<ErrorResponse>)> {
    total_for(&state, Some(BillingPeriod::Year)).await
}
