use axum::{
    extract::{Extension, State},
    http::{header, HeaderName, StatusCode},
    response::Json,
};
use axum_valid::Valid;
use model::entities::user;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use store::{NewUser, UserPatch, UserStore};
use tracing::{debug, error, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::Claims;
use crate::handlers::store_error_response;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for creating a new user
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// Email address (must be unique)
    #[validate(email)]
    pub mail: String,
    /// Plaintext password, checked against the complexity policy
    pub motdepasse: String,
    /// Last name
    pub nom: Option<String>,
    /// First name
    pub prenom: Option<String>,
    /// Phone number
    pub telephone: Option<String>,
    /// Monthly salary
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub salaire: Option<Decimal>,
    /// Whether the email address has been verified
    #[serde(default)]
    pub ismailverif: bool,
}

/// Request body for updating a user
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    /// Current email, identifies the row to update
    pub current_mail: String,
    #[validate(email)]
    pub mail: Option<String>,
    pub motdepasse: Option<String>,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub telephone: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub salaire: Option<Decimal>,
    pub ismailverif: Option<bool>,
}

/// Request body for deleting a user
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DeleteUserRequest {
    pub mail: String,
}

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub mail: String,
    pub motdepasse: String,
}

/// User response model. The password hash never leaves the server.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id_utilisateur: i32,
    pub mail: String,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub telephone: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub salaire: Option<Decimal>,
    pub ismailverif: bool,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id_utilisateur: model.id,
            mail: model.mail,
            nom: model.last_name,
            prenom: model.first_name,
            telephone: model.phone,
            salaire: model.salary,
            ismailverif: model.email_verified,
        }
    }
}

/// Get all users
#[utoipa::path(
    get,
    path = "/users/get_all_users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_all_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_all_users function");
    debug!("Fetching all users from database");

    let store = UserStore::new(&state.db);
    let users = store.list_all().await.map_err(store_error_response)?;

    info!("Successfully retrieved {} users", users.len());
    Ok(Json(ApiResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
        message: "Users retrieved successfully".to_string(),
        success: true,
    }))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users/create_user",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_user(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateUserRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_user function");
    debug!("Creating user with email: {}", request.mail);

    let store = UserStore::new(&state.db);
    let model = store
        .insert(NewUser {
            mail: request.mail,
            password: request.motdepasse,
            last_name: request.nom,
            first_name: request.prenom,
            phone: request.telephone,
            salary: request.salaire,
            email_verified: request.ismailverif,
        })
        .await
        .map_err(store_error_response)?;

    info!(
        "User created successfully with ID: {}, email: {}",
        model.id, model.mail
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: UserResponse::from(model),
            message: "User created successfully".to_string(),
            success: true,
        }),
    ))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/users/update_user",
    tag = "users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<String>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_user(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateUserRequest>>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_user function");
    debug!("Updating user with email: {}", request.current_mail);

    let store = UserStore::new(&state.db);
    store
        .update(
            &request.current_mail,
            UserPatch {
                mail: request.mail,
                password: request.motdepasse,
                last_name: request.nom,
                first_name: request.prenom,
                phone: request.telephone,
                salary: request.salaire,
                email_verified: request.ismailverif,
            },
        )
        .await
        .map_err(store_error_response)?;

    info!("User '{}' updated successfully", request.current_mail);
    Ok(Json(ApiResponse {
        data: format!("User '{}' updated", request.current_mail),
        message: "User updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a user by email
#[utoipa::path(
    delete,
    path = "/users/delete_user",
    tag = "users",
    request_body = DeleteUserRequest,
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_user(
    State(state): State<AppState>,
    Json(request): Json<DeleteUserRequest>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_user function");
    debug!("Deleting user with email: {}", request.mail);

    let store = UserStore::new(&state.db);
    store
        .delete(&request.mail)
        .await
        .map_err(store_error_response)?;

    info!("User '{}' deleted successfully", request.mail);
    Ok(Json(ApiResponse {
        data: format!("User '{}' deleted", request.mail),
        message: "User deleted successfully".to_string(),
        success: true,
    }))
}

/// Log in and establish a session cookie
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = ApiResponse<String>),
        (status = 401, description = "Incorrect email or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<([(HeaderName, String); 1], Json<ApiResponse<String>>), (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering login function");
    debug!("Login attempt for email: {}", request.mail);

    let store = UserStore::new(&state.db);
    let user = store
        .verify_credentials(&request.mail, &request.motdepasse)
        .await
        .map_err(store_error_response)?;

    let cookie = state.sessions.login_cookie(&user.mail).map_err(|e| {
        error!("Failed to sign session token for '{}': {}", user.mail, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error".to_string(),
                code: "SESSION_ERROR".to_string(),
                success: false,
            }),
        )
    })?;

    info!("User '{}' logged in successfully", user.mail);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse {
            data: user.mail,
            message: "Logged in successfully".to_string(),
            success: true,
        }),
    ))
}

/// Log out and clear the session cookie
#[utoipa::path(
    post,
    path = "/users/logout",
    tag = "users",
    responses(
        (status = 200, description = "Logged out, session cookie cleared", body = ApiResponse<String>)
    )
)]
#[instrument]
pub async fn logout(
    State(state): State<AppState>,
) -> ([(HeaderName, String); 1], Json<ApiResponse<String>>) {
    trace!("Entering logout function");
    info!("Clearing session cookie");

    (
        [(header::SET_COOKIE, state.sessions.logout_cookie())],
        Json(ApiResponse {
            data: "Logged out".to_string(),
            message: "Logged out successfully".to_string(),
            success: true,
        }),
    )
}

/// Session check, only reachable with a valid session cookie
#[utoipa::path(
    get,
    path = "/users/protected",
    tag = "users",
    responses(
        (status = 200, description = "Session is valid", body = ApiResponse<String>),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse)
    )
)]
#[instrument(skip(claims))]
pub async fn protected(Extension(claims): Extension<Claims>) -> Json<ApiResponse<String>> {
    debug!("Session check for '{}'", claims.sub);

    Json(ApiResponse {
        data: claims.sub,
        message: "You are logged in".to_string(),
        success: true,
    })
}
