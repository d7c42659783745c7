use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::schemas::{AppState, ErrorResponse};

/// Name of the session cookie set on login.
pub const SESSION_COOKIE: &str = "whatsub_session";

const SESSION_HOURS: i64 = 24;

/// Claims carried by the signed session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the logged-in user's email.
    pub sub: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

/// Issues and verifies the signed tokens backing the session cookie.
#[derive(Clone)]
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs a session token for the given email.
    pub fn issue(&self, mail: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: mail.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(SESSION_HOURS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Verifies a session token, including its expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default()).map(|data| data.claims)
    }

    /// `Set-Cookie` value establishing the session.
    pub fn login_cookie(&self, mail: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let token = self.issue(mail)?;
        Ok(format!(
            "{SESSION_COOKIE}={token}; HttpOnly; Path=/; Max-Age={}",
            SESSION_HOURS * 3600
        ))
    }

    /// `Set-Cookie` value clearing the session.
    pub fn logout_cookie(&self) -> String {
        format!("{SESSION_COOKIE}=; HttpOnly; Path=/; Max-Age=0")
    }
}

/// Pulls the session token out of the Cookie header, if any.
fn session_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Middleware guarding routes that require a logged-in user.
///
/// On success the verified [`Claims`] are inserted into the request
/// extensions for the handler to read.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(&request) else {
        return unauthorized();
    };

    match state.sessions.verify(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            warn!("Rejected session token: {}", e);
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "You must be logged in to access this resource".to_string(),
            code: "UNAUTHORIZED".to_string(),
            success: false,
        }),
    )
        .into_response()
}
