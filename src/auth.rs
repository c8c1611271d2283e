//! Token authentication and user registry.
//!
//! Deliberately a demo-grade stub: users live in process memory, passwords
//! are salted SHA-256 digests, and sessions are opaque UUID tokens held in a
//! TTL cache. Hardened session design is out of scope for this service.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use moka::future::Cache;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::{
    AuthResponse, AuthUser, LoginRequest, SignupRequest, UpdateProfileRequest,
};

/// Stored user record. The digest is `sha256(salt || password)`, hex encoded.
#[derive(Debug, Clone)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    salt: String,
    password_digest: String,
    role: String,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

/// In-process user registry plus session cache.
pub struct AuthService {
    users: RwLock<HashMap<String, UserRecord>>,
    sessions: Cache<String, AuthUser>,
}

fn digest_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Validate email address shape.
///
/// RFC 5322 simplified; minimum length guards against obviously truncated
/// input.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    let email_regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    email_regex.is_match(email)
}

impl AuthService {
    /// Builds the service and seeds the bootstrap analyst from configuration.
    pub fn new(config: &Config) -> Self {
        let sessions = Cache::builder()
            .time_to_live(Duration::from_secs(config.session_ttl_secs))
            .max_capacity(10_000)
            .build();

        let service = Self {
            users: RwLock::new(HashMap::new()),
            sessions,
        };

        service.insert_user(
            config.analyst_name.clone(),
            config.analyst_email.clone(),
            &config.analyst_password,
        );
        tracing::info!("Bootstrap analyst registered: {}", config.analyst_email);

        service
    }

    fn insert_user(&self, name: String, email: String, password: &str) -> Option<AuthUser> {
        let email = email.to_lowercase();
        let salt = Uuid::new_v4().simple().to_string();
        let record = UserRecord {
            id: Uuid::new_v4(),
            name,
            email: email.clone(),
            password_digest: digest_password(&salt, password),
            salt,
            role: "analyst".to_string(),
            created_at: Utc::now(),
        };
        let user = record.to_auth_user();

        let mut users = self.users.write().ok()?;
        if users.contains_key(&email) {
            return None;
        }
        users.insert(email, record);
        Some(user)
    }

    /// Verifies credentials and opens a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let email = email.to_lowercase();
        let user = {
            let users = self
                .users
                .read()
                .map_err(|_| AppError::InternalError("user registry lock poisoned".to_string()))?;
            let record = users
                .get(&email)
                .ok_or_else(|| AppError::Unauthorized(format!("unknown user {}", email)))?;

            if digest_password(&record.salt, password) != record.password_digest {
                return Err(AppError::Unauthorized(format!(
                    "bad password for {}",
                    email
                )));
            }
            record.to_auth_user()
        };

        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(token.clone(), user.clone()).await;

        Ok(AuthResponse { user, token })
    }

    /// Registers a new user.
    pub fn signup(&self, request: &SignupRequest) -> Result<AuthUser, AppError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Name is required".to_string()));
        }
        if !is_valid_email(&request.email) {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
        if request.password.len() < 4 {
            return Err(AppError::BadRequest(
                "Password must be at least 4 characters".to_string(),
            ));
        }

        self.insert_user(name.to_string(), request.email.clone(), &request.password)
            .ok_or_else(|| AppError::BadRequest("Email already registered".to_string()))
    }

    /// Resolves a bearer token to its session user.
    pub async fn session(&self, token: &str) -> Option<AuthUser> {
        self.sessions.get(token).await
    }

    /// Invalidates a session token.
    pub async fn logout(&self, token: &str) {
        self.sessions.invalidate(token).await;
    }

    /// Updates name/email of an existing user and refreshes the session copy.
    pub async fn update_profile(
        &self,
        token: &str,
        current: &AuthUser,
        changes: &UpdateProfileRequest,
    ) -> Result<AuthUser, AppError> {
        if let Some(ref email) = changes.email {
            if !is_valid_email(email) {
                return Err(AppError::BadRequest("Invalid email address".to_string()));
            }
        }

        let updated = {
            let mut users = self
                .users
                .write()
                .map_err(|_| AppError::InternalError("user registry lock poisoned".to_string()))?;

            let new_email = changes.email.as_ref().map(|e| e.to_lowercase());
            if let Some(ref email) = new_email {
                if email != &current.email && users.contains_key(email) {
                    return Err(AppError::BadRequest("Email already registered".to_string()));
                }
            }

            let mut record = users
                .remove(&current.email)
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

            if let Some(ref name) = changes.name {
                record.name = name.trim().to_string();
            }
            if let Some(email) = new_email {
                record.email = email;
            }

            let user = record.to_auth_user();
            users.insert(record.email.clone(), record);
            user
        };

        self.sessions.insert(token.to_string(), updated.clone()).await;
        Ok(updated)
    }
}

// ============ Middleware & Handlers ============

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Requires a valid bearer token; injects the session user and its token
/// into request extensions.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

    match state.auth.session(&token).await {
        Some(user) => {
            request.extensions_mut().insert(user);
            request.extensions_mut().insert(SessionToken(token));
            Ok(next.run(request).await)
        }
        None => Err(AppError::Unauthorized(
            "invalid or expired token".to_string(),
        )),
    }
}

/// The raw bearer token of the current request.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    tracing::info!("POST /auth/login - email: {}", payload.email);
    let response = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(response))
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<AuthUser>, AppError> {
    tracing::info!("POST /auth/signup - email: {}", payload.email);
    let user = state.auth.signup(&payload)?;
    Ok(Json(user))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<SessionToken>,
) -> Json<serde_json::Value> {
    state.auth.logout(&token.0).await;
    Json(serde_json::json!({ "success": true }))
}

/// GET /api/auth/me
pub async fn me(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
    Json(user)
}

/// PATCH /api/auth/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Extension(token): Extension<SessionToken>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<AuthUser>, AppError> {
    let updated = state.auth.update_profile(&token.0, &user, &payload).await?;
    Ok(Json(updated))
}
