//! REST endpoints for user registration and reads.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::models::User;
use crate::state::AppState;
use crate::users::store::{self, NewUser, StoreError};
use crate::users::validate;
use crate::ws::broadcast::broadcast_live_users;

// --- Request / Response types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub mobile_no: Option<String>,
    #[serde(default)]
    pub email_id: Option<String>,
    #[serde(default)]
    pub address: Option<AddressPayload>,
    #[serde(default)]
    pub login_id: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Open WebSocket connection to join to the live room on success.
    #[serde(default)]
    pub connection_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddressPayload {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: String,
}

/// Safe projection of a user record — the password hash is never selected
/// from the database, let alone serialized.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile_no: String,
    pub email_id: String,
    pub login_id: String,
    pub address: AddressResponse,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            mobile_no: user.mobile_no,
            email_id: user.email_id,
            login_id: user.login_id,
            address: AddressResponse {
                street: user.street,
                city: user.city,
                state: user.state,
                country: user.country,
            },
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Error responses are always {"message": ...}.
type ApiError = (StatusCode, Json<Value>);

fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": message })))
}

fn not_found(message: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "message": message })))
}

/// 500 body is deliberately generic: internals stay in the logs.
fn server_error() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Internal server error" })),
    )
}

// --- Validation ---

/// Check the submission in a fixed order so the rejection message for any
/// given payload is deterministic: required names, name charset, mobile,
/// email, address fields (only those present), login id, password.
fn validate_registration(req: &RegisterRequest) -> Result<NewUser, &'static str> {
    let first_name = req.first_name.as_deref().unwrap_or("");
    let last_name = req.last_name.as_deref().unwrap_or("");
    if first_name.is_empty() {
        return Err("First name is required");
    }
    if last_name.is_empty() {
        return Err("Last name is required");
    }
    if !validate::is_alpha_text(first_name) {
        return Err("First name must contain only letters");
    }
    if !validate::is_alpha_text(last_name) {
        return Err("Last name must contain only letters");
    }

    let mobile_no = req.mobile_no.as_deref().unwrap_or("");
    if !validate::is_valid_mobile(mobile_no) {
        return Err("Mobile number must be exactly 10 digits");
    }

    let email_id = req.email_id.as_deref().unwrap_or("");
    if !validate::is_valid_email(email_id) {
        return Err("A valid email address is required");
    }

    let address = req.address.as_ref();
    let address_fields = [
        ("Street", address.and_then(|a| a.street.as_deref())),
        ("City", address.and_then(|a| a.city.as_deref())),
        ("State", address.and_then(|a| a.state.as_deref())),
        ("Country", address.and_then(|a| a.country.as_deref())),
    ];
    for (label, value) in address_fields {
        if let Some(value) = value {
            if !value.is_empty() && !validate::is_alpha_text(value) {
                return Err(match label {
                    "Street" => "Street must contain only letters",
                    "City" => "City must contain only letters",
                    "State" => "State must contain only letters",
                    _ => "Country must contain only letters",
                });
            }
        }
    }

    let login_id = req.login_id.as_deref().unwrap_or("");
    if !validate::is_valid_login_id(login_id) {
        return Err("Login ID must be exactly 8 alphanumeric characters");
    }

    let password = req.password.as_deref().unwrap_or("");
    if !validate::is_strong_password(password) {
        return Err(
            "Password must be at least 6 characters with an uppercase letter, \
             a lowercase letter, and a symbol",
        );
    }

    Ok(NewUser {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        mobile_no: mobile_no.to_string(),
        email_id: email_id.to_string(),
        login_id: login_id.to_string(),
        password: password.to_string(),
        street: address.and_then(|a| a.street.clone()),
        city: address.and_then(|a| a.city.clone()),
        state: address.and_then(|a| a.state.clone()),
        country: address.and_then(|a| a.country.clone()),
    })
}

// --- Handlers ---

/// POST /api/register
/// Validate, persist, and optionally join the caller's open WebSocket
/// connection to the live room so its own registration shows up without a
/// separate join event.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    // Fail fast: no store call for a payload that cannot be accepted
    let new_user = validate_registration(&req).map_err(bad_request)?;

    let db = state.db.clone();
    let created = tokio::task::spawn_blocking(move || {
        let conn = db.lock().map_err(|_| StoreError::Unavailable)?;
        store::create_user(&conn, new_user)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Registration task panicked");
        server_error()
    })?;

    let user = match created {
        Ok(user) => user,
        Err(
            e @ (StoreError::DuplicateEmail | StoreError::DuplicateLoginId | StoreError::Duplicate),
        ) => {
            return Err(bad_request(&e.to_string()));
        }
        Err(e) => {
            tracing::error!(error = %e, "Registration failed");
            return Err(server_error());
        }
    };

    tracing::info!(user_id = %user.id, email = %user.email_id, "User registered");

    // Register-and-appear-instantly: if the submission names a currently
    // open connection, join it now and broadcast. Ids of sockets that are
    // not open are ignored — no disconnect would ever clean them up.
    if let Some(connection_id) = req.connection_id.as_deref() {
        if state.connections.contains_key(connection_id)
            && state
                .presence
                .join(connection_id, &user.email_id, &user.display_name())
        {
            broadcast_live_users(&state);
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully!".to_string(),
            user_id: user.id,
        }),
    ))
}

/// GET /api/users — all users, newest first, safe projection.
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let db = state.db.clone();
    let users = tokio::task::spawn_blocking(move || {
        let conn = db.lock().map_err(|_| StoreError::Unavailable)?;
        store::list_users(&conn)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "List task panicked");
        server_error()
    })?
    .map_err(|e| {
        tracing::error!(error = %e, "Listing users failed");
        server_error()
    })?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/users/{email} — one user by email, safe projection.
pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let db = state.db.clone();
    let result = tokio::task::spawn_blocking(move || {
        let conn = db.lock().map_err(|_| StoreError::Unavailable)?;
        store::find_user_by_email(&conn, &email)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Lookup task panicked");
        server_error()
    })?;

    match result {
        Ok(user) => Ok(Json(UserResponse::from(user))),
        Err(StoreError::NotFound) => Err(not_found("User not found")),
        Err(e) => {
            tracing::error!(error = %e, "User lookup failed");
            Err(server_error())
        }
    }
}
