use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::{
    error::StoreError,
    state::AppState,
    users::{
        dto::{
            AddFavoriteRequest, ChangePasswordRequest, FavoritesResponse, LoginRequest,
            LoginResponse, MessageResponse, ProfileResponse, RegisterRequest, RegisterResponse,
            UpdatedProfileResponse,
        },
        model::ProfileUpdate,
    },
};

const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/:user_id/profile", get(get_profile).put(update_profile))
        .route("/user/:user_id/change-password", post(change_password))
        .route("/user/:user_id/favorites", post(add_favorite))
        .route("/user/:user_id/favorites/:index", delete(remove_favorite))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), (StatusCode, String)> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        warn!("register missing email or password");
        return Err((
            StatusCode::BAD_REQUEST,
            "Email and password are required".into(),
        ));
    };

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email format");
        return Err((StatusCode::BAD_REQUEST, "Invalid email format".into()));
    }

    if password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err((
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters".into(),
        ));
    }

    match state.store.register(&email, &password).await {
        Ok(registered) => {
            info!(user_id = registered.id, email = %registered.email, "user registered");
            Ok((
                StatusCode::CREATED,
                Json(RegisterResponse {
                    id: registered.id,
                    email: registered.email,
                    message: "User registered successfully",
                }),
            ))
        }
        Err(StoreError::DuplicateEmail) => {
            warn!(email = %email, "email already registered");
            Err((StatusCode::BAD_REQUEST, "Email already exists".into()))
        }
        Err(e) => {
            error!(error = %e, "register failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        warn!("login missing email or password");
        return Err((
            StatusCode::BAD_REQUEST,
            "Email and password are required".into(),
        ));
    };

    match state.store.login(&email, &password).await {
        Ok(user) => {
            info!(user_id = user.id, email = %user.email, "user logged in");
            Ok(Json(LoginResponse {
                id: user.id,
                email: user.email,
                goal: user.goal,
                age: user.age,
                sex: user.sex,
                calories: user.calories,
                message: "Login successful",
            }))
        }
        Err(StoreError::InvalidCredentials) => {
            warn!(email = %email, "login invalid credentials");
            Err((StatusCode::UNAUTHORIZED, "Invalid email or password".into()))
        }
        Err(e) => {
            error!(error = %e, "login failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    match state.store.get(user_id).await {
        Ok(user) => Ok(Json(user.into())),
        Err(StoreError::NotFound) => {
            warn!(user_id, "profile not found");
            Err((StatusCode::NOT_FOUND, "User not found".into()))
        }
        Err(e) => {
            error!(error = %e, user_id, "get profile failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<UpdatedProfileResponse>, (StatusCode, String)> {
    match state.store.update_profile(user_id, payload).await {
        Ok(user) => {
            info!(user_id, "profile updated");
            Ok(Json(UpdatedProfileResponse {
                message: "Profile updated successfully",
                user: user.into(),
            }))
        }
        Err(StoreError::NotFound) => {
            warn!(user_id, "update for unknown user");
            Err((StatusCode::BAD_REQUEST, "User not found".into()))
        }
        Err(e) => {
            error!(error = %e, user_id, "update profile failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let (Some(old_password), Some(new_password)) = (payload.old_password, payload.new_password)
    else {
        warn!(user_id, "change-password missing fields");
        return Err((
            StatusCode::BAD_REQUEST,
            "oldPassword and newPassword are required".into(),
        ));
    };

    if new_password.len() < MIN_PASSWORD_LEN {
        warn!(user_id, "new password too short");
        return Err((
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters".into(),
        ));
    }

    match state
        .store
        .change_password(user_id, &old_password, &new_password)
        .await
    {
        Ok(()) => {
            info!(user_id, "password changed");
            Ok(Json(MessageResponse {
                message: "Password changed successfully",
            }))
        }
        Err(StoreError::NotFound) => {
            warn!(user_id, "change-password for unknown user");
            Err((StatusCode::BAD_REQUEST, "User not found".into()))
        }
        Err(StoreError::InvalidCredentials) => {
            warn!(user_id, "change-password wrong old password");
            Err((
                StatusCode::BAD_REQUEST,
                "Current password is incorrect".into(),
            ))
        }
        Err(e) => {
            error!(error = %e, user_id, "change password failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn add_favorite(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Json(payload): Json<AddFavoriteRequest>,
) -> Result<Json<FavoritesResponse>, (StatusCode, String)> {
    let Some(item) = payload.food_item else {
        warn!(user_id, "add-favorite missing foodItem");
        return Err((StatusCode::BAD_REQUEST, "foodItem is required".into()));
    };

    match state.store.add_favorite(user_id, item).await {
        Ok(favorites) => Ok(Json(FavoritesResponse {
            message: "Favorite added",
            favorites,
        })),
        Err(StoreError::NotFound) => {
            warn!(user_id, "add-favorite for unknown user");
            Err((StatusCode::BAD_REQUEST, "User not found".into()))
        }
        Err(e) => {
            error!(error = %e, user_id, "add favorite failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path((user_id, index)): Path<(u64, usize)>,
) -> Result<Json<FavoritesResponse>, (StatusCode, String)> {
    match state.store.remove_favorite(user_id, index).await {
        Ok(favorites) => Ok(Json(FavoritesResponse {
            message: "Favorite removed",
            favorites,
        })),
        Err(StoreError::EmptyFavorites) => {
            warn!(user_id, "remove-favorite on empty list");
            Err((StatusCode::BAD_REQUEST, "No favorites to remove".into()))
        }
        Err(StoreError::NotFound) => {
            warn!(user_id, "remove-favorite for unknown user");
            Err((StatusCode::BAD_REQUEST, "User not found".into()))
        }
        Err(e) => {
            error!(error = %e, user_id, "remove favorite failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
