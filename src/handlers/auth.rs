use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, Json};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::create_token;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub phone: String,
    pub password: String,
    pub full_name: String,
    /// "user" (default) or "vendor"; admin accounts are seeded, never registered.
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub phone: String,
    pub full_name: String,
    pub role: UserRole,
}

fn validate_phone(phone: &str) -> AppResult<()> {
    let rest = phone
        .strip_prefix('+')
        .ok_or_else(|| AppError::BadRequest("Phone must start with '+'".to_string()))?;
    if rest.len() < 7 || !rest.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest(
            "Phone must be digits in international format".to_string(),
        ));
    }
    Ok(())
}

/// Register a new user or vendor account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    validate_phone(&payload.phone)?;
    if payload.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let role = match payload.role {
        None => UserRole::User,
        Some(UserRole::Admin) => {
            return Err(AppError::Forbidden(
                "Admin accounts cannot be registered".to_string(),
            ))
        }
        Some(role) => role,
    };

    // Check if phone already exists
    let existing = user::Entity::find()
        .filter(user::Column::Phone.eq(&payload.phone))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Phone already registered".to_string()));
    }

    // Hash password
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    // Create user
    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        phone: Set(payload.phone.clone()),
        password_hash: Set(password_hash),
        full_name: Set(payload.full_name.clone()),
        role: Set(role),
        created_at: Set(chrono::Utc::now().into()),
    };

    let user = new_user.insert(&state.db).await?;

    // Generate token
    let token = create_token(
        user.id,
        &user.phone,
        user.role.clone(),
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    Ok(Json(AuthResponse {
        token,
        user: UserInfo {
            id: user.id,
            phone: user.phone,
            full_name: user.full_name,
            role: user.role,
        },
    }))
}

/// Login with phone and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // Find user by phone
    let user = user::Entity::find()
        .filter(user::Column::Phone.eq(&payload.phone))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid phone or password".to_string()))?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid phone or password".to_string()))?;

    // Generate token
    let token = create_token(
        user.id,
        &user.phone,
        user.role.clone(),
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    Ok(Json(AuthResponse {
        token,
        user: UserInfo {
            id: user.id,
            phone: user.phone,
            full_name: user.full_name,
            role: user.role,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validation() {
        assert!(validate_phone("+911234567890").is_ok());
        assert!(validate_phone("911234567890").is_err());
        assert!(validate_phone("+12ab34").is_err());
        assert!(validate_phone("+123").is_err());
    }
}
