/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/signup` - Create an account, returns user + access
///   token and sets the refresh cookie
/// - `POST /api/auth/login` - Verify credentials, same response shape
/// - `POST /api/auth/refresh` - Exchange the refresh cookie for a new
///   access token
///
/// The access token is returned in the body for the client to send as a
/// bearer header. The refresh token never appears in the body — it lives
/// in an httpOnly `refreshToken` cookie (SameSite=Lax, 7-day max-age) so
/// the browser client cannot read it.
///
/// A failed login is always "Invalid credentials"; the response never
/// says whether the email or the password was wrong.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use validator::Validate;

use taskflow_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};

/// Cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Valid email is required"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Valid email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Public view of a user — no password hash
#[derive(Debug, Serialize)]
pub struct UserBody {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Signup/login response: the user and an access token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserBody,
    pub token: String,
}

/// Refresh response: a new access token
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// Builds the httpOnly refresh cookie
fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(7))
        .path("/")
        .build()
}

/// Issues both token classes for a user; the access token is returned,
/// the refresh token goes into the cookie jar
fn issue_tokens(state: &AppState, user_id: uuid::Uuid, jar: CookieJar) -> ApiResult<(String, CookieJar)> {
    let access_claims = jwt::Claims::new(user_id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user_id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.access_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.refresh_secret())?;

    Ok((access_token, jar.add(refresh_cookie(refresh_token))))
}

/// Creates a new account
///
/// # Errors
///
/// - `400`: validation failed, or the email is already registered
/// - `500`: server error
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    req.validate()?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::validation("User already exists"));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    let (token, jar) = issue_tokens(&state, user.id, jar)?;

    tracing::info!(user_id = %user.id, "user signed up");

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            user: UserBody::from(&user),
            token,
        }),
    ))
}

/// Verifies credentials and starts a session
///
/// # Errors
///
/// - `400`: validation failed or credentials don't match
/// - `500`: server error
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::validation("Invalid credentials"))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::validation("Invalid credentials"));
    }

    let (token, jar) = issue_tokens(&state, user.id, jar)?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok((
        jar,
        Json(AuthResponse {
            user: UserBody::from(&user),
            token,
        }),
    ))
}

/// Exchanges the refresh cookie for a new access token
///
/// # Errors
///
/// - `401`: no refresh cookie, or the refresh token is invalid/expired
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<Json<RefreshResponse>> {
    let refresh_token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::Unauthorized("No refresh token".to_string()))?;

    let token = jwt::refresh_access_token(
        &refresh_token,
        state.refresh_secret(),
        state.access_secret(),
    )
    .map_err(|_| ApiError::Unauthorized("Invalid or expired refresh token".to_string()))?;

    Ok(Json(RefreshResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cookie_attributes() {
        let cookie = refresh_cookie("some-token".to_string());

        assert_eq!(cookie.name(), "refreshToken");
        assert_eq!(cookie.value(), "some-token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_signup_validation_rules() {
        let ok = SignupRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = SignupRequest {
            email: "not-an-email".to_string(),
            ..ok_clone(&ok)
        };
        assert!(bad_email.validate().is_err());

        let short_password = SignupRequest {
            password: "five5".to_string(),
            ..ok_clone(&ok)
        };
        assert!(short_password.validate().is_err());

        let empty_name = SignupRequest {
            name: String::new(),
            ..ok_clone(&ok)
        };
        assert!(empty_name.validate().is_err());
    }

    fn ok_clone(req: &SignupRequest) -> SignupRequest {
        SignupRequest {
            name: req.name.clone(),
            email: req.email.clone(),
            password: req.password.clone(),
        }
    }

    #[test]
    fn test_user_body_hides_password_hash() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let body = serde_json::to_string(&UserBody::from(&user)).unwrap();
        assert!(!body.contains("argon2id"));
        assert!(body.contains("ada@example.com"));
    }
}
