/// Request auth gate for protected routes
///
/// Axum middleware that resolves the caller's identity before a handler
/// runs. Credential lookup is an ordered list of extraction strategies,
/// first match wins:
///
/// 1. Bearer token from the `Authorization` header
/// 2. Token from a cookie named `token`
///
/// The credential is validated as an access token; on success an
/// [`AuthContext`] carrying the user id is inserted into the request
/// extensions for handlers to pull out with `Extension`. Validation is
/// stateless and per-request — there is no session store and no revocation
/// list, so a compromised access token stays valid until it expires.
///
/// # Example
///
/// ```no_run
/// use axum::Extension;
/// use taskflow_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("user {}", auth.user_id)
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::validate_access_token;

/// Cookie consulted when no Authorization header is present
pub const TOKEN_COOKIE: &str = "token";

/// Identity attached to the request after successful authentication
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user id
    pub user_id: Uuid,
}

/// Error type for the auth gate
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// No credential found in header or cookie
    MissingCredentials,

    /// Credential failed validation (bad signature, malformed, expired)
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let msg = match self {
            AuthError::MissingCredentials => "No token, authorization denied",
            AuthError::InvalidToken => "Token is not valid",
        };

        (StatusCode::UNAUTHORIZED, Json(json!({ "msg": msg }))).into_response()
    }
}

/// Credential extraction strategy: returns the raw token if present
type Extractor = fn(&HeaderMap) -> Option<String>;

/// Bearer token from the `Authorization` header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Token from the `token` cookie
fn cookie_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
}

/// Ordered extraction strategies; first match wins
const EXTRACTORS: &[Extractor] = &[bearer_token, cookie_token];

/// Finds the first credential offered by the request, if any
pub fn extract_credential(headers: &HeaderMap) -> Option<String> {
    EXTRACTORS.iter().find_map(|extract| extract(headers))
}

/// Auth gate middleware
///
/// Wire it with `axum::middleware::from_fn_with_state`, closing over the
/// access-token secret:
///
/// ```no_run
/// # use axum::{middleware, routing::get, Router};
/// # use taskflow_shared::auth::middleware::auth_gate;
/// let secret = "access-secret".to_string();
/// let app: Router = Router::new()
///     .route("/protected", get(|| async { "ok" }))
///     .layer(middleware::from_fn(move |req, next| {
///         auth_gate(secret.clone(), req, next)
///     }));
/// ```
///
/// # Errors
///
/// Responds 401 with `{"msg": ...}` when no credential is found or the
/// credential does not validate as an access token.
pub async fn auth_gate(secret: String, mut req: Request, next: Next) -> Result<Response, AuthError> {
    let token = extract_credential(req.headers()).ok_or(AuthError::MissingCredentials)?;

    let claims = validate_access_token(&token, &secret).map_err(|e| {
        tracing::debug!("access token rejected: {e}");
        AuthError::InvalidToken
    })?;

    req.extensions_mut()
        .insert(AuthContext { user_id: claims.sub });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_bearer_token_extracted() {
        let h = headers(&[("authorization", "Bearer abc123")]);
        assert_eq!(extract_credential(&h), Some("abc123".to_string()));
    }

    #[test]
    fn test_cookie_fallback() {
        let h = headers(&[("cookie", "token=from-cookie; other=x")]);
        assert_eq!(extract_credential(&h), Some("from-cookie".to_string()));
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let h = headers(&[
            ("authorization", "Bearer from-header"),
            ("cookie", "token=from-cookie"),
        ]);
        assert_eq!(extract_credential(&h), Some("from-header".to_string()));
    }

    #[test]
    fn test_non_bearer_scheme_ignored() {
        // A Basic credential is not ours; the cookie strategy still runs
        let h = headers(&[
            ("authorization", "Basic dXNlcjpwYXNz"),
            ("cookie", "token=from-cookie"),
        ]);
        assert_eq!(extract_credential(&h), Some("from-cookie".to_string()));
    }

    #[test]
    fn test_no_credential() {
        assert_eq!(extract_credential(&HeaderMap::new()), None);
    }

    #[test]
    fn test_auth_error_responses() {
        let resp = AuthError::MissingCredentials.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = AuthError::InvalidToken.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
