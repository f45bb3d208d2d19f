/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Access/refresh token generation and validation
/// - [`middleware`]: Request-level auth gate for protected routes
///
/// Access and refresh tokens are signed with *different* secrets, so a
/// leaked access-token key cannot be used to forge long-lived refresh
/// tokens. The short access lifetime bounds the damage window of a leaked
/// access token; the refresh token lets a client re-authenticate silently.

pub mod jwt;
pub mod middleware;
pub mod password;
