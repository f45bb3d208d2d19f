/// API route handlers
///
/// - `health`: health check endpoint
/// - `auth`: signup, login, token refresh
/// - `tasks`: task CRUD, list with filter/sort/paginate, dashboard
///   analytics

pub mod auth;
pub mod health;
pub mod tasks;
