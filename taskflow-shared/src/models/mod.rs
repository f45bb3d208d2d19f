/// Database models
///
/// - `user`: account records (email + password hash)
/// - `task`: per-user tasks, their CRUD operations, and the analytics
///   aggregation queries
///
/// Every task operation is owner-scoped: the statements filter by
/// `user_id` alongside any other predicate, so one user's tasks are never
/// visible to another.

pub mod task;
pub mod user;
