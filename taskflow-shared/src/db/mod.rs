/// Database layer
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: embedded migration runner
///
/// The pool is created explicitly at startup and handed to the router as
/// part of the application state — never a lazy global.

pub mod migrations;
pub mod pool;
