/// Database layer
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `schema`: idempotent table creation run at startup
///
/// Queries live on the model types in the `models` module.

pub mod pool;
pub mod schema;
