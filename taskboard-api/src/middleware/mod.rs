/// Middleware modules for the API server
///
/// - `cors`: allow-list CORS policy with `OPTIONS` short-circuit

pub mod cors;
