/// Database models and their queries
///
/// # Models
///
/// - `user`: user accounts, inserted at registration and looked up by
///   email or ID
/// - `task`: tasks, their create/update payloads, the search filter and the
///   per-user dashboard

pub mod task;
pub mod user;
