/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2 password hashing and verification
/// - [`jwt`]: JWT token generation and validation
///
/// Both are thin wrappers over library calls; the user repository and the
/// login handler are their only callers.

pub mod jwt;
pub mod password;
