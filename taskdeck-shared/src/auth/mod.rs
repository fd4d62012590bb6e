/// Credential handling
///
/// - [`password`]: Argon2id hashing and constant-time verification

pub mod password;
