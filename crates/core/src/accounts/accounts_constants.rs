/// Usernames that can never be registered or taken over by an update.
pub const RESERVED_USERNAMES: &[&str] = &["admin"];

/// Field names used in validation messages
pub mod fields {
    pub const USERNAME: &str = "username";
    pub const EMAIL: &str = "email";
    pub const SECRET: &str = "secret";
}

/// Returns true if the given username is reserved.
///
/// Matching is exact value equality on the already-trimmed username.
pub fn is_reserved_username(username: &str) -> bool {
    RESERVED_USERNAMES.iter().any(|reserved| *reserved == username)
}

/// Returns true if `email` has the shape `local@domain.tld`.
///
/// The address must contain exactly one `@`, a non-empty local part and a
/// domain with at least one inner `.`. Whitespace is rejected anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
