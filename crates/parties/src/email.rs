use dealership_core::{DomainError, DomainResult};

/// Canonical form used for storage and lookup: trimmed, lower-cased.
///
/// Only the shape `local@domain` is checked; deliverability is not.
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(DomainError::validation(format!("'{}' is not an email address", raw.trim())));
    }
    Ok(email)
}
