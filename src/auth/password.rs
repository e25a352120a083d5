use bcrypt::{hash, verify};

use super::AuthError;

pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(hash(password, cost)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(verify(password, hash)?)
}

/// At least 8 characters with one letter and one digit
pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < 8 {
        return Err(AuthError::WeakPassword(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_letter || !has_digit {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one letter and one number".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_rules() {
        assert!(validate_password_strength("abc123").is_err());
        assert!(validate_password_strength("abcdefgh").is_err());
        assert!(validate_password_strength("12345678").is_err());
        assert!(validate_password_strength("courtside1").is_ok());
    }

    #[test]
    fn hash_then_verify() {
        let hashed = hash_password("courtside1", 4).unwrap();
        assert!(verify_password("courtside1", &hashed).unwrap());
        assert!(!verify_password("courtside2", &hashed).unwrap());
    }
}
