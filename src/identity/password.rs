use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};

pub const MIN_LENGTH: usize = 8;

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Returns the first rule the password breaks.
pub fn check_policy(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_LENGTH {
        return Err(format!(
            "Passwords must be at least {MIN_LENGTH} characters."
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Passwords must have at least one uppercase ('A'-'Z').".to_owned());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Passwords must have at least one lowercase ('a'-'z').".to_owned());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Passwords must have at least one digit ('0'-'9').".to_owned());
    }
    if password.chars().all(|c| c.is_alphanumeric()) {
        return Err("Passwords must have at least one non alphanumeric character.".to_owned());
    }
    Ok(())
}
