use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::model::user::User;

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(hash: &str, password: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("stored hash is malformed: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// The password an admin reset leaves behind: the user's own email.
pub fn default_password_hash(user_email: &str) -> anyhow::Result<String> {
    hash_password(user_email)
}

/// True while the user still has the reset/bootstrap password. Only a hint
/// for the login warning.
pub fn has_default_password(user: &User) -> anyhow::Result<bool> {
    verify_password(&user.password_hash, &user.email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::UserRole;

    fn user_with_hash(email: &str, hash: String) -> User {
        User {
            id: 1,
            name: "n".into(),
            email: email.into(),
            password_hash: hash,
            phone: None,
            address: None,
            image_file: "default.jpg".into(),
            role: UserRole::Client,
            created_ts: 0,
        }
    }

    #[test]
    fn hash_verifies_only_the_right_password() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password(&hash, "hunter2").unwrap());
        assert!(!verify_password(&hash, "hunter3").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("not-a-phc-string", "x").is_err());
    }

    #[test]
    fn detects_default_password() {
        let reset = user_with_hash("a@b.nl", default_password_hash("a@b.nl").unwrap());
        assert!(has_default_password(&reset).unwrap());

        let own = user_with_hash("a@b.nl", hash_password("something else").unwrap());
        assert!(!has_default_password(&own).unwrap());
    }
}
