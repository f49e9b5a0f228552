use anyhow::Result;
use tracing::info;

use crate::{
    auth::password::default_password_hash,
    db::DBLayer,
    model::user::{NewUser, UserRole},
};

/// Makes sure an admin account exists for `email`. A new account gets the
/// default password so the first login asks for a change. An existing account
/// is left exactly as it is.
pub async fn ensure_admin(db: &DBLayer, email: &str) -> Result<()> {
    if db.find_user_by_email(email).await?.is_some() {
        return Ok(());
    }

    let new = NewUser {
        name: "admin".to_string(),
        email: email.to_string(),
        password_hash: default_password_hash(email)?,
        phone: None,
        address: None,
        role: UserRole::Admin,
    };

    if let Some(user) = db.create_user(new).await? {
        info!(user_id = user.id, email, "bootstrap admin created");
    }
    Ok(())
}
