use tracing::info;

use crate::{
    db::DBLayer,
    error::{AppError, AppResult},
    model::trap::Trap,
    traps::mac::normalize_mac,
};

fn trap_not_found() -> AppError {
    AppError::not_found("trap not found")
}

/// Makes `user_id` the owner. Whoever owned the trap before loses it.
pub async fn claim_trap(db: &DBLayer, user_id: u64, raw_mac: &str) -> AppResult<Trap> {
    let mac = normalize_mac(raw_mac)?;
    let trap = db
        .update_trap(&mac, |t| t.owner_id = Some(user_id))
        .await?
        .ok_or_else(trap_not_found)?;

    info!(mac = mac.as_str(), user_id, "trap claimed");
    Ok(trap)
}

/// Sets the display name and, when `owner_email` is given, hands the trap to
/// that user. A blank name clears it; no name leaves it as it was.
pub async fn rename_trap(
    db: &DBLayer,
    raw_mac: &str,
    name: Option<&str>,
    owner_email: Option<&str>,
) -> AppResult<Trap> {
    let mac = normalize_mac(raw_mac)?;

    // resolve the owner before touching the trap so a bad email changes nothing
    let new_owner = match owner_email.map(|e| e.trim().to_lowercase()) {
        Some(email) if !email.is_empty() => Some(
            db.find_user_by_email(&email)
                .await?
                .ok_or_else(|| AppError::not_found(format!("no user with email {email}")))?
                .id,
        ),
        _ => None,
    };

    // Some("") → clear, None → keep
    let name = name.map(|n| Some(n.trim()).filter(|n| !n.is_empty()).map(str::to_string));

    let trap = db
        .update_trap(&mac, |t| {
            if let Some(name) = name {
                t.name = name;
            }
            if let Some(owner) = new_owner {
                t.owner_id = Some(owner);
            }
        })
        .await?
        .ok_or_else(trap_not_found)?;

    info!(mac = mac.as_str(), owner = ?trap.owner_id, "trap renamed");
    Ok(trap)
}

pub async fn delete_trap(db: &DBLayer, raw_mac: &str) -> AppResult<()> {
    let mac = normalize_mac(raw_mac)?;
    if !db.delete_trap(&mac).await? {
        return Err(trap_not_found());
    }
    info!(mac = mac.as_str(), "trap deleted");
    Ok(())
}

pub async fn get_trap(db: &DBLayer, raw_mac: &str) -> AppResult<Trap> {
    let mac = normalize_mac(raw_mac)?;
    db.load_trap(&mac).await?.ok_or_else(trap_not_found)
}

/// Every trap in the store, whoever owns it.
pub async fn list_traps(db: &DBLayer) -> AppResult<Vec<Trap>> {
    Ok(db.list_traps().await?)
}
