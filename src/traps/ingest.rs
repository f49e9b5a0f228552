use tracing::info;

use crate::{
    db::DBLayer,
    error::{AppError, AppResult},
    model::trap::Trap,
    notify::{Notification, NotificationHub},
    traps::mac::normalize_mac,
};

/// Device self-registration. Safe to repeat; returns whether a new record was
/// created.
pub async fn register_device(db: &DBLayer, raw_mac: &str) -> AppResult<bool> {
    let mac = normalize_mac(raw_mac)?;
    let created = db.insert_trap_if_absent(&mac).await?;
    if created {
        info!(mac = mac.as_str(), "trap registered");
    }
    Ok(created)
}

/// Stores a caught/armed report and notifies the owner. The notification is
/// sent after the write and its delivery does not affect the result.
pub async fn report_status(
    db: &DBLayer,
    hub: &NotificationHub,
    raw_mac: &str,
    caught: bool,
) -> AppResult<Trap> {
    let mac = normalize_mac(raw_mac)?;

    let trap = db
        .update_trap(&mac, |t| t.caught = caught)
        .await?
        .ok_or_else(|| AppError::not_found("trap not found"))?;

    info!(mac = mac.as_str(), caught, owner = ?trap.owner_id, "trap status updated");

    let user = trap.owner_id.unwrap_or_default();
    hub.publish(trap.owner_id, Notification::TrapChange { user })
        .await;

    Ok(trap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::temp_db;

    #[tokio::test]
    async fn double_registration_leaves_one_unowned_trap() {
        let (_dir, db) = temp_db();
        assert!(register_device(&db, "001122").await.unwrap());
        assert!(!register_device(&db, "00:11:22").await.unwrap());

        let traps = db.list_traps().await.unwrap();
        assert_eq!(traps.len(), 1);
        assert_eq!(traps[0].owner_id, None);
        assert!(!traps[0].caught);
    }

    #[tokio::test]
    async fn malformed_mac_is_invalid() {
        let (_dir, db) = temp_db();
        let err = register_device(&db, "not a mac").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn report_on_unknown_trap_creates_nothing() {
        let (_dir, db) = temp_db();
        let hub = NotificationHub::new();
        let err = report_status(&db, &hub, "abcdef", true).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(db.list_traps().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn report_sets_caught_and_reads_back() {
        let (_dir, db) = temp_db();
        let hub = NotificationHub::new();
        register_device(&db, "abcdef").await.unwrap();

        for status in [true, false, true] {
            report_status(&db, &hub, "ab:cd:ef", status).await.unwrap();
            assert_eq!(db.load_trap("abcdef").await.unwrap().unwrap().caught, status);
        }
    }

    #[tokio::test]
    async fn report_notifies_owner() {
        let (_dir, db) = temp_db();
        let hub = NotificationHub::new();
        register_device(&db, "abcdef").await.unwrap();
        db.update_trap("abcdef", |t| t.owner_id = Some(4)).await.unwrap();

        let mut sub = hub.subscribe(4).await;
        report_status(&db, &hub, "abcdef", true).await.unwrap();
        assert_eq!(
            sub.rx.recv().await.unwrap(),
            r#"{"event":"trap-change","data":{"user":4}}"#
        );
    }
}
