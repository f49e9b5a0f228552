use std::sync::Arc;

use crate::{db::DBLayer, notify::NotificationHub, storage::StorageService};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DBLayer>,
    pub hub: Arc<NotificationHub>,
    pub storage: StorageService,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}
