use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Trap {
    pub mac: String,               // normalized, see traps::mac
    pub name: Option<String>,      // set by the owner
    pub owner_id: Option<u64>,     // FK → User.id, None until claimed
    pub caught: bool,
    pub updated_ts: i64,
}

impl Trap {
    /// A freshly registered device: unowned and armed.
    pub fn new(mac: impl Into<String>) -> Self {
        Self {
            mac: mac.into(),
            name: None,
            owner_id: None,
            caught: false,
            updated_ts: chrono::Utc::now().timestamp(),
        }
    }
}
