use serde::{Deserialize, Serialize};

use crate::model::{trap::Trap, user::UserRole};

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Left out or blank to keep the current password.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClaimTrapRequest {
    pub mac: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTrapRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// Hands the trap to the user with this email.
    #[serde(default)]
    pub owner_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrapsResponse {
    pub traps: Vec<Trap>,
}

#[derive(Debug, Deserialize)]
pub struct SearchUserRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: UserRole,
}
