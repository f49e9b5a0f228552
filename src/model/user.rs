use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_FILE: &str = "default.jpg";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    #[default]
    Client,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_image_file")]
    pub image_file: String,
    #[serde(default)]
    pub role: UserRole,
    pub created_ts: i64,
}

fn default_image_file() -> String {
    DEFAULT_IMAGE_FILE.to_string()
}

/// Fields supplied at registration; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
}

/// What clients get to see of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image_url: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactCard {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            image_url: format!("/static/profile_pics/{}", self.image_file),
            role: self.role,
        }
    }

    pub fn contact_card(&self) -> ContactCard {
        ContactCard {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
        }
    }
}

/// Joins the registration form's address parts as
/// `"{street} {housenumber}\n{postcode} {place}"`. Returns `None` when every
/// part is blank.
pub fn compose_address(street: &str, housenumber: &str, postcode: &str, place: &str) -> Option<String> {
    let parts = [street, housenumber, postcode, place].map(str::trim);
    if parts.iter().all(|p| p.is_empty()) {
        return None;
    }
    let [street, housenumber, postcode, place] = parts;
    Some(format!("{street} {housenumber}\n{postcode} {place}"))
}
