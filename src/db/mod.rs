use anyhow::{Context, Result};
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use std::str;
use tokio::sync::Mutex;

use crate::model::{
    trap::Trap,
    user::{NewUser, User, DEFAULT_IMAGE_FILE},
};

const USER_PREFIX: &str = "user:";
const TRAP_PREFIX: &str = "trap:";
const REVOKED_PREFIX: &str = "revoked:";
const USER_SEQ_KEY: &str = "meta:user_seq";

pub struct DBLayer {
    db: DB,
    // serializes read-modify-write sequences; plain reads skip it
    write_lock: Mutex<()>,
}

impl DBLayer {
    pub fn new(path: &str) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path).with_context(|| format!("failed to open db at {path}"))?;
        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn user_key(id: u64) -> String {
        format!("{USER_PREFIX}{id:020}")
        // 020 → zero-padded id so prefix scans come back in id order
    }

    fn email_key(email: &str) -> String {
        format!("user_email:{email}")
    }

    fn trap_key(mac: &str) -> String {
        format!("{TRAP_PREFIX}{mac}")
    }

    fn revoked_key(jti: &str) -> String {
        format!("{REVOKED_PREFIX}{jti}")
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.db
            .get(key)?
            .map(|v| serde_json::from_slice(&v))
            .transpose()
            .with_context(|| format!("corrupt record at {key}"))
    }

    fn scan_prefix<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>> {
        let mut out = Vec::new();

        for item in self
            .db
            .iterator(IteratorMode::From(prefix.as_bytes(), Direction::Forward))
        {
            let (key, val) = item?;
            let k = str::from_utf8(&key)?;
            if !k.starts_with(prefix) {
                break;
            }
            out.push(serde_json::from_slice(&val)?);
        }

        Ok(out)
    }

    // ============================================================
    // USER STORAGE
    // ============================================================

    /// Inserts a user with the next id. Returns `None` when the email is
    /// already registered; nothing is written in that case.
    pub async fn create_user(&self, new: NewUser) -> Result<Option<User>> {
        let _guard = self.write_lock.lock().await;

        let email_key = Self::email_key(&new.email);
        if self.db.get(&email_key)?.is_some() {
            return Ok(None);
        }

        let last_id = match self.db.get(USER_SEQ_KEY)? {
            Some(raw) => str::from_utf8(&raw)?
                .parse::<u64>()
                .context("corrupt user sequence")?,
            None => 0,
        };
        let id = last_id + 1;

        let user = User {
            id,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            phone: new.phone,
            address: new.address,
            image_file: DEFAULT_IMAGE_FILE.to_string(),
            role: new.role,
            created_ts: chrono::Utc::now().timestamp(),
        };

        let mut batch = WriteBatch::default();
        batch.put(Self::user_key(id), serde_json::to_vec(&user)?);
        batch.put(&email_key, id.to_string());
        batch.put(USER_SEQ_KEY, id.to_string());
        self.db.write(batch)?;

        Ok(Some(user))
    }

    pub async fn load_user(&self, id: u64) -> Result<Option<User>> {
        self.get_json(&Self::user_key(id))
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let Some(raw) = self.db.get(Self::email_key(email))? else {
            return Ok(None);
        };
        let id = str::from_utf8(&raw)?
            .parse::<u64>()
            .context("corrupt email index")?;
        self.load_user(id).await
    }

    /// First user (lowest id) whose display name matches exactly.
    pub async fn find_user_by_name(&self, name: &str) -> Result<Option<User>> {
        Ok(self
            .list_users()
            .await?
            .into_iter()
            .find(|u| u.name == name))
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.scan_prefix(USER_PREFIX)
    }

    /// Writes back a modified user, moving the email index when the email
    /// changed. Returns `false` (and writes nothing) if the new email belongs
    /// to someone else.
    pub async fn update_user(&self, user: &User) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let previous: Option<User> = self.get_json(&Self::user_key(user.id))?;
        let Some(previous) = previous else {
            anyhow::bail!("user {} does not exist", user.id);
        };

        let mut batch = WriteBatch::default();
        if previous.email != user.email {
            let new_key = Self::email_key(&user.email);
            if self.db.get(&new_key)?.is_some() {
                return Ok(false);
            }
            batch.delete(Self::email_key(&previous.email));
            batch.put(new_key, user.id.to_string());
        }
        batch.put(Self::user_key(user.id), serde_json::to_vec(user)?);
        self.db.write(batch)?;

        Ok(true)
    }

    /// Removes the user and their email index entry. Traps they owned stay
    /// behind, unowned. Returns the removed user.
    pub async fn delete_user(&self, id: u64) -> Result<Option<User>> {
        let _guard = self.write_lock.lock().await;

        let user: Option<User> = self.get_json(&Self::user_key(id))?;
        let Some(user) = user else {
            return Ok(None);
        };

        let owned: Vec<Trap> = self
            .list_traps()
            .await?
            .into_iter()
            .filter(|t| t.owner_id == Some(id))
            .collect();

        let mut batch = WriteBatch::default();
        batch.delete(Self::user_key(id));
        batch.delete(Self::email_key(&user.email));

        let now = chrono::Utc::now().timestamp();
        for mut trap in owned {
            trap.owner_id = None;
            trap.updated_ts = now;
            batch.put(Self::trap_key(&trap.mac), serde_json::to_vec(&trap)?);
        }

        self.db.write(batch)?;
        Ok(Some(user))
    }

    // ============================================================
    // TRAP STORAGE
    // ============================================================

    /// Creates an unowned trap unless one with this MAC exists.
    /// Returns whether a record was created.
    pub async fn insert_trap_if_absent(&self, mac: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let key = Self::trap_key(mac);
        if self.db.get(&key)?.is_some() {
            return Ok(false);
        }
        self.db.put(key, serde_json::to_vec(&Trap::new(mac))?)?;
        Ok(true)
    }

    pub async fn load_trap(&self, mac: &str) -> Result<Option<Trap>> {
        self.get_json(&Self::trap_key(mac))
    }

    /// Read → modify → write for one trap. Returns the stored value, or
    /// `None` when no trap has this MAC.
    pub async fn update_trap<F>(&self, mac: &str, apply: F) -> Result<Option<Trap>>
    where
        F: FnOnce(&mut Trap) + Send,
    {
        let _guard = self.write_lock.lock().await;

        let key = Self::trap_key(mac);
        let trap: Option<Trap> = self.get_json(&key)?;
        let Some(mut trap) = trap else {
            return Ok(None);
        };

        apply(&mut trap);
        trap.mac = mac.to_string();
        trap.updated_ts = chrono::Utc::now().timestamp();
        self.db.put(key, serde_json::to_vec(&trap)?)?;

        Ok(Some(trap))
    }

    pub async fn delete_trap(&self, mac: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let key = Self::trap_key(mac);
        if self.db.get(&key)?.is_none() {
            return Ok(false);
        }
        self.db.delete(key)?;
        Ok(true)
    }

    /// All traps, ordered by MAC.
    pub async fn list_traps(&self) -> Result<Vec<Trap>> {
        self.scan_prefix(TRAP_PREFIX)
    }

    // ============================================================
    // SESSION REVOCATION
    // ============================================================

    /// Remembers `jti` until `exp`. Entries that already expired are
    /// dropped on the way.
    pub async fn revoke_token(&self, jti: &str, exp: i64) -> Result<()> {
        self.prune_revoked_tokens(chrono::Utc::now().timestamp())
            .await?;
        self.db.put(Self::revoked_key(jti), exp.to_string())?;
        Ok(())
    }

    pub async fn is_token_revoked(&self, jti: &str) -> Result<bool> {
        Ok(self.db.get(Self::revoked_key(jti))?.is_some())
    }

    /// Deletes every revocation whose expiry is before `now`; an expired
    /// token fails validation on its own. Returns how many were removed.
    pub async fn prune_revoked_tokens(&self, now: i64) -> Result<usize> {
        let _guard = self.write_lock.lock().await;

        let mut batch = WriteBatch::default();
        let mut removed = 0;

        for item in self
            .db
            .iterator(IteratorMode::From(REVOKED_PREFIX.as_bytes(), Direction::Forward))
        {
            let (key, val) = item?;
            if !key.starts_with(REVOKED_PREFIX.as_bytes()) {
                break;
            }
            // unreadable expiry counts as expired
            let exp = str::from_utf8(&val)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .unwrap_or(i64::MIN);
            if exp < now {
                batch.delete(&key);
                removed += 1;
            }
        }

        if removed > 0 {
            self.db.write(batch)?;
        }
        Ok(removed)
    }
}
