//! Signed-in identity shared by every view.
//!
//! The session is created once with [`Session::init`] from whatever the
//! storage backend persisted and is torn down explicitly on logout or on any
//! authentication failure. Network code receives it by handle instead of
//! reading storage on its own.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

use crate::models::{Booking, Role, User};

pub const TOKEN_KEY: &str = "userToken";
pub const USER_INFO_KEY: &str = "userInfo";
pub const USER_MEETINGS_KEY: &str = "userMeetings";

/// Key-value persistence for the session (browser `localStorage` or memory)
pub trait TokenStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-process storage used natively and in tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let mut storage = Self::new();
        storage.set(TOKEN_KEY, token);
        storage
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    /// Restore the persisted token and cached user
    pub fn init(storage: &dyn TokenStorage) -> Self {
        let token = storage.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let user = token
            .as_ref()
            .and_then(|_| read_json::<User>(storage, USER_INFO_KEY));
        Self { token, user }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Role of the cached user, anonymous when unknown
    pub fn role(&self) -> Role {
        self.user.as_ref().map(|u| u.role).unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_admin()
    }

    /// Store a freshly issued token
    pub fn sign_in(&mut self, token: &str, storage: &mut dyn TokenStorage) {
        storage.set(TOKEN_KEY, token);
        self.token = Some(token.to_string());
    }

    pub fn cache_user(&mut self, user: User, storage: &mut dyn TokenStorage) {
        write_json(storage, USER_INFO_KEY, &user);
        self.user = Some(user);
    }

    pub fn cache_meetings(&self, meetings: &[Booking], storage: &mut dyn TokenStorage) {
        write_json(storage, USER_MEETINGS_KEY, &meetings);
    }

    pub fn cached_meetings(&self, storage: &dyn TokenStorage) -> Vec<Booking> {
        read_json(storage, USER_MEETINGS_KEY).unwrap_or_default()
    }

    /// Forget the token and every cache derived from it
    pub fn teardown(&mut self, storage: &mut dyn TokenStorage) {
        storage.remove(TOKEN_KEY);
        storage.remove(USER_INFO_KEY);
        storage.remove(USER_MEETINGS_KEY);
        self.token = None;
        self.user = None;
    }
}

fn read_json<T: DeserializeOwned>(storage: &dyn TokenStorage, key: &str) -> Option<T> {
    storage
        .get(key)
        .and_then(|raw| serde_json::from_str(&raw).ok())
}

fn write_json<T: Serialize + ?Sized>(storage: &mut dyn TokenStorage, key: &str, value: &T) {
    if let Ok(raw) = serde_json::to_string(value) {
        storage.set(key, &raw);
    }
}
