//! Shared handle to the signed-in session and its storage backend

use std::sync::Arc;

use deskbook_core::{Booking, MemoryStorage, Role, Session, TokenStorage, User};
use parking_lot::Mutex;

struct SessionCell {
    session: Session,
    storage: Box<dyn TokenStorage + Send>,
}

/// Cloneable handle injected into every network call site
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionCell>>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cell = self.inner.lock();
        f.debug_struct("SessionHandle")
            .field("has_token", &cell.session.has_token())
            .field("role", &cell.session.role())
            .finish()
    }
}

impl SessionHandle {
    /// Restore whatever `storage` persisted
    pub fn init(storage: impl TokenStorage + Send + 'static) -> Self {
        let session = Session::init(&storage);
        Self {
            inner: Arc::new(Mutex::new(SessionCell {
                session,
                storage: Box::new(storage),
            })),
        }
    }

    pub fn in_memory() -> Self {
        Self::init(MemoryStorage::new())
    }

    pub fn token(&self) -> Option<String> {
        self.inner.lock().session.token().map(str::to_string)
    }

    pub fn has_token(&self) -> bool {
        self.inner.lock().session.has_token()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.lock().session.user().cloned()
    }

    pub fn role(&self) -> Role {
        self.inner.lock().session.role()
    }

    pub fn is_admin(&self) -> bool {
        self.inner.lock().session.is_admin()
    }

    pub fn sign_in(&self, token: &str) {
        let mut cell = self.inner.lock();
        let SessionCell { session, storage } = &mut *cell;
        session.sign_in(token, storage.as_mut());
    }

    pub fn cache_user(&self, user: User) {
        let mut cell = self.inner.lock();
        let SessionCell { session, storage } = &mut *cell;
        session.cache_user(user, storage.as_mut());
    }

    pub fn cache_meetings(&self, meetings: &[Booking]) {
        let mut cell = self.inner.lock();
        let SessionCell { session, storage } = &mut *cell;
        session.cache_meetings(meetings, storage.as_mut());
    }

    pub fn cached_meetings(&self) -> Vec<Booking> {
        let cell = self.inner.lock();
        cell.session.cached_meetings(cell.storage.as_ref())
    }

    /// Drop the token and every cache derived from it
    pub fn teardown(&self) {
        let mut cell = self.inner.lock();
        let SessionCell { session, storage } = &mut *cell;
        session.teardown(storage.as_mut());
        tracing::info!("Session cleared");
    }
}
