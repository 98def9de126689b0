use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use quill_db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    key: Key,
}

impl AppState {
    /// The session signing key is derived from the configured secret. The
    /// secret is digested first so secrets of any length are accepted.
    pub fn new(db: Database, secret_key: &str) -> Self {
        let digest = Sha512::digest(secret_key.as_bytes());
        Self {
            db: Arc::new(db),
            key: Key::derive_from(&digest),
        }
    }
}

// SignedCookieJar extraction pulls the signing key out of the state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.key.clone()
    }
}
