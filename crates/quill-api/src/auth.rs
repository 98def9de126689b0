use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::Form;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;
use tracing::info;

use quill_db::Database;
use quill_db::models::UserRow;

use crate::error::{AppError, blocking};
use crate::pages;
use crate::session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

pub async fn register_page() -> Html<String> {
    pages::register(None)
}

/// POST /auth/register. On success the new user is sent to the login page;
/// there is no auto-login.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let db = state.db.clone();
    let res = blocking(move || register_user(&db, &form.username, &form.password)).await;

    match res {
        Ok(username) => {
            info!("registered user {username}");
            Ok(Redirect::to("/auth/login").into_response())
        }
        Err(AppError::Validation(msg)) => Ok(pages::register(Some(&msg)).into_response()),
        Err(e) => Err(e),
    }
}

pub async fn login_page() -> Html<String> {
    pages::login(None)
}

/// POST /auth/login. Establishes the signed session cookie on success.
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let db = state.db.clone();
    let res = blocking(move || authenticate(&db, &form.username, &form.password)).await;

    match res {
        Ok(user) => {
            info!("user {} logged in", user.username);
            let jar = session::establish(jar, user.id);
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(AppError::Auth(msg)) => Ok(pages::login(Some(&msg)).into_response()),
        Err(e) => Err(e),
    }
}

/// GET /auth/logout. Idempotent: clearing an absent session is a no-op.
pub async fn logout(jar: SignedCookieJar) -> impl IntoResponse {
    (session::clear(jar), Redirect::to("/"))
}

/// Validate and insert a new user. Returns the username for logging.
fn register_user(db: &Database, username: &str, password: &str) -> Result<String, AppError> {
    if username.is_empty() {
        return Err(AppError::Validation("Username is required.".into()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("Password is required.".into()));
    }

    let hash = hash_password(password)?;
    match db.create_user(username, &hash).map_err(AppError::from)? {
        Some(_) => Ok(username.to_string()),
        None => Err(AppError::Validation(format!(
            "User {username} is already registered."
        ))),
    }
}

/// Check credentials against the stored hash. The two error messages are
/// fixed; nothing else about the failure is revealed.
fn authenticate(db: &Database, username: &str, password: &str) -> Result<UserRow, AppError> {
    let Some(user) = db.get_user_by_username(username).map_err(AppError::from)? else {
        return Err(AppError::Auth("Incorrect username.".into()));
    };

    let parsed = PasswordHash::new(&user.password)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("stored password hash invalid: {e}")))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::Auth("Incorrect password.".into()))?;

    Ok(user)
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use quill_db::Database;

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) | AppError::Auth(msg) => msg,
            other => panic!("expected a recoverable error, got {other:?}"),
        }
    }

    #[test]
    fn register_validates_username_before_password() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(
            message(register_user(&db, "", "").unwrap_err()),
            "Username is required."
        );
        assert_eq!(
            message(register_user(&db, "a", "").unwrap_err()),
            "Password is required."
        );
    }

    #[test]
    fn register_rejects_taken_username() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, "a", "a").unwrap();

        let msg = message(register_user(&db, "a", "other").unwrap_err());
        assert_eq!(msg, "User a is already registered.");
    }

    #[test]
    fn register_stores_a_hash_not_the_password() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, "a", "hunter2").unwrap();

        let user = db.get_user_by_username("a").unwrap().unwrap();
        assert_ne!(user.password, "hunter2");
        assert!(user.password.starts_with("$argon2"));
    }

    #[test]
    fn registered_credentials_authenticate() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, "a", "a").unwrap();

        let user = authenticate(&db, "a", "a").unwrap();
        assert_eq!(user.username, "a");
    }

    #[test]
    fn authenticate_reports_unknown_username() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, "test", "test").unwrap();

        let msg = message(authenticate(&db, "a", "test").unwrap_err());
        assert_eq!(msg, "Incorrect username.");
    }

    #[test]
    fn authenticate_reports_wrong_password() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, "test", "test").unwrap();

        let msg = message(authenticate(&db, "test", "a").unwrap_err());
        assert_eq!(msg, "Incorrect password.");
    }
}
