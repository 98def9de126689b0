use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use tracing::error;

use quill_db::models::UserRow;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// Optional identity for pages anyone may view. `None` is the anonymous
/// state, never an error: a missing, tampered or stale cookie all resolve
/// to anonymous.
pub struct Visitor(pub Option<UserRow>);

/// Required identity. Anonymous requests are rejected with a redirect to
/// the login page.
pub struct CurrentUser(pub UserRow);

impl FromRequestParts<AppState> for Visitor {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = match SignedCookieJar::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(err) => match err {},
        };
        Ok(Visitor(resolve(&jar, state).await))
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Visitor::from_request_parts(parts, state).await? {
            Visitor(Some(user)) => Ok(CurrentUser(user)),
            Visitor(None) => Err(Redirect::to("/auth/login").into_response()),
        }
    }
}

/// Resolve the signed session cookie to a user row. The jar only yields
/// cookies whose signature verifies, so the id cannot have been forged.
async fn resolve(jar: &SignedCookieJar, state: &AppState) -> Option<UserRow> {
    let id: i64 = jar.get(SESSION_COOKIE)?.value().parse().ok()?;

    let db = state.db.clone();
    match tokio::task::spawn_blocking(move || db.get_user_by_id(id)).await {
        Ok(Ok(user)) => user,
        Ok(Err(e)) => {
            error!("session user lookup failed: {e:#}");
            None
        }
        Err(e) => {
            error!("blocking task join error: {e}");
            None
        }
    }
}

/// Establish a session for the given user id.
pub fn establish(jar: SignedCookieJar, user_id: i64) -> SignedCookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, user_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Clear the session. A no-op when no session exists.
pub fn clear(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
