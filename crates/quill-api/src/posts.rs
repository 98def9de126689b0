use axum::Form;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::info;

use quill_db::models::PostRow;

use crate::error::{AppError, blocking};
use crate::pages;
use crate::session::{CurrentUser, Visitor};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// GET /. All posts, newest first. No auth required to view.
pub async fn index(
    State(state): State<AppState>,
    Visitor(user): Visitor,
) -> Result<Html<String>, AppError> {
    let db = state.db.clone();
    let posts = blocking(move || db.list_posts().map_err(AppError::from)).await?;
    Ok(pages::index(user.as_ref(), &posts))
}

pub async fn create_page(CurrentUser(user): CurrentUser) -> Html<String> {
    pages::create(&user, None)
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    if form.title.is_empty() {
        return Ok(pages::create(&user, Some("Title is required.")).into_response());
    }

    let db = state.db.clone();
    let author_id = user.id;
    let id =
        blocking(move || db.insert_post(author_id, &form.title, &form.body).map_err(AppError::from))
            .await?;

    info!("user {} created post {id}", user.username);
    Ok(Redirect::to("/").into_response())
}

pub async fn update_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let post = fetch_owned_post(&state, id, user.id).await?;
    Ok(pages::update(&user, &post, None))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let post = fetch_owned_post(&state, id, user.id).await?;

    if form.title.is_empty() {
        return Ok(pages::update(&user, &post, Some("Title is required.")).into_response());
    }

    let db = state.db.clone();
    blocking(move || db.update_post(id, &form.title, &form.body).map_err(AppError::from)).await?;

    Ok(Redirect::to("/").into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    fetch_owned_post(&state, id, user.id).await?;

    let db = state.db.clone();
    blocking(move || db.delete_post(id).map_err(AppError::from)).await?;

    info!("user {} deleted post {id}", user.username);
    Ok(Redirect::to("/"))
}

/// Load a post for mutation by the given user. Existence is checked before
/// ownership: a missing post is 404 even for a non-owner, never 403.
async fn fetch_owned_post(state: &AppState, id: i64, user_id: i64) -> Result<PostRow, AppError> {
    let db = state.db.clone();
    let post = blocking(move || db.get_post(id).map_err(AppError::from))
        .await?
        .ok_or(AppError::NotFound)?;

    if post.author_id != user_id {
        return Err(AppError::Forbidden);
    }

    Ok(post)
}
