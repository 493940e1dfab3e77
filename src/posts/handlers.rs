use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        extractors::CurrentUser,
        guard::{load_post_for_mutation, post_not_found},
    },
    error::ApiResult,
    extract::{AppJson, AppPath, AppQuery},
    posts::dto::{PostInput, PostQuery, PostResponse},
    state::AppState,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    AppQuery(query): AppQuery<PostQuery>,
) -> ApiResult<Json<Vec<PostResponse>>> {
    let filter = query.into_filter()?;
    let posts = state.posts.list(&filter).await?;
    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<Json<PostResponse>> {
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;
    Ok(Json(post.into()))
}

#[instrument(skip(state, user, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(payload): AppJson<PostInput>,
) -> ApiResult<(StatusCode, [(HeaderName, String); 1], Json<PostResponse>)> {
    let fields = payload.into_fields()?;
    let post = state.posts.create(user.id, &fields).await?;

    info!(post_id = post.id, author_id = user.id, "post created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/posts/{}", post.id))],
        Json(post.into()),
    ))
}

#[instrument(skip(state, user, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<PostInput>,
) -> ApiResult<Json<PostResponse>> {
    load_post_for_mutation(state.posts.as_ref(), id, &user).await?;
    let fields = payload.into_fields()?;

    let post = state
        .posts
        .update(id, &fields)
        .await?
        .ok_or_else(|| post_not_found(id))?;

    info!(post_id = id, user_id = user.id, "post updated");
    Ok(Json(post.into()))
}

#[instrument(skip(state, user))]
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<StatusCode> {
    load_post_for_mutation(state.posts.as_ref(), id, &user).await?;

    if !state.posts.delete(id).await? {
        return Err(post_not_found(id));
    }

    info!(post_id = id, user_id = user.id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}
