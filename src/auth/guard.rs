//! Authorization decisions on top of token verification.
//!
//! Mutations on a post always go through [`load_post_for_mutation`], which
//! looks the post up before it looks at ownership: a caller asking for a
//! post that does not exist gets a 404 no matter who they are, and only an
//! existing post owned by someone else yields a 403.

use tracing::warn;

use crate::{
    error::ApiError,
    posts::{repo::PostRepo, repo_types::Post},
    state::AppState,
    users::repo_types::User,
};

/// Resolves a bearer token to a live user. A token whose user has since disappeared is
/// treated exactly like an invalid token.
pub async fn current_user(state: &AppState, token: &str) -> Result<User, ApiError> {
    let claims = state.keys.verify(token)?;
    match state.users.find_by_id(claims.user_id).await? {
        Some(user) => Ok(user),
        None => {
            warn!(user_id = claims.user_id, "token subject no longer exists");
            Err(ApiError::Unauthenticated)
        }
    }
}

pub fn authorize_mutation(user: &User, post: &Post) -> Result<(), ApiError> {
    if post.author_id == user.id {
        return Ok(());
    }
    warn!(
        user_id = user.id,
        post_id = post.id,
        author_id = post.author_id,
        "mutation by non-owner rejected"
    );
    Err(ApiError::Forbidden(
        "Not authorized to perform requested action".into(),
    ))
}

pub async fn load_post_for_mutation(
    posts: &dyn PostRepo,
    post_id: i64,
    user: &User,
) -> Result<Post, ApiError> {
    let post = posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| post_not_found(post_id))?;
    authorize_mutation(user, &post)?;
    Ok(post)
}

pub fn post_not_found(post_id: i64) -> ApiError {
    ApiError::NotFound(format!("post with id: {post_id} was not found."))
}
