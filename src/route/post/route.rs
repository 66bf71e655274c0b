use aide::axum::IntoApiResponse;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use macros::route;

use crate::{
	extract::{Json, Path, Token},
	openapi::tag,
	post::PostService,
};

use super::{model, RouteError};

/// Get all posts
/// Returns every post along with its creator, oldest first.
#[route(tag = tag::POST)]
pub async fn get_posts(
	State(posts): State<PostService>,
	Token(token): Token,
) -> Result<Json<Vec<model::PostView>>, RouteError> {
	Ok(Json(posts.list(&token).await?))
}

/// Create post
/// Creates a new post authored by the authenticated user.
#[route(tag = tag::POST, response(status = 201, description = "Post created."))]
pub async fn create_post(
	State(posts): State<PostService>,
	Token(token): Token,
	Json(input): Json<model::ContentInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	posts.create(&token, input.content).await?;

	Ok(StatusCode::CREATED.into_response())
}

/// Edit post
/// Replaces the content of a post. Only its creator may do this.
#[route(tag = tag::POST)]
pub async fn edit_post(
	State(posts): State<PostService>,
	Token(token): Token,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::ContentInput>,
) -> Result<(), RouteError> {
	posts.edit(&token, path.id, input.content).await?;

	Ok(())
}

/// Delete post
/// Deletes a post and its votes. Only its creator or an admin may do this.
#[route(tag = tag::POST)]
pub async fn delete_post(
	State(posts): State<PostService>,
	Token(token): Token,
	Path(path): Path<model::IdInput>,
) -> Result<(), RouteError> {
	posts.delete(&token, path.id).await?;

	Ok(())
}

/// Like or dislike post
/// Likes or dislikes a post. Repeating your current vote removes it, the opposite vote replaces it.
#[route(tag = tag::POST)]
pub async fn vote_post(
	State(posts): State<PostService>,
	Token(token): Token,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::VoteInput>,
) -> Result<(), RouteError> {
	posts.vote(&token, path.id, input.like).await?;

	Ok(())
}
