use aide::axum::{
	routing::{get_with, put_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, post::Error, AppState};

pub mod model;
pub mod route;

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_posts, get_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route(
			"/:id",
			put_with(edit_post, edit_post_docs).delete_with(delete_post, delete_post_docs),
		)
		.api_route("/:id/like", put_with(vote_post, vote_post_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::Unauthorized => StatusCode::UNAUTHORIZED,
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::NotCreator | Self::NotCreatorOrAdmin => StatusCode::FORBIDDEN,
			Self::InconsistentCounters(..) | Self::Store(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownPost(post) => error::Message::new(self.to_string())
				.detail("post", post.to_string())
				.into_vec(),
			Self::Unauthorized | Self::NotCreator | Self::NotCreatorOrAdmin => {
				error::Message::new(self.to_string()).into_vec()
			}
			Self::InconsistentCounters(..) | Self::Store(..) => Vec::new(),
		}
	}
}
