pub use crate::{post::model::PostView, route::model::IdInput};

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

/// The content of a new or edited post.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct ContentInput {
	/// The text of the post.
	#[validate(length(min = 1, max = 1024))]
	pub content: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct VoteInput {
	/// `true` to like the post, `false` to dislike it. Sending your current
	/// vote again removes it.
	pub like: bool,
}
