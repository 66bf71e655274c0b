use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize, Validate, JsonSchema)]
pub struct SignupInput {
	/// The name that is displayed next to your posts.
	#[validate(length(min = 2, max = 32))]
	pub name: String,
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
}

/// A session token, to be sent in the `Authorization` header.
#[derive(Serialize, JsonSchema)]
pub struct TokenOutput {
	pub token: Uuid,
}
