use aide::{
	openapi::{ApiKeyLocation, SecurityScheme, Tag},
	transform::TransformOpenApi,
};
use axum::http::header;

use crate::{error, extract::Json};

pub const SECURITY_SCHEME_TOKEN: &str = "Token";

pub mod tag {
	pub const USER: &str = "User";
	pub const POST: &str = "Post";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("postboard")
		.summary("Text posts with likes and dislikes")
		.description("Sign up or log in to get a session token, then send it in the `Authorization` header of every post request.")
		.tag(Tag {
			name: tag::USER.into(),
			description: Some("Signing up, in and out".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Post management and voting".into()),
			..Default::default()
		})
		.security_scheme(
			SECURITY_SCHEME_TOKEN,
			SecurityScheme::ApiKey {
				location: ApiKeyLocation::Header,
				name: header::AUTHORIZATION.as_str().into(),
				description: Some("A session token, optionally prefixed with `Bearer `".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<error::ErrorBody<'static>>, _>(|res| {
			res.example(error::ErrorBody {
				errors: error::Message::new("error message")
					.field("optional field")
					.detail("key", "value")
					.into_vec(),
			})
		})
}
