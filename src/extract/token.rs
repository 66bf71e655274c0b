use aide::OperationInput;
use axum::{
	extract::FromRequestParts,
	http::{header, request},
};

use crate::{error::AppError, openapi::SECURITY_SCHEME_TOKEN};

pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

/// The raw session token sent in the `Authorization` header, with or
/// without a `Bearer ` prefix.
///
/// The token is not verified here; that is up to the service handling the
/// request. If the header is missing, a [`AppError::MissingToken`] is returned.
///
/// ```rust
/// async fn route(Token(token): Token) {
///   println!("{token}");
/// }
/// ```
#[derive(Debug)]
pub struct Token(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Token
where
	S: Sync + Send,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		_state: &S,
	) -> Result<Self, Self::Rejection> {
		let value = parts
			.headers
			.get(header::AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.ok_or(AppError::MissingToken)?;

		let token = value.strip_prefix(AUTHORIZATION_PREFIX).unwrap_or(value);

		Ok(Self(token.trim().to_owned()))
	}
}

impl OperationInput for Token {
	/// Operation input for the token extractor.
	///
	/// This adds a token requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.push(
			[(SECURITY_SCHEME_TOKEN.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		);
	}
}
