use std::{borrow::Cow, fmt};

use axum::{
	body::Body,
	extract::rejection::{JsonRejection, PathRejection},
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;
use tower_governor::GovernorError;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message sent to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// A human-readable description of the error.
	pub content: Cow<'a, str>,
	/// The input field that caused the error, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	/// Additional machine-readable information.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	#[must_use]
	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorBody<'a> {
	pub errors: Vec<Message<'a>>,
}

/// Errors that map onto an HTTP response.
///
/// Implemented by the error type of each route group; messages must not
/// contain sensitive information since they are sent to the client.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;
	fn into_errors(self) -> Vec<Message<'static>>;
}

/// Errors raised before a request reaches a route, while extracting its input.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] JsonRejection),
	#[error("path error: {0}")]
	Path(#[from] PathRejection),
	#[error("missing authorization header")]
	MissingToken,
	#[error("rate limit error")]
	RateLimit(GovernorError),
}

impl From<GovernorError> for AppError {
	fn from(error: GovernorError) -> Self {
		Self::RateLimit(error)
	}
}

impl AppError {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Json(..) | Self::Path(..) => StatusCode::BAD_REQUEST,
			Self::MissingToken => StatusCode::UNAUTHORIZED,
			Self::RateLimit(GovernorError::TooManyRequests { .. }) => StatusCode::TOO_MANY_REQUESTS,
			Self::RateLimit(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	pub fn into_errors(self) -> Vec<Message<'static>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					let field = field.to_string();

					errors.iter().map(move |error| {
						let content = error.message.clone().unwrap_or_else(|| error.code.clone());

						Message::new(content).field(field.clone())
					})
				})
				.collect(),
			Self::Json(rejection) => Message::new(rejection.body_text()).into_vec(),
			Self::Path(rejection) => Message::new(rejection.body_text()).into_vec(),
			Self::MissingToken => Message::new("missing authorization header").into_vec(),
			Self::RateLimit(GovernorError::TooManyRequests { .. }) => {
				Message::new("too many requests").into_vec()
			}
			Self::RateLimit(..) => Vec::new(),
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		let status = self.status();

		log_failure(status, &self);
		respond(status, self.into_errors())
	}
}

/// The error type of a route: either a failure while extracting the request,
/// or one specific to the route group.
#[derive(Debug)]
pub enum RouteError<E> {
	App(AppError),
	Route(E),
}

impl<E: ErrorShape> From<E> for RouteError<E> {
	fn from(error: E) -> Self {
		Self::Route(error)
	}
}

impl<E> From<AppError> for RouteError<E> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<E: fmt::Display> fmt::Display for RouteError<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::App(error) => fmt::Display::fmt(error, f),
			Self::Route(error) => fmt::Display::fmt(error, f),
		}
	}
}

impl<E: ErrorShape> IntoResponse for RouteError<E> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => error.into_response(),
			Self::Route(error) => {
				let status = error.status();

				log_failure(status, &error);
				respond(status, error.into_errors())
			}
		}
	}
}

impl<E> aide::OperationOutput for RouteError<E> {
	type Inner = ErrorBody<'static>;
}

/// Server-side failures are only logged, their details never reach the client.
fn log_failure(status: StatusCode, error: &dyn fmt::Display) {
	if status.is_server_error() {
		tracing::error!(%error, "request failed");
	}
}

fn respond(status: StatusCode, errors: Vec<Message<'static>>) -> Response<Body> {
	(status, Json(ErrorBody { errors })).into_response()
}

#[cfg(test)]
mod test {
	use axum::http::StatusCode;
	use validator::Validate;

	use super::AppError;

	#[derive(Validate)]
	struct Input {
		#[validate(length(min = 1, max = 4))]
		content: String,
	}

	#[test]
	fn test_validation_errors_name_their_field() {
		let errors = Input {
			content: "too long".into(),
		}
		.validate()
		.unwrap_err();

		let error = AppError::from(errors);
		assert_eq!(error.status(), StatusCode::BAD_REQUEST);

		let messages = error.into_errors();
		assert_eq!(messages.len(), 1);
		assert_eq!(messages[0].field.as_deref(), Some("content"));
		assert_eq!(messages[0].content, "length");
	}

	#[test]
	fn test_missing_token_is_unauthorized() {
		assert_eq!(AppError::MissingToken.status(), StatusCode::UNAUTHORIZED);
	}
}
