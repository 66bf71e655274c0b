use aide::axum::{routing::post_with, ApiRouter};
use axum::http::StatusCode;

use crate::{account::Error, error, AppState};

pub mod model;
pub mod route;

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/signup", post_with(signup, signup_docs))
		.api_route("/login", post_with(login, login_docs))
		.api_route("/logout", post_with(logout, logout_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidEmailOrPassword | Self::InvalidToken => StatusCode::UNAUTHORIZED,
			Self::EmailTaken => StatusCode::CONFLICT,
			Self::Argon(..) | Self::Store(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::EmailTaken => error::Message::new(self.to_string())
				.field("email")
				.into_vec(),
			Self::InvalidEmailOrPassword | Self::InvalidToken => {
				error::Message::new(self.to_string()).into_vec()
			}
			Self::Argon(..) | Self::Store(..) => Vec::new(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_signup_flow() {
		let (server, _) = app();

		let response = server
			.post("/users/signup")
			.json(&json!({
				"name": "john",
				"email": "john@smith.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::CREATED);
		assert!(response.json::<Value>()["token"].is_string());

		let response = server
			.post("/users/login")
			.json(&json!({
				"email": "john@smith.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let token = response.json::<Value>()["token"].as_str().unwrap().to_owned();

		let response = server
			.get("/posts")
			.add_header(AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let response = server
			.post("/users/logout")
			.add_header(AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

		let response = server
			.get("/posts")
			.add_header(AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn test_login_failures() {
		let (server, _) = app();
		signup(&server, "john").await;

		let response = server
			.post("/users/login")
			.json(&json!({
				"email": "john@example.com",
				"password": "wrong password",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

		let response = server
			.post("/users/signup")
			.json(&json!({
				"name": "johnny",
				"email": "john@example.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::CONFLICT);

		let response = server
			.post("/users/signup")
			.json(&json!({
				"name": "j",
				"email": "not an email",
				"password": "short",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(response.json::<Value>()["errors"].as_array().unwrap().len(), 3);
	}
}
