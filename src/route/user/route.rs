use aide::axum::IntoApiResponse;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use macros::route;

use crate::{
	account::AccountService,
	extract::{Json, Token},
	openapi::tag,
};

use super::{model, RouteError};

/// Sign up
/// Registers a new account, returning a session token for it.
#[route(tag = tag::USER, response(status = 201, description = "Registered successfully.", shape = "Json<model::TokenOutput>"))]
pub async fn signup(
	State(accounts): State<AccountService>,
	Json(input): Json<model::SignupInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let token = accounts
		.signup(input.name, input.email, &input.password)
		.await?;

	Ok((StatusCode::CREATED, Json(model::TokenOutput { token })).into_response())
}

/// Log in
/// Logs in to an account, returning a new session token.
#[route(tag = tag::USER)]
pub async fn login(
	State(accounts): State<AccountService>,
	Json(input): Json<model::LoginInput>,
) -> Result<Json<model::TokenOutput>, RouteError> {
	let token = accounts.login(&input.email, &input.password).await?;

	Ok(Json(model::TokenOutput { token }))
}

/// Log out
/// Invalidates the session token used to make this request.
#[route(tag = tag::USER, response(status = 204, description = "Logged out successfully."))]
pub async fn logout(
	State(accounts): State<AccountService>,
	Token(token): Token,
) -> Result<impl IntoApiResponse, RouteError> {
	accounts.logout(&token).await?;

	Ok(StatusCode::NO_CONTENT.into_response())
}
