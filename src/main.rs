#![warn(clippy::pedantic)]

mod account;
mod config;
mod error;
mod extract;
mod id;
mod identity;
mod openapi;
mod post;
mod ratelimit;
mod route;
mod store;
mod trace;

#[cfg(test)]
mod test;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use aide::openapi::OpenApi;
use argon2::Argon2;
use axum::{body::Body, http::Response, Extension, Router};
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::Span;

use crate::{
	account::AccountService,
	config::Config,
	id::{IdGenerator, RandomIds},
	identity::IdentityVerifier,
	post::PostService,
	store::{memory::MemoryStore, postgres::PgStore, AccountStore, PostStore},
};

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

/// The shared application state.
///
/// Handlers extract the service they need directly, e.g. `State<PostService>`.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub posts: PostService,
	pub accounts: AccountService,
}

impl State {
	/// Builds both services on top of a single backend, which stores posts
	/// and accounts and resolves session tokens.
	pub fn new<B>(backend: B, ids: Arc<dyn IdGenerator>) -> Self
	where
		B: PostStore + AccountStore + IdentityVerifier + 'static,
	{
		let backend = Arc::new(backend);

		Self {
			posts: PostService::new(backend.clone(), backend.clone(), ids.clone()),
			accounts: AccountService::new(backend, ids, Argon2::default()),
		}
	}
}

/// Builds the application router, including the API reference under `/docs`.
pub fn app(state: State) -> Router {
	let mut api = OpenApi::default();

	route::routes()
		.finish_api_with(&mut api, openapi::docs)
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new())
				.layer(TraceLayer::new_for_http().on_response(
					|response: &Response<Body>, latency: Duration, _: &Span| {
						tracing::info!(
							histogram.latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
							status = response.status().as_u16(),
							"finished processing request"
						);
					},
				))
				.layer(CorsLayer::permissive()),
		)
		.with_state(state)
		.nest("/docs", route::docs::routes())
		.layer(Extension(Arc::new(api)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let config = Config::from_env()?;
	let _guard = trace::init_tracing_subscriber(&config)?;

	let ids: Arc<dyn IdGenerator> = Arc::new(RandomIds);
	let state = if let Some(url) = &config.database_url {
		State::new(PgStore::connect(url, config.max_connections).await?, ids)
	} else {
		tracing::warn!("DATABASE_URL is not set, data will be kept in memory");
		State::new(MemoryStore::new(), ids)
	};

	let limits = ratelimit::from_config(&config)?;
	ratelimit::cleanup_old_limits(&[&limits]);

	let app = app(state).layer(GovernorLayer { config: limits });

	let listener = tokio::net::TcpListener::bind((config.host, config.port)).await?;

	tracing::info!("listening on {}", listener.local_addr()?);

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.await?;

	Ok(())
}
