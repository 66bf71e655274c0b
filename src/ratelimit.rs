use std::{sync::Arc, time::Duration};

use axum::{
	body::Body,
	response::{IntoResponse, Response},
};
use governor::{
	clock::QuantaInstant,
	middleware::{RateLimitingMiddleware, StateInformationMiddleware},
};
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::{KeyExtractor, PeerIpKeyExtractor},
	GovernorError,
};

use crate::{config::Config, error::AppError};

#[derive(Debug, thiserror::Error)]
#[error("rate limit quota must be non-zero")]
pub struct Error;

pub type Limits = Arc<GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>>;

/// Per-IP limits for every route, configured by `RATE_LIMIT_PER_SECOND` and
/// `RATE_LIMIT_BURST`.
pub fn from_config(config: &Config) -> Result<Limits, Error> {
	GovernorConfigBuilder::default()
		.per_second(config.rate_limit_per_second)
		.burst_size(config.rate_limit_burst)
		.use_headers()
		.error_handler(error_handler)
		.finish()
		.map(Arc::new)
		.ok_or(Error)
}

fn error_handler(error: GovernorError) -> Response<Body> {
	AppError::from(error).into_response()
}

/// Periodically drops the state of clients that have not been limited recently.
pub fn cleanup_old_limits<T, M>(configs: &[&Arc<GovernorConfig<T, M>>])
where
	T: KeyExtractor,
	<T as KeyExtractor>::Key: Send + Sync + 'static,
	M: RateLimitingMiddleware<QuantaInstant> + Send + Sync + 'static,
{
	let limiters = configs
		.iter()
		.map(|config| config.limiter().clone())
		.collect::<Vec<_>>();
	let interval = Duration::from_secs(60);

	std::thread::spawn(move || loop {
		std::thread::sleep(interval);

		for limiter in &limiters {
			tracing::debug!("rate limiting storage size: {}", limiter.len());

			limiter.retain_recent();
		}
	});
}
