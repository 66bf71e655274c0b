use std::{net::IpAddr, str::FromStr};

use tracing::level_filters::LevelFilter;

/// An environment variable that is set but could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid value {value:?} for {key}")]
pub struct Error {
	pub key: &'static str,
	pub value: String,
}

/// Runtime configuration, read from the environment (and a `.env` file, if present).
#[derive(Debug, Clone)]
pub struct Config {
	/// `DATABASE_URL`. Without it, everything is kept in memory and lost on exit.
	pub database_url: Option<String>,
	/// `DATABASE_MAX_CONNECTIONS`
	pub max_connections: u32,
	/// `HOST`
	pub host: IpAddr,
	/// `PORT`
	pub port: u16,
	/// `RATE_LIMIT_PER_SECOND`, how often each client regains one request.
	pub rate_limit_per_second: u64,
	/// `RATE_LIMIT_BURST`, how many requests a client can make at once.
	pub rate_limit_burst: u32,
	/// `LOG_LEVEL`, one of `off`, `error`, `warn`, `info`, `debug` or `trace`.
	pub log_level: LevelFilter,
	/// Whether to export traces and metrics over OTLP, enabled by setting
	/// `OTEL_EXPORTER_OTLP_ENDPOINT`.
	pub otel: bool,
}

impl Config {
	pub fn from_env() -> Result<Self, Error> {
		dotenvy::dotenv().ok();

		Self::from_lookup(|key| std::env::var(key).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
	where
		F: Fn(&str) -> Option<String>,
	{
		Ok(Self {
			database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
			max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
			host: parse_or(&lookup, "HOST", IpAddr::from([127, 0, 0, 1]))?,
			port: parse_or(&lookup, "PORT", 3000)?,
			rate_limit_per_second: parse_or(&lookup, "RATE_LIMIT_PER_SECOND", 10)?,
			rate_limit_burst: parse_or(&lookup, "RATE_LIMIT_BURST", 50)?,
			log_level: parse_or(&lookup, "LOG_LEVEL", LevelFilter::INFO)?,
			otel: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").is_some(),
		})
	}
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, Error>
where
	F: Fn(&str) -> Option<String>,
	T: FromStr,
{
	let Some(value) = lookup(key) else {
		return Ok(default);
	};

	match value.trim().parse() {
		Ok(parsed) => Ok(parsed),
		Err(..) => Err(Error { key, value }),
	}
}
