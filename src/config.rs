use std::{fmt::Display, str::FromStr};

use tracing::level_filters::LevelFilter;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid value {value:?} for {key}: {reason}")]
	Invalid {
		key: &'static str,
		value: String,
		reason: String,
	},
}

/// Process-wide settings, read once at startup and handed to the
/// components that need them.
#[derive(Debug, Clone)]
pub struct Config {
	/// The address the HTTP server binds to.
	pub host: String,
	pub port: u16,
	/// A `sqlite://` connection string. The file is created if it does not exist.
	pub database_url: String,
	pub max_connections: u32,
	pub log_level: LevelFilter,
	/// The title shown on the documentation page and in the `OpenAPI` document.
	pub docs_title: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".into(),
			port: 5000,
			database_url: "sqlite://blog.db".into(),
			max_connections: 5,
			log_level: LevelFilter::INFO,
			docs_title: "Blog API".into(),
		}
	}
}

impl Config {
	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, Error> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Reads the configuration through `lookup`, falling back to the
	/// defaults for any variable that is not set.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
		let defaults = Self::default();

		let max_connections = parse(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?;
		if max_connections == 0 {
			return Err(Error::Invalid {
				key: "DATABASE_MAX_CONNECTIONS",
				value: max_connections.to_string(),
				reason: "must be at least 1".into(),
			});
		}

		Ok(Self {
			host: lookup("HOST").unwrap_or(defaults.host),
			port: parse(&lookup, "PORT", defaults.port)?,
			database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
			max_connections,
			log_level: parse(&lookup, "LOG_LEVEL", defaults.log_level)?,
			docs_title: lookup("DOCS_TITLE").unwrap_or(defaults.docs_title),
		})
	}
}

fn parse<T>(lookup: impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, Error>
where
	T: FromStr,
	T::Err: Display,
{
	let Some(value) = lookup(key) else {
		return Ok(default);
	};

	value.trim().parse().map_err(|e: T::Err| Error::Invalid {
		key,
		reason: e.to_string(),
		value,
	})
}

#[cfg(test)]
mod test {
	use std::collections::HashMap;

	use tracing::level_filters::LevelFilter;

	use super::{Config, Error};

	fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
		let vars = vars.iter().copied().collect::<HashMap<_, _>>();

		move |key| vars.get(key).map(|value| (*value).to_string())
	}

	#[test]
	fn test_defaults_when_unset() {
		let config = Config::from_lookup(lookup(&[])).unwrap();

		assert_eq!(config.host, "127.0.0.1");
		assert_eq!(config.port, 5000);
		assert_eq!(config.database_url, "sqlite://blog.db");
		assert_eq!(config.max_connections, 5);
		assert_eq!(config.log_level, LevelFilter::INFO);
		assert_eq!(config.docs_title, "Blog API");
	}

	#[test]
	fn test_overrides() {
		let config = Config::from_lookup(lookup(&[
			("HOST", "0.0.0.0"),
			("PORT", "8080"),
			("DATABASE_URL", "sqlite::memory:"),
			("DATABASE_MAX_CONNECTIONS", "1"),
			("LOG_LEVEL", "debug"),
			("DOCS_TITLE", "Posts"),
		]))
		.unwrap();

		assert_eq!(config.host, "0.0.0.0");
		assert_eq!(config.port, 8080);
		assert_eq!(config.database_url, "sqlite::memory:");
		assert_eq!(config.max_connections, 1);
		assert_eq!(config.log_level, LevelFilter::DEBUG);
		assert_eq!(config.docs_title, "Posts");
	}

	#[test]
	fn test_invalid_port() {
		let error = Config::from_lookup(lookup(&[("PORT", "abc")])).unwrap_err();

		let Error::Invalid { key, value, .. } = error;
		assert_eq!(key, "PORT");
		assert_eq!(value, "abc");
	}

	#[test]
	fn test_invalid_log_level() {
		let error = Config::from_lookup(lookup(&[("LOG_LEVEL", "loud")])).unwrap_err();

		assert!(error.to_string().contains("LOG_LEVEL"));
	}

	#[test]
	fn test_zero_connections() {
		assert!(Config::from_lookup(lookup(&[("DATABASE_MAX_CONNECTIONS", "0")])).is_err());
	}
}
