#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod openapi;
mod route;
mod store;
mod trace;

use store::PostStore;

pub use config::Config;

pub type Database = sqlx::Pool<sqlx::Sqlite>;
pub type AppState = State;

/// The shared application state.
///
/// This holds the handles that handlers need across requests. Posts
/// themselves are never cached here; every request goes to the store.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub posts: PostStore,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	dotenvy::dotenv().ok();

	let config = Config::from_env()?;
	trace::init_tracing_subscriber(config.log_level);

	let state = State {
		posts: PostStore::connect(&config).await?,
	};

	let app = route::app(state, &config);

	let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;

	tracing::info!("listening on {}", listener.local_addr()?);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	Ok(())
}

async fn shutdown_signal() {
	if let Err(error) = tokio::signal::ctrl_c().await {
		tracing::error!(%error, "failed to listen for shutdown signal");
		return;
	}

	tracing::info!("shutting down");
}

#[cfg(test)]
mod test {
	pub use axum_test::TestServer;
	pub use serde_json::{json, Value};
	pub use sqlx::sqlite::SqlitePoolOptions;

	pub use crate::{store::PostStore, Config, Database, State};

	/// Creates a fresh in-memory database with the schema applied.
	pub async fn database() -> Database {
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect("sqlite::memory:")
			.await
			.unwrap();

		crate::store::MIGRATOR.run(&pool).await.unwrap();
		pool
	}

	pub fn app(database: Database) -> TestServer {
		let state = State {
			posts: PostStore::new(database),
		};

		TestServer::new(crate::route::app(state, &Config::default())).unwrap()
	}
}
