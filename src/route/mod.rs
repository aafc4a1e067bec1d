use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::{response::Redirect, routing::get, Extension, Router};

use crate::{openapi, trace, AppState, Config};

pub mod docs;
pub mod model;
pub mod post;

/// Builds the full application router, including the generated documentation.
pub fn app(state: AppState, config: &Config) -> Router {
	let mut api = OpenApi::default();

	ApiRouter::new()
		.nest("/posts", post::routes())
		.nest("/docs", docs::routes(&config.docs_title))
		.finish_api_with(&mut api, |api| openapi::docs(api, &config.docs_title))
		.route("/", get(root))
		.layer(Extension(Arc::new(api)))
		.layer(trace::http_layer())
		.with_state(state)
}

async fn root() -> Redirect {
	Redirect::to("/docs")
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_root_redirects_to_docs() {
		let app = app(database().await);

		let response = app.get("/").await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), "/docs");
	}

	#[tokio::test]
	async fn test_docs_are_served() {
		let app = app(database().await);

		let response = app.get("/docs").await;
		assert_eq!(response.status_code(), 200);

		let response = app.get("/docs/private/api.json").await;
		assert_eq!(response.status_code(), 200);

		let document = response.json::<Value>();
		assert_eq!(document["info"]["title"], "Blog API");
		assert!(document["paths"].as_object().is_some_and(|paths| !paths.is_empty()));
	}
}
