use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{
	error::{self, ErrorShape},
	store, AppState,
};

pub mod model;
pub mod route;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(list_posts, list_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route(
			"/:id",
			get_with(get_post, get_post_docs)
				.put_with(update_post, update_post_docs)
				.delete_with(delete_post, delete_post_docs),
		)
}

impl ErrorShape for store::Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::NotFound(..) => StatusCode::NOT_FOUND,
			Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn message(&self) -> error::Message {
		match self {
			Self::NotFound(post_id) => {
				error::Message::new("post_not_found", self.to_string()).detail("post_id", *post_id)
			}
			Self::Storage { operation, source } => {
				error::Message::new(operation.to_string(), source.to_string())
			}
		}
	}
}
