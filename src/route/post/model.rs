pub use crate::route::model::IdInput;

use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single blog post.
#[model(summary(id, title))]
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: i64,
	/// The title of the post.
	#[validate(length(
		min = 1,
		max = 255,
		message = "title must be between 1 and 255 characters long"
	))]
	pub title: String,
	/// The content of the post.
	pub content: String,
	/// The creation time of the post.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Confirmation that a post was deleted.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Deleted {
	pub message: String,
	/// The identifier of the deleted post.
	pub post_id: i64,
}
