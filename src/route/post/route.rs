use axum::extract::State;
use macros::route;

use crate::{
	error::{AppError, Message},
	extract::{Created, Json, Path},
	openapi::tag,
	store::PostStore,
};

use super::model;

/// Get all posts
/// Returns every post as an `id` and `title` summary, in the order they were created.
#[route(tag = tag::POST)]
pub async fn list_posts(
	State(posts): State<PostStore>,
) -> Result<Json<Vec<model::PostSummary>>, AppError> {
	Ok(Json(posts.list().await?))
}

/// Get single post
/// Returns a single post by its unique id.
#[route(
	tag = tag::POST,
	response(status = 404, description = "The post does not exist.", shape = "Json<Message>")
)]
pub async fn get_post(
	State(posts): State<PostStore>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Post>, AppError> {
	Ok(Json(posts.get(path.id).await?))
}

/// Create post
/// Creates a new post. Both the title and the content are required.
#[route(tag = tag::POST)]
pub async fn create_post(
	State(posts): State<PostStore>,
	Json(input): Json<model::CreatePostInput>,
) -> Result<Created<Json<model::Post>>, AppError> {
	let post = posts.create(&input.title, &input.content).await?;

	Ok(Created(Json(post)))
}

/// Update post
/// Updates an existing post by its unique id. Omitted fields keep their current value.
#[route(
	tag = tag::POST,
	response(status = 404, description = "The post does not exist.", shape = "Json<Message>")
)]
pub async fn update_post(
	State(posts): State<PostStore>,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::UpdatePostInput>,
) -> Result<Json<model::Post>, AppError> {
	let post = posts
		.update(path.id, input.title.as_deref(), input.content.as_deref())
		.await?;

	Ok(Json(post))
}

/// Delete post
/// Deletes an existing post by its unique id.
#[route(
	tag = tag::POST,
	response(status = 404, description = "The post does not exist.", shape = "Json<Message>")
)]
pub async fn delete_post(
	State(posts): State<PostStore>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Deleted>, AppError> {
	posts.delete(path.id).await?;

	Ok(Json(model::Deleted {
		message: "Post deleted".into(),
		post_id: path.id,
	}))
}
