use aide::{gen::GenContext, openapi, OperationIo, OperationOutput};
use axum::{
	body::Body,
	extract::{FromRequest, FromRequestParts, Request},
	http::{request, Response, StatusCode},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::de;

use crate::error::AppError;

/// Extractor that deserializes a JSON body and validates it.
///
/// T must implement [`serde::de::DeserializeOwned`] and [`validator::Validate`]
/// in order to be used in an extractor.
///
/// ```rust
/// async fn route(Json(post): Json<CreatePostInput>) {
///   // ...
/// }
/// ```
#[derive(OperationIo)]
#[aide(
	input_with = "axum::Json<T>",
	output_with = "axum::Json<T>",
	json_schema
)]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
	T: serde::Serialize,
{
	fn into_response(self) -> Response<Body> {
		axum::extract::Json(self.0).into_response()
	}
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
	T: de::DeserializeOwned + validator::Validate + JsonSchema + 'static,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let result = axum::extract::Json::<T>::from_request(req, state).await?.0;

		result.validate().map_err(Self::Rejection::Validation)?;
		Ok(Self(result))
	}
}

/// Extractor that deserializes a path parameter and validates it.
#[derive(OperationIo)]
#[aide(
	input_with = "axum::extract::Path<T>",
	output_with = "axum::Json<T>",
	json_schema
)]
pub struct Path<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
	T: de::DeserializeOwned + validator::Validate + Send,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let result = axum::extract::Path::<T>::from_request_parts(parts, state)
			.await?
			.0;

		result.validate().map_err(Self::Rejection::Validation)?;
		Ok(Self(result))
	}
}

/// Responds with `201 Created` instead of `200 OK`.
pub struct Created<T>(pub T);

impl<T> IntoResponse for Created<T>
where
	T: IntoResponse,
{
	fn into_response(self) -> Response<Body> {
		(StatusCode::CREATED, self.0).into_response()
	}
}

impl<T> OperationOutput for Created<T>
where
	T: OperationOutput,
{
	type Inner = T::Inner;

	fn operation_response(
		ctx: &mut GenContext,
		operation: &mut openapi::Operation,
	) -> Option<openapi::Response> {
		T::operation_response(ctx, operation)
	}

	fn inferred_responses(
		ctx: &mut GenContext,
		operation: &mut openapi::Operation,
	) -> Vec<(Option<u16>, openapi::Response)> {
		T::operation_response(ctx, operation)
			.map(|response| vec![(Some(201), response)])
			.unwrap_or_default()
	}
}
