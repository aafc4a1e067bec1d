use aide::{gen::GenContext, openapi, OperationOutput};
use axum::{
	body::Body,
	extract::rejection::{JsonRejection, PathRejection},
	http::{Response, StatusCode},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{extract::Json, store};

pub type Map = serde_json::Map<String, serde_json::Value>;

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message {
	/// A short description of what failed.
	pub error: String,
	/// A human-readable explanation of the failure.
	pub message: String,
	/// Structured information about the failure, such as the offending fields.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Map>,
}

impl Message {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: message.into(),
			details: None,
		}
	}

	#[must_use]
	pub fn detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(Map::new)
			.insert(key.into(), value.into());

		self
	}
}

/// Describes how an error is presented to the client.
///
/// Note that the message is sent to the client as-is.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;
	fn message(&self) -> Message;
}

/// Error type for the application.
///
/// Every handler returns this, so the status mapping below is the single
/// place where failures become responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] JsonRejection),
	#[error("path error: {0}")]
	Path(#[from] PathRejection),
	#[error(transparent)]
	Store(#[from] store::Error),
}

impl ErrorShape for AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Path(..) => StatusCode::BAD_REQUEST,
			Self::Json(rejection) => rejection.status(),
			Self::Store(error) => error.status(),
		}
	}

	fn message(&self) -> Message {
		match self {
			Self::Validation(errors) => errors.field_errors().into_iter().fold(
				Message::new("validation_failed", "The request failed validation."),
				|message, (field, errors)| {
					message.detail(
						field.to_string(),
						errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
					)
				},
			),
			Self::Json(rejection) => Message::new("invalid_body", rejection.body_text()),
			Self::Path(rejection) => Message::new("invalid_path", rejection.body_text()),
			Self::Store(error) => error.message(),
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		let status = self.status();

		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		}

		(status, Json(self.message())).into_response()
	}
}

impl OperationOutput for AppError {
	type Inner = Message;

	fn operation_response(
		ctx: &mut GenContext,
		operation: &mut openapi::Operation,
	) -> Option<openapi::Response> {
		Json::<Message>::operation_response(ctx, operation)
	}
}
