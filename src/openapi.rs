use aide::{openapi::Tag, transform::TransformOpenApi};

use crate::{error, extract::Json};

pub mod tag {
	pub const POST: &str = "Post";
}

pub fn docs<'a>(api: TransformOpenApi<'a>, title: &str) -> TransformOpenApi<'a> {
	api.title(title)
		.summary("A minimal blog content service")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Post management".into()),
			..Default::default()
		})
		.default_response_with::<Json<error::Message>, _>(|res| {
			res.example(
				error::Message::new("failed to update post", "database is locked")
					.detail("key", "value"),
			)
		})
}
