use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	/// The unique identifier of the resource.
	#[validate(range(min = 0))]
	pub id: i64,
}
