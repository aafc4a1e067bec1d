mod model;
mod route;

use proc_macro::TokenStream;

/// Creates a new documentation function for the route, named after the original function with the suffix `_docs`.
///
/// The first line of the doc comment becomes the operation summary, and the remaining
/// lines (if any) become its description.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}

/// Creates two new structs: `CreateXInput` and `UpdateXInput` for the model.
/// For both models, fields with #[serde(skip_deserializing)] are skipped, and all
/// other fields are included verbatim (including attributes). Both reject unknown fields,
/// and neither derives `FromRow` since they are never read from the database.
///
/// With `#[model(summary(a, b))]`, an `XSummary` struct containing only the listed
/// fields is created as well.
#[proc_macro_attribute]
pub fn model(args: TokenStream, input: TokenStream) -> TokenStream {
	model::from_input(args, input)
}
