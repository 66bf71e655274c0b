mod route;

use proc_macro::TokenStream;

/// Generates an OpenAPI transform for a handler, named after the handler with the suffix `_docs`.
///
/// The first line of the doc comment becomes the operation summary and the
/// remaining lines its description. Responses other than the inferred ones can
/// be declared with `response(status = .., description = .., shape = ..)`.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}
