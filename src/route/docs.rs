use std::sync::Arc;

use aide::{openapi::OpenApi, scalar::Scalar};
use axum::{response::IntoResponse, routing::get, Extension, Router};

use crate::extract::Json;

pub const API_JSON_PATH: &str = "/docs/private/api.json";

/// Serves the API reference and the `OpenAPI` document it renders.
///
/// Expects an [`Extension`] holding the generated document.
pub fn routes() -> Router {
	Router::new()
		.route(
			"/",
			get(Scalar::new(API_JSON_PATH)
				.with_title("postboard")
				.axum_handler()),
		)
		.route("/private/api.json", get(serve_docs))
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoResponse {
	Json(api.as_ref()).into_response()
}
