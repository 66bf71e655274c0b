pub mod docs;
pub mod model;
pub mod post;
pub mod user;

use aide::axum::ApiRouter;

use crate::AppState;

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new()
		.nest("/users", user::routes())
		.nest("/posts", post::routes())
}
