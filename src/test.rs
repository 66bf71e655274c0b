//! Shared helpers for route tests.

pub use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
pub use axum_test::TestServer;
pub use serde_json::{json, Value};

pub use crate::{
	identity::{IdentityVerifier, Role},
	store::memory::MemoryStore,
};

use std::sync::Arc;

use uuid::Uuid;

use crate::{id::RandomIds, State};

/// Starts the application on an in-memory store, which is also returned so
/// tests can inspect or adjust it directly.
pub fn app() -> (TestServer, MemoryStore) {
	let store = MemoryStore::new();

	(server(State::new(store.clone(), Arc::new(RandomIds))), store)
}

pub fn server(state: State) -> TestServer {
	TestServer::new(crate::app(state)).unwrap()
}

pub fn bearer(token: &str) -> HeaderValue {
	HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

/// Registers `name` with the email `{name}@example.com` and returns their token.
pub async fn signup(server: &TestServer, name: &str) -> String {
	let response = server
		.post("/users/signup")
		.json(&json!({
			"name": name,
			"email": format!("{name}@example.com"),
			"password": "hunter2hunter",
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	response.json::<Value>()["token"]
		.as_str()
		.unwrap()
		.to_owned()
}

/// Creates a post and returns its id.
pub async fn create(server: &TestServer, token: &str, content: &str) -> Uuid {
	let response = server
		.post("/posts")
		.add_header(AUTHORIZATION, bearer(token))
		.json(&json!({ "content": content }))
		.await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let posts = list(server, token).await;
	let post = posts
		.iter()
		.rev()
		.find(|post| post["content"] == content)
		.unwrap();

	post["id"].as_str().unwrap().parse().unwrap()
}

pub async fn list(server: &TestServer, token: &str) -> Vec<Value> {
	let response = server
		.get("/posts")
		.add_header(AUTHORIZATION, bearer(token))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);
	response.json::<Vec<Value>>()
}

pub async fn vote(server: &TestServer, token: &str, post: Uuid, like: bool) {
	let response = server
		.put(&format!("/posts/{post}/like"))
		.add_header(AUTHORIZATION, bearer(token))
		.json(&json!({ "like": like }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);
}

/// The (likes, dislikes) of the first listed post.
pub fn counts(posts: &[Value]) -> (u64, u64) {
	(
		posts[0]["likes"].as_u64().unwrap(),
		posts[0]["dislikes"].as_u64().unwrap(),
	)
}
