//! Persistence for posts, votes, users and sessions.
//!
//! Services only see the traits in this module. [`postgres::PgStore`] is the
//! production backend and [`memory::MemoryStore`] keeps everything in process,
//! for running without a database and for tests.

pub mod memory;
pub mod postgres;

use uuid::Uuid;

use crate::{
	account::model::User,
	post::model::{Post, Vote},
};

/// Reads a session token, which is the textual form of a UUID.
fn parse_token(token: &str) -> Option<Uuid> {
	Uuid::parse_str(token.trim()).ok()
}

/// An error raised by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	#[error("{0} already taken")]
	Conflict(&'static str),
	#[error("stored {0} is out of range")]
	OutOfRange(&'static str),
}

/// Opens transactions over posts and their votes.
#[async_trait::async_trait]
pub trait PostStore: Send + Sync {
	async fn begin(&self) -> Result<Box<dyn PostTransaction>, Error>;
}

/// A unit of work over posts and votes.
///
/// Nothing is visible to other transactions until [`PostTransaction::commit`]
/// succeeds; dropping a transaction discards its changes.
#[async_trait::async_trait]
pub trait PostTransaction: Send {
	async fn insert(&mut self, post: &Post) -> Result<(), Error>;
	async fn update(&mut self, post: &Post) -> Result<(), Error>;
	/// Deletes a post along with every vote on it.
	async fn delete(&mut self, id: Uuid) -> Result<(), Error>;
	/// Fetches a post with its creator name, locking it until the transaction ends.
	async fn fetch_by_id(&mut self, id: Uuid) -> Result<Option<Post>, Error>;
	async fn list_all_with_creator_name(&mut self) -> Result<Vec<Post>, Error>;

	async fn fetch_vote(&mut self, user_id: Uuid, post_id: Uuid) -> Result<Option<Vote>, Error>;
	async fn insert_vote(&mut self, vote: &Vote) -> Result<(), Error>;
	async fn update_vote(&mut self, vote: &Vote) -> Result<(), Error>;
	async fn delete_vote(&mut self, user_id: Uuid, post_id: Uuid) -> Result<(), Error>;

	async fn commit(self: Box<Self>) -> Result<(), Error>;
}

/// Users and their sessions.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
	/// Inserts a new user together with its first session.
	///
	/// Fails with [`Error::Conflict`] if the email is already registered.
	async fn register(&self, user: &User, token: Uuid) -> Result<(), Error>;
	async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, Error>;
	async fn insert_session(&self, token: Uuid, user_id: Uuid) -> Result<(), Error>;
	/// Returns whether a session was removed.
	async fn delete_session(&self, token: Uuid) -> Result<bool, Error>;
}
