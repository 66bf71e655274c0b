use uuid::Uuid;

use crate::identity::Role;

/// A single user, as stored.
///
/// This is never sent to clients; the hashed password stays server-side.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
	pub id: Uuid,
	/// The name that is displayed next to the user's posts.
	pub name: String,
	/// The address used to log in. Unique across users.
	pub email: String,
	/// argon2, salted with `id`
	pub password: Vec<u8>,
	pub role: Role,
	pub created_at: chrono::DateTime<chrono::Utc>,
}
