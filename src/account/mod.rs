pub mod model;

use std::sync::Arc;

use argon2::Argon2;
use chrono::Utc;
use uuid::Uuid;

use crate::{
	id::IdGenerator,
	identity::Role,
	store::{self, AccountStore},
};

use self::model::User;

pub const KEY_LENGTH: usize = 32;

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid email or password")]
	InvalidEmailOrPassword,
	#[error("missing or invalid token")]
	InvalidToken,
	#[error("email already taken")]
	EmailTaken,
	#[error("password hashing error")]
	Argon(#[from] argon2::Error),
	#[error("store error: {0}")]
	Store(store::Error),
}

impl From<store::Error> for Error {
	fn from(error: store::Error) -> Self {
		match error {
			store::Error::Conflict("email") => Self::EmailTaken,
			error => Self::Store(error),
		}
	}
}

/// Signs users up and in, handing out the session tokens that the
/// [`IdentityVerifier`](crate::identity::IdentityVerifier) accepts.
#[derive(Clone)]
pub struct AccountService {
	store: Arc<dyn AccountStore>,
	ids: Arc<dyn IdGenerator>,
	hasher: Argon2<'static>,
}

/// Hashes a password with Argon2, using the user's id as a salt.
fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

impl AccountService {
	pub fn new(store: Arc<dyn AccountStore>, ids: Arc<dyn IdGenerator>, hasher: Argon2<'static>) -> Self {
		Self { store, ids, hasher }
	}

	/// Registers a new regular user and returns a session token for them.
	pub async fn signup(&self, name: String, email: String, password: &str) -> Result<Uuid, Error> {
		let id = self.ids.next();
		let password = hash_password(&self.hasher, password, &id)?;

		let user = User {
			id,
			name,
			email,
			password: password.to_vec(),
			role: Role::Regular,
			created_at: Utc::now(),
		};

		let token = self.ids.next();
		self.store.register(&user, token).await?;

		tracing::info!(user = %id, "registered user");
		Ok(token)
	}

	/// Returns a new session token, assuming the credentials are valid.
	pub async fn login(&self, email: &str, password: &str) -> Result<Uuid, Error> {
		let user = self
			.store
			.fetch_user_by_email(email)
			.await?
			.ok_or(Error::InvalidEmailOrPassword)?;

		let hashed = hash_password(&self.hasher, password, &user.id)?;

		if user.password != hashed {
			return Err(Error::InvalidEmailOrPassword);
		}

		let token = self.ids.next();
		self.store.insert_session(token, user.id).await?;

		Ok(token)
	}

	/// Invalidates a session token.
	pub async fn logout(&self, token: &str) -> Result<(), Error> {
		let token = Uuid::parse_str(token.trim()).map_err(|_| Error::InvalidToken)?;

		if !self.store.delete_session(token).await? {
			return Err(Error::InvalidToken);
		}

		Ok(())
	}
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use argon2::Argon2;

	use super::{AccountService, Error};
	use crate::{id::test::SequentialIds, identity::IdentityVerifier, store::memory::MemoryStore};

	fn service(store: &MemoryStore) -> AccountService {
		AccountService::new(
			Arc::new(store.clone()),
			Arc::new(SequentialIds::default()),
			Argon2::default(),
		)
	}

	#[tokio::test]
	async fn test_signup_then_login() {
		let store = MemoryStore::new();
		let accounts = service(&store);

		let token = accounts
			.signup("ana".into(), "ana@example.com".into(), "hunter2hunter")
			.await
			.unwrap();

		let identity = store.verify(&token.to_string()).await.unwrap().unwrap();
		assert_eq!(identity.name, "ana");

		let token = accounts
			.login("ana@example.com", "hunter2hunter")
			.await
			.unwrap();

		assert!(store.verify(&token.to_string()).await.unwrap().is_some());
	}

	#[tokio::test]
	async fn test_wrong_password() {
		let store = MemoryStore::new();
		let accounts = service(&store);

		accounts
			.signup("ana".into(), "ana@example.com".into(), "hunter2hunter")
			.await
			.unwrap();

		assert!(matches!(
			accounts.login("ana@example.com", "hunter3hunter").await,
			Err(Error::InvalidEmailOrPassword)
		));
		assert!(matches!(
			accounts.login("bob@example.com", "hunter2hunter").await,
			Err(Error::InvalidEmailOrPassword)
		));
	}

	#[tokio::test]
	async fn test_duplicate_email() {
		let store = MemoryStore::new();
		let accounts = service(&store);

		accounts
			.signup("ana".into(), "ana@example.com".into(), "hunter2hunter")
			.await
			.unwrap();

		assert!(matches!(
			accounts
				.signup("other".into(), "ana@example.com".into(), "hunter2hunter")
				.await,
			Err(Error::EmailTaken)
		));
	}

	#[tokio::test]
	async fn test_logout_invalidates_token() {
		let store = MemoryStore::new();
		let accounts = service(&store);

		let token = accounts
			.signup("ana".into(), "ana@example.com".into(), "hunter2hunter")
			.await
			.unwrap()
			.to_string();

		accounts.logout(&token).await.unwrap();

		assert!(store.verify(&token).await.unwrap().is_none());
		assert!(matches!(
			accounts.logout(&token).await,
			Err(Error::InvalidToken)
		));
	}
}
