use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store;

/// The role of a user, stored alongside the account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
	#[default]
	Regular,
	Admin,
}

/// A verified subject, derived from a request token.
///
/// This is never persisted; it only lives for the duration of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
	pub id: Uuid,
	pub name: String,
	pub role: Role,
}

/// An action on a post that requires more than being logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	EditPost,
	DeletePost,
}

impl Identity {
	/// Whether this identity may perform `action` on a post created by `creator_id`.
	///
	/// Only the creator may edit a post. The creator or an admin may delete it.
	pub fn can(&self, action: Action, creator_id: Uuid) -> bool {
		let is_creator = self.id == creator_id;

		match action {
			Action::EditPost => is_creator,
			Action::DeletePost => is_creator || self.role == Role::Admin,
		}
	}
}

/// Resolves a request token into an [`Identity`].
///
/// Returns `Ok(None)` for any token that does not belong to a live session,
/// including malformed ones.
#[async_trait::async_trait]
pub trait IdentityVerifier: Send + Sync {
	async fn verify(&self, token: &str) -> Result<Option<Identity>, store::Error>;
}

#[cfg(test)]
pub mod test {
	use std::collections::HashMap;

	use uuid::Uuid;

	use super::{Action, Identity, IdentityVerifier, Role};
	use crate::store;

	/// A verifier backed by a fixed token table.
	#[derive(Default)]
	pub struct StaticVerifier(HashMap<String, Identity>);

	impl StaticVerifier {
		pub fn with(mut self, token: &str, identity: Identity) -> Self {
			self.0.insert(token.to_owned(), identity);
			self
		}
	}

	#[async_trait::async_trait]
	impl IdentityVerifier for StaticVerifier {
		async fn verify(&self, token: &str) -> Result<Option<Identity>, store::Error> {
			Ok(self.0.get(token).cloned())
		}
	}

	pub fn identity(id: u128, name: &str, role: Role) -> Identity {
		Identity {
			id: Uuid::from_u128(id),
			name: name.into(),
			role,
		}
	}

	#[test]
	fn test_only_creator_can_edit() {
		let creator = Uuid::from_u128(1);

		assert!(identity(1, "ana", Role::Regular).can(Action::EditPost, creator));
		assert!(!identity(2, "bob", Role::Regular).can(Action::EditPost, creator));
		assert!(!identity(3, "root", Role::Admin).can(Action::EditPost, creator));
	}

	#[test]
	fn test_creator_or_admin_can_delete() {
		let creator = Uuid::from_u128(1);

		assert!(identity(1, "ana", Role::Regular).can(Action::DeletePost, creator));
		assert!(identity(3, "root", Role::Admin).can(Action::DeletePost, creator));
		assert!(!identity(2, "bob", Role::Regular).can(Action::DeletePost, creator));
	}
}
