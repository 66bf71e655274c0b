use std::{
	collections::{hash_map::Entry, HashMap},
	sync::Arc,
};

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{AccountStore, Error, PostStore, PostTransaction};
use crate::{
	account::model::User,
	identity::{Identity, IdentityVerifier},
	post::model::{Post, Vote},
};

#[derive(Debug, Default, Clone)]
struct Tables {
	users: HashMap<Uuid, User>,
	/// session token -> user id
	sessions: HashMap<Uuid, Uuid>,
	/// Creator names are captured on insert, users cannot be renamed.
	posts: HashMap<Uuid, Post>,
	/// (user id, post id) -> like
	votes: HashMap<(Uuid, Uuid), bool>,
}

/// An in-process store.
///
/// A transaction holds the only lock on the tables until it is committed or
/// dropped, so transactions are fully serialized.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
	tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

pub struct MemoryTransaction {
	guard: OwnedMutexGuard<Tables>,
	staged: Tables,
}

#[async_trait::async_trait]
impl PostStore for MemoryStore {
	async fn begin(&self) -> Result<Box<dyn PostTransaction>, Error> {
		let guard = Arc::clone(&self.tables).lock_owned().await;
		let staged = guard.clone();

		Ok(Box::new(MemoryTransaction { guard, staged }))
	}
}

#[async_trait::async_trait]
impl PostTransaction for MemoryTransaction {
	async fn insert(&mut self, post: &Post) -> Result<(), Error> {
		match self.staged.posts.entry(post.id) {
			Entry::Occupied(..) => Err(Error::Conflict("post id")),
			Entry::Vacant(entry) => {
				entry.insert(post.clone());
				Ok(())
			}
		}
	}

	async fn update(&mut self, post: &Post) -> Result<(), Error> {
		if let Some(stored) = self.staged.posts.get_mut(&post.id) {
			stored.clone_from(post);
		}

		Ok(())
	}

	async fn delete(&mut self, id: Uuid) -> Result<(), Error> {
		self.staged.posts.remove(&id);
		self.staged.votes.retain(|&(_, post_id), _| post_id != id);

		Ok(())
	}

	async fn fetch_by_id(&mut self, id: Uuid) -> Result<Option<Post>, Error> {
		Ok(self.staged.posts.get(&id).cloned())
	}

	async fn list_all_with_creator_name(&mut self) -> Result<Vec<Post>, Error> {
		let mut posts = self.staged.posts.values().cloned().collect::<Vec<_>>();

		posts.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
		Ok(posts)
	}

	async fn fetch_vote(&mut self, user_id: Uuid, post_id: Uuid) -> Result<Option<Vote>, Error> {
		Ok(self
			.staged
			.votes
			.get(&(user_id, post_id))
			.map(|&like| Vote {
				user_id,
				post_id,
				like,
			}))
	}

	async fn insert_vote(&mut self, vote: &Vote) -> Result<(), Error> {
		match self.staged.votes.entry((vote.user_id, vote.post_id)) {
			Entry::Occupied(..) => Err(Error::Conflict("vote")),
			Entry::Vacant(entry) => {
				entry.insert(vote.like);
				Ok(())
			}
		}
	}

	async fn update_vote(&mut self, vote: &Vote) -> Result<(), Error> {
		if let Some(like) = self.staged.votes.get_mut(&(vote.user_id, vote.post_id)) {
			*like = vote.like;
		}

		Ok(())
	}

	async fn delete_vote(&mut self, user_id: Uuid, post_id: Uuid) -> Result<(), Error> {
		self.staged.votes.remove(&(user_id, post_id));

		Ok(())
	}

	async fn commit(self: Box<Self>) -> Result<(), Error> {
		let Self { mut guard, staged } = *self;

		*guard = staged;
		Ok(())
	}
}

#[async_trait::async_trait]
impl AccountStore for MemoryStore {
	async fn register(&self, user: &User, token: Uuid) -> Result<(), Error> {
		let mut tables = self.tables.lock().await;

		if tables.users.values().any(|u| u.email == user.email) {
			return Err(Error::Conflict("email"));
		}

		tables.users.insert(user.id, user.clone());
		tables.sessions.insert(token, user.id);

		Ok(())
	}

	async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
		let tables = self.tables.lock().await;

		Ok(tables.users.values().find(|u| u.email == email).cloned())
	}

	async fn insert_session(&self, token: Uuid, user_id: Uuid) -> Result<(), Error> {
		self.tables.lock().await.sessions.insert(token, user_id);

		Ok(())
	}

	async fn delete_session(&self, token: Uuid) -> Result<bool, Error> {
		Ok(self.tables.lock().await.sessions.remove(&token).is_some())
	}
}

#[async_trait::async_trait]
impl IdentityVerifier for MemoryStore {
	async fn verify(&self, token: &str) -> Result<Option<Identity>, Error> {
		let Some(token) = super::parse_token(token) else {
			return Ok(None);
		};

		let tables = self.tables.lock().await;
		let user = tables
			.sessions
			.get(&token)
			.and_then(|user_id| tables.users.get(user_id));

		Ok(user.map(|user| Identity {
			id: user.id,
			name: user.name.clone(),
			role: user.role,
		}))
	}
}

#[cfg(test)]
impl MemoryStore {
	pub async fn grant_role(&self, user_id: Uuid, role: crate::identity::Role) {
		if let Some(user) = self.tables.lock().await.users.get_mut(&user_id) {
			user.role = role;
		}
	}
}
