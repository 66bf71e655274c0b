pub mod model;
pub mod vote;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
	id::IdGenerator,
	identity::{Action, Identity, IdentityVerifier},
	store::{self, PostStore},
};

use self::{
	model::{Post, PostView, Vote},
	vote::{Reaction, Record, VoteState},
};

/// An error that can occur while managing posts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("missing or invalid token")]
	Unauthorized,
	#[error("unknown post {0}")]
	UnknownPost(Uuid),
	#[error("only the creator of a post can edit it")]
	NotCreator,
	#[error("only the creator of a post or an admin can delete it")]
	NotCreatorOrAdmin,
	#[error("vote counters of post {0} are inconsistent")]
	InconsistentCounters(Uuid),
	#[error("store error: {0}")]
	Store(#[from] store::Error),
}

/// Creates, lists, edits and deletes posts, and reconciles votes on them.
///
/// Every operation starts by resolving the caller's token through the
/// [`IdentityVerifier`].
#[derive(Clone)]
pub struct PostService {
	store: Arc<dyn PostStore>,
	verifier: Arc<dyn IdentityVerifier>,
	ids: Arc<dyn IdGenerator>,
}

impl PostService {
	pub fn new(
		store: Arc<dyn PostStore>,
		verifier: Arc<dyn IdentityVerifier>,
		ids: Arc<dyn IdGenerator>,
	) -> Self {
		Self {
			store,
			verifier,
			ids,
		}
	}

	async fn authenticate(&self, token: &str) -> Result<Identity, Error> {
		self.verifier.verify(token).await?.ok_or(Error::Unauthorized)
	}

	pub async fn create(&self, token: &str, content: String) -> Result<(), Error> {
		let identity = self.authenticate(token).await?;
		let post = Post::new(self.ids.next(), content, &identity, Utc::now());

		let mut tx = self.store.begin().await?;
		tx.insert(&post).await?;
		tx.commit().await?;

		tracing::info!(post = %post.id, creator = %identity.id, "created post");
		Ok(())
	}

	pub async fn list(&self, token: &str) -> Result<Vec<PostView>, Error> {
		self.authenticate(token).await?;

		let mut tx = self.store.begin().await?;
		let posts = tx.list_all_with_creator_name().await?;
		tx.commit().await?;

		Ok(posts.into_iter().map(Post::into_view).collect())
	}

	pub async fn edit(&self, token: &str, id: Uuid, content: String) -> Result<(), Error> {
		let identity = self.authenticate(token).await?;

		let mut tx = self.store.begin().await?;
		let mut post = tx.fetch_by_id(id).await?.ok_or(Error::UnknownPost(id))?;

		if !identity.can(Action::EditPost, post.creator_id) {
			return Err(Error::NotCreator);
		}

		post.set_content(content, Utc::now());
		tx.update(&post).await?;
		tx.commit().await?;

		tracing::info!(post = %id, "edited post");
		Ok(())
	}

	pub async fn delete(&self, token: &str, id: Uuid) -> Result<(), Error> {
		let identity = self.authenticate(token).await?;

		let mut tx = self.store.begin().await?;
		let post = tx.fetch_by_id(id).await?.ok_or(Error::UnknownPost(id))?;

		if !identity.can(Action::DeletePost, post.creator_id) {
			return Err(Error::NotCreatorOrAdmin);
		}

		tx.delete(id).await?;
		tx.commit().await?;

		tracing::info!(post = %id, by = %identity.id, role = ?identity.role, "deleted post");
		Ok(())
	}

	/// Likes or dislikes a post.
	///
	/// Repeating the caller's current reaction removes it, and the opposite
	/// reaction replaces it. The vote record and the post counters are written
	/// in the same transaction.
	pub async fn vote(&self, token: &str, id: Uuid, like: bool) -> Result<(), Error> {
		let identity = self.authenticate(token).await?;
		let reaction = Reaction::from(like);

		let mut tx = self.store.begin().await?;
		let mut post = tx.fetch_by_id(id).await?.ok_or(Error::UnknownPost(id))?;

		let state = VoteState::from(tx.fetch_vote(identity.id, id).await?);
		let transition = state.react(reaction);

		post.tally(&transition)
			.map_err(|_| Error::InconsistentCounters(id))?;

		let vote = |reaction: Reaction| Vote {
			user_id: identity.id,
			post_id: id,
			like: reaction.is_like(),
		};

		match transition.record {
			Record::Insert(reaction) => tx.insert_vote(&vote(reaction)).await?,
			Record::Update(reaction) => tx.update_vote(&vote(reaction)).await?,
			Record::Delete => tx.delete_vote(identity.id, id).await?,
		}

		tx.update(&post).await?;
		tx.commit().await?;

		tracing::debug!(post = %id, user = %identity.id, ?state, next = ?transition.next, "reconciled vote");
		Ok(())
	}
}
