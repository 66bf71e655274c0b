use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

use super::vote::Transition;
use crate::identity::Identity;

/// A single post, as loaded from (and written back to) the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
	pub id: Uuid,
	pub content: String,
	pub likes: u64,
	pub dislikes: u64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub creator_id: Uuid,
	pub creator_name: String,
}

/// A single user's reaction to a single post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct Vote {
	pub user_id: Uuid,
	pub post_id: Uuid,
	pub like: bool,
}

/// Returned when applying a vote transition would push a counter below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterUnderflow;

impl Post {
	pub fn new(id: Uuid, content: String, creator: &Identity, now: DateTime<Utc>) -> Self {
		Self {
			id,
			content,
			likes: 0,
			dislikes: 0,
			created_at: now,
			updated_at: now,
			creator_id: creator.id,
			creator_name: creator.name.clone(),
		}
	}

	pub fn set_content(&mut self, content: String, now: DateTime<Utc>) {
		self.content = content;
		self.updated_at = now;
	}

	/// Applies the counter deltas of a vote transition.
	///
	/// Both counters are computed before either is written, so the post is
	/// left untouched on underflow.
	pub fn tally(&mut self, transition: &Transition) -> Result<(), CounterUnderflow> {
		let likes = self
			.likes
			.checked_add_signed(transition.likes)
			.ok_or(CounterUnderflow)?;
		let dislikes = self
			.dislikes
			.checked_add_signed(transition.dislikes)
			.ok_or(CounterUnderflow)?;

		self.likes = likes;
		self.dislikes = dislikes;

		Ok(())
	}

	pub fn into_view(self) -> PostView {
		PostView {
			id: self.id,
			content: self.content,
			likes: self.likes,
			dislikes: self.dislikes,
			created_at: self.created_at,
			updated_at: self.updated_at,
			creator: Creator {
				id: self.creator_id,
				name: self.creator_name,
			},
		}
	}
}

/// A post as presented to clients.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
	/// The unique identifier of the post.
	pub id: Uuid,
	/// The text of the post.
	pub content: String,
	/// How many users currently like the post.
	pub likes: u64,
	/// How many users currently dislike the post.
	pub dislikes: u64,
	/// The creation time of the post.
	pub created_at: DateTime<Utc>,
	/// The last time the content of the post changed.
	pub updated_at: DateTime<Utc>,
	/// The user that created the post.
	pub creator: Creator,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct Creator {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The display name of the user.
	pub name: String,
}
