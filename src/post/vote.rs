use super::model::Vote;

/// What a user asked for in a single vote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
	Like,
	Dislike,
}

impl From<bool> for Reaction {
	fn from(like: bool) -> Self {
		if like {
			Self::Like
		} else {
			Self::Dislike
		}
	}
}

impl Reaction {
	pub fn is_like(self) -> bool {
		self == Self::Like
	}
}

/// Where a user stands on a post before (or after) a vote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
	NoVote,
	Liked,
	Disliked,
}

impl From<Option<Vote>> for VoteState {
	fn from(vote: Option<Vote>) -> Self {
		match vote {
			None => Self::NoVote,
			Some(Vote { like: true, .. }) => Self::Liked,
			Some(Vote { like: false, .. }) => Self::Disliked,
		}
	}
}

/// The change to apply to the stored vote record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
	Insert(Reaction),
	Update(Reaction),
	Delete,
}

/// The outcome of a vote request: the record change and the counter deltas,
/// which must be applied together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
	pub next: VoteState,
	pub record: Record,
	pub likes: i64,
	pub dislikes: i64,
}

impl VoteState {
	/// Resolves a vote request against the current state.
	///
	/// Repeating the current reaction removes it, the opposite reaction flips it.
	pub fn react(self, reaction: Reaction) -> Transition {
		use Reaction::{Dislike, Like};

		let (next, record, likes, dislikes) = match (self, reaction) {
			(Self::NoVote, Like) => (Self::Liked, Record::Insert(Like), 1, 0),
			(Self::NoVote, Dislike) => (Self::Disliked, Record::Insert(Dislike), 0, 1),
			(Self::Liked, Like) => (Self::NoVote, Record::Delete, -1, 0),
			(Self::Liked, Dislike) => (Self::Disliked, Record::Update(Dislike), -1, 1),
			(Self::Disliked, Dislike) => (Self::NoVote, Record::Delete, 0, -1),
			(Self::Disliked, Like) => (Self::Liked, Record::Update(Like), 1, -1),
		};

		Transition {
			next,
			record,
			likes,
			dislikes,
		}
	}
}
