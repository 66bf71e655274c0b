use uuid::Uuid;

/// Source of fresh identifiers for posts, users and session tokens.
pub trait IdGenerator: Send + Sync {
	fn next(&self) -> Uuid;
}

/// Random (v4) identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
	fn next(&self) -> Uuid {
		Uuid::new_v4()
	}
}
