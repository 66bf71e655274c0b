use sqlx::{postgres::PgPoolOptions, Postgres};
use uuid::Uuid;

use super::{AccountStore, Error, PostStore, PostTransaction};
use crate::{
	account::model::User,
	identity::{Identity, IdentityVerifier, Role},
	post::model::{Post, Vote},
	Database,
};

/// The columns of a post joined with its creator's name.
const POST_COLUMNS: &str = r#"
	post.id, post.content, post.likes, post.dislikes, post.created_at, post.updated_at,
	post.creator_id, "user".name AS creator_name
"#;

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
	database: Database,
}

impl PgStore {
	/// Wraps an already migrated pool.
	pub fn new(database: Database) -> Self {
		Self { database }
	}

	/// Connects to the database and applies any pending migrations.
	pub async fn connect(url: &str, max_connections: u32) -> Result<Self, Error> {
		let database = PgPoolOptions::new()
			.max_connections(max_connections)
			.connect(url)
			.await?;

		sqlx::migrate!().run(&database).await?;

		Ok(Self::new(database))
	}
}

#[derive(sqlx::FromRow)]
struct PostRow {
	id: Uuid,
	content: String,
	likes: i64,
	dislikes: i64,
	created_at: chrono::DateTime<chrono::Utc>,
	updated_at: chrono::DateTime<chrono::Utc>,
	creator_id: Uuid,
	creator_name: String,
}

impl TryFrom<PostRow> for Post {
	type Error = Error;

	fn try_from(row: PostRow) -> Result<Self, Self::Error> {
		Ok(Self {
			id: row.id,
			content: row.content,
			likes: u64::try_from(row.likes).map_err(|_| Error::OutOfRange("likes"))?,
			dislikes: u64::try_from(row.dislikes).map_err(|_| Error::OutOfRange("dislikes"))?,
			created_at: row.created_at,
			updated_at: row.updated_at,
			creator_id: row.creator_id,
			creator_name: row.creator_name,
		})
	}
}

fn counters(post: &Post) -> Result<(i64, i64), Error> {
	Ok((
		i64::try_from(post.likes).map_err(|_| Error::OutOfRange("likes"))?,
		i64::try_from(post.dislikes).map_err(|_| Error::OutOfRange("dislikes"))?,
	))
}

pub struct PgTransaction {
	tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl PostStore for PgStore {
	async fn begin(&self) -> Result<Box<dyn PostTransaction>, Error> {
		Ok(Box::new(PgTransaction {
			tx: self.database.begin().await?,
		}))
	}
}

#[async_trait::async_trait]
impl PostTransaction for PgTransaction {
	async fn insert(&mut self, post: &Post) -> Result<(), Error> {
		let (likes, dislikes) = counters(post)?;

		sqlx::query(
			r#"
				INSERT INTO post (id, creator_id, content, likes, dislikes, created_at, updated_at)
				VALUES ($1, $2, $3, $4, $5, $6, $7)
			"#,
		)
		.bind(post.id)
		.bind(post.creator_id)
		.bind(&post.content)
		.bind(likes)
		.bind(dislikes)
		.bind(post.created_at)
		.bind(post.updated_at)
		.execute(&mut *self.tx)
		.await?;

		Ok(())
	}

	async fn update(&mut self, post: &Post) -> Result<(), Error> {
		let (likes, dislikes) = counters(post)?;

		sqlx::query(
			r#"
				UPDATE post
				SET content = $2, likes = $3, dislikes = $4, updated_at = $5
				WHERE id = $1
			"#,
		)
		.bind(post.id)
		.bind(&post.content)
		.bind(likes)
		.bind(dislikes)
		.bind(post.updated_at)
		.execute(&mut *self.tx)
		.await?;

		Ok(())
	}

	async fn delete(&mut self, id: Uuid) -> Result<(), Error> {
		// Votes go with the post through `ON DELETE CASCADE`.
		sqlx::query("DELETE FROM post WHERE id = $1")
			.bind(id)
			.execute(&mut *self.tx)
			.await?;

		Ok(())
	}

	async fn fetch_by_id(&mut self, id: Uuid) -> Result<Option<Post>, Error> {
		let query = format!(
			r#"
				SELECT {POST_COLUMNS}
				FROM post JOIN "user" ON "user".id = post.creator_id
				WHERE post.id = $1
				FOR UPDATE OF post
			"#
		);

		sqlx::query_as::<_, PostRow>(&query)
			.bind(id)
			.fetch_optional(&mut *self.tx)
			.await?
			.map(Post::try_from)
			.transpose()
	}

	async fn list_all_with_creator_name(&mut self) -> Result<Vec<Post>, Error> {
		let query = format!(
			r#"
				SELECT {POST_COLUMNS}
				FROM post JOIN "user" ON "user".id = post.creator_id
				ORDER BY post.created_at, post.id
			"#
		);

		sqlx::query_as::<_, PostRow>(&query)
			.fetch_all(&mut *self.tx)
			.await?
			.into_iter()
			.map(Post::try_from)
			.collect()
	}

	async fn fetch_vote(&mut self, user_id: Uuid, post_id: Uuid) -> Result<Option<Vote>, Error> {
		let vote = sqlx::query_as::<_, Vote>(
			r#"SELECT user_id, post_id, "like" FROM vote WHERE user_id = $1 AND post_id = $2"#,
		)
		.bind(user_id)
		.bind(post_id)
		.fetch_optional(&mut *self.tx)
		.await?;

		Ok(vote)
	}

	async fn insert_vote(&mut self, vote: &Vote) -> Result<(), Error> {
		sqlx::query(r#"INSERT INTO vote (user_id, post_id, "like") VALUES ($1, $2, $3)"#)
			.bind(vote.user_id)
			.bind(vote.post_id)
			.bind(vote.like)
			.execute(&mut *self.tx)
			.await?;

		Ok(())
	}

	async fn update_vote(&mut self, vote: &Vote) -> Result<(), Error> {
		sqlx::query(r#"UPDATE vote SET "like" = $3 WHERE user_id = $1 AND post_id = $2"#)
			.bind(vote.user_id)
			.bind(vote.post_id)
			.bind(vote.like)
			.execute(&mut *self.tx)
			.await?;

		Ok(())
	}

	async fn delete_vote(&mut self, user_id: Uuid, post_id: Uuid) -> Result<(), Error> {
		sqlx::query("DELETE FROM vote WHERE user_id = $1 AND post_id = $2")
			.bind(user_id)
			.bind(post_id)
			.execute(&mut *self.tx)
			.await?;

		Ok(())
	}

	async fn commit(self: Box<Self>) -> Result<(), Error> {
		self.tx.commit().await?;

		Ok(())
	}
}

#[async_trait::async_trait]
impl AccountStore for PgStore {
	async fn register(&self, user: &User, token: Uuid) -> Result<(), Error> {
		let mut tx = self.database.begin().await?;

		sqlx::query(
			r#"
				INSERT INTO "user" (id, name, email, password, role, created_at)
				VALUES ($1, $2, $3, $4, $5, $6)
			"#,
		)
		.bind(user.id)
		.bind(&user.name)
		.bind(&user.email)
		.bind(&user.password)
		.bind(user.role)
		.bind(user.created_at)
		.execute(&mut *tx)
		.await
		.map_err(|e| match e {
			sqlx::Error::Database(ref d) if d.constraint() == Some("user_email_key") => {
				Error::Conflict("email")
			}
			e => Error::Database(e),
		})?;

		sqlx::query("INSERT INTO session (id, user_id) VALUES ($1, $2)")
			.bind(token)
			.bind(user.id)
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;

		Ok(())
	}

	async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
		let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE email = $1"#)
			.bind(email)
			.fetch_optional(&self.database)
			.await?;

		Ok(user)
	}

	async fn insert_session(&self, token: Uuid, user_id: Uuid) -> Result<(), Error> {
		sqlx::query("INSERT INTO session (id, user_id) VALUES ($1, $2)")
			.bind(token)
			.bind(user_id)
			.execute(&self.database)
			.await?;

		Ok(())
	}

	async fn delete_session(&self, token: Uuid) -> Result<bool, Error> {
		let status = sqlx::query("DELETE FROM session WHERE id = $1")
			.bind(token)
			.execute(&self.database)
			.await?;

		Ok(status.rows_affected() > 0)
	}
}

#[async_trait::async_trait]
impl IdentityVerifier for PgStore {
	async fn verify(&self, token: &str) -> Result<Option<Identity>, Error> {
		let Some(token) = super::parse_token(token) else {
			return Ok(None);
		};

		let identity = sqlx::query_as::<_, (Uuid, String, Role)>(
			r#"
				SELECT "user".id, "user".name, "user".role
				FROM session JOIN "user" ON "user".id = session.user_id
				WHERE session.id = $1
			"#,
		)
		.bind(token)
		.fetch_optional(&self.database)
		.await?;

		Ok(identity.map(|(id, name, role)| Identity { id, name, role }))
	}
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use uuid::Uuid;

	use super::PgStore;
	use crate::{account, id::RandomIds, store, test::*, Database, State};

	fn state(pool: Database) -> State {
		State::new(PgStore::new(pool), Arc::new(RandomIds))
	}

	#[sqlx::test]
	async fn test_vote_scenario(pool: Database) {
		let server = server(state(pool));
		let ana = signup(&server, "ana").await;
		let bob = signup(&server, "bob").await;
		let cat = signup(&server, "cat").await;

		let post = create(&server, &ana, "vote on me").await;
		assert_eq!(counts(&list(&server, &ana).await), (0, 0));

		vote(&server, &bob, post, true).await;
		assert_eq!(counts(&list(&server, &ana).await), (1, 0));

		vote(&server, &bob, post, true).await;
		assert_eq!(counts(&list(&server, &ana).await), (0, 0));

		vote(&server, &bob, post, false).await;
		assert_eq!(counts(&list(&server, &ana).await), (0, 1));

		vote(&server, &cat, post, false).await;
		assert_eq!(counts(&list(&server, &ana).await), (0, 2));

		vote(&server, &cat, post, true).await;
		assert_eq!(counts(&list(&server, &ana).await), (1, 1));
	}

	#[sqlx::test]
	async fn test_duplicate_email(pool: Database) {
		let state = state(pool);
		let server = server(state.clone());
		signup(&server, "ana").await;

		let response = server
			.post("/users/signup")
			.json(&json!({
				"name": "anna",
				"email": "ana@example.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::CONFLICT);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "email");

		assert!(matches!(
			state
				.accounts
				.signup("anna".into(), "ana@example.com".into(), "hunter2hunter")
				.await,
			Err(account::Error::EmailTaken)
		));
	}

	#[sqlx::test]
	async fn test_admin_deletes_any_post(pool: Database) {
		let store = PgStore::new(pool.clone());
		let server = server(state(pool.clone()));
		let ana = signup(&server, "ana").await;
		let root = signup(&server, "root").await;

		let post = create(&server, &ana, "moderate me").await;

		let response = server
			.delete(&format!("/posts/{post}"))
			.add_header(AUTHORIZATION, bearer(&root))
			.await;
		assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

		sqlx::query(r#"UPDATE "user" SET role = 'admin' WHERE name = $1"#)
			.bind("root")
			.execute(&pool)
			.await
			.unwrap();

		let identity = store.verify(&root).await.unwrap().unwrap();
		assert_eq!(identity.role, Role::Admin);

		let response = server
			.delete(&format!("/posts/{post}"))
			.add_header(AUTHORIZATION, bearer(&root))
			.await;
		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(list(&server, &ana).await.is_empty());
	}

	#[sqlx::test]
	async fn test_votes_are_deleted_with_their_post(pool: Database) {
		let server = server(state(pool.clone()));
		let ana = signup(&server, "ana").await;
		let bob = signup(&server, "bob").await;

		let post = create(&server, &ana, "short lived").await;
		vote(&server, &ana, post, true).await;
		vote(&server, &bob, post, false).await;

		let votes = || {
			sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vote WHERE post_id = $1")
				.bind(post)
				.fetch_one(&pool)
		};
		assert_eq!(votes().await.unwrap(), 2);

		let response = server
			.delete(&format!("/posts/{post}"))
			.add_header(AUTHORIZATION, bearer(&ana))
			.await;
		assert_eq!(response.status_code(), StatusCode::OK);

		assert_eq!(votes().await.unwrap(), 0);
	}

	#[sqlx::test]
	async fn test_concurrent_votes_lock_the_post(pool: Database) {
		let state = state(pool.clone());

		let ana = state
			.accounts
			.signup("ana".into(), "ana@example.com".into(), "hunter2hunter")
			.await
			.unwrap()
			.to_string();
		state.posts.create(&ana, "hello".into()).await.unwrap();
		let post = state.posts.list(&ana).await.unwrap()[0].id;

		let mut tokens = Vec::new();
		for user in 0..8 {
			let token = state
				.accounts
				.signup(format!("user{user}"), format!("user{user}@example.com"), "hunter2hunter")
				.await
				.unwrap();

			tokens.push(token.to_string());
		}

		let mut tasks = Vec::new();
		for token in &tokens {
			for like in [true, true, false] {
				let posts = state.posts.clone();
				let token = token.clone();

				tasks.push(tokio::spawn(async move { posts.vote(&token, post, like).await }));
			}
		}

		for task in tasks {
			task.await.unwrap().unwrap();
		}

		let view = &state.posts.list(&ana).await.unwrap()[0];
		let votes = sqlx::query_scalar::<_, bool>(r#"SELECT "like" FROM vote WHERE post_id = $1"#)
			.bind(post)
			.fetch_all(&pool)
			.await
			.unwrap();

		let liked = votes.iter().filter(|&&like| like).count();
		assert_eq!(view.likes, u64::try_from(liked).unwrap());
		assert_eq!(view.dislikes, u64::try_from(votes.len() - liked).unwrap());
		assert!(votes.len() <= tokens.len());
	}

	#[sqlx::test]
	async fn test_unknown_email_and_token(pool: Database) {
		let store = PgStore::new(pool);

		assert!(store.verify(&Uuid::new_v4().to_string()).await.unwrap().is_none());
		assert!(store.verify("not-a-token").await.unwrap().is_none());
		assert!(matches!(
			store::AccountStore::fetch_user_by_email(&store, "nobody@example.com").await,
			Ok(None)
		));
	}
}
